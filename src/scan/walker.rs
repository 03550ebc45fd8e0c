use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::path::Path;
use walkdir::WalkDir;

use crate::error::SkipReason;
use crate::rules::IgnoreRules;
use crate::types::{FileEntry, SkippedFile};

#[derive(Debug, Clone, Copy, Default)]
pub struct ScanOptions {
    /// Also honour the project's top-level `.gitignore`
    pub respect_gitignore: bool,
    pub follow_links: bool,
}

#[derive(Debug, Default)]
pub struct ScanResult {
    /// Files in walk order: depth-first, entries sorted by file name
    pub files: Vec<FileEntry>,
    /// Ignored entries; an ignored directory counts once, its subtree is never visited
    pub ignored: usize,
    /// Entries the walk itself could not read
    pub errors: Vec<SkippedFile>,
}

/// Walk `root`, pruning ignored directories before descending into them.
pub fn scan_directory(root: &Path, rules: &IgnoreRules, options: ScanOptions) -> ScanResult {
    let gitignore = if options.respect_gitignore {
        load_gitignore(root)
    } else {
        None
    };

    let mut files = Vec::new();
    let mut errors = Vec::new();
    let mut ignored = 0;

    let walker = WalkDir::new(root)
        .follow_links(options.follow_links)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 {
                return true;
            }

            let is_dir = entry.file_type().is_dir();
            let relative = relative_path(root, entry.path());
            let skip = rules.matches_entry(&relative, is_dir)
                || gitignore
                    .as_ref()
                    .is_some_and(|gi| gi.matched(entry.path(), is_dir).is_ignore());

            if skip {
                tracing::trace!(path = %relative, is_dir, "ignored");
                ignored += 1;
            }
            !skip
        });

    for entry in walker {
        match entry {
            Ok(entry) => {
                if !entry.file_type().is_file() {
                    continue;
                }
                let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
                let relative = relative_path(root, entry.path());
                files.push(FileEntry::new(entry.path().to_path_buf(), relative, size));
            }
            Err(err) => {
                let relative = err
                    .path()
                    .map(|p| relative_path(root, p))
                    .unwrap_or_default();
                tracing::warn!(path = %relative, error = %err, "cannot read directory entry");
                errors.push(SkippedFile {
                    relative_path: relative,
                    reason: SkipReason::Unreadable(err.to_string()),
                });
            }
        }
    }

    tracing::debug!(files = files.len(), ignored, "scan complete");

    ScanResult {
        files,
        ignored,
        errors,
    }
}

fn load_gitignore(root: &Path) -> Option<Gitignore> {
    let path = root.join(".gitignore");
    if !path.exists() {
        return None;
    }

    let mut builder = GitignoreBuilder::new(root);
    if let Some(err) = builder.add(&path) {
        tracing::warn!(path = %path.display(), error = %err, "cannot parse .gitignore");
    }
    match builder.build() {
        Ok(gi) => Some(gi),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "cannot build .gitignore matcher");
            None
        }
    }
}

fn relative_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn paths(result: &ScanResult) -> Vec<&str> {
        result.files.iter().map(|f| f.relative_path.as_str()).collect()
    }

    #[test]
    fn test_scan_sorted_walk() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "b.txt", "b");
        write(dir.path(), "a.txt", "a");
        write(dir.path(), "src/z.rs", "z");
        write(dir.path(), "src/m/x.rs", "x");

        let result = scan_directory(dir.path(), &IgnoreRules::new(), ScanOptions::default());
        assert_eq!(paths(&result), vec!["a.txt", "b.txt", "src/m/x.rs", "src/z.rs"]);
        assert_eq!(result.ignored, 0);
    }

    #[test]
    fn test_scan_prunes_ignored_directory() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "main.py", "print()");
        write(dir.path(), "node_modules/a/index.js", "x");
        write(dir.path(), "node_modules/b/index.js", "y");
        write(dir.path(), "debug.log", "z");

        let rules = IgnoreRules::parse("node_modules/\n*.log\n");
        let result = scan_directory(dir.path(), &rules, ScanOptions::default());

        assert_eq!(paths(&result), vec!["main.py"]);
        // node_modules/ once, debug.log once
        assert_eq!(result.ignored, 2);
    }

    #[test]
    fn test_scan_respects_gitignore_when_enabled() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), ".gitignore", "secret.txt\n");
        write(dir.path(), "secret.txt", "s");
        write(dir.path(), "keep.txt", "k");

        let plain = scan_directory(dir.path(), &IgnoreRules::new(), ScanOptions::default());
        assert!(paths(&plain).contains(&"secret.txt"));

        let options = ScanOptions {
            respect_gitignore: true,
            ..ScanOptions::default()
        };
        let filtered = scan_directory(dir.path(), &IgnoreRules::new(), options);
        assert!(!paths(&filtered).contains(&"secret.txt"));
        assert!(paths(&filtered).contains(&"keep.txt"));
    }

    #[test]
    fn test_file_entry_metadata() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "pkg/mod/file.RS", "12345");

        let result = scan_directory(dir.path(), &IgnoreRules::new(), ScanOptions::default());
        let entry = &result.files[0];
        assert_eq!(entry.size_bytes, 5);
        assert_eq!(entry.depth, 2);
        assert_eq!(entry.extension.as_deref(), Some("rs"));
    }
}
