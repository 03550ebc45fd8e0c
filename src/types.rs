use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::error::SkipReason;

/// A file discovered by the walk, before its content is read.
#[derive(Debug, Clone, Serialize)]
pub struct FileEntry {
    #[serde(skip)]
    pub path: PathBuf,
    /// `/`-separated path relative to the project root
    pub relative_path: String,
    pub extension: Option<String>,
    pub size_bytes: u64,
    /// Number of directories between the root and the file (0 for top-level files)
    pub depth: usize,
}

impl FileEntry {
    pub fn new(path: PathBuf, relative_path: String, size_bytes: u64) -> Self {
        let extension = Path::new(&relative_path)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());
        let depth = relative_path.matches('/').count();

        Self {
            path,
            relative_path,
            extension,
            size_bytes,
            depth,
        }
    }

    pub fn file_name(&self) -> &str {
        self.relative_path
            .rsplit('/')
            .next()
            .unwrap_or(&self.relative_path)
    }
}

/// A readable file with its score and token estimate, awaiting admission.
#[derive(Debug, Clone, Serialize)]
pub struct Candidate {
    #[serde(flatten)]
    pub entry: FileEntry,
    #[serde(skip)]
    pub content: String,
    pub score: u32,
    pub tokens: usize,
}

impl Candidate {
    pub fn relative_path(&self) -> &str {
        &self.entry.relative_path
    }
}

/// A file that could not be considered at all.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedFile {
    pub relative_path: String,
    pub reason: SkipReason,
}

/// Outcome of one selection run: admitted files in rank order plus everything left out.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Selection {
    pub files: Vec<Candidate>,
    /// Readable files that did not fit in the remaining budget, in rank order
    pub rejected: Vec<Candidate>,
    pub skipped: Vec<SkippedFile>,
    /// Walk entries excluded by ignore rules (pruned directories count once)
    pub ignored: usize,
    pub token_budget: usize,
    /// Tokens set aside before admission (e.g. for the structure listing)
    pub reserved_tokens: usize,
    pub tokens_used: usize,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn remaining_tokens(&self) -> usize {
        self.token_budget
            .saturating_sub(self.reserved_tokens)
            .saturating_sub(self.tokens_used)
    }

    pub fn stats(&self) -> SelectionStats {
        SelectionStats {
            files_scanned: self.files.len() + self.rejected.len() + self.skipped.len(),
            files_selected: self.files.len(),
            files_rejected: self.rejected.len(),
            files_skipped: self.skipped.len(),
            entries_ignored: self.ignored,
            tokens_used: self.tokens_used,
            reserved_tokens: self.reserved_tokens,
            token_budget: self.token_budget,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SelectionStats {
    pub files_scanned: usize,
    pub files_selected: usize,
    pub files_rejected: usize,
    pub files_skipped: usize,
    pub entries_ignored: usize,
    pub tokens_used: usize,
    pub reserved_tokens: usize,
    pub token_budget: usize,
}

impl SelectionStats {
    /// Share of the budget consumed, reserved tokens included.
    pub fn budget_percent(&self) -> f64 {
        if self.token_budget == 0 {
            return 0.0;
        }
        (self.tokens_used + self.reserved_tokens) as f64 / self.token_budget as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_entry_new() {
        let entry = FileEntry::new(PathBuf::from("/p/src/Main.PY"), "src/Main.PY".to_string(), 42);
        assert_eq!(entry.extension.as_deref(), Some("py"));
        assert_eq!(entry.depth, 1);
        assert_eq!(entry.file_name(), "Main.PY");

        let top = FileEntry::new(PathBuf::from("/p/Makefile"), "Makefile".to_string(), 1);
        assert_eq!(top.extension, None);
        assert_eq!(top.depth, 0);
    }

    #[test]
    fn test_stats() {
        let selection = Selection {
            token_budget: 200,
            tokens_used: 50,
            reserved_tokens: 10,
            ignored: 3,
            ..Selection::default()
        };
        let stats = selection.stats();
        assert_eq!(stats.entries_ignored, 3);
        assert_eq!(selection.remaining_tokens(), 140);
        assert!((stats.budget_percent() - 30.0).abs() < f64::EPSILON);
    }
}
