use std::collections::BTreeMap;
use std::fmt::Write;

use super::json::FileReport;

/// Group `(importance, line)` pairs by importance, highest first.
fn by_importance<I>(items: I) -> Vec<(u32, Vec<String>)>
where
    I: IntoIterator<Item = (u32, String)>,
{
    let mut groups: BTreeMap<u32, Vec<String>> = BTreeMap::new();
    for (importance, line) in items {
        groups.entry(importance).or_default().push(line);
    }
    groups.into_iter().rev().collect()
}

/// `_SUMMARY.txt` placed inside the export folder.
pub fn render_summary(report: &FileReport, tree: Option<&str>) -> String {
    let stats = &report.stats;
    let mut out = String::new();

    let _ = writeln!(out, "Project Context Summary");
    let _ = writeln!(out, "=======================\n");
    let _ = writeln!(out, "Project: {}", report.project.name);
    let _ = writeln!(out, "Export Date: {}", report.generated_at.format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(out, "Tokenizer: {}", report.project.tokenizer);
    let _ = writeln!(out, "Total Files: {}", stats.files_selected);
    let _ = writeln!(
        out,
        "Total Tokens: {} / {} ({:.1}%)",
        stats.tokens_used + stats.reserved_tokens,
        stats.token_budget,
        stats.budget_percent()
    );
    if stats.reserved_tokens > 0 {
        let _ = writeln!(out, "Reserved for structure: {}", stats.reserved_tokens);
    }
    let _ = writeln!(
        out,
        "Excluded: {} over budget, {} unreadable, {} ignored\n",
        stats.files_rejected, stats.files_skipped, stats.entries_ignored
    );

    let _ = writeln!(out, "Files by Importance:");
    let _ = writeln!(out, "--------------------");
    let groups = by_importance(
        report
            .selected_files
            .iter()
            .map(|f| (f.importance, format!("  - {} ({} tokens)", f.path, f.tokens))),
    );
    for (importance, lines) in groups {
        let _ = writeln!(out, "\nImportance Level: {}", importance);
        for line in lines {
            let _ = writeln!(out, "{}", line);
        }
    }

    if let Some(tree) = tree {
        let _ = writeln!(out, "\nProject Structure (* = included):");
        let _ = writeln!(out, "---------------------------------");
        out.push_str(tree);
    }

    out
}

/// Human-readable companion to the JSON file report.
pub fn render_text_report(report: &FileReport) -> String {
    let stats = &report.stats;
    let mut out = String::new();

    let _ = writeln!(out, "Project Context Report");
    let _ = writeln!(out, "======================\n");
    let _ = writeln!(out, "Project: {}", report.project.name);
    let _ = writeln!(out, "Report Date: {}", report.generated_at.format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(out, "Total Files Analyzed: {}", stats.files_scanned);
    let _ = writeln!(out, "Selected Files: {}", stats.files_selected);
    let _ = writeln!(out, "Excluded Files: {}", stats.files_rejected);
    let _ = writeln!(out, "Skipped Files: {}\n", stats.files_skipped);

    let _ = writeln!(out, "Selected Files:");
    let _ = writeln!(out, "---------------");
    let selected = by_importance(
        report
            .selected_files
            .iter()
            .map(|f| (f.importance, format!("  - {} ({} tokens)", f.path, f.tokens))),
    );
    for (importance, lines) in selected {
        let _ = writeln!(out, "\nImportance Level: {}", importance);
        for line in lines {
            let _ = writeln!(out, "{}", line);
        }
    }

    let _ = writeln!(out, "\nExcluded Files:");
    let _ = writeln!(out, "---------------");
    let excluded = by_importance(
        report
            .excluded_files
            .iter()
            .map(|f| (f.importance, format!("  - {} ({} tokens, {})", f.path, f.tokens, f.reason))),
    );
    for (importance, lines) in excluded {
        let _ = writeln!(out, "\nImportance Level: {}", importance);
        for line in lines {
            let _ = writeln!(out, "{}", line);
        }
    }

    if !report.skipped_files.is_empty() {
        let _ = writeln!(out, "\nSkipped Files:");
        let _ = writeln!(out, "--------------");
        for skipped in &report.skipped_files {
            let _ = writeln!(out, "  - {} ({})", skipped.relative_path, skipped.reason);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SkipReason;
    use crate::types::{Candidate, FileEntry, Selection, SkippedFile};
    use chrono::Local;
    use std::path::PathBuf;

    fn candidate(path: &str, score: u32, tokens: usize) -> Candidate {
        Candidate {
            entry: FileEntry::new(PathBuf::from(path), path.to_string(), 10),
            content: String::new(),
            score,
            tokens,
        }
    }

    fn report() -> FileReport {
        let selection = Selection {
            files: vec![
                candidate("README.md", 30, 20),
                candidate("src/a.rs", 15, 10),
                candidate("src/b.rs", 15, 5),
            ],
            rejected: vec![candidate("data.json", 0, 900)],
            skipped: vec![SkippedFile {
                relative_path: "img.bin".to_string(),
                reason: SkipReason::Binary,
            }],
            ignored: 2,
            token_budget: 100,
            reserved_tokens: 0,
            tokens_used: 35,
        };
        FileReport::from_selection("demo", "/tmp/demo", "chars", &selection, Local::now())
    }

    #[test]
    fn test_by_importance_descending() {
        let groups = by_importance(vec![(1, "a".to_string()), (5, "b".to_string()), (1, "c".to_string())]);
        assert_eq!(groups[0].0, 5);
        assert_eq!(groups[1], (1, vec!["a".to_string(), "c".to_string()]));
    }

    #[test]
    fn test_render_summary() {
        let text = render_summary(&report(), Some("demo/\n└── README.md *\n"));

        assert!(text.contains("Project: demo"));
        assert!(text.contains("Total Tokens: 35 / 100 (35.0%)"));
        assert!(text.contains("Excluded: 1 over budget, 1 unreadable, 2 ignored"));
        let level_30 = text.find("Importance Level: 30").unwrap();
        let level_15 = text.find("Importance Level: 15").unwrap();
        assert!(level_30 < level_15);
        assert!(text.contains("  - src/a.rs (10 tokens)"));
        assert!(text.contains("Project Structure"));
    }

    #[test]
    fn test_render_text_report() {
        let text = render_text_report(&report());

        assert!(text.contains("Total Files Analyzed: 5"));
        assert!(text.contains("  - data.json (900 tokens, token limit exceeded)"));
        assert!(text.contains("  - img.bin (binary content)"));
    }
}
