use chrono::{DateTime, Local};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::types::{Candidate, Selection, SelectionStats, SkippedFile};

#[derive(Serialize)]
pub struct FileReport {
    pub version: String,
    pub generated_at: DateTime<Local>,
    pub project: ProjectInfo,
    pub stats: SelectionStats,
    pub selected_files: Vec<SelectedEntry>,
    pub excluded_files: Vec<ExcludedEntry>,
    pub skipped_files: Vec<SkippedFile>,
}

#[derive(Serialize)]
pub struct ProjectInfo {
    pub name: String,
    pub path: String,
    pub tokenizer: String,
}

#[derive(Serialize, Clone)]
pub struct SelectedEntry {
    pub path: String,
    pub importance: u32,
    pub tokens: usize,
    pub size: u64,
    pub sha256: String,
}

impl SelectedEntry {
    pub fn from_candidate(candidate: &Candidate) -> Self {
        Self {
            path: candidate.entry.relative_path.clone(),
            importance: candidate.score,
            tokens: candidate.tokens,
            size: candidate.entry.size_bytes,
            sha256: hash_content(&candidate.content),
        }
    }
}

#[derive(Serialize, Clone)]
pub struct ExcludedEntry {
    pub path: String,
    pub importance: u32,
    pub tokens: usize,
    pub size: u64,
    pub reason: String,
}

impl ExcludedEntry {
    pub fn from_candidate(candidate: &Candidate) -> Self {
        Self {
            path: candidate.entry.relative_path.clone(),
            importance: candidate.score,
            tokens: candidate.tokens,
            size: candidate.entry.size_bytes,
            reason: "token limit exceeded".to_string(),
        }
    }
}

impl FileReport {
    pub fn from_selection(
        project_name: &str,
        project_path: &str,
        tokenizer: &str,
        selection: &Selection,
        generated_at: DateTime<Local>,
    ) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            generated_at,
            project: ProjectInfo {
                name: project_name.to_string(),
                path: project_path.to_string(),
                tokenizer: tokenizer.to_string(),
            },
            stats: selection.stats(),
            selected_files: selection
                .files
                .iter()
                .map(SelectedEntry::from_candidate)
                .collect(),
            excluded_files: selection
                .rejected
                .iter()
                .map(ExcludedEntry::from_candidate)
                .collect(),
            skipped_files: selection.skipped.clone(),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// First 16 hex chars of the SHA-256 of `content`.
pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())[..16].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SkipReason;
    use crate::types::FileEntry;
    use std::path::PathBuf;

    fn candidate(path: &str, score: u32, tokens: usize) -> Candidate {
        Candidate {
            entry: FileEntry::new(PathBuf::from(path), path.to_string(), 12),
            content: format!("content of {}", path),
            score,
            tokens,
        }
    }

    #[test]
    fn test_hash_content() {
        let h1 = hash_content("hello");
        let h2 = hash_content("hello");
        let h3 = hash_content("world");

        assert_eq!(h1, h2);
        assert_ne!(h1, h3);
        assert_eq!(h1.len(), 16);
    }

    #[test]
    fn test_report_json() {
        let selection = Selection {
            files: vec![candidate("src/lib.rs", 30, 40)],
            rejected: vec![candidate("big.rs", 10, 500)],
            skipped: vec![SkippedFile {
                relative_path: "logo.bin".to_string(),
                reason: SkipReason::Binary,
            }],
            ignored: 4,
            token_budget: 100,
            reserved_tokens: 0,
            tokens_used: 40,
        };

        let report = FileReport::from_selection("demo", "/tmp/demo", "heuristic", &selection, Local::now());
        let value: serde_json::Value = serde_json::from_str(&report.to_json()).unwrap();

        assert_eq!(value["project"]["name"], "demo");
        assert_eq!(value["stats"]["files_scanned"], 3);
        assert_eq!(value["stats"]["entries_ignored"], 4);
        assert_eq!(value["selected_files"][0]["path"], "src/lib.rs");
        assert_eq!(value["selected_files"][0]["sha256"].as_str().unwrap().len(), 16);
        assert_eq!(value["excluded_files"][0]["reason"], "token limit exceeded");
        assert_eq!(value["skipped_files"][0]["reason"]["kind"], "binary");
    }
}
