//! File selection: walk, filter, score, rank and fit into the token budget.
//!
//! The walk and file reads happen first; ranking and admission then run as a
//! single sequential pass over the fully materialized candidate list.

mod budget;
mod scorer;

pub use budget::{apply_budget, Budget, BudgetResult};
pub use scorer::{ScoreBreakdown, Scorer};

use std::cmp::Ordering;
use std::path::Path;

use crate::error::ConfigError;
use crate::rules::{IgnoreRules, ImportanceWeights};
use crate::scan::{read_text, scan_directory, ScanOptions};
use crate::tokens::{estimate_listing_tokens, TokenEstimator};
use crate::types::{Candidate, Selection, SkippedFile};

/// Default token allowance when none is configured.
pub const DEFAULT_TOKEN_BUDGET: usize = 60_000;

pub struct Selector {
    ignore: IgnoreRules,
    scorer: Scorer,
    estimator: Box<dyn TokenEstimator>,
    token_budget: usize,
    scan_options: ScanOptions,
    reserve_structure_tokens: bool,
}

impl Selector {
    pub fn new(
        ignore: IgnoreRules,
        weights: ImportanceWeights,
        estimator: Box<dyn TokenEstimator>,
        token_budget: usize,
    ) -> Result<Self, ConfigError> {
        if token_budget == 0 {
            return Err(ConfigError::NonPositiveBudget(0));
        }

        Ok(Self {
            ignore,
            scorer: Scorer::new(weights),
            estimator,
            token_budget,
            scan_options: ScanOptions::default(),
            reserve_structure_tokens: false,
        })
    }

    pub fn with_scan_options(mut self, options: ScanOptions) -> Self {
        self.scan_options = options;
        self
    }

    /// Reserve the tokens of a newline-joined path listing before admitting files.
    pub fn with_structure_reserve(mut self, enabled: bool) -> Self {
        self.reserve_structure_tokens = enabled;
        self
    }

    pub fn scorer(&self) -> &Scorer {
        &self.scorer
    }

    pub fn estimator(&self) -> &dyn TokenEstimator {
        self.estimator.as_ref()
    }

    pub fn select(&self, root: &Path) -> Result<Selection, ConfigError> {
        validate_root(root)?;

        let scan = scan_directory(root, &self.ignore, self.scan_options);
        let mut skipped = scan.errors;
        let mut candidates = Vec::with_capacity(scan.files.len());

        for entry in scan.files {
            let content = match read_text(&entry.path) {
                Ok(content) => content,
                Err(reason) => {
                    tracing::debug!(path = %entry.relative_path, %reason, "skipping file");
                    skipped.push(SkippedFile {
                        relative_path: entry.relative_path,
                        reason,
                    });
                    continue;
                }
            };

            let score = self
                .scorer
                .score(&entry.relative_path, entry.extension.as_deref());
            let tokens = self.estimator.estimate(&content);

            candidates.push(Candidate {
                entry,
                content,
                score,
                tokens,
            });
        }

        rank_candidates(&mut candidates);

        let mut budget = Budget::new(self.token_budget);
        if self.reserve_structure_tokens {
            let listing = estimate_listing_tokens(
                self.estimator.as_ref(),
                candidates.iter().map(|c| c.relative_path()),
            );
            budget.reserve(listing);
        }

        let result = apply_budget(candidates, budget);

        tracing::info!(
            selected = result.admitted.len(),
            rejected = result.rejected.len(),
            skipped = skipped.len(),
            ignored = scan.ignored,
            tokens = result.budget.used(),
            budget = self.token_budget,
            estimator = self.estimator.name(),
            "selection complete"
        );

        Ok(Selection {
            files: result.admitted,
            rejected: result.rejected,
            skipped,
            ignored: scan.ignored,
            token_budget: result.budget.limit(),
            reserved_tokens: result.budget.reserved(),
            tokens_used: result.budget.used(),
        })
    }
}

/// The project root must exist and be a directory.
pub fn validate_root(root: &Path) -> Result<(), ConfigError> {
    if !root.exists() {
        return Err(ConfigError::RootNotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(ConfigError::RootNotDirectory(root.to_path_buf()));
    }
    Ok(())
}

/// Score descending, then shallower depth, then lexical path.
pub fn rank_order(a: &Candidate, b: &Candidate) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| a.entry.depth.cmp(&b.entry.depth))
        .then_with(|| a.relative_path().cmp(b.relative_path()))
}

pub fn rank_candidates(candidates: &mut [Candidate]) {
    candidates.sort_by(rank_order);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::{CharRatioEstimator, HeuristicEstimator};
    use crate::types::FileEntry;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn candidate(path: &str, score: u32) -> Candidate {
        Candidate {
            entry: FileEntry::new(PathBuf::from(path), path.to_string(), 0),
            content: String::new(),
            score,
            tokens: 1,
        }
    }

    fn weights() -> ImportanceWeights {
        let mut weights = ImportanceWeights::new(0);
        weights.parse_formats(".py,.md", 10).unwrap();
        weights.parse_files("README.md", 20).unwrap();
        weights.parse_paths("src/", 5).unwrap();
        weights
    }

    fn selector(ignore: &str, budget: usize) -> Selector {
        Selector::new(
            IgnoreRules::parse(ignore),
            weights(),
            Box::new(CharRatioEstimator::new(1)),
            budget,
        )
        .unwrap()
    }

    fn selected(selection: &Selection) -> Vec<&str> {
        selection.files.iter().map(|c| c.relative_path()).collect()
    }

    #[test]
    fn test_rank_total_order() {
        let mut list = vec![
            candidate("z.txt", 5),
            candidate("a/b/deep.py", 10),
            candidate("b.py", 10),
            candidate("a.py", 10),
            candidate("a/top.py", 10),
        ];
        rank_candidates(&mut list);

        let order: Vec<&str> = list.iter().map(|c| c.relative_path()).collect();
        assert_eq!(order, vec!["a.py", "b.py", "a/top.py", "a/b/deep.py", "z.txt"]);

        let mut again = list.clone();
        rank_candidates(&mut again);
        let order_again: Vec<&str> = again.iter().map(|c| c.relative_path()).collect();
        assert_eq!(order, order_again);
    }

    #[test]
    fn test_zero_budget_rejected() {
        let result = Selector::new(
            IgnoreRules::new(),
            ImportanceWeights::default(),
            Box::new(HeuristicEstimator),
            0,
        );
        assert!(matches!(result, Err(ConfigError::NonPositiveBudget(0))));
    }

    #[test]
    fn test_missing_root() {
        let dir = TempDir::new().unwrap();
        let err = selector("", 100).select(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, ConfigError::RootNotFound(_)));
    }

    #[test]
    fn test_root_is_file() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "file.txt", "x");
        let err = selector("", 100).select(&dir.path().join("file.txt")).unwrap_err();
        assert!(matches!(err, ConfigError::RootNotDirectory(_)));
    }

    #[test]
    fn test_select_ranks_and_fits() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "README.md", "0123456789");
        write(dir.path(), "src/app.py", "01234567890123456789");
        write(dir.path(), "notes.txt", "0123456789x");
        write(dir.path(), "huge.py", &"x".repeat(500));

        let selection = selector("", 40).select(dir.path()).unwrap();

        // README 30, src/app.py 15, huge.py 10 and notes.txt 0 no longer fit
        assert_eq!(selected(&selection), vec!["README.md", "src/app.py"]);
        assert_eq!(selection.tokens_used, 30);
        assert_eq!(selection.rejected.len(), 2);
        assert!(selection.tokens_used <= selection.token_budget);
    }

    #[test]
    fn test_ignore_takes_precedence_over_importance() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "vendor/README.md", "vendored");
        write(dir.path(), "secret.py", "key");
        write(dir.path(), "main.py", "print()");

        let selection = selector("vendor/\nsecret.py\n", 1000)
            .select(dir.path())
            .unwrap();

        assert_eq!(selected(&selection), vec!["main.py"]);
        assert_eq!(selection.ignored, 2);
        assert!(selection
            .files
            .iter()
            .all(|c| !c.relative_path().starts_with("vendor/")));
    }

    #[test]
    fn test_binary_files_skipped_not_fatal() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "main.py", "print()");
        fs::write(dir.path().join("blob.dat"), [1u8, 0, 2, 3]).unwrap();

        let selection = selector("", 1000).select(dir.path()).unwrap();
        assert_eq!(selected(&selection), vec!["main.py"]);
        assert_eq!(selection.skipped.len(), 1);
        assert_eq!(selection.skipped[0].relative_path, "blob.dat");
    }

    #[test]
    fn test_rerun_is_identical() {
        let dir = TempDir::new().unwrap();
        for i in 0..6 {
            write(dir.path(), &format!("pkg{}/mod.py", i % 2), &"y".repeat(i));
            write(dir.path(), &format!("f{}.txt", i), "same");
        }

        let sel = selector("", 20);
        let first = sel.select(dir.path()).unwrap();
        let second = sel.select(dir.path()).unwrap();
        assert_eq!(selected(&first), selected(&second));
    }

    #[test]
    fn test_structure_reserve() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.txt", "0123456789");

        let plain = selector("", 12).select(dir.path()).unwrap();
        assert_eq!(plain.files.len(), 1);
        assert_eq!(plain.reserved_tokens, 0);

        // "a.txt\n" costs 6 tokens at one char per token
        let reserving = selector("", 12)
            .with_structure_reserve(true)
            .select(dir.path())
            .unwrap();
        assert_eq!(reserving.reserved_tokens, 6);
        assert!(reserving.files.is_empty());
        assert_eq!(reserving.rejected.len(), 1);
    }
}
