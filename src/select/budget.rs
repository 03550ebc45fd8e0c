use crate::types::Candidate;

/// Token allowance for one run. `used + reserved` never exceeds `limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Budget {
    limit: usize,
    reserved: usize,
    used: usize,
}

impl Budget {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            reserved: 0,
            used: 0,
        }
    }

    /// Set aside tokens before admission starts, clamped to what is left.
    pub fn reserve(&mut self, tokens: usize) {
        self.reserved += tokens.min(self.remaining());
    }

    pub fn remaining(&self) -> usize {
        self.limit - self.reserved - self.used
    }

    /// Admit `tokens` if they fit whole; a file is never split.
    pub fn try_admit(&mut self, tokens: usize) -> bool {
        if tokens <= self.remaining() {
            self.used += tokens;
            true
        } else {
            false
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn reserved(&self) -> usize {
        self.reserved
    }

    pub fn used(&self) -> usize {
        self.used
    }
}

pub struct BudgetResult {
    pub admitted: Vec<Candidate>,
    pub rejected: Vec<Candidate>,
    pub budget: Budget,
}

/// Greedy best-effort fit over the ranked list.
///
/// A candidate that does not fit is skipped and evaluation continues, so smaller
/// lower-ranked files can still use the remaining budget.
pub fn apply_budget(ranked: Vec<Candidate>, mut budget: Budget) -> BudgetResult {
    let mut admitted = Vec::new();
    let mut rejected = Vec::new();

    for candidate in ranked {
        if budget.try_admit(candidate.tokens) {
            tracing::trace!(
                path = %candidate.relative_path(),
                tokens = candidate.tokens,
                remaining = budget.remaining(),
                "admitted"
            );
            admitted.push(candidate);
        } else {
            tracing::debug!(
                path = %candidate.relative_path(),
                tokens = candidate.tokens,
                remaining = budget.remaining(),
                "does not fit in remaining budget"
            );
            rejected.push(candidate);
        }
    }

    BudgetResult {
        admitted,
        rejected,
        budget,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FileEntry;
    use std::path::PathBuf;

    fn candidate(path: &str, score: u32, tokens: usize) -> Candidate {
        Candidate {
            entry: FileEntry::new(PathBuf::from(path), path.to_string(), 0),
            content: String::new(),
            score,
            tokens,
        }
    }

    fn paths(list: &[Candidate]) -> Vec<&str> {
        list.iter().map(|c| c.relative_path()).collect()
    }

    #[test]
    fn test_skip_and_continue_past_blocking_file() {
        let ranked = vec![
            candidate("big.py", 10, 100),
            candidate("mid.py", 8, 40),
            candidate("small.py", 5, 30),
        ];

        let result = apply_budget(ranked, Budget::new(60));

        assert_eq!(paths(&result.admitted), vec!["mid.py"]);
        assert_eq!(paths(&result.rejected), vec!["big.py", "small.py"]);
        assert_eq!(result.budget.remaining(), 20);
        assert_eq!(result.budget.used(), 40);
    }

    #[test]
    fn test_smaller_lower_ranked_file_fills_gap() {
        let ranked = vec![
            candidate("a", 9, 50),
            candidate("b", 8, 30),
            candidate("c", 7, 10),
        ];

        let result = apply_budget(ranked, Budget::new(60));
        assert_eq!(paths(&result.admitted), vec!["a", "c"]);
        assert_eq!(result.budget.remaining(), 0);
    }

    #[test]
    fn test_file_larger_than_budget_never_admitted() {
        let result = apply_budget(vec![candidate("huge", 100, 61)], Budget::new(60));
        assert!(result.admitted.is_empty());
        assert_eq!(result.budget.remaining(), 60);
    }

    #[test]
    fn test_exact_fit() {
        let result = apply_budget(vec![candidate("x", 1, 60)], Budget::new(60));
        assert_eq!(result.admitted.len(), 1);
        assert_eq!(result.budget.remaining(), 0);
    }

    #[test]
    fn test_reserve_clamped() {
        let mut budget = Budget::new(10);
        budget.reserve(4);
        assert_eq!(budget.remaining(), 6);
        budget.reserve(100);
        assert_eq!(budget.reserved(), 10);
        assert_eq!(budget.remaining(), 0);
        assert!(budget.try_admit(0));
        assert!(!budget.try_admit(1));
    }
}
