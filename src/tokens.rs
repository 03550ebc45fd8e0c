//! Token estimation behind one interchangeable contract.
//!
//! Every estimator is offline. `heuristic` (the default) and `chars` are monotonic:
//! adding text never lowers the estimate. `tiktoken` is the exact `cl100k_base`
//! length, which can drop by a token when an appended character completes a merge,
//! so it is opt-in.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tiktoken_rs::CoreBPE;

use crate::error::ConfigError;

static WORD_OR_SYMBOL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+|[^\w\s]").unwrap());
static SYMBOL: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").unwrap());

pub trait TokenEstimator: Send + Sync {
    fn estimate(&self, text: &str) -> usize;
    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenizerKind {
    Tiktoken,
    #[default]
    Heuristic,
    Chars,
}

impl TokenizerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenizerKind::Tiktoken => "tiktoken",
            TokenizerKind::Heuristic => "heuristic",
            TokenizerKind::Chars => "chars",
        }
    }
}

impl fmt::Display for TokenizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenizerKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tiktoken" => Ok(TokenizerKind::Tiktoken),
            "heuristic" => Ok(TokenizerKind::Heuristic),
            "chars" => Ok(TokenizerKind::Chars),
            other => Err(ConfigError::UnknownTokenizer(other.to_string())),
        }
    }
}

/// Word runs and punctuation, plus a surcharge for code fences and symbol-heavy text.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicEstimator;

impl TokenEstimator for HeuristicEstimator {
    fn estimate(&self, text: &str) -> usize {
        let tokens = WORD_OR_SYMBOL.find_iter(text).count();
        let code_fences = text.matches("```").count();
        let symbols = SYMBOL.find_iter(text).count();
        tokens + code_fences + symbols / 2
    }

    fn name(&self) -> &'static str {
        "heuristic"
    }
}

/// Fixed characters-per-token ratio (1 token ~ 4 chars by default).
#[derive(Debug, Clone, Copy)]
pub struct CharRatioEstimator {
    chars_per_token: usize,
}

impl Default for CharRatioEstimator {
    fn default() -> Self {
        Self::new(4)
    }
}

impl CharRatioEstimator {
    pub fn new(chars_per_token: usize) -> Self {
        Self {
            chars_per_token: chars_per_token.max(1),
        }
    }
}

impl TokenEstimator for CharRatioEstimator {
    fn estimate(&self, text: &str) -> usize {
        text.chars().count().div_ceil(self.chars_per_token)
    }

    fn name(&self) -> &'static str {
        "chars"
    }
}

/// Exact BPE token count using the `cl100k_base` encoding. Not monotonic under appending.
pub struct TiktokenEstimator {
    bpe: CoreBPE,
}

impl TiktokenEstimator {
    pub fn new() -> anyhow::Result<Self> {
        let bpe = tiktoken_rs::cl100k_base()?;
        Ok(Self { bpe })
    }
}

impl TokenEstimator for TiktokenEstimator {
    fn estimate(&self, text: &str) -> usize {
        self.bpe.encode_ordinary(text).len()
    }

    fn name(&self) -> &'static str {
        "tiktoken"
    }
}

/// Build the configured estimator; tiktoken falls back to the heuristic if its encoding is unavailable.
pub fn create_estimator(kind: TokenizerKind) -> Box<dyn TokenEstimator> {
    match kind {
        TokenizerKind::Tiktoken => match TiktokenEstimator::new() {
            Ok(estimator) => Box::new(estimator),
            Err(e) => {
                tracing::warn!(error = %e, "tiktoken unavailable, falling back to heuristic estimator");
                Box::new(HeuristicEstimator)
            }
        },
        TokenizerKind::Heuristic => Box::new(HeuristicEstimator),
        TokenizerKind::Chars => Box::new(CharRatioEstimator::default()),
    }
}

/// Tokens needed to list the given paths, one per line.
pub fn estimate_listing_tokens<'a, I>(estimator: &dyn TokenEstimator, paths: I) -> usize
where
    I: IntoIterator<Item = &'a str>,
{
    let mut listing = String::new();
    for path in paths {
        listing.push_str(path);
        listing.push('\n');
    }
    estimator.estimate(&listing)
}
