use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal problems detected before any file is selected or written.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("project path does not exist: {0}")]
    RootNotFound(PathBuf),

    #[error("project path is not a directory: {0}")]
    RootNotDirectory(PathBuf),

    #[error("config file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("token budget must be a positive integer, got {0}")]
    NonPositiveBudget(i64),

    #[error("invalid weight `{value}` for `{entry}` in {key}")]
    InvalidWeight {
        key: String,
        entry: String,
        value: String,
    },

    #[error("unknown tokenizer `{0}` (expected tiktoken, heuristic or chars)")]
    UnknownTokenizer(String),
}

/// Why a walked file was left out of the selection without failing the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    /// Permission denied or any other I/O failure
    Unreadable(String),
    /// Contains NUL bytes
    Binary,
    /// Not valid UTF-8
    NotUtf8,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Unreadable(err) => write!(f, "unreadable: {}", err),
            SkipReason::Binary => write!(f, "binary content"),
            SkipReason::NotUtf8 => write!(f, "not valid UTF-8"),
        }
    }
}

/// A rule that could not be parsed as written and was degraded to literal matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatternWarning {
    pub pattern: String,
    pub message: String,
}

impl fmt::Display for PatternWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pattern `{}`: {}", self.pattern, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_reason_display() {
        assert_eq!(SkipReason::Binary.to_string(), "binary content");
        assert_eq!(
            SkipReason::Unreadable("permission denied".to_string()).to_string(),
            "unreadable: permission denied"
        );
    }

    #[test]
    fn test_config_error_messages() {
        let err = ConfigError::NonPositiveBudget(0);
        assert!(err.to_string().contains("positive"));

        let err = ConfigError::RootNotFound(PathBuf::from("/nope"));
        assert!(err.to_string().contains("/nope"));
    }
}
