use std::fs;
use std::path::Path;

use crate::error::{ConfigError, PatternWarning};
use crate::pattern::{normalize_path, split_segments, Pattern};

use super::pattern_lines;

/// Rules used when no ignore file exists.
pub const DEFAULT_IGNORE: &str = r#"# Directories to exclude (must end with '/')
.git/
.idea/
.vscode/
__pycache__/
venv/
.venv/
env/
node_modules/
target/
build/
dist/
tmp/
cache/
logs/
output/

# Files to exclude
*.pyc
*.pyo
*.pyd
.DS_Store
*.log
*.tmp
*.bak
*.swp
*.swo
.env
.env.*
*.class
*.jar
*.war
*.exe
*.dll
*.so
*.dylib
*.bin

# Large media files
*.jpg
*.jpeg
*.png
*.gif
*.webp
*.ico
*.mp3
*.mp4
*.avi
*.mov
*.mkv

# Large data files
*.csv
*.sqlite
*.db
*.parquet
*.tar
*.zip
*.gz
*.7z
*.rar
"#;

/// Ordered ignore rules: any match wins, and an ignored directory hides its subtree.
#[derive(Debug, Clone, Default)]
pub struct IgnoreRules {
    patterns: Vec<Pattern>,
    warnings: Vec<PatternWarning>,
}

impl IgnoreRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `.gitignore`-like text: one pattern per line, `#` comments.
    pub fn parse(text: &str) -> Self {
        Self::from_patterns(pattern_lines(text))
    }

    pub fn from_patterns<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut rules = Self::new();
        for raw in patterns {
            rules.push(raw.as_ref());
        }
        rules
    }

    pub fn defaults() -> Self {
        Self::parse(DEFAULT_IGNORE)
    }

    /// Load rules from a file, falling back to the built-in defaults when it is absent.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "ignore file not found, using defaults");
            return Ok(Self::defaults());
        }

        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&text))
    }

    pub fn with_pattern(mut self, raw: &str) -> Self {
        self.push(raw);
        self
    }

    fn push(&mut self, raw: &str) {
        let pattern = Pattern::new(raw);
        if let Some(warning) = pattern.warning() {
            tracing::warn!(pattern = %warning.pattern, "{}", warning.message);
            self.warnings.push(warning);
        }
        self.patterns.push(pattern);
    }

    /// True if the path or any of its ancestor directories is ignored.
    pub fn is_ignored(&self, path: &str, is_dir: bool) -> bool {
        let normalized = normalize_path(path);
        let segments = split_segments(&normalized);

        (1..=segments.len()).any(|n| {
            let entry_is_dir = n < segments.len() || is_dir;
            self.matches_segments(&segments[..n], entry_is_dir)
        })
    }

    /// Match only the entry itself, assuming its ancestors were already admitted.
    ///
    /// The walker uses this to prune ignored directories before descending.
    pub fn matches_entry(&self, path: &str, is_dir: bool) -> bool {
        let normalized = normalize_path(path);
        let segments = split_segments(&normalized);
        self.matches_segments(&segments, is_dir)
    }

    fn matches_segments(&self, segments: &[&str], is_dir: bool) -> bool {
        self.patterns
            .iter()
            .any(|p| p.matches_segments(segments, is_dir))
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn warnings(&self) -> &[PatternWarning] {
        &self.warnings
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
