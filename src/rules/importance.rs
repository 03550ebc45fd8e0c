use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{ConfigError, PatternWarning};
use crate::pattern::Pattern;

use super::pattern_lines;

pub const DEFAULT_FORMAT_WEIGHT: u32 = 10;
pub const DEFAULT_FILE_WEIGHT: u32 = 20;
pub const DEFAULT_PATH_WEIGHT: u32 = 5;
pub const DEFAULT_PATTERN_WEIGHT: u32 = 15;

/// Patterns used when no important-files list exists.
pub const DEFAULT_IMPORTANT_PATTERNS: &str = r#"# Important files: one glob per line, prioritized during selection.
# `**` spans directories, `*` stays within one path segment.

# Configuration files
Cargo.toml
pyproject.toml
setup.py
package.json
.env.example

# Documentation
README.md
CONTRIBUTING.md
LICENSE
docs/*.md
docs/*.rst

# Entry points
main.py
main.rs
lib.rs
app.py
index.js
manage.py

# Core functionality
src/core/*.py
src/utils/*.py
src/api/*.py
src/models/*.py
lib/*.py
lib/*.js
"#;

/// A path or glob rule with the weight it contributes when it matches.
#[derive(Debug, Clone)]
pub struct PathRule {
    pub pattern: Pattern,
    pub weight: u32,
}

/// Additive importance signals: base + format + filename + best path rule.
#[derive(Debug, Clone, Default)]
pub struct ImportanceWeights {
    pub base: u32,
    formats: HashMap<String, u32>,
    files: HashMap<String, u32>,
    paths: Vec<PathRule>,
    warnings: Vec<PatternWarning>,
}

impl ImportanceWeights {
    pub fn new(base: u32) -> Self {
        Self {
            base,
            ..Self::default()
        }
    }

    /// Register an extension, with or without the leading dot.
    pub fn add_format(&mut self, extension: &str, weight: u32) {
        let ext = normalize_extension(extension);
        if !ext.is_empty() {
            self.formats.insert(ext, weight);
        }
    }

    pub fn add_file(&mut self, file_name: &str, weight: u32) {
        let name = file_name.trim();
        if !name.is_empty() {
            self.files.insert(name.to_string(), weight);
        }
    }

    /// Add a glob rule from the important-files list.
    pub fn add_path(&mut self, raw: &str, weight: u32) {
        self.push_rule(Pattern::new(raw), weight);
    }

    /// Add an `important_paths` entry; plain paths match as prefixes (`src`, `docs/api`).
    pub fn add_path_prefix(&mut self, raw: &str, weight: u32) {
        self.push_rule(Pattern::path_prefix(raw), weight);
    }

    fn push_rule(&mut self, pattern: Pattern, weight: u32) {
        if let Some(warning) = pattern.warning() {
            tracing::warn!(pattern = %warning.pattern, "{}", warning.message);
            self.warnings.push(warning);
        }
        self.paths.push(PathRule { pattern, weight });
    }

    /// Parse a comma-separated `important_formats` value.
    pub fn parse_formats(&mut self, list: &str, default_weight: u32) -> Result<(), ConfigError> {
        for (entry, weight) in parse_weighted_list("important_formats", list, default_weight)? {
            self.add_format(&entry, weight);
        }
        Ok(())
    }

    /// Parse a comma-separated `important_files` value.
    pub fn parse_files(&mut self, list: &str, default_weight: u32) -> Result<(), ConfigError> {
        for (entry, weight) in parse_weighted_list("important_files", list, default_weight)? {
            self.add_file(&entry, weight);
        }
        Ok(())
    }

    /// Parse a comma-separated `important_paths` value.
    pub fn parse_paths(&mut self, list: &str, default_weight: u32) -> Result<(), ConfigError> {
        for (entry, weight) in parse_weighted_list("important_paths", list, default_weight)? {
            self.add_path_prefix(&entry, weight);
        }
        Ok(())
    }

    /// Parse an important-files list: one pattern per line, `#` comments.
    pub fn parse_pattern_list(&mut self, text: &str, default_weight: u32) -> Result<(), ConfigError> {
        for line in pattern_lines(text) {
            let (entry, weight) = split_weight("important_files_path", line, default_weight)?;
            self.add_path(&entry, weight);
        }
        Ok(())
    }

    /// Load an important-files list, using the built-in list when the file is absent.
    pub fn load_pattern_list(&mut self, path: &Path, default_weight: u32) -> Result<(), ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "important files list not found, using defaults");
            return self.parse_pattern_list(DEFAULT_IMPORTANT_PATTERNS, default_weight);
        }

        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse_pattern_list(&text, default_weight)
    }

    pub fn format_weight(&self, extension: Option<&str>) -> u32 {
        extension
            .map(normalize_extension)
            .and_then(|ext| self.formats.get(&ext).copied())
            .unwrap_or(0)
    }

    pub fn file_weight(&self, file_name: &str) -> u32 {
        self.files.get(file_name).copied().unwrap_or(0)
    }

    /// Highest weight among the path rules matching `relative_path`.
    pub fn path_weight(&self, relative_path: &str) -> u32 {
        self.paths
            .iter()
            .filter(|rule| rule.pattern.matches(relative_path))
            .map(|rule| rule.weight)
            .max()
            .unwrap_or(0)
    }

    pub fn path_rules(&self) -> &[PathRule] {
        &self.paths
    }

    pub fn warnings(&self) -> &[PatternWarning] {
        &self.warnings
    }
}

fn normalize_extension(extension: &str) -> String {
    extension.trim().trim_start_matches('.').to_lowercase()
}

/// Split `a, b:30, c` into entries with weights, applying `default_weight` where absent.
fn parse_weighted_list(
    key: &str,
    list: &str,
    default_weight: u32,
) -> Result<Vec<(String, u32)>, ConfigError> {
    list.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| split_weight(key, entry, default_weight))
        .collect()
}

/// A trailing `:<integer>` overrides the weight; anything else after `:` is part of the pattern.
fn split_weight(key: &str, entry: &str, default_weight: u32) -> Result<(String, u32), ConfigError> {
    if let Some((name, suffix)) = entry.rsplit_once(':') {
        let suffix = suffix.trim();
        if let Ok(value) = suffix.parse::<i64>() {
            let weight = u32::try_from(value).map_err(|_| ConfigError::InvalidWeight {
                key: key.to_string(),
                entry: name.trim().to_string(),
                value: suffix.to_string(),
            })?;
            return Ok((name.trim().to_string(), weight));
        }
    }
    Ok((entry.to_string(), default_weight))
}
