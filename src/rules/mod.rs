mod ignore;
mod importance;

pub use ignore::{IgnoreRules, DEFAULT_IGNORE};
pub use importance::{
    ImportanceWeights, PathRule, DEFAULT_FILE_WEIGHT, DEFAULT_FORMAT_WEIGHT,
    DEFAULT_IMPORTANT_PATTERNS, DEFAULT_PATH_WEIGHT, DEFAULT_PATTERN_WEIGHT,
};

/// Yield the pattern lines of a rule file, skipping blanks and `#` comments.
pub fn pattern_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_lines() {
        let text = "# comment\n\n  *.log  \nbuild/\n   # indented comment\n";
        let lines: Vec<&str> = pattern_lines(text).collect();
        assert_eq!(lines, vec!["*.log", "build/"]);
    }
}
