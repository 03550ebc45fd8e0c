//! Glob-like path patterns shared by ignore and importance rules.
//!
//! A pattern is resolved once at parse time into one of a few shapes:
//! - `Literal`: plain path segments, no wildcards (`README.md`, `src/main.rs`)
//! - `Glob`: segments with `*` / `?` that never cross a `/` (`*.py`, `docs/*.md`)
//! - `Recursive`: contains a `**` segment spanning zero or more directories
//! - `Substring`: a malformed pattern, matched as raw text inside the path
//!
//! Paths are compared as `/`-joined segments regardless of host OS.

use globset::{GlobBuilder, GlobMatcher};
use std::fmt;

use crate::error::PatternWarning;

const MISPLACED_RECURSIVE: &str = "`**` must be a whole path segment; matching as literal text";

#[derive(Debug, Clone)]
pub enum PatternKind {
    Empty,
    Literal(Vec<String>),
    Glob(GlobMatcher),
    Recursive(GlobMatcher),
    Substring(String),
}

#[derive(Debug, Clone)]
pub struct Pattern {
    raw: String,
    kind: PatternKind,
    dir_only: bool,
    anchored: bool,
    prefix: bool,
    degraded_reason: Option<String>,
}

impl Pattern {
    /// Parse a rule line. Never fails: malformed input degrades to substring matching.
    pub fn new(raw: &str) -> Self {
        let raw = raw.trim().to_string();
        let body = raw.replace('\\', "/");

        let dir_only = body.ends_with('/');
        let anchored = body.starts_with('/');
        let segments: Vec<&str> = body.split('/').filter(|s| !s.is_empty()).collect();
        let joined = segments.join("/");

        let mut degraded_reason = None;
        let kind = if segments.is_empty() {
            PatternKind::Empty
        } else if segments.iter().any(|s| s.contains("**") && *s != "**") {
            degraded_reason = Some(MISPLACED_RECURSIVE.to_string());
            PatternKind::Substring(joined)
        } else if segments.iter().any(|s| *s == "**") {
            match compile(&collapse_recursive(&segments)) {
                Ok(matcher) => PatternKind::Recursive(matcher),
                Err(e) => {
                    degraded_reason = Some(format!("{}; matching as literal text", e.kind()));
                    PatternKind::Substring(joined)
                }
            }
        } else if segments.iter().any(|s| has_wildcard(s)) {
            // unanchored globs match the trailing segments of a path
            let glob = if anchored {
                joined.clone()
            } else {
                format!("**/{}", joined)
            };
            match compile(&glob) {
                Ok(matcher) => PatternKind::Glob(matcher),
                Err(e) => {
                    degraded_reason = Some(format!("{}; matching as literal text", e.kind()));
                    PatternKind::Substring(joined)
                }
            }
        } else {
            PatternKind::Literal(segments.iter().map(|s| s.to_string()).collect())
        };

        Self {
            raw,
            kind,
            dir_only,
            anchored,
            prefix: false,
            degraded_reason,
        }
    }

    /// Parse a path rule: a wildcard-free entry also matches everything beneath it,
    /// with or without a trailing `/` (`src`, `docs/api`).
    pub fn path_prefix(raw: &str) -> Self {
        let mut pattern = Self::new(raw);
        pattern.prefix = matches!(pattern.kind, PatternKind::Literal(_));
        pattern
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn kind(&self) -> &PatternKind {
        &self.kind
    }

    /// Trailing `/`: only directories (and everything beneath them) match.
    pub fn is_dir_only(&self) -> bool {
        self.dir_only
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self.kind, PatternKind::Substring(_))
    }

    /// Warning describing why this pattern fell back to substring matching.
    pub fn warning(&self) -> Option<PatternWarning> {
        self.degraded_reason.as_ref().map(|message| PatternWarning {
            pattern: self.raw.clone(),
            message: message.clone(),
        })
    }

    /// Match a relative file path.
    pub fn matches(&self, relative_path: &str) -> bool {
        self.matches_entry(relative_path, false)
    }

    /// Match a relative path that is known to be a file or a directory.
    ///
    /// Directory-only patterns also match anything beneath a matching directory.
    pub fn matches_entry(&self, relative_path: &str, is_dir: bool) -> bool {
        let normalized = normalize_path(relative_path);
        let segments = split_segments(&normalized);
        self.matches_segments(&segments, is_dir)
    }

    pub fn matches_segments(&self, segments: &[&str], is_dir: bool) -> bool {
        if segments.is_empty() {
            return false;
        }

        let upto = if self.prefix || is_dir || !self.dir_only {
            segments.len()
        } else {
            segments.len() - 1
        };

        if self.dir_only || self.prefix {
            (1..=upto).any(|n| self.matches_exact(&segments[..n]))
        } else {
            self.matches_exact(segments)
        }
    }

    fn matches_exact(&self, segments: &[&str]) -> bool {
        match &self.kind {
            PatternKind::Empty => false,
            PatternKind::Substring(text) => segments.join("/").contains(text.as_str()),
            PatternKind::Literal(parts) => self.match_tail(parts, segments),
            PatternKind::Glob(matcher) | PatternKind::Recursive(matcher) => {
                matcher.is_match(segments.join("/"))
            }
        }
    }

    /// Unanchored literals match the trailing segments of the path.
    fn match_tail(&self, parts: &[String], segments: &[&str]) -> bool {
        if parts.len() > segments.len() {
            return false;
        }
        if self.anchored && parts.len() != segments.len() {
            return false;
        }
        let tail = &segments[segments.len() - parts.len()..];
        parts.iter().zip(tail.iter()).all(|(p, s)| p == s)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Convert host separators to `/` and drop a leading `./`.
pub fn normalize_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    path.strip_prefix("./").unwrap_or(&path).to_string()
}

pub fn split_segments(path: &str) -> Vec<&str> {
    path.split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect()
}

fn has_wildcard(segment: &str) -> bool {
    segment.contains('*') || segment.contains('?') || segment.contains('[')
}

/// `a/**/**/b` is the same as `a/**/b`.
fn collapse_recursive(segments: &[&str]) -> String {
    let mut out: Vec<&str> = Vec::with_capacity(segments.len());
    for s in segments {
        if *s == "**" && out.last() == Some(&"**") {
            continue;
        }
        out.push(s);
    }
    out.join("/")
}

fn compile(glob: &str) -> Result<GlobMatcher, globset::Error> {
    Ok(GlobBuilder::new(glob)
        .literal_separator(true)
        .backslash_escape(false)
        .build()?
        .compile_matcher())
}
