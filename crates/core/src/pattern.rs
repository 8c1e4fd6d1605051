// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event-name patterns used for dispatch.
//!
//! Four forms are supported:
//!
//! - `"a:b"` matches only `"a:b"`
//! - `"a:*"` matches any name with the literal prefix `"a:"`
//! - `"*:b"` matches any name whose last colon-segment equals `"b"`
//! - `"*"` matches every name (including the empty string)
//!
//! No other wildcard placement is valid; malformed patterns are rejected
//! at construction.

use crate::error::PatternError;
use std::fmt;
use std::str::FromStr;

/// A parsed event-name selector.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Pattern {
    /// Matches one name exactly.
    Exact(String),
    /// Matches names starting with the stored prefix (includes the colon).
    Prefix(String),
    /// Matches names whose last colon-segment equals the stored suffix.
    Suffix(String),
    /// Matches every name.
    Any,
}

impl Pattern {
    pub fn parse(raw: &str) -> Result<Self, PatternError> {
        if raw == "*" {
            return Ok(Pattern::Any);
        }
        if let Some(prefix) = raw.strip_suffix(":*") {
            if prefix.contains('*') {
                return Err(PatternError::Unsupported(raw.to_string()));
            }
            return Ok(Pattern::Prefix(format!("{prefix}:")));
        }
        if let Some(suffix) = raw.strip_prefix("*:") {
            if suffix.contains('*') {
                return Err(PatternError::Unsupported(raw.to_string()));
            }
            return Ok(Pattern::Suffix(suffix.to_string()));
        }
        if raw.contains('*') {
            return Err(PatternError::Unsupported(raw.to_string()));
        }
        Ok(Pattern::Exact(raw.to_string()))
    }

    pub fn matches(&self, name: &str) -> bool {
        match self {
            Pattern::Exact(exact) => exact == name,
            Pattern::Prefix(prefix) => name.starts_with(prefix.as_str()),
            Pattern::Suffix(suffix) => last_segment(name) == suffix,
            Pattern::Any => true,
        }
    }

    /// True when any pattern in `patterns` matches `name`.
    pub fn any_match(patterns: &[Pattern], name: &str) -> bool {
        patterns.iter().any(|p| p.matches(name))
    }
}

/// The segment after the final colon; the whole name when there is none.
fn last_segment(name: &str) -> &str {
    name.rsplit(':').next().unwrap_or(name)
}

/// All patterns matching `name`, in the order they were given.
pub fn find_matching<'p>(name: &str, patterns: &'p [Pattern]) -> Vec<&'p Pattern> {
    patterns.iter().filter(|p| p.matches(name)).collect()
}

impl FromStr for Pattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pattern::parse(s)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Exact(exact) => f.write_str(exact),
            Pattern::Prefix(prefix) => write!(f, "{prefix}*"),
            Pattern::Suffix(suffix) => write!(f, "*:{suffix}"),
            Pattern::Any => f.write_str("*"),
        }
    }
}

#[cfg(test)]
#[path = "pattern_tests.rs"]
mod tests;
