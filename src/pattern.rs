//! Glob pattern filter deciding which keys are in scope.
//!
//! A [`Scope`] is an ordered pattern list plus matching options, compiled
//! once at construction. [`Scope::is_match`] is a pure predicate: same key,
//! same patterns, same options, same answer. An empty pattern list matches
//! nothing.
//!
//! Patterns are evaluated in order. A positive pattern admits a key; a
//! later `!`-prefixed pattern revokes it, so `["**", "!secret/**"]` scopes
//! to everything except the `secret/` subtree.

use glob::Pattern;
use serde::{Deserialize, Serialize};

use crate::errors::ScopeError;

/// Matching options, passed to the underlying matcher.
///
/// Both flags default to off: dotted keys are only matched by patterns that
/// spell the leading dot, and `**` spans path segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchOptions {
    /// When set, patterns without an explicit leading dot also match keys
    /// beginning with a dot.
    pub dot: bool,
    /// When set, `**` is treated as a plain `*` (single segment) instead of
    /// matching across segment boundaries.
    pub noglobstar: bool,
}

#[derive(Debug, Clone)]
struct CompiledPattern {
    pattern: Pattern,
    negated: bool,
}

/// An ordered glob pattern set with its matching options.
///
/// Immutable after construction; shared by reference with every view it
/// scopes.
#[derive(Debug, Clone)]
pub struct Scope {
    raw: Vec<String>,
    compiled: Vec<CompiledPattern>,
    options: MatchOptions,
}

impl Scope {
    /// Compile a pattern list. A malformed pattern fails here, never at
    /// match time.
    pub fn new<I>(patterns: I, options: MatchOptions) -> Result<Self, ScopeError>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let raw: Vec<String> = patterns.into_iter().map(Into::into).collect();
        let mut compiled = Vec::with_capacity(raw.len());
        for spec in &raw {
            let (negated, body) = match spec.strip_prefix('!') {
                Some(rest) => (true, rest),
                None => (false, spec.as_str()),
            };
            let body = if options.noglobstar {
                collapse_globstar(body)
            } else {
                body.to_string()
            };
            let pattern =
                Pattern::new(&body).map_err(|source| ScopeError::InvalidPattern {
                    pattern: spec.clone(),
                    source,
                })?;
            compiled.push(CompiledPattern { pattern, negated });
        }
        Ok(Self {
            raw,
            compiled,
            options,
        })
    }

    /// A scope that matches nothing.
    pub fn empty() -> Self {
        Self {
            raw: Vec::new(),
            compiled: Vec::new(),
            options: MatchOptions::default(),
        }
    }

    /// Whether `key` is in scope.
    pub fn is_match(&self, key: &str) -> bool {
        // `*` is always single-segment; `**` handling and dotted-key
        // suppression come from the options.
        let glob_opts = glob::MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: !self.options.dot,
        };
        let mut matched = false;
        for cp in &self.compiled {
            if cp.negated {
                if matched && cp.pattern.matches_with(key, glob_opts) {
                    matched = false;
                }
            } else if !matched && cp.pattern.matches_with(key, glob_opts) {
                matched = true;
            }
        }
        matched
    }

    /// The pattern list as supplied, including `!` prefixes.
    pub fn patterns(&self) -> &[String] {
        &self.raw
    }

    /// The options this scope was compiled with.
    pub fn options(&self) -> MatchOptions {
        self.options
    }
}

/// Rewrite each `**` segment to `*` so globstars stop spanning segments.
fn collapse_globstar(pattern: &str) -> String {
    pattern
        .split('/')
        .map(|seg| if seg == "**" { "*" } else { seg })
        .collect::<Vec<_>>()
        .join("/")
}
