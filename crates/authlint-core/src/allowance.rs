//! Comment-based allowance directives.
//!
//! Supports directives like:
//! ```text
//! // authlint: allow(no-raw-convex-function) reason="internal migration script"
//! ```
//!
//! A directive applies to the line it is written on (trailing comment) and to
//! the line directly below it.

use std::collections::{HashMap, HashSet};

const MARKER: &str = "authlint:";

/// Result of checking for an allow directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowCheck {
    /// Rule is not allowed.
    Denied,
    /// Rule is allowed with optional reason.
    Allowed {
        /// The reason provided (if any).
        reason: Option<String>,
    },
}

impl AllowCheck {
    /// Returns true if allowed.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }

    /// Returns the reason if allowed.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Allowed { reason } => reason.as_deref(),
            Self::Denied => None,
        }
    }
}

/// Parsed allowance directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowDirective {
    /// Rule names that are allowed; `all` allows every rule.
    pub rules: HashSet<String>,
    /// Optional reason for the allowance.
    pub reason: Option<String>,
}

impl AllowDirective {
    fn covers(&self, rule_name: &str) -> bool {
        self.rules.contains(rule_name) || self.rules.contains("all")
    }
}

/// All directives of one file, indexed by 1-indexed line.
#[derive(Debug, Default)]
pub struct AllowDirectives {
    by_line: HashMap<usize, AllowDirective>,
}

impl AllowDirectives {
    /// Scans `content` for directives.
    #[must_use]
    pub fn scan(content: &str) -> Self {
        let by_line = content
            .lines()
            .enumerate()
            .filter_map(|(i, line)| parse_allow_directive(line).map(|d| (i + 1, d)))
            .collect();
        Self { by_line }
    }

    /// Returns true if the file has no directives.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_line.is_empty()
    }

    /// Checks whether `rule_name` is allowed at `line` (1-indexed).
    #[must_use]
    pub fn check(&self, line: usize, rule_name: &str) -> AllowCheck {
        for candidate in [line, line.saturating_sub(1)] {
            if let Some(directive) = self.by_line.get(&candidate) {
                if directive.covers(rule_name) {
                    return AllowCheck::Allowed {
                        reason: directive.reason.clone(),
                    };
                }
            }
        }
        AllowCheck::Denied
    }
}

/// Parses an allowance directive from a source line.
fn parse_allow_directive(line: &str) -> Option<AllowDirective> {
    line.match_indices(MARKER)
        .filter(|(at, _)| opens_comment(&line[..*at]))
        .find_map(|(at, _)| parse_directive_body(&line[at + MARKER.len()..]))
}

/// Returns true if `before` ends with `//`, `/*` or `/**`, ignoring spaces.
fn opens_comment(before: &str) -> bool {
    let before = before.trim_end();
    let without_stars = before.trim_end_matches('*');
    if without_stars.len() < before.len() {
        without_stars.ends_with('/')
    } else {
        before.ends_with("//")
    }
}

/// Parses `allow(...) reason="..."` following the marker.
fn parse_directive_body(body: &str) -> Option<AllowDirective> {
    let allow_content = body.trim().strip_prefix("allow(")?.trim();

    let paren_end = allow_content.find(')')?;
    let rules: HashSet<String> = allow_content[..paren_end]
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if rules.is_empty() {
        return None;
    }

    let rest = allow_content[paren_end + 1..].trim();
    let reason = rest
        .strip_prefix("reason=")
        .map(str::trim)
        .and_then(|r| r.strip_prefix('"'))
        .and_then(|r| r.find('"').map(|end| r[..end].to_string()));

    Some(AllowDirective { rules, reason })
}
