//! Configuration types for authlint.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Top-level configuration for authlint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Analyzer configuration.
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    /// Names, module paths and files that define the conventions.
    #[serde(default)]
    pub conventions: ConventionsConfig,

    /// Per-rule configurations.
    #[serde(default)]
    pub rules: HashMap<String, RuleConfig>,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Checks if a rule is enabled.
    #[must_use]
    pub fn is_rule_enabled(&self, rule_name: &str) -> bool {
        self.rules
            .get(rule_name)
            .map_or(true, |c| c.enabled.unwrap_or(true))
    }

    /// Gets the severity override for a rule.
    #[must_use]
    pub fn rule_severity(&self, rule_name: &str) -> Option<crate::Severity> {
        self.rules.get(rule_name).and_then(|c| c.severity)
    }
}

/// Analyzer-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Root directory to analyze (default: current directory).
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Glob patterns to exclude from analysis.
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    /// Whether to respect .gitignore files.
    #[serde(default = "default_true")]
    pub respect_gitignore: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            exclude: default_exclude(),
            respect_gitignore: true,
        }
    }
}

/// A raw factory and the wrapper that must be used instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BannedCall {
    /// Raw factory name as exported by the generated server module.
    pub raw: String,
    /// Approved wrapper name.
    pub wrapper: String,
    /// Message identifier reported for direct calls of `raw`.
    pub message_id: String,
}

impl BannedCall {
    fn new(raw: &str, wrapper: &str, message_id: &str) -> Self {
        Self {
            raw: raw.to_string(),
            wrapper: wrapper.to_string(),
            message_id: message_id.to_string(),
        }
    }
}

/// The literal strings both rules match against.
///
/// There is no pattern language: module paths are compared for equality or
/// substring containment, file paths by suffix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConventionsConfig {
    /// Path suffix of the one file allowed to use raw factories and the
    /// identity lookup.
    pub exempt_file: String,
    /// Raw factories and their wrappers.
    pub banned: Vec<BannedCall>,
    /// Substrings identifying the generated server module.
    pub server_modules: Vec<String>,
    /// Exact module specifiers the wrappers are imported from.
    pub wrapper_modules: Vec<String>,
    /// Any module specifier containing this substring also provides wrappers.
    pub wrapper_module_substring: String,
    /// The forbidden `object.member.method` call, as three segments.
    pub forbidden_call: Vec<String>,
}

impl Default for ConventionsConfig {
    fn default() -> Self {
        Self {
            exempt_file: "convex/auth.ts".to_string(),
            banned: vec![
                BannedCall::new("query", "authenticatedQuery", "useAuthenticatedQuery"),
                BannedCall::new(
                    "mutation",
                    "authenticatedMutation",
                    "useAuthenticatedMutation",
                ),
            ],
            server_modules: vec!["_generated/server".to_string()],
            wrapper_modules: vec!["./auth".to_string(), "../auth".to_string()],
            wrapper_module_substring: "/auth".to_string(),
            forbidden_call: vec![
                "ctx".to_string(),
                "auth".to_string(),
                "getUserIdentity".to_string(),
            ],
        }
    }
}

impl ConventionsConfig {
    /// Names of the approved wrappers.
    pub fn wrapper_names(&self) -> impl Iterator<Item = &str> {
        self.banned.iter().map(|b| b.wrapper.as_str())
    }

    /// Returns an error describing the first unusable setting.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a required name is empty or the
    /// forbidden call does not have exactly three segments.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.forbidden_call.len() != 3 || self.forbidden_call.iter().any(String::is_empty) {
            return Err(ConfigError::Invalid(format!(
                "conventions.forbidden_call must have three non-empty segments, got {:?}",
                self.forbidden_call
            )));
        }
        for (i, b) in self.banned.iter().enumerate() {
            if b.raw.is_empty() || b.wrapper.is_empty() || b.message_id.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "conventions.banned[{i}]: raw, wrapper and message_id are required"
                )));
            }
        }
        Ok(())
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_exclude() -> Vec<String> {
    vec![
        "**/node_modules/**".to_string(),
        "**/_generated/**".to_string(),
    ]
}

fn default_true() -> bool {
    true
}

/// Per-rule configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Whether this rule is enabled.
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Severity override for this rule.
    #[serde(default)]
    pub severity: Option<crate::Severity>,
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },

    /// Config parsed but cannot be used.
    #[error("Invalid config: {0}")]
    Invalid(String),
}
