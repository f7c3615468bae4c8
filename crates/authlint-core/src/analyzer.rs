//! Core analyzer for orchestrating lint execution.

use crate::allowance::AllowDirectives;
use crate::config::Config;
use crate::context::FileContext;
use crate::rule::{Rule, RuleBox};
use crate::syntax::{NodeKind, ParsedFile, ParseError};
use crate::traverse::{self, Subscriber};
use crate::types::{LintResult, Severity, Suggestion, Violation};

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// File extensions analyzed by default.
pub const SOURCE_EXTENSIONS: &[&str] = &["ts", "tsx", "mts", "cts", "js", "jsx"];

/// Errors that can occur during analysis.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// IO error reading files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error walking the source tree.
    #[error("Walk error: {0}")]
    Walk(#[from] ignore::Error),

    /// Error parsing a source file.
    #[error("Parse error in {path}: {source}")]
    Parse {
        /// Path to the file that failed to parse.
        path: PathBuf,
        /// Underlying parser error.
        source: ParseError,
    },

    /// Glob pattern error.
    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

/// Builder for configuring an [`Analyzer`].
#[derive(Default)]
pub struct AnalyzerBuilder {
    root: Option<PathBuf>,
    rules: Vec<RuleBox>,
    exclude_patterns: Vec<String>,
    config: Option<Config>,
    fail_on_parse_error: bool,
}

impl AnalyzerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the root directory to analyze.
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Adds a rule to the analyzer.
    #[must_use]
    pub fn rule<R: Rule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Adds a boxed rule to the analyzer.
    #[must_use]
    pub fn rule_box(mut self, rule: RuleBox) -> Self {
        self.rules.push(rule);
        self
    }

    /// Adds an exclude glob pattern.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets whether to fail on parse errors (default: false).
    #[must_use]
    pub fn fail_on_parse_error(mut self, fail: bool) -> Self {
        self.fail_on_parse_error = fail;
        self
    }

    /// Builds the analyzer.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be resolved, an
    /// exclude pattern is not a valid glob, or the conventions are invalid.
    pub fn build(self) -> Result<Analyzer, AnalyzerError> {
        let config = self.config.unwrap_or_default();
        config.conventions.validate()?;

        let root = self
            .root
            .unwrap_or_else(|| config.analyzer.root.clone());

        let root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()?.join(&root)
        };

        let mut exclude_patterns = self.exclude_patterns;
        exclude_patterns.extend(config.analyzer.exclude.iter().cloned());
        let exclude = exclude_patterns
            .iter()
            .map(|p| glob::Pattern::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Analyzer {
            root,
            rules: self.rules,
            exclude,
            config,
            fail_on_parse_error: self.fail_on_parse_error,
        })
    }
}

/// The main analyzer that orchestrates lint execution.
///
/// Use [`Analyzer::builder()`] to construct an instance.
pub struct Analyzer {
    root: PathBuf,
    rules: Vec<RuleBox>,
    exclude: Vec<glob::Pattern>,
    config: Config,
    fail_on_parse_error: bool,
}

impl Analyzer {
    /// Creates a new builder for configuring an analyzer.
    #[must_use]
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    /// Returns the root directory being analyzed.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the number of registered rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Maps each enabled rule name to the node kinds it observes.
    #[must_use]
    pub fn rule_interests(&self) -> BTreeMap<&'static str, &'static [NodeKind]> {
        self.enabled_rules()
            .map(|rule| (rule.name(), rule.interests()))
            .collect()
    }

    /// Analyzes all files under the root and returns the results.
    ///
    /// # Errors
    ///
    /// Returns an error if file discovery fails, a file cannot be read, or a
    /// file cannot be parsed while `fail_on_parse_error` is set.
    pub fn analyze(&self) -> Result<LintResult, AnalyzerError> {
        info!("Starting analysis at {:?}", self.root);

        let mut result = LintResult::new();
        let files = self.discover_files()?;

        info!("Found {} files to analyze", files.len());

        for file_path in &files {
            let content = std::fs::read_to_string(file_path)?;
            match self.check_source(file_path, &content) {
                Ok(violations) => {
                    result.violations.extend(violations);
                    result.files_checked += 1;
                }
                Err(AnalyzerError::Parse { path, source }) => {
                    warn!("Failed to parse {}: {}", path.display(), source);
                    if self.fail_on_parse_error {
                        return Err(AnalyzerError::Parse { path, source });
                    }
                }
                Err(e) => return Err(e),
            }
        }

        result.sort();

        info!(
            "Analysis complete: {} violations in {} files",
            result.violations.len(),
            result.files_checked
        );

        Ok(result)
    }

    /// Runs one file pass over `content` and returns its violations.
    ///
    /// Every enabled rule gets a freshly created check; nothing is carried
    /// over from previous calls. Violations of all rules are returned as one
    /// list in visitation order.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::Parse`] if no syntax tree can be produced.
    pub fn check_source(&self, path: &Path, content: &str) -> Result<Vec<Violation>, AnalyzerError> {
        debug!("Analyzing: {}", path.display());

        let ctx = FileContext::new(path, content, &self.root);
        let file = ParsedFile::parse(&ctx).map_err(|source| AnalyzerError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let mut active: Vec<&RuleBox> = Vec::new();
        let mut subscribers: Vec<Subscriber<'_>> = Vec::new();
        for rule in self.enabled_rules() {
            match rule.create(&ctx) {
                Some(check) => {
                    active.push(rule);
                    subscribers.push(Subscriber {
                        interests: rule.interests(),
                        check,
                    });
                }
                None => debug!("{} registers no handlers for {}", rule.name(), path.display()),
            }
        }

        if subscribers.is_empty() {
            return Ok(Vec::new());
        }

        let visited = traverse::walk(&file, &mut subscribers);
        debug!("Visited {} nodes in {}", visited, path.display());

        let directives = AllowDirectives::scan(content);
        let mut violations = Vec::new();
        for (rule, sub) in active.into_iter().zip(subscribers) {
            let found = sub.check.finish();
            let found = apply_allowances(&**rule, &directives, found);
            violations.extend(self.apply_severity_override(rule.name(), found));
        }

        // Pre-order puts an enclosing node before the nodes it starts with.
        violations.sort_by_key(|v| (v.location.offset, Reverse(v.location.length)));

        Ok(violations)
    }

    fn enabled_rules(&self) -> impl Iterator<Item = &RuleBox> + '_ {
        self.rules.iter().filter(|rule| {
            let enabled = self.config.is_rule_enabled(rule.name());
            if !enabled {
                debug!("Skipping disabled rule: {}", rule.name());
            }
            enabled
        })
    }

    /// Applies severity overrides from configuration.
    fn apply_severity_override(
        &self,
        rule_name: &str,
        mut violations: Vec<Violation>,
    ) -> Vec<Violation> {
        if let Some(severity) = self.config.rule_severity(rule_name) {
            for v in &mut violations {
                v.severity = severity;
            }
        }
        violations
    }

    /// Discovers all source files to analyze.
    fn discover_files(&self) -> Result<Vec<PathBuf>, AnalyzerError> {
        let mut builder = ignore::WalkBuilder::new(&self.root);
        builder
            .hidden(false)
            .git_ignore(self.config.analyzer.respect_gitignore)
            .require_git(false);

        let mut files = Vec::new();
        for entry in builder.build() {
            let entry = entry?;
            let path = entry.path();

            if !path.is_file() || !has_source_extension(path) {
                continue;
            }
            if self.should_exclude(path) {
                debug!("Excluding: {}", path.display());
                continue;
            }

            files.push(path.to_path_buf());
        }

        files.sort();
        Ok(files)
    }

    /// Checks if a path should be excluded.
    fn should_exclude(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        self.exclude
            .iter()
            .any(|pattern| pattern.matches_path(path) || pattern.matches_path(relative))
    }
}

fn has_source_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
}

/// Drops violations covered by an allow directive.
///
/// A directive without a reason still suppresses, but for rules that require
/// a reason it is reported as a warning in place of the original violation.
fn apply_allowances(
    rule: &dyn Rule,
    directives: &AllowDirectives,
    violations: Vec<Violation>,
) -> Vec<Violation> {
    if directives.is_empty() {
        return violations;
    }

    let mut kept = Vec::with_capacity(violations.len());
    for violation in violations {
        let check = directives.check(violation.location.line, rule.name());
        if !check.is_allowed() {
            kept.push(violation);
            continue;
        }
        if rule.requires_allow_reason() && check.reason().is_none() {
            kept.push(
                Violation::new(
                    rule.code(),
                    rule.name(),
                    Severity::Warning,
                    violation.location,
                    format!("Allow directive for '{}' is missing required reason", rule.name()),
                )
                .with_suggestion(Suggestion::new(
                    "Add reason=\"...\" to explain why this exception is necessary",
                )),
            );
        }
    }
    kept
}
