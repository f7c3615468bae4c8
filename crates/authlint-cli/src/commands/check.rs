//! Check command implementation.

use anyhow::{Context, Result};
use authlint_core::{Analyzer, ConventionsConfig, RuleBox};
use authlint_rules::{all_rules, rule_by_name};
use std::path::Path;

use crate::config_resolver::ConfigSource;
use crate::OutputFormat;

/// Runs the check command.
pub fn run(
    path: &Path,
    format: OutputFormat,
    rules_filter: Option<String>,
    exclude: Vec<String>,
    source: &ConfigSource,
) -> Result<()> {
    let config = super::load_config(source)?;

    let rules_to_add = match rules_filter {
        Some(filter) => filter_rules(&filter, &config.conventions),
        None => all_rules(&config.conventions),
    };

    let mut builder = Analyzer::builder().root(path).config(config);
    for pattern in exclude {
        builder = builder.exclude(pattern);
    }
    for rule in rules_to_add {
        builder = builder.rule_box(rule);
    }

    let analyzer = builder.build().context("Failed to build analyzer")?;

    tracing::info!("Analyzing {:?} with {} rules", path, analyzer.rule_count());

    let result = analyzer.analyze().context("Analysis failed")?;

    super::output::print(&result, format, analyzer.root())?;

    if result.has_errors() {
        std::process::exit(1);
    }

    Ok(())
}

fn filter_rules(filter: &str, conventions: &ConventionsConfig) -> Vec<RuleBox> {
    filter
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .filter_map(|name| {
            let rule = rule_by_name(name, conventions);
            if rule.is_none() {
                tracing::warn!("Unknown rule: {}", name);
            }
            rule
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_accepts_names_and_codes() {
        let conventions = ConventionsConfig::default();
        let rules = filter_rules("AUTH002, no-raw-convex-function,,bogus", &conventions);
        let names: Vec<_> = rules.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["no-ctx-identity-lookup", "no-raw-convex-function"]);
    }
}
