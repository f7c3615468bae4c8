//! List rules command implementation.

use anyhow::{Context, Result};
use authlint_core::{Analyzer, NodeKind};
use authlint_rules::all_rules;

use crate::config_resolver::ConfigSource;

/// Runs the list-rules command.
pub fn run(source: &ConfigSource) -> Result<()> {
    let config = super::load_config(source)?;

    let mut builder = Analyzer::builder();
    for rule in all_rules(&config.conventions) {
        builder = builder.rule_box(rule);
    }
    let analyzer = builder.config(config).build().context("Failed to build analyzer")?;
    let enabled = analyzer.rule_interests();

    println!("Available rules:\n");
    println!("{:<10} {:<25} {:<9} Description", "Code", "Name", "Enabled");
    println!("{}", "-".repeat(80));

    for rule in all_rules(&authlint_core::ConventionsConfig::default()) {
        println!(
            "{:<10} {:<25} {:<9} {}",
            rule.code(),
            rule.name(),
            if enabled.contains_key(rule.name()) { "yes" } else { "no" },
            rule.description()
        );
        println!("{:<10} observes: {}", "", kinds(rule.interests()));
    }

    println!("\nUse --rules to filter specific rules, e.g.:");
    println!("  authlint check --rules no-raw-convex-function");
    println!("  authlint check --rules AUTH001,AUTH002");

    Ok(())
}

fn kinds(interests: &[NodeKind]) -> String {
    interests
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_listed_in_order() {
        assert_eq!(
            kinds(&[NodeKind::ImportDeclaration, NodeKind::CallExpression]),
            format!("{}, {}", NodeKind::ImportDeclaration, NodeKind::CallExpression)
        );
    }
}
