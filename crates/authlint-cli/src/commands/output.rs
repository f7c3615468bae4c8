//! Shared output formatting for lint results.

use anyhow::Result;
use authlint_core::{LintResult, Severity, Violation, ViolationDiagnostic};
use miette::{NamedSource, Report};
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

use crate::OutputFormat;

/// Print lint results in the specified format.
///
/// `root` is the analyzed directory; violation paths are relative to it.
pub fn print(result: &LintResult, format: OutputFormat, root: &Path) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(result),
        OutputFormat::Json => return print_json(result),
        OutputFormat::Compact => print_compact(result),
        OutputFormat::Pretty => print_pretty(result, root),
    }
    Ok(())
}

fn print_text(result: &LintResult) {
    let (errors, warnings, infos) = result.count_by_severity();

    for violation in &result.violations {
        let severity_indicator = match violation.severity {
            Severity::Error => "\x1b[31merror\x1b[0m",
            Severity::Warning => "\x1b[33mwarning\x1b[0m",
            Severity::Info => "\x1b[34minfo\x1b[0m",
        };

        println!(
            "{} {} at {}:{}:{}",
            violation.code,
            violation.rule,
            violation.location.file.display(),
            violation.location.line,
            violation.location.column,
        );
        match &violation.message_id {
            Some(id) => println!("  {}: {} ({id})", severity_indicator, violation.message),
            None => println!("  {}: {}", severity_indicator, violation.message),
        }
        if let Some(suggestion) = &violation.suggestion {
            println!("  = help: {}", suggestion.message);
        }
        println!();
    }

    println!("{}", summary(result, errors, warnings, infos));
}

fn summary(result: &LintResult, errors: usize, warnings: usize, infos: usize) -> String {
    let color = if errors > 0 {
        "\x1b[31m"
    } else if warnings > 0 {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };
    format!(
        "{color}Found {errors} error(s), {warnings} warning(s), {infos} info(s) in {} file(s)\x1b[0m",
        result.files_checked
    )
}

/// JSON document printed by `--format json`.
#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    result: &'a LintResult,
    errors: usize,
    warnings: usize,
    infos: usize,
}

fn json_report(result: &LintResult) -> Result<String> {
    let (errors, warnings, infos) = result.count_by_severity();
    let report = JsonReport {
        result,
        errors,
        warnings,
        infos,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

fn print_json(result: &LintResult) -> Result<()> {
    println!("{}", json_report(result)?);
    Ok(())
}

fn print_compact(result: &LintResult) {
    for violation in &result.violations {
        println!("{violation}");
    }
}

fn print_pretty(result: &LintResult, root: &Path) {
    let mut sources: HashMap<&Path, Option<String>> = HashMap::new();

    for violation in &result.violations {
        let file = violation.location.file.as_path();
        let content = sources
            .entry(file)
            .or_insert_with(|| std::fs::read_to_string(root.join(file)).ok());

        match content {
            Some(content) => eprintln!("{:?}", render(violation, content.clone())),
            None => {
                tracing::debug!("No source for {}, falling back to text", file.display());
                eprintln!("{}", violation.format());
            }
        }
    }

    let (errors, warnings, infos) = result.count_by_severity();
    println!("{}", summary(result, errors, warnings, infos));
}

fn render(violation: &Violation, content: String) -> Report {
    let name = violation.location.file.display().to_string();
    Report::new(ViolationDiagnostic::from(violation)).with_source_code(NamedSource::new(name, content))
}
