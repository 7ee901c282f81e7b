//! Console rendering for reports and the catalogue.

use colored::Colorize;
use serde::Serialize;

use awcheck_core::suite::BoxedCheck;
use awcheck_core::{CheckReport, CheckStatus, Stage, SuiteReport};

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable and coloured (honours `NO_COLOR`).
    Text,
    /// One JSON document on stdout.
    Json,
}

#[derive(Serialize)]
struct CatalogueEntry {
    name: String,
    stage: Stage,
    purpose: String,
}

fn status_label(status: CheckStatus) -> colored::ColoredString {
    let label = status.label();
    match status {
        CheckStatus::Passed => label.green().bold(),
        CheckStatus::Failed => label.red().bold(),
        CheckStatus::Error => label.magenta().bold(),
        CheckStatus::Skipped => label.yellow(),
    }
}

fn print_check(report: &CheckReport) {
    println!("{} {}", report.name.bold(), format!("[{}]", report.stage).dimmed());
    println!("{}", report.purpose);
    println!("Parameters:");
    for p in &report.parameters {
        println!("{} = {}", p.name, p.value);
    }
    println!();
    if let (Some(actual), Some(expected)) = (&report.actual, &report.expected) {
        println!("Actual result: {actual}");
        println!("Expected result: {expected}");
    }
    for detail in &report.details {
        println!("  - {detail}");
    }
    if let Some(reason) = &report.error {
        println!("Reason: {reason}");
    }
    println!("{}\n", status_label(report.status));
}

/// Print every check report followed by a summary line.
pub fn print_report(report: &SuiteReport, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        OutputFormat::Text => {
            for check in &report.checks {
                print_check(check);
            }
            let summary = report.summary();
            let line = summary.to_string();
            if report.all_passed() {
                println!("{}", line.green().bold());
            } else {
                println!("{}", line.red().bold());
            }
        }
    }
    Ok(())
}

/// Print check names, stages and purposes without running anything.
pub fn print_catalogue(checks: &[BoxedCheck], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            let entries: Vec<CatalogueEntry> = checks
                .iter()
                .map(|c| CatalogueEntry {
                    name: c.name(),
                    stage: c.stage(),
                    purpose: c.purpose(),
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        OutputFormat::Text => {
            for check in checks {
                println!("{:<12} {}", check.stage().to_string(), check.name());
            }
            println!("\n{} checks", checks.len());
        }
    }
    Ok(())
}
