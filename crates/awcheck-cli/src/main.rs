#![allow(clippy::doc_markdown)]
//! `awcheck` - runs the AdventureWorks2012 catalog and data-quality checks.

mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use awcheck_core::{suite, MssqlConnector, Runner, Settings, Stage, DATABASE};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::output::OutputFormat;

/// Exit code for configuration and usage problems.
const EXIT_SETUP: u8 = 2;

/// awcheck - schema and data-integrity checks for AdventureWorks2012
#[derive(Parser, Debug)]
#[command(name = "awcheck")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Settings file (TOML); ./awcheck.toml is used when present
    #[arg(short, long, env = "AWCHECK_CONFIG")]
    config: Option<PathBuf>,

    /// Run only these stages (existence, structure, data-types, values)
    #[arg(short, long = "stage")]
    stages: Vec<Stage>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Print the check catalogue without connecting
    #[arg(long)]
    list: bool,
}

async fn run(args: Args) -> anyhow::Result<u8> {
    let checks = suite::catalogue_for(&args.stages).context("Invalid check catalogue")?;

    if args.list {
        output::print_catalogue(&checks, args.format)?;
        return Ok(0);
    }

    let settings =
        Settings::load(args.config.as_deref()).context("Failed to load connection settings")?;
    tracing::info!(
        "Running {} checks against {} on {}",
        checks.len(),
        DATABASE,
        settings.address()
    );

    let connector = MssqlConnector::new(settings);
    let report = Runner::new(&connector).run(&checks).await;

    output::print_report(&report, args.format)?;
    Ok(report.exit_code())
}

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr so JSON on stdout stays parseable.
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    match run(args).await {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(EXIT_SETUP)
        }
    }
}
