//! certcheck CLI - Main Entry Point
//!
//! Verifies the certification dropdown on each deployed environment and
//! turns the per-environment results into a health-check report.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use certcheck_cli::commands::{environments, fixtures, report, send, verify, Context};
use certcheck_cli::output;
use certcheck_common::{HarnessConfig, DEFAULT_FIXTURES_DIR, DEFAULT_REPORT_DIR};

/// certcheck - certification dropdown health checks
#[derive(Parser)]
#[command(name = "certcheck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Directory for results, summaries and screenshots
    #[arg(long, env = "CERTCHECK_REPORT_DIR", default_value = DEFAULT_REPORT_DIR, global = true)]
    report_dir: PathBuf,

    /// Directory of fixture YAML files
    #[arg(long, env = "CERTCHECK_FIXTURES_DIR", default_value = DEFAULT_FIXTURES_DIR, global = true)]
    fixtures_dir: PathBuf,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify certification dropdowns in a real browser
    Verify(verify::VerifyArgs),

    /// Aggregate results into a health report
    Report(report::ReportArgs),

    /// Aggregate results and email the health report
    Send(send::SendArgs),

    /// Inspect expected certification fixtures
    #[command(subcommand)]
    Fixtures(fixtures::FixturesCommands),

    /// List known environments and their URLs
    Environments,

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .init();

    let ctx = Context {
        config: HarnessConfig::from_env(&cli.report_dir).with_fixtures_dir(Some(cli.fixtures_dir)),
        format: cli.format,
    };

    match cli.command {
        Commands::Verify(args) => verify::execute(args, ctx).await?,
        Commands::Report(args) => report::execute(args, &ctx).await?,
        Commands::Send(args) => send::execute(args, &ctx).await?,
        Commands::Fixtures(cmd) => fixtures::execute(cmd, &ctx).await?,
        Commands::Environments => environments::execute(&ctx)?,
        Commands::Version => {
            println!("certcheck v{}", certcheck_common::VERSION);
            println!("Certification dropdown verification and health-check reporting");
        }
    }

    Ok(())
}
