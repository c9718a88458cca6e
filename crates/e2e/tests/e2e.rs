//! E2E harness entry point
//!
//! Verifies live environments with a real browser.
//! Run with: cargo test --package certcheck-e2e --test e2e -- --env AIA

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use certcheck_common::{Fixture, HarnessConfig, SystemClock};
use certcheck_e2e::{verify_environments, Applicant, Browser, E2eResult, PlaywrightConfig};

#[derive(Parser, Debug)]
#[command(name = "certcheck-e2e")]
#[command(about = "Certification dropdown verification against live environments")]
struct Args {
    /// Environments to verify (repeatable); defaults to those with a fixture
    #[arg(short, long = "env")]
    envs: Vec<String>,

    /// Directory of fixture YAML files
    #[arg(short, long, default_value = "fixtures")]
    fixtures: PathBuf,

    /// Output directory for summaries, results and screenshots
    #[arg(short, long, default_value = "report")]
    output: PathBuf,

    /// Browser to use (chromium, firefox, webkit)
    #[arg(long, default_value = "chromium")]
    browser: String,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Per-environment ceiling in seconds
    #[arg(long, default_value = "300")]
    test_timeout: u64,

    /// Directory node resolves playwright from
    #[arg(long)]
    node_dir: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
    match rt.block_on(async_main(args)) {
        Ok(true) => std::process::exit(0),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    }
}

async fn async_main(args: Args) -> E2eResult<bool> {
    let mut config = HarnessConfig::from_env(&args.output).with_fixtures_dir(Some(args.fixtures));
    config.timeouts.test = Duration::from_secs(args.test_timeout);

    let playwright = PlaywrightConfig {
        browser: args.browser.parse::<Browser>()?,
        headless: !args.headed,
        working_dir: args.node_dir,
        ..Default::default()
    };

    let names: Vec<String> = if args.envs.is_empty() {
        config
            .environments
            .iter()
            .filter(|env| Fixture::for_environment(config.fixtures_dir(), &env.name).is_ok())
            .map(|env| env.name.clone())
            .collect()
    } else {
        args.envs
    };

    let suite = verify_environments(
        &names,
        &playwright,
        &config,
        &Applicant::default(),
        &SystemClock,
        |result| {
            println!(
                "{} {} ({} ms)",
                if result.success { "✓" } else { "✗" },
                result.environment,
                result.duration_ms
            );
            for line in &result.errors {
                println!("    {}", line.replace('\n', "\n    "));
            }
        },
    )
    .await?;

    println!(
        "\nVerification: {} passed, {} failed ({} ms)",
        suite.passed, suite.failed, suite.duration_ms
    );
    Ok(suite.failed == 0)
}
