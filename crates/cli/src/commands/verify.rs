//! Live dropdown verification

use clap::Args;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use certcheck_common::{RetryPolicy, SystemClock};
use certcheck_e2e::{verify_environments, Applicant, Browser, PlaywrightConfig};

use crate::commands::{fixtures, Context};
use crate::output;

#[derive(Args)]
pub struct VerifyArgs {
    /// Environments to verify; defaults to every environment with a fixture
    pub environments: Vec<String>,

    /// Browser to use
    #[arg(long, default_value = "chromium")]
    pub browser: Browser,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Per-environment ceiling in seconds
    #[arg(long, default_value = "300")]
    pub test_timeout: u64,

    /// How long to wait for certifications to load, in seconds
    #[arg(long, default_value = "180")]
    pub load_timeout: u64,

    /// Directory node resolves playwright from
    #[arg(long)]
    pub node_dir: Option<PathBuf>,
}

pub async fn execute(args: VerifyArgs, mut ctx: Context) -> anyhow::Result<()> {
    ctx.config.timeouts.test = Duration::from_secs(args.test_timeout);
    ctx.config.polling.load = RetryPolicy::until(
        Duration::from_secs(args.load_timeout),
        ctx.config.polling.load.interval,
    );

    let names: Vec<String> = if args.environments.is_empty() {
        fixtures::available(&ctx)?
            .into_iter()
            .map(|info| info.environment)
            .collect()
    } else {
        args.environments
    };
    if names.is_empty() {
        output::print_warning("No environment has a fixture; nothing to verify");
        return Ok(());
    }

    let playwright = PlaywrightConfig {
        browser: args.browser,
        headless: !args.headed,
        working_dir: args.node_dir,
        ..Default::default()
    };

    let suite = verify_environments(
        &names,
        &playwright,
        &ctx.config,
        &Applicant::default(),
        &SystemClock,
        |result| {
            info!(
                "{} finished in {} ms ({})",
                result.environment,
                result.duration_ms,
                if result.success { "passed" } else { "failed" }
            )
        },
    )
    .await?;

    output::print_list(&suite.results, ctx.format)?;
    for result in suite.results.iter().filter(|r| !r.success) {
        for line in &result.errors {
            output::print_error(line);
        }
    }

    if suite.failed > 0 {
        output::print_error(&format!("{} of {} environments failed", suite.failed, suite.total));
        std::process::exit(1);
    }
    output::print_success(&format!("{} environments verified", suite.passed));
    Ok(())
}
