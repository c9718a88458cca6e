//! Health report aggregation command

use chrono::Local;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use tracing::info;

use certcheck_common::HealthReport;

use crate::commands::Context;
use crate::output::{self, OutputFormat};

#[derive(Args)]
pub struct ReportArgs {
    /// Also write the HTML email body to this file
    #[arg(long)]
    pub html: Option<PathBuf>,

    /// Exit nonzero when any environment failed
    #[arg(long)]
    pub fail_on_issues: bool,
}

/// Aggregate whatever results and summaries are on disk
pub fn collect(ctx: &Context) -> HealthReport {
    info!(
        "Collecting results for {} environments from {}",
        ctx.config.environments.len(),
        ctx.config.report_dir.display()
    );
    HealthReport::collect(&ctx.config.environments, Local::now())
}

/// Write the HTML body, creating parent directories
pub fn write_html(report: &HealthReport, path: &std::path::Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, &report.html)?;
    Ok(())
}

pub async fn execute(args: ReportArgs, ctx: &Context) -> anyhow::Result<()> {
    let report = collect(ctx);

    match ctx.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&report)?),
        OutputFormat::Table | OutputFormat::Plain => {
            output::print_list(&report.results, ctx.format)?;
            println!();
            let totals = format!(
                "{} ({} passed, {} failed, {} total)",
                report.overall_status, report.totals.passed, report.totals.failed, report.totals.total
            );
            if report.healthy() {
                println!("{}", totals.green().bold());
            } else {
                println!("{}", totals.red().bold());
            }
        }
    }

    if let Some(path) = &args.html {
        write_html(&report, path)?;
        info!("HTML report written to {}", path.display());
    }

    if args.fail_on_issues && !report.healthy() {
        std::process::exit(1);
    }
    Ok(())
}
