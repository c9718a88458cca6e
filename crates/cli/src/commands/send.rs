//! Build the health report and email it

use clap::Args;
use tracing::{error, info};

use certcheck_common::{Error, MailConfig};

use crate::commands::{report, Context};
use crate::mail;
use crate::output;

#[derive(Args)]
pub struct SendArgs {
    /// Build the message and print the subject without sending
    #[arg(long)]
    pub dry_run: bool,
}

pub async fn execute(args: SendArgs, ctx: &Context) -> anyhow::Result<()> {
    // Settings are checked before anything is read from disk
    let mail_config = match MailConfig::from_env() {
        Ok(config) => config,
        Err(e @ Error::MissingMailSettings(_)) | Err(e @ Error::InvalidConfig(_)) => {
            error!("{}", e);
            output::print_error(&e.to_string());
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    let report = report::collect(ctx);

    if args.dry_run {
        mail::build_message(&mail_config, &report)?;
        output::print_info(&format!("Subject: {}", report.subject));
        output::print_info(&format!("Recipients: {}", mail_config.to.join(", ")));
        return Ok(());
    }

    mail::send_report(&mail_config, &report).await?;
    info!("Health check email sent successfully");
    info!("Report summary: {}", report.status_line());
    output::print_success(&format!("Sent: {}", report.subject));
    Ok(())
}
