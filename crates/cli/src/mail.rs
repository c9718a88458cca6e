//! SMTP delivery of the health report

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use secrecy::ExposeSecret;
use thiserror::Error;
use tracing::{debug, info};

use certcheck_common::{HealthReport, MailConfig};

#[derive(Error, Debug)]
pub enum MailError {
    #[error("Invalid mail address {address}: {source}")]
    Address {
        address: String,
        source: lettre::address::AddressError,
    },

    #[error("Failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

fn mailbox(address: &str) -> Result<lettre::message::Mailbox, MailError> {
    address.parse().map_err(|source| MailError::Address {
        address: address.to_string(),
        source,
    })
}

/// The report as an HTML email to every configured recipient
pub fn build_message(config: &MailConfig, report: &HealthReport) -> Result<Message, MailError> {
    let mut builder = Message::builder()
        .from(mailbox(&config.from)?)
        .subject(report.subject.clone());
    for to in &config.to {
        builder = builder.to(mailbox(to)?);
    }

    Ok(builder
        .header(ContentType::TEXT_HTML)
        .body(report.html.clone())?)
}

/// Port 465 gets TLS from the first byte, anything else upgrades with STARTTLS
pub fn transport(config: &MailConfig) -> Result<AsyncSmtpTransport<Tokio1Executor>, MailError> {
    let builder = if config.implicit_tls() {
        debug!("SMTP {}:{} with implicit TLS", config.host, config.port);
        AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?
    } else {
        debug!("SMTP {}:{} with STARTTLS", config.host, config.port);
        AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
    };

    Ok(builder
        .port(config.port)
        .credentials(Credentials::new(
            config.user.clone(),
            config.password.expose_secret().to_string(),
        ))
        .build())
}

/// Send the report. Transport failures are returned, not retried.
pub async fn send_report(config: &MailConfig, report: &HealthReport) -> Result<(), MailError> {
    let message = build_message(config, report)?;
    let response = transport(config)?.send(message).await?;
    info!(
        "Health check email sent to {} ({})",
        config.to.join(", "),
        response.code()
    );
    Ok(())
}
