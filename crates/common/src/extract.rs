//! Reading certification text out of the open dropdown
//!
//! The browser itself is an external collaborator reached through
//! [`DropdownProbe`]. This module owns the waiting: it decides when the
//! dropdown has finished loading and samples it under a [`RetryPolicy`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::retry::{Clock, RetryPolicy};
use crate::types::{clean_texts, clean_titles, ExtractionResult};

/// What the harness needs from a live, open dropdown
#[async_trait]
pub trait DropdownProbe: Send + Sync {
    /// Text of every title element, document order, untrimmed
    async fn title_texts(&self) -> Result<Vec<String>>;

    /// Text of every subtitle element, document order, untrimmed
    async fn subtitle_texts(&self) -> Result<Vec<String>>;

    /// Whether an element containing `text` is visible inside the dropdown
    async fn is_text_visible(&self, text: &str) -> Result<bool>;
}

/// Polling budgets for extraction and per-item checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollingPolicy {
    /// Waiting for the first real title to render
    pub load: RetryPolicy,

    /// Pause after loading so the remaining entries can render
    #[serde(with = "crate::retry::millis")]
    pub settle: Duration,

    /// Re-reading the full title list
    pub collect: RetryPolicy,

    /// Looking for one expected title or subtitle
    pub item: RetryPolicy,
}

impl Default for PollingPolicy {
    fn default() -> Self {
        Self {
            load: RetryPolicy::until(Duration::from_secs(180), Duration::from_secs(2)),
            settle: Duration::from_secs(1),
            collect: RetryPolicy::attempts(5, Duration::from_secs(2)),
            item: RetryPolicy::attempts(5, Duration::from_secs(2)),
        }
    }
}

/// Sample the dropdown once, returning only real certification titles
pub(crate) async fn sample_titles(probe: &dyn DropdownProbe) -> Vec<String> {
    match probe.title_texts().await {
        Ok(raw) => clean_titles(raw),
        Err(e) => {
            debug!("Reading titles failed: {}", e);
            Vec::new()
        }
    }
}

/// Wait until at least one non-control title has rendered.
///
/// Control labels alone do not count as loaded. Fails with
/// [`Error::Timeout`] once the load policy runs out.
pub async fn wait_for_certifications(
    probe: &dyn DropdownProbe,
    policy: &RetryPolicy,
    clock: &dyn Clock,
    environment: &str,
) -> Result<Vec<String>> {
    info!("{}: Waiting for certifications to load...", environment);
    let start = clock.now();

    let outcome = policy
        .poll(clock, move |_| async move {
            let titles = sample_titles(probe).await;
            (!titles.is_empty()).then_some(titles)
        })
        .await;

    match outcome {
        Ok(titles) => {
            info!(
                "{}: Found {} certifications after {}s",
                environment,
                titles.len(),
                clock.now().duration_since(start).as_secs()
            );
            Ok(titles)
        }
        Err(exhausted) => Err(Error::Timeout {
            what: format!(
                "{} certifications to load: no valid titles found in dropdown after {} attempts. \
                 Check backend/API or UI for errors",
                environment, exhausted.attempts
            ),
            seconds: exhausted.elapsed.as_secs(),
        }),
    }
}

/// Re-read the title list until it is non-empty. An empty list is returned
/// if every attempt came back empty.
pub async fn collect_titles(
    probe: &dyn DropdownProbe,
    policy: &RetryPolicy,
    clock: &dyn Clock,
    environment: &str,
) -> Vec<String> {
    let outcome = policy
        .poll(clock, move |attempt| async move {
            let titles = sample_titles(probe).await;
            if titles.is_empty() {
                info!(
                    "{}: Retrying certification collection (attempt {}/{})...",
                    environment, attempt, policy.max_attempts
                );
                None
            } else {
                Some(titles)
            }
        })
        .await;

    outcome.unwrap_or_else(|exhausted| {
        warn!(
            "{}: No certification titles collected after {} attempts",
            environment, exhausted.attempts
        );
        Vec::new()
    })
}

/// Full extraction: wait for load, settle, collect titles then subtitles
pub async fn extract(
    probe: &dyn DropdownProbe,
    polling: &PollingPolicy,
    clock: &dyn Clock,
    environment: &str,
) -> Result<ExtractionResult> {
    wait_for_certifications(probe, &polling.load, clock, environment).await?;
    clock.sleep(polling.settle).await;

    let actual_titles = collect_titles(probe, &polling.collect, clock, environment).await;
    let actual_subtitles = clean_texts(probe.subtitle_texts().await?);

    info!(
        "{} - Found {} certification titles in dropdown",
        environment,
        actual_titles.len()
    );
    info!("{} - Titles: {}", environment, actual_titles.join(", "));
    info!("{} - Subtitles: {}", environment, actual_subtitles.join(", "));

    Ok(ExtractionResult {
        actual_titles,
        actual_subtitles,
    })
}
