//! Verification runner: one environment, one browser session, one summary

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{error, info, warn};

use certcheck_common::extract::extract;
use certcheck_common::reconcile::{failure_messages, reconcile_live};
use certcheck_common::{
    Clock, EnvironmentDescriptor, EnvironmentSummary, Error, Fixture, HarnessConfig, RunResults,
    SummaryGuard, SummaryStatus,
};

use crate::error::{E2eError, E2eResult};
use crate::flow::{open_dropdown, select_certification, Applicant};
use crate::page::BrowserPage;
use crate::playwright::{PlaywrightConfig, PlaywrightSession};

/// Outcome of verifying one environment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub environment: String,
    pub success: bool,
    pub duration_ms: u64,
    pub summary: EnvironmentSummary,
    pub errors: Vec<String>,
    pub screenshot: Option<PathBuf>,
}

/// Result of verifying several environments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationSuite {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub results: Vec<VerificationResult>,
}

impl VerificationSuite {
    pub fn from_results(results: Vec<VerificationResult>) -> Self {
        let passed = results.iter().filter(|r| r.success).count();
        Self {
            total: results.len(),
            passed,
            failed: results.len() - passed,
            duration_ms: results.iter().map(|r| r.duration_ms).sum(),
            results,
        }
    }
}

/// Split a failure into the lines stored in the results file
fn error_lines(e: &E2eError) -> Vec<String> {
    match e {
        E2eError::Check(Error::MissingItems { failures, .. }) => failures.clone(),
        other => vec![other.to_string()],
    }
}

async fn run_checks(
    page: &dyn BrowserPage,
    environment: &EnvironmentDescriptor,
    fixture: &Fixture,
    config: &HarnessConfig,
    applicant: &Applicant,
    clock: &dyn Clock,
    summary: &mut EnvironmentSummary,
) -> E2eResult<()> {
    let name = environment.name.as_str();
    open_dropdown(page, &environment.url, applicant, &config.timeouts, clock, name).await?;

    info!("{} Environment - Verifying certification dropdown values...", name);
    let extraction = extract(page.as_probe(), &config.polling, clock, name).await?;
    summary.record_extraction(&extraction);

    let result = reconcile_live(
        &fixture.certifications,
        &extraction,
        page.as_probe(),
        &config.polling.item,
        clock,
        name,
        summary,
    )
    .await;
    summary.record_reconciliation(&result);

    if !result.is_complete() {
        return Err(Error::MissingItems {
            environment: name.to_string(),
            failures: failure_messages(name, &result, &extraction),
        }
        .into());
    }

    let first = fixture
        .first()
        .ok_or_else(|| Error::Fixture(format!("{} fixture has no certifications", name)))?;
    select_certification(page, &first.title, &config.timeouts, name).await?;
    info!("{} Certification dropdown validation complete", name);

    page.screenshot(&environment.screenshot_file).await?;
    Ok(())
}

/// Verify one environment's certification dropdown against its fixture.
///
/// The summary file is written on every path out of this function, the
/// results file whenever the run itself finishes. Until a fixture item is
/// confirmed in the dropdown the summary lists it as missing, so a run cut
/// short by a step failure or a timeout reports everything it never saw.
/// Check failures come back as an unsuccessful [`VerificationResult`]; only
/// artifact I/O errors are returned as `Err`.
pub async fn verify_environment(
    page: &dyn BrowserPage,
    environment: &EnvironmentDescriptor,
    fixture: &Fixture,
    config: &HarnessConfig,
    applicant: &Applicant,
    clock: &dyn Clock,
) -> E2eResult<VerificationResult> {
    let start = clock.now();
    let mut guard = SummaryGuard::new(EnvironmentSummary::pending(fixture), &environment.summary_file);
    guard.assume_all_missing();

    let ceiling = config.timeouts.test;
    let outcome = match tokio::time::timeout(
        ceiling,
        run_checks(page, environment, fixture, config, applicant, clock, &mut guard),
    )
    .await
    {
        Ok(outcome) => outcome,
        Err(_) => Err(E2eError::Timeout(format!(
            "{} verification ({:?} test timeout)",
            environment.name, ceiling
        ))),
    };

    let duration_ms = clock.now().duration_since(start).as_millis() as u64;
    let (status, errors) = match &outcome {
        Ok(()) => {
            info!("{} Test completed", environment.name);
            (SummaryStatus::Passed, Vec::new())
        }
        Err(e) => {
            error!("{} Test failed: {}", environment.name, e);
            let mut lines = error_lines(e);
            if e.is_timeout() && !guard.missing_certifications.is_empty() {
                lines.push(format!(
                    "{} certifications not confirmed before timeout: {}",
                    environment.name,
                    guard.missing_certifications.join(", ")
                ));
            }
            (SummaryStatus::Failed, lines)
        }
    };

    let summary = guard.finish(status)?;
    let success = status == SummaryStatus::Passed;
    RunResults::single(success, duration_ms, errors.clone()).write(&environment.result_file)?;

    Ok(VerificationResult {
        environment: environment.name.clone(),
        success,
        duration_ms,
        summary,
        errors,
        screenshot: success.then(|| environment.screenshot_file.clone()),
    })
}

/// Verify each named environment in its own browser session.
///
/// Every name is resolved to an environment and a fixture before the first
/// browser starts. `on_result` sees each result as soon as it is known.
pub async fn verify_environments<F>(
    names: &[String],
    playwright: &PlaywrightConfig,
    config: &HarnessConfig,
    applicant: &Applicant,
    clock: &dyn Clock,
    mut on_result: F,
) -> E2eResult<VerificationSuite>
where
    F: FnMut(&VerificationResult),
{
    let mut targets = Vec::with_capacity(names.len());
    for name in names {
        let environment = config.environment(name)?.clone();
        let fixture = Fixture::for_environment(config.fixtures_dir(), &environment.name)?;
        targets.push((environment, fixture));
    }

    let mut results = Vec::with_capacity(targets.len());
    for (environment, fixture) in &targets {
        info!(
            "Verifying {} at {} ({} certifications)",
            environment.name,
            environment.url,
            fixture.certifications.len()
        );

        let session = PlaywrightSession::launch(playwright).await?;
        let result = verify_environment(&session, environment, fixture, config, applicant, clock).await?;
        if let Err(e) = session.close().await {
            warn!("Failed to close browser for {}: {}", environment.name, e);
        }

        on_result(&result);
        results.push(result);
    }

    Ok(VerificationSuite::from_results(results))
}
