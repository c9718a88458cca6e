//! Per-environment reconciliation summary
//!
//! A [`SummaryGuard`] is created before the browser is touched and writes
//! the summary file when it goes out of scope, so an early return or a
//! propagated error still leaves a record on disk.

use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

use crate::error::Result;
use crate::fixture::Fixture;
use crate::types::{ExtractionResult, ReconciliationResult};

/// Lifecycle of one environment run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryStatus {
    #[default]
    Pending,
    Passed,
    Failed,
}

impl std::fmt::Display for SummaryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SummaryStatus::Pending => write!(f, "pending"),
            SummaryStatus::Passed => write!(f, "passed"),
            SummaryStatus::Failed => write!(f, "failed"),
        }
    }
}

/// The persisted record of one environment's dropdown check
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EnvironmentSummary {
    #[serde(rename = "environmentName", alias = "environment")]
    pub environment: String,
    pub status: SummaryStatus,
    pub expected_certifications: Vec<String>,
    pub expected_subtitles: Vec<String>,
    pub actual_certifications: Vec<String>,
    pub actual_subtitles: Vec<String>,
    pub missing_certifications: Vec<String>,
    pub missing_subtitles: Vec<String>,
    pub extra_certifications: Vec<String>,
}

impl EnvironmentSummary {
    /// A pending summary listing what the fixture expects
    pub fn pending(fixture: &Fixture) -> Self {
        Self {
            environment: fixture.environment.clone(),
            status: SummaryStatus::Pending,
            expected_certifications: fixture.titles(),
            expected_subtitles: fixture.subtitles(),
            ..Default::default()
        }
    }

    /// List every expected item as missing until a check confirms it
    pub fn assume_all_missing(&mut self) {
        self.missing_certifications = self.expected_certifications.clone();
        self.missing_subtitles = self.expected_subtitles.clone();
    }

    pub fn confirm_title(&mut self, title: &str) {
        if let Some(i) = self.missing_certifications.iter().position(|t| t == title) {
            self.missing_certifications.remove(i);
        }
    }

    pub fn confirm_subtitle(&mut self, subtitle: &str) {
        if let Some(i) = self.missing_subtitles.iter().position(|s| s == subtitle) {
            self.missing_subtitles.remove(i);
        }
    }

    pub fn record_extraction(&mut self, extraction: &ExtractionResult) {
        self.actual_certifications = extraction.actual_titles.clone();
        self.actual_subtitles = extraction.actual_subtitles.clone();
    }

    pub fn record_reconciliation(&mut self, result: &ReconciliationResult) {
        self.missing_certifications = result.missing_titles.clone();
        self.missing_subtitles = result.missing_subtitles.clone();
        self.extra_certifications = result.extra_titles.clone();
    }

    /// Read a summary file. Missing or malformed files yield `None`.
    pub fn read_optional(path: &Path) -> Option<Self> {
        let raw = std::fs::read_to_string(path).ok()?;
        match serde_json::from_str(&raw) {
            Ok(summary) => Some(summary),
            Err(e) => {
                debug!("Ignoring malformed summary {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Write pretty JSON, creating parent directories
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Owns a summary for the duration of a run and persists it exactly once
pub struct SummaryGuard {
    summary: EnvironmentSummary,
    path: PathBuf,
    written: bool,
}

impl SummaryGuard {
    pub fn new(summary: EnvironmentSummary, path: impl Into<PathBuf>) -> Self {
        Self {
            summary,
            path: path.into(),
            written: false,
        }
    }

    /// Set the final status and write the file now
    pub fn finish(mut self, status: SummaryStatus) -> Result<EnvironmentSummary> {
        self.summary.status = status;
        self.summary.write(&self.path)?;
        self.written = true;
        info!(
            "Summary for {} written to {} ({})",
            self.summary.environment,
            self.path.display(),
            status
        );
        Ok(std::mem::take(&mut self.summary))
    }
}

impl Deref for SummaryGuard {
    type Target = EnvironmentSummary;

    fn deref(&self) -> &Self::Target {
        &self.summary
    }
}

impl DerefMut for SummaryGuard {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.summary
    }
}

impl Drop for SummaryGuard {
    fn drop(&mut self) {
        if self.written {
            return;
        }
        // Dropped without finish(): the run bailed out
        if self.summary.status == SummaryStatus::Pending {
            self.summary.status = SummaryStatus::Failed;
        }
        if let Err(e) = self.summary.write(&self.path) {
            error!("Failed to write summary {}: {}", self.path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::builtin;

    #[test]
    fn test_summary_json_shape() {
        let summary = EnvironmentSummary::pending(&builtin("AIA").unwrap());
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["environmentName"], "AIA");
        assert!(json.get("environment").is_none());
        assert_eq!(json["status"], "pending");
        assert_eq!(json["expectedCertifications"].as_array().unwrap().len(), 6);
        assert!(json["missingCertifications"].as_array().unwrap().is_empty());
        assert!(json.get("extraCertifications").is_some());
    }

    #[test]
    fn test_guard_writes_on_drop_as_failed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/report/aia-summary.json");

        {
            let mut guard = SummaryGuard::new(EnvironmentSummary::pending(&builtin("AIA").unwrap()), &path);
            guard.missing_certifications.push("CHC33021 Certificate IV in Ageing Support".into());
        }

        let written = EnvironmentSummary::read_optional(&path).unwrap();
        assert_eq!(written.status, SummaryStatus::Failed);
        assert_eq!(written.missing_certifications.len(), 1);
    }

    #[test]
    fn test_unconfirmed_items_stay_missing() {
        let mut summary = EnvironmentSummary::pending(&builtin("AIA").unwrap());
        summary.assume_all_missing();
        assert_eq!(summary.missing_certifications, summary.expected_certifications);

        summary.confirm_title("BSB50420 Diploma of Leadership Management");
        summary.confirm_subtitle("Diploma of Leadership Management");
        assert_eq!(summary.missing_certifications.len(), 5);
        assert_eq!(summary.missing_subtitles.len(), 5);
        assert!(!summary
            .missing_certifications
            .contains(&"BSB50420 Diploma of Leadership Management".to_string()));

        // confirming twice or confirming an unknown title changes nothing
        summary.confirm_title("BSB50420 Diploma of Leadership Management");
        summary.confirm_title("Unknown");
        assert_eq!(summary.missing_certifications.len(), 5);
    }

    #[test]
    fn test_finish_writes_once_with_status() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aia-summary.json");

        let guard = SummaryGuard::new(EnvironmentSummary::pending(&builtin("AIA").unwrap()), &path);
        let summary = guard.finish(SummaryStatus::Passed).unwrap();
        assert_eq!(summary.status, SummaryStatus::Passed);

        let written = EnvironmentSummary::read_optional(&path).unwrap();
        assert_eq!(written.status, SummaryStatus::Passed);
        assert_eq!(written.environment, "AIA");
    }

    #[test]
    fn test_read_optional_tolerates_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        assert!(EnvironmentSummary::read_optional(&dir.path().join("absent.json")).is_none());

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{ not json").unwrap();
        assert!(EnvironmentSummary::read_optional(&bad).is_none());

        let legacy = dir.path().join("legacy.json");
        std::fs::write(&legacy, r#"{"environment": "AIA", "status": "passed"}"#).unwrap();
        assert_eq!(EnvironmentSummary::read_optional(&legacy).unwrap().environment, "AIA");

        let partial = dir.path().join("partial.json");
        std::fs::write(&partial, r#"{"environmentName": "DEMO", "missingCertifications": ["X"]}"#).unwrap();
        let summary = EnvironmentSummary::read_optional(&partial).unwrap();
        assert_eq!(summary.environment, "DEMO");
        assert_eq!(summary.missing_certifications, vec!["X"]);
    }
}
