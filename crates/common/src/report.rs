//! Health report aggregation across environments
//!
//! Aggregation never fails: a missing or unreadable results file marks the
//! environment as down (0 passed, 1 failed) and a missing summary simply
//! leaves the certification columns empty.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::environment::EnvironmentDescriptor;
use crate::html;
use crate::results::RunResults;
use crate::summary::EnvironmentSummary;

pub const STATUS_PASSED: &str = "✅ PASSED";
pub const STATUS_FAILED: &str = "❌ FAILED";
pub const OVERALL_HEALTHY: &str = "✅ ALL SYSTEMS HEALTHY";
pub const OVERALL_ISSUES: &str = "❌ ISSUES DETECTED";

/// Pass/fail counters. `total` is always `passed + failed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    pub passed: u64,
    pub failed: u64,
    pub total: u64,
}

impl Counts {
    pub fn new(passed: u64, failed: u64) -> Self {
        Self {
            passed,
            failed,
            total: passed + failed,
        }
    }

    pub fn healthy(&self) -> bool {
        self.failed == 0
    }
}

impl std::ops::Add for Counts {
    type Output = Counts;

    fn add(self, other: Counts) -> Counts {
        Counts::new(self.passed + other.passed, self.failed + other.failed)
    }
}

impl std::iter::Sum for Counts {
    fn sum<I: Iterator<Item = Counts>>(iter: I) -> Counts {
        iter.fold(Counts::default(), |acc, c| acc + c)
    }
}

/// One row of the report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentReport {
    #[serde(flatten)]
    pub environment: EnvironmentDescriptor,
    pub status: String,
    pub details: String,
    #[serde(flatten)]
    pub counts: Counts,
    pub summary: Option<EnvironmentSummary>,
}

impl EnvironmentReport {
    /// Derive a row from whatever was found on disk
    pub fn from_artifacts(
        environment: EnvironmentDescriptor,
        results: Option<&RunResults>,
        summary: Option<EnvironmentSummary>,
    ) -> Self {
        let (counts, details) = match results {
            Some(results) => {
                let counts = Counts::new(results.stats.passed(), results.stats.failed());
                let details = format!("{}/{} tests passed", counts.passed, counts.total);
                (counts, details)
            }
            None => (Counts::new(0, 1), "No test results found".to_string()),
        };

        Self {
            environment,
            status: if counts.healthy() { STATUS_PASSED } else { STATUS_FAILED }.to_string(),
            details,
            counts,
            summary,
        }
    }

    /// Read the results and summary files named by the descriptor
    pub fn load(environment: &EnvironmentDescriptor) -> Self {
        let results = RunResults::read_optional(&environment.result_file);
        if results.is_none() {
            warn!(
                "{}: no usable results at {}",
                environment.name,
                environment.result_file.display()
            );
        }
        let summary = EnvironmentSummary::read_optional(&environment.summary_file);
        debug!(
            "{}: summary {}",
            environment.name,
            if summary.is_some() { "loaded" } else { "absent" }
        );
        Self::from_artifacts(environment.clone(), results.as_ref(), summary)
    }

    pub fn healthy(&self) -> bool {
        self.counts.healthy()
    }

    pub fn missing_certifications(&self) -> &[String] {
        self.summary
            .as_ref()
            .map(|s| s.missing_certifications.as_slice())
            .unwrap_or(&[])
    }

    pub fn expected_count(&self) -> usize {
        self.summary.as_ref().map_or(0, |s| s.expected_certifications.len())
    }

    pub fn detected_count(&self) -> usize {
        self.summary.as_ref().map_or(0, |s| s.actual_certifications.len())
    }
}

/// The aggregated report ready for delivery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub subject: String,
    pub overall_status: String,
    pub totals: Counts,
    pub generated_at: DateTime<Local>,
    pub results: Vec<EnvironmentReport>,
    #[serde(skip)]
    pub html: String,
}

impl HealthReport {
    /// Read every environment's files and aggregate them
    pub fn collect(environments: &[EnvironmentDescriptor], generated_at: DateTime<Local>) -> Self {
        let rows = environments.iter().map(EnvironmentReport::load).collect();
        Self::from_rows(rows, generated_at)
    }

    /// Aggregate rows that were already loaded
    pub fn from_rows(results: Vec<EnvironmentReport>, generated_at: DateTime<Local>) -> Self {
        let totals: Counts = results.iter().map(|r| r.counts).sum();
        let overall_status = if totals.healthy() {
            OVERALL_HEALTHY
        } else {
            OVERALL_ISSUES
        }
        .to_string();
        let subject = format!(
            "Certification Health Check (Frontend) - {} ({}/{} tests passed)",
            overall_status, totals.passed, totals.total
        );

        let mut report = Self {
            subject,
            overall_status,
            totals,
            generated_at,
            results,
            html: String::new(),
        };
        report.html = html::render(&report);
        report
    }

    pub fn healthy(&self) -> bool {
        self.totals.healthy()
    }

    /// `NAME: STATUS` pairs for log lines
    pub fn status_line(&self) -> String {
        self.results
            .iter()
            .map(|r| format!("{}: {}", r.environment.name, r.status))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::catalogue;
    use crate::results::RunStats;
    use std::path::Path;

    fn env(name: &str, dir: &Path) -> EnvironmentDescriptor {
        EnvironmentDescriptor::new(name, format!("https://{}.example.test", name.to_lowercase()), "desc", dir)
    }

    fn stats(expected: u64, unexpected: u64, flaky: u64) -> RunResults {
        RunResults {
            stats: RunStats {
                expected,
                unexpected,
                flaky,
                ..Default::default()
            },
            errors: vec![],
        }
    }

    #[test]
    fn test_missing_results_is_one_failure() {
        let row = EnvironmentReport::from_artifacts(env("AIA", Path::new("r")), None, None);
        assert_eq!(row.status, STATUS_FAILED);
        assert_eq!(row.counts, Counts { passed: 0, failed: 1, total: 1 });
        assert_eq!(row.details, "No test results found");
        assert!(row.missing_certifications().is_empty());
    }

    #[test]
    fn test_flaky_counts_as_failed() {
        let row = EnvironmentReport::from_artifacts(env("AIA", Path::new("r")), Some(&stats(2, 0, 1)), None);
        assert_eq!(row.status, STATUS_FAILED);
        assert_eq!(row.counts, Counts::new(2, 1));
        assert_eq!(row.details, "2/3 tests passed");
    }

    #[test]
    fn test_one_healthy_one_missing() {
        let dir = tempfile::tempdir().unwrap();
        let demo = env("DEMO", dir.path());
        let aia = env("AIA", dir.path());
        stats(4, 0, 0).write(&demo.result_file).unwrap();

        let report = HealthReport::collect(&[demo, aia], Local::now());
        assert_eq!(report.totals, Counts { passed: 4, failed: 1, total: 5 });
        assert_eq!(report.overall_status, OVERALL_ISSUES);
        assert_eq!(
            report.subject,
            "Certification Health Check (Frontend) - ❌ ISSUES DETECTED (4/5 tests passed)"
        );
        assert_eq!(report.results[0].status, STATUS_PASSED);
        assert_eq!(report.results[1].counts, Counts::new(0, 1));
        assert_eq!(report.status_line(), "DEMO: ✅ PASSED, AIA: ❌ FAILED");
    }

    #[test]
    fn test_totals_hold_for_any_file_mix() {
        let dir = tempfile::tempdir().unwrap();
        let envs = catalogue(dir.path(), |_| None);

        // present, malformed, absent, failing, flaky
        stats(1, 0, 0).write(&envs[0].result_file).unwrap();
        std::fs::write(&envs[1].result_file, "{\"stats\": ").unwrap();
        stats(0, 1, 0).write(&envs[3].result_file).unwrap();
        stats(3, 0, 2).write(&envs[4].result_file).unwrap();
        std::fs::write(&envs[4].summary_file, "garbage").unwrap();

        let report = HealthReport::collect(&envs, Local::now());
        for row in &report.results {
            assert_eq!(row.counts.passed + row.counts.failed, row.counts.total);
        }
        assert_eq!(report.totals.passed + report.totals.failed, report.totals.total);
        assert_eq!(report.totals.passed, 4);
        // malformed, three absent, one failing, two flaky
        assert_eq!(report.totals.failed, 1 + 3 + 1 + 2);
        assert_eq!(report.results[1].details, "No test results found");
        assert!(report.results[4].summary.is_none());
    }

    #[test]
    fn test_all_healthy_subject() {
        let dir = tempfile::tempdir().unwrap();
        let demo = env("DEMO", dir.path());
        stats(4, 0, 0).write(&demo.result_file).unwrap();

        let report = HealthReport::collect(&[demo], Local::now());
        assert!(report.healthy());
        assert_eq!(
            report.subject,
            "Certification Health Check (Frontend) - ✅ ALL SYSTEMS HEALTHY (4/4 tests passed)"
        );
        assert!(report.html.contains(OVERALL_HEALTHY));
    }
}
