//! Per-environment test-run statistics
//!
//! The file follows the Playwright JSON reporter layout closely enough that
//! reports produced by either runner can be aggregated: only
//! `stats.expected`, `stats.unexpected` and `stats.flaky` are required.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::error::Result;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RunStats {
    /// Tests that passed
    pub expected: u64,
    /// Tests that failed
    pub unexpected: u64,
    /// Tests that only passed on retry
    pub flaky: u64,
    pub skipped: u64,
    /// Wall time in milliseconds
    pub duration: f64,
}

impl RunStats {
    pub fn passed(&self) -> u64 {
        self.expected
    }

    /// Flaky tests count as failures
    pub fn failed(&self) -> u64 {
        self.unexpected + self.flaky
    }

    pub fn total(&self) -> u64 {
        self.passed() + self.failed()
    }
}

/// Contents of a `<env>-results.json` file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResults {
    #[serde(default)]
    pub stats: RunStats,

    /// Failure messages, when the run recorded any
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl RunResults {
    /// Results of a single test run
    pub fn single(passed: bool, duration_ms: u64, errors: Vec<String>) -> Self {
        Self {
            stats: RunStats {
                expected: u64::from(passed),
                unexpected: u64::from(!passed),
                flaky: 0,
                skipped: 0,
                duration: duration_ms as f64,
            },
            errors,
        }
    }

    /// Read a results file. Missing or malformed files yield `None`.
    pub fn read_optional(path: &Path) -> Option<Self> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) => {
                debug!("No results at {}: {}", path.display(), e);
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(results) => Some(results),
            Err(e) => {
                debug!("Ignoring malformed results {}: {}", path.display(), e);
                None
            }
        }
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_playwright_reporter_output() {
        let json = r#"{
            "config": {"workers": 1},
            "suites": [],
            "stats": {"startTime": "2025-01-01T00:00:00Z", "duration": 1234.5,
                      "expected": 3, "skipped": 1, "unexpected": 1, "flaky": 1}
        }"#;
        let results: RunResults = serde_json::from_str(json).unwrap();
        assert_eq!(results.stats.passed(), 3);
        assert_eq!(results.stats.failed(), 2);
        assert_eq!(results.stats.total(), 5);
    }

    #[test]
    fn test_missing_stats_count_as_zero() {
        let results: RunResults = serde_json::from_str("{}").unwrap();
        assert_eq!(results.stats.total(), 0);
    }

    #[test]
    fn test_single_run_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report/aia-results.json");

        RunResults::single(false, 42_000, vec!["AIA certification missing: X".into()])
            .write(&path)
            .unwrap();

        let read = RunResults::read_optional(&path).unwrap();
        assert_eq!(read.stats.passed(), 0);
        assert_eq!(read.stats.failed(), 1);
        assert_eq!(read.errors.len(), 1);
    }

    #[test]
    fn test_malformed_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("demo-results.json");
        std::fs::write(&path, "<html>not json</html>").unwrap();
        assert!(RunResults::read_optional(&path).is_none());
        assert!(RunResults::read_optional(&dir.path().join("nope.json")).is_none());
    }
}
