//! certcheck common library
//!
//! Certification fixtures, dropdown extraction and reconciliation, the
//! per-environment artifacts, and the aggregated health report.

pub mod config;
pub mod environment;
pub mod error;
pub mod extract;
pub mod fixture;
pub mod html;
pub mod reconcile;
pub mod report;
pub mod results;
pub mod retry;
pub mod summary;
pub mod types;

// Re-export commonly used types
pub use config::{HarnessConfig, MailConfig, Timeouts};
pub use environment::EnvironmentDescriptor;
pub use error::{Error, Result};
pub use extract::{DropdownProbe, PollingPolicy};
pub use fixture::Fixture;
pub use report::{Counts, EnvironmentReport, HealthReport};
pub use results::{RunResults, RunStats};
pub use retry::{Clock, ManualClock, RetryPolicy, SystemClock};
pub use summary::{EnvironmentSummary, SummaryGuard, SummaryStatus};
pub use types::*;

/// certcheck version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default directory for results, summaries and screenshots
pub const DEFAULT_REPORT_DIR: &str = "report";

/// Default directory searched for fixture YAML files
pub const DEFAULT_FIXTURES_DIR: &str = "fixtures";
