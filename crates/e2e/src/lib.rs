//! certcheck E2E verification
//!
//! Drives a real browser through the registration flow of each deployed
//! environment and checks the qualification dropdown against a fixture:
//! - Controls Playwright through a long-lived node driver
//! - Opens the dropdown via the step-one registration form
//! - Extracts and reconciles titles and subtitles with bounded polling
//! - Writes the per-environment summary, results and screenshot
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 verify_environment (Rust)                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  SummaryGuard (written on every exit path)                  │
//! │  open_dropdown(page)        /new -> step 1 -> dropdown      │
//! │  extract(probe)             load poll, settle, collect      │
//! │  reconcile_live(probe)      per-item title/subtitle polls   │
//! │  select_certification(page) click first, wait hidden       │
//! │  screenshot + <env>-results.json                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  BrowserPage: PlaywrightSession  <- JSON lines ->  node     │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod flow;
pub mod page;
pub mod playwright;
pub mod runner;

pub use error::{E2eError, E2eResult};
pub use flow::Applicant;
pub use page::{BrowserPage, WaitState};
pub use playwright::{Browser, PlaywrightConfig, PlaywrightSession};
pub use runner::{verify_environment, verify_environments, VerificationResult, VerificationSuite};
