//! CLI Commands

use certcheck_common::HarnessConfig;

use crate::output::OutputFormat;

pub mod environments;
pub mod fixtures;
pub mod report;
pub mod send;
pub mod verify;

/// Settings shared by every command
pub struct Context {
    pub config: HarnessConfig,
    pub format: OutputFormat,
}
