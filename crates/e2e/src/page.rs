//! The browser page as seen by the registration flow

use async_trait::async_trait;
use certcheck_common::DropdownProbe;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::E2eResult;

/// Element state to wait for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaitState {
    #[default]
    Visible,
    Hidden,
    Attached,
    Detached,
}

impl std::fmt::Display for WaitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WaitState::Visible => write!(f, "visible"),
            WaitState::Hidden => write!(f, "hidden"),
            WaitState::Attached => write!(f, "attached"),
            WaitState::Detached => write!(f, "detached"),
        }
    }
}

/// One open page. Implementations also answer dropdown queries.
#[async_trait]
pub trait BrowserPage: DropdownProbe {
    /// Navigate to an absolute URL, waiting for `domcontentloaded`
    async fn goto(&self, url: &str, timeout: Duration) -> E2eResult<()>;

    async fn fill(&self, selector: &str, value: &str, timeout: Duration) -> E2eResult<()>;

    async fn click(&self, selector: &str, timeout: Duration) -> E2eResult<()>;

    async fn wait_for(&self, selector: &str, state: WaitState, timeout: Duration) -> E2eResult<()>;

    /// Full-page PNG screenshot
    async fn screenshot(&self, path: &Path) -> E2eResult<()>;

    fn as_probe(&self) -> &dyn DropdownProbe;
}
