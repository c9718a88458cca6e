//! Error types for dropdown verification

use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Playwright not found. Install with: npm install playwright && npx playwright install")]
    PlaywrightNotFound,

    #[error("Playwright error: {0}")]
    Playwright(String),

    #[error("Playwright driver exited unexpectedly")]
    DriverExited,

    #[error("Step failed: {step} - {reason}")]
    StepFailed { step: String, reason: String },

    #[error("Timeout waiting for: {0}")]
    Timeout(String),

    #[error(transparent)]
    Check(#[from] certcheck_common::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl E2eError {
    pub fn is_timeout(&self) -> bool {
        match self {
            E2eError::Timeout(_) => true,
            E2eError::Check(e) => e.is_timeout(),
            _ => false,
        }
    }
}

impl From<E2eError> for certcheck_common::Error {
    fn from(e: E2eError) -> Self {
        match e {
            E2eError::Check(inner) => inner,
            other => certcheck_common::Error::Browser(other.to_string()),
        }
    }
}

pub type E2eResult<T> = Result<T, E2eError>;
