//! Error types for certcheck

use thiserror::Error;

/// Result type alias using certcheck Error
pub type Result<T> = std::result::Result<T, Error>;

/// certcheck error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Fixture error: {0}")]
    Fixture(String),

    #[error("Unknown environment: {0}")]
    UnknownEnvironment(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Missing SMTP or mail env vars: {}", .0.join(", "))]
    MissingMailSettings(Vec<String>),

    #[error("Timed out after {seconds}s waiting for: {what}")]
    Timeout { what: String, seconds: u64 },

    #[error("{environment} verification failed:\n{}", .failures.join("\n"))]
    MissingItems {
        environment: String,
        failures: Vec<String>,
    },

    #[error("Browser error: {0}")]
    Browser(String),
}

impl Error {
    /// Whether this error came from a bounded wait running out
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }
}
