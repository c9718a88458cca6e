//! Harness and mail configuration
//!
//! Both structs are assembled once at process start from a variable lookup
//! (normally the process environment, after `.env` is loaded) and then
//! passed down explicitly.

use secrecy::SecretBox;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::environment::{self, EnvironmentDescriptor};
use crate::error::{Error, Result};
use crate::extract::PollingPolicy;
use crate::retry::millis;

/// Browser-side time limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeouts {
    /// Page navigation
    #[serde(with = "millis")]
    pub navigation: Duration,

    /// Fills, clicks and waits for a single element
    #[serde(with = "millis")]
    pub action: Duration,

    /// Waiting for the second registration step to appear
    #[serde(with = "millis")]
    pub step_load: Duration,

    /// Waiting for the dropdown to close after a selection
    #[serde(with = "millis")]
    pub dropdown_close: Duration,

    /// Ceiling for one whole environment run
    #[serde(with = "millis")]
    pub test: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            navigation: Duration::from_secs(180),
            action: Duration::from_secs(60),
            step_load: Duration::from_secs(180),
            dropdown_close: Duration::from_secs(30),
            test: Duration::from_secs(300),
        }
    }
}

/// Configuration for verification runs and report aggregation
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Where results, summaries and screenshots are written
    pub report_dir: PathBuf,

    /// Optional directory of fixture YAML files
    pub fixtures_dir: Option<PathBuf>,

    pub environments: Vec<EnvironmentDescriptor>,
    pub timeouts: Timeouts,
    pub polling: PollingPolicy,
}

impl HarnessConfig {
    /// Read URL overrides from the process environment
    pub fn from_env(report_dir: impl Into<PathBuf>) -> Self {
        Self::from_lookup(report_dir, |key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(report_dir: impl Into<PathBuf>, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let report_dir = report_dir.into();
        Self {
            environments: environment::catalogue(&report_dir, lookup),
            report_dir,
            fixtures_dir: None,
            timeouts: Timeouts::default(),
            polling: PollingPolicy::default(),
        }
    }

    pub fn with_fixtures_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.fixtures_dir = dir;
        self
    }

    pub fn environment(&self, name: &str) -> Result<&EnvironmentDescriptor> {
        environment::find(&self.environments, name)
    }

    pub fn fixtures_dir(&self) -> Option<&Path> {
        self.fixtures_dir.as_deref()
    }
}

/// SMTP delivery settings
#[derive(Debug)]
pub struct MailConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: SecretBox<String>,
    pub from: String,
    pub to: Vec<String>,
}

pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Port that speaks TLS from the first byte instead of STARTTLS
pub const IMPLICIT_TLS_PORT: u16 = 465;

impl MailConfig {
    /// Read `SMTP_*` and `MAIL_*` from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Every missing variable is reported at once
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let required = ["SMTP_HOST", "SMTP_USER", "SMTP_PASS", "MAIL_FROM", "MAIL_TO"];
        let missing: Vec<String> = required
            .iter()
            .filter(|key| get(**key).is_none())
            .map(|key| key.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(Error::MissingMailSettings(missing));
        }

        let port = match get("SMTP_PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|_| Error::InvalidConfig(format!("SMTP_PORT is not a port: {}", raw)))?,
            None => DEFAULT_SMTP_PORT,
        };

        let to: Vec<String> = get("MAIL_TO")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if to.is_empty() {
            return Err(Error::MissingMailSettings(vec!["MAIL_TO".to_string()]));
        }

        Ok(Self {
            host: get("SMTP_HOST").unwrap_or_default(),
            port,
            user: get("SMTP_USER").unwrap_or_default(),
            password: SecretBox::new(Box::new(get("SMTP_PASS").unwrap_or_default())),
            from: get("MAIL_FROM").unwrap_or_default(),
            to,
        })
    }

    pub fn implicit_tls(&self) -> bool {
        self.port == IMPLICIT_TLS_PORT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_mail_config_complete() {
        let env = vars(&[
            ("SMTP_HOST", "smtp.example.test"),
            ("SMTP_USER", "bot"),
            ("SMTP_PASS", "hunter2"),
            ("MAIL_FROM", "health@example.test"),
            ("MAIL_TO", " ops@example.test, qa@example.test ,"),
        ]);
        let config = MailConfig::from_lookup(|k| env.get(k).cloned()).unwrap();
        assert_eq!(config.port, 587);
        assert!(!config.implicit_tls());
        assert_eq!(config.to, vec!["ops@example.test", "qa@example.test"]);
        assert_eq!(config.password.expose_secret(), "hunter2");
        assert!(!format!("{:?}", config).contains("hunter2"));
    }

    #[test]
    fn test_mail_config_reports_all_missing() {
        let env = vars(&[("SMTP_HOST", "smtp.example.test"), ("SMTP_PASS", "  ")]);
        match MailConfig::from_lookup(|k| env.get(k).cloned()) {
            Err(Error::MissingMailSettings(missing)) => {
                assert_eq!(missing, vec!["SMTP_USER", "SMTP_PASS", "MAIL_FROM", "MAIL_TO"]);
            }
            other => panic!("expected missing settings, got {:?}", other),
        }
    }

    #[test]
    fn test_mail_config_port_465_is_implicit_tls() {
        let env = vars(&[
            ("SMTP_HOST", "smtp.example.test"),
            ("SMTP_PORT", "465"),
            ("SMTP_USER", "bot"),
            ("SMTP_PASS", "pw"),
            ("MAIL_FROM", "a@example.test"),
            ("MAIL_TO", "b@example.test"),
        ]);
        let config = MailConfig::from_lookup(|k| env.get(k).cloned()).unwrap();
        assert!(config.implicit_tls());
    }

    #[test]
    fn test_bad_port_is_invalid_config() {
        let env = vars(&[
            ("SMTP_HOST", "h"),
            ("SMTP_PORT", "smtp"),
            ("SMTP_USER", "u"),
            ("SMTP_PASS", "p"),
            ("MAIL_FROM", "f@x"),
            ("MAIL_TO", "t@x"),
        ]);
        assert!(matches!(
            MailConfig::from_lookup(|k| env.get(k).cloned()),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_harness_config_defaults() {
        let config = HarnessConfig::from_lookup("report", |_| None);
        assert_eq!(config.environments.len(), 7);
        assert_eq!(config.timeouts.test, Duration::from_secs(300));
        assert_eq!(
            config.environment("aia-stage").unwrap().summary_file,
            Path::new("report/aia-stage-summary.json")
        );
    }
}
