//! Expected certification lists, one per environment
//!
//! Fixtures are YAML documents:
//!
//! ```yaml
//! environment: AIA-STAGE
//! certifications:
//!   - title: BSB50420 Diploma of Leadership Management
//!     subtitle: Diploma of Leadership Management
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::CertificationRecord;

/// Ordered expected entries for one environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    /// Environment name, e.g. `AIA-STAGE`
    pub environment: String,

    /// Expected entries in dropdown order
    pub certifications: Vec<CertificationRecord>,
}

impl Fixture {
    /// Parse and validate a fixture from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let fixture: Self = serde_yaml::from_str(yaml)?;
        fixture.validate()?;
        Ok(fixture)
    }

    /// Parse a fixture from a YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
            .map_err(|e| Error::Fixture(format!("{}: {}", path.display(), e)))
    }

    /// Load all fixtures from a directory
    pub fn load_all(dir: &Path) -> Result<Vec<Self>> {
        let mut fixtures = Vec::new();

        for entry in walkdir::WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "yaml" || ext == "yml")
                    .unwrap_or(false)
            })
        {
            debug!("Loading fixture {}", entry.path().display());
            fixtures.push(Self::from_file(entry.path())?);
        }

        Ok(fixtures)
    }

    /// Find the fixture for an environment, falling back to the built-in
    /// ones when the directory has none.
    pub fn for_environment(dir: Option<&Path>, environment: &str) -> Result<Self> {
        if let Some(dir) = dir.filter(|d| d.is_dir()) {
            if let Some(fixture) = Self::load_all(dir)?
                .into_iter()
                .find(|f| f.environment.eq_ignore_ascii_case(environment))
            {
                return Ok(fixture);
            }
        }

        builtin(environment).ok_or_else(|| {
            Error::Fixture(format!("no fixture found for environment {}", environment))
        })
    }

    pub fn titles(&self) -> Vec<String> {
        self.certifications.iter().map(|c| c.title.clone()).collect()
    }

    pub fn subtitles(&self) -> Vec<String> {
        self.certifications.iter().map(|c| c.subtitle.clone()).collect()
    }

    /// The entry the harness selects to prove the dropdown accepts a choice
    pub fn first(&self) -> Option<&CertificationRecord> {
        self.certifications.first()
    }

    fn validate(&self) -> Result<()> {
        if self.environment.trim().is_empty() {
            return Err(Error::Fixture("environment name is empty".to_string()));
        }
        if self.certifications.is_empty() {
            return Err(Error::Fixture(format!(
                "{} has no certifications",
                self.environment
            )));
        }

        let mut seen = HashSet::new();
        for cert in &self.certifications {
            if cert.title.trim().is_empty() {
                return Err(Error::Fixture(format!(
                    "{} has a certification with an empty title",
                    self.environment
                )));
            }
            if !seen.insert(cert.title.as_str()) {
                return Err(Error::Fixture(format!(
                    "{} lists {} twice",
                    self.environment, cert.title
                )));
            }
        }

        Ok(())
    }
}

const AIA_CERTIFICATIONS: [(&str, &str); 6] = [
    (
        "BSB50420 Diploma of Leadership Management",
        "Diploma of Leadership Management",
    ),
    (
        "BSB60420 Advanced Diploma of Leadership Management",
        "Advanced Diploma of Leadership Management",
    ),
    (
        "CHC33021 Certificate IV in Ageing Support",
        "Certificate IV in Ageing Support",
    ),
    (
        "CHC43015 Certificate III in Individual Support",
        "Certificate III in Individual Support",
    ),
    (
        "CHC52025 Diploma of Community Services",
        "Diploma of Community Services",
    ),
    (
        "CHC52025 Graduate Diploma of Management",
        "Graduate Diploma of Management",
    ),
];

/// Fixtures compiled into the binary. AIA and AIA-STAGE share one list.
pub fn builtin(environment: &str) -> Option<Fixture> {
    let name = environment.to_ascii_uppercase();
    match name.as_str() {
        "AIA" | "AIA-STAGE" => Some(Fixture {
            environment: name,
            certifications: AIA_CERTIFICATIONS
                .iter()
                .map(|(title, subtitle)| CertificationRecord::new(*title, *subtitle))
                .collect(),
        }),
        _ => None,
    }
}
