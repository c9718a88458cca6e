//! The deployed environments under test

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// A known deployment with its URL override variable
#[derive(Debug, Clone, Copy)]
pub struct KnownEnvironment {
    pub name: &'static str,
    pub url_var: &'static str,
    pub default_url: &'static str,
    pub description: &'static str,
}

/// Every environment the health check covers, in report order
pub const ENVIRONMENTS: [KnownEnvironment; 7] = [
    KnownEnvironment {
        name: "DEMO",
        url_var: "DEMO_URL",
        default_url: "https://demo.certified.io",
        description: "Validates 4 certification options in dropdown",
    },
    KnownEnvironment {
        name: "ETRAINING",
        url_var: "ETRAINING_URL",
        default_url: "https://etraining.certified.io",
        description: "Validates 3 certification cards (with subtitles)",
    },
    KnownEnvironment {
        name: "ETRAINING-STAGE",
        url_var: "ETRAINING_STAGE_URL",
        default_url: "https://etraining-stage.certified.io",
        description: "Validates 3 certification cards (with subtitles)",
    },
    KnownEnvironment {
        name: "AIA",
        url_var: "AIA_URL",
        default_url: "https://aia45775.certified.io",
        description: "Validates 6 certification options (BSB/CHC qualifications)",
    },
    KnownEnvironment {
        name: "AIA-STAGE",
        url_var: "AIA_STAGE_URL",
        default_url: "https://aia-stage.certified.io",
        description: "Validates 6 certification options (BSB/CHC qualifications)",
    },
    KnownEnvironment {
        name: "AIFT",
        url_var: "AIFT_URL",
        default_url: "https://aift45665.certified.io",
        description: "Validates 4 certification options (Building & Construction)",
    },
    KnownEnvironment {
        name: "AIFT-STAGE",
        url_var: "AIFT_STAGE_URL",
        default_url: "https://aift-stage.certified.io",
        description: "Validates 4 certification options (Building & Construction)",
    },
];

/// Everything the harness and the report need to know about one environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentDescriptor {
    pub name: String,
    pub url: String,
    pub description: String,
    pub result_file: PathBuf,
    pub summary_file: PathBuf,
    pub screenshot_file: PathBuf,
}

impl EnvironmentDescriptor {
    /// Descriptor with the conventional file names under `report_dir`
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        description: impl Into<String>,
        report_dir: &Path,
    ) -> Self {
        let name = name.into();
        let slug = slug(&name);
        Self {
            result_file: report_dir.join(format!("{}-results.json", slug)),
            summary_file: report_dir.join(format!("{}-summary.json", slug)),
            screenshot_file: report_dir
                .join(format!("{}-certification-dropdown-validated.png", slug)),
            name,
            url: url.into(),
            description: description.into(),
        }
    }

    pub fn slug(&self) -> String {
        slug(&self.name)
    }
}

/// `ETRAINING-STAGE` -> `etraining-stage`
pub fn slug(name: &str) -> String {
    name.trim().to_ascii_lowercase().replace(&[' ', '_'][..], "-")
}

/// Build descriptors for every known environment. `lookup` resolves URL
/// override variables; unset or blank values fall back to the default.
pub fn catalogue<F>(report_dir: &Path, lookup: F) -> Vec<EnvironmentDescriptor>
where
    F: Fn(&str) -> Option<String>,
{
    ENVIRONMENTS
        .iter()
        .map(|env| {
            let url = lookup(env.url_var)
                .map(|u| u.trim().trim_end_matches('/').to_string())
                .filter(|u| !u.is_empty())
                .unwrap_or_else(|| env.default_url.to_string());
            EnvironmentDescriptor::new(env.name, url, env.description, report_dir)
        })
        .collect()
}

/// Find a descriptor by name or slug, ignoring case
pub fn find<'a>(
    environments: &'a [EnvironmentDescriptor],
    name: &str,
) -> Result<&'a EnvironmentDescriptor> {
    let wanted = slug(name);
    environments
        .iter()
        .find(|env| env.slug() == wanted)
        .ok_or_else(|| Error::UnknownEnvironment(name.to_string()))
}
