//! Core types for certcheck

use serde::{Deserialize, Serialize};

/// Labels rendered inside the dropdown that are navigation controls,
/// never certifications.
pub const CONTROL_LABELS: [&str; 3] = ["Cancel", "Back", "Continue"];

/// One expected dropdown entry. Identity is the title.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CertificationRecord {
    pub title: String,
    pub subtitle: String,
}

impl CertificationRecord {
    pub fn new(title: impl Into<String>, subtitle: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: subtitle.into(),
        }
    }
}

/// Whether a rendered heading is one of the dropdown's control labels
pub fn is_control_label(text: &str) -> bool {
    CONTROL_LABELS.contains(&text.trim())
}

/// Trim every text and drop the empty ones, keeping document order
pub fn clean_texts<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    raw.into_iter()
        .map(|text| text.as_ref().trim().to_string())
        .filter(|text| !text.is_empty())
        .collect()
}

/// Like [`clean_texts`] but also drops control labels
pub fn clean_titles<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    clean_texts(raw)
        .into_iter()
        .filter(|text| !is_control_label(text))
        .collect()
}

/// Text scraped from the open dropdown, in document order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub actual_titles: Vec<String>,
    pub actual_subtitles: Vec<String>,
}

impl ExtractionResult {
    /// Build from raw element texts, applying the trimming and control
    /// label rules.
    pub fn from_raw<T, S>(titles: T, subtitles: S) -> Self
    where
        T: IntoIterator,
        T::Item: AsRef<str>,
        S: IntoIterator,
        S::Item: AsRef<str>,
    {
        Self {
            actual_titles: clean_titles(titles),
            actual_subtitles: clean_texts(subtitles),
        }
    }

    /// At least one real certification title has rendered
    pub fn certifications_loaded(&self) -> bool {
        !self.actual_titles.is_empty()
    }
}

/// Outcome of comparing a fixture against extracted text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationResult {
    pub missing_titles: Vec<String>,
    pub missing_subtitles: Vec<String>,
    pub extra_titles: Vec<String>,
}

impl ReconciliationResult {
    pub fn is_complete(&self) -> bool {
        self.missing_titles.is_empty() && self.missing_subtitles.is_empty()
    }
}
