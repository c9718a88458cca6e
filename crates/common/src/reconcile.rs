//! Expected-versus-actual certification reconciliation
//!
//! Titles match when, ignoring case, either one contains the other. The
//! same rule decides both "missing" and "extra".

use tracing::info;

use crate::extract::{sample_titles, DropdownProbe};
use crate::retry::{Clock, RetryPolicy};
use crate::summary::EnvironmentSummary;
use crate::types::{CertificationRecord, ExtractionResult, ReconciliationResult};

/// Case-insensitive containment in either direction
pub fn titles_match(actual: &str, expected: &str) -> bool {
    let actual = actual.trim().to_lowercase();
    let expected = expected.trim().to_lowercase();
    if actual.is_empty() || expected.is_empty() {
        return actual == expected;
    }
    actual == expected || actual.contains(&expected) || expected.contains(&actual)
}

/// Whether any rendered subtitle contains the expected one, ignoring case
pub fn subtitle_present(actual_subtitles: &[String], expected: &str) -> bool {
    let expected = expected.trim().to_lowercase();
    actual_subtitles
        .iter()
        .any(|actual| actual.to_lowercase().contains(&expected))
}

/// Actual titles that match none of the expected ones, in document order
pub fn extra_titles(expected: &[CertificationRecord], actual_titles: &[String]) -> Vec<String> {
    actual_titles
        .iter()
        .filter(|actual| !expected.iter().any(|cert| titles_match(actual, &cert.title)))
        .cloned()
        .collect()
}

/// Reconcile a fixture against one fixed extraction
pub fn reconcile(expected: &[CertificationRecord], extraction: &ExtractionResult) -> ReconciliationResult {
    let mut result = ReconciliationResult {
        extra_titles: extra_titles(expected, &extraction.actual_titles),
        ..Default::default()
    };

    for cert in expected {
        if !extraction
            .actual_titles
            .iter()
            .any(|actual| titles_match(actual, &cert.title))
        {
            result.missing_titles.push(cert.title.clone());
        }
        if !subtitle_present(&extraction.actual_subtitles, &cert.subtitle) {
            result.missing_subtitles.push(cert.subtitle.clone());
        }
    }

    result
}

/// Reconcile against a live dropdown.
///
/// Every fixture entry gets its own bounded poll for the title and another
/// for the subtitle. Every entry is checked and every miss is collected.
/// Extra titles come from `extraction`.
///
/// `summary` is kept current while the checks run: every expected item is
/// listed as missing until its poll succeeds. If the future is dropped
/// partway, the summary still lists everything not yet confirmed.
pub async fn reconcile_live(
    expected: &[CertificationRecord],
    extraction: &ExtractionResult,
    probe: &dyn DropdownProbe,
    policy: &RetryPolicy,
    clock: &dyn Clock,
    environment: &str,
    summary: &mut EnvironmentSummary,
) -> ReconciliationResult {
    let mut result = ReconciliationResult {
        extra_titles: extra_titles(expected, &extraction.actual_titles),
        ..Default::default()
    };
    summary.missing_certifications = expected.iter().map(|c| c.title.clone()).collect();
    summary.missing_subtitles = expected.iter().map(|c| c.subtitle.clone()).collect();
    summary.extra_certifications = result.extra_titles.clone();

    for cert in expected {
        info!("{}: Checking for certification: {}", environment, cert.title);
        let title = cert.title.as_str();

        let found = policy
            .poll(clock, move |attempt| async move {
                let titles = sample_titles(probe).await;
                if titles.iter().any(|actual| titles_match(actual, title)) {
                    Some(())
                } else {
                    info!(
                        "{}: Retrying title check for {} (attempt {}/{})...",
                        environment, title, attempt, policy.max_attempts
                    );
                    None
                }
            })
            .await;

        match found {
            Ok(()) => {
                info!("{} Found: {}", environment, title);
                summary.confirm_title(title);
            }
            Err(_) => result.missing_titles.push(cert.title.clone()),
        }

        let subtitle = cert.subtitle.as_str();
        let visible = policy
            .poll(clock, move |attempt| async move {
                if probe.is_text_visible(subtitle).await.unwrap_or(false) {
                    Some(())
                } else {
                    info!(
                        "{}: Retrying subtitle check for {} (attempt {}/{})...",
                        environment, subtitle, attempt, policy.max_attempts
                    );
                    None
                }
            })
            .await;

        match visible {
            Ok(()) => {
                info!("{} Subtitle Found: {}", environment, subtitle);
                summary.confirm_subtitle(subtitle);
            }
            Err(_) => result.missing_subtitles.push(cert.subtitle.clone()),
        }
    }

    result
}

/// One human-readable line per missing item, listing what was rendered
pub fn failure_messages(
    environment: &str,
    result: &ReconciliationResult,
    extraction: &ExtractionResult,
) -> Vec<String> {
    let found = |items: &[String]| {
        if items.is_empty() {
            "none".to_string()
        } else {
            items.join(", ")
        }
    };

    let titles = result.missing_titles.iter().map(|title| {
        format!(
            "{} certification missing: {}\nTitles found: {}",
            environment,
            title,
            found(&extraction.actual_titles)
        )
    });
    let subtitles = result.missing_subtitles.iter().map(|subtitle| {
        format!(
            "{} subtitle missing: {}\nSubtitles found: {}",
            environment,
            subtitle,
            found(&extraction.actual_subtitles)
        )
    });

    titles.chain(subtitles).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::tests::ScriptedDropdown;
    use crate::fixture::builtin;
    use crate::retry::ManualClock;
    use std::time::Duration;

    fn ageing() -> Vec<CertificationRecord> {
        vec![CertificationRecord::new(
            "CHC33021 Certificate IV in Ageing Support",
            "Certificate IV in Ageing Support",
        )]
    }

    #[test]
    fn test_titles_match_rules() {
        assert!(titles_match("CHC33021 Certificate IV", "chc33021 certificate iv"));
        assert!(titles_match("CHC33021 Certificate IV in Ageing Support (new)", "CHC33021 Certificate IV in Ageing Support"));
        assert!(titles_match("CHC33021 Certificate", "CHC33021 Certificate IV in Ageing Support"));
        assert!(!titles_match("BSB50420 Diploma", "CHC33021 Certificate IV"));
        assert!(!titles_match("", "CHC33021"));
    }

    #[test]
    fn test_exact_match_has_nothing_missing() {
        let extraction = ExtractionResult::from_raw(
            ["CHC33021 Certificate IV in Ageing Support"],
            ["Certificate IV in Ageing Support"],
        );
        let result = reconcile(&ageing(), &extraction);
        assert!(result.missing_titles.is_empty());
        assert!(result.missing_subtitles.is_empty());
        assert!(result.extra_titles.is_empty());
        assert!(result.is_complete());
    }

    #[test]
    fn test_empty_extraction_reports_everything_missing() {
        let result = reconcile(&ageing(), &ExtractionResult::default());
        assert_eq!(result.missing_titles, vec!["CHC33021 Certificate IV in Ageing Support"]);
        assert_eq!(result.missing_subtitles, vec!["Certificate IV in Ageing Support"]);
    }

    #[test]
    fn test_extra_titles_exclude_matching_ones() {
        let expected = builtin("AIA").unwrap().certifications;
        let extraction = ExtractionResult::from_raw(
            [
                "bsb50420 diploma of leadership management",
                "CHC43015 Certificate III",
                "SIT30622 Certificate III in Hospitality",
            ],
            Vec::<String>::new(),
        );
        let result = reconcile(&expected, &extraction);
        assert_eq!(result.extra_titles, vec!["SIT30622 Certificate III in Hospitality"]);
        for extra in &result.extra_titles {
            assert!(!expected.iter().any(|c| titles_match(extra, &c.title)));
        }
        assert_eq!(result.missing_titles.len(), 4);
    }

    #[test]
    fn test_reconcile_is_deterministic() {
        let expected = builtin("AIA-STAGE").unwrap().certifications;
        let extraction = ExtractionResult::from_raw(
            ["CHC52025 Diploma of Community Services", "Unknown", "Unknown"],
            ["Diploma of Community Services"],
        );
        assert_eq!(reconcile(&expected, &extraction), reconcile(&expected, &extraction));
    }

    #[tokio::test]
    async fn test_live_reconcile_waits_for_late_title() {
        let dropdown = ScriptedDropdown::new(
            vec![vec![], vec!["CHC33021 Certificate IV in Ageing Support"]],
            vec!["Certificate IV in Ageing Support"],
        );
        let clock = ManualClock::new();
        let extraction = ExtractionResult::default();
        let mut summary = EnvironmentSummary::default();

        let result = reconcile_live(
            &ageing(),
            &extraction,
            &dropdown,
            &RetryPolicy::default(),
            &clock,
            "AIA-STAGE",
            &mut summary,
        )
        .await;
        assert!(result.is_complete());
        assert!(summary.missing_certifications.is_empty());
        assert!(summary.missing_subtitles.is_empty());
        assert_eq!(clock.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_live_reconcile_collects_all_misses() {
        let expected = builtin("AIA-STAGE").unwrap().certifications;
        let dropdown = ScriptedDropdown::new(
            vec![vec!["BSB50420 Diploma of Leadership Management"]],
            vec!["Diploma of Leadership Management"],
        );
        let clock = ManualClock::new();
        let extraction = ExtractionResult::from_raw(
            ["BSB50420 Diploma of Leadership Management"],
            ["Diploma of Leadership Management"],
        );
        let mut summary = EnvironmentSummary::default();

        let result = reconcile_live(
            &expected,
            &extraction,
            &dropdown,
            &RetryPolicy::attempts(5, Duration::from_secs(2)),
            &clock,
            "AIA-STAGE",
            &mut summary,
        )
        .await;
        assert_eq!(summary.missing_certifications, result.missing_titles);
        assert_eq!(summary.missing_subtitles, result.missing_subtitles);

        assert_eq!(result.missing_titles.len(), 5);
        assert!(!result.missing_titles.contains(&expected[0].title));
        assert_eq!(result.missing_subtitles.len(), 5);
        assert!(!result.missing_subtitles.contains(&expected[0].subtitle));
        // 5 samples, 4 sleeps, for each of the 10 failed checks
        assert_eq!(clock.elapsed(), Duration::from_secs(80));

        let messages = failure_messages("AIA-STAGE", &result, &extraction);
        assert_eq!(messages.len(), 10);
        assert!(messages[0].contains("Titles found: BSB50420 Diploma of Leadership Management"));
    }

    #[test]
    fn test_failure_messages_say_none_when_nothing_rendered() {
        let extraction = ExtractionResult::default();
        let result = reconcile(&ageing(), &extraction);
        let messages = failure_messages("AIA", &result, &extraction);
        assert_eq!(
            messages[0],
            "AIA certification missing: CHC33021 Certificate IV in Ageing Support\nTitles found: none"
        );
        assert!(messages[1].ends_with("Subtitles found: none"));
    }
}
