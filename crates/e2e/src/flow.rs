//! Registration flow up to the open qualification dropdown

use certcheck_common::{Clock, Timeouts};
use std::time::Duration;
use tracing::info;

use crate::error::E2eResult;
use crate::page::{BrowserPage, WaitState};

/// The open qualification dropdown panel
pub const DROPDOWN_SELECTOR: &str = r#"div[class*="absolute top-full left-0 right-0 mt-2 bg-white border-2 border-light-grey rounded-2xl shadow-2xl z-10"]"#;

/// Title elements inside the dropdown
pub const TITLE_SELECTOR: &str = "h3";

/// Subtitle elements inside the dropdown
pub const SUBTITLE_SELECTOR: &str = "p";

pub const REGISTRATION_PATH: &str = "/new";
pub const CONTINUE_BUTTON: &str = r#"button:has-text("Continue")"#;
pub const STEP_TWO_HEADING: &str = r#"h1:has-text("Choose Your Path")"#;
pub const DROPDOWN_TRIGGER: &str = r#"div[class*="cursor-pointer"]:has-text("Select your Qualification...")"#;

/// Pause after step two appears before the dropdown is opened
pub const STEP_SETTLE: Duration = Duration::from_secs(2);

/// Throwaway applicant details typed into step one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applicant {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

impl Default for Applicant {
    fn default() -> Self {
        Self {
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            email: "test@example.com".to_string(),
            phone: "0412345678".to_string(),
            password: "TestPass123!".to_string(),
        }
    }
}

impl Applicant {
    fn fields(&self) -> [(&'static str, &str); 5] {
        [
            (r#"input[placeholder="First name"]"#, self.first_name.as_str()),
            (r#"input[placeholder="Last name"]"#, self.last_name.as_str()),
            (r#"input[placeholder="Email address"]"#, self.email.as_str()),
            (r#"input[placeholder="Phone number"]"#, self.phone.as_str()),
            (r#"input[type="password"]"#, self.password.as_str()),
        ]
    }
}

/// `text=<value>` locator
pub fn text_selector(text: &str) -> String {
    format!("text={}", text)
}

/// Complete step one and open the qualification dropdown on step two
pub async fn open_dropdown(
    page: &dyn BrowserPage,
    base_url: &str,
    applicant: &Applicant,
    timeouts: &Timeouts,
    clock: &dyn Clock,
    environment: &str,
) -> E2eResult<()> {
    let url = format!("{}{}", base_url.trim_end_matches('/'), REGISTRATION_PATH);
    info!("{}: Navigating to {}", environment, url);
    page.goto(&url, timeouts.navigation).await?;

    info!("{}: Filling step 1 form...", environment);
    for (selector, value) in applicant.fields() {
        page.fill(selector, value, timeouts.action).await?;
    }

    info!("{}: Clicking Continue...", environment);
    page.click(CONTINUE_BUTTON, timeouts.action).await?;

    page.wait_for(STEP_TWO_HEADING, WaitState::Visible, timeouts.step_load)
        .await?;
    clock.sleep(STEP_SETTLE).await;

    info!("{}: Opening certification dropdown...", environment);
    page.click(DROPDOWN_TRIGGER, timeouts.action).await?;
    page.wait_for(DROPDOWN_SELECTOR, WaitState::Visible, timeouts.action)
        .await?;
    Ok(())
}

/// Pick one entry and confirm the dropdown closes
pub async fn select_certification(
    page: &dyn BrowserPage,
    title: &str,
    timeouts: &Timeouts,
    environment: &str,
) -> E2eResult<()> {
    info!("{} Testing selection of: {}", environment, title);
    page.click(&text_selector(title), timeouts.action).await?;
    page.wait_for(DROPDOWN_SELECTOR, WaitState::Hidden, timeouts.dropdown_close)
        .await?;
    info!("{} Selected: {}", environment, title);
    Ok(())
}
