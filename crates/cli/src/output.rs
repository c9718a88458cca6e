//! Output formatting for CLI

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

use certcheck_common::{CertificationRecord, EnvironmentDescriptor, EnvironmentReport};
use certcheck_e2e::VerificationResult;

/// Output format
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
    /// Plain text format
    Plain,
}

/// Trait for items that can be displayed in a table
pub trait TableDisplay {
    fn headers() -> Vec<&'static str>;
    fn row(&self) -> Vec<String>;
}

/// Build a table for a list of items
pub fn table<T: TableDisplay>(items: &[T]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(T::headers());
    for item in items {
        table.add_row(item.row());
    }
    table
}

/// Print a list of items
pub fn print_list<T: Serialize + TableDisplay>(items: &[T], format: OutputFormat) -> anyhow::Result<()> {
    if items.is_empty() {
        println!("No items found.");
        return Ok(());
    }

    match format {
        OutputFormat::Table => println!("{}", table(items)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(items)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(items)?),
        OutputFormat::Plain => {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    println!("---");
                }
                let row = item.row();
                for (header, value) in T::headers().iter().zip(row.iter()) {
                    println!("{}: {}", header, value);
                }
            }
        }
    }
    Ok(())
}

/// Print success message
pub fn print_success(message: &str) {
    println!("✅ {}", message);
}

/// Print error message
pub fn print_error(message: &str) {
    eprintln!("❌ {}", message);
}

/// Print warning message
pub fn print_warning(message: &str) {
    println!("⚠️  {}", message);
}

/// Print info message
pub fn print_info(message: &str) {
    println!("ℹ️  {}", message);
}

fn none_if_empty(items: &[String]) -> String {
    if items.is_empty() {
        "None".to_string()
    } else {
        items.join(", ")
    }
}

impl TableDisplay for EnvironmentReport {
    fn headers() -> Vec<&'static str> {
        vec!["Environment", "Status", "Details", "URL", "Missing Certifications"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.environment.name.clone(),
            self.status.clone(),
            self.details.clone(),
            self.environment.url.clone(),
            none_if_empty(self.missing_certifications()),
        ]
    }
}

impl TableDisplay for EnvironmentDescriptor {
    fn headers() -> Vec<&'static str> {
        vec!["Environment", "URL", "Description", "Results", "Summary"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.url.clone(),
            self.description.clone(),
            self.result_file.display().to_string(),
            self.summary_file.display().to_string(),
        ]
    }
}

impl TableDisplay for CertificationRecord {
    fn headers() -> Vec<&'static str> {
        vec!["Title", "Subtitle"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.title.clone(), self.subtitle.clone()]
    }
}

impl TableDisplay for VerificationResult {
    fn headers() -> Vec<&'static str> {
        vec!["Environment", "Result", "Duration", "Missing Titles", "Missing Subtitles"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.environment.clone(),
            if self.success { "✅ PASSED" } else { "❌ FAILED" }.to_string(),
            format!("{:.1}s", self.duration_ms as f64 / 1000.0),
            none_if_empty(&self.summary.missing_certifications),
            none_if_empty(&self.summary.missing_subtitles),
        ]
    }
}
