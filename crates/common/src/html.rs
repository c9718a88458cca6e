//! HTML body of the health-check email

use crate::report::{EnvironmentReport, HealthReport};

/// Escape text for HTML element content and attribute values
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn missing_cell(row: &EnvironmentReport) -> String {
    let missing = row.missing_certifications();
    if missing.is_empty() {
        "None".to_string()
    } else {
        escape(&missing.join(", "))
    }
}

fn table_row(row: &EnvironmentReport) -> String {
    format!(
        r#"
        <tr>
          <td><strong>{name}</strong></td>
          <td>{status}</td>
          <td>{details}</td>
          <td>{url}</td>
          <td>{missing}</td>
        </tr>"#,
        name = escape(&row.environment.name),
        status = escape(&row.status),
        details = escape(&row.details),
        url = escape(&row.environment.url),
        missing = missing_cell(row),
    )
}

fn detail_item(row: &EnvironmentReport) -> String {
    let missing = row.missing_certifications();
    let note = if missing.is_empty() {
        "<em>No missing certifications detected.</em>".to_string()
    } else {
        format!(
            "<em>Missing certifications:</em> {}",
            escape(&missing.join(", "))
        )
    };

    format!(
        r#"
        <li>
          <strong>{name}:</strong> {details}.<br/>
          Expected: {expected} |
          Detected: {detected} |
          Missing: {missing_count}<br/>
          {note}
        </li>"#,
        name = escape(&row.environment.name),
        details = escape(&row.details),
        expected = row.expected_count(),
        detected = row.detected_count(),
        missing_count = missing.len(),
        note = note,
    )
}

/// Render the email body. Pure: reads nothing but the report.
pub fn render(report: &HealthReport) -> String {
    let mut html = String::new();

    html.push_str(&format!(
        r#"
    <h2>🔍 Daily Certification Health Check Report</h2>
    <p><strong>Overall Status:</strong> {status}</p>
    <p><strong>Total Tests:</strong> {total} ({passed} passed, {failed} failed)</p>
    <p><strong>Generated:</strong> {generated}</p>
"#,
        status = escape(&report.overall_status),
        total = report.totals.total,
        passed = report.totals.passed,
        failed = report.totals.failed,
        generated = report.generated_at.format("%Y-%m-%d %H:%M:%S"),
    ));

    html.push_str(
        r#"
    <h3>Environment Status:</h3>
    <table border="1" cellpadding="8" cellspacing="0" style="border-collapse: collapse; width: 100%;">
      <tr style="background-color: #f0f0f0;">
        <th>Environment</th>
        <th>Status</th>
        <th>Details</th>
        <th>URL</th>
        <th>Missing Certifications</th>
      </tr>"#,
    );
    for row in &report.results {
        html.push_str(&table_row(row));
    }
    html.push_str("\n    </table>\n");

    html.push_str("\n    <h3>Certification Validation Details:</h3>\n    <ul>");
    for row in &report.results {
        html.push_str(&detail_item(row));
    }
    html.push_str("\n    </ul>\n");

    html.push_str(
        r#"
    <p><em>This is an automated health check report. If any environment shows ❌ FAILED, please investigate the certification dropdown functionality.</em></p>
"#,
    );

    html
}
