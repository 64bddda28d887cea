//! Flat report rows built from alerts, and the workbook they are saved to.

pub mod writer;

use crate::alert::Alert;
use crate::github::types::Repository;

pub use writer::{report_filename, write_report, ReportError};

/// Placeholder for fields a source alert does not carry.
pub const NOT_AVAILABLE: &str = "N/A";

pub const COLUMNS: [&str; 12] = [
    "Repository",
    "Alert Type",
    "Alert Number",
    "Description",
    "Severity",
    "Package Name",
    "Vulnerable Version Range",
    "Patched Version",
    "State",
    "Created At",
    "Updated At",
    "URL",
];

/// One line of the report.
///
/// The three dependabot-only columns are `None` on other rows and are left
/// blank in the workbook; on dependabot rows a missing value is "N/A".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub repository: String,
    pub alert_type: String,
    pub alert_number: u64,
    pub description: String,
    pub severity: String,
    pub package_name: Option<String>,
    pub vulnerable_version_range: Option<String>,
    pub patched_version: Option<String>,
    pub state: String,
    pub created_at: String,
    pub updated_at: String,
    pub url: String,
}

fn or_na(value: Option<&str>) -> String {
    value.unwrap_or(NOT_AVAILABLE).to_string()
}

impl ReportRow {
    pub fn from_alert(repository: &Repository, alert: &Alert) -> Self {
        let (description, severity, package_name, vulnerable_version_range, patched_version) =
            match alert {
                Alert::CodeScanning(a) => (
                    a.rule.description.clone(),
                    or_na(a.rule.severity.as_deref()),
                    None,
                    None,
                    None,
                ),
                Alert::Dependabot(a) => (
                    or_na(a.security_advisory.description.as_deref()),
                    a.security_advisory.severity.clone(),
                    Some(or_na(a.package_name())),
                    Some(or_na(a.vulnerable_range())),
                    Some(or_na(a.patched_versions())),
                ),
                Alert::SecretScanning(a) => (
                    a.secret_type_display_name.clone(),
                    NOT_AVAILABLE.to_string(),
                    None,
                    None,
                    None,
                ),
            };

        Self {
            repository: repository.name.clone(),
            alert_type: alert.kind().label().to_string(),
            alert_number: alert.number(),
            description,
            severity,
            package_name,
            vulnerable_version_range,
            patched_version,
            state: alert.state().to_string(),
            created_at: alert.created_at().to_string(),
            updated_at: alert.updated_at().to_string(),
            url: alert.html_url().to_string(),
        }
    }
}

/// Rows for one repository, keeping alert order.
pub fn rows_for_repository(repository: &Repository, alerts: &[Alert]) -> Vec<ReportRow> {
    alerts
        .iter()
        .map(|alert| ReportRow::from_alert(repository, alert))
        .collect()
}
