use std::error::Error;
use std::path::PathBuf;

use crate::config::{ConfigError, Settings};
use crate::github::GitHubClient;
use crate::pipeline::{AlertReporter, TeamSelection};

/// Outcome of an unattended run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub reports: Vec<PathBuf>,
    /// Slugs of teams whose report could not be written.
    pub failed_teams: Vec<String>,
}

impl RunSummary {
    pub fn is_complete(&self) -> bool {
        self.failed_teams.is_empty()
    }
}

/// One report per team of the configured organization.
///
/// `settings` must already carry an organization and a token
/// (see [`Settings::resolve_unattended`]). A team whose report fails is
/// logged and recorded; the remaining teams still run.
pub async fn run(settings: Settings) -> Result<RunSummary, Box<dyn Error>> {
    let org = settings
        .organization
        .clone()
        .ok_or(ConfigError::MissingOrganization)?;
    let token = settings.token.clone().ok_or(ConfigError::MissingToken)?;

    let client = GitHubClient::new(&settings, &token)?;
    let reporter = AlertReporter::new(client, settings);

    let teams = reporter.list_teams(&org).await;
    if teams.is_empty() {
        println!("No teams found or access denied. Please check your token permissions.");
        return Ok(RunSummary::default());
    }

    let mut summary = RunSummary::default();
    for team in teams {
        println!("\n👥 Processing team: {}", team.slug);
        let slug = team.slug.clone();
        match reporter.run(&org, &TeamSelection::Single(team)).await {
            Ok(path) => summary.reports.push(path),
            Err(e) => {
                tracing::error!("Report for team {} failed: {}", slug, e);
                summary.failed_teams.push(slug);
            }
        }
    }

    Ok(summary)
}
