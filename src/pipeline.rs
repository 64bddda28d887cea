//! Teams → repositories → alerts → report.

use std::collections::HashSet;
use std::path::PathBuf;

use chrono::Local;
use colored::Colorize;

use crate::config::Settings;
use crate::github::{GitHubClient, Repository, Team};
use crate::report::{self, ReportError, ReportRow};

/// Which teams a report covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TeamSelection {
    Single(Team),
    All(Vec<Team>),
}

impl TeamSelection {
    /// Goes into the report filename.
    pub fn suffix(&self) -> &str {
        match self {
            TeamSelection::Single(team) => &team.slug,
            TeamSelection::All(_) => "all_teams",
        }
    }

    pub fn slugs(&self) -> Vec<&str> {
        match self {
            TeamSelection::Single(team) => vec![team.slug.as_str()],
            TeamSelection::All(teams) => teams.iter().map(|t| t.slug.as_str()).collect(),
        }
    }
}

/// Keep the first occurrence of every `full_name`.
pub fn dedupe_repositories(repos: Vec<Repository>) -> Vec<Repository> {
    let mut seen = HashSet::new();
    repos
        .into_iter()
        .filter(|repo| seen.insert(repo.full_name.clone()))
        .collect()
}

pub struct AlertReporter {
    client: GitHubClient,
    settings: Settings,
}

impl AlertReporter {
    pub fn new(client: GitHubClient, settings: Settings) -> Self {
        Self { client, settings }
    }

    pub async fn list_teams(&self, org: &str) -> Vec<Team> {
        println!("🏢 Fetching teams for organization: {}...", org.bold());
        self.client.list_teams(org).await.into_items()
    }

    /// Repositories of every selected team, each `full_name` once.
    pub async fn collect_repositories(&self, org: &str, team_slugs: &[&str]) -> Vec<Repository> {
        let mut all = Vec::new();

        for slug in team_slugs {
            println!("\n📦 Fetching repositories for team: {}...", slug);
            all.extend(self.client.list_team_repos(org, slug).await.into_items());
        }

        dedupe_repositories(all)
    }

    /// Fetch every alert of every repository, pausing between repositories.
    pub async fn collect_rows(&self, repos: &[Repository]) -> Vec<ReportRow> {
        let total = repos.len();
        let mut rows = Vec::new();

        for (index, repo) in repos.iter().enumerate() {
            println!("🔎 Processing {}/{}: {}", index + 1, total, repo.full_name);

            let fetched = self.client.fetch_repo_alerts(repo).await;
            if fetched.failed_feeds > 0 {
                tracing::warn!(
                    "{} alert feed(s) incomplete for {}",
                    fetched.failed_feeds,
                    repo.full_name
                );
            }
            rows.extend(report::rows_for_repository(repo, &fetched.alerts));

            tokio::time::sleep(self.settings.repo_pause()).await;
        }

        rows
    }

    /// All rows for a selection, in repository processing order.
    pub async fn build_report(&self, org: &str, selection: &TeamSelection) -> Vec<ReportRow> {
        let repos = self.collect_repositories(org, &selection.slugs()).await;
        println!("\n📊 Total unique repositories found: {}", repos.len());

        if repos.is_empty() {
            println!("ℹ️  No repositories found for {}.", selection.suffix());
        }

        self.collect_rows(&repos).await
    }

    /// Build the report for `selection` and save it to the output directory.
    pub async fn run(&self, org: &str, selection: &TeamSelection) -> Result<PathBuf, ReportError> {
        let rows = self.build_report(org, selection).await;
        let path = report::write_report(
            &rows,
            &self.settings.output_dir,
            selection.suffix(),
            Local::now(),
        )?;

        println!(
            "\n✅ Report generated and saved as {} ({} alerts)",
            path.display().to_string().green(),
            rows.len()
        );
        Ok(path)
    }
}
