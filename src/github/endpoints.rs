use crate::alert::{Alert, CodeScanningAlert, DependabotAlert, SecretScanningAlert};

use super::client::GitHubClient;
use super::pagination::{Endpoint, PageFetch};
use super::types::{Repository, Team};

/// All alerts for one repository, in report order, and the feeds that failed.
#[derive(Debug, Default)]
pub struct RepoAlerts {
    pub alerts: Vec<Alert>,
    pub failed_feeds: usize,
}

impl GitHubClient {
    pub async fn list_teams(&self, org: &str) -> PageFetch<Team> {
        self.fetch_pages(&Endpoint::Teams { org }).await
    }

    pub async fn list_team_repos(&self, org: &str, team_slug: &str) -> PageFetch<Repository> {
        self.fetch_pages(&Endpoint::TeamRepos { org, team_slug }).await
    }

    pub async fn list_code_scanning_alerts(&self, repo: &str) -> PageFetch<CodeScanningAlert> {
        self.fetch_pages(&Endpoint::CodeScanningAlerts { repo }).await
    }

    pub async fn list_dependabot_alerts(&self, repo: &str) -> PageFetch<DependabotAlert> {
        self.fetch_pages(&Endpoint::DependabotAlerts { repo }).await
    }

    pub async fn list_secret_scanning_alerts(&self, repo: &str) -> PageFetch<SecretScanningAlert> {
        self.fetch_pages(&Endpoint::SecretScanningAlerts { repo }).await
    }

    /// Code scanning, then Dependabot, then secret scanning alerts for `repo`.
    ///
    /// A feed that fails contributes whatever it collected; the others are
    /// still fetched.
    pub async fn fetch_repo_alerts(&self, repo: &Repository) -> RepoAlerts {
        let mut result = RepoAlerts::default();

        let code_scanning = self.list_code_scanning_alerts(&repo.full_name).await;
        result.absorb(code_scanning, Alert::CodeScanning);

        let dependabot = self.list_dependabot_alerts(&repo.full_name).await;
        result.absorb(dependabot, Alert::Dependabot);

        let secret_scanning = self.list_secret_scanning_alerts(&repo.full_name).await;
        result.absorb(secret_scanning, Alert::SecretScanning);

        result
    }
}

impl RepoAlerts {
    fn absorb<T>(&mut self, fetch: PageFetch<T>, wrap: fn(T) -> Alert) {
        if !fetch.is_complete() {
            self.failed_feeds += 1;
        }
        self.alerts.extend(fetch.items.into_iter().map(wrap));
    }
}
