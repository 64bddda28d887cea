//! Page walking for list endpoints.
//!
//! GitHub list endpoints are walked with `page`/`per_page` until a page comes
//! back empty. A failing page ends the walk; whatever was collected so far is
//! returned together with the error.

use serde::de::DeserializeOwned;

use super::client::GitHubClient;
use super::error::FetchError;

/// The list endpoints alertlink reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint<'a> {
    Teams { org: &'a str },
    TeamRepos { org: &'a str, team_slug: &'a str },
    CodeScanningAlerts { repo: &'a str },
    DependabotAlerts { repo: &'a str },
    SecretScanningAlerts { repo: &'a str },
}

impl Endpoint<'_> {
    pub fn path(&self) -> String {
        match self {
            Endpoint::Teams { org } => format!("/orgs/{}/teams", org),
            Endpoint::TeamRepos { org, team_slug } => {
                format!("/orgs/{}/teams/{}/repos", org, team_slug)
            }
            Endpoint::CodeScanningAlerts { repo } => format!("/repos/{}/code-scanning/alerts", repo),
            Endpoint::DependabotAlerts { repo } => format!("/repos/{}/dependabot/alerts", repo),
            Endpoint::SecretScanningAlerts { repo } => {
                format!("/repos/{}/secret-scanning/alerts", repo)
            }
        }
    }

    /// Human description used in log lines.
    pub fn describe(&self) -> String {
        match self {
            Endpoint::Teams { org } => format!("teams for {}", org),
            Endpoint::TeamRepos { team_slug, .. } => format!("repositories for team {}", team_slug),
            Endpoint::CodeScanningAlerts { repo } => format!("code scanning alerts for {}", repo),
            Endpoint::DependabotAlerts { repo } => format!("dependabot alerts for {}", repo),
            Endpoint::SecretScanningAlerts { repo } => {
                format!("secret scanning alerts for {}", repo)
            }
        }
    }
}

/// Items collected from a page walk, and the error that cut it short if any.
#[derive(Debug)]
pub struct PageFetch<T> {
    pub items: Vec<T>,
    pub error: Option<FetchError>,
}

impl<T> PageFetch<T> {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    /// Items only, dropping the error. The error was already logged.
    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

impl GitHubClient {
    /// Walk every page of `endpoint`, checking the quota before each request.
    pub async fn fetch_pages<T: DeserializeOwned>(&self, endpoint: &Endpoint<'_>) -> PageFetch<T> {
        let path = endpoint.path();
        let mut items: Vec<T> = Vec::new();
        let mut page = 1u32;

        loop {
            self.await_quota().await;

            let query = [
                ("page", page.to_string()),
                ("per_page", self.per_page().to_string()),
            ];

            let batch: Vec<T> = match self.get_json(&path, &query).await {
                Ok(batch) => batch,
                Err(e) => {
                    tracing::error!("Error fetching {}: {}", endpoint.describe(), e);
                    return PageFetch {
                        items,
                        error: Some(e),
                    };
                }
            };

            if batch.is_empty() {
                break;
            }

            tracing::debug!(
                "Fetched page {} of {} ({} items)",
                page,
                endpoint.describe(),
                batch.len()
            );
            items.extend(batch);
            page += 1;
        }

        PageFetch { items, error: None }
    }
}
