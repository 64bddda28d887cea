//! Layered configuration for alertlink.
//!
//! Sources, lowest to highest precedence:
//! 1. Built-in defaults
//! 2. `~/.config/alertlink/config.toml`
//! 3. `./alertlink.toml`
//! 4. `ALERTLINK_*` environment variables (e.g. `ALERTLINK_API_URL`)
//!
//! Example config file:
//! ```toml
//! api_url = "https://github.example.com/api/v3"
//! default_organization = "my-org"
//! repo_pause_ms = 500
//! output_dir = "reports"
//! ```

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Token variable read by the unattended runner (and as a fallback interactively).
pub const TOKEN_ENV: &str = "GH_TOKEN";

/// Organization variable read by the unattended runner.
pub const ORG_ENV: &str = "GH_ORG";

const ENV_PREFIX: &str = "ALERTLINK";
const LOCAL_CONFIG_FILE: &str = "alertlink.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no GitHub token configured (set GH_TOKEN or ALERTLINK_TOKEN)")]
    MissingToken,

    #[error("no organization configured (set GH_ORG or ALERTLINK_ORGANIZATION)")]
    MissingOrganization,

    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("token contains characters that are not valid in an HTTP header")]
    InvalidToken(#[from] reqwest::header::InvalidHeaderValue),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Run configuration handed to the client and the pipeline at construction.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// REST API root, without trailing slash.
    pub api_url: String,
    /// Organization to report on. Required in unattended mode.
    pub organization: Option<String>,
    /// Suggested answer for the interactive organization prompt.
    pub default_organization: String,
    pub token: Option<String>,
    pub per_page: u32,
    pub request_timeout_secs: u64,
    pub max_retries: usize,
    pub backoff_base_ms: u64,
    /// Pause between repositories, on top of the quota check.
    pub repo_pause_ms: u64,
    pub output_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            organization: None,
            default_organization: "my-GitHub-organization".to_string(),
            token: None,
            per_page: 100,
            request_timeout_secs: 30,
            max_retries: 5,
            backoff_base_ms: 1000,
            repo_pause_ms: 500,
            output_dir: PathBuf::from("."),
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("api_url", &self.api_url)
            .field("organization", &self.organization)
            .field("default_organization", &self.default_organization)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("per_page", &self.per_page)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("backoff_base_ms", &self.backoff_base_ms)
            .field("repo_pause_ms", &self.repo_pause_ms)
            .field("output_dir", &self.output_dir)
            .finish()
    }
}

impl Settings {
    /// Load from the standard config file locations and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(config_files())
    }

    /// Load from the given files (missing ones are skipped) and the environment.
    pub fn load_with(files: Vec<PathBuf>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        for path in files {
            if path.exists() {
                tracing::debug!("Loading config from {:?}", path);
                builder = builder.add_source(
                    File::from(path)
                        .format(FileFormat::Toml)
                        .required(false),
                );
            }
        }

        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true));

        let settings: Settings = builder.build()?.try_deserialize()?;
        Ok(settings.normalized())
    }

    /// Fill organization and token from the process environment and insist
    /// both are present. Nothing touches the network before this succeeds.
    pub fn resolve_unattended<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

        if let Some(token) = non_empty(lookup(TOKEN_ENV)) {
            self.token = Some(token);
        }
        if let Some(org) = non_empty(lookup(ORG_ENV)) {
            self.organization = Some(org);
        }

        if non_empty(self.token.clone()).is_none() {
            return Err(ConfigError::MissingToken);
        }
        if non_empty(self.organization.clone()).is_none() {
            return Err(ConfigError::MissingOrganization);
        }

        Ok(self)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }

    pub fn repo_pause(&self) -> Duration {
        Duration::from_millis(self.repo_pause_ms)
    }

    fn normalized(mut self) -> Self {
        self.api_url = self.api_url.trim_end_matches('/').to_string();
        if self.per_page == 0 {
            self.per_page = 100;
        }
        self
    }
}

fn config_files() -> Vec<PathBuf> {
    let mut files = Vec::new();

    if let Some(dir) = dirs::config_dir() {
        files.push(dir.join("alertlink").join("config.toml"));
    }
    files.push(PathBuf::from(LOCAL_CONFIG_FILE));

    files
}
