use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Team {
    pub slug: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Repository {
    pub name: String,
    /// `owner/name`; identity of a repository across teams.
    pub full_name: String,
}

#[derive(Debug, Deserialize)]
pub struct RateLimitResponse {
    pub rate: RateLimitStatus,
}

/// Core REST quota as reported by `/rate_limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RateLimitStatus {
    #[serde(default)]
    pub limit: u64,
    pub remaining: u64,
    /// Epoch seconds at which the quota window resets.
    pub reset: i64,
    #[serde(default)]
    pub used: u64,
}
