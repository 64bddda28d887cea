use reqwest::StatusCode;
use thiserror::Error;

/// Statuses the transport treats as transient.
pub const RETRY_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// A GET that did not produce a usable body.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: StatusCode },

    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    /// Connection-level failures and throttling/5xx statuses are worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Request { source, .. } => source.is_connect() || source.is_timeout(),
            FetchError::Status { status, .. } => RETRY_STATUSES.contains(&status.as_u16()),
            FetchError::Decode { .. } => false,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
