//! Quota guard run before every page request.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, TimeZone, Utc};

use super::client::GitHubClient;
use super::error::FetchError;
use super::types::{RateLimitResponse, RateLimitStatus};

/// Source of "now" for reset-time arithmetic.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Clone)]
pub struct RateLimiter {
    clock: Arc<dyn Clock>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl RateLimiter {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// How long to hold off before the next request, if at all.
    pub fn required_wait(&self, status: &RateLimitStatus) -> Option<Duration> {
        if status.remaining > 0 {
            return None;
        }
        Some(wait_until_reset(status.reset, self.clock.now()))
    }
}

/// `max(0, reset - now + 1s)`, at millisecond precision.
pub fn wait_until_reset(reset_epoch_secs: i64, now: DateTime<Utc>) -> Duration {
    let millis = reset_epoch_secs * 1000 - now.timestamp_millis() + 1000;
    Duration::from_millis(millis.max(0) as u64)
}

impl GitHubClient {
    pub async fn rate_limit_status(&self) -> Result<RateLimitStatus, FetchError> {
        let response: RateLimitResponse = self.get_json("/rate_limit", &[]).await?;
        Ok(response.rate)
    }

    /// Sleep until the quota window resets if no requests remain.
    ///
    /// A failed status query is logged and ignored; the caller proceeds.
    pub async fn await_quota(&self) {
        let status = match self.rate_limit_status().await {
            Ok(status) => status,
            Err(e) => {
                tracing::warn!("Could not read rate limit status, continuing: {}", e);
                return;
            }
        };

        if let Some(wait) = self.limiter().required_wait(&status) {
            let reset_at = Local
                .timestamp_opt(status.reset, 0)
                .single()
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| status.reset.to_string());

            println!("⏸️  Rate limit exceeded. Pausing until {}.", reset_at);
            tokio::time::sleep(wait).await;
        }
    }
}
