use std::sync::Arc;
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;

use crate::config::{ConfigError, Settings};
use crate::github::error::FetchError;
use crate::github::rate_limit::{Clock, RateLimiter};

const API_VERSION: &str = "2022-11-28";

/// Bounded exponential backoff for transient failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: usize,
    /// First delay; each further retry doubles it.
    pub base_delay: Duration,
}

impl RetryPolicy {
    fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.base_delay)
            .with_factor(2.0)
            .with_max_times(self.max_retries)
    }
}

/// Only requests that can be replayed safely are retried.
pub fn is_idempotent(method: &Method) -> bool {
    *method == Method::GET || *method == Method::HEAD || *method == Method::OPTIONS
}

/// REST client for the GitHub API.
///
/// Every request carries the token and API version headers and is bounded by
/// the configured timeout. Transient failures are retried per [`RetryPolicy`];
/// anything else is handed back to the caller.
pub struct GitHubClient {
    client: Client,
    api_url: String,
    per_page: u32,
    retry: RetryPolicy,
    limiter: RateLimiter,
}

impl GitHubClient {
    pub fn new(settings: &Settings, token: &str) -> Result<Self, ConfigError> {
        let mut auth = HeaderValue::from_str(&format!("token {}", token.trim()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(
            HeaderName::from_static("x-github-api-version"),
            HeaderValue::from_static(API_VERSION),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("alertlink"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(settings.request_timeout())
            .build()?;

        Ok(Self {
            client,
            api_url: settings.api_url.trim_end_matches('/').to_string(),
            per_page: settings.per_page,
            retry: RetryPolicy {
                max_retries: settings.max_retries,
                base_delay: settings.backoff_base(),
            },
            limiter: RateLimiter::default(),
        })
    }

    /// Replace the clock the rate limiter measures reset times against.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.limiter = RateLimiter::new(clock);
        self
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    #[cfg(test)]
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    /// GET `path` and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let url = self.url(path);
        let body = self.send_with_retry(Method::GET, &url, query).await?;

        serde_json::from_str(&body).map_err(|source| FetchError::Decode { url, source })
    }

    async fn send_with_retry(
        &self,
        method: Method,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<String, FetchError> {
        let retryable = is_idempotent(&method);

        (|| self.send_once(method.clone(), url, query))
            .retry(self.retry.backoff())
            .when(|e: &FetchError| retryable && e.is_transient())
            .notify(|e: &FetchError, dur: Duration| {
                tracing::debug!("Retrying {} in {:?}: {}", url, dur, e);
            })
            .await
    }

    async fn send_once(
        &self,
        method: Method,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<String, FetchError> {
        tracing::debug!("{} {}", method, url);

        let response = self
            .client
            .request(method, url)
            .query(query)
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        response.text().await.map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{test_settings, FakeGitHub};
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn only_safe_methods_are_idempotent() {
        assert!(is_idempotent(&Method::GET));
        assert!(is_idempotent(&Method::HEAD));
        assert!(is_idempotent(&Method::OPTIONS));
        assert!(!is_idempotent(&Method::POST));
        assert!(!is_idempotent(&Method::PATCH));
    }

    #[test]
    fn retry_policy_comes_from_settings() {
        let settings = Settings::default();
        let client = GitHubClient::new(&settings, "ghp_x").unwrap();

        assert_eq!(
            client.retry_policy(),
            RetryPolicy {
                max_retries: 5,
                base_delay: Duration::from_secs(1),
            }
        );
        assert_eq!(client.per_page(), 100);
    }

    #[test]
    fn rejects_tokens_that_cannot_be_headers() {
        let settings = Settings::default();
        assert!(matches!(
            GitHubClient::new(&settings, "bad\ntoken"),
            Err(ConfigError::InvalidToken(_))
        ));
    }

    #[tokio::test]
    async fn sends_auth_and_version_headers() {
        let server = FakeGitHub::start(|path, _| match path {
            "/ping" => Some((200, "{}".to_string())),
            _ => None,
        });
        let client = GitHubClient::new(&test_settings(&server.base_url), "ghp_abc").unwrap();

        let _: Value = client.get_json("/ping", &[]).await.unwrap();

        let request = server.requests().into_iter().next().unwrap();
        assert_eq!(request.header("authorization"), Some("token ghp_abc"));
        assert_eq!(request.header("accept"), Some("application/vnd.github+json"));
        assert_eq!(request.header("x-github-api-version"), Some(API_VERSION));
    }

    #[tokio::test]
    async fn recovers_from_transient_503s() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let server = FakeGitHub::start(move |path, _| match path {
            "/flaky" => {
                if seen.fetch_add(1, Ordering::SeqCst) < 2 {
                    Some((503, "{\"message\":\"unavailable\"}".to_string()))
                } else {
                    Some((200, "[1,2,3]".to_string()))
                }
            }
            _ => None,
        });
        let client = GitHubClient::new(&test_settings(&server.base_url), "t").unwrap();

        let body: Vec<u32> = client.get_json("/flaky", &[]).await.unwrap();

        assert_eq!(body, vec![1, 2, 3]);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn does_not_retry_not_found() {
        let server = FakeGitHub::start(|_, _| None);
        let client = GitHubClient::new(&test_settings(&server.base_url), "t").unwrap();

        let err = client.get_json::<Value>("/missing", &[]).await.unwrap_err();

        assert_eq!(err.status().map(|s| s.as_u16()), Some(404));
        assert_eq!(server.hits("/missing"), 1);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let server = FakeGitHub::start(|path, _| match path {
            "/down" => Some((502, String::new())),
            _ => None,
        });
        let client = GitHubClient::new(&test_settings(&server.base_url), "t").unwrap();

        let err = client.get_json::<Value>("/down", &[]).await.unwrap_err();

        assert_eq!(err.status().map(|s| s.as_u16()), Some(502));
        assert_eq!(server.hits("/down"), 1 + 5);
    }

    #[tokio::test]
    async fn undecodable_body_is_a_decode_error() {
        let server = FakeGitHub::start(|path, _| match path {
            "/html" => Some((200, "<html>".to_string())),
            _ => None,
        });
        let client = GitHubClient::new(&test_settings(&server.base_url), "t").unwrap();

        let err = client.get_json::<Value>("/html", &[]).await.unwrap_err();
        assert!(matches!(err, FetchError::Decode { .. }));
    }

    #[tokio::test]
    async fn connection_refused_surfaces_as_request_error() {
        let mut settings = test_settings("http://127.0.0.1:1");
        settings.max_retries = 1;
        let client = GitHubClient::new(&settings, "t").unwrap();

        let err = client.get_json::<Value>("/x", &[]).await.unwrap_err();
        assert!(matches!(err, FetchError::Request { .. }));
    }
}
