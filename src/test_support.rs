//! In-process fake of the GitHub REST API for tests.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use calamine::{open_workbook, Data, Reader, Xlsx};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;
use tiny_http::{Header, Response, Server};

use crate::config::Settings;
use crate::github::rate_limit::Clock;

const HEALTHY_QUOTA: &str =
    r#"{"resources":{},"rate":{"limit":5000,"remaining":4999,"reset":4102444800,"used":1}}"#;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
}

impl RecordedRequest {
    pub fn path(&self) -> &str {
        self.url.split('?').next().unwrap_or(&self.url)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Serves `(status, body)` from a routing closure on a background thread.
///
/// The closure receives the request path and the `page` query value (1 when
/// absent). Returning `None` answers 404, except for `/rate_limit`, which
/// then reports a healthy quota.
pub struct FakeGitHub {
    pub base_url: String,
    server: Arc<Server>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    handle: Option<JoinHandle<()>>,
}

impl FakeGitHub {
    pub fn start<F>(handler: F) -> Self
    where
        F: Fn(&str, u32) -> Option<(u16, String)> + Send + Sync + 'static,
    {
        let server = Arc::new(Server::http("127.0.0.1:0").expect("bind fake github"));
        let addr = server
            .server_addr()
            .to_ip()
            .expect("fake github listens on tcp");
        let requests = Arc::new(Mutex::new(Vec::new()));

        let srv = Arc::clone(&server);
        let log = Arc::clone(&requests);
        let handle = thread::spawn(move || {
            for request in srv.incoming_requests() {
                let url = request.url().to_string();
                let headers = request
                    .headers()
                    .iter()
                    .map(|h| (h.field.as_str().to_string(), h.value.to_string()))
                    .collect();
                log.lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .push(RecordedRequest {
                        url: url.clone(),
                        headers,
                    });

                let (path, query) = url.split_once('?').unwrap_or((url.as_str(), ""));
                let page = query
                    .split('&')
                    .filter_map(|pair| pair.strip_prefix("page="))
                    .find_map(|v| v.parse().ok())
                    .unwrap_or(1);

                let (status, body) = match handler(path, page) {
                    Some(reply) => reply,
                    None if path == "/rate_limit" => (200, HEALTHY_QUOTA.to_string()),
                    None => (404, r#"{"message":"Not Found"}"#.to_string()),
                };

                let content_type =
                    Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
                        .expect("static header");
                let response = Response::from_string(body)
                    .with_status_code(status)
                    .with_header(content_type);
                let _ = request.respond(response);
            }
        });

        Self {
            base_url: format!("http://{}", addr),
            server,
            requests,
            handle: Some(handle),
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Number of requests made to `path`, any query.
    pub fn hits(&self, path: &str) -> usize {
        self.requests().iter().filter(|r| r.path() == path).count()
    }
}

impl Drop for FakeGitHub {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    pub fn at(epoch_secs: i64) -> Self {
        Self(Utc.timestamp_opt(epoch_secs, 0).unwrap())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Settings pointed at a fake server, with fast retries and no pauses.
pub fn test_settings(base_url: &str) -> Settings {
    Settings {
        api_url: base_url.to_string(),
        request_timeout_secs: 5,
        backoff_base_ms: 10,
        repo_pause_ms: 0,
        ..Settings::default()
    }
}

pub fn teams_page(offset: usize, count: usize) -> String {
    let teams: Vec<_> = (offset..offset + count)
        .map(|i| json!({ "slug": format!("team-{}", i), "name": format!("Team {}", i) }))
        .collect();
    serde_json::Value::Array(teams).to_string()
}

pub fn team(slug: &str, name: &str) -> serde_json::Value {
    json!({ "id": 1, "slug": slug, "name": name })
}

pub fn repository(owner: &str, name: &str) -> serde_json::Value {
    json!({
        "id": 1,
        "name": name,
        "full_name": format!("{}/{}", owner, name),
        "private": true
    })
}

pub fn code_scanning_alert(number: u64) -> serde_json::Value {
    json!({
        "number": number,
        "rule": {
            "id": "js/sql-injection",
            "description": "Database query built from user-controlled sources",
            "severity": "error"
        },
        "state": "open",
        "created_at": "2024-03-01T10:00:00Z",
        "updated_at": "2024-03-02T10:00:00Z",
        "html_url": format!("https://github.com/acme/api/security/code-scanning/{}", number)
    })
}

pub fn dependabot_alert(number: u64, description: Option<&str>) -> serde_json::Value {
    let mut advisory = json!({
        "ghsa_id": "GHSA-xxxx-yyyy-zzzz",
        "severity": "high",
        "package": { "name": "lodash" },
        "patched_versions": ">= 4.17.21"
    });
    if let Some(description) = description {
        advisory["description"] = json!(description);
    }

    json!({
        "number": number,
        "security_advisory": advisory,
        "vulnerable_version_range": "< 4.17.21",
        "state": "open",
        "created_at": "2024-03-03T10:00:00Z",
        "updated_at": "2024-03-04T10:00:00Z",
        "html_url": format!("https://github.com/acme/api/security/dependabot/{}", number)
    })
}

pub fn secret_scanning_alert(number: u64) -> serde_json::Value {
    json!({
        "number": number,
        "secret_type": "github_personal_access_token",
        "secret_type_display_name": "GitHub Personal Access Token",
        "state": "open",
        "created_at": "2024-03-05T10:00:00Z",
        "updated_at": "2024-03-06T10:00:00Z",
        "html_url": format!("https://github.com/acme/api/security/secret-scanning/{}", number)
    })
}

/// JSON array of the given values.
pub fn page(items: &[serde_json::Value]) -> String {
    serde_json::Value::Array(items.to_vec()).to_string()
}

/// Every row of a written report's first sheet, cells rendered as text.
///
/// Blank cells read back as empty strings and numbers without a fraction.
pub fn read_report(path: &Path) -> Vec<Vec<String>> {
    let mut workbook: Xlsx<_> = open_workbook(path).expect("open report");
    let range = workbook.worksheet_range("Sheet1").expect("report sheet");

    range
        .rows()
        .map(|row| {
            row.iter()
                .map(|cell| match cell {
                    Data::Empty => String::new(),
                    Data::String(s) => s.clone(),
                    Data::Float(f) => f.to_string(),
                    other => other.to_string(),
                })
                .collect()
        })
        .collect()
}
