//! Common test utilities and helpers for ccteam tests
//!
//! Record builders, usage-report mocks, and an environment guard shared by
//! the integration tests.

#![allow(dead_code)]

use ccteam::types::{Actor, DailyDate, UsageRecord};
use once_cell::sync::Lazy;
use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// Global mutex to serialize environment variable modifications in tests
pub static ENV_MUTEX: Lazy<tokio::sync::Mutex<()>> = Lazy::new(|| tokio::sync::Mutex::new(()));

pub const REPORT_PATH: &str = "/v1/organizations/usage_report/claude_code";

pub fn day(s: &str) -> DailyDate {
    DailyDate::parse(s).expect("valid date")
}

/// Builder for test usage records
pub struct RecordBuilder {
    record: UsageRecord,
}

impl RecordBuilder {
    pub fn user(email: &str) -> Self {
        Self::with_actor(Actor::user(email))
    }

    pub fn api_key(name: Option<&str>) -> Self {
        Self::with_actor(Actor::api_key(name))
    }

    fn with_actor(actor: Actor) -> Self {
        Self {
            record: UsageRecord {
                date: day("2025-06-11"),
                actor,
                lines_added: 0,
                lines_removed: 0,
                session_count: 0,
            },
        }
    }

    pub fn on(mut self, date: &str) -> Self {
        self.record.date = day(date);
        self
    }

    pub fn added(mut self, lines: u64) -> Self {
        self.record.lines_added = lines;
        self
    }

    pub fn removed(mut self, lines: u64) -> Self {
        self.record.lines_removed = lines;
        self
    }

    pub fn sessions(mut self, count: u64) -> Self {
        self.record.session_count = count;
        self
    }

    pub fn build(self) -> UsageRecord {
        self.record
    }
}

/// A usage report page body in the API's wire format
pub fn page_body(records: &[UsageRecord], next_page: Option<&str>) -> Value {
    json!({
        "data": records,
        "has_more": next_page.is_some(),
        "next_page": next_page,
    })
}

/// Serve `records` as the single page for `date`
pub async fn mount_day(server: &MockServer, date: &str, records: &[UsageRecord]) {
    Mock::given(method("GET"))
        .and(path(REPORT_PATH))
        .and(query_param("starting_at", date))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(records, None)))
        .mount(server)
        .await;
}

/// Fail every request for `date` with `status`
pub async fn mount_failing_day(server: &MockServer, date: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(REPORT_PATH))
        .and(query_param("starting_at", date))
        .respond_with(ResponseTemplate::new(status).set_body_string("upstream unavailable"))
        .mount(server)
        .await;
}

/// Answer any day without a specific mock with an empty page
pub async fn mount_empty_days(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(REPORT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(&[], None)))
        .with_priority(10)
        .mount(server)
        .await;
}

/// Sets environment variables and restores the previous values on drop
///
/// Hold [`ENV_MUTEX`] for as long as the guard lives.
pub struct EnvVarGuard {
    saved: Vec<(String, Option<String>)>,
}

impl EnvVarGuard {
    pub fn set(vars: &[(&str, Option<&str>)]) -> Self {
        let saved = vars
            .iter()
            .map(|(key, _)| (key.to_string(), std::env::var(key).ok()))
            .collect();

        // env functions are unsafe since Rust 2024; callers hold ENV_MUTEX
        unsafe {
            for (key, value) in vars {
                match value {
                    Some(value) => std::env::set_var(key, value),
                    None => std::env::remove_var(key),
                }
            }
        }

        Self { saved }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        unsafe {
            for (key, value) in &self.saved {
                match value {
                    Some(value) => std::env::set_var(key, value),
                    None => std::env::remove_var(key),
                }
            }
        }
    }
}
