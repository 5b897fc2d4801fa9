//! Client for the Claude Code usage report endpoint
//!
//! Requests one UTC day at a time, up to [`PAGE_LIMIT`] records per page, and
//! follows the opaque `next_page` cursor until the API reports no more pages
//! or hands back a cursor it already gave for that day.
//! There is no retry here: a failed page fails the whole day, and the range
//! fetcher in `ccteam-core` decides what to do about it.
//!
//! # Examples
//!
//! ```no_run
//! use ccteam_core::{UsageSource, types::DailyDate};
//! use ccteam_provider_admin::AdminClient;
//! use std::time::Duration;
//!
//! # async fn example() -> ccteam_core::Result<()> {
//! let client = AdminClient::new("sk-ant-admin-...", Duration::from_secs(30))?;
//! let records = client.fetch_day(DailyDate::parse("2025-06-11").unwrap()).await?;
//! println!("{} records", records.len());
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use ccteam_core::error::{CcteamError, Result};
use ccteam_core::provider::UsageSource;
use ccteam_core::types::{DailyDate, UsagePage, UsageRecord};
use reqwest::Url;
use std::collections::HashSet;
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

/// Default Anthropic API host
pub const DEFAULT_API_BASE: &str = "https://api.anthropic.com";

/// Usage report path, relative to the API base
const USAGE_REPORT_PATH: &str = "/v1/organizations/usage_report/claude_code";

/// Value of the `anthropic-version` header
const API_VERSION: &str = "2023-06-01";

/// Records requested per page
pub const PAGE_LIMIT: u32 = 1000;

/// Default per-request timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("ccteam/", env!("CARGO_PKG_VERSION"));

/// Where to find the admin key when it is missing
const ADMIN_KEY_HINT: &str = "Generate one at https://console.anthropic.com/settings/admin-keys";

/// HTTP client for the usage report API
pub struct AdminClient {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
}

impl AdminClient {
    /// Create a client with the given admin key and request timeout
    ///
    /// # Errors
    ///
    /// Returns `CcteamError::Config` if the key is empty, or a transport
    /// error if the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(missing_key_error());
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            api_base: DEFAULT_API_BASE.to_string(),
            api_key,
        })
    }

    /// Point the client at a different API host
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// The API host this client talks to
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn page_url(&self, day: DailyDate, cursor: Option<&str>) -> Result<Url> {
        let base = format!("{}{}", self.api_base, USAGE_REPORT_PATH);
        let mut params = vec![
            ("starting_at", day.to_string()),
            ("limit", PAGE_LIMIT.to_string()),
        ];
        if let Some(cursor) = cursor {
            params.push(("page", cursor.to_string()));
        }
        Url::parse_with_params(&base, &params)
            .map_err(|e| CcteamError::Config(format!("Invalid API base URL '{}': {e}", self.api_base)))
    }

    /// Fetch a single page of the report for `day`
    pub async fn fetch_page(&self, day: DailyDate, cursor: Option<&str>) -> Result<UsagePage> {
        let url = self.page_url(day, cursor)?;
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(CcteamError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl UsageSource for AdminClient {
    fn check_ready(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(missing_key_error());
        }
        Url::parse(&self.api_base)
            .map(|_| ())
            .map_err(|e| CcteamError::Config(format!("Invalid API base URL '{}': {e}", self.api_base)))
    }

    async fn fetch_day(&self, day: DailyDate) -> Result<Vec<UsageRecord>> {
        let mut records = Vec::new();
        let mut cursor: Option<String> = None;
        let mut seen_cursors = HashSet::new();
        let mut pages = 0usize;

        loop {
            let page = self.fetch_page(day, cursor.as_deref()).await?;
            pages += 1;
            let next = page.next_cursor().map(str::to_string);
            records.extend(page.data);

            match next {
                Some(next) if !seen_cursors.insert(next.clone()) => {
                    warn!("Usage API repeated cursor {} for {}, stopping", next, day);
                    break;
                }
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        debug!("Fetched {} records in {} page(s) for {}", records.len(), pages, day);
        Ok(records)
    }
}

impl fmt::Debug for AdminClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminClient")
            .field("api_base", &self.api_base)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

fn missing_key_error() -> CcteamError {
    CcteamError::Config(format!("ANTHROPIC_ADMIN_API_KEY is required. {ADMIN_KEY_HINT}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> AdminClient {
        AdminClient::new("sk-test", DEFAULT_REQUEST_TIMEOUT).unwrap()
    }

    #[test]
    fn test_empty_key_is_config_error() {
        let result = AdminClient::new("  ", DEFAULT_REQUEST_TIMEOUT);
        assert!(matches!(result, Err(CcteamError::Config(_))));
    }

    #[test]
    fn test_page_url() {
        let day = DailyDate::parse("2025-06-11").unwrap();
        let url = client().page_url(day, None).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.anthropic.com/v1/organizations/usage_report/claude_code?starting_at=2025-06-11&limit=1000"
        );

        let url = client().page_url(day, Some("abc=")).unwrap();
        assert!(url.as_str().ends_with("&page=abc%3D"));
    }

    #[test]
    fn test_with_api_base_trims_slash() {
        let client = client().with_api_base("http://localhost:9999/");
        assert_eq!(client.api_base(), "http://localhost:9999");
        assert!(client.check_ready().is_ok());
    }

    #[test]
    fn test_invalid_api_base_is_config_error() {
        let client = client().with_api_base("not a url");
        assert!(matches!(client.check_ready(), Err(CcteamError::Config(_))));
    }

    #[test]
    fn test_debug_redacts_key() {
        let rendered = format!("{:?}", client());
        assert!(!rendered.contains("sk-test"));
        assert!(rendered.contains("<redacted>"));
    }
}
