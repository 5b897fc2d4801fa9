//! Error types for ccteam
//!
//! This module defines the error types used throughout the ccteam crates.
//! All errors are derived from `thiserror` for convenient error handling
//! and automatic `From` implementations.
//!
//! # Example
//!
//! ```
//! use ccteam_core::error::{CcteamError, Result};
//!
//! fn require_key(key: Option<&str>) -> Result<&str> {
//!     key.ok_or_else(|| CcteamError::Config("api key missing".to_string()))
//! }
//!
//! assert!(require_key(None).is_err());
//! ```

use thiserror::Error;

/// Main error type for ccteam operations
///
/// The first four variants form the failure taxonomy of a poll cycle:
/// configuration problems are systemic, the other three are raised while
/// fetching a single day and are absorbed by the range fetcher.
#[derive(Error, Debug)]
pub enum CcteamError {
    /// Missing or invalid configuration (e.g. no admin API key)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network-level failure reaching the usage API
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The usage API answered with a non-success status
    #[error("API error {status}: {body}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body as returned by the API
        body: String,
    },

    /// The response body was not the expected JSON shape
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl CcteamError {
    /// Whether this error is confined to a single day's fetch.
    ///
    /// Range fetching skips days failing with such errors; anything else
    /// aborts the whole range.
    pub fn is_per_day(&self) -> bool {
        matches!(
            self,
            CcteamError::Transport(_) | CcteamError::Api { .. } | CcteamError::Decode(_)
        )
    }
}

/// Convenience type alias for Results in ccteam
pub type Result<T> = std::result::Result<T, CcteamError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = CcteamError::Api {
            status: 401,
            body: "{\"error\":\"unauthorized\"}".to_string(),
        };
        assert_eq!(error.to_string(), "API error 401: {\"error\":\"unauthorized\"}");
    }

    #[test]
    fn test_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let error: CcteamError = json_error.into();
        assert!(matches!(error, CcteamError::Decode(_)));
        assert!(error.is_per_day());
    }

    #[test]
    fn test_config_error_is_systemic() {
        let error = CcteamError::Config("missing key".to_string());
        assert!(!error.is_per_day());
        assert_eq!(error.to_string(), "Configuration error: missing key");
    }
}
