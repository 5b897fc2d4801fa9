//! CLI interface for ccteam
//!
//! Every option can also be supplied through the environment, which is how
//! the service is usually configured when deployed.
//!
//! # Example
//!
//! ```bash
//! # Serve the dashboard feed on port 3000, polling every 5 minutes
//! ANTHROPIC_ADMIN_API_KEY=sk-ant-admin-... ccteam
//!
//! # Poll every minute over a 30-day all-time window
//! ccteam --poll-interval-ms 60000 --all-time-days 30 serve
//!
//! # Print one snapshot as a table, or as JSON
//! ccteam snapshot
//! ccteam snapshot --json --today 2025-06-11
//! ```

use crate::error::{CcteamError, Result};
use crate::types::DailyDate;
use crate::window::MAX_ALL_TIME_DAYS;
use clap::{Parser, Subcommand};
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Stream team Claude Code usage to a live dashboard
#[derive(Parser, Debug, Clone)]
#[command(name = "ccteam")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Anthropic Admin API key (sk-ant-admin...)
    #[arg(long, env = "ANTHROPIC_ADMIN_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Poll interval in milliseconds
    #[arg(
        long,
        env = "POLL_INTERVAL_MS",
        default_value_t = 300_000,
        value_parser = clap::value_parser!(u64).range(1..),
        global = true
    )]
    pub poll_interval_ms: u64,

    /// Size of the all-time window in days (at most 3650)
    #[arg(
        long,
        env = "ALL_TIME_DAYS",
        default_value_t = 90,
        value_parser = clap::value_parser!(u32).range(0..=i64::from(MAX_ALL_TIME_DAYS)),
        global = true
    )]
    pub all_time_days: u32,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 3000, global = true)]
    pub port: u16,

    /// Base URL of the Anthropic API
    #[arg(
        long,
        env = "ANTHROPIC_API_BASE",
        default_value = "https://api.anthropic.com",
        global = true
    )]
    pub api_base: String,

    /// Timeout for each usage API request, in seconds
    #[arg(
        long,
        env = "CCTEAM_REQUEST_TIMEOUT_SECS",
        default_value_t = 30,
        value_parser = clap::value_parser!(u64).range(1..),
        global = true
    )]
    pub request_timeout_secs: u64,

    /// Only log warnings and errors
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Subcommand to execute (defaults to `serve`)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Poll the usage API and serve the live feed (default)
    Serve,
    /// Build one snapshot and print it
    Snapshot {
        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Build as of this UTC day (YYYY-MM-DD) instead of today
        #[arg(long)]
        today: Option<String>,
    },
}

impl Cli {
    /// The configured admin key, empty when none was given
    ///
    /// The client rejects an empty key with a configuration error.
    pub fn api_key(&self) -> &str {
        self.api_key.as_deref().map(str::trim).unwrap_or_default()
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Address the server binds to (all interfaces)
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }

    /// The command to run, `serve` when none was given
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Serve)
    }
}

/// Parse a YYYY-MM-DD day argument
pub fn parse_day(value: &str) -> Result<DailyDate> {
    match DailyDate::parse(value) {
        Some(day) if value.len() == 10 => Ok(day),
        _ => Err(CcteamError::InvalidArgument(format!(
            "Invalid date '{value}', expected YYYY-MM-DD"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["ccteam", "--api-key", "sk-test"]).unwrap();
        assert_eq!(cli.api_key(), "sk-test");
        assert_eq!(cli.poll_interval(), Duration::from_millis(300_000));
        assert_eq!(cli.all_time_days, 90);
        assert_eq!(cli.port, 3000);
        assert_eq!(cli.request_timeout(), Duration::from_secs(30));
        assert_eq!(cli.command(), Command::Serve);
        assert_eq!(cli.listen_addr().port(), 3000);
    }

    #[test]
    fn test_snapshot_subcommand() {
        let cli = Cli::try_parse_from([
            "ccteam",
            "snapshot",
            "--json",
            "--today",
            "2025-06-11",
            "--all-time-days",
            "7",
        ])
        .unwrap();
        assert_eq!(
            cli.command(),
            Command::Snapshot {
                json: true,
                today: Some("2025-06-11".to_string())
            }
        );
        assert_eq!(cli.all_time_days, 7);
    }

    #[test]
    fn test_zero_poll_interval_is_rejected() {
        let result = Cli::try_parse_from(["ccteam", "--poll-interval-ms", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_all_time_days_is_bounded() {
        let cli = Cli::try_parse_from(["ccteam", "--all-time-days", "3650"]).unwrap();
        assert_eq!(cli.all_time_days, MAX_ALL_TIME_DAYS);

        assert!(Cli::try_parse_from(["ccteam", "--all-time-days", "3651"]).is_err());
        assert!(Cli::try_parse_from(["ccteam", "--all-time-days", "4000000000"]).is_err());
    }

    #[test]
    fn test_blank_api_key_is_trimmed() {
        let cli = Cli::try_parse_from(["ccteam", "--api-key", "  sk-test  "]).unwrap();
        assert_eq!(cli.api_key(), "sk-test");
    }

    #[test]
    fn test_parse_day() {
        assert_eq!(parse_day("2025-06-11").unwrap().to_string(), "2025-06-11");
        assert!(parse_day("2025-06-11T00:00:00Z").is_err());
        assert!(parse_day("June 11").is_err());
    }
}
