//! ccteam - Live Claude Code usage for a whole team
//!
//! This library provides functionality to:
//! - Fetch daily Claude Code usage reports from the Anthropic Admin API
//! - Fold them into today / this-week / all-time totals per team member
//! - Rebuild the member snapshot on a fixed interval
//! - Push every snapshot to dashboard clients over Server-Sent Events
//!
//! # Examples
//!
//! ```no_run
//! use ccteam::{
//!     poller::Poller,
//!     provider_admin::AdminClient,
//!     snapshot::SnapshotBuilder,
//! };
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> ccteam::Result<()> {
//!     let client = AdminClient::new("sk-ant-admin-...", Duration::from_secs(30))?;
//!     let builder = SnapshotBuilder::new(Arc::new(client)).with_all_time_days(30);
//!
//!     let poller = Poller::new(builder, Duration::from_secs(300));
//!     poller.poll_once().await;
//!     println!("{} members", poller.latest().len());
//!     Ok(())
//! }
//! ```

pub mod aggregation;
pub mod cli;
pub mod output;
pub mod poller;
pub mod server;
pub mod snapshot;

// Re-export the core crate's modules under their usual paths
pub use ccteam_core::{aggregation_types, error, identity_formatter, provider, types, window};
pub use ccteam_provider_admin as provider_admin;

pub use error::{CcteamError, Result};
pub use types::{Actor, DailyDate, IdentityKey, UsageRecord};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
