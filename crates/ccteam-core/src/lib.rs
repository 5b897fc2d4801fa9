//! Core types, traits, and utilities for ccteam
//!
//! This crate provides the foundational types, error handling, reporting
//! windows, identity formatting and the usage source trait used by all other
//! ccteam crates.

pub mod aggregation_types;
pub mod error;
pub mod identity_formatter;
pub mod provider;
pub mod types;
pub mod window;

// Re-export commonly used types
pub use aggregation_types::{Aggregate, Member, Snapshot, TeamTotals};
pub use error::{CcteamError, Result};
pub use provider::{UsageSource, fetch_range};
pub use types::{Actor, DailyDate, IdentityKey, UsagePage, UsageRecord};
