//! Aggregation module for summarizing usage records
//!
//! Folds usage records into per-identity totals, and splits one fetched
//! superset into the today / this-week / all-time windows.
//!
//! Records are never deduplicated: each record contributes exactly once, so
//! feeding the same record twice counts it twice. Results are keyed in a
//! `BTreeMap`, which keeps enumeration order stable for identical input.
//!
//! # Examples
//!
//! ```
//! use ccteam::aggregation::Aggregator;
//! use ccteam::types::{Actor, DailyDate, UsageRecord};
//!
//! let record = UsageRecord {
//!     date: DailyDate::parse("2025-06-11").unwrap(),
//!     actor: Actor::user("jane@x.com"),
//!     lines_added: 40,
//!     lines_removed: 2,
//!     session_count: 1,
//! };
//!
//! let totals = Aggregator::aggregate_by_identity([&record, &record]);
//! assert_eq!(totals.values().next().unwrap().added, 80);
//! ```

use crate::aggregation_types::Aggregate;
use crate::types::{IdentityKey, UsageRecord};
use crate::window::ReportWindows;
use std::collections::BTreeMap;

/// Totals keyed by identity, in identity order
pub type IdentityTotals = BTreeMap<IdentityKey, Aggregate>;

/// Per-identity totals for each of the three reporting windows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowedTotals {
    pub today: IdentityTotals,
    pub week: IdentityTotals,
    pub all_time: IdentityTotals,
}

impl WindowedTotals {
    /// Totals for `identity` today, zero if it had no records
    pub fn today_for(&self, identity: &IdentityKey) -> Aggregate {
        self.today.get(identity).copied().unwrap_or_default()
    }

    /// Totals for `identity` this week, zero if it had no records
    pub fn week_for(&self, identity: &IdentityKey) -> Aggregate {
        self.week.get(identity).copied().unwrap_or_default()
    }

    /// Totals for `identity` over the all-time window, zero if it had no records
    pub fn all_time_for(&self, identity: &IdentityKey) -> Aggregate {
        self.all_time.get(identity).copied().unwrap_or_default()
    }
}

/// Stateless aggregation routines
#[derive(Debug, Default, Clone, Copy)]
pub struct Aggregator;

impl Aggregator {
    /// Fold records into totals per identity
    pub fn aggregate_by_identity<'a, I>(records: I) -> IdentityTotals
    where
        I: IntoIterator<Item = &'a UsageRecord>,
    {
        let mut totals = IdentityTotals::new();
        for record in records {
            totals.entry(record.identity()).or_default().add(record);
        }
        totals
    }

    /// Split records by window and aggregate each view independently
    ///
    /// The all-time view is every record given; callers are expected to have
    /// fetched exactly the all-time range.
    pub fn aggregate_windows(records: &[UsageRecord], windows: &ReportWindows) -> WindowedTotals {
        WindowedTotals {
            today: Self::aggregate_by_identity(
                records.iter().filter(|r| windows.is_today(r.date)),
            ),
            week: Self::aggregate_by_identity(
                records.iter().filter(|r| windows.is_this_week(r.date)),
            ),
            all_time: Self::aggregate_by_identity(records),
        }
    }
}
