//! Snapshot building
//!
//! One snapshot is built from a single range fetch covering the all-time
//! window; the today and this-week views are filtered out of that superset so
//! no day is requested twice.

use crate::aggregation::{Aggregator, WindowedTotals};
use crate::aggregation_types::{Member, Snapshot};
use crate::error::Result;
use crate::identity_formatter::{display_name, initials};
use crate::provider::{UsageSource, fetch_range};
use crate::types::DailyDate;
use crate::window::{DEFAULT_ALL_TIME_DAYS, MAX_ALL_TIME_DAYS, ReportWindows, today_utc};
use std::sync::Arc;
use tracing::info;

/// Builds snapshots from a usage source
pub struct SnapshotBuilder {
    source: Arc<dyn UsageSource>,
    all_time_days: u32,
}

impl SnapshotBuilder {
    /// Create a builder over `source` with the default all-time window
    pub fn new(source: Arc<dyn UsageSource>) -> Self {
        Self {
            source,
            all_time_days: DEFAULT_ALL_TIME_DAYS,
        }
    }

    /// Set the size of the all-time window in days, at most [`MAX_ALL_TIME_DAYS`]
    pub fn with_all_time_days(mut self, days: u32) -> Self {
        self.all_time_days = days.min(MAX_ALL_TIME_DAYS);
        self
    }

    pub fn all_time_days(&self) -> u32 {
        self.all_time_days
    }

    /// Build a snapshot for the current UTC day
    pub async fn build(&self) -> Result<Snapshot> {
        self.build_for(today_utc()).await
    }

    /// Build a snapshot as if `today` were the current day
    pub async fn build_for(&self, today: DailyDate) -> Result<Snapshot> {
        let windows = ReportWindows::new(today, self.all_time_days);
        info!(
            "Fetching analytics: today={}, weekStart={}, allTimeStart={}",
            windows.today, windows.week_start, windows.all_time_start
        );

        let records = fetch_range(self.source.as_ref(), windows.all_time_start, windows.today).await?;
        let totals = Aggregator::aggregate_windows(&records, &windows);
        Ok(Self::assemble(&totals))
    }

    /// Merge windowed totals into members, one per all-time identity
    ///
    /// Ids are assigned from 1 in identity-key order.
    pub fn assemble(totals: &WindowedTotals) -> Snapshot {
        let members = totals
            .all_time
            .keys()
            .zip(1u32..)
            .map(|(identity, id)| {
                let today = totals.today_for(identity);
                let name = display_name(identity.as_str());
                Member {
                    id,
                    email: identity.clone(),
                    avatar: initials(&name),
                    name,
                    active: today.sessions > 0,
                    lines_today: today.added,
                    lines_this_week: totals.week_for(identity).added,
                    lines_all_time: totals.all_time_for(identity).added,
                }
            })
            .collect();

        Snapshot::new(members)
    }
}
