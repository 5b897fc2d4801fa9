//! Usage source trait and range fetching
//!
//! A `UsageSource` knows how to fetch one day of usage records. Range fetching
//! is written once on top of it so that every source gets the same
//! partial-failure behaviour.

use crate::error::Result;
use crate::types::{DailyDate, UsageRecord};
use crate::window::days_inclusive;
use async_trait::async_trait;
use tracing::{debug, info, warn};

/// Trait for anything that can produce usage records for a day.
///
/// The Admin API client implements this; tests implement it with canned data.
#[async_trait]
pub trait UsageSource: Send + Sync {
    /// Check that the source is usable before any request is made.
    ///
    /// Errors here are systemic (typically `CcteamError::Config`) and abort a
    /// whole range fetch.
    fn check_ready(&self) -> Result<()> {
        Ok(())
    }

    /// Fetch every record for one day, following pagination to the end.
    async fn fetch_day(&self, day: DailyDate) -> Result<Vec<UsageRecord>>;
}

/// Fetch every day from `start` through `end` inclusive, in day order.
///
/// A day failing with a transport, API or decode error is logged and skipped;
/// the records of every other day are still returned. Only systemic errors
/// (from [`UsageSource::check_ready`], or a non-per-day error from a fetch)
/// fail the range.
pub async fn fetch_range<S>(source: &S, start: DailyDate, end: DailyDate) -> Result<Vec<UsageRecord>>
where
    S: UsageSource + ?Sized,
{
    source.check_ready()?;

    let mut records = Vec::new();
    let mut failed_days = 0usize;
    for day in days_inclusive(start, end) {
        match source.fetch_day(day).await {
            Ok(day_records) => {
                debug!("Fetched {} records for {}", day_records.len(), day);
                records.extend(day_records);
            }
            Err(e) if e.is_per_day() => {
                warn!("Failed to fetch usage for {}: {}", day, e);
                failed_days += 1;
            }
            Err(e) => return Err(e),
        }
    }

    if failed_days > 0 {
        info!(
            "Usage range {}..={} fetched with {} day(s) skipped",
            start, end, failed_days
        );
    }
    Ok(records)
}
