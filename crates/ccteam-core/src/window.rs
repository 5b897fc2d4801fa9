//! Reporting windows
//!
//! All windows are computed on UTC calendar days, matching how the usage
//! report API buckets its rows.

use crate::types::DailyDate;
use chrono::{Datelike, Days, Utc};

/// Default size of the all-time window in days
pub const DEFAULT_ALL_TIME_DAYS: u32 = 90;

/// Largest all-time window accepted (ten years); one request is made per day
pub const MAX_ALL_TIME_DAYS: u32 = 3650;

/// Current UTC calendar day
pub fn today_utc() -> DailyDate {
    DailyDate::new(Utc::now().date_naive())
}

/// Most recent Monday on or before `today`
///
/// A Sunday maps six days back to the preceding Monday, never to itself.
///
/// # Examples
/// ```
/// use ccteam_core::{types::DailyDate, window::week_start};
///
/// let sunday = DailyDate::parse("2025-06-15").unwrap();
/// assert_eq!(week_start(sunday).to_string(), "2025-06-09");
/// ```
pub fn week_start(today: DailyDate) -> DailyDate {
    let offset = u64::from(today.inner().weekday().num_days_from_monday());
    days_before(today, offset)
}

/// The day `n` days before `day`, clamped to the earliest representable date
pub fn days_before(day: DailyDate, n: u64) -> DailyDate {
    DailyDate::new(
        day.inner()
            .checked_sub_days(Days::new(n))
            .unwrap_or(chrono::NaiveDate::MIN),
    )
}

/// Every day from `start` through `end`, inclusive; empty if `start > end`
pub fn days_inclusive(start: DailyDate, end: DailyDate) -> impl Iterator<Item = DailyDate> {
    start
        .inner()
        .iter_days()
        .take_while(move |day| *day <= *end.inner())
        .map(DailyDate::new)
}

/// The three reference points a snapshot is built against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindows {
    /// Current day
    pub today: DailyDate,
    /// Monday of the current week
    pub week_start: DailyDate,
    /// First day of the all-time window
    pub all_time_start: DailyDate,
}

impl ReportWindows {
    /// Compute windows for a given day and all-time size
    ///
    /// Sizes above [`MAX_ALL_TIME_DAYS`] are clamped to it.
    pub fn new(today: DailyDate, all_time_days: u32) -> Self {
        let all_time_days = all_time_days.min(MAX_ALL_TIME_DAYS);
        Self {
            today,
            week_start: week_start(today),
            all_time_start: days_before(today, u64::from(all_time_days)),
        }
    }

    /// Compute windows for the current UTC day
    pub fn current(all_time_days: u32) -> Self {
        Self::new(today_utc(), all_time_days)
    }

    /// Whether `date` falls on the current day
    pub fn is_today(&self, date: DailyDate) -> bool {
        date == self.today
    }

    /// Whether `date` falls on or after the start of the week
    pub fn is_this_week(&self, date: DailyDate) -> bool {
        date >= self.week_start
    }
}
