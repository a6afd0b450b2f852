//! Monthly partitioning of a snapshot.
//!
//! Months are taken in the reference timezone, Asia/Jakarta (UTC+7, no DST),
//! not in the offset a timestamp was received with. A track saved at
//! `2024-02-29T17:30:00Z` was saved on March 1st in Jakarta and belongs to
//! March.

use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, TimeDelta};

use crate::{
    error::MonthKeyError,
    types::{Snapshot, TrackRecord},
};

/// Offset of the reference timezone from UTC, in hours.
pub const REFERENCE_UTC_OFFSET_HOURS: i64 = 7;

/// Wall-clock time of `ts` in the reference timezone.
pub fn reference_time(ts: &DateTime<FixedOffset>) -> NaiveDateTime {
    ts.naive_utc() + TimeDelta::hours(REFERENCE_UTC_OFFSET_HOURS)
}

/// A calendar month, ordered chronologically.
///
/// Held as the first day of the month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey(NaiveDate);

impl MonthKey {
    pub fn new(month: u32, year: i32) -> Result<Self, MonthKeyError> {
        if !(1..=12).contains(&month) {
            return Err(MonthKeyError::Month(month.to_string()));
        }
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(Self)
            .ok_or_else(|| MonthKeyError::Year(year.to_string()))
    }

    /// Parses command line style input: month `1`-`12` (leading zero allowed)
    /// and a four digit year.
    pub fn parse(month: &str, year: &str) -> Result<Self, MonthKeyError> {
        let month_str = month.trim();
        let month: u32 = month_str
            .parse()
            .ok()
            .filter(|m| (1..=12).contains(m))
            .ok_or_else(|| MonthKeyError::Month(month_str.to_string()))?;

        let year_str = year.trim();
        if year_str.len() != 4 || !year_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(MonthKeyError::Year(year_str.to_string()));
        }
        let year: i32 = year_str
            .parse()
            .map_err(|_| MonthKeyError::Year(year_str.to_string()))?;

        Self::new(month, year)
    }

    /// Month `ts` falls in once converted to the reference timezone.
    pub fn of(ts: &DateTime<FixedOffset>) -> Self {
        let date = reference_time(ts).date();
        Self(date.with_day(1).unwrap_or(date))
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Name of the playlist collecting this month, e.g. `March '24`.
    pub fn playlist_name(&self) -> String {
        self.0.format("%B '%y").to_string()
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

/// Tracks of `snapshot` saved in `month`, in snapshot order.
pub fn select_month(snapshot: &Snapshot, month: MonthKey) -> Vec<&TrackRecord> {
    snapshot
        .tracks()
        .iter()
        .filter(|t| MonthKey::of(&t.added_at) == month)
        .collect()
}

/// Number of tracks per month, oldest month first.
pub fn month_counts(snapshot: &Snapshot) -> BTreeMap<MonthKey, usize> {
    let mut counts = BTreeMap::new();
    for track in snapshot.tracks() {
        *counts.entry(MonthKey::of(&track.added_at)).or_insert(0) += 1;
    }
    counts
}
