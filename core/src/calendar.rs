use crate::prelude::{DataError, DataResult};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Textual date format used by the incident table (`MM/DD/YYYY`).
const MDY_FORMAT: &str = "%m/%d/%Y";

/// Canonical calendar-day value used for bucket keys and interval bounds.
///
/// The source data keys days textually; parsing and formatting happen only at
/// the ingestion and display boundaries, everything in between compares whole
/// days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DayKey(NaiveDate);

impl DayKey {
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Parses a `MM/DD/YYYY` date as found in the incident table.
    pub fn parse_mdy(text: &str) -> DataResult<Self> {
        NaiveDate::parse_from_str(text.trim(), MDY_FORMAT)
            .map(Self)
            .map_err(|_| DataError::InvalidDate(text.to_string()))
    }

    pub fn format_mdy(&self) -> String {
        self.0.format(MDY_FORMAT).to_string()
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Signed number of whole days from `other` to `self`.
    pub fn offset_from(&self, other: DayKey) -> i64 {
        self.0.signed_duration_since(other.0).num_days()
    }

    pub fn add_days(&self, days: i64) -> Option<Self> {
        self.0
            .checked_add_signed(chrono::Duration::days(days))
            .map(Self)
    }

    pub fn next(&self) -> Option<Self> {
        self.0.succ_opt().map(Self)
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_mdy())
    }
}

/// Inclusive pair of calendar days; always normalized so start <= end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateInterval {
    start: DayKey,
    end: DayKey,
}

impl DateInterval {
    pub fn new(a: DayKey, b: DayKey) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    pub fn single_day(day: DayKey) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    /// The fixed analysis window every series and filter operates over:
    /// 2006-01-01 through 2016-12-31 inclusive (4018 days).
    pub fn analysis_window() -> Self {
        let start = DayKey::from_ymd(2006, 1, 1).expect("window start is a valid date");
        let end = DayKey::from_ymd(2016, 12, 31).expect("window end is a valid date");
        Self { start, end }
    }

    pub fn start(&self) -> DayKey {
        self.start
    }

    pub fn end(&self) -> DayKey {
        self.end
    }

    /// Number of calendar days covered, counting both endpoints.
    pub fn len_days(&self) -> usize {
        (self.end.offset_from(self.start) + 1) as usize
    }

    pub fn contains(&self, day: DayKey) -> bool {
        self.start <= day && day <= self.end
    }

    pub fn intersect(&self, other: DateInterval) -> Option<DateInterval> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start <= end).then_some(DateInterval { start, end })
    }

    /// Enumerates every calendar day in the interval in ascending order.
    ///
    /// This is the single day-enumeration rule shared by the series builder
    /// and the interval filter.
    pub fn days(self) -> impl Iterator<Item = DayKey> {
        self.start
            .0
            .iter_days()
            .take_while(move |date| *date <= self.end.0)
            .map(DayKey)
    }
}

impl fmt::Display for DateInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}
