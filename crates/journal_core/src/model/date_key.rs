//! Canonical calendar-day bucketing.
//!
//! # Responsibility
//! - Convert timestamps into `YYYY-MM-DD` keys used for calendar matching.
//! - Provide the single clock source shared by entry creation and calendar
//!   annotation.
//!
//! # Invariants
//! - A key is always derived from the calendar fields of the timestamp's own
//!   offset. UTC and local sources are never mixed.
//! - Parsed keys are zero-padded and denote a real Gregorian date.

use chrono::{DateTime, Datelike, FixedOffset, Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt::{Display, Formatter};

static DATE_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").expect("valid date key regex"));

/// Canonical `YYYY-MM-DD` calendar bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey(NaiveDate);

/// Error for non-canonical or impossible date keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateKeyError(String);

impl Display for DateKeyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid date key `{}`; expected YYYY-MM-DD", self.0)
    }
}

impl Error for DateKeyError {}

impl DateKey {
    /// Buckets a timestamp by the calendar date in its own offset.
    pub fn from_timestamp(timestamp: &DateTime<FixedOffset>) -> Self {
        Self(timestamp.date_naive())
    }

    /// Builds a key from calendar fields. Returns `None` for impossible dates.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Parses a canonical key. Non-padded input such as `2024-3-7` is rejected.
    pub fn parse(value: &str) -> Result<Self, DateKeyError> {
        let caps = DATE_KEY_RE
            .captures(value)
            .ok_or_else(|| DateKeyError(value.to_string()))?;
        let field = |idx: usize| caps[idx].parse::<u32>().ok();
        let (Some(year), Some(month), Some(day)) = (field(1), field(2), field(3)) else {
            return Err(DateKeyError(value.to_string()));
        };
        Self::from_ymd(year as i32, month, day).ok_or_else(|| DateKeyError(value.to_string()))
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// 1-based month.
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }
}

impl From<NaiveDate> for DateKey {
    fn from(value: NaiveDate) -> Self {
        Self(value)
    }
}

impl Display for DateKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}",
            self.0.year(),
            self.0.month(),
            self.0.day()
        )
    }
}

impl Serialize for DateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DateKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Time source shared by entry creation and calendar "today" annotation.
pub trait Clock {
    fn now(&self) -> DateTime<FixedOffset>;

    /// Today's bucket, derived from the same source as `now`.
    fn today(&self) -> DateKey {
        DateKey::from_timestamp(&self.now())
    }
}

/// Wall clock in the host's local offset.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// Clock pinned to one instant. Used by tests and replay tooling.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}
