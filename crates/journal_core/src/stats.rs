//! Mood and tag trend aggregation.
//!
//! # Responsibility
//! - Resolve date-range presets against the journal clock.
//! - Count mood and tag frequencies, optionally against the preceding window.
//!
//! # Invariants
//! - Ranges are inclusive on both ends and `start <= end`.
//! - Series are ordered by count descending; ties keep first appearance in
//!   store order (newest first).

use crate::model::date_key::DateKey;
use crate::model::entry::{JournalEntry, Mood};
use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;

/// Number of moods shown by the mood trend series.
pub const MOOD_SERIES_LIMIT: usize = 8;
/// Number of tags shown by the tag frequency series.
pub const TAG_SERIES_LIMIT: usize = 5;

/// Inclusive calendar-day range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: DateKey,
    pub end: DateKey,
}

impl DateRange {
    /// Builds a range, swapping bounds given in reverse order.
    pub fn new(a: DateKey, b: DateKey) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    pub fn contains(&self, key: DateKey) -> bool {
        self.start <= key && key <= self.end
    }

    pub fn days(&self) -> i64 {
        (self.end.date() - self.start.date()).num_days() + 1
    }

    /// The window of equal length ending the day before `start`.
    ///
    /// Clamped to the earliest representable day.
    pub fn comparison(&self) -> Self {
        let end = self.start.date().pred_opt().unwrap_or(NaiveDate::MIN);
        let start = end
            .checked_sub_signed(self.end.date() - self.start.date())
            .unwrap_or(NaiveDate::MIN);
        Self {
            start: start.into(),
            end: end.into(),
        }
    }
}

/// Range choices offered by the trends view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRangePreset {
    /// `today - n` through today.
    LastDays(u32),
    ThisMonth,
    LastMonth,
    ThisYear,
    Custom { start: DateKey, end: DateKey },
}

impl DateRangePreset {
    pub fn resolve(self, today: DateKey) -> DateRange {
        let date = today.date();
        match self {
            Self::LastDays(days) => {
                let start = date
                    .checked_sub_days(Days::new(u64::from(days)))
                    .unwrap_or(NaiveDate::MIN);
                DateRange::new(start.into(), today)
            }
            Self::ThisMonth => month_range(date.year(), date.month()),
            Self::LastMonth => {
                if date.month() == 1 {
                    month_range(date.year() - 1, 12)
                } else {
                    month_range(date.year(), date.month() - 1)
                }
            }
            Self::ThisYear => DateRange::new(
                ymd_or(date.year(), 1, 1, date).into(),
                ymd_or(date.year(), 12, 31, date).into(),
            ),
            Self::Custom { start, end } => DateRange::new(start, end),
        }
    }
}

/// One labelled count in a trend series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeriesPoint<T> {
    pub label: T,
    pub count: usize,
    /// Count in the comparison window, when comparison is enabled.
    pub previous: Option<usize>,
    /// Percentage change against `previous`.
    pub trend: Option<i64>,
}

/// Data behind the mood and tag charts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendReport {
    pub range: DateRange,
    pub comparison: Option<DateRange>,
    pub moods: Vec<SeriesPoint<Mood>>,
    pub tags: Vec<SeriesPoint<String>>,
}

/// Aggregate counts over a range, mirroring the stats endpoint payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryStats {
    pub total_entries: usize,
    pub mood_stats: Vec<(Mood, usize)>,
    pub tag_stats: Vec<(String, usize)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendDirection {
    Up,
    Down,
    Flat,
}

impl TrendDirection {
    pub fn from_percentage(percentage: i64) -> Self {
        match percentage {
            p if p > 0 => Self::Up,
            p if p < 0 => Self::Down,
            _ => Self::Flat,
        }
    }
}

/// Percentage change from `previous` to `current`, rounded half up.
///
/// A zero baseline reports 100 when anything appeared and 0 otherwise.
pub fn trend_percentage(current: usize, previous: usize) -> i64 {
    if previous == 0 {
        return if current > 0 { 100 } else { 0 };
    }
    let change = (current as f64 - previous as f64) / previous as f64 * 100.0;
    (change + 0.5).floor() as i64
}

/// Mood counts within `range`, most frequent first, at most `limit` moods.
pub fn mood_frequencies(
    entries: &[JournalEntry],
    range: DateRange,
    limit: usize,
) -> Vec<(Mood, usize)> {
    let mut counts = count_in_order(
        entries
            .iter()
            .filter(|entry| range.contains(entry.date_key))
            .filter_map(|entry| entry.mood),
    );
    counts.truncate(limit);
    counts
}

/// Tag counts within `range`, most frequent first, at most `limit` tags.
pub fn tag_frequencies(
    entries: &[JournalEntry],
    range: DateRange,
    limit: usize,
) -> Vec<(String, usize)> {
    let mut counts = count_in_order(
        entries
            .iter()
            .filter(|entry| range.contains(entry.date_key))
            .flat_map(|entry| entry.tags.iter().cloned()),
    );
    counts.truncate(limit);
    counts
}

/// Builds both chart series for `preset`, optionally with comparison data.
pub fn trend_report(
    entries: &[JournalEntry],
    preset: DateRangePreset,
    today: DateKey,
    compare: bool,
) -> TrendReport {
    let range = preset.resolve(today);
    let comparison = compare.then(|| range.comparison());

    let moods = mood_frequencies(entries, range, MOOD_SERIES_LIMIT);
    let tags = tag_frequencies(entries, range, TAG_SERIES_LIMIT);

    let (previous_moods, previous_tags) = match comparison {
        Some(window) => (
            mood_frequencies(entries, window, usize::MAX),
            tag_frequencies(entries, window, usize::MAX),
        ),
        None => (Vec::new(), Vec::new()),
    };

    TrendReport {
        range,
        comparison,
        moods: with_previous(moods, &previous_moods, comparison.is_some()),
        tags: with_previous(tags, &previous_tags, comparison.is_some()),
    }
}

/// Total, mood and tag counts over an optional range.
pub fn entry_stats(entries: &[JournalEntry], range: Option<DateRange>) -> EntryStats {
    let in_range = move || {
        entries
            .iter()
            .filter(move |entry| range.map_or(true, |range| range.contains(entry.date_key)))
    };
    EntryStats {
        total_entries: in_range().count(),
        mood_stats: count_in_order(in_range().filter_map(|entry| entry.mood)),
        tag_stats: count_in_order(in_range().flat_map(|entry| entry.tags.iter().cloned())),
    }
}

fn with_previous<T: PartialEq + Clone>(
    current: Vec<(T, usize)>,
    previous: &[(T, usize)],
    compare: bool,
) -> Vec<SeriesPoint<T>> {
    current
        .into_iter()
        .map(|(label, count)| {
            let prior = compare.then(|| {
                previous
                    .iter()
                    .find(|(candidate, _)| *candidate == label)
                    .map_or(0, |(_, n)| *n)
            });
            SeriesPoint {
                trend: prior.map(|p| trend_percentage(count, p)),
                previous: prior,
                label,
                count,
            }
        })
        .collect()
}

fn count_in_order<T: PartialEq>(items: impl Iterator<Item = T>) -> Vec<(T, usize)> {
    let mut counts: Vec<(T, usize)> = Vec::new();
    for item in items {
        match counts.iter_mut().find(|(seen, _)| *seen == item) {
            Some((_, count)) => *count += 1,
            None => counts.push((item, 1)),
        }
    }
    // Stable: ties keep first-appearance order.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

fn month_range(year: i32, month: u32) -> DateRange {
    let first = NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MIN);
    let last = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .and_then(|next| next.pred_opt())
    .unwrap_or(NaiveDate::MAX);
    DateRange::new(first.into(), last.into())
}

fn ymd_or(year: i32, month: u32, day: u32, fallback: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(fallback)
}
