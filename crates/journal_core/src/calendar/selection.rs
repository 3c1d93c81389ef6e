//! Date selection state machine and month cursor.

use super::CalendarError;
use crate::model::date_key::DateKey;
use chrono::NaiveDate;

/// Calendar day selection.
///
/// Clicking the selected day clears it; clicking any other day moves the
/// selection there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateSelection {
    #[default]
    Unselected,
    Selected(DateKey),
}

impl DateSelection {
    #[must_use]
    pub fn click(self, key: DateKey) -> Self {
        match self {
            Self::Selected(current) if current == key => Self::Unselected,
            _ => Self::Selected(key),
        }
    }

    pub fn selected(self) -> Option<DateKey> {
        match self {
            Self::Unselected => None,
            Self::Selected(key) => Some(key),
        }
    }
}

/// Month currently shown by the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthCursor {
    year: i32,
    month: u32,
}

impl MonthCursor {
    pub fn new(year: i32, month: u32) -> Result<Self, CalendarError> {
        if !(1..=12).contains(&month) {
            return Err(CalendarError::InvalidMonth(month));
        }
        NaiveDate::from_ymd_opt(year, month, 1).ok_or(CalendarError::YearOutOfRange(year))?;
        Ok(Self { year, month })
    }

    /// Cursor on the month containing `key`.
    pub fn containing(key: DateKey) -> Self {
        Self {
            year: key.year(),
            month: key.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Moves by `delta` months, rolling over year boundaries.
    pub fn navigate(self, delta: i32) -> Result<Self, CalendarError> {
        let index = i64::from(self.year) * 12 + i64::from(self.month - 1) + i64::from(delta);
        let year = i32::try_from(index.div_euclid(12))
            .map_err(|_| CalendarError::YearOutOfRange(self.year))?;
        let month = index.rem_euclid(12) as u32 + 1;
        Self::new(year, month)
    }

    /// Whether `key` falls inside this month.
    pub fn contains(&self, key: DateKey) -> bool {
        key.year() == self.year && key.month() == self.month
    }
}

#[cfg(test)]
mod tests {
    use super::{DateSelection, MonthCursor};
    use crate::model::date_key::DateKey;

    #[test]
    fn selection_toggles_and_switches() {
        let first = DateKey::parse("2024-03-01").unwrap();
        let second = DateKey::parse("2024-03-02").unwrap();

        let state = DateSelection::Unselected.click(first);
        assert_eq!(state, DateSelection::Selected(first));
        assert_eq!(state.click(second), DateSelection::Selected(second));
        assert_eq!(state.click(first), DateSelection::Unselected);
    }

    #[test]
    fn cursor_rolls_over_years() {
        let cursor = MonthCursor::new(2024, 12).unwrap();
        let next = cursor.navigate(1).unwrap();
        assert_eq!((next.year(), next.month()), (2025, 1));
        let back = next.navigate(-13).unwrap();
        assert_eq!((back.year(), back.month()), (2023, 12));
    }

    #[test]
    fn cursor_contains_only_its_month() {
        let cursor = MonthCursor::new(2024, 2).unwrap();
        assert!(cursor.contains(DateKey::parse("2024-02-29").unwrap()));
        assert!(!cursor.contains(DateKey::parse("2024-03-01").unwrap()));
    }
}
