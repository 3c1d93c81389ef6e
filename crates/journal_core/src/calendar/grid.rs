//! Fixed-size month grid rendering and keyboard navigation.

use super::CalendarError;
use crate::model::date_key::DateKey;
use crate::model::entry::JournalEntry;
use chrono::{Datelike, NaiveDate};
use std::collections::HashSet;

/// Six weeks of seven days. Large enough for a 31-day month starting on
/// Saturday, so no month ever needs truncation.
pub const GRID_CELLS: usize = 42;

const WEEK_DAYS: usize = 7;

/// One grid position. Blank cells carry no day and no date key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CalendarCell {
    pub day: Option<u32>,
    pub date_key: Option<DateKey>,
    pub has_entries: bool,
    pub is_today: bool,
    pub is_selected: bool,
}

impl CalendarCell {
    pub fn is_blank(&self) -> bool {
        self.day.is_none()
    }
}

/// Rendered month. Always [`GRID_CELLS`] long.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarGrid {
    pub year: i32,
    pub month: u32,
    cells: Vec<CalendarCell>,
}

impl CalendarGrid {
    pub fn cells(&self) -> &[CalendarCell] {
        &self.cells
    }

    /// Number of blank cells before day 1 (weekday index, Sunday = 0).
    pub fn leading_blanks(&self) -> usize {
        self.cells.iter().take_while(|cell| cell.is_blank()).count()
    }

    pub fn day_cells(&self) -> impl Iterator<Item = &CalendarCell> {
        self.cells.iter().filter(|cell| !cell.is_blank())
    }

    /// Grid index of the cell for `key`, if that day is in this month.
    pub fn index_of(&self, key: DateKey) -> Option<usize> {
        self.cells
            .iter()
            .position(|cell| cell.date_key == Some(key))
    }
}

/// Gregorian day count for a 1-based month.
pub fn days_in_month(year: i32, month: u32) -> Result<u32, CalendarError> {
    let first = first_of_month(year, month)?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or(CalendarError::YearOutOfRange(year))?;
    Ok(next_first.signed_duration_since(first).num_days() as u32)
}

/// Renders `(year, month)` into a fixed grid.
///
/// `today` must come from the same clock used to stamp entries.
pub fn render(
    year: i32,
    month: u32,
    entries: &[JournalEntry],
    selected: Option<DateKey>,
    today: DateKey,
) -> Result<CalendarGrid, CalendarError> {
    let first = first_of_month(year, month)?;
    let day_count = days_in_month(year, month)?;
    let leading = first.weekday().num_days_from_sunday() as usize;
    let with_entries: HashSet<DateKey> = entries.iter().map(|entry| entry.date_key).collect();

    let mut cells = Vec::with_capacity(GRID_CELLS);
    cells.resize(leading, CalendarCell::default());
    for day in 1..=day_count {
        let key = DateKey::from_ymd(year, month, day).ok_or(CalendarError::YearOutOfRange(year))?;
        cells.push(CalendarCell {
            day: Some(day),
            date_key: Some(key),
            has_entries: with_entries.contains(&key),
            is_today: key == today,
            is_selected: selected == Some(key),
        });
    }
    cells.resize(GRID_CELLS, CalendarCell::default());

    Ok(CalendarGrid { year, month, cells })
}

/// Arrow-key movement within the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridMove {
    Left,
    Right,
    Up,
    Down,
}

/// Moves focus by one cell or one week, wrapping around the fixed grid.
pub fn grid_step(index: usize, direction: GridMove) -> usize {
    let index = index % GRID_CELLS;
    let offset = match direction {
        GridMove::Right => 1,
        GridMove::Left => GRID_CELLS - 1,
        GridMove::Down => WEEK_DAYS,
        GridMove::Up => GRID_CELLS - WEEK_DAYS,
    };
    (index + offset) % GRID_CELLS
}

/// Cell to focus after a render: the selected day, else today when visible.
pub fn focus_index(
    grid: &CalendarGrid,
    selected: Option<DateKey>,
    today: DateKey,
) -> Option<usize> {
    selected
        .and_then(|key| grid.index_of(key))
        .or_else(|| grid.index_of(today))
}

fn first_of_month(year: i32, month: u32) -> Result<NaiveDate, CalendarError> {
    if !(1..=12).contains(&month) {
        return Err(CalendarError::InvalidMonth(month));
    }
    NaiveDate::from_ymd_opt(year, month, 1).ok_or(CalendarError::YearOutOfRange(year))
}
