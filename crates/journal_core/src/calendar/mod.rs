//! Month calendar projection.
//!
//! # Responsibility
//! - Project a `(year, month)` onto a fixed six-week grid annotated with
//!   entry presence, today and the current selection.
//! - Own date-selection and month-navigation state transitions.
//! - Pace re-renders so at most one render is pending at a time.
//!
//! # Invariants
//! - Every grid has exactly [`GRID_CELLS`] cells regardless of month.
//! - "Today" comes from the same clock that stamps new entries.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod grid;
pub mod scheduler;
pub mod selection;

pub use grid::{
    days_in_month, focus_index, grid_step, render, CalendarCell, CalendarGrid, GridMove,
    GRID_CELLS,
};
pub use scheduler::{RenderScheduler, RenderTicket, DEFAULT_RENDER_DELAY};
pub use selection::{DateSelection, MonthCursor};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarError {
    InvalidMonth(u32),
    YearOutOfRange(i32),
}

impl Display for CalendarError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidMonth(month) => write!(f, "month must be within 1..=12, got {month}"),
            Self::YearOutOfRange(year) => write!(f, "year {year} is outside the supported range"),
        }
    }
}

impl Error for CalendarError {}
