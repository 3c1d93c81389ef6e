//! Session-scoped journal context.
//!
//! # Responsibility
//! - Hold everything one signed-in session mutates: entries, filter
//!   selection, calendar selection and month, render pacing, trend options.
//! - Map each user action to a command that updates state and returns a
//!   [`RenderInstruction`] for the presentation layer.
//!
//! # Invariants
//! - A command finishes its store update and persist before it returns the
//!   render instruction.
//! - Rejected input leaves every piece of state untouched.
//! - Commands take `&mut self`, so two submissions can never interleave.

use crate::calendar::{
    focus_index, render, CalendarError, CalendarGrid, DateSelection, MonthCursor,
    RenderScheduler, RenderTicket,
};
use crate::filter::{apply, FilterCriteria};
use crate::model::date_key::{Clock, DateKey};
use crate::model::entry::{
    normalize_tag, EntryDraft, EntryId, EntryValidationError, JournalEntry, Mood,
};
use crate::repo::entry_store::{EntryStore, RestoreOutcome, StoreError};
use crate::stats::{
    entry_stats, trend_report, DateRange, DateRangePreset, EntryStats, TrendReport,
};
use crate::storage::KeyValueStore;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

#[derive(Debug)]
pub enum JournalError {
    Validation(EntryValidationError),
    Store(StoreError),
    Calendar(CalendarError),
}

impl Display for JournalError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Calendar(err) => write!(f, "{err}"),
        }
    }
}

impl Error for JournalError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Calendar(err) => Some(err),
        }
    }
}

impl From<EntryValidationError> for JournalError {
    fn from(value: EntryValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for JournalError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Validation(err) => Self::Validation(err),
            other => Self::Store(other),
        }
    }
}

impl From<CalendarError> for JournalError {
    fn from(value: CalendarError) -> Self {
        Self::Calendar(value)
    }
}

/// User-facing outcome message attached to a render instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    EntrySaved,
    EntryDeleted,
    /// The change is live in memory but could not be written to storage.
    PersistFailed(String),
}

/// What the presentation layer must refresh after a command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderInstruction {
    pub entries: bool,
    /// Pending paced calendar render; fetch it with
    /// [`JournalSession::take_due_render`].
    pub calendar: Option<RenderTicket>,
    pub charts: bool,
    pub notice: Option<Notice>,
}

/// Which empty-state message an empty list should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyState {
    /// The journal has no entries at all.
    NoEntries,
    /// Entries exist but none match the active filters.
    NoMatches,
}

/// Filtered entry list plus its empty state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryListView<'a> {
    pub entries: Vec<&'a JournalEntry>,
    pub empty_state: Option<EmptyState>,
}

/// Explicit per-session context passed to every journal operation.
pub struct JournalSession<S: KeyValueStore, C: Clock> {
    store: EntryStore<S>,
    clock: C,
    search_text: String,
    mood_filter: Option<Mood>,
    tag_filters: Vec<String>,
    selection: DateSelection,
    cursor: MonthCursor,
    scheduler: RenderScheduler,
    trend_preset: DateRangePreset,
    compare_trends: bool,
}

impl<S: KeyValueStore, C: Clock> JournalSession<S, C> {
    /// Restores `store` and opens the calendar on the current month.
    pub fn open(
        mut store: EntryStore<S>,
        clock: C,
        scheduler: RenderScheduler,
    ) -> (Self, RestoreOutcome) {
        let outcome = store.restore();
        let today = clock.today();
        info!(
            "event=session_open module=service status=ok key={} restore={:?}",
            store.storage_key(),
            outcome
        );
        let session = Self {
            store,
            clock,
            search_text: String::new(),
            mood_filter: None,
            tag_filters: Vec::new(),
            selection: DateSelection::Unselected,
            cursor: MonthCursor::containing(today),
            scheduler,
            trend_preset: DateRangePreset::ThisMonth,
            compare_trends: false,
        };
        (session, outcome)
    }

    pub fn entries(&self) -> &[JournalEntry] {
        self.store.all()
    }

    pub fn selection(&self) -> DateSelection {
        self.selection
    }

    pub fn cursor(&self) -> MonthCursor {
        self.cursor
    }

    /// Validates and saves a composed entry.
    ///
    /// # Errors
    /// - `Validation` for blank text, missing mood or blank tags. Nothing
    ///   changes in that case.
    pub fn submit_entry(&mut self, draft: EntryDraft) -> Result<RenderInstruction, JournalError> {
        if draft.mood.is_none() {
            return Err(EntryValidationError::MissingMood.into());
        }
        let entry = self.store.add(draft, self.clock.now())?;
        info!(
            "event=entry_submit module=service status=ok id={} date_key={} tags={}",
            entry.id,
            entry.date_key,
            entry.tags.len()
        );
        Ok(self.after_mutation(Notice::EntrySaved))
    }

    /// Deletes one entry.
    ///
    /// # Errors
    /// - `Store(NotFound)` when `id` is unknown.
    pub fn delete_entry(&mut self, id: EntryId) -> Result<RenderInstruction, JournalError> {
        self.store.delete(id)?;
        info!("event=entry_delete module=service status=ok id={id}");
        Ok(self.after_mutation(Notice::EntryDeleted))
    }

    /// Calendar day click: toggles or moves the selection.
    pub fn click_date(&mut self, key: DateKey) -> RenderInstruction {
        self.selection = self.selection.click(key);
        RenderInstruction {
            entries: true,
            calendar: Some(self.scheduler.schedule(Instant::now())),
            ..RenderInstruction::default()
        }
    }

    pub fn set_search_text(&mut self, text: impl Into<String>) -> RenderInstruction {
        self.search_text = text.into();
        Self::entries_only()
    }

    pub fn set_mood_filter(&mut self, mood: Option<Mood>) -> RenderInstruction {
        self.mood_filter = mood;
        Self::entries_only()
    }

    /// Adds the tag to the active tag filters, or removes it when present.
    pub fn toggle_tag_filter(&mut self, tag: &str) -> RenderInstruction {
        if let Some(tag) = normalize_tag(tag) {
            match self.tag_filters.iter().position(|active| *active == tag) {
                Some(index) => {
                    self.tag_filters.remove(index);
                }
                None => self.tag_filters.push(tag),
            }
        }
        Self::entries_only()
    }

    /// Resets search, mood, tag and date filters.
    pub fn clear_filters(&mut self) -> RenderInstruction {
        self.search_text.clear();
        self.mood_filter = None;
        self.tag_filters.clear();
        self.selection = DateSelection::Unselected;
        RenderInstruction {
            entries: true,
            calendar: Some(self.scheduler.schedule(Instant::now())),
            ..RenderInstruction::default()
        }
    }

    /// Moves the calendar by `delta` months.
    pub fn navigate_month(&mut self, delta: i32) -> Result<RenderInstruction, JournalError> {
        self.cursor = self.cursor.navigate(delta)?;
        Ok(RenderInstruction {
            calendar: Some(self.scheduler.schedule(Instant::now())),
            charts: true,
            ..RenderInstruction::default()
        })
    }

    /// Jumps the calendar to an explicit month (month/year pickers).
    pub fn show_month(&mut self, year: i32, month: u32) -> Result<RenderInstruction, JournalError> {
        self.cursor = MonthCursor::new(year, month)?;
        Ok(RenderInstruction {
            calendar: Some(self.scheduler.schedule(Instant::now())),
            charts: true,
            ..RenderInstruction::default()
        })
    }

    pub fn set_trend_range(&mut self, preset: DateRangePreset, compare: bool) -> RenderInstruction {
        self.trend_preset = preset;
        self.compare_trends = compare;
        RenderInstruction {
            charts: true,
            ..RenderInstruction::default()
        }
    }

    /// Ends the session and drops its in-memory state. Stored entries stay
    /// on disk; the session is consumed, so nothing can persist after it.
    pub fn logout(self) {
        info!(
            "event=session_logout module=service status=ok key={} entries={}",
            self.store.storage_key(),
            self.store.len()
        );
    }

    /// Current filter snapshot, rebuilt from selection state.
    pub fn filter_criteria(&self) -> FilterCriteria {
        let search = self.search_text.trim();
        FilterCriteria {
            search_text: (!search.is_empty()).then(|| search.to_string()),
            mood: self.mood_filter,
            tags: self.tag_filters.clone(),
            date_key: self.selection.selected(),
            start_date: None,
            end_date: None,
        }
    }

    pub fn visible_entries(&self) -> EntryListView<'_> {
        let criteria = self.filter_criteria();
        let entries = apply(self.store.all(), &criteria);
        let empty_state = match (entries.is_empty(), self.store.is_empty()) {
            (false, _) => None,
            (true, true) => Some(EmptyState::NoEntries),
            (true, false) => Some(EmptyState::NoMatches),
        };
        EntryListView {
            entries,
            empty_state,
        }
    }

    /// Renders the month under the cursor immediately.
    pub fn calendar(&self) -> Result<CalendarGrid, JournalError> {
        Ok(render(
            self.cursor.year(),
            self.cursor.month(),
            self.store.all(),
            self.selection.selected(),
            self.clock.today(),
        )?)
    }

    /// Returns the paced calendar render once it is due.
    pub fn take_due_render(
        &mut self,
        now: Instant,
    ) -> Option<Result<CalendarGrid, JournalError>> {
        self.scheduler.poll(now).map(|_| self.calendar())
    }

    /// Grid index that should receive keyboard focus after a render.
    pub fn focus_index(&self, grid: &CalendarGrid) -> Option<usize> {
        focus_index(grid, self.selection.selected(), self.clock.today())
    }

    pub fn trends(&self) -> TrendReport {
        trend_report(
            self.store.all(),
            self.trend_preset,
            self.clock.today(),
            self.compare_trends,
        )
    }

    pub fn stats(&self, range: Option<DateRange>) -> EntryStats {
        entry_stats(self.store.all(), range)
    }

    fn entries_only() -> RenderInstruction {
        RenderInstruction {
            entries: true,
            ..RenderInstruction::default()
        }
    }

    fn after_mutation(&mut self, success: Notice) -> RenderInstruction {
        let notice = match self.store.persist() {
            Ok(()) => success,
            Err(err) => {
                warn!("event=entries_persist module=service status=degraded error={err}");
                Notice::PersistFailed(err.to_string())
            }
        };
        RenderInstruction {
            entries: true,
            calendar: Some(self.scheduler.schedule(Instant::now())),
            charts: true,
            notice: Some(notice),
        }
    }
}
