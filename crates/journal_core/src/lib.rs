//! Core domain logic for the mood journal.
//! This crate is the single source of truth for entry, calendar and filter
//! invariants; hosts only render what it returns.

pub mod calendar;
pub mod config;
pub mod db;
pub mod filter;
pub mod logging;
pub mod model;
pub mod obfuscation;
pub mod repo;
pub mod service;
pub mod session;
pub mod stats;
pub mod storage;

pub use calendar::{CalendarCell, CalendarError, CalendarGrid, DateSelection, MonthCursor};
pub use config::{ConfigError, JournalConfig};
pub use filter::FilterCriteria;
pub use logging::{default_log_level, init_from_config, init_logging, logging_status};
pub use model::date_key::{Clock, DateKey, DateKeyError, FixedClock, SystemClock};
pub use model::entry::{EntryDraft, EntryId, EntryValidationError, JournalEntry, Mood};
pub use obfuscation::ObfuscationKey;
pub use repo::entry_store::{entries_storage_key, EntryStore, RestoreOutcome, StoreError};
pub use service::journal_service::{JournalError, JournalSession, Notice, RenderInstruction};
pub use session::{SessionError, SessionRecord, SessionStore, UserId};
pub use storage::{KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore, StorageError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
