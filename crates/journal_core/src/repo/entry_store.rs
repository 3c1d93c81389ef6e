//! Ordered in-memory entry collection with masked persistence.
//!
//! # Responsibility
//! - Own the current user's entries for the session, newest first.
//! - Round-trip entries through the key-value backend with `text` and `tags`
//!   masked by the session's obfuscation key.
//!
//! # Invariants
//! - `entries` is sorted by `id` descending after every mutation.
//! - Every held entry passes `JournalEntry::validate()`.
//! - `restore()` never fails; unreadable payloads yield an empty store.

use crate::model::date_key::DateKey;
use crate::model::entry::{
    normalize_tag, normalize_tags, EntryDraft, EntryId, EntryValidationError, JournalEntry, Mood,
};
use crate::obfuscation::{deobfuscate, obfuscate, ObfuscationKey};
use crate::storage::{KeyValueStore, StorageError};
use chrono::{DateTime, FixedOffset};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
pub enum StoreError {
    Validation(EntryValidationError),
    Storage(StorageError),
    Serialize(serde_json::Error),
    NotFound(EntryId),
    DuplicateId(EntryId),
    IdSpaceExhausted,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "{err}"),
            Self::Serialize(err) => write!(f, "failed to encode entries: {err}"),
            Self::NotFound(id) => write!(f, "entry not found: {id}"),
            Self::DuplicateId(id) => write!(f, "entry id already exists: {id}"),
            Self::IdSpaceExhausted => write!(f, "no entry id left after {}", EntryId::MAX),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::Serialize(err) => Some(err),
            Self::NotFound(_) | Self::DuplicateId(_) | Self::IdSpaceExhausted => None,
        }
    }
}

impl From<EntryValidationError> for StoreError {
    fn from(value: EntryValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StorageError> for StoreError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}

/// What `restore()` found in storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// No payload stored under the key.
    Missing,
    /// Payload decoded; `skipped` records were unusable and dropped.
    Loaded { loaded: usize, skipped: usize },
    /// Payload was not a JSON entry array.
    Corrupt,
    /// Backend read failed.
    Unavailable,
}

/// Per-user storage key, e.g. `journalEntries_<user id>`.
pub fn entries_storage_key(prefix: &str, user_id: impl Display) -> String {
    format!("{prefix}_{user_id}")
}

/// Persisted record shape. `text` and `tags` hold masked values.
#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry {
    id: EntryId,
    text: String,
    #[serde(default)]
    mood: Option<serde_json::Value>,
    #[serde(default)]
    tags: Vec<String>,
    date: DateTime<FixedOffset>,
    #[serde(rename = "dateString", default, skip_serializing_if = "Option::is_none")]
    date_string: Option<String>,
}

/// Session-scoped entry store over an injected key-value backend.
pub struct EntryStore<S: KeyValueStore> {
    storage: S,
    storage_key: String,
    key: ObfuscationKey,
    entries: Vec<JournalEntry>,
}

impl<S: KeyValueStore> EntryStore<S> {
    /// Creates an empty store. Call [`EntryStore::restore`] to load state.
    pub fn new(storage: S, storage_key: impl Into<String>, key: ObfuscationKey) -> Self {
        Self {
            storage,
            storage_key: storage_key.into(),
            key,
            entries: Vec::new(),
        }
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// Entries, newest first.
    pub fn all(&self) -> &[JournalEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: EntryId) -> Option<&JournalEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Inserts one entry and returns the stored record.
    ///
    /// `created_at` defaults to `now`. A missing `id` is derived from the
    /// creation instant and bumped past the newest held id so ids stay
    /// monotonic in insertion order.
    ///
    /// # Errors
    /// - `Validation` for blank text or blank tags.
    /// - `DuplicateId` when an explicit id is already held.
    /// - `IdSpaceExhausted` when no id above the newest one remains.
    pub fn add(
        &mut self,
        draft: EntryDraft,
        now: DateTime<FixedOffset>,
    ) -> StoreResult<JournalEntry> {
        let text = draft.text.trim().to_string();
        if text.is_empty() {
            return Err(EntryValidationError::EmptyText.into());
        }
        let tags = normalize_tags(&draft.tags)?;
        let created_at = draft.created_at.unwrap_or(now);

        let id = match draft.id {
            Some(id) if self.get(id).is_some() => return Err(StoreError::DuplicateId(id)),
            Some(id) => id,
            None => self.next_id(created_at.timestamp_millis())?,
        };

        let entry = JournalEntry {
            id,
            text,
            mood: draft.mood,
            tags,
            created_at,
            date_key: DateKey::from_timestamp(&created_at),
        };
        entry.validate()?;

        let position = self.entries.partition_point(|held| held.id > id);
        self.entries.insert(position, entry.clone());
        Ok(entry)
    }

    /// Removes one entry.
    ///
    /// # Errors
    /// - `NotFound` when no entry has `id`. The store is left unchanged.
    pub fn delete(&mut self, id: EntryId) -> StoreResult<JournalEntry> {
        let position = self
            .entries
            .iter()
            .position(|entry| entry.id == id)
            .ok_or(StoreError::NotFound(id))?;
        Ok(self.entries.remove(position))
    }

    /// Drops in-memory entries without touching storage.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Writes all entries, masked, under the store's key.
    pub fn persist(&self) -> StoreResult<()> {
        let stored: Vec<StoredEntry> = self
            .entries
            .iter()
            .map(|entry| StoredEntry {
                id: entry.id,
                text: obfuscate(&entry.text, &self.key),
                mood: entry
                    .mood
                    .map(|mood| serde_json::Value::String(mood.as_str().to_string())),
                tags: entry
                    .tags
                    .iter()
                    .map(|tag| obfuscate(tag, &self.key))
                    .collect(),
                date: entry.created_at,
                date_string: Some(entry.date_key.to_string()),
            })
            .collect();
        let payload = serde_json::to_string(&stored)?;

        if let Err(err) = self.storage.set(&self.storage_key, &payload) {
            error!(
                "event=entries_persist module=repo status=error key={} count={} error={}",
                self.storage_key,
                stored.len(),
                err
            );
            return Err(err.into());
        }
        info!(
            "event=entries_persist module=repo status=ok key={} count={}",
            self.storage_key,
            stored.len()
        );
        Ok(())
    }

    /// Replaces in-memory state with the stored payload.
    ///
    /// Missing, unreadable or malformed payloads leave the store empty.
    pub fn restore(&mut self) -> RestoreOutcome {
        self.entries.clear();

        let raw = match self.storage.get(&self.storage_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                info!(
                    "event=entries_restore module=repo status=missing key={}",
                    self.storage_key
                );
                return RestoreOutcome::Missing;
            }
            Err(err) => {
                error!(
                    "event=entries_restore module=repo status=error key={} error={}",
                    self.storage_key, err
                );
                return RestoreOutcome::Unavailable;
            }
        };

        let stored: Vec<StoredEntry> = match serde_json::from_str(&raw) {
            Ok(stored) => stored,
            Err(err) => {
                warn!(
                    "event=entries_restore module=repo status=corrupt key={} error={}",
                    self.storage_key, err
                );
                return RestoreOutcome::Corrupt;
            }
        };

        let mut seen = HashSet::with_capacity(stored.len());
        let mut skipped = 0;
        for record in stored {
            match self.unmask(record) {
                Some(entry) if seen.insert(entry.id) => self.entries.push(entry),
                _ => skipped += 1,
            }
        }
        self.entries.sort_by(|a, b| b.id.cmp(&a.id));

        let loaded = self.entries.len();
        info!(
            "event=entries_restore module=repo status=ok key={} loaded={} skipped={}",
            self.storage_key, loaded, skipped
        );
        RestoreOutcome::Loaded { loaded, skipped }
    }

    fn unmask(&self, record: StoredEntry) -> Option<JournalEntry> {
        let mood = record
            .mood
            .as_ref()
            .and_then(serde_json::Value::as_str)
            .and_then(|value| value.parse::<Mood>().ok());

        let mut tags: Vec<String> = Vec::with_capacity(record.tags.len());
        for masked in &record.tags {
            if let Some(tag) = normalize_tag(&deobfuscate(masked, &self.key)) {
                if !tags.contains(&tag) {
                    tags.push(tag);
                }
            }
        }

        let entry = JournalEntry {
            id: record.id,
            text: deobfuscate(&record.text, &self.key),
            mood,
            tags,
            created_at: record.date,
            date_key: DateKey::from_timestamp(&record.date),
        };

        if let Some(stored_key) = record.date_string.as_deref() {
            if stored_key != entry.date_key.to_string() {
                warn!(
                    "event=entries_restore module=repo status=rebucketed id={} stored={} \
                     derived={}",
                    entry.id, stored_key, entry.date_key
                );
            }
        }

        match entry.validate() {
            Ok(()) => Some(entry),
            Err(err) => {
                warn!(
                    "event=entries_restore module=repo status=skipped id={} error={}",
                    record.id, err
                );
                None
            }
        }
    }

    fn next_id(&self, candidate: EntryId) -> StoreResult<EntryId> {
        match self.entries.first() {
            Some(newest) if newest.id >= candidate => newest
                .id
                .checked_add(1)
                .ok_or(StoreError::IdSpaceExhausted),
            _ => Ok(candidate),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{entries_storage_key, EntryStore};
    use crate::model::entry::EntryDraft;
    use crate::obfuscation::ObfuscationKey;
    use crate::storage::MemoryKeyValueStore;
    use chrono::DateTime;

    #[test]
    fn storage_key_includes_user_id() {
        assert_eq!(
            entries_storage_key("journalEntries", 42),
            "journalEntries_42"
        );
    }

    #[test]
    fn ids_stay_monotonic_within_one_millisecond() {
        let storage = MemoryKeyValueStore::new();
        let mut store = EntryStore::new(&storage, "k", ObfuscationKey::derive("pw"));
        let now = DateTime::parse_from_rfc3339("2024-03-01T10:00:00+00:00").unwrap();

        let first = store.add(EntryDraft::new("one"), now).unwrap();
        let second = store.add(EntryDraft::new("two"), now).unwrap();
        assert_eq!(first.id, now.timestamp_millis());
        assert_eq!(second.id, first.id + 1);
        assert_eq!(store.all()[0].text, "two");
    }

    #[test]
    fn text_is_trimmed_on_insert() {
        let storage = MemoryKeyValueStore::new();
        let mut store = EntryStore::new(&storage, "k", ObfuscationKey::derive("pw"));
        let now = DateTime::parse_from_rfc3339("2024-03-01T10:00:00+00:00").unwrap();
        let entry = store.add(EntryDraft::new("  hello  "), now).unwrap();
        assert_eq!(entry.text, "hello");
    }
}
