//! Entry filter composition.
//!
//! # Responsibility
//! - Combine search, mood, tag, day and date-range constraints into one
//!   predicate.
//!
//! # Invariants
//! - Active criteria combine with logical AND; unset criteria impose nothing.
//! - Input order is preserved, so store order (newest first) survives.
//! - "No match" is an empty `Vec`, never an absent value.

use crate::model::date_key::DateKey;
use crate::model::entry::{normalize_tag, JournalEntry, Mood};

/// Active filter selection, rebuilt from UI state on every interaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Case-insensitive text or tag substring.
    pub search_text: Option<String>,
    pub mood: Option<Mood>,
    /// Multi-select tag filter; an entry matches when it has any of them.
    pub tags: Vec<String>,
    /// Exact calendar day.
    pub date_key: Option<DateKey>,
    /// Inclusive lower bound on `date_key`.
    pub start_date: Option<DateKey>,
    /// Inclusive upper bound on `date_key`.
    pub end_date: Option<DateKey>,
}

impl FilterCriteria {
    /// Returns `true` when no criterion constrains the result.
    pub fn is_empty(&self) -> bool {
        self.search_term().is_none()
            && self.mood.is_none()
            && self.tags.is_empty()
            && self.date_key.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
    }

    /// Single-entry predicate for the full criteria set.
    pub fn matches(&self, entry: &JournalEntry) -> bool {
        self.matches_search(entry)
            && self.mood.map_or(true, |mood| entry.mood == Some(mood))
            && self.matches_tags(entry)
            && self.date_key.map_or(true, |key| entry.date_key == key)
            && self.start_date.map_or(true, |start| entry.date_key >= start)
            && self.end_date.map_or(true, |end| entry.date_key <= end)
    }

    fn search_term(&self) -> Option<String> {
        self.search_text
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(str::to_lowercase)
    }

    fn matches_search(&self, entry: &JournalEntry) -> bool {
        let Some(term) = self.search_term() else {
            return true;
        };
        if entry.text.to_lowercase().contains(&term) {
            return true;
        }
        let tag_term = term.strip_prefix('#').unwrap_or(&term);
        entry
            .tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(tag_term))
    }

    fn matches_tags(&self, entry: &JournalEntry) -> bool {
        if self.tags.is_empty() {
            return true;
        }
        self.tags
            .iter()
            .filter_map(|tag| normalize_tag(tag))
            .any(|tag| entry.has_tag(&tag))
    }
}

/// Narrows `entries` to those matching every active criterion.
pub fn apply<'a>(entries: &'a [JournalEntry], criteria: &FilterCriteria) -> Vec<&'a JournalEntry> {
    if criteria.is_empty() {
        return entries.iter().collect();
    }
    entries
        .iter()
        .filter(|entry| criteria.matches(entry))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{apply, FilterCriteria};
    use crate::model::date_key::DateKey;
    use crate::model::entry::{JournalEntry, Mood};
    use chrono::DateTime;

    fn entry(id: i64, text: &str, mood: Mood, tags: &[&str], ts: &str) -> JournalEntry {
        let created_at = DateTime::parse_from_rfc3339(ts).unwrap();
        JournalEntry {
            id,
            text: text.to_string(),
            mood: Some(mood),
            tags: tags.iter().map(|tag| tag.to_string()).collect(),
            created_at,
            date_key: DateKey::from_timestamp(&created_at),
        }
    }

    #[test]
    fn hash_prefix_only_applies_to_tag_matching() {
        let entries = vec![
            entry(2, "went to the gym", Mood::Proud, &[], "2024-03-02T09:00:00+00:00"),
            entry(1, "quiet day", Mood::Calm, &["gym"], "2024-03-01T09:00:00+00:00"),
        ];
        let criteria = FilterCriteria {
            search_text: Some("#GYM".to_string()),
            ..FilterCriteria::default()
        };
        let ids: Vec<i64> = apply(&entries, &criteria).iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn blank_search_text_is_unset() {
        let criteria = FilterCriteria {
            search_text: Some("   ".to_string()),
            ..FilterCriteria::default()
        };
        assert!(criteria.is_empty());
    }

    #[test]
    fn date_range_is_inclusive() {
        let entries = vec![
            entry(3, "c", Mood::Happy, &[], "2024-03-03T09:00:00+00:00"),
            entry(2, "b", Mood::Happy, &[], "2024-03-02T09:00:00+00:00"),
            entry(1, "a", Mood::Happy, &[], "2024-03-01T09:00:00+00:00"),
        ];
        let criteria = FilterCriteria {
            start_date: DateKey::parse("2024-03-02").ok(),
            end_date: DateKey::parse("2024-03-03").ok(),
            ..FilterCriteria::default()
        };
        let ids: Vec<i64> = apply(&entries, &criteria).iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![3, 2]);
    }
}
