//! Journal entry domain model.
//!
//! # Responsibility
//! - Define the canonical entry record and its fixed mood vocabulary.
//! - Normalize tag input into an ordered, deduplicated lowercase set.
//!
//! # Invariants
//! - `text` is never blank.
//! - `date_key` always equals `DateKey::from_timestamp(&created_at)`.
//! - `tags` are lowercase, `#`-free, unique, in first-seen order.

use crate::model::date_key::DateKey;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Entry identity. Epoch milliseconds of creation, bumped on collision.
pub type EntryId = i64;

/// Fixed mood vocabulary offered by the composer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mood {
    Happy,
    Sad,
    Excited,
    Calm,
    Anxious,
    Grateful,
    Neutral,
    Angry,
    Motivated,
    InLove,
    Reflective,
    Tired,
    Overwhelmed,
    Proud,
    Numb,
}

impl Mood {
    pub const ALL: [Mood; 15] = [
        Mood::Happy,
        Mood::Sad,
        Mood::Excited,
        Mood::Calm,
        Mood::Anxious,
        Mood::Grateful,
        Mood::Neutral,
        Mood::Angry,
        Mood::Motivated,
        Mood::InLove,
        Mood::Reflective,
        Mood::Tired,
        Mood::Overwhelmed,
        Mood::Proud,
        Mood::Numb,
    ];

    /// Stable wire name, e.g. `in-love`.
    pub fn as_str(self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Sad => "sad",
            Mood::Excited => "excited",
            Mood::Calm => "calm",
            Mood::Anxious => "anxious",
            Mood::Grateful => "grateful",
            Mood::Neutral => "neutral",
            Mood::Angry => "angry",
            Mood::Motivated => "motivated",
            Mood::InLove => "in-love",
            Mood::Reflective => "reflective",
            Mood::Tired => "tired",
            Mood::Overwhelmed => "overwhelmed",
            Mood::Proud => "proud",
            Mood::Numb => "numb",
        }
    }

    /// Human-readable label for lists and chart legends.
    pub fn display_name(self) -> &'static str {
        match self {
            Mood::InLove => "In Love",
            Mood::Happy => "Happy",
            Mood::Sad => "Sad",
            Mood::Excited => "Excited",
            Mood::Calm => "Calm",
            Mood::Anxious => "Anxious",
            Mood::Grateful => "Grateful",
            Mood::Neutral => "Neutral",
            Mood::Angry => "Angry",
            Mood::Motivated => "Motivated",
            Mood::Reflective => "Reflective",
            Mood::Tired => "Tired",
            Mood::Overwhelmed => "Overwhelmed",
            Mood::Proud => "Proud",
            Mood::Numb => "Numb",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Mood::Happy => "😊",
            Mood::Sad => "😢",
            Mood::Excited => "🤩",
            Mood::Calm => "😌",
            Mood::Anxious => "😰",
            Mood::Grateful => "🙏",
            Mood::Neutral => "😐",
            Mood::Angry => "😡",
            Mood::Motivated => "😤",
            Mood::InLove => "😍",
            Mood::Reflective => "🤔",
            Mood::Tired => "😴",
            Mood::Overwhelmed => "🤯",
            Mood::Proud => "🥳",
            Mood::Numb => "😶",
        }
    }
}

impl Display for Mood {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mood {
    type Err = EntryValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Mood::ALL
            .into_iter()
            .find(|mood| mood.as_str() == normalized)
            .ok_or_else(|| EntryValidationError::UnknownMood(value.to_string()))
    }
}

/// Validation failures for entry input and persisted entry state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryValidationError {
    EmptyText,
    MissingMood,
    UnknownMood(String),
    InvalidTag(String),
    DateKeyMismatch {
        id: EntryId,
        stored: DateKey,
        derived: DateKey,
    },
}

impl Display for EntryValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText => write!(f, "entry text cannot be empty"),
            Self::MissingMood => write!(f, "entry mood must be selected"),
            Self::UnknownMood(value) => write!(f, "unknown mood `{value}`"),
            Self::InvalidTag(value) => write!(f, "invalid tag: `{value}`"),
            Self::DateKeyMismatch {
                id,
                stored,
                derived,
            } => write!(
                f,
                "entry {id} has date key {stored} but its timestamp buckets to {derived}"
            ),
        }
    }
}

impl Error for EntryValidationError {}

/// Stored journal entry. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: EntryId,
    pub text: String,
    #[serde(default, deserialize_with = "deserialize_lenient_mood")]
    pub mood: Option<Mood>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// ISO-8601 creation instant, kept in the writer's offset.
    #[serde(rename = "date")]
    pub created_at: DateTime<FixedOffset>,
    #[serde(rename = "dateString")]
    pub date_key: DateKey,
}

impl JournalEntry {
    /// Checks the record-level invariants.
    pub fn validate(&self) -> Result<(), EntryValidationError> {
        if self.text.trim().is_empty() {
            return Err(EntryValidationError::EmptyText);
        }
        let derived = DateKey::from_timestamp(&self.created_at);
        if derived != self.date_key {
            return Err(EntryValidationError::DateKeyMismatch {
                id: self.id,
                stored: self.date_key,
                derived,
            });
        }
        Ok(())
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|candidate| candidate == tag)
    }
}

/// Maps moods outside the current vocabulary to `None` so older payloads load.
fn deserialize_lenient_mood<'de, D>(deserializer: D) -> Result<Option<Mood>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| value.parse().ok()))
}

/// Input for a new entry. `id` and `created_at` are assigned when absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryDraft {
    pub text: String,
    pub mood: Option<Mood>,
    pub tags: Vec<String>,
    pub id: Option<EntryId>,
    pub created_at: Option<DateTime<FixedOffset>>,
}

impl EntryDraft {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_mood(mut self, mood: Mood) -> Self {
        self.mood = Some(mood);
        self
    }

    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn created_at(mut self, timestamp: DateTime<FixedOffset>) -> Self {
        self.created_at = Some(timestamp);
        self
    }
}

/// Normalizes one tag: trims, drops a leading `#`, lowercases.
///
/// Returns `None` when nothing remains.
pub fn normalize_tag(tag: &str) -> Option<String> {
    let trimmed = tag.trim();
    let trimmed = trimmed.strip_prefix('#').unwrap_or(trimmed).trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Normalizes a tag list, keeping first-seen order and dropping duplicates.
///
/// # Errors
/// - Returns `InvalidTag` for blank values (including a bare `#`).
pub fn normalize_tags(tags: &[String]) -> Result<Vec<String>, EntryValidationError> {
    let mut unique: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let value =
            normalize_tag(tag).ok_or_else(|| EntryValidationError::InvalidTag(tag.clone()))?;
        if !unique.contains(&value) {
            unique.push(value);
        }
    }
    Ok(unique)
}

#[cfg(test)]
mod tests {
    use super::{normalize_tag, normalize_tags, EntryValidationError, Mood};

    #[test]
    fn mood_parses_wire_names() {
        assert_eq!("in-love".parse::<Mood>().unwrap(), Mood::InLove);
        assert_eq!(" Happy ".parse::<Mood>().unwrap(), Mood::Happy);
        assert!(matches!(
            "meh".parse::<Mood>(),
            Err(EntryValidationError::UnknownMood(_))
        ));
    }

    #[test]
    fn normalize_tag_strips_hash_and_lowercases() {
        assert_eq!(normalize_tag(" #Work ").as_deref(), Some("work"));
        assert_eq!(normalize_tag("#"), None);
    }

    #[test]
    fn normalize_tags_preserves_first_seen_order() {
        let tags = vec!["Work".to_string(), "gym".to_string(), "#work".to_string()];
        assert_eq!(normalize_tags(&tags).unwrap(), vec!["work", "gym"]);
    }

    #[test]
    fn normalize_tags_rejects_blank_values() {
        let tags = vec!["ok".to_string(), "  ".to_string()];
        assert_eq!(
            normalize_tags(&tags),
            Err(EntryValidationError::InvalidTag("  ".to_string()))
        );
    }
}
