//! Journal domain model.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Own the calendar bucketing rule shared by storage and rendering.
//!
//! # Invariants
//! - Every entry is identified by a monotonically increasing `EntryId`.
//! - An entry's `date_key` is derived from, and consistent with, `created_at`.

pub mod date_key;
pub mod entry;
