//! Entry persistence layer.
//!
//! # Responsibility
//! - Hold the session's entries in display order.
//! - Isolate storage layout and masking details from services.
//!
//! # Invariants
//! - Writes validate entries before they become visible.
//! - Repository APIs return semantic errors (`NotFound`) in addition to
//!   storage transport errors.

pub mod entry_store;
