//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store, filter, calendar and stats calls into user actions.
//! - Keep presentation layers decoupled from storage details.

pub mod journal_service;
