//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable that drives one journal session end to end.
//! - Keep output deterministic apart from the current date.
//!
//! Usage: `journal_cli [config.json]`

use chrono::NaiveDate;
use journal_core::calendar::{CalendarGrid, RenderScheduler};
use journal_core::db::{open_db, open_db_in_memory};
use journal_core::{
    core_version, entries_storage_key, init_from_config, Clock, EntryDraft, EntryStore,
    JournalConfig, JournalSession, Mood, ObfuscationKey, SessionStore, SqliteKeyValueStore,
    SystemClock,
};
use std::error::Error;
use std::process::ExitCode;
use std::rc::Rc;
use uuid::Uuid;

const DEMO_EMAIL: &str = "demo@example.com";
const DEMO_CREDENTIAL: &str = "demo-password";

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("journal_cli error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => JournalConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => JournalConfig::default(),
    };
    if let Err(err) = init_from_config(&config) {
        eprintln!("journal_cli warning: logging disabled: {err}");
    }
    println!("journal_core version={}", core_version());

    let conn = match config.db_path.as_deref() {
        Some(path) => open_db(path)?,
        None => open_db_in_memory()?,
    };
    let storage = Rc::new(SqliteKeyValueStore::new(conn));
    let clock = SystemClock;

    let sessions = SessionStore::with_ttl_hours(Rc::clone(&storage), config.session_ttl_hours)?;
    let record = match sessions.load(clock.now()) {
        Some(record) => record,
        None => sessions.start(Uuid::new_v4(), DEMO_EMAIL, clock.now())?,
    };

    let store = EntryStore::new(
        Rc::clone(&storage),
        entries_storage_key(&config.storage_key_prefix, record.user_id),
        ObfuscationKey::derive(DEMO_CREDENTIAL),
    );
    let scheduler = RenderScheduler::new(config.render_delay());
    let (mut journal, outcome) = JournalSession::open(store, clock, scheduler);
    println!("restore={outcome:?}");

    let instruction = journal.submit_entry(
        EntryDraft::new("Wrote a journal entry from the command line.")
            .with_mood(Mood::Happy)
            .with_tags(["demo", "cli"]),
    )?;
    if let Some(notice) = instruction.notice {
        println!("notice={notice:?}");
    }

    print_calendar(&journal.calendar()?);
    for entry in journal.visible_entries().entries {
        let mood = entry.mood.map(|mood| mood.emoji()).unwrap_or("-");
        println!(
            "{} {} {} [{}]",
            entry.date_key,
            mood,
            entry.text,
            entry.tags.join(", ")
        );
    }
    Ok(())
}

fn print_calendar(grid: &CalendarGrid) {
    if let Some(first) = NaiveDate::from_ymd_opt(grid.year, grid.month, 1) {
        println!("{:^27}", first.format("%B %Y").to_string());
    }
    println!(" Su  Mo  Tu  We  Th  Fr  Sa");
    for week in grid.cells().chunks(7) {
        let row: Vec<String> = week
            .iter()
            .map(|cell| match cell.day {
                Some(day) if cell.has_entries => format!("{day:>3}*"),
                Some(day) => format!("{day:>3} "),
                None => "    ".to_string(),
            })
            .collect();
        println!("{}", row.join("").trim_end());
    }
}
