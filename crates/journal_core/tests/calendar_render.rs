use chrono::{DateTime, Datelike, NaiveDate};
use journal_core::calendar::{focus_index, render, GRID_CELLS};
use journal_core::{DateKey, DateSelection, JournalEntry, Mood, MonthCursor};

fn entry_on(id: i64, date: NaiveDate) -> JournalEntry {
    let created_at = DateTime::parse_from_rfc3339(&format!("{date}T12:00:00+02:00")).unwrap();
    JournalEntry {
        id,
        text: format!("entry {id}"),
        mood: Some(Mood::Neutral),
        tags: Vec::new(),
        created_at,
        date_key: DateKey::from_timestamp(&created_at),
    }
}

fn key(value: &str) -> DateKey {
    DateKey::parse(value).unwrap()
}

#[test]
fn march_2024_has_five_leading_blanks() {
    let grid = render(2024, 3, &[], None, key("2024-03-15")).unwrap();

    assert_eq!(grid.cells().len(), GRID_CELLS);
    assert_eq!(grid.leading_blanks(), 5);
    assert_eq!(grid.day_cells().count(), 31);
    assert!(grid.cells()[36..].iter().all(|cell| cell.is_blank()));
    assert_eq!(grid.cells()[5].day, Some(1));
    assert_eq!(grid.cells()[35].day, Some(31));
}

#[test]
fn today_and_selection_flags_are_set_on_one_cell_each() {
    let grid = render(
        2024,
        3,
        &[],
        Some(key("2024-03-10")),
        key("2024-03-15"),
    )
    .unwrap();

    let today: Vec<u32> = grid
        .cells()
        .iter()
        .filter(|cell| cell.is_today)
        .filter_map(|cell| cell.day)
        .collect();
    let selected: Vec<u32> = grid
        .cells()
        .iter()
        .filter(|cell| cell.is_selected)
        .filter_map(|cell| cell.day)
        .collect();
    assert_eq!(today, vec![15]);
    assert_eq!(selected, vec![10]);
    assert_eq!(
        focus_index(&grid, Some(key("2024-03-10")), key("2024-03-15")),
        Some(5 + 9)
    );
    assert_eq!(focus_index(&grid, None, key("2024-03-15")), Some(5 + 14));
    assert_eq!(focus_index(&grid, None, key("2024-04-01")), None);
}

#[test]
fn entry_marker_lands_on_exactly_one_cell_every_month() {
    for year in [2023, 2024] {
        for month in 1..=12 {
            let date = NaiveDate::from_ymd_opt(year, month, 15).unwrap();
            let entries = vec![entry_on(1, date)];
            let grid = render(year, month, &entries, None, key("2000-01-01")).unwrap();

            let marked: Vec<DateKey> = grid
                .cells()
                .iter()
                .filter(|cell| cell.has_entries)
                .filter_map(|cell| cell.date_key)
                .collect();
            assert_eq!(marked, vec![DateKey::from(date)], "{year}-{month:02}");
        }
    }
}

#[test]
fn entries_outside_the_month_are_not_marked() {
    let entries = vec![
        entry_on(1, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()),
        entry_on(2, NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()),
    ];
    let grid = render(2024, 3, &entries, None, key("2024-03-15")).unwrap();
    assert!(grid.cells().iter().all(|cell| !cell.has_entries));
}

#[test]
fn every_day_cell_key_matches_its_position() {
    let grid = render(2024, 2, &[], None, key("2024-02-01")).unwrap();
    for cell in grid.day_cells() {
        let date_key = cell.date_key.unwrap();
        assert_eq!(Some(date_key.day()), cell.day);
        assert_eq!(date_key.month(), 2);
    }
    assert_eq!(grid.day_cells().count(), 29);
}

#[test]
fn month_cursor_rolls_over_years() {
    let cursor = MonthCursor::new(2024, 12).unwrap();
    let next = cursor.navigate(1).unwrap();
    assert_eq!((next.year(), next.month()), (2025, 1));

    let back = MonthCursor::new(2024, 1).unwrap().navigate(-1).unwrap();
    assert_eq!((back.year(), back.month()), (2023, 12));

    let far = cursor.navigate(-25).unwrap();
    assert_eq!((far.year(), far.month()), (2022, 11));
    assert!(MonthCursor::new(2024, 0).is_err());
}

#[test]
fn clicking_the_same_day_twice_clears_the_selection() {
    let day = key("2024-03-10");
    let once = DateSelection::default().click(day);
    assert_eq!(once.selected(), Some(day));
    assert_eq!(once.click(day).selected(), None);

    let moved = once.click(key("2024-03-11"));
    assert_eq!(moved.selected().map(|k| k.date().day()), Some(11));
}
