//! End-to-end pipeline tests over a realistic day of events

use hourperf_core::{block, Cell, ControlValues, MemoryStore, ReportGrid, TaskCategory};
use hourperf_pivot::{build_report, run_report, ColumnAliases, Notice, SourceTable};
use pretty_assertions::assert_eq;

fn rows() -> Vec<Vec<String>> {
    let data: &[[&str; 10]] = &[
        ["Shift", "date", "task_type", "Full_Name", "HOUR", "quantity", "occupied_hours",
         "performance_without_rotation", "performance_with_rotation", "comment"],
        ["Shift1", "45413", "Pick", "Sara", "۹", "120", "45", "60.9%", "131.5%", ""],
        ["Shift1", "45413.5", "Pick", "Reza", "11", "1,5", "70", "۸۵٫۵٪", "0.9", "late"],
        ["Shift2", "2024-05-01", "Receive", "Ali", "8", "30", "", "1 234", "", ""],
        ["Shift1", "2024-04-30", "Pick", "Old", "10", "1", "60", "1", "1", ""],
        ["Shift1", "45413", "Packing", "Nope", "9", "1", "60", "1", "1", ""],
        ["Shift1", "45413", "Stock taking", "Mina", "", "4", "30", "50", "50", ""],
    ];
    data.iter().map(|r| r.map(String::from).to_vec()).collect()
}

#[test]
fn builds_full_grid_for_latest_day() {
    let table = SourceTable::from_rows(rows());
    let outcome = build_report(&table, &ControlValues::new(), &ColumnAliases::default()).unwrap();
    assert_eq!(outcome.resolved_day.unwrap().iso(), "2024-05-01");

    let grid = outcome.grid().unwrap();
    assert_eq!(grid.width(), 79);
    assert_eq!(grid.row_count(), 2);
    assert_eq!(grid.header[ReportGrid::block_start(5)], "Pick_full_name");

    let pick = ReportGrid::block_start(5);
    let reza = &grid.rows[0][pick..pick + 7];
    assert_eq!(reza[block::FULL_NAME], Cell::Text("Reza".into()));
    assert_eq!(reza[block::HOUR], Cell::Integer(11));
    assert_eq!(reza[block::QUANTITY], Cell::Number(1.5));
    assert_eq!(reza[block::NEGATIVE_MINUTES], Cell::Integer(0));
    assert_eq!(reza[block::PERFORMANCE_WITHOUT_ROTATION], Cell::Number(0.855));
    assert_eq!(reza[block::PERFORMANCE_WITH_ROTATION], Cell::Number(0.9));

    let sara = &grid.rows[1][pick..pick + 7];
    assert_eq!(sara[block::HOUR], Cell::Integer(9));
    assert_eq!(sara[block::NEGATIVE_MINUTES], Cell::Integer(15));

    let receive = &grid.rows[0][..7];
    assert_eq!(receive[block::FULL_NAME], Cell::Text("Ali".into()));
    assert_eq!(receive[block::NEGATIVE_MINUTES], Cell::Integer(60));
    // 1234 is outside the percentage range
    assert_eq!(receive[block::PERFORMANCE_WITHOUT_ROTATION], Cell::Number(0.0));

    let stock = ReportGrid::block_start(7);
    assert_eq!(grid.rows[0][stock + block::HOUR], Cell::Blank);
    assert_eq!(grid.rows[0][stock + block::PERFORMANCE_WITH_ROTATION], Cell::Number(0.5));

    assert_eq!(grid.populated_rows(TaskCategory::Locate), 0);
}

#[test]
fn hour_control_with_persian_digits() {
    let table = SourceTable::from_rows(rows());
    let controls = ControlValues::new().day("2024-05-01").hour("۹").shift("Shift1");
    let outcome = build_report(&table, &controls, &ColumnAliases::default()).unwrap();
    let grid = outcome.grid().unwrap();
    assert_eq!(grid.row_count(), 1);
    assert_eq!(grid.populated_rows(TaskCategory::Pick), 1);
    assert_eq!(grid.populated_rows(TaskCategory::Receive), 0);
}

#[test]
fn store_run_round() {
    let mut store = MemoryStore::new().with_source(rows());
    let summary = run_report(&mut store, &ColumnAliases::default()).unwrap();
    assert_eq!(summary.notice, None);
    assert_eq!(store.controls.day.as_deref(), Some("2024-05-01"));

    // second run uses the persisted day and yields the same grid
    let first = store.rows.clone();
    let again = run_report(&mut store, &ColumnAliases::default()).unwrap();
    assert!(!again.day_persisted);
    assert_eq!(store.rows, first);
}

#[test]
fn other_day_without_matches() {
    let mut store = MemoryStore::new()
        .with_source(rows())
        .with_controls(ControlValues::new().day("2024-06-01"));
    let summary = run_report(&mut store, &ColumnAliases::default()).unwrap();
    assert_eq!(summary.notice, Some(Notice::FilterEmpty));
    assert_eq!(store.header, None);
}
