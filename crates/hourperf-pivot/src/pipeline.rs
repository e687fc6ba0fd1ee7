//! The pure report pipeline
//!
//! `build_report` runs column resolution, day resolution, filtering,
//! grouping and layout over an in-memory table. It never touches a store;
//! see [`crate::runner`] for the write protocol.

use chrono::NaiveDate;
use hourperf_core::{ControlValues, DayWindow, ReportGrid, SourceTable, TaskCategory};
use serde::{Deserialize, Serialize};

use crate::columns::{resolve, ColumnAliases, Record};
use crate::filter::{filter, latest_day, DaySelection, FilterSpec};
use crate::group::group_and_sort;
use crate::layout::build_grid;
use crate::PivotError;

/// Why no grid was produced
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Notice {
    /// The source holds no data rows
    EmptySource,
    /// Auto day requested but no date cell resolves
    NoValidDate,
    /// Nothing matches the day, hour and shift
    FilterEmpty,
    /// Matching records exist but none has a known task type
    NothingToRender,
}

impl Notice {
    pub fn message(&self) -> &'static str {
        match self {
            Notice::EmptySource => "Source data is empty.",
            Notice::NoValidDate => "No valid date found in source data.",
            Notice::FilterEmpty => "Filter result is empty (check date/hour/shift).",
            Notice::NothingToRender => "Nothing left after grouping by task type.",
        }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// The day a run reports on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedDay {
    pub day: NaiveDate,
    pub window: DayWindow,
    /// True when the day was derived from the data rather than the control
    pub auto: bool,
}

impl ResolvedDay {
    pub fn explicit(day: NaiveDate) -> Self {
        Self {
            day,
            window: DayWindow::for_day(day),
            auto: false,
        }
    }

    pub fn auto(day: NaiveDate) -> Self {
        Self {
            auto: true,
            ..Self::explicit(day)
        }
    }

    /// `YYYY-MM-DD`
    pub fn iso(&self) -> String {
        self.day.format("%Y-%m-%d").to_string()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ReportBody {
    Grid(ReportGrid),
    Notice(Notice),
}

/// Result of one pipeline pass
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReportOutcome {
    /// `None` only when the run stopped before a day was resolved
    pub resolved_day: Option<ResolvedDay>,
    pub body: ReportBody,
}

impl ReportOutcome {
    fn notice(resolved_day: Option<ResolvedDay>, notice: Notice) -> Self {
        Self {
            resolved_day,
            body: ReportBody::Notice(notice),
        }
    }

    pub fn grid(&self) -> Option<&ReportGrid> {
        match &self.body {
            ReportBody::Grid(grid) => Some(grid),
            ReportBody::Notice(_) => None,
        }
    }

    pub fn as_notice(&self) -> Option<Notice> {
        match &self.body {
            ReportBody::Notice(notice) => Some(*notice),
            ReportBody::Grid(_) => None,
        }
    }

    /// Day to write back to the day control, if it was derived from the data
    pub fn day_to_persist(&self) -> Option<NaiveDate> {
        self.resolved_day.filter(|d| d.auto).map(|d| d.day)
    }
}

/// Build the pivoted report for `table` under `controls`
///
/// Empty inputs end in a [`Notice`]; only a missing required column is an
/// error.
pub fn build_report(
    table: &SourceTable,
    controls: &ControlValues,
    aliases: &ColumnAliases,
) -> Result<ReportOutcome, PivotError> {
    if table.is_empty() {
        return Ok(ReportOutcome::notice(None, Notice::EmptySource));
    }

    let columns = resolve(&table.headers, aliases)?;
    let records = Record::all(&table.rows, &columns);
    let spec = FilterSpec::from_controls(controls);

    let resolved = match spec.day {
        DaySelection::Explicit(day) => ResolvedDay::explicit(day),
        DaySelection::Auto => {
            let day = latest_day(&records).and_then(|ms| DayWindow::from_start_ms(ms).day());
            match day {
                Some(day) => ResolvedDay::auto(day),
                None => return Ok(ReportOutcome::notice(None, Notice::NoValidDate)),
            }
        }
    };
    tracing::debug!(day = %resolved.iso(), auto = resolved.auto, "Resolved report day");

    let kept = filter(&records, &resolved.window, spec.hour, spec.shift.as_deref());
    tracing::debug!(
        total = records.len(),
        kept = kept.len(),
        hour = ?spec.hour,
        shift = ?spec.shift,
        "Filtered records"
    );
    if kept.is_empty() {
        return Ok(ReportOutcome::notice(Some(resolved), Notice::FilterEmpty));
    }

    let partitions = group_and_sort(&kept);
    for (category, count) in partitions.counts() {
        tracing::debug!(%category, count, "Category rows");
    }
    if partitions.max_len() == 0 {
        return Ok(ReportOutcome::notice(Some(resolved), Notice::NothingToRender));
    }

    let grid = build_grid(&partitions, &TaskCategory::ALL);
    Ok(ReportOutcome {
        resolved_day: Some(resolved),
        body: ReportBody::Grid(grid),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hourperf_core::{block, Cell, Role, SchemaError};
    use pretty_assertions::assert_eq;

    const HEADERS: [&str; 9] = [
        "full_name",
        "hour",
        "quantity",
        "occupied_hours",
        "performance_without_rotation",
        "performance_with_rotation",
        "task_type",
        "date",
        "Shift",
    ];

    fn table(rows: &[[&str; 9]]) -> SourceTable {
        let mut all = vec![HEADERS.map(String::from).to_vec()];
        all.extend(rows.iter().map(|r| r.map(String::from).to_vec()));
        SourceTable::from_rows(all)
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn run(table: &SourceTable, controls: &ControlValues) -> ReportOutcome {
        build_report(table, controls, &ColumnAliases::default()).unwrap()
    }

    #[test]
    fn auto_day_picks_latest() {
        let t = table(&[
            ["a", "9", "1", "45", "0.5", "0.5", "Pick", "2024-05-01", "Shift1"],
            ["b", "9", "1", "45", "0.5", "0.5", "Pick", "2024-05-02", "Shift1"],
            ["c", "9", "1", "45", "0.5", "0.5", "Pick", "junk", "Shift1"],
        ]);
        let outcome = run(&t, &ControlValues::new());
        let resolved = outcome.resolved_day.unwrap();
        assert_eq!(resolved.day, day(2024, 5, 2));
        assert!(resolved.auto);
        assert_eq!(outcome.day_to_persist(), Some(day(2024, 5, 2)));

        let grid = outcome.grid().unwrap();
        assert_eq!(grid.row_count(), 1);
        let pick = ReportGrid::block_start(5);
        assert_eq!(grid.rows[0][pick + block::FULL_NAME], Cell::Text("b".into()));
    }

    #[test]
    fn explicit_day_is_not_persisted() {
        let t = table(&[["a", "9", "1", "45", "0.5", "0.5", "Pick", "45413", "Shift1"]]);
        let outcome = run(&t, &ControlValues::new().day("2024-05-01"));
        assert_eq!(outcome.resolved_day.unwrap().iso(), "2024-05-01");
        assert_eq!(outcome.day_to_persist(), None);
        assert!(outcome.grid().is_some());
    }

    #[test]
    fn short_year_day_control_falls_back_to_auto() {
        let t = table(&[["a", "9", "1", "45", "0.5", "0.5", "Pick", "2024-05-01", "Shift1"]]);
        let outcome = run(&t, &ControlValues::new().day("01/05/24"));
        let resolved = outcome.resolved_day.unwrap();
        assert_eq!(resolved.day, day(2024, 5, 1));
        assert!(resolved.auto);
        assert_eq!(outcome.day_to_persist(), Some(day(2024, 5, 1)));
        assert_eq!(outcome.grid().unwrap().row_count(), 1);
    }

    #[test]
    fn hour_and_shift_narrow_the_grid() {
        let t = table(&[
            ["a", "9", "1", "45", "0.5", "0.5", "Pick", "2024-05-01", "Shift1"],
            ["b", "10", "1", "45", "0.5", "0.5", "Pick", "2024-05-01", "Shift1"],
            ["c", "9", "1", "45", "0.5", "0.5", "Sort", "2024-05-01", "Shift2"],
        ]);
        let outcome = run(&t, &ControlValues::new().hour("9").shift("Shift1"));
        let grid = outcome.grid().unwrap();
        assert_eq!(grid.row_count(), 1);
        assert_eq!(grid.populated_rows(TaskCategory::Pick), 1);
        assert_eq!(grid.populated_rows(TaskCategory::Sort), 0);
    }

    #[test]
    fn header_only_source_is_empty_even_without_columns() {
        let t = SourceTable::from_rows(vec![vec!["whatever".to_string()]]);
        let outcome = run(&t, &ControlValues::new());
        assert_eq!(outcome.as_notice(), Some(Notice::EmptySource));
        assert_eq!(outcome.resolved_day, None);
    }

    #[test]
    fn missing_columns_are_an_error() {
        let t = SourceTable::from_rows(vec![
            vec!["full_name".to_string(), "hour".to_string()],
            vec!["a".to_string(), "9".to_string()],
        ]);
        let err = build_report(&t, &ControlValues::new(), &ColumnAliases::default()).unwrap_err();
        match err {
            PivotError::Schema(SchemaError::MissingColumns(roles)) => {
                assert_eq!(roles.len(), 7);
                assert!(!roles.contains(&Role::Hour));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn no_valid_date_notice() {
        let t = table(&[["a", "9", "1", "45", "0.5", "0.5", "Pick", "", "Shift1"]]);
        let outcome = run(&t, &ControlValues::new());
        assert_eq!(outcome.as_notice(), Some(Notice::NoValidDate));
        assert_eq!(outcome.day_to_persist(), None);
    }

    #[test]
    fn filter_empty_keeps_resolved_day() {
        let t = table(&[["a", "9", "1", "45", "0.5", "0.5", "Pick", "2024-05-01", "Shift1"]]);
        let outcome = run(&t, &ControlValues::new().shift("Flex"));
        assert_eq!(outcome.as_notice(), Some(Notice::FilterEmpty));
        assert_eq!(outcome.day_to_persist(), Some(day(2024, 5, 1)));
    }

    #[test]
    fn unknown_categories_leave_nothing_to_render() {
        let t = table(&[["a", "9", "1", "45", "0.5", "0.5", "Packing", "2024-05-01", "Shift1"]]);
        let outcome = run(&t, &ControlValues::new());
        assert_eq!(outcome.as_notice(), Some(Notice::NothingToRender));
    }

    #[test]
    fn notice_messages() {
        assert_eq!(Notice::EmptySource.to_string(), "Source data is empty.");
        assert_eq!(
            Notice::FilterEmpty.to_string(),
            "Filter result is empty (check date/hour/shift)."
        );
    }
}
