//! Day, hour and shift filtering

use chrono::NaiveDate;
use hourperf_core::{parse_hour, resolve_date, ControlValues, DayWindow};
use serde::{Deserialize, Serialize};

use crate::columns::Record;

/// Which day the report covers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DaySelection {
    Explicit(NaiveDate),
    /// Latest day present in the source data
    Auto,
}

/// Filter predicates built from the control cells
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub day: DaySelection,
    pub hour: Option<i64>,
    pub shift: Option<String>,
}

impl FilterSpec {
    /// An unresolvable day control falls back to `Auto`; a blank shift means no filter.
    pub fn from_controls(controls: &ControlValues) -> Self {
        let day = controls
            .day
            .as_deref()
            .and_then(resolve_date)
            .map_or(DaySelection::Auto, DaySelection::Explicit);
        let hour = controls.hour.as_deref().and_then(parse_hour);
        let shift = controls
            .shift
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        Self { day, hour, shift }
    }
}

/// Keep records inside `window` that match the optional hour and shift
///
/// Records whose date does not resolve are dropped silently.
pub fn filter<'a>(
    records: &[Record<'a>],
    window: &DayWindow,
    hour: Option<i64>,
    shift: Option<&str>,
) -> Vec<Record<'a>> {
    records
        .iter()
        .filter(|record| matches(record, window, hour, shift))
        .copied()
        .collect()
}

fn matches(record: &Record<'_>, window: &DayWindow, hour: Option<i64>, shift: Option<&str>) -> bool {
    let in_window = record.day_start().is_some_and(|ms| window.contains(ms));
    in_window
        && hour.map_or(true, |h| record.hour() == Some(h))
        && shift.map_or(true, |s| record.shift() == s)
}

/// Latest parseable day start across all records
pub fn latest_day(records: &[Record<'_>]) -> Option<i64> {
    records.iter().filter_map(Record::day_start).max()
}
