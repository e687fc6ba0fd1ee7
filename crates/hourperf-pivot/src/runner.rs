//! Store-driven report run
//!
//! A run is read, then resolve, then write. Nothing is written before the
//! pipeline has finished, so a schema error leaves the target untouched.

use chrono::NaiveDate;
use hourperf_core::{ReportStore, TaskCategory};
use serde::Serialize;

use crate::columns::ColumnAliases;
use crate::pipeline::{build_report, Notice, ReportBody};
use crate::styling::report_formats;
use crate::PivotError;

/// What a run wrote
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RunSummary {
    /// Day the report covers, if one resolved
    pub day: Option<NaiveDate>,
    /// Whether the day was written back to the day control
    pub day_persisted: bool,
    pub notice: Option<Notice>,
    pub rows: usize,
    pub columns: usize,
    /// Populated rows per category, empty for notices
    pub categories: Vec<(TaskCategory, usize)>,
}

/// Run the report against `store`
pub fn run_report<S>(store: &mut S, aliases: &ColumnAliases) -> Result<RunSummary, PivotError>
where
    S: ReportStore + ?Sized,
{
    let span = tracing::info_span!("run_report");
    let _guard = span.enter();

    let table = store.read_source()?;
    let controls = store.read_controls()?;
    tracing::debug!(rows = table.rows.len(), ?controls, "Read source");

    let outcome = build_report(&table, &controls, aliases)?;

    let persisted = outcome.day_to_persist();
    if let Some(day) = persisted {
        store.persist_day(day)?;
        tracing::info!(%day, "Auto-resolved day written back");
    }

    let mut summary = RunSummary {
        day: outcome.resolved_day.map(|d| d.day),
        day_persisted: persisted.is_some(),
        notice: None,
        rows: 0,
        columns: 0,
        categories: Vec::new(),
    };

    match &outcome.body {
        ReportBody::Notice(notice) => {
            store.write_notice(notice.message())?;
            tracing::info!(%notice, "Report replaced by notice");
            summary.notice = Some(*notice);
        }
        ReportBody::Grid(grid) => {
            store.clear_report()?;
            store.write_header(&grid.header)?;
            store.write_rows(&grid.rows)?;
            store.apply_formats(&report_formats(grid))?;
            tracing::info!(rows = grid.row_count(), columns = grid.width(), "Report written");

            summary.rows = grid.row_count();
            summary.columns = grid.width();
            summary.categories = grid
                .categories
                .iter()
                .map(|c| (*c, grid.populated_rows(*c)))
                .collect();
        }
    }

    Ok(summary)
}
