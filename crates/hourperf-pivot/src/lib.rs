//! # hourperf-pivot
//!
//! Transformation pipeline turning flat work-event rows into the pivoted
//! hourly performance grid.
//!
//! This crate provides:
//! - Column discovery by header aliases (`columns`)
//! - Day/hour/shift filtering with auto-day derivation (`filter`)
//! - Per-category grouping and hour-descending sort (`group`)
//! - Fixed-width grid layout (`layout`) and its styling batch (`styling`)
//! - The pure `build_report` pipeline and the store-driven `run_report`
//!
//! ## Example
//!
//! ```rust
//! use hourperf_core::ControlValues;
//! use hourperf_pivot::{build_report, ColumnAliases, SourceTable};
//!
//! let table = SourceTable::from_rows(vec![
//!     ["full_name", "hour", "quantity", "occupied_hours", "performance_without_rotation",
//!      "performance_with_rotation", "task_type", "date", "Shift"]
//!         .map(String::from).to_vec(),
//!     ["Sara", "9", "120", "45", "60.9%", "131.5%", "Pick", "2024-05-01", "Shift1"]
//!         .map(String::from).to_vec(),
//! ]);
//!
//! let outcome = build_report(&table, &ControlValues::new(), &ColumnAliases::default()).unwrap();
//! let grid = outcome.grid().unwrap();
//! assert_eq!(grid.width(), 79);
//! assert_eq!(outcome.resolved_day.unwrap().iso(), "2024-05-01");
//! ```

pub mod columns;
pub mod filter;
pub mod group;
pub mod layout;
pub mod pipeline;
pub mod runner;
pub mod styling;

pub use columns::{resolve, ColumnAliases, ColumnMap, Record};
pub use filter::{filter, latest_day, DaySelection, FilterSpec};
pub use group::{group_and_sort, Partitions};
pub use hourperf_core::SourceTable;
pub use layout::{build_grid, header_row};
pub use pipeline::{build_report, Notice, ReportBody, ReportOutcome, ResolvedDay};
pub use runner::{run_report, RunSummary};
pub use styling::report_formats;

use hourperf_core::{SchemaError, StoreError};
use thiserror::Error;

/// Pipeline error
///
/// Empty inputs are not errors: they end in a [`Notice`].
#[derive(Debug, Error)]
pub enum PivotError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
