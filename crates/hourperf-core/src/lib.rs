//! # hourperf-core
//!
//! Core domain model and traits for the hourperf pivot report.
//!
//! This crate provides:
//! - Domain types: `Role`, `TaskCategory`, `MetricRow`, `ReportGrid`, `Cell`
//! - Store boundary: `SourceTable`, `ControlValues`, `FormatRequest`, `ReportStore`
//! - Locale-tolerant value parsing (`normalize`) and day resolution (`date`)
//! - Error types
//!
//! ## Example
//!
//! ```rust
//! use hourperf_core::{MetricRow, TaskCategory};
//!
//! let row = MetricRow::new("Sara", Some(9), 120.0, 45.0, 0.609, 1.315);
//! assert_eq!(row.negative_minutes, 15);
//! assert_eq!(TaskCategory::from_label(" Pick "), Some(TaskCategory::Pick));
//! ```

pub mod date;
pub mod memory;
pub mod normalize;

pub use date::{day_end, day_start, resolve_date, DayWindow};
pub use memory::MemoryStore;
pub use normalize::{parse_hour, parse_number, parse_percentage};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Semantic Columns
// ============================================================================

/// Semantic role of a source column
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    FullName,
    Hour,
    Quantity,
    OccupiedHours,
    PerformanceWithoutRotation,
    PerformanceWithRotation,
    TaskType,
    Date,
    Shift,
}

impl Role {
    /// Every role the report needs, in resolution order
    pub const ALL: [Role; 9] = [
        Role::FullName,
        Role::Hour,
        Role::Quantity,
        Role::OccupiedHours,
        Role::PerformanceWithoutRotation,
        Role::PerformanceWithRotation,
        Role::TaskType,
        Role::Date,
        Role::Shift,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::FullName => "full_name",
            Role::Hour => "hour",
            Role::Quantity => "quantity",
            Role::OccupiedHours => "occupied_hours",
            Role::PerformanceWithoutRotation => "performance_without_rotation",
            Role::PerformanceWithRotation => "performance_with_rotation",
            Role::TaskType => "task_type",
            Role::Date => "date",
            Role::Shift => "shift",
        }
    }

    /// Position of this role in [`Role::ALL`]
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

// ============================================================================
// Task Categories
// ============================================================================

/// Work type the report is pivoted by
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TaskCategory {
    Receive,
    Locate,
    Sort,
    #[serde(rename = "Pack_Multi")]
    PackMulti,
    #[serde(rename = "Pack_Single")]
    PackSingle,
    Pick,
    Presort,
    #[serde(rename = "Stock taking")]
    StockTaking,
    #[serde(rename = "Pick_Larg")]
    PickLarge,
    #[serde(rename = "Presort_Larg")]
    PresortLarge,
}

impl TaskCategory {
    /// Block order of the report, left to right
    pub const ALL: [TaskCategory; 10] = [
        TaskCategory::Receive,
        TaskCategory::Locate,
        TaskCategory::Sort,
        TaskCategory::PackMulti,
        TaskCategory::PackSingle,
        TaskCategory::Pick,
        TaskCategory::Presort,
        TaskCategory::StockTaking,
        TaskCategory::PickLarge,
        TaskCategory::PresortLarge,
    ];

    /// Label as it appears in the `task_type` column
    pub fn label(&self) -> &'static str {
        match self {
            TaskCategory::Receive => "Receive",
            TaskCategory::Locate => "Locate",
            TaskCategory::Sort => "Sort",
            TaskCategory::PackMulti => "Pack_Multi",
            TaskCategory::PackSingle => "Pack_Single",
            TaskCategory::Pick => "Pick",
            TaskCategory::Presort => "Presort",
            TaskCategory::StockTaking => "Stock taking",
            TaskCategory::PickLarge => "Pick_Larg",
            TaskCategory::PresortLarge => "Presort_Larg",
        }
    }

    /// Match a raw `task_type` cell. Surrounding whitespace is ignored, case is not.
    pub fn from_label(text: &str) -> Option<Self> {
        let text = text.trim();
        Self::ALL.into_iter().find(|c| c.label() == text)
    }
}

impl std::fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.label())
    }
}

// ============================================================================
// Report Model
// ============================================================================

/// Number of metric columns in one category block
pub const BLOCK_WIDTH: usize = 7;

/// Metric suffixes of a block, in column order
pub const METRIC_SUFFIXES: [&str; BLOCK_WIDTH] = [
    "full_name",
    "hour",
    "quantity",
    "occupied_hours",
    "Negative_Minutes",
    "performance_without_rotation",
    "performance_with_rotation",
];

/// Column offsets inside a block
pub mod block {
    pub const FULL_NAME: usize = 0;
    pub const HOUR: usize = 1;
    pub const QUANTITY: usize = 2;
    pub const OCCUPIED_HOURS: usize = 3;
    pub const NEGATIVE_MINUTES: usize = 4;
    pub const PERFORMANCE_WITHOUT_ROTATION: usize = 5;
    pub const PERFORMANCE_WITH_ROTATION: usize = 6;
}

/// Minutes in an hour the occupancy is measured against
pub const MINUTES_PER_HOUR: f64 = 60.0;

/// Shortfall of occupied minutes below a full hour, truncated toward zero
pub fn negative_minutes(occupied_hours: f64) -> i64 {
    (MINUTES_PER_HOUR - occupied_hours).max(0.0) as i64
}

/// Width of a grid holding `categories` blocks plus their separators
pub fn grid_width(categories: usize) -> usize {
    if categories == 0 {
        0
    } else {
        BLOCK_WIDTH * categories + (categories - 1)
    }
}

/// Per-record metrics shown in a category block
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetricRow {
    pub full_name: String,
    /// `None` when the source hour is empty or unparsable
    pub hour: Option<i64>,
    pub quantity: f64,
    /// Minutes occupied within the hour (0-60 expected, not clamped)
    pub occupied_hours: f64,
    pub negative_minutes: i64,
    /// Fraction, 1.0 = 100%
    pub performance_without_rotation: f64,
    /// Fraction, 1.0 = 100%
    pub performance_with_rotation: f64,
}

impl MetricRow {
    pub fn new(
        full_name: impl Into<String>,
        hour: Option<i64>,
        quantity: f64,
        occupied_hours: f64,
        performance_without_rotation: f64,
        performance_with_rotation: f64,
    ) -> Self {
        Self {
            full_name: full_name.into(),
            hour,
            quantity,
            occupied_hours,
            negative_minutes: negative_minutes(occupied_hours),
            performance_without_rotation,
            performance_with_rotation,
        }
    }

    /// Sort key: missing hours sink below every real hour
    pub fn hour_key(&self) -> i64 {
        self.hour.unwrap_or(-9999)
    }

    /// The seven cells of this row, in block column order
    pub fn cells(&self) -> [Cell; BLOCK_WIDTH] {
        [
            Cell::Text(self.full_name.clone()),
            self.hour.map_or(Cell::Blank, Cell::Integer),
            Cell::Number(self.quantity),
            Cell::Number(self.occupied_hours),
            Cell::Integer(self.negative_minutes),
            Cell::Number(self.performance_without_rotation),
            Cell::Number(self.performance_with_rotation),
        ]
    }
}

/// A single output cell
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    #[default]
    Blank,
    Integer(i64),
    Number(f64),
    Text(String),
}

impl Cell {
    pub fn is_blank(&self) -> bool {
        matches!(self, Cell::Blank)
    }

    /// Plain-text rendering, blank cells become empty strings
    pub fn display(&self) -> String {
        match self {
            Cell::Blank => String::new(),
            Cell::Integer(v) => v.to_string(),
            Cell::Number(v) => v.to_string(),
            Cell::Text(s) => s.clone(),
        }
    }
}

/// The pivoted report: one header row and a rectangular body
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReportGrid {
    /// Categories in block order
    pub categories: Vec<TaskCategory>,
    /// Block labels, separators are empty strings
    pub header: Vec<String>,
    /// Data rows, each exactly `header.len()` cells wide
    pub rows: Vec<Vec<Cell>>,
}

impl ReportGrid {
    pub fn width(&self) -> usize {
        self.header.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// First column of the block at `index`
    pub fn block_start(index: usize) -> usize {
        index * (BLOCK_WIDTH + 1)
    }

    /// Column indices of the blank separators
    pub fn separator_columns(&self) -> Vec<usize> {
        (1..self.categories.len())
            .map(|i| Self::block_start(i) - 1)
            .collect()
    }

    /// Rows populated for `category` (leading non-blank name cells)
    pub fn populated_rows(&self, category: TaskCategory) -> usize {
        let Some(index) = self.categories.iter().position(|c| *c == category) else {
            return 0;
        };
        let col = Self::block_start(index) + block::FULL_NAME;
        self.rows
            .iter()
            .take_while(|row| row.get(col).is_some_and(|c| !c.is_blank()))
            .count()
    }
}

// ============================================================================
// Store Boundary
// ============================================================================

/// Source rows as read from the store: header row plus data rows
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SourceTable {
    /// Split raw rows into header and data; the first row is the header
    pub fn from_rows(mut rows: Vec<Vec<String>>) -> Self {
        if rows.is_empty() {
            return Self::default();
        }
        let headers = rows.remove(0);
        Self { headers, rows }
    }

    /// True when there is no data row to report on
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Raw control cell values; `None` means the cell was empty
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlValues {
    pub day: Option<String>,
    pub hour: Option<String>,
    pub shift: Option<String>,
}

impl ControlValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn day(mut self, day: impl Into<String>) -> Self {
        self.day = non_empty(day.into());
        self
    }

    pub fn hour(mut self, hour: impl Into<String>) -> Self {
        self.hour = non_empty(hour.into());
        self
    }

    pub fn shift(mut self, shift: impl Into<String>) -> Self {
        self.shift = non_empty(shift.into());
        self
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Zero-based cell address in the target sheet
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellRef {
    pub row: u32,
    pub col: u16,
}

impl CellRef {
    pub const fn new(row: u32, col: u16) -> Self {
        Self { row, col }
    }

    /// A1-style address, e.g. `B1`
    pub fn to_a1(&self) -> String {
        format!("{}{}", column_letters(self.col), self.row + 1)
    }
}

/// Spreadsheet column letters for a zero-based column (0 = `A`, 26 = `AA`)
pub fn column_letters(col: u16) -> String {
    let mut letters = Vec::new();
    let mut n = u32::from(col) + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(char::from(b'A' + rem as u8));
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Inclusive rectangular cell range
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRange {
    pub first_row: u32,
    pub first_col: u16,
    pub last_row: u32,
    pub last_col: u16,
}

impl CellRange {
    pub const fn new(first_row: u32, first_col: u16, last_row: u32, last_col: u16) -> Self {
        Self {
            first_row,
            first_col,
            last_row,
            last_col,
        }
    }

    pub const fn cell(cell: CellRef) -> Self {
        Self::new(cell.row, cell.col, cell.row, cell.col)
    }

    pub fn contains(&self, cell: CellRef) -> bool {
        (self.first_row..=self.last_row).contains(&cell.row)
            && (self.first_col..=self.last_col).contains(&cell.col)
    }
}

/// Fixed positions of the report sheet
pub struct SheetLayout;

impl SheetLayout {
    /// Target day control (`B1`)
    pub const DAY_CONTROL: CellRef = CellRef::new(0, 1);
    /// Label next to the hour control (`E1`)
    pub const HOUR_LABEL: CellRef = CellRef::new(0, 4);
    /// Target hour control (`F1`)
    pub const HOUR_CONTROL: CellRef = CellRef::new(0, 5);
    /// Label next to the shift control (`I1`)
    pub const SHIFT_LABEL: CellRef = CellRef::new(0, 8);
    /// Target shift control (`J1`)
    pub const SHIFT_CONTROL: CellRef = CellRef::new(0, 9);
    /// Header row of the report (`A3`)
    pub const HEADER_ROW: u32 = 2;
    /// First data row of the report (`A4`)
    pub const FIRST_DATA_ROW: u32 = 3;
    /// Where notices replace the report (`A4`)
    pub const NOTICE: CellRef = CellRef::new(3, 0);
}

/// Cell number format
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberPattern {
    /// `0`
    Integer,
    /// `0.00%`
    Percent,
}

impl NumberPattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            NumberPattern::Integer => "0",
            NumberPattern::Percent => "0.00%",
        }
    }
}

/// Opaque styling and validation command for the target region
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FormatRequest {
    /// Dropdown of allowed values; non-strict lists accept other input with a warning
    ListValidation {
        range: CellRange,
        values: Vec<String>,
        strict: bool,
    },
    /// Bold, centered, filled header cells
    HeaderStyle { range: CellRange, background: u32 },
    NumberFormat {
        range: CellRange,
        pattern: NumberPattern,
    },
    Background { range: CellRange, color: u32 },
    /// Static caption written into a cell
    Label { cell: CellRef, text: String },
}

/// External spreadsheet store the report is read from and written to
///
/// Implementations do their own I/O; the pivot pipeline only calls these
/// methods and never holds state between runs.
pub trait ReportStore {
    /// Read the source table (first row = headers)
    fn read_source(&self) -> Result<SourceTable, StoreError>;

    /// Read the day, hour and shift control cells
    fn read_controls(&self) -> Result<ControlValues, StoreError>;

    /// Write an auto-resolved day back to the day control
    fn persist_day(&mut self, day: NaiveDate) -> Result<(), StoreError>;

    /// Remove everything from the header row down
    fn clear_report(&mut self) -> Result<(), StoreError>;

    fn write_header(&mut self, header: &[String]) -> Result<(), StoreError>;

    fn write_rows(&mut self, rows: &[Vec<Cell>]) -> Result<(), StoreError>;

    /// Write a human-readable notice in place of the report
    fn write_notice(&mut self, notice: &str) -> Result<(), StoreError>;

    fn apply_formats(&mut self, requests: &[FormatRequest]) -> Result<(), StoreError>;
}

/// Grid output rendering
pub trait GridRenderer {
    type Output;

    fn render(&self, grid: &ReportGrid) -> Result<Self::Output, RenderError>;
}

// ============================================================================
// Errors
// ============================================================================

/// Source table does not carry the required columns
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("Required columns not found: {}", join_roles(.0))]
    MissingColumns(Vec<Role>),
}

fn join_roles(roles: &[Role]) -> String {
    roles
        .iter()
        .map(|r| r.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Store I/O error
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Read error: {0}")]
    Read(String),

    #[error("Write error: {0}")]
    Write(String),
}

/// Rendering error
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

// ============================================================================
// Tests
// ============================================================================
