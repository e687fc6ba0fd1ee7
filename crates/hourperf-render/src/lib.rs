//! # hourperf-render
//!
//! Stores and renderers around the hourperf pivot grid.
//!
//! This crate provides:
//! - `CsvSource`: the source table read from a CSV or TSV export
//! - `WorkbookStore`: a `ReportStore` saved as an XLSX workbook
//! - `TextRenderer`: aligned plain-text table for terminals
//! - `CsvRenderer`: the grid as CSV
//!
//! ## Example
//!
//! ```rust,ignore
//! use hourperf_core::{ControlValues, GridRenderer};
//! use hourperf_pivot::{run_report, ColumnAliases};
//! use hourperf_render::{CsvSource, TextRenderer, WorkbookStore};
//!
//! let table = CsvSource::new("events.csv").read_table()?;
//! let mut store = WorkbookStore::new(table, &ControlValues::new().shift("Shift1"));
//! let summary = run_report(&mut store, &ColumnAliases::default())?;
//! store.save("hourly_performance.xlsx")?;
//! ```

pub mod excel;
pub mod source;

pub use excel::{WorkbookStore, DEFAULT_SHEET_NAME};
pub use source::{read_table, CsvSource};

use hourperf_core::{block, Cell, GridRenderer, RenderError, ReportGrid, BLOCK_WIDTH};

/// Plain-text table renderer
#[derive(Clone, Debug, Default)]
pub struct TextRenderer {
    /// Leave out blocks without rows
    pub compact: bool,
    /// Widest a column may grow before values are cut
    pub max_column_width: Option<usize>,
}

impl TextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only show categories that have rows
    pub fn compact(mut self) -> Self {
        self.compact = true;
        self
    }

    pub fn max_column_width(mut self, width: usize) -> Self {
        self.max_column_width = Some(width);
        self
    }

    /// Columns to print, separators included
    fn visible_columns(&self, grid: &ReportGrid) -> Vec<usize> {
        let blocks: Vec<usize> = (0..grid.categories.len())
            .filter(|i| !self.compact || grid.populated_rows(grid.categories[*i]) > 0)
            .collect();
        let mut columns = Vec::new();
        for (n, index) in blocks.iter().enumerate() {
            let start = ReportGrid::block_start(*index);
            if n > 0 {
                columns.push(start - 1);
            }
            columns.extend(start..start + BLOCK_WIDTH);
        }
        columns
    }

    fn clip(&self, text: String) -> String {
        match self.max_column_width {
            Some(max) if text.chars().count() > max => text.chars().take(max).collect(),
            _ => text,
        }
    }
}

/// Human-readable value of the cell at `col`
fn cell_text(col: usize, cell: &Cell) -> String {
    let offset = col % (BLOCK_WIDTH + 1);
    match cell {
        Cell::Number(v)
            if offset == block::PERFORMANCE_WITHOUT_ROTATION
                || offset == block::PERFORMANCE_WITH_ROTATION =>
        {
            format!("{:.2}%", v * 100.0)
        }
        other => other.display(),
    }
}

impl GridRenderer for TextRenderer {
    type Output = String;

    fn render(&self, grid: &ReportGrid) -> Result<String, RenderError> {
        let columns = self.visible_columns(grid);
        if columns.is_empty() {
            return Ok(String::new());
        }

        let mut table: Vec<Vec<String>> = Vec::with_capacity(grid.row_count() + 1);
        table.push(
            columns
                .iter()
                .map(|c| self.clip(grid.header[*c].clone()))
                .collect(),
        );
        for row in &grid.rows {
            let cells = columns
                .iter()
                .map(|c| {
                    let cell = row.get(*c).ok_or_else(|| {
                        RenderError::InvalidData(format!("row narrower than header at column {c}"))
                    })?;
                    Ok(self.clip(cell_text(*c, cell)))
                })
                .collect::<Result<Vec<_>, RenderError>>()?;
            table.push(cells);
        }

        let widths: Vec<usize> = (0..columns.len())
            .map(|i| table.iter().map(|r| r[i].chars().count()).max().unwrap_or(0))
            .collect();

        let mut output = String::new();
        for (n, row) in table.iter().enumerate() {
            let line: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(text, width)| format!("{text:<width$}"))
                .collect();
            output.push_str(line.join(" | ").trim_end());
            output.push('\n');
            if n == 0 {
                let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
                output.push_str(&rule.join("-+-"));
                output.push('\n');
            }
        }
        Ok(output)
    }
}

/// CSV renderer: header line plus one line per grid row
#[derive(Clone, Debug)]
pub struct CsvRenderer {
    pub delimiter: u8,
}

impl Default for CsvRenderer {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl CsvRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

impl GridRenderer for CsvRenderer {
    type Output = String;

    fn render(&self, grid: &ReportGrid) -> Result<String, RenderError> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(Vec::new());
        writer
            .write_record(&grid.header)
            .map_err(|e| RenderError::Format(e.to_string()))?;
        for row in &grid.rows {
            writer
                .write_record(row.iter().map(Cell::display))
                .map_err(|e| RenderError::Format(e.to_string()))?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| RenderError::Format(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| RenderError::InvalidData(e.to_string()))
    }
}
