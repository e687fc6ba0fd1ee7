//! XLSX workbook target
//!
//! `WorkbookStore` is a [`ReportStore`] that keeps the report sheet as a
//! sparse cell map and serializes it with `rust_xlsxwriter` on demand.
//!
//! ## Sheet Layout
//!
//! ```text
//!   |     A      |     B      | .. |  E   |  F   | .. |   I   |   J    |
//! 1 |            | 2024-05-01 |    | Hour | 9    |    | Shift | Shift1 |
//! 2 |            |            |    |      |      |    |       |        |
//! 3 | Receive_full_name | Receive_hour | ...                (header)   |
//! 4 | data rows or a notice                                            |
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use chrono::NaiveDate;
use hourperf_core::{
    Cell, CellRange, CellRef, ControlValues, FormatRequest, RenderError, ReportStore, SheetLayout,
    SourceTable, StoreError,
};
use rust_xlsxwriter::{
    DataValidation, DataValidationErrorStyle, Format, FormatAlign, Workbook, Worksheet,
};

/// Default name of the report sheet
pub const DEFAULT_SHEET_NAME: &str = "Hourly_Performance";

/// Workbook-backed report store
#[derive(Clone, Debug)]
pub struct WorkbookStore {
    source: SourceTable,
    sheet_name: String,
    cells: BTreeMap<CellRef, Cell>,
    formats: Vec<FormatRequest>,
    /// Width applied to the name column of every block
    pub name_column_width: f64,
}

impl WorkbookStore {
    /// Build a store over `source` with the control cells pre-filled
    pub fn new(source: SourceTable, controls: &ControlValues) -> Self {
        let mut store = Self {
            source,
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            cells: BTreeMap::new(),
            formats: Vec::new(),
            name_column_width: 18.0,
        };
        for (cell, value) in [
            (SheetLayout::DAY_CONTROL, &controls.day),
            (SheetLayout::HOUR_CONTROL, &controls.hour),
            (SheetLayout::SHIFT_CONTROL, &controls.shift),
        ] {
            if let Some(value) = value {
                store.cells.insert(cell, Cell::Text(value.clone()));
            }
        }
        store
    }

    /// Set the report sheet name
    pub fn sheet_name(mut self, name: impl Into<String>) -> Self {
        self.sheet_name = name.into();
        self
    }

    pub fn cell(&self, cell: CellRef) -> Option<&Cell> {
        self.cells.get(&cell)
    }

    /// Format requests applied since the last clear
    pub fn formats(&self) -> &[FormatRequest] {
        &self.formats
    }

    fn control(&self, cell: CellRef) -> Option<String> {
        match self.cells.get(&cell) {
            Some(Cell::Blank) | None => None,
            Some(value) => Some(value.display()).filter(|v| !v.trim().is_empty()),
        }
    }

    /// Serialize the sheet to XLSX bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, RenderError> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet
            .set_name(&self.sheet_name)
            .map_err(|e| RenderError::Format(e.to_string()))?;

        self.write_cells(sheet)?;
        self.add_validations(sheet)?;

        for col in self.name_columns() {
            sheet.set_column_width(col, self.name_column_width).ok();
        }
        sheet
            .set_freeze_panes(SheetLayout::FIRST_DATA_ROW, 0)
            .map_err(|e| RenderError::Format(e.to_string()))?;

        workbook
            .save_to_buffer()
            .map_err(|e| RenderError::Format(format!("Failed to create Excel: {e}")))
    }

    /// Write the workbook to `path`
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), RenderError> {
        let bytes = self.to_bytes()?;
        std::fs::write(path.as_ref(), bytes)?;
        tracing::info!(path = %path.as_ref().display(), sheet = %self.sheet_name, "Workbook saved");
        Ok(())
    }

    /// Every address that needs a write: populated cells plus styled blanks
    fn addresses(&self) -> BTreeSet<CellRef> {
        let mut addresses: BTreeSet<CellRef> = self.cells.keys().copied().collect();
        for request in &self.formats {
            if let FormatRequest::HeaderStyle { range, .. } | FormatRequest::Background { range, .. } =
                request
            {
                for row in range.first_row..=range.last_row {
                    for col in range.first_col..=range.last_col {
                        addresses.insert(CellRef::new(row, col));
                    }
                }
            }
        }
        addresses
    }

    /// Resolve the combined format of one cell
    fn format_for(&self, cell: CellRef) -> Option<Format> {
        let mut format: Option<Format> = None;
        for request in &self.formats {
            format = match request {
                FormatRequest::HeaderStyle { range, background } if range.contains(cell) => Some(
                    format
                        .unwrap_or_else(Format::new)
                        .set_bold()
                        .set_align(FormatAlign::Center)
                        .set_background_color(*background),
                ),
                FormatRequest::NumberFormat { range, pattern } if range.contains(cell) => {
                    Some(format.unwrap_or_else(Format::new).set_num_format(pattern.as_str()))
                }
                FormatRequest::Background { range, color } if range.contains(cell) => {
                    Some(format.unwrap_or_else(Format::new).set_background_color(*color))
                }
                _ => format,
            };
        }
        format
    }

    fn write_cells(&self, sheet: &mut Worksheet) -> Result<(), RenderError> {
        let blank = Cell::Blank;
        for address in self.addresses() {
            let value = self.cells.get(&address).unwrap_or(&blank);
            let format = self.format_for(address);
            write_cell(sheet, address, value, format.as_ref())?;
        }
        Ok(())
    }

    fn add_validations(&self, sheet: &mut Worksheet) -> Result<(), RenderError> {
        for request in &self.formats {
            if let FormatRequest::ListValidation {
                range,
                values,
                strict,
            } = request
            {
                let mut validation = DataValidation::new()
                    .allow_list_strings(values.as_slice())
                    .map_err(|e| RenderError::Format(e.to_string()))?;
                if !strict {
                    validation = validation.set_error_style(DataValidationErrorStyle::Warning);
                }
                sheet
                    .add_data_validation(
                        range.first_row,
                        range.first_col,
                        range.last_row,
                        range.last_col,
                        &validation,
                    )
                    .map_err(|e| RenderError::Format(e.to_string()))?;
            }
        }
        Ok(())
    }

    /// Name columns of the blocks covered by the header style
    fn name_columns(&self) -> Vec<u16> {
        self.formats
            .iter()
            .filter_map(|r| match r {
                FormatRequest::HeaderStyle { range, .. } => Some(*range),
                _ => None,
            })
            .flat_map(|range: CellRange| (range.first_col..=range.last_col).step_by(8))
            .collect()
    }
}

fn write_cell(
    sheet: &mut Worksheet,
    at: CellRef,
    value: &Cell,
    format: Option<&Format>,
) -> Result<(), RenderError> {
    let result = match (value, format) {
        (Cell::Text(s), Some(f)) => sheet.write_string_with_format(at.row, at.col, s, f),
        (Cell::Text(s), None) => sheet.write_string(at.row, at.col, s),
        (Cell::Integer(v), Some(f)) => sheet.write_number_with_format(at.row, at.col, *v as f64, f),
        (Cell::Integer(v), None) => sheet.write_number(at.row, at.col, *v as f64),
        (Cell::Number(v), Some(f)) => sheet.write_number_with_format(at.row, at.col, *v, f),
        (Cell::Number(v), None) => sheet.write_number(at.row, at.col, *v),
        (Cell::Blank, Some(f)) => sheet.write_blank(at.row, at.col, f),
        (Cell::Blank, None) => return Ok(()),
    };
    result
        .map(|_| ())
        .map_err(|e| RenderError::Format(format!("{}: {e}", at.to_a1())))
}

impl ReportStore for WorkbookStore {
    fn read_source(&self) -> Result<SourceTable, StoreError> {
        Ok(self.source.clone())
    }

    fn read_controls(&self) -> Result<ControlValues, StoreError> {
        Ok(ControlValues {
            day: self.control(SheetLayout::DAY_CONTROL),
            hour: self.control(SheetLayout::HOUR_CONTROL),
            shift: self.control(SheetLayout::SHIFT_CONTROL),
        })
    }

    fn persist_day(&mut self, day: NaiveDate) -> Result<(), StoreError> {
        self.cells.insert(
            SheetLayout::DAY_CONTROL,
            Cell::Text(day.format("%Y-%m-%d").to_string()),
        );
        Ok(())
    }

    fn clear_report(&mut self) -> Result<(), StoreError> {
        self.cells.retain(|cell, _| cell.row < SheetLayout::HEADER_ROW);
        self.formats.clear();
        Ok(())
    }

    fn write_header(&mut self, header: &[String]) -> Result<(), StoreError> {
        for (col, label) in header.iter().enumerate() {
            let col = column(col)?;
            if !label.is_empty() {
                self.cells
                    .insert(CellRef::new(SheetLayout::HEADER_ROW, col), Cell::Text(label.clone()));
            }
        }
        Ok(())
    }

    fn write_rows(&mut self, rows: &[Vec<Cell>]) -> Result<(), StoreError> {
        for (i, row) in rows.iter().enumerate() {
            let r = SheetLayout::FIRST_DATA_ROW
                + u32::try_from(i).map_err(|_| StoreError::Write("too many rows".into()))?;
            for (col, value) in row.iter().enumerate() {
                if !value.is_blank() {
                    self.cells.insert(CellRef::new(r, column(col)?), value.clone());
                }
            }
        }
        Ok(())
    }

    fn write_notice(&mut self, notice: &str) -> Result<(), StoreError> {
        self.cells
            .insert(SheetLayout::NOTICE, Cell::Text(notice.to_string()));
        Ok(())
    }

    fn apply_formats(&mut self, requests: &[FormatRequest]) -> Result<(), StoreError> {
        for request in requests {
            if let FormatRequest::Label { cell, text } = request {
                self.cells.insert(*cell, Cell::Text(text.clone()));
            }
        }
        self.formats.extend_from_slice(requests);
        Ok(())
    }
}

fn column(index: usize) -> Result<u16, StoreError> {
    u16::try_from(index).map_err(|_| StoreError::Write(format!("column {index} out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hourperf_core::NumberPattern;
    use pretty_assertions::assert_eq;

    fn store() -> WorkbookStore {
        WorkbookStore::new(SourceTable::default(), &ControlValues::new().hour("9"))
    }

    #[test]
    fn controls_round_trip_through_cells() {
        let mut store = store();
        let controls = store.read_controls().unwrap();
        assert_eq!(controls.day, None);
        assert_eq!(controls.hour.as_deref(), Some("9"));

        store
            .persist_day(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap())
            .unwrap();
        assert_eq!(store.read_controls().unwrap().day.as_deref(), Some("2024-05-01"));
        assert_eq!(
            store.cell(CellRef::new(0, 1)),
            Some(&Cell::Text("2024-05-01".into()))
        );
    }

    #[test]
    fn clear_keeps_control_row() {
        let mut store = store();
        store.write_header(&["a".into(), String::new(), "b".into()]).unwrap();
        store.write_rows(&[vec![Cell::Integer(1), Cell::Blank, Cell::Number(0.5)]]).unwrap();
        assert_eq!(store.cell(CellRef::new(2, 2)), Some(&Cell::Text("b".into())));
        assert_eq!(store.cell(CellRef::new(3, 1)), None);

        store.clear_report().unwrap();
        assert_eq!(store.cell(CellRef::new(2, 0)), None);
        assert_eq!(store.cell(CellRef::new(3, 0)), None);
        assert_eq!(store.cell(CellRef::new(0, 5)), Some(&Cell::Text("9".into())));
    }

    #[test]
    fn labels_become_cells() {
        let mut store = store();
        store
            .apply_formats(&[FormatRequest::Label {
                cell: SheetLayout::HOUR_LABEL,
                text: "Hour".into(),
            }])
            .unwrap();
        assert_eq!(store.cell(CellRef::new(0, 4)), Some(&Cell::Text("Hour".into())));
        assert_eq!(store.formats().len(), 1);
    }

    #[test]
    fn styled_blanks_are_addressed() {
        let mut store = store();
        store
            .apply_formats(&[FormatRequest::Background {
                range: CellRange::new(2, 7, 4, 7),
                color: 0xF0F0F0,
            }])
            .unwrap();
        let addresses = store.addresses();
        assert!(addresses.contains(&CellRef::new(3, 7)));
        assert!(addresses.contains(&CellRef::new(4, 7)));
        assert!(store.format_for(CellRef::new(3, 7)).is_some());
        assert!(store.format_for(CellRef::new(3, 6)).is_none());
    }

    #[test]
    fn number_format_only_inside_range() {
        let mut store = store();
        store
            .apply_formats(&[FormatRequest::NumberFormat {
                range: CellRange::new(3, 5, 5, 5),
                pattern: NumberPattern::Percent,
            }])
            .unwrap();
        assert!(store.format_for(CellRef::new(4, 5)).is_some());
        assert!(store.format_for(CellRef::new(2, 5)).is_none());
        assert!(store.format_for(CellRef::new(6, 5)).is_none());
    }

    #[test]
    fn serializes_to_xlsx_zip() {
        let mut store = store();
        store.write_notice("Source data is empty.").unwrap();
        let bytes = store.to_bytes().unwrap();
        // XLSX is a ZIP container
        assert_eq!(&bytes[..2], b"PK");
    }
}
