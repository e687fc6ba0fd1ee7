//! Delimited-text source reader
//!
//! Reads an exported sheet (CSV or TSV) into a [`SourceTable`]. The first
//! record is the header row; ragged rows are padded to the header width.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use hourperf_core::{SourceTable, StoreError};

const BOM: char = '\u{FEFF}';

/// Source table stored in a CSV or TSV file
#[derive(Clone, Debug)]
pub struct CsvSource {
    path: PathBuf,
    delimiter: u8,
}

impl CsvSource {
    /// Delimiter is a tab for `.tsv` and `.tab` files, a comma otherwise
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let delimiter = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("tsv") || ext.eq_ignore_ascii_case("tab") => b'\t',
            _ => b',',
        };
        Self { path, delimiter }
    }

    /// Override the detected delimiter
    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read_table(&self) -> Result<SourceTable, StoreError> {
        let file = File::open(&self.path)?;
        let table = read_table(file, self.delimiter)
            .map_err(|e| StoreError::Read(format!("{}: {e}", self.path.display())))?;
        tracing::debug!(
            path = %self.path.display(),
            columns = table.headers.len(),
            rows = table.rows.len(),
            "Source loaded"
        );
        Ok(table)
    }
}

/// Parse delimited text into a table
///
/// Fields that are not valid UTF-8 are decoded lossily.
pub fn read_table<R: Read>(reader: R, delimiter: u8) -> Result<SourceTable, StoreError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in reader.byte_records() {
        let record = record.map_err(|e| StoreError::Read(e.to_string()))?;
        rows.push(
            record
                .iter()
                .map(|field| String::from_utf8_lossy(field).into_owned())
                .collect(),
        );
    }

    if let Some(first) = rows.first_mut().and_then(|r| r.first_mut()) {
        if let Some(stripped) = first.strip_prefix(BOM) {
            *first = stripped.to_string();
        }
    }

    let mut table = SourceTable::from_rows(rows);
    let width = table.headers.len();
    for row in &mut table.rows {
        if row.len() < width {
            row.resize(width, String::new());
        }
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn reads_header_and_pads_short_rows() {
        let data = "full_name,hour,date\nSara,9,2024-05-01\nReza,10\n";
        let table = read_table(data.as_bytes(), b',').unwrap();
        assert_eq!(table.headers, ["full_name", "hour", "date"]);
        assert_eq!(table.rows[0], ["Sara", "9", "2024-05-01"]);
        assert_eq!(table.rows[1], ["Reza", "10", ""]);
    }

    #[test]
    fn strips_byte_order_mark() {
        let data = "\u{FEFF}full_name\tShift\nSara\tShift1\n";
        let table = read_table(data.as_bytes(), b'\t').unwrap();
        assert_eq!(table.headers, ["full_name", "Shift"]);
    }

    #[test]
    fn quoted_fields_keep_separators() {
        let data = "quantity,occupied_hours\n\"1,5\",\"45,0\"\n";
        let table = read_table(data.as_bytes(), b',').unwrap();
        assert_eq!(table.rows[0], ["1,5", "45,0"]);
    }

    #[test]
    fn invalid_utf8_field_degrades() {
        let mut data = b"full_name,hour\nSara,9\n".to_vec();
        data.extend_from_slice(b"R\xFFza,10\n");
        let table = read_table(data.as_slice(), b',').unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0], ["Sara", "9"]);
        assert_eq!(table.rows[1], ["R\u{FFFD}za", "10"]);
    }

    #[test]
    fn empty_input_is_empty_table() {
        let table = read_table("".as_bytes(), b',').unwrap();
        assert!(table.is_empty());
        assert!(table.headers.is_empty());
    }

    #[test]
    fn delimiter_from_extension() {
        assert_eq!(CsvSource::new("events.tsv").delimiter, b'\t');
        assert_eq!(CsvSource::new("events.TSV").delimiter, b'\t');
        assert_eq!(CsvSource::new("events.csv").delimiter, b',');
        assert_eq!(CsvSource::new("events").delimiter(b';').delimiter, b';');
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = CsvSource::new("/nonexistent/events.csv").read_table().unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
    }
}
