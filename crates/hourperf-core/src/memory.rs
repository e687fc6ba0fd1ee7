//! In-memory `ReportStore`
//!
//! Holds the source rows and controls it was built with and records every
//! write, so a run can be inspected without a real spreadsheet behind it.

use chrono::NaiveDate;
use serde::Serialize;

use crate::{Cell, ControlValues, FormatRequest, ReportStore, SourceTable, StoreError};

/// Store backed by plain vectors
#[derive(Clone, Debug, Default, Serialize)]
pub struct MemoryStore {
    pub source: Vec<Vec<String>>,
    pub controls: ControlValues,
    /// Day written back by the last auto-day run
    pub persisted_day: Option<NaiveDate>,
    pub header: Option<Vec<String>>,
    pub rows: Vec<Vec<Cell>>,
    pub notice: Option<String>,
    pub formats: Vec<FormatRequest>,
    /// Number of write calls received, reads excluded
    pub writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the raw source rows (first row = headers)
    pub fn with_source(mut self, rows: Vec<Vec<String>>) -> Self {
        self.source = rows;
        self
    }

    pub fn with_controls(mut self, controls: ControlValues) -> Self {
        self.controls = controls;
        self
    }
}

impl ReportStore for MemoryStore {
    fn read_source(&self) -> Result<SourceTable, StoreError> {
        Ok(SourceTable::from_rows(self.source.clone()))
    }

    fn read_controls(&self) -> Result<ControlValues, StoreError> {
        Ok(self.controls.clone())
    }

    fn persist_day(&mut self, day: NaiveDate) -> Result<(), StoreError> {
        self.writes += 1;
        self.persisted_day = Some(day);
        self.controls.day = Some(day.format("%Y-%m-%d").to_string());
        Ok(())
    }

    fn clear_report(&mut self) -> Result<(), StoreError> {
        self.writes += 1;
        self.header = None;
        self.rows.clear();
        self.notice = None;
        self.formats.clear();
        Ok(())
    }

    fn write_header(&mut self, header: &[String]) -> Result<(), StoreError> {
        self.writes += 1;
        self.header = Some(header.to_vec());
        Ok(())
    }

    fn write_rows(&mut self, rows: &[Vec<Cell>]) -> Result<(), StoreError> {
        self.writes += 1;
        self.rows = rows.to_vec();
        Ok(())
    }

    fn write_notice(&mut self, notice: &str) -> Result<(), StoreError> {
        self.writes += 1;
        self.notice = Some(notice.to_string());
        Ok(())
    }

    fn apply_formats(&mut self, requests: &[FormatRequest]) -> Result<(), StoreError> {
        self.writes += 1;
        self.formats.extend_from_slice(requests);
        Ok(())
    }
}
