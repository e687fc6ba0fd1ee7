//! `hourperf.toml` configuration
//!
//! ```toml
//! [source]
//! path = "exports/events.csv"
//! delimiter = ";"
//!
//! [controls]
//! day = "2024-05-01"
//! hour = "9"
//! shift = "Shift1"
//!
//! [output]
//! path = "hourly_performance.xlsx"
//! sheet = "Hourly_Performance"
//!
//! [aliases]
//! full_name = ["Operator", "full_name"]
//! ```
//!
//! Every section is optional. Command-line flags win over file values.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use hourperf_core::{ControlValues, Role};
use hourperf_pivot::ColumnAliases;
use serde::Deserialize;

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "hourperf.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    pub source: SourceSection,
    pub controls: ControlSection,
    pub output: OutputSection,
    pub aliases: BTreeMap<Role, Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceSection {
    pub path: Option<PathBuf>,
    /// Single-character field delimiter
    pub delimiter: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControlSection {
    pub day: Option<String>,
    pub hour: Option<String>,
    pub shift: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputSection {
    pub path: Option<PathBuf>,
    pub sheet: Option<String>,
}

impl CliConfig {
    /// Load an explicit config file, or `hourperf.toml` when present
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = Self::parse(&text)
            .with_context(|| format!("invalid config {}", path.display()))?;
        tracing::debug!(path = %path.display(), "Config loaded");
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Alias table with the configured overrides applied
    pub fn aliases(&self) -> ColumnAliases {
        ColumnAliases::default().with_overrides(self.aliases.clone())
    }

    /// Control values; flags take precedence over the file
    pub fn controls(
        &self,
        day: Option<String>,
        hour: Option<String>,
        shift: Option<String>,
    ) -> ControlValues {
        let mut controls = ControlValues::new();
        if let Some(day) = day.or_else(|| self.controls.day.clone()) {
            controls = controls.day(day);
        }
        if let Some(hour) = hour.or_else(|| self.controls.hour.clone()) {
            controls = controls.hour(hour);
        }
        if let Some(shift) = shift.or_else(|| self.controls.shift.clone()) {
            controls = controls.shift(shift);
        }
        controls
    }

    /// Source path; the positional argument wins over the file
    pub fn source_path(&self, arg: Option<PathBuf>) -> Result<PathBuf> {
        match arg.or_else(|| self.source.path.clone()) {
            Some(path) => Ok(path),
            None => bail!("no source given: pass a SOURCE path or set [source].path"),
        }
    }

    pub fn delimiter(&self) -> Result<Option<u8>> {
        match self.source.delimiter.as_deref() {
            None => Ok(None),
            Some("\\t" | "tab") => Ok(Some(b'\t')),
            Some(d) if d.len() == 1 => Ok(Some(d.as_bytes()[0])),
            Some(d) => bail!("delimiter must be a single ASCII character, got {d:?}"),
        }
    }
}
