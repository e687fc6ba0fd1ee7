use std::path::PathBuf;

use hourperf_core::ControlValues;
use thiserror::Error;

/// Server configuration loaded from environment variables.
///
/// | Env Var        | Default                   |
/// |----------------|---------------------------|
/// | `HOST`         | `0.0.0.0`                 |
/// | `PORT`         | `8000`                    |
/// | `RUN_TOKEN`    | unset (no token check)    |
/// | `SOURCE_PATH`  | `source.csv`              |
/// | `TARGET_PATH`  | `hourly_performance.xlsx` |
/// | `SHEET_NAME`   | `Hourly_Performance`      |
/// | `REPORT_DAY`   | unset (latest day)        |
/// | `REPORT_HOUR`  | unset                     |
/// | `REPORT_SHIFT` | unset                     |
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Shared secret expected in `X-Run-Token`
    pub run_token: Option<String>,
    pub source_path: PathBuf,
    pub target_path: PathBuf,
    pub sheet_name: String,
    /// Default controls, overridable per request
    pub controls: ControlValues,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a valid {expected}, got {value:?}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source; empty values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let host = var("HOST").unwrap_or_else(|| "0.0.0.0".into());

        let port = match var("PORT") {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                expected: "port number",
                value,
            })?,
            None => 8000,
        };

        let mut controls = ControlValues::new();
        if let Some(day) = var("REPORT_DAY") {
            controls = controls.day(day);
        }
        if let Some(hour) = var("REPORT_HOUR") {
            controls = controls.hour(hour);
        }
        if let Some(shift) = var("REPORT_SHIFT") {
            controls = controls.shift(shift);
        }

        Ok(Self {
            host,
            port,
            run_token: var("RUN_TOKEN"),
            source_path: var("SOURCE_PATH").map_or_else(|| "source.csv".into(), PathBuf::from),
            target_path: var("TARGET_PATH")
                .map_or_else(|| "hourly_performance.xlsx".into(), PathBuf::from),
            sheet_name: var("SHEET_NAME")
                .unwrap_or_else(|| hourperf_render::DEFAULT_SHEET_NAME.to_string()),
            controls,
        })
    }
}
