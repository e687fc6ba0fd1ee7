//! # hourperf-server
//!
//! HTTP trigger for the hourly performance report.
//!
//! - `GET /`: liveness probe
//! - `POST /run-hourly-performance`: rebuild the report workbook. Optional
//!   `day`, `hour` and `shift` query parameters override the configured
//!   controls.

pub mod config;
pub mod error;

use std::sync::{Arc, Mutex, PoisonError};

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use hourperf_core::ControlValues;
use hourperf_pivot::{run_report, ColumnAliases, RunSummary};
use hourperf_render::{CsvSource, WorkbookStore};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub use config::{ConfigError, ServerConfig};
pub use error::{AppError, AppResult};

/// Header carrying the shared run token
pub const RUN_TOKEN_HEADER: &str = "x-run-token";

/// Shared state for all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub aliases: Arc<ColumnAliases>,
    /// Serializes runs so two triggers never write the target at once
    run_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config: Arc::new(config),
            aliases: Arc::new(ColumnAliases::default()),
            run_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn with_aliases(mut self, aliases: ColumnAliases) -> Self {
        self.aliases = Arc::new(aliases);
        self
    }
}

/// Per-request control overrides
#[derive(Debug, Default, Deserialize)]
pub struct RunParams {
    pub day: Option<String>,
    pub hour: Option<String>,
    pub shift: Option<String>,
}

impl RunParams {
    fn controls(self, defaults: &ControlValues) -> ControlValues {
        let mut controls = defaults.clone();
        if let Some(day) = self.day {
            controls = controls.day(day);
        }
        if let Some(hour) = self.hour {
            controls = controls.hour(hour);
        }
        if let Some(shift) = self.shift {
            controls = controls.shift(shift);
        }
        controls
    }
}

#[derive(Serialize)]
struct ServiceStatus {
    status: &'static str,
    service: &'static str,
}

async fn index() -> Json<ServiceStatus> {
    Json(ServiceStatus {
        status: "ok",
        service: "hourly_performance",
    })
}

async fn run_hourly_performance(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<RunParams>,
) -> AppResult<Json<Value>> {
    authorize(&state.config, &headers)?;

    let controls = params.controls(&state.config.controls);
    let summary = tokio::task::spawn_blocking(move || build_workbook(&state, &controls))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(Json(json!({
        "ok": true,
        "message": "Hourly_Performance built.",
        "summary": summary,
    })))
}

fn authorize(config: &ServerConfig, headers: &HeaderMap) -> AppResult<()> {
    let Some(expected) = config.run_token.as_deref() else {
        return Ok(());
    };
    let given = headers
        .get(RUN_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok());
    if given == Some(expected) {
        Ok(())
    } else {
        tracing::warn!("Rejected trigger with missing or wrong run token");
        Err(AppError::Unauthorized)
    }
}

/// One blocking run: read the source, build the report, save the workbook
fn build_workbook(state: &AppState, controls: &ControlValues) -> AppResult<RunSummary> {
    let _guard = state.run_lock.lock().unwrap_or_else(PoisonError::into_inner);

    let config = &state.config;
    let table = CsvSource::new(&config.source_path).read_table()?;
    let mut store = WorkbookStore::new(table, controls).sheet_name(config.sheet_name.clone());
    let summary = run_report(&mut store, &state.aliases)?;
    store.save(&config.target_path)?;

    tracing::info!(
        target_path = %config.target_path.display(),
        rows = summary.rows,
        notice = ?summary.notice,
        "Hourly_Performance built"
    );
    Ok(summary)
}

/// Application routes
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/run-hourly-performance", post(run_hourly_performance))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn config(token: Option<&str>) -> ServerConfig {
        let mut config = ServerConfig::from_lookup(|_| None).unwrap();
        config.run_token = token.map(str::to_string);
        config
    }

    #[test]
    fn no_token_configured_allows_all() {
        assert!(authorize(&config(None), &HeaderMap::new()).is_ok());
    }

    #[test]
    fn token_must_match() {
        let config = config(Some("abc"));
        let mut headers = HeaderMap::new();
        assert!(matches!(
            authorize(&config, &headers),
            Err(AppError::Unauthorized)
        ));
        headers.insert(RUN_TOKEN_HEADER, HeaderValue::from_static("abd"));
        assert!(authorize(&config, &headers).is_err());
        headers.insert(RUN_TOKEN_HEADER, HeaderValue::from_static("abc"));
        assert!(authorize(&config, &headers).is_ok());
    }

    #[test]
    fn run_recovers_after_a_panicked_run() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("events.csv");
        std::fs::write(
            &source,
            "full_name,hour,quantity,occupied_hours,performance_without_rotation,\
             performance_with_rotation,task_type,date,Shift\n\
             Sara,9,120,45,60.9%,131.5%,Pick,2024-05-01,Shift1\n",
        )
        .unwrap();
        let mut config = config(None);
        config.source_path = source;
        config.target_path = dir.path().join("report.xlsx");
        let state = AppState::new(config);

        let lock = Arc::clone(&state.run_lock);
        let _ = std::thread::spawn(move || {
            let _guard = lock.lock().unwrap();
            panic!("run failed mid-write");
        })
        .join();
        assert!(state.run_lock.is_poisoned());

        let summary = build_workbook(&state, &state.config.controls).unwrap();
        assert_eq!(summary.rows, 1);
        assert!(dir.path().join("report.xlsx").exists());
    }

    #[test]
    fn params_override_defaults() {
        let defaults = ControlValues::new().day("2024-05-01").shift("Shift1");
        let params = RunParams {
            hour: Some("9".into()),
            shift: Some("Flex".into()),
            ..RunParams::default()
        };
        let controls = params.controls(&defaults);
        assert_eq!(controls.day.as_deref(), Some("2024-05-01"));
        assert_eq!(controls.hour.as_deref(), Some("9"));
        assert_eq!(controls.shift.as_deref(), Some("Flex"));
    }
}
