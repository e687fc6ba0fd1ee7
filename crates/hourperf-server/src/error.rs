use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use hourperf_core::{RenderError, StoreError};
use hourperf_pivot::PivotError;
use serde_json::json;

/// Handler error, rendered as `{"ok": false, "error": ...}`
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Missing or wrong `X-Run-Token`
    #[error("unauthorized")]
    Unauthorized,

    #[error(transparent)]
    Pivot(#[from] PivotError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            other => {
                tracing::error!(error = %other, "Report run failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = json!({
            "ok": false,
            "error": self.to_string(),
        });

        (status, axum::Json(body)).into_response()
    }
}
