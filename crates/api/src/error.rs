use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use stager_core::error::CoreError;
use stager_hosting::HostError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and [`HostError`] for image upload
/// failures. Implements [`IntoResponse`] to produce consistent JSON error
/// responses of the form `{ "error": ..., "code": ... }`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Host(#[from] HostError),

    /// A resource other than a staging job was not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Logged in full, reported to the client without detail.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => classify_core_error(core),
            AppError::Host(host) => classify_host_error(host),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

fn classify_core_error(err: &CoreError) -> (StatusCode, &'static str, String) {
    match err {
        CoreError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND", err.detail()),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
        CoreError::Cancelled(msg) => (StatusCode::CONFLICT, "CANCELLED", msg.clone()),
        CoreError::Upstream(msg) => {
            tracing::warn!(error = %msg, "Upstream error");
            (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", msg.clone())
        }
        CoreError::Processing(msg) => (StatusCode::BAD_GATEWAY, "PROCESSING_ERROR", msg.clone()),
        CoreError::Timeout(msg) => (StatusCode::GATEWAY_TIMEOUT, "TIMEOUT", msg.clone()),
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            internal()
        }
    }
}

/// Bad input is the client's fault; every other hosting failure is an
/// upstream failure, except having no hosts at all.
fn classify_host_error(err: &HostError) -> (StatusCode, &'static str, String) {
    match err {
        HostError::InvalidImage(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        HostError::NoHosts => {
            tracing::error!("Image upload attempted with no hosts configured");
            internal()
        }
        other => {
            tracing::warn!(error = %other, "Image hosting failed");
            (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", other.to_string())
        }
    }
}
