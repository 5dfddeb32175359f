use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::completion::CompletionError;
use crate::layout::LayoutError;
use crate::render::{ExportFormat, RenderError};

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{0:?} export already in progress")]
    ExportInFlight(ExportFormat),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("Text completion failed: {0}")]
    Completion(#[from] CompletionError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::ExportInFlight(_) => (
                StatusCode::CONFLICT,
                "EXPORT_IN_FLIGHT",
                self.to_string(),
            ),
            AppError::Layout(LayoutError::MeasurementUnavailable(msg)) => (
                StatusCode::CONFLICT,
                "MEASUREMENT_UNAVAILABLE",
                msg.clone(),
            ),
            AppError::Render(RenderError::CaptureFailure(msg)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "CAPTURE_FAILURE",
                msg.clone(),
            ),
            AppError::Render(e @ RenderError::EncodingFailure { .. }) => {
                tracing::error!("Encoding error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "ENCODING_FAILURE",
                    e.to_string(),
                )
            }
            AppError::Completion(CompletionError::MissingCredential) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "COLLABORATOR_FAILURE",
                "Text completion is not configured: no API key".to_string(),
            ),
            AppError::Completion(e) => {
                tracing::error!("Completion error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "COLLABORATOR_FAILURE",
                    "The text-completion service could not produce a suggestion".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
