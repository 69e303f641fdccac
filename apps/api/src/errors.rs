use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Each variant is a distinct, terminal failure kind: nothing here is retried
/// at the request boundary, and nothing here may crash the process.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid option selected: '{value}' is not a known value for {field}")]
    UnknownCategory { field: &'static str, value: String },

    #[error("Prediction model not found: {0}")]
    ModelUnavailable(String),

    #[error("Model compatibility error: {0}")]
    ModelIncompatible(String),

    #[error("Upstream service error: {0}")]
    Upstream(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<crate::llm_client::LlmError> for AppError {
    fn from(e: crate::llm_client::LlmError) -> Self {
        AppError::Upstream(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation(_) | AppError::UnknownCategory { .. } => StatusCode::BAD_REQUEST,
            AppError::ModelUnavailable(msg) => {
                tracing::error!("Model unavailable: {msg}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::ModelIncompatible(msg) => {
                tracing::error!("Model incompatible: {msg}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Upstream(msg) => {
                tracing::error!("Upstream error: {msg}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({ "error": self.to_string() }));

        (status, body).into_response()
    }
}
