//! Error types for the crop server.

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::pdf::CropError;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Client error: missing file, bad parameters, out-of-range page.
    #[error("{0}")]
    InvalidRequest(String),

    #[error("Multipart error: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Crop failed: {0}")]
    Crop(#[from] CropError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            AppError::Multipart(e) => (
                StatusCode::BAD_REQUEST,
                "Invalid multipart body".to_string(),
                Some(e.to_string()),
            ),
            AppError::Crop(e) => {
                tracing::error!("Crop failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server error".to_string(),
                    Some(e.to_string()),
                )
            }
            AppError::Io(e) => {
                tracing::error!("IO error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server error".to_string(),
                    Some(e.to_string()),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server error".to_string(),
                    Some(msg.clone()),
                )
            }
        };

        let body = Json(ErrorResponse { error, details });
        (status, body).into_response()
    }
}
