//! Application error types and HTTP response mapping.
//!
//! Defines `BlameError` for every failure the attribution pipeline can raise
//! and implements Axum's `IntoResponse` so API handlers can return it directly
//! as a JSON error body.
//!
//! Error mappings:
//! - `NotFound`, `RepoNotFound` → 404
//! - `InvalidArgument` → 400
//! - `ExternalCommand` → 502
//! - `Git`, `AttributionIndex`, `Internal` → 500

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BlameError {
    /// Empty or malformed input handed to a parsing primitive.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A required delimiter, label or header was absent from the input.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The command runner reported a fatal condition.
    #[error("External command failed: {0}")]
    ExternalCommand(String),

    /// A reconstructed code block was indexed out of range.
    ///
    /// Never leaves the attribution stage; it is folded into a placeholder line.
    #[error("Index {index} is outside a code block of {len} lines")]
    AttributionIndex { index: isize, len: usize },

    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Repository not found: {0}")]
    RepoNotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for BlameError {
    fn into_response(self) -> Response {
        let status = match &self {
            BlameError::NotFound(_) | BlameError::RepoNotFound(_) => StatusCode::NOT_FOUND,
            BlameError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            BlameError::ExternalCommand(_) => StatusCode::BAD_GATEWAY,
            BlameError::Git(_) | BlameError::AttributionIndex { .. } | BlameError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, BlameError>;
