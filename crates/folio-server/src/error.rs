//! Error types for the catalog API.
//!
//! [`ApiError`] unifies every failure a handler can hit into one enum
//! that converts into an Axum response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation. The
//! body is always an [`ErrorBody`]: a single `error` field.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use folio_core::{BackendUnavailable, ColumnNotFound, StorageError};
use folio_db::DbError;
use folio_types::ErrorBody;

/// Message returned for backend query failures. The cause is logged, not sent.
const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Errors that can occur in the catalog API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The requested column has no page rows.
    #[error("Column not found")]
    ColumnNotFound,

    /// The requested image key has no object.
    #[error("Image not found")]
    ImageNotFound,

    /// The primary store is unavailable and fallback is disabled.
    #[error("No database connection available")]
    Unavailable,

    /// An object key was rejected before reaching the store.
    #[error("Invalid object key")]
    InvalidKey(String),

    /// The primary store failed to answer a query.
    #[error("database error: {0}")]
    Database(#[from] DbError),

    /// An object store failed to read an existing object.
    #[error("storage error: {0}")]
    Storage(StorageError),
}

impl ApiError {
    /// HTTP status for this error.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::ColumnNotFound | Self::ImageNotFound => StatusCode::NOT_FOUND,
            Self::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::InvalidKey(_) => StatusCode::BAD_REQUEST,
            Self::Database(_) | Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ColumnNotFound> for ApiError {
    fn from(_: ColumnNotFound) -> Self {
        Self::ColumnNotFound
    }
}

impl From<BackendUnavailable> for ApiError {
    fn from(_: BackendUnavailable) -> Self {
        Self::Unavailable
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidKey(key) => Self::InvalidKey(key),
            other @ StorageError::Io { .. } => Self::Storage(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::Database(e) => {
                tracing::error!(error = %e, "catalog query failed");
                String::from(INTERNAL_ERROR_MESSAGE)
            }
            Self::Storage(e) => {
                tracing::error!(error = %e, "object store read failed");
                String::from(INTERNAL_ERROR_MESSAGE)
            }
            Self::InvalidKey(key) => {
                tracing::debug!(key, "rejected object key");
                self.to_string()
            }
            Self::ColumnNotFound | Self::ImageNotFound | Self::Unavailable => self.to_string(),
        };

        (status, Json(ErrorBody::new(message))).into_response()
    }
}
