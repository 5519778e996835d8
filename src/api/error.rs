//! Error responses of the webhook endpoint.

use crate::worklog::{
    ports::{RegistryError, RowStoreError},
    services::{AggregatorError, RegistryServiceError},
};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Failures reported to webhook callers as `{ success: false, error }`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The body is not a JSON event.
    #[error("invalid JSON payload: {0}")]
    InvalidPayload(String),
    /// `time` is neither a number nor a numeric string.
    #[error("time must be a number of hours, got '{0}'")]
    InvalidTime(String),
    /// The action is not recognised.
    #[error("unknown action: {0}")]
    UnknownAction(String),
    /// Commit aggregation failed.
    #[error(transparent)]
    Aggregator(#[from] AggregatorError),
    /// Registry management failed.
    #[error(transparent)]
    Registry(#[from] RegistryServiceError),
}

const fn store_status(err: &RowStoreError) -> StatusCode {
    match err {
        RowStoreError::TableMissing(_)
        | RowStoreError::Timeout { .. }
        | RowStoreError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        RowStoreError::RowNotFound { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl ApiError {
    /// HTTP status reported for this failure.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidPayload(_)
            | Self::InvalidTime(_)
            | Self::UnknownAction(_)
            | Self::Aggregator(AggregatorError::Domain(_))
            | Self::Registry(RegistryServiceError::Domain(_)) => StatusCode::BAD_REQUEST,
            Self::Aggregator(AggregatorError::Store(err)) => store_status(err),
            Self::Aggregator(AggregatorError::Lock(_))
            | Self::Registry(RegistryServiceError::Registry(RegistryError::Unavailable(_))) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Self::Registry(RegistryServiceError::Registry(RegistryError::NotFound(_))) => {
                StatusCode::NOT_FOUND
            }
            Self::Registry(RegistryServiceError::Registry(RegistryError::DuplicateTask(_))) => {
                StatusCode::CONFLICT
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(status = %status, error = %self, "request failed");
        } else {
            tracing::debug!(status = %status, error = %self, "request rejected");
        }
        let body = ErrorBody {
            success: false,
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
