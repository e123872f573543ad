//! Error types for the recipe API
//!
//! Every failure a handler can produce collapses into [`ApiError`], which
//! renders as `{"error": "<message>"}` with the matching status code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use crate::images::ImageError;
use crate::models::ErrorResponse;
use crate::store::StoreError;

// == API Error Enum ==
/// Unified error type returned by the HTTP handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed id, missing or out-of-range fields, bad upload
    #[error("{0}")]
    Validation(String),

    /// No recipe matched the identifier
    #[error("{0}")]
    NotFound(String),

    /// Image decode, encode or write failure
    #[error("{0}")]
    Processing(String),

    /// Store unreachable, query failure or deadline elapsed
    #[error("{0}")]
    Persistence(String),
}

impl ApiError {
    /// HTTP status code for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Processing(_) | ApiError::Persistence(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Maps a store failure into an API error.
    ///
    /// `NotFound` keeps its meaning; every other store failure is reported
    /// to the client as `message` and logged with its cause.
    pub fn from_store(err: StoreError, message: &str) -> Self {
        match err {
            StoreError::NotFound => ApiError::NotFound("Recipe not found".to_string()),
            other => {
                error!("{}: {}", message, other);
                ApiError::Persistence(message.to_string())
            }
        }
    }

    /// Maps an image pipeline failure into an API error.
    pub fn from_image(err: ImageError) -> Self {
        error!("Image processing failed: {}", err);
        ApiError::Processing("Failed to process image".to_string())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse::new(self.to_string()));
        (self.status(), body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the HTTP layer.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::Validation("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Processing("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Persistence("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_store_not_found_maps_to_404() {
        let err = ApiError::from_store(StoreError::NotFound, "Database error");
        assert!(matches!(err, ApiError::NotFound(_)));
        assert_eq!(err.to_string(), "Recipe not found");
    }

    #[test]
    fn test_store_timeout_maps_to_persistence() {
        let err = ApiError::from_store(StoreError::Timeout, "Failed to fetch recipes");
        assert!(matches!(err, ApiError::Persistence(_)));
        assert_eq!(err.to_string(), "Failed to fetch recipes");
    }

    #[tokio::test]
    async fn test_error_body_is_json() {
        let response = ApiError::Validation("Invalid ID format".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["error"], "Invalid ID format");
    }
}
