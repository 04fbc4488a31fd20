//! API error types with IntoResponse
//!
//! Errors are converted to JSON responses with appropriate status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use shelfctl_core::models::ValidationError;

use crate::db::StoreError;
use crate::media::MediaError;

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Validation failed (400)
    Validation(ValidationError),

    /// Malformed request outside field validation (400)
    BadRequest { message: String },

    /// Uniqueness constraint violated (409)
    Conflict { field: &'static str, message: String },

    /// Resource not found (404)
    NotFound { resource: &'static str, id: String },

    /// Storage error (500, logged)
    Store(StoreError),

    /// Internal error (500)
    Internal { message: String },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::Validation(e) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "validation_error",
                    "field": e.field(),
                    "message": e.to_string()
                }),
            ),
            Self::BadRequest { message } => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "bad_request",
                    "message": message
                }),
            ),
            Self::Conflict { field, message } => (
                StatusCode::CONFLICT,
                json!({
                    "error": "conflict",
                    "field": field,
                    "message": message
                }),
            ),
            Self::NotFound { resource, id } => (
                StatusCode::NOT_FOUND,
                json!({
                    "error": "not_found",
                    "message": format!("{} '{}' not found", resource, id)
                }),
            ),
            Self::Store(e) => {
                // Log the actual error, return generic message
                tracing::error!("Storage error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "internal_error",
                        "message": "an internal error occurred"
                    }),
                )
            }
            Self::Internal { message } => {
                tracing::error!("Internal error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "internal_error",
                        "message": "an internal error occurred"
                    }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { resource, id } => Self::NotFound { resource, id },
            StoreError::Conflict { field, message } => Self::Conflict { field, message },
            _ => Self::Store(e),
        }
    }
}

impl From<MediaError> for ApiError {
    fn from(e: MediaError) -> Self {
        match e {
            MediaError::UnsupportedImage | MediaError::InvalidName(_) => Self::BadRequest {
                message: e.to_string(),
            },
            MediaError::Io(e) => Self::Internal {
                message: format!("media write failed: {}", e),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use shelfctl_core::models::book::TITLE_BLANK_MESSAGE;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn validation_error_is_400_with_custom_message() {
        let err = ApiError::Validation(ValidationError::Blank {
            field: "title",
            message: Some(TITLE_BLANK_MESSAGE),
        });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["error"], "validation_error");
        assert_eq!(body["field"], "title");
        assert_eq!(body["message"], TITLE_BLANK_MESSAGE);
    }

    #[tokio::test]
    async fn conflict_is_409() {
        let response = ApiError::from(StoreError::duplicate_username()).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body = body_json(response).await;
        assert_eq!(body["field"], "username");
        assert_eq!(body["message"], "Author with this username already exists.");
    }

    #[tokio::test]
    async fn not_found_is_404() {
        let response = ApiError::from(StoreError::not_found("book", 7)).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["message"], "book '7' not found");
    }

    #[tokio::test]
    async fn storage_error_hides_details() {
        let err = ApiError::from(StoreError::Sqlx(sqlx::Error::PoolTimedOut));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["message"], "an internal error occurred");
    }

    #[tokio::test]
    async fn unsupported_upload_is_400() {
        let response = ApiError::from(MediaError::UnsupportedImage).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
