use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::CatalogError;

/// HTTP-level error. Every failure leaves as `{ "error": ..., "details"?: ... }`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Malformed request, e.g. a body that is not valid JSON.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Failed login. Unknown email and wrong password share this message.
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

const INTERNAL_MESSAGE: &str = "Internal server error";

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Catalog(CatalogError::NotFound { entity, id }) => {
                tracing::debug!(entity, id = %id, "Entity not found");
                (StatusCode::NOT_FOUND, json!({ "error": format!("{entity} not found") }))
            }
            ApiError::Catalog(CatalogError::Validation(errors)) => {
                (StatusCode::BAD_REQUEST, json!({ "error": "Validation failed", "details": errors }))
            }
            ApiError::Catalog(CatalogError::Conflict(message)) => (StatusCode::BAD_REQUEST, json!({ "error": message })),
            ApiError::Catalog(CatalogError::Unauthorized) => (StatusCode::UNAUTHORIZED, json!({ "error": "Unauthorized" })),
            ApiError::Catalog(CatalogError::Store(err)) => {
                tracing::error!(error = %err, "Catalog store failure");
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": INTERNAL_MESSAGE }))
            }
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, json!({ "error": message })),
            ApiError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, json!({ "error": ApiError::InvalidCredentials.to_string() }))
            }
            ApiError::Internal(message) => {
                tracing::error!(error = %message, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": INTERNAL_MESSAGE }))
            }
        };
        (status, Json(body)).into_response()
    }
}
