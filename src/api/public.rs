//! Public API types

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde_json::json;

// Errors

/// Every handler failure ends up here and is rendered as
/// `{"error": message}`.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Unauthenticated,
    Internal(anyhow::Error),
}

impl ApiError {
    pub fn bad_request(message: &str) -> Self {
        Self::BadRequest(message.to_string())
    }

    pub fn not_found(message: &str) -> Self {
        Self::NotFound(message.to_string())
    }
}

/// Convert `ApiError` into an Axum compatible response.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            ApiError::Unauthenticated => (
                StatusCode::FORBIDDEN,
                String::from("Authentication required."),
            ),
            ApiError::Internal(err) => {
                // Only internal errors get logged, the rest are the
                // client's problem
                tracing::error!("{:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    String::from("Something went wrong."),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Enables using `?` on functions that return `Result<_,
/// anyhow::Error>` to turn them into `Result<_, ApiError>`
impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Internal(err.into())
    }
}

// Re-export public types from each route

pub mod emails {
    pub use crate::api::routes::emails::public::*;
}

pub mod pages {
    pub use crate::api::routes::pages::public::*;
}
