//! Public API types

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;

use self::chat::ErrorResponse;

// Errors

pub struct ApiError(anyhow::Error);

/// Convert `ApiError` into an Axum compatible response. Details stay
/// in the log, the client only learns that something broke.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!("{:#}", self.0);

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new("Internal server error")),
        )
            .into_response()
    }
}

/// Enables using `?` on functions that return `Result<_,
/// anyhow::Error>` to turn them into `Result<_, ApiError>`
impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

// Re-export public types from each route

pub mod chat {
    pub use crate::api::routes::chat::public::*;
}
