//! Router for the chat API

use std::sync::{Arc, RwLock};

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use http::{HeaderValue, header};

use super::public::{ChatRequest, ErrorResponse, RateLimitResponse, UnavailableResponse};
use crate::admission::Denial;
use crate::ai::chat::{ChatError, ChatTurn};
use crate::api::public::ApiError;
use crate::api::state::AppState;
use crate::api::utils::ClientIdentifier;

type SharedState = Arc<RwLock<AppState>>;

fn denied(denial: Denial) -> Response {
    match denial {
        Denial::RateLimited {
            window,
            remaining,
            reset_in,
            limit,
            retry_after,
        } => {
            let body = RateLimitResponse {
                error: denial.error().to_string(),
                message: denial.message(),
                remaining,
                reset_in,
                limit,
                window: window.label().to_string(),
            };
            let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
            let seconds = (retry_after.num_milliseconds().max(0) + 999) / 1000;
            if let Ok(value) = HeaderValue::from_str(&seconds.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
            response
        }
        _ => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::with_message(denial.error(), &denial.message())),
        )
            .into_response(),
    }
}

/// Answer a visitor message
async fn chat_handler(
    State(state): State<SharedState>,
    ClientIdentifier(client): ClientIdentifier,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            tracing::debug!("Rejected chat body from {}: {}", client, rejection);
            return Ok((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::with_message(
                    "Invalid request",
                    &rejection.body_text(),
                )),
            )
                .into_response());
        }
    };

    // Don't hold the lock across the model call
    let responder = state
        .read()
        .map_err(|_| anyhow::anyhow!("Unable to read shared state"))?
        .responder
        .clone();

    let turn = ChatTurn {
        message: payload.message,
        client,
        session_id: payload.session_id,
        history: payload.conversation_history,
    };

    let response = match responder.handle(turn).await {
        Ok(reply) => Json(reply).into_response(),
        Err(ChatError::MessageRequired) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Message is required")),
        )
            .into_response(),
        Err(ChatError::Denied(denial)) => denied(denial),
        Err(ChatError::QuotaExhausted(_)) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(UnavailableResponse {
                error: "Service temporarily unavailable".to_string(),
                message: "Chat service is currently unavailable due to quota limits. Please try again later.".to_string(),
                events: Vec::new(),
            }),
        )
            .into_response(),
    };

    Ok(response)
}

async fn method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorResponse::new("Method not allowed")),
    )
}

pub fn router() -> Router<SharedState> {
    Router::new().route("/", post(chat_handler).fallback(method_not_allowed))
}
