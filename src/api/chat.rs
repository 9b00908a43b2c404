//! Chat relay endpoint

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ApiState;
use crate::locale::Locale;

/// Build chat router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .with_state(state)
}

/// Chat request body
///
/// Fields are loosely typed so a wrong type is reported as a validation
/// error rather than a deserialization failure.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Value,
    #[serde(default)]
    pub language: Value,
}

/// Successful chat response
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
}

/// Relay a user message to the responder
async fn chat(
    State(state): State<Arc<ApiState>>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ChatError> {
    let Json(request) = body.map_err(|e| {
        tracing::debug!(error = %e, "rejected chat body");
        ChatError::InvalidBody
    })?;

    let message = request
        .message
        .as_str()
        .filter(|m| !m.trim().is_empty())
        .ok_or(ChatError::MessageRequired)?;

    let locale = Locale::from_request(request.language.as_str());

    // Measured in UTF-16 code units, the unit browsers report for string length
    let units = message.encode_utf16().count();
    if units > state.max_message_chars {
        tracing::debug!(units, limit = state.max_message_chars, "message too long");
        return Err(ChatError::MessageTooLong);
    }

    tracing::debug!(%locale, units, "chat request");
    let reply = state.responder.respond(message, locale).await;

    Ok(Json(ChatResponse { reply }))
}

/// Chat API errors
#[derive(Debug)]
pub enum ChatError {
    InvalidBody,
    MessageRequired,
    MessageTooLong,
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: &'static str,
        }

        let (status, error) = match self {
            Self::InvalidBody => (StatusCode::BAD_REQUEST, "Invalid JSON body"),
            Self::MessageRequired => (StatusCode::BAD_REQUEST, "Message is required"),
            Self::MessageTooLong => (StatusCode::PAYLOAD_TOO_LARGE, "Message too long"),
        };

        (status, Json(ErrorResponse { error })).into_response()
    }
}
