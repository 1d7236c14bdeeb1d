//! API handlers module
//!
//! Request handlers for the chat endpoints. Status mapping: validation
//! failures are 422, missing engine credentials 400, other engine failures
//! 500. Streaming errors after the stream has started arrive in-band as a
//! terminal chunk, never as a transport fault.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    debug_handler,
    extract::State,
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    response::{IntoResponse, Json, Response},
};
use futures::{Stream, StreamExt};
use serde_json::{json, Value};

use huginn_core::{ChatService, EngineError, StreamFragment};

use crate::models::{ChatRequest, ChatResponse, ErrorResponse, StreamChunk, ValidationIssue};

/// Shared state of the API server
pub struct ApiState {
    /// Chat service (engine adapters + init guard)
    pub chat: Arc<ChatService>,
}

/// Handler-level errors with their HTTP mapping
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Request body failed validation
    #[error("Validation failed: {field} {message}")]
    Validation { field: &'static str, message: String },

    /// Engine credentials missing or invalid
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Engine-side failure
    #[error("Failed to generate response: {0}")]
    Engine(String),

    /// Chat service failed its health check
    #[error("Chat service unhealthy: {0}")]
    Unhealthy(String),
}

impl From<ValidationIssue> for ApiError {
    fn from(issue: ValidationIssue) -> Self {
        ApiError::Validation {
            field: issue.field,
            message: issue.message,
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Configuration(msg) => ApiError::Configuration(msg),
            other => ApiError::Engine(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::Validation { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error"),
            ApiError::Configuration(_) => (StatusCode::BAD_REQUEST, "configuration_error"),
            ApiError::Engine(_) => (StatusCode::INTERNAL_SERVER_ERROR, "engine_error"),
            ApiError::Unhealthy(_) => (StatusCode::SERVICE_UNAVAILABLE, "unhealthy"),
        };
        let detail = match &self {
            ApiError::Validation { field, message } => Some(format!("{field}: {message}")),
            ApiError::Configuration(msg) | ApiError::Unhealthy(msg) => Some(msg.clone()),
            ApiError::Engine(msg) => Some(msg.clone()),
        };
        let body = ErrorResponse {
            error: self.to_string(),
            detail,
            code: Some(code.to_string()),
        };
        (status, Json(body)).into_response()
    }
}

/// Service root: name, version, and where the API lives
#[debug_handler]
pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "Huginn API",
        "version": env!("CARGO_PKG_VERSION"),
        "api": "/api/v1",
    }))
}

/// Service-level health check
#[debug_handler]
pub async fn service_health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// API-level health check
#[debug_handler]
pub async fn api_health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "huginn-api",
    }))
}

/// Chat health check
///
/// Triggers the engine init guard; reports the resolved model identifier
/// or 503 with the initialization failure.
#[debug_handler]
pub async fn chat_health(State(state): State<Arc<ApiState>>) -> Result<Json<Value>, ApiError> {
    match state.chat.health().await {
        Ok(model) => Ok(Json(json!({
            "status": "healthy",
            "service": "chat",
            "model": model,
        }))),
        Err(e) => Err(ApiError::Unhealthy(e.to_string())),
    }
}

/// Send a chat message and return the complete response
#[debug_handler]
pub async fn send_message(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    request.validate()?;
    tracing::debug!(thinking_mode = request.thinking_mode, "chat message received");

    let history = request.history_turns();
    let response = state
        .chat
        .generate(request.message, history, request.thinking_mode)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "failed to generate response");
            ApiError::from(e)
        })?;

    Ok(Json(ChatResponse::from(response)))
}

/// Send a chat message and stream the response as server-sent events
///
/// One `data:` event per fragment, terminated by exactly one event with
/// `is_final: true`.
#[debug_handler]
pub async fn stream_message(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    request.validate()?;
    tracing::debug!(thinking_mode = request.thinking_mode, "chat stream requested");

    let history = request.history_turns();
    let fragments = state
        .chat
        .stream(request.message, history, request.thinking_mode)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "failed to start stream");
            ApiError::from(e)
        })?;

    let stream = fragments.map(|fragment| {
        let chunk = StreamChunk::from(fragment);
        // Encoding plain string fields cannot fail; should that ever
        // change, the client still needs a terminal event.
        let event = Event::default().json_data(&chunk).unwrap_or_else(|e| {
            tracing::error!(error = %e, "failed to encode stream chunk");
            let terminal = StreamChunk::from(StreamFragment::done());
            Event::default().data(serde_json::to_string(&terminal).unwrap_or_default())
        });
        Ok(event)
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
