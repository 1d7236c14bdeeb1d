//! API server module
//!
//! Router construction and server startup for the chat relay.

use std::sync::Arc;

use anyhow::Result;
use axum::http::HeaderValue;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use huginn_core::ChatService;

use crate::handlers::{
    api_health, chat_health, root, send_message, service_health, stream_message, ApiState,
};
use crate::models::ApiConfig;

/// Main API server
pub struct ApiServer {
    /// Server configuration
    config: ApiConfig,
    /// Shared state
    state: Arc<ApiState>,
}

/// Build the application router
///
/// Public so tests can drive handlers without binding a socket.
pub fn build_router(state: Arc<ApiState>, config: &ApiConfig) -> Router {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(service_health))
        .route("/api/v1/health", get(api_health))
        .route("/api/v1/chat/health", get(chat_health))
        .route("/api/v1/chat/messages", post(send_message))
        .route("/api/v1/chat/messages/stream", post(stream_message))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

impl ApiServer {
    /// Create a new API server
    pub fn new(config: ApiConfig, chat: Arc<ChatService>) -> Self {
        let state = Arc::new(ApiState { chat });
        Self { config, state }
    }

    /// Build this server's router
    pub fn router(&self) -> Router {
        build_router(self.state.clone(), &self.config)
    }

    /// Start the API server and serve until shutdown
    pub async fn start(&self) -> Result<()> {
        let app = self.router();
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        info!(
            "Huginn API server v{} listening on {}",
            self.config.version, addr
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| anyhow::anyhow!("API server failed: {e}"))?;

        info!("Huginn API server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
    }
}
