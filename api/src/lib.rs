//! Huginn API module
//!
//! The API module provides the HTTP endpoints for the chat relay:
//! message submission (single-shot and streamed) and health checks.

pub mod handlers;
pub mod models;
pub mod server;

pub use handlers::{ApiError, ApiState};
pub use models::{ApiConfig, ChatMessage, ChatRequest, ChatResponse, ErrorResponse, StreamChunk};
pub use server::{build_router, ApiServer};
