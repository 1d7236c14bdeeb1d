//! API models module
//!
//! Wire schemas for the chat endpoints plus server configuration.

use chrono::{DateTime, Utc};
use huginn_core::normalize::{AggregateResponse, StreamFragment};
use huginn_core::{ChatTurn, EngineRole};
use serde::{Deserialize, Serialize};

/// Maximum accepted message length, in characters
pub const MAX_MESSAGE_CHARS: usize = 10_000;

fn default_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// One conversation turn as exchanged with clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Turn role
    pub role: EngineRole,
    /// Visible content
    pub content: String,
    /// Reasoning text (thinking-mode assistant turns)
    #[serde(default)]
    pub thoughts: Option<String>,
    /// Creation timestamp, defaults to receipt time
    #[serde(default = "default_timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl From<ChatMessage> for ChatTurn {
    fn from(message: ChatMessage) -> Self {
        ChatTurn {
            role: message.role,
            content: message.content,
            thoughts: message.thoughts,
            timestamp: message.timestamp,
        }
    }
}

/// Chat request body
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    /// The message to send
    pub message: String,
    /// Conversation history for context
    #[serde(default)]
    pub history: Vec<ChatMessage>,
    /// Enable thinking mode to surface the assistant's reasoning
    #[serde(default)]
    pub thinking_mode: bool,
}

/// One failed request-body constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Offending field
    pub field: &'static str,
    /// Human-readable constraint description
    pub message: String,
}

impl ChatRequest {
    /// Validate body constraints before any adapter runs
    pub fn validate(&self) -> Result<(), ValidationIssue> {
        let length = self.message.chars().count();
        if length == 0 {
            return Err(ValidationIssue {
                field: "message",
                message: "must not be empty".to_string(),
            });
        }
        if length > MAX_MESSAGE_CHARS {
            return Err(ValidationIssue {
                field: "message",
                message: format!("must be at most {MAX_MESSAGE_CHARS} characters, got {length}"),
            });
        }
        Ok(())
    }

    /// Convert caller-supplied history into engine turns
    pub fn history_turns(&self) -> Vec<ChatTurn> {
        self.history.iter().cloned().map(ChatTurn::from).collect()
    }
}

/// Chat response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// The assistant's response
    pub content: String,
    /// Reasoning text (present only when thinking mode was requested)
    pub thoughts: Option<String>,
    /// Response timestamp
    pub timestamp: DateTime<Utc>,
}

impl From<AggregateResponse> for ChatResponse {
    fn from(response: AggregateResponse) -> Self {
        ChatResponse {
            content: response.content,
            thoughts: response.thoughts,
            timestamp: response.timestamp,
        }
    }
}

/// Streaming response chunk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamChunk {
    /// Answer text delta
    pub content: Option<String>,
    /// Reasoning text delta
    pub thoughts: Option<String>,
    /// Whether this is the final chunk
    pub is_final: bool,
}

impl From<StreamFragment> for StreamChunk {
    fn from(fragment: StreamFragment) -> Self {
        StreamChunk {
            content: Some(fragment.content),
            thoughts: fragment.thoughts,
            is_final: fragment.is_final,
        }
    }
}

/// Error response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Detailed error information
    pub detail: Option<String>,
    /// Machine-readable error code
    pub code: Option<String>,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Service version string
    pub version: String,
    /// CORS origins allowed to call the API
    pub allowed_origins: Vec<String>,
}
