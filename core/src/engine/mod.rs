//! Engine client for the Gemini text-generation API.
//!
//! Narrow contract over the external engine: role-tagged conversation turns
//! go in, candidate parts come out. Each part carries an explicit `thought`
//! marker so the normalizer never has to probe for one.

pub mod gemini;
pub mod transport;
pub mod transport_fake;
pub mod transport_types;
pub mod transport_ureq;

// Re-export common types
pub use gemini::GeminiEngine;
pub use transport::Transport;
pub use transport_fake::FakeTransport;
pub use transport_types::{EngineError, SyncTransport};
pub use transport_ureq::UreqTransport;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Conversation role (universal subset)
///
/// The engine itself only distinguishes "user" and "model" turns; system
/// turns are folded into the user side when a request is built.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EngineRole {
    /// System message (sets behavior/context)
    System,
    /// User message (human input)
    User,
    /// Assistant message (engine response)
    Assistant,
}

/// One turn in a conversation
///
/// `thoughts` is present only on assistant turns produced under thinking
/// mode; it is never sent back to the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    /// Turn role
    pub role: EngineRole,
    /// Visible utterance
    pub content: String,
    /// Reasoning text (assistant turns under thinking mode)
    pub thoughts: Option<String>,
    /// Creation time
    pub timestamp: DateTime<Utc>,
}

impl ChatTurn {
    /// Create a user turn timestamped now
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: EngineRole::User,
            content: content.into(),
            thoughts: None,
            timestamp: Utc::now(),
        }
    }
}

/// One part of an engine reply
///
/// `thought` marks reasoning text produced under thinking mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnginePart {
    /// Part text (may be empty)
    pub text: String,
    /// Whether this part is reasoning rather than answer text
    pub thought: bool,
}

/// One incremental unit from the streaming call
///
/// A chunk with no parts is valid; the normalizer treats it as a no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineChunk {
    /// Parts carried by this chunk
    pub parts: Vec<EnginePart>,
}

/// Generation parameters submitted with every request
///
/// Values are fixed by policy; only the thinking toggle varies per request.
#[derive(Debug, Clone, Copy)]
pub struct GenerationParams {
    /// Sampling temperature
    pub temperature: f64,
    /// Maximum output size in tokens
    pub max_output_tokens: u32,
    /// Nucleus sampling threshold
    pub top_p: f64,
    /// Top-k sampling cutoff
    pub top_k: u32,
    /// Ask the engine to include reasoning-marked parts
    pub include_thoughts: bool,
}

impl GenerationParams {
    /// Policy parameters, with or without thinking mode
    pub fn policy(include_thoughts: bool) -> Self {
        Self {
            temperature: 0.7,
            max_output_tokens: 2048,
            top_p: 0.8,
            top_k: 10,
            include_thoughts,
        }
    }
}
