//! Huginn core: chat relay between callers and the Gemini text engine.
//!
//! This crate holds the engine client, the response normalizer, and the
//! streaming/non-streaming chat adapters. The HTTP layer lives in
//! `huginn-api`; persistence in `huginn-databases`.

pub mod chat;
pub mod engine;
pub mod normalize;

// Re-export the types the HTTP layer works with
pub use chat::{ChatService, EngineConfig, FragmentStream, StreamEvent};
pub use engine::{ChatTurn, EngineError, EngineRole, GeminiEngine};
pub use normalize::{AggregateResponse, StreamFragment};
