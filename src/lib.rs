//! Huginn: chat relay backend for the Gemini text engine
//!
//! The binary wires settings, the chat store, and the API server together.
//! Core behavior lives in the member crates: `huginn-core` (engine client,
//! normalizer, adapters), `huginn-api` (HTTP layer), `huginn-databases`
//! (chat store).

pub mod settings;

pub use settings::Settings;
