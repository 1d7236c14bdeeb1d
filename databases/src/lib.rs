//! Huginn databases module
//!
//! Relational storage of chat history: sessions and their messages, backed
//! by SQLite through sqlx. The chat routes themselves do not write here —
//! the store is the compatibility layer the service initializes at startup.

pub mod store;

pub use store::{ChatSession, ChatStore, StoredMessage, StoreError};
