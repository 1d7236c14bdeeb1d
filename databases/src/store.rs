//! SQLite chat store
//!
//! Connection management, schema creation, and CRUD for chat sessions and
//! messages. Messages are soft-deleted; sessions carry an active flag and
//! an `updated_at` touched on every append.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::str::FromStr;
use tracing::info;
use uuid::Uuid;

/// Store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Stored value could not be decoded
    #[error("Invalid stored value: {0}")]
    Decode(String),
}

/// Chat session record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSession {
    /// Unique identifier
    pub id: Uuid,
    /// Optional human-readable title
    pub title: Option<String>,
    /// Owner identifier (reserved for future auth)
    pub user_id: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
    /// Whether the session is active
    pub is_active: bool,
}

/// Stored chat message record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMessage {
    /// Unique identifier
    pub id: Uuid,
    /// Owning session
    pub session_id: Uuid,
    /// Message role (user, assistant, system)
    pub role: String,
    /// Visible content
    pub content: String,
    /// Reasoning text (thinking-mode assistant messages)
    pub thoughts: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Soft-delete flag
    pub is_deleted: bool,
}

/// SQLite-backed chat store
pub struct ChatStore {
    /// Connection pool
    pool: SqlitePool,
}

impl ChatStore {
    /// Connect to the database, creating the file if missing
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        info!(url = %database_url, "connecting chat store");
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    /// Create tables if they do not exist
    pub async fn init_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS chat_sessions (
                id TEXT PRIMARY KEY,
                title TEXT,
                user_id TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                is_active INTEGER NOT NULL DEFAULT 1
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS chat_messages (
                id TEXT PRIMARY KEY,
                session_id TEXT NOT NULL,
                role TEXT NOT NULL,
                content TEXT NOT NULL,
                thoughts TEXT,
                created_at TEXT NOT NULL,
                is_deleted INTEGER NOT NULL DEFAULT 0
            )",
        )
        .execute(&self.pool)
        .await?;

        info!("chat store schema initialized");
        Ok(())
    }

    /// Create a new session
    pub async fn create_session(&self, title: Option<&str>) -> Result<ChatSession, StoreError> {
        let session = ChatSession {
            id: Uuid::new_v4(),
            title: title.map(str::to_string),
            user_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            is_active: true,
        };

        sqlx::query(
            "INSERT INTO chat_sessions (id, title, user_id, created_at, updated_at, is_active)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(session.id.to_string())
        .bind(&session.title)
        .bind(&session.user_id)
        .bind(session.created_at)
        .bind(session.updated_at)
        .bind(session.is_active)
        .execute(&self.pool)
        .await?;

        Ok(session)
    }

    /// Fetch a session by id
    pub async fn get_session(&self, id: Uuid) -> Result<Option<ChatSession>, StoreError> {
        let row = sqlx::query(
            "SELECT id, title, user_id, created_at, updated_at, is_active
             FROM chat_sessions WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(session_from_row).transpose()
    }

    /// Append a message to a session and touch its `updated_at`
    pub async fn append_message(
        &self,
        session_id: Uuid,
        role: &str,
        content: &str,
        thoughts: Option<&str>,
    ) -> Result<StoredMessage, StoreError> {
        let message = StoredMessage {
            id: Uuid::new_v4(),
            session_id,
            role: role.to_string(),
            content: content.to_string(),
            thoughts: thoughts.map(str::to_string),
            created_at: Utc::now(),
            is_deleted: false,
        };

        sqlx::query(
            "INSERT INTO chat_messages (id, session_id, role, content, thoughts, created_at, is_deleted)
             VALUES (?, ?, ?, ?, ?, ?, 0)",
        )
        .bind(message.id.to_string())
        .bind(message.session_id.to_string())
        .bind(&message.role)
        .bind(&message.content)
        .bind(&message.thoughts)
        .bind(message.created_at)
        .execute(&self.pool)
        .await?;

        sqlx::query("UPDATE chat_sessions SET updated_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(session_id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(message)
    }

    /// List a session's messages, oldest first, excluding soft-deleted ones
    pub async fn session_messages(
        &self,
        session_id: Uuid,
    ) -> Result<Vec<StoredMessage>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, session_id, role, content, thoughts, created_at, is_deleted
             FROM chat_messages
             WHERE session_id = ? AND is_deleted = 0
             ORDER BY created_at ASC",
        )
        .bind(session_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(message_from_row).collect()
    }

    /// Soft-delete a message
    pub async fn delete_message(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE chat_messages SET is_deleted = 1 WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List active sessions, most recently updated first
    pub async fn list_sessions(&self) -> Result<Vec<ChatSession>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, title, user_id, created_at, updated_at, is_active
             FROM chat_sessions
             WHERE is_active = 1
             ORDER BY updated_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(session_from_row).collect()
    }
}

fn parse_uuid(value: String) -> Result<Uuid, StoreError> {
    Uuid::parse_str(&value).map_err(|e| StoreError::Decode(format!("bad uuid '{value}': {e}")))
}

fn session_from_row(row: sqlx::sqlite::SqliteRow) -> Result<ChatSession, StoreError> {
    Ok(ChatSession {
        id: parse_uuid(row.try_get("id")?)?,
        title: row.try_get("title")?,
        user_id: row.try_get("user_id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        is_active: row.try_get("is_active")?,
    })
}

fn message_from_row(row: sqlx::sqlite::SqliteRow) -> Result<StoredMessage, StoreError> {
    Ok(StoredMessage {
        id: parse_uuid(row.try_get("id")?)?,
        session_id: parse_uuid(row.try_get("session_id")?)?,
        role: row.try_get("role")?,
        content: row.try_get("content")?,
        thoughts: row.try_get("thoughts")?,
        created_at: row.try_get("created_at")?,
        is_deleted: row.try_get("is_deleted")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn temp_store() -> (TempDir, ChatStore) {
        let dir = TempDir::new().unwrap();
        let url = format!("sqlite://{}/chat.db", dir.path().display());
        let store = ChatStore::connect(&url).await.unwrap();
        store.init_schema().await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_schema_init_is_idempotent() {
        let (_dir, store) = temp_store().await;
        store.init_schema().await.unwrap();
    }

    #[tokio::test]
    async fn test_session_roundtrip() {
        let (_dir, store) = temp_store().await;

        let session = store.create_session(Some("First chat")).await.unwrap();
        let fetched = store.get_session(session.id).await.unwrap().unwrap();
        assert_eq!(fetched.id, session.id);
        assert_eq!(fetched.title.as_deref(), Some("First chat"));
        assert!(fetched.is_active);

        assert!(store.get_session(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_append_and_list_messages() {
        let (_dir, store) = temp_store().await;
        let session = store.create_session(None).await.unwrap();

        store
            .append_message(session.id, "user", "Hello", None)
            .await
            .unwrap();
        store
            .append_message(session.id, "assistant", "Hi there!", Some("pondering"))
            .await
            .unwrap();

        let messages = store.session_messages(session.id).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "user");
        assert_eq!(messages[1].content, "Hi there!");
        assert_eq!(messages[1].thoughts.as_deref(), Some("pondering"));

        // Appending touches the session
        let touched = store.get_session(session.id).await.unwrap().unwrap();
        assert!(touched.updated_at >= session.updated_at);
    }

    #[tokio::test]
    async fn test_soft_delete_hides_message() {
        let (_dir, store) = temp_store().await;
        let session = store.create_session(None).await.unwrap();
        let message = store
            .append_message(session.id, "user", "Hello", None)
            .await
            .unwrap();

        assert!(store.delete_message(message.id).await.unwrap());
        assert!(store.session_messages(session.id).await.unwrap().is_empty());
        assert!(!store.delete_message(Uuid::new_v4()).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_sessions_active_only() {
        let (_dir, store) = temp_store().await;
        store.create_session(Some("a")).await.unwrap();
        store.create_session(Some("b")).await.unwrap();

        let sessions = store.list_sessions().await.unwrap();
        assert_eq!(sessions.len(), 2);
    }
}
