//! Row store for users, chat sessions and chat messages.
//!
//! Provides a `ChatStore` trait with implementations for:
//! - **Postgres**: the `users` / `chat_sessions` / `chat_messages` tables via sqlx
//! - **Memory**: an in-process table set for local runs and tests

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::config::{DatabaseConfig, StoreBackend};
use crate::models::{ChatMessage, ChatSession, ChatType, NewMessage, User, NEW_CHAT_TITLE};

pub mod memory;
pub mod postgres;

pub use memory::MemoryChatStore;
pub use postgres::PgChatStore;

/// PostgreSQL SQLSTATE for `unique_violation`.
pub const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("invalid persisted data: {0}")]
    InvalidData(String),
}

impl StoreError {
    /// Map a sqlx error, keeping unique violations distinguishable.
    pub fn classify(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.code().as_deref() == Some(UNIQUE_VIOLATION) {
                return Self::Conflict(db.message().to_string());
            }
        }
        Self::Database(err)
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

// ============================================================================
// ChatStore trait
// ============================================================================

/// Record-level access to the three chat tables.
#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Insert or update the mirrored user record, keyed by id.
    async fn upsert_user(&self, user: &User) -> Result<(), StoreError>;

    async fn insert_session(
        &self,
        user_id: Uuid,
        chat_type: ChatType,
        title: &str,
    ) -> Result<ChatSession, StoreError>;

    /// Most recently updated session of this user and chat type with no messages.
    async fn find_empty_session(
        &self,
        user_id: Uuid,
        chat_type: ChatType,
    ) -> Result<Option<ChatSession>, StoreError>;

    /// All sessions of the user, most recently updated first.
    async fn list_sessions(&self, user_id: Uuid) -> Result<Vec<ChatSession>, StoreError>;

    /// Set a session's title and `updated_at`.
    async fn touch_session(
        &self,
        session_id: Uuid,
        title: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    async fn insert_message(&self, message: NewMessage) -> Result<ChatMessage, StoreError>;

    /// Messages of a session, oldest first.
    async fn list_messages(&self, session_id: Uuid) -> Result<Vec<ChatMessage>, StoreError>;

    /// Backend version string for health checks.
    async fn ping(&self) -> Result<String, StoreError>;

    /// Reuse an empty session for (user, chat type), or create one.
    async fn ensure_session(
        &self,
        user_id: Uuid,
        chat_type: ChatType,
    ) -> Result<ChatSession, StoreError> {
        match self.find_empty_session(user_id, chat_type).await? {
            Some(session) => Ok(session),
            None => self.insert_session(user_id, chat_type, NEW_CHAT_TITLE).await,
        }
    }

    /// Backend name for logging.
    fn name(&self) -> &str;
}

/// Create the configured store. Connects the pool for the Postgres backend.
pub async fn create_store(config: &DatabaseConfig) -> Result<Arc<dyn ChatStore>, StoreError> {
    match config.backend {
        StoreBackend::Postgres => {
            let pool = crate::db::create_pool(config).await?;
            Ok(Arc::new(PgChatStore::new(pool)))
        }
        StoreBackend::Memory => Ok(Arc::new(MemoryChatStore::new())),
    }
}
