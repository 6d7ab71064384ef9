use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{ChatStore, StoreError};
use crate::models::{ChatMessage, ChatSession, ChatType, NewMessage, Role, User};

/// `ChatStore` over the PostgreSQL chat tables.
#[derive(Clone)]
pub struct PgChatStore {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    id: Uuid,
    user_id: Uuid,
    chat_type: String,
    title: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SessionRow> for ChatSession {
    type Error = StoreError;

    fn try_from(row: SessionRow) -> Result<Self, Self::Error> {
        let chat_type = row
            .chat_type
            .parse::<ChatType>()
            .map_err(|e| StoreError::InvalidData(e.to_string()))?;
        Ok(ChatSession {
            id: row.id,
            user_id: row.user_id,
            chat_type,
            title: row.title,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct MessageRow {
    id: Uuid,
    session_id: Uuid,
    role: String,
    content: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<MessageRow> for ChatMessage {
    type Error = StoreError;

    fn try_from(row: MessageRow) -> Result<Self, Self::Error> {
        let role = row.role.parse::<Role>().map_err(StoreError::InvalidData)?;
        Ok(ChatMessage {
            id: row.id,
            session_id: row.session_id,
            role,
            content: row.content,
            created_at: row.created_at,
        })
    }
}

impl PgChatStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ChatStore for PgChatStore {
    async fn upsert_user(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO users (id, email) VALUES ($1, $2)
             ON CONFLICT (id) DO UPDATE SET email = EXCLUDED.email",
        )
        .bind(user.id)
        .bind(&user.email)
        .execute(&self.pool)
        .await
        .map_err(StoreError::classify)?;
        Ok(())
    }

    async fn insert_session(
        &self,
        user_id: Uuid,
        chat_type: ChatType,
        title: &str,
    ) -> Result<ChatSession, StoreError> {
        let row: SessionRow = sqlx::query_as(
            "INSERT INTO chat_sessions (user_id, chat_type, title)
             VALUES ($1, $2, $3)
             RETURNING id, user_id, chat_type, title, created_at, updated_at",
        )
        .bind(user_id)
        .bind(chat_type.as_str())
        .bind(title)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::classify)?;

        row.try_into()
    }

    async fn find_empty_session(
        &self,
        user_id: Uuid,
        chat_type: ChatType,
    ) -> Result<Option<ChatSession>, StoreError> {
        let row: Option<SessionRow> = sqlx::query_as(
            r#"
            SELECT s.id, s.user_id, s.chat_type, s.title, s.created_at, s.updated_at
            FROM chat_sessions s
            WHERE s.user_id = $1
              AND s.chat_type = $2
              AND NOT EXISTS (SELECT 1 FROM chat_messages m WHERE m.session_id = s.id)
            ORDER BY s.updated_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(chat_type.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(ChatSession::try_from).transpose()
    }

    async fn list_sessions(&self, user_id: Uuid) -> Result<Vec<ChatSession>, StoreError> {
        let rows: Vec<SessionRow> = sqlx::query_as(
            "SELECT id, user_id, chat_type, title, created_at, updated_at
             FROM chat_sessions
             WHERE user_id = $1
             ORDER BY updated_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ChatSession::try_from).collect()
    }

    async fn touch_session(
        &self,
        session_id: Uuid,
        title: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE chat_sessions SET title = $2, updated_at = $3 WHERE id = $1")
            .bind(session_id)
            .bind(title)
            .bind(updated_at)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "chat session",
                id: session_id,
            });
        }
        Ok(())
    }

    async fn insert_message(&self, message: NewMessage) -> Result<ChatMessage, StoreError> {
        // created_at is the ordering key: wall-clock time, not transaction start
        let row: MessageRow = sqlx::query_as(
            "INSERT INTO chat_messages (session_id, role, content, created_at)
             VALUES ($1, $2, $3, clock_timestamp())
             RETURNING id, session_id, role, content, created_at",
        )
        .bind(message.session_id)
        .bind(message.role.as_str())
        .bind(&message.content)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::classify)?;

        row.try_into()
    }

    async fn list_messages(&self, session_id: Uuid) -> Result<Vec<ChatMessage>, StoreError> {
        let rows: Vec<MessageRow> = sqlx::query_as(
            "SELECT id, session_id, role, content, created_at
             FROM chat_messages
             WHERE session_id = $1
             ORDER BY created_at ASC",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ChatMessage::try_from).collect()
    }

    async fn ping(&self) -> Result<String, StoreError> {
        Ok(crate::db::health_check(&self.pool).await?)
    }

    fn name(&self) -> &str {
        "postgres"
    }
}
