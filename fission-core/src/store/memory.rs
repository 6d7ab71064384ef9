use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ChatStore, StoreError};
use crate::models::{ChatMessage, ChatSession, ChatType, NewMessage, User};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    sessions: Vec<ChatSession>,
    messages: Vec<ChatMessage>,
    last_stamp: Option<DateTime<Utc>>,
}

impl Tables {
    /// Strictly increasing timestamps, so insertion order is also `created_at` order.
    fn next_stamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let stamp = match self.last_stamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_stamp = Some(stamp);
        stamp
    }

    fn has_messages(&self, session_id: Uuid) -> bool {
        self.messages.iter().any(|m| m.session_id == session_id)
    }
}

/// In-process `ChatStore` with the same ordering and conflict rules as the
/// Postgres tables (unique user email, messages require an existing session).
#[derive(Default)]
pub struct MemoryChatStore {
    tables: RwLock<Tables>,
}

impl MemoryChatStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the mirrored `users` table.
    pub async fn users(&self) -> Vec<User> {
        let tables = self.tables.read().await;
        let mut users: Vec<User> = tables.users.values().cloned().collect();
        users.sort_by(|a, b| a.email.cmp(&b.email));
        users
    }
}

#[async_trait]
impl ChatStore for MemoryChatStore {
    async fn upsert_user(&self, user: &User) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let email_taken = tables
            .users
            .values()
            .any(|u| u.email == user.email && u.id != user.id);
        if email_taken {
            return Err(StoreError::Conflict(format!(
                "duplicate key value violates unique constraint \"users_email_key\": {}",
                user.email
            )));
        }
        tables.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn insert_session(
        &self,
        user_id: Uuid,
        chat_type: ChatType,
        title: &str,
    ) -> Result<ChatSession, StoreError> {
        let mut tables = self.tables.write().await;
        let now = tables.next_stamp();
        let session = ChatSession {
            id: Uuid::new_v4(),
            user_id,
            chat_type,
            title: title.to_string(),
            created_at: now,
            updated_at: now,
        };
        tables.sessions.push(session.clone());
        Ok(session)
    }

    async fn find_empty_session(
        &self,
        user_id: Uuid,
        chat_type: ChatType,
    ) -> Result<Option<ChatSession>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .sessions
            .iter()
            .filter(|s| s.user_id == user_id && s.chat_type == chat_type)
            .filter(|s| !tables.has_messages(s.id))
            .max_by_key(|s| s.updated_at)
            .cloned())
    }

    async fn list_sessions(&self, user_id: Uuid) -> Result<Vec<ChatSession>, StoreError> {
        let tables = self.tables.read().await;
        let mut sessions: Vec<ChatSession> = tables
            .sessions
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(sessions)
    }

    async fn touch_session(
        &self,
        session_id: Uuid,
        title: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let session = tables
            .sessions
            .iter_mut()
            .find(|s| s.id == session_id)
            .ok_or(StoreError::NotFound {
                entity: "chat session",
                id: session_id,
            })?;
        session.title = title.to_string();
        session.updated_at = updated_at;
        Ok(())
    }

    async fn insert_message(&self, message: NewMessage) -> Result<ChatMessage, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.sessions.iter().any(|s| s.id == message.session_id) {
            return Err(StoreError::NotFound {
                entity: "chat session",
                id: message.session_id,
            });
        }
        let created_at = tables.next_stamp();
        let stored = ChatMessage {
            id: Uuid::new_v4(),
            session_id: message.session_id,
            role: message.role,
            content: message.content,
            created_at,
        };
        tables.messages.push(stored.clone());
        Ok(stored)
    }

    async fn list_messages(&self, session_id: Uuid) -> Result<Vec<ChatMessage>, StoreError> {
        let tables = self.tables.read().await;
        let mut messages: Vec<ChatMessage> = tables
            .messages
            .iter()
            .filter(|m| m.session_id == session_id)
            .cloned()
            .collect();
        messages.sort_by_key(|m| m.created_at);
        Ok(messages)
    }

    async fn ping(&self) -> Result<String, StoreError> {
        Ok(format!("memory store {}", env!("CARGO_PKG_VERSION")))
    }

    fn name(&self) -> &str {
        "memory"
    }
}
