//! Dashboard controller.
//!
//! Holds one slot per chat type (`{session_id, messages}`) for a signed-in user
//! and keeps it in step with the `ChatStore`. Store failures are logged and end
//! the operation without touching local state; nothing is retried.
//!
//! Each send schedules a placeholder assistant reply on its own task. Pending
//! replies are kept per slot with a cancellation token and cancelled whenever
//! that slot is replaced, and on `shutdown()`.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::ChatConfig;
use crate::models::{truncate_title, ChatMessage, ChatType, NewMessage, User};
use crate::store::{ChatStore, StoreError};

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("message is empty")]
    EmptyMessage,

    #[error("no {chat_type} session {session_id} for this user")]
    SessionNotFound {
        session_id: Uuid,
        chat_type: ChatType,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// In-memory view of one chat type's conversation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub session_id: Option<Uuid>,
    pub messages: Vec<ChatMessage>,
}

impl Slot {
    fn fresh(session_id: Uuid) -> Self {
        Self {
            session_id: Some(session_id),
            messages: Vec::new(),
        }
    }
}

/// Stand-in assistant text until a model backend is connected.
pub fn placeholder_reply(chat_type: ChatType) -> String {
    format!(
        "This is a placeholder response from the {chat_type}. Connect your API key to enable real responses."
    )
}

struct PendingReply {
    session_id: Uuid,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct DashboardState {
    slots: BTreeMap<ChatType, Slot>,
    pending: HashMap<ChatType, Vec<PendingReply>>,
}

impl DashboardState {
    fn slot_mut(&mut self, chat_type: ChatType) -> &mut Slot {
        self.slots.entry(chat_type).or_default()
    }

    fn replace_slot(&mut self, chat_type: ChatType, slot: Slot) {
        self.cancel_pending(chat_type);
        self.slots.insert(chat_type, slot);
    }

    fn cancel_pending(&mut self, chat_type: ChatType) {
        for reply in self.pending.remove(&chat_type).unwrap_or_default() {
            if !reply.handle.is_finished() {
                tracing::debug!(%chat_type, session_id = %reply.session_id, "Cancelling pending reply");
            }
            reply.cancel.cancel();
        }
    }

    fn track(&mut self, chat_type: ChatType, reply: PendingReply) {
        let pending = self.pending.entry(chat_type).or_default();
        pending.retain(|r| !r.handle.is_finished());
        pending.push(reply);
    }
}

pub struct Dashboard {
    user: User,
    store: Arc<dyn ChatStore>,
    config: ChatConfig,
    state: Arc<Mutex<DashboardState>>,
}

impl Dashboard {
    pub fn new(user: User, store: Arc<dyn ChatStore>, config: ChatConfig) -> Self {
        Self {
            user,
            store,
            config,
            state: Arc::new(Mutex::new(DashboardState::default())),
        }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    /// Point every slot at an empty session, reusing an existing empty one
    /// per chat type when there is one.
    pub async fn initialize(&self) {
        for chat_type in ChatType::ALL {
            match self.store.ensure_session(self.user.id, chat_type).await {
                Ok(session) => {
                    tracing::debug!(%chat_type, session_id = %session.id, "Slot initialized");
                    self.state
                        .lock()
                        .await
                        .replace_slot(chat_type, Slot::fresh(session.id));
                }
                Err(e) => {
                    tracing::error!(%chat_type, error = %e, "Error creating chat session");
                }
            }
        }
    }

    /// Open a brand-new session in the slot.
    pub async fn start_new_chat(&self, chat_type: ChatType) -> Result<Slot, DashboardError> {
        let session = self
            .store
            .insert_session(self.user.id, chat_type, crate::models::NEW_CHAT_TITLE)
            .await
            .inspect_err(|e| {
                tracing::error!(%chat_type, error = %e, "Error creating chat session");
            })?;

        let slot = Slot::fresh(session.id);
        self.state.lock().await.replace_slot(chat_type, slot.clone());
        Ok(slot)
    }

    /// Replace the slot with a stored session and its history.
    ///
    /// The session must belong to this user and to `chat_type`.
    pub async fn load_session(
        &self,
        session_id: Uuid,
        chat_type: ChatType,
    ) -> Result<Slot, DashboardError> {
        let owned = self
            .store
            .list_sessions(self.user.id)
            .await
            .inspect_err(|e| {
                tracing::error!(%chat_type, %session_id, error = %e, "Error loading chat session");
            })?
            .iter()
            .any(|s| s.id == session_id && s.chat_type == chat_type);
        if !owned {
            tracing::warn!(%chat_type, %session_id, user_id = %self.user.id, "Refusing to load foreign session");
            return Err(DashboardError::SessionNotFound {
                session_id,
                chat_type,
            });
        }

        let messages = self.store.list_messages(session_id).await.inspect_err(|e| {
            tracing::error!(%chat_type, %session_id, error = %e, "Error loading chat session");
        })?;

        let slot = Slot {
            session_id: Some(session_id),
            messages,
        };
        self.state.lock().await.replace_slot(chat_type, slot.clone());
        tracing::info!(%chat_type, %session_id, count = slot.messages.len(), "Session loaded");
        Ok(slot)
    }

    /// Persist and append the user's message, then schedule the assistant reply.
    ///
    /// Blank text is rejected before any store call. A slot without a session
    /// gets one titled after the text.
    pub async fn send_message(
        &self,
        chat_type: ChatType,
        text: &str,
    ) -> Result<ChatMessage, DashboardError> {
        if text.trim().is_empty() {
            return Err(DashboardError::EmptyMessage);
        }

        let existing = self
            .state
            .lock()
            .await
            .slots
            .get(&chat_type)
            .and_then(|slot| slot.session_id);

        let session_id = match existing {
            Some(id) => id,
            None => {
                let title = truncate_title(text, self.config.title_max_chars);
                self.store
                    .insert_session(self.user.id, chat_type, &title)
                    .await
                    .inspect_err(|e| {
                        tracing::error!(%chat_type, error = %e, "Error creating chat session");
                    })?
                    .id
            }
        };

        let message = self
            .store
            .insert_message(NewMessage::user(session_id, text))
            .await
            .inspect_err(|e| {
                tracing::error!(%chat_type, %session_id, error = %e, "Error saving message");
            })?;

        let mut state = self.state.lock().await;
        let slot = state.slot_mut(chat_type);
        match slot.session_id {
            Some(current) if current != session_id => {
                // slot was replaced while the message was being saved
                tracing::debug!(%chat_type, %session_id, "Slot moved on, dropping exchange");
                return Ok(message);
            }
            _ => {
                slot.session_id = Some(session_id);
                slot.messages.push(message.clone());
            }
        }

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(deliver_reply(
            Arc::clone(&self.store),
            Arc::clone(&self.state),
            self.config.clone(),
            chat_type,
            session_id,
            text.to_string(),
            cancel.clone(),
        ));
        state.track(
            chat_type,
            PendingReply {
                session_id,
                cancel,
                handle,
            },
        );

        Ok(message)
    }

    pub async fn slot(&self, chat_type: ChatType) -> Slot {
        self.state
            .lock()
            .await
            .slots
            .get(&chat_type)
            .cloned()
            .unwrap_or_default()
    }

    /// All three slots, in dashboard order.
    pub async fn slots(&self) -> BTreeMap<ChatType, Slot> {
        let state = self.state.lock().await;
        ChatType::ALL
            .iter()
            .map(|ct| (*ct, state.slots.get(ct).cloned().unwrap_or_default()))
            .collect()
    }

    /// Replies scheduled for the slot that have not finished yet.
    pub async fn pending_replies(&self, chat_type: ChatType) -> usize {
        self.state
            .lock()
            .await
            .pending
            .get(&chat_type)
            .map(|p| p.iter().filter(|r| !r.handle.is_finished()).count())
            .unwrap_or(0)
    }

    /// Cancel every pending reply and wait for the tasks to wind down.
    pub async fn shutdown(&self) {
        let handles: Vec<JoinHandle<()>> = {
            let mut state = self.state.lock().await;
            state
                .pending
                .drain()
                .flat_map(|(_, replies)| replies)
                .map(|reply| {
                    reply.cancel.cancel();
                    reply.handle
                })
                .collect()
        };

        for handle in handles {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "Reply task ended abnormally");
            }
        }
        tracing::info!(user_id = %self.user.id, "Dashboard shut down");
    }
}

/// Wait out the reply delay, then persist and append the placeholder reply and
/// stamp the session with the user's text as title.
async fn deliver_reply(
    store: Arc<dyn ChatStore>,
    state: Arc<Mutex<DashboardState>>,
    config: ChatConfig,
    chat_type: ChatType,
    session_id: Uuid,
    user_text: String,
    cancel: CancellationToken,
) {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            tracing::debug!(%chat_type, %session_id, "Reply cancelled before delivery");
            return;
        }
        _ = tokio::time::sleep(Duration::from_millis(config.reply_delay_ms)) => {}
    }

    let reply = match store
        .insert_message(NewMessage::assistant(session_id, placeholder_reply(chat_type)))
        .await
    {
        Ok(reply) => reply,
        Err(e) => {
            tracing::error!(%chat_type, %session_id, error = %e, "Error saving assistant message");
            return;
        }
    };

    {
        let mut state = state.lock().await;
        let slot = state.slot_mut(chat_type);
        if !cancel.is_cancelled() && slot.session_id == Some(session_id) {
            slot.messages.push(reply);
        } else {
            tracing::debug!(%chat_type, %session_id, "Slot moved on, reply not shown");
        }
    }

    let title = truncate_title(&user_text, config.title_max_chars);
    if let Err(e) = store.touch_session(session_id, &title, Utc::now()).await {
        tracing::error!(%chat_type, %session_id, error = %e, "Error updating chat session");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChatSession, Role, NEW_CHAT_TITLE};
    use crate::store::MemoryChatStore;
    use async_trait::async_trait;
    use chrono::DateTime;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Memory store that counts calls and can be switched to fail writes.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryChatStore,
        calls: AtomicUsize,
        fail_writes: AtomicBool,
        fail_reads: AtomicBool,
    }

    impl FlakyStore {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn write(&self) -> Result<(), StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(StoreError::InvalidData("write refused".to_string()));
            }
            Ok(())
        }

        fn read(&self) -> Result<(), StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_reads.load(Ordering::SeqCst) {
                return Err(StoreError::InvalidData("read refused".to_string()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl ChatStore for FlakyStore {
        async fn upsert_user(&self, user: &User) -> Result<(), StoreError> {
            self.write()?;
            self.inner.upsert_user(user).await
        }

        async fn insert_session(
            &self,
            user_id: Uuid,
            chat_type: ChatType,
            title: &str,
        ) -> Result<ChatSession, StoreError> {
            self.write()?;
            self.inner.insert_session(user_id, chat_type, title).await
        }

        async fn find_empty_session(
            &self,
            user_id: Uuid,
            chat_type: ChatType,
        ) -> Result<Option<ChatSession>, StoreError> {
            self.read()?;
            self.inner.find_empty_session(user_id, chat_type).await
        }

        async fn list_sessions(&self, user_id: Uuid) -> Result<Vec<ChatSession>, StoreError> {
            self.read()?;
            self.inner.list_sessions(user_id).await
        }

        async fn touch_session(
            &self,
            session_id: Uuid,
            title: &str,
            updated_at: DateTime<Utc>,
        ) -> Result<(), StoreError> {
            self.write()?;
            self.inner.touch_session(session_id, title, updated_at).await
        }

        async fn insert_message(&self, message: NewMessage) -> Result<ChatMessage, StoreError> {
            self.write()?;
            self.inner.insert_message(message).await
        }

        async fn list_messages(&self, session_id: Uuid) -> Result<Vec<ChatMessage>, StoreError> {
            self.read()?;
            self.inner.list_messages(session_id).await
        }

        async fn ping(&self) -> Result<String, StoreError> {
            self.inner.ping().await
        }

        fn name(&self) -> &str {
            "flaky"
        }
    }

    fn config() -> ChatConfig {
        ChatConfig {
            reply_delay_ms: 500,
            title_max_chars: 50,
        }
    }

    fn dashboard() -> (Dashboard, Arc<FlakyStore>) {
        let store = Arc::new(FlakyStore::default());
        let user = User::new(Uuid::new_v4(), "nia@example.com");
        (Dashboard::new(user, store.clone(), config()), store)
    }

    async fn wait_for_messages(dashboard: &Dashboard, chat_type: ChatType, count: usize) {
        for _ in 0..100 {
            if dashboard.slot(chat_type).await.messages.len() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_initialize_gives_every_slot_an_empty_session() {
        let (dashboard, _store) = dashboard();
        dashboard.initialize().await;

        let slots = dashboard.slots().await;
        assert_eq!(slots.len(), 3);
        for (_, slot) in slots {
            assert!(slot.session_id.is_some());
            assert!(slot.messages.is_empty());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_reinitialize_reuses_empty_sessions() {
        let (dashboard, store) = dashboard();
        dashboard.initialize().await;
        let first = dashboard.slots().await;

        dashboard.initialize().await;
        let second = dashboard.slots().await;

        assert_eq!(first, second);
        let sessions = store.inner.list_sessions(dashboard.user().id).await.unwrap();
        assert_eq!(sessions.len(), 3);
        assert!(sessions.iter().all(|s| s.title == NEW_CHAT_TITLE));
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_appends_user_then_assistant_after_delay() {
        let (dashboard, _store) = dashboard();
        dashboard.initialize().await;
        let session_id = dashboard.slot(ChatType::Coder).await.session_id.unwrap();

        dashboard
            .send_message(ChatType::Coder, "How do lifetimes work?")
            .await
            .unwrap();

        let slot = dashboard.slot(ChatType::Coder).await;
        assert_eq!(slot.messages.len(), 1);
        assert_eq!(slot.messages[0].role, Role::User);
        assert_eq!(slot.messages[0].content, "How do lifetimes work?");

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(dashboard.slot(ChatType::Coder).await.messages.len(), 1);

        wait_for_messages(&dashboard, ChatType::Coder, 2).await;
        let slot = dashboard.slot(ChatType::Coder).await;
        assert_eq!(slot.messages.len(), 2);
        assert_eq!(slot.messages[1].role, Role::Assistant);
        assert_eq!(slot.messages[1].content, placeholder_reply(ChatType::Coder));
        assert!(slot.messages.iter().all(|m| m.session_id == session_id));
        assert_eq!(slot.session_id, Some(session_id));
    }

    #[tokio::test(start_paused = true)]
    async fn test_completed_exchange_sets_truncated_title() {
        let (dashboard, store) = dashboard();
        dashboard.initialize().await;
        let text = "Paint me a lighthouse at dusk with long purple shadows over the rocks";

        dashboard.send_message(ChatType::Artist, text).await.unwrap();
        wait_for_messages(&dashboard, ChatType::Artist, 2).await;
        tokio::time::sleep(Duration::from_millis(10)).await;

        let session_id = dashboard.slot(ChatType::Artist).await.session_id.unwrap();
        let sessions = store.inner.list_sessions(dashboard.user().id).await.unwrap();
        let session = sessions.iter().find(|s| s.id == session_id).unwrap();
        assert_eq!(session.title, text.chars().take(50).collect::<String>());
        assert_eq!(sessions[0].id, session_id, "touched session sorts first");
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_input_makes_no_store_call() {
        let (dashboard, store) = dashboard();
        dashboard.initialize().await;
        let before = dashboard.slots().await;
        let calls = store.calls();

        for text in ["", "   ", "\n\t "] {
            let err = dashboard.send_message(ChatType::Tutor, text).await.unwrap_err();
            assert!(matches!(err, DashboardError::EmptyMessage));
        }

        assert_eq!(store.calls(), calls);
        assert_eq!(dashboard.slots().await, before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_without_session_creates_titled_session() {
        let (dashboard, store) = dashboard();

        dashboard
            .send_message(ChatType::Tutor, "Explain the French subjunctive please")
            .await
            .unwrap();

        let slot = dashboard.slot(ChatType::Tutor).await;
        let session_id = slot.session_id.expect("session created on send");
        let sessions = store.inner.list_sessions(dashboard.user().id).await.unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].id, session_id);
        assert_eq!(sessions[0].title, "Explain the French subjunctive please");
        assert_eq!(sessions[0].chat_type, ChatType::Tutor);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_user_message_leaves_slot_unchanged() {
        let (dashboard, store) = dashboard();
        dashboard.initialize().await;
        let before = dashboard.slot(ChatType::Coder).await;

        store.fail_writes.store(true, Ordering::SeqCst);
        let err = dashboard.send_message(ChatType::Coder, "hello").await.unwrap_err();

        assert!(matches!(err, DashboardError::Store(_)));
        assert_eq!(dashboard.slot(ChatType::Coder).await, before);
        assert_eq!(dashboard.pending_replies(ChatType::Coder).await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_reply_keeps_user_message_only() {
        let (dashboard, store) = dashboard();
        dashboard.initialize().await;

        dashboard.send_message(ChatType::Coder, "hello").await.unwrap();
        store.fail_writes.store(true, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(600)).await;

        let slot = dashboard.slot(ChatType::Coder).await;
        assert_eq!(slot.messages.len(), 1);
        assert_eq!(slot.messages[0].role, Role::User);
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_session_replaces_only_target_slot() {
        let (dashboard, _store) = dashboard();
        dashboard.initialize().await;
        dashboard.send_message(ChatType::Coder, "first").await.unwrap();
        wait_for_messages(&dashboard, ChatType::Coder, 2).await;
        let old_coder = dashboard.slot(ChatType::Coder).await;

        dashboard.start_new_chat(ChatType::Coder).await.unwrap();
        let before = dashboard.slots().await;

        let loaded = dashboard
            .load_session(old_coder.session_id.unwrap(), ChatType::Coder)
            .await
            .unwrap();

        assert_eq!(loaded, old_coder);
        let after = dashboard.slots().await;
        assert_eq!(after[&ChatType::Coder], old_coder);
        assert_eq!(after[&ChatType::Artist], before[&ChatType::Artist]);
        assert_eq!(after[&ChatType::Tutor], before[&ChatType::Tutor]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_load_leaves_slot_unchanged() {
        let (dashboard, store) = dashboard();
        dashboard.initialize().await;
        let before = dashboard.slots().await;

        store.fail_reads.store(true, Ordering::SeqCst);
        let result = dashboard.load_session(Uuid::new_v4(), ChatType::Artist).await;

        assert!(result.is_err());
        assert_eq!(dashboard.slots().await, before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_session_rejects_foreign_or_mismatched_session() {
        let (owner, store) = dashboard();
        owner.initialize().await;
        owner.send_message(ChatType::Coder, "my secret plan").await.unwrap();
        wait_for_messages(&owner, ChatType::Coder, 2).await;
        let secret = owner.slot(ChatType::Coder).await.session_id.unwrap();

        let other = Dashboard::new(
            User::new(Uuid::new_v4(), "omar@example.com"),
            store.clone(),
            config(),
        );
        other.initialize().await;
        let before = other.slots().await;

        let err = other.load_session(secret, ChatType::Artist).await.unwrap_err();
        assert!(matches!(err, DashboardError::SessionNotFound { session_id, .. } if session_id == secret));
        let err = other.load_session(secret, ChatType::Coder).await.unwrap_err();
        assert!(matches!(err, DashboardError::SessionNotFound { .. }));
        assert_eq!(other.slots().await, before);

        // the owner cannot file it under another chat type either
        let err = owner.load_session(secret, ChatType::Tutor).await.unwrap_err();
        assert!(matches!(err, DashboardError::SessionNotFound { .. }));
        assert_eq!(owner.slot(ChatType::Tutor).await.messages.len(), 0);
        assert_eq!(store.inner.list_messages(secret).await.unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_replacing_slot_cancels_pending_reply() {
        let (dashboard, store) = dashboard();
        dashboard.initialize().await;
        let old_session = dashboard.slot(ChatType::Artist).await.session_id.unwrap();

        dashboard.send_message(ChatType::Artist, "a fox").await.unwrap();
        assert_eq!(dashboard.pending_replies(ChatType::Artist).await, 1);

        let fresh = dashboard.start_new_chat(ChatType::Artist).await.unwrap();
        tokio::time::sleep(Duration::from_millis(1_000)).await;

        assert_eq!(dashboard.slot(ChatType::Artist).await, fresh);
        let stored = store.inner.list_messages(old_session).await.unwrap();
        assert_eq!(stored.len(), 1, "no assistant row after cancellation");
        assert_eq!(stored[0].role, Role::User);
        let sessions = store.inner.list_sessions(dashboard.user().id).await.unwrap();
        let old = sessions.iter().find(|s| s.id == old_session).unwrap();
        assert_eq!(old.title, NEW_CHAT_TITLE, "cancelled exchange leaves the title alone");
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_sends_both_get_replies() {
        let (dashboard, _store) = dashboard();
        dashboard.initialize().await;

        dashboard.send_message(ChatType::Tutor, "one").await.unwrap();
        dashboard.send_message(ChatType::Tutor, "two").await.unwrap();
        assert_eq!(dashboard.pending_replies(ChatType::Tutor).await, 2);

        wait_for_messages(&dashboard, ChatType::Tutor, 4).await;
        let roles: Vec<Role> = dashboard
            .slot(ChatType::Tutor)
            .await
            .messages
            .iter()
            .map(|m| m.role)
            .collect();
        assert_eq!(roles, vec![Role::User, Role::User, Role::Assistant, Role::Assistant]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_cancels_all_pending_replies() {
        let (dashboard, _store) = dashboard();
        dashboard.initialize().await;
        for chat_type in ChatType::ALL {
            dashboard.send_message(chat_type, "hi").await.unwrap();
        }

        dashboard.shutdown().await;
        tokio::time::sleep(Duration::from_millis(1_000)).await;

        for chat_type in ChatType::ALL {
            assert_eq!(dashboard.slot(chat_type).await.messages.len(), 1);
            assert_eq!(dashboard.pending_replies(chat_type).await, 0);
        }
    }

    #[test]
    fn test_placeholder_reply_names_chat_type() {
        assert_eq!(
            placeholder_reply(ChatType::Tutor),
            "This is a placeholder response from the tutor. Connect your API key to enable real responses."
        );
    }
}
