//! Chat panel: pending input, submit gating and transcript rendering for one
//! chat type.

use uuid::Uuid;

use crate::models::{ChatMessage, ChatType, Role};

#[derive(Debug, Clone)]
pub struct ChatPanel {
    chat_type: ChatType,
    input: String,
    scroll_anchor: Option<Uuid>,
}

impl ChatPanel {
    pub fn new(chat_type: ChatType) -> Self {
        Self {
            chat_type,
            input: String::new(),
            scroll_anchor: None,
        }
    }

    pub fn chat_type(&self) -> ChatType {
        self.chat_type
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    pub fn can_submit(&self) -> bool {
        !self.input.trim().is_empty()
    }

    /// Take the pending input for sending. Blank input stays put and yields `None`.
    pub fn submit(&mut self) -> Option<String> {
        if !self.can_submit() {
            return None;
        }
        Some(std::mem::take(&mut self.input))
    }

    pub fn placeholder(&self) -> String {
        format!("Message {}...", self.chat_type.label())
    }

    /// Latest message the view has scrolled to.
    pub fn scroll_anchor(&self) -> Option<Uuid> {
        self.scroll_anchor
    }

    /// Follow the message list; returns `true` when the view should scroll.
    pub fn sync(&mut self, messages: &[ChatMessage]) -> bool {
        let latest = messages.last().map(|m| m.id);
        if latest == self.scroll_anchor {
            return false;
        }
        self.scroll_anchor = latest;
        true
    }

    /// Messages after `after` (all of them when `after` is unknown or `None`).
    pub fn unseen<'a>(messages: &'a [ChatMessage], after: Option<Uuid>) -> &'a [ChatMessage] {
        match after.and_then(|id| messages.iter().position(|m| m.id == id)) {
            Some(idx) => &messages[idx + 1..],
            None => messages,
        }
    }

    pub fn render(&self, messages: &[ChatMessage]) -> String {
        if messages.is_empty() {
            return format!("Start a conversation with {}", self.chat_type.label());
        }
        messages
            .iter()
            .map(|m| self.render_message(m))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn render_message(&self, message: &ChatMessage) -> String {
        let speaker = match message.role {
            Role::User => "you",
            Role::Assistant => self.chat_type.as_str(),
        };
        format!(
            "[{}] {}: {}",
            message.created_at.format("%H:%M"),
            speaker,
            message.content
        )
    }
}
