pub mod chat_type;
pub mod message;
pub mod session;
pub mod user;

pub use chat_type::ChatType;
pub use message::{ChatMessage, NewMessage, Role};
pub use session::ChatSession;
pub use user::User;

/// Default title given to a session that has no exchange yet.
pub const NEW_CHAT_TITLE: &str = "New Chat";

/// Session titles keep at most this many characters of the user's text.
pub const TITLE_MAX_CHARS: usize = 50;

/// First `max_chars` characters of `text`, counted as chars rather than bytes.
pub fn truncate_title(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
