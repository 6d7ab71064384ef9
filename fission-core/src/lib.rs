pub mod auth;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod history;
pub mod identity;
pub mod models;
pub mod panel;
pub mod store;

pub use auth::{AuthError, AuthSession, AuthState};
pub use config::FissionConfig;
pub use dashboard::{placeholder_reply, Dashboard, DashboardError, Slot};
pub use error::FissionError;
pub use history::{format_age, list_history, HistoryEntry};
pub use identity::{
    create_identity_provider, AuthChange, GoTrueIdentityProvider, IdentityError, IdentityProvider,
    MemoryIdentityProvider, Principal,
};
pub use models::{ChatMessage, ChatSession, ChatType, Role, User};
pub use panel::ChatPanel;
pub use store::{create_store, ChatStore, MemoryChatStore, PgChatStore, StoreError};
