//! Identity provider seam.
//!
//! Authentication is delegated to an external provider. This module defines
//! the `IdentityProvider` trait the auth session talks to, and two backends:
//! - **GoTrue**: a GoTrue-compatible REST auth service over HTTP
//! - **Memory**: an in-process account table for local runs and tests
//!
//! Neither backend persists tokens: the current principal lives in memory.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{broadcast, RwLock};

use crate::config::{IdentityBackend, IdentityConfig};
use crate::models::User;

pub mod gotrue;
pub mod memory;

pub use gotrue::GoTrueIdentityProvider;
pub use memory::MemoryIdentityProvider;

/// Capacity of the auth-change broadcast channel.
const CHANGE_CHANNEL_CAPACITY: usize = 16;

#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("invalid login credentials")]
    InvalidCredentials,

    #[error("user already registered")]
    AlreadyRegistered,

    #[error("identity provider url is not configured")]
    MissingUrl,

    #[error("invalid identity response: {0}")]
    InvalidResponse(String),
}

/// A signed-in user plus the provider's access token for that session.
#[derive(Debug, Clone, PartialEq)]
pub struct Principal {
    pub user: User,
    pub access_token: String,
}

/// Session-change notification pushed to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthChange {
    SignedIn(User),
    SignedOut,
}

// ============================================================================
// IdentityProvider trait
// ============================================================================

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Principal, IdentityError>;

    /// Register a new account. Does not sign in.
    async fn sign_up(&self, email: &str, password: &str) -> Result<(), IdentityError>;

    /// End the current session. Local state is cleared even if the remote call fails.
    async fn sign_out(&self) -> Result<(), IdentityError>;

    async fn current_principal(&self) -> Option<Principal>;

    /// Receive every subsequent sign-in / sign-out.
    fn subscribe(&self) -> broadcast::Receiver<AuthChange>;

    /// Backend name for logging.
    fn name(&self) -> &str;
}

/// Create the configured identity provider.
pub fn create_identity_provider(
    config: &IdentityConfig,
) -> Result<Arc<dyn IdentityProvider>, IdentityError> {
    match config.provider {
        IdentityBackend::Gotrue => Ok(Arc::new(GoTrueIdentityProvider::new(config)?)),
        IdentityBackend::Memory => Ok(Arc::new(MemoryIdentityProvider::new())),
    }
}

// ============================================================================
// Shared current-session cell
// ============================================================================

/// Current principal plus the change channel, shared by both backends.
pub(crate) struct PrincipalCell {
    current: RwLock<Option<Principal>>,
    changes: broadcast::Sender<AuthChange>,
}

impl PrincipalCell {
    pub(crate) fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            current: RwLock::new(None),
            changes,
        }
    }

    pub(crate) async fn get(&self) -> Option<Principal> {
        self.current.read().await.clone()
    }

    pub(crate) async fn signed_in(&self, principal: Principal) {
        let user = principal.user.clone();
        *self.current.write().await = Some(principal);
        // no subscribers is fine
        let _ = self.changes.send(AuthChange::SignedIn(user));
    }

    /// Clears the session; returns the principal that was signed in, if any.
    pub(crate) async fn signed_out(&self) -> Option<Principal> {
        let previous = self.current.write().await.take();
        if previous.is_some() {
            let _ = self.changes.send(AuthChange::SignedOut);
        }
        previous
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<AuthChange> {
        self.changes.subscribe()
    }
}
