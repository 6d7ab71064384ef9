//! Auth session: current identity and loading state for one app instance.
//!
//! An `AuthSession` is created explicitly and handed to whatever needs the
//! signed-in user. `start()` reads the provider's current session and keeps a
//! subscription to session changes on a background task; `stop()` (or drop)
//! tears the subscription down.

use std::sync::{Arc, Mutex};

use serde::Serialize;
use thiserror::Error;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use crate::identity::{AuthChange, IdentityError, IdentityProvider};
use crate::models::User;
use crate::store::ChatStore;

#[derive(Error, Debug)]
pub enum AuthError {
    /// Every sign-in / sign-up failure collapses to this.
    #[error("login failed")]
    LoginFailed(#[source] IdentityError),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthState {
    pub user: Option<User>,
    pub loading: bool,
}

pub struct AuthSession {
    provider: Arc<dyn IdentityProvider>,
    store: Arc<dyn ChatStore>,
    state: Arc<RwLock<AuthState>>,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl AuthSession {
    pub fn new(provider: Arc<dyn IdentityProvider>, store: Arc<dyn ChatStore>) -> Self {
        Self {
            provider,
            store,
            state: Arc::new(RwLock::new(AuthState {
                user: None,
                loading: true,
            })),
            listener: Mutex::new(None),
        }
    }

    /// Load the provider's current session and subscribe to changes.
    pub async fn start(&self) {
        // subscribe first so a change between the read and the spawn is not lost
        let mut changes = self.provider.subscribe();
        let principal = self.provider.current_principal().await;

        {
            let mut state = self.state.write().await;
            state.user = principal.map(|p| p.user);
            state.loading = false;
        }

        // events only trigger a resync; the provider's session is authoritative
        let state = Arc::clone(&self.state);
        let provider = Arc::clone(&self.provider);
        let handle = tokio::spawn(async move {
            loop {
                match changes.recv().await {
                    Ok(AuthChange::SignedIn(user)) => {
                        tracing::debug!(user_id = %user.id, "Auth change: signed in");
                    }
                    Ok(AuthChange::SignedOut) => {
                        tracing::debug!("Auth change: signed out");
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Auth change listener lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
                let current = provider.current_principal().await.map(|p| p.user);
                state.write().await.user = current;
            }
        });

        if let Some(previous) = self.replace_listener(Some(handle)) {
            previous.abort();
        }
        tracing::info!(provider = self.provider.name(), "Auth session started");
    }

    /// Unsubscribe from session changes.
    pub fn stop(&self) {
        if let Some(handle) = self.replace_listener(None) {
            handle.abort();
            tracing::info!("Auth session stopped");
        }
    }

    fn replace_listener(&self, handle: Option<JoinHandle<()>>) -> Option<JoinHandle<()>> {
        let mut slot = self.listener.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::replace(&mut *slot, handle)
    }

    /// Sign in, provisioning the account on first use.
    ///
    /// An unknown email gets signed up and signed in. A known email with the
    /// wrong password fails both sign-in and sign-up and yields `LoginFailed`.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let principal = match self.provider.sign_in_with_password(email, password).await {
            Ok(principal) => principal,
            Err(first) => {
                tracing::debug!(error = %first, "Sign-in failed, attempting sign-up");
                self.provider
                    .sign_up(email, password)
                    .await
                    .map_err(AuthError::LoginFailed)?;
                self.provider
                    .sign_in_with_password(email, password)
                    .await
                    .map_err(AuthError::LoginFailed)?
            }
        };

        let user = principal.user;
        self.state.write().await.user = Some(user.clone());

        match self.store.upsert_user(&user).await {
            Ok(()) => {}
            Err(e) if e.is_conflict() => {
                tracing::debug!(user_id = %user.id, "User record already exists");
            }
            Err(e) => {
                tracing::error!(user_id = %user.id, error = %e, "Error creating user record");
            }
        }

        Ok(user)
    }

    pub async fn logout(&self) {
        if let Err(e) = self.provider.sign_out().await {
            tracing::error!(error = %e, "Sign-out failed at identity provider");
        }
        self.state.write().await.user = None;
    }

    pub async fn user(&self) -> Option<User> {
        self.state.read().await.user.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.loading
    }

    pub async fn state(&self) -> AuthState {
        self.state.read().await.clone()
    }
}

impl Drop for AuthSession {
    fn drop(&mut self) {
        self.stop();
    }
}
