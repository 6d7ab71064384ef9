//! Auth gate in front of the dashboard.
//!
//! `App` owns the `AuthSession` and at most one `Dashboard`. The dashboard is
//! built lazily for whoever is signed in and torn down when that identity goes
//! away or changes, so every caller sees the view for the current user.

use std::sync::Arc;

use fission_core::config::ChatConfig;
use fission_core::{
    create_identity_provider, create_store, AuthError, AuthSession, ChatStore, Dashboard,
    FissionConfig, FissionError, User,
};
use serde::Serialize;
use tokio::sync::Mutex;

/// What the app shows right now.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "lowercase")]
pub enum GateView {
    Loading,
    Login,
    Dashboard { user: User },
}

impl GateView {
    pub fn name(&self) -> &'static str {
        match self {
            GateView::Loading => "loading",
            GateView::Login => "login",
            GateView::Dashboard { .. } => "dashboard",
        }
    }
}

pub struct App {
    auth: AuthSession,
    store: Arc<dyn ChatStore>,
    chat: ChatConfig,
    dashboard: Mutex<Option<Arc<Dashboard>>>,
}

impl App {
    pub fn new(auth: AuthSession, store: Arc<dyn ChatStore>, chat: ChatConfig) -> Self {
        Self {
            auth,
            store,
            chat,
            dashboard: Mutex::new(None),
        }
    }

    /// Wire the configured store and identity provider together.
    pub async fn build(config: &FissionConfig) -> Result<Self, FissionError> {
        let store = create_store(&config.database).await?;
        let provider = create_identity_provider(&config.identity)?;
        tracing::info!(
            store = store.name(),
            identity = provider.name(),
            "Backends ready"
        );
        let auth = AuthSession::new(provider, Arc::clone(&store));
        Ok(Self::new(auth, store, config.chat.clone()))
    }

    /// Start the auth session and open the dashboard if a session was restored.
    pub async fn start(&self) {
        self.auth.start().await;
        self.dashboard().await;
    }

    pub fn auth(&self) -> &AuthSession {
        &self.auth
    }

    pub fn store(&self) -> &Arc<dyn ChatStore> {
        &self.store
    }

    pub async fn view(&self) -> GateView {
        let state = self.auth.state().await;
        if state.loading {
            return GateView::Loading;
        }
        match state.user {
            None => GateView::Login,
            Some(user) => GateView::Dashboard { user },
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let user = self.auth.login(email, password).await?;
        self.dashboard().await;
        Ok(user)
    }

    pub async fn logout(&self) {
        self.auth.logout().await;
        self.dashboard().await;
    }

    /// Dashboard for the signed-in user, or `None` when signed out.
    ///
    /// Reconciles with the auth state on every call: a dashboard for a user
    /// who is no longer signed in is shut down, and a new one is initialized
    /// for the current user.
    pub async fn dashboard(&self) -> Option<Arc<Dashboard>> {
        let user = self.auth.user().await;
        let mut current = self.dashboard.lock().await;

        if let (Some(user), Some(dashboard)) = (&user, current.as_ref()) {
            if dashboard.user() == user {
                return Some(Arc::clone(dashboard));
            }
        }

        if let Some(stale) = current.take() {
            stale.shutdown().await;
        }

        let user = user?;
        let dashboard = Arc::new(Dashboard::new(
            user,
            Arc::clone(&self.store),
            self.chat.clone(),
        ));
        dashboard.initialize().await;
        tracing::info!(user_id = %dashboard.user().id, "Dashboard opened");
        *current = Some(Arc::clone(&dashboard));
        Some(dashboard)
    }

    /// Cancel pending replies and detach from the identity provider.
    pub async fn shutdown(&self) {
        if let Some(dashboard) = self.dashboard.lock().await.take() {
            dashboard.shutdown().await;
        }
        self.auth.stop();
    }
}
