use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use super::{AuthChange, IdentityError, IdentityProvider, Principal, PrincipalCell};
use crate::models::User;

/// Same floor GoTrue applies by default.
const MIN_PASSWORD_LEN: usize = 6;

struct Account {
    user: User,
    password: String,
}

/// In-process identity provider. Accounts live only as long as the process.
pub struct MemoryIdentityProvider {
    accounts: RwLock<HashMap<String, Account>>,
    session: PrincipalCell,
}

impl Default for MemoryIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryIdentityProvider {
    pub fn new() -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            session: PrincipalCell::new(),
        }
    }

    /// Resume an already signed-in session, as a provider restoring a stored
    /// session on startup would.
    pub async fn restore(&self, user: User) {
        self.session
            .signed_in(Principal {
                user,
                access_token: format!("memory-{}", Uuid::new_v4()),
            })
            .await;
    }

    pub async fn account_count(&self) -> usize {
        self.accounts.read().await.len()
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Principal, IdentityError> {
        let user = {
            let accounts = self.accounts.read().await;
            match accounts.get(email) {
                Some(account) if account.password == password => account.user.clone(),
                _ => return Err(IdentityError::InvalidCredentials),
            }
        };

        let principal = Principal {
            user,
            access_token: format!("memory-{}", Uuid::new_v4()),
        };
        self.session.signed_in(principal.clone()).await;
        Ok(principal)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<(), IdentityError> {
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(IdentityError::Api {
                code: 422,
                message: format!("Password should be at least {MIN_PASSWORD_LEN} characters."),
            });
        }

        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(email) {
            return Err(IdentityError::AlreadyRegistered);
        }
        accounts.insert(
            email.to_string(),
            Account {
                user: User::new(Uuid::new_v4(), email),
                password: password.to_string(),
            },
        );
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        self.session.signed_out().await;
        Ok(())
    }

    async fn current_principal(&self) -> Option<Principal> {
        self.session.get().await
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthChange> {
        self.session.subscribe()
    }

    fn name(&self) -> &str {
        "memory"
    }
}
