use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use super::{AuthChange, IdentityError, IdentityProvider, Principal, PrincipalCell};
use crate::config::IdentityConfig;
use crate::models::User;

// ============================================================================
// GoTrue API structs (private)
// ============================================================================

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: GoTrueUser,
}

#[derive(Debug, Deserialize)]
struct GoTrueUser {
    id: Uuid,
    email: Option<String>,
}

/// GoTrue reports errors in a few shapes depending on endpoint and version.
#[derive(Debug, Deserialize, Default)]
struct GoTrueErrorBody {
    error: Option<String>,
    error_description: Option<String>,
    error_code: Option<String>,
    msg: Option<String>,
    message: Option<String>,
}

impl GoTrueErrorBody {
    fn message(&self) -> Option<&str> {
        self.error_description
            .as_deref()
            .or(self.msg.as_deref())
            .or(self.message.as_deref())
            .or(self.error.as_deref())
    }
}

// ============================================================================
// GoTrueIdentityProvider
// ============================================================================

/// Identity provider backed by a GoTrue-compatible auth REST API.
pub struct GoTrueIdentityProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    session: PrincipalCell,
}

impl GoTrueIdentityProvider {
    pub fn new(config: &IdentityConfig) -> Result<Self, IdentityError> {
        if config.url.trim().is_empty() {
            return Err(IdentityError::MissingUrl);
        }
        Self::with_base_url(config, config.url.clone())
    }

    /// Create a provider against a custom base URL (for testing / integration)
    pub fn with_base_url(config: &IdentityConfig, base_url: String) -> Result<Self, IdentityError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: config.resolved_api_key(),
            session: PrincipalCell::new(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn request(&self, url: String) -> reqwest::RequestBuilder {
        let builder = self.client.post(url);
        match &self.api_key {
            Some(key) => builder.header("apikey", key),
            None => builder,
        }
    }

    async fn api_error(response: Response) -> IdentityError {
        let status = response.status();
        let raw = response.text().await.unwrap_or_default();
        let body: GoTrueErrorBody = serde_json::from_str(&raw).unwrap_or_default();

        if body.error.as_deref() == Some("invalid_grant")
            || body.error_code.as_deref() == Some("invalid_credentials")
        {
            return IdentityError::InvalidCredentials;
        }
        if body.error_code.as_deref() == Some("user_already_exists")
            || body
                .message()
                .is_some_and(|m| m.to_ascii_lowercase().contains("already registered"))
        {
            return IdentityError::AlreadyRegistered;
        }

        let message = body.message().map(str::to_string).unwrap_or(raw);
        tracing::warn!(code = status.as_u16(), message = %message, "Identity provider error");
        IdentityError::Api {
            code: status.as_u16(),
            message,
        }
    }
}

#[async_trait]
impl IdentityProvider for GoTrueIdentityProvider {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Principal, IdentityError> {
        let response = self
            .request(self.endpoint("token?grant_type=password"))
            .json(&Credentials { email, password })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| IdentityError::InvalidResponse(e.to_string()))?;

        let principal = Principal {
            user: User::new(token.user.id, token.user.email.unwrap_or_default()),
            access_token: token.access_token,
        };
        self.session.signed_in(principal.clone()).await;
        tracing::info!(user_id = %principal.user.id, "Signed in");
        Ok(principal)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<(), IdentityError> {
        let response = self
            .request(self.endpoint("signup"))
            .json(&Credentials { email, password })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        tracing::info!("Signed up new account");
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        let Some(principal) = self.session.signed_out().await else {
            return Ok(());
        };

        let response = self
            .request(self.endpoint("logout"))
            .bearer_auth(&principal.access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }
        Ok(())
    }

    async fn current_principal(&self) -> Option<Principal> {
        self.session.get().await
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthChange> {
        self.session.subscribe()
    }

    fn name(&self) -> &str {
        "gotrue"
    }
}

// ============================================================================
// TESTS
// ============================================================================
