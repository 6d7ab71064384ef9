//! Fission HTTP REST API
//!
//! Axum-based presentation surface over the auth gate and dashboard.
//!
//! Each endpoint has a thin axum handler that delegates to an inner function
//! returning `(StatusCode, serde_json::Value)`. The inner functions are called
//! directly by the unit tests.
//!
//! Endpoints:
//! - GET  /health                 : health check with store status
//! - GET  /version                : server version info
//! - GET  /auth                   : auth gate view
//! - POST /auth/login             : sign in (provisions unknown emails)
//! - POST /auth/logout            : sign out
//! - GET  /dashboard              : all three slots for the signed-in user
//! - POST /chats/{type}/messages  : send a message to one chat
//! - POST /chats/{type}/new       : start a new chat in one slot
//! - POST /chats/{type}/load      : load a stored session into one slot
//! - GET  /history                : the user's sessions, most recent first

use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use fission_core::{list_history, ChatStore, ChatType, Dashboard, DashboardError, FissionConfig};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::app::App;

pub const PROTOCOL: &str = "fission/1";

/// Shared state for all HTTP handlers
pub struct HttpState {
    pub app: Arc<App>,
    pub config: FissionConfig,
}

/// Build the Axum router with all endpoints
pub fn build_router(state: Arc<HttpState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/version", get(version_handler))
        .route("/auth", get(auth_handler))
        .route("/auth/login", post(login_handler))
        .route("/auth/logout", post(logout_handler))
        .route("/dashboard", get(dashboard_handler))
        .route("/chats/:chat_type/messages", post(send_handler))
        .route("/chats/:chat_type/new", post(new_chat_handler))
        .route("/chats/:chat_type/load", post(load_handler))
        .route("/history", get(history_handler))
        .with_state(state)
}

/// Start the HTTP server on the configured address.
/// Gracefully shuts down when the broadcast shutdown signal fires.
pub async fn start_http_server(
    app: Arc<App>,
    config: FissionConfig,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<()> {
    let addr = format!("{}:{}", config.http.host, config.http.port);
    let state = Arc::new(HttpState { app, config });

    let router = build_router(state);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Fission HTTP API listening on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
            tracing::info!("HTTP server shutting down...");
        })
        .await?;

    Ok(())
}

// ============================================================================
// Request / Response DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SendRequest {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoadRequest {
    pub session_id: Uuid,
}

/// Standard HTTP error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub status: String,
}

impl ErrorResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            error: msg.into(),
            status: "error".to_string(),
        }
    }

    fn with(self, code: StatusCode) -> (StatusCode, serde_json::Value) {
        (code, serde_json::json!(self))
    }
}

// ============================================================================
// Inner (directly testable) business logic functions
// ============================================================================

/// Inner health check: pings the store and returns (status_code, json_body).
pub async fn health_inner(store: &dyn ChatStore) -> (StatusCode, serde_json::Value) {
    match store.ping().await {
        Ok(detail) => (
            StatusCode::OK,
            serde_json::json!({
                "status": "healthy",
                "version": env!("CARGO_PKG_VERSION"),
                "store": detail,
            }),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            serde_json::json!({
                "status": "unhealthy",
                "error": e.to_string(),
            }),
        ),
    }
}

/// Inner version: returns version info (pure, no IO).
pub fn version_inner() -> serde_json::Value {
    serde_json::json!({
        "version": env!("CARGO_PKG_VERSION"),
        "protocol": PROTOCOL,
    })
}

/// Inner auth: the gate view plus the raw loading/user pair.
pub async fn auth_inner(app: &App) -> (StatusCode, serde_json::Value) {
    let state = app.auth().state().await;
    let view = app.view().await;
    (
        StatusCode::OK,
        serde_json::json!({
            "loading": state.loading,
            "user": state.user,
            "view": view.name(),
        }),
    )
}

/// Inner login: rejects blank fields, collapses every failure to "login failed".
pub async fn login_inner(app: &App, req: LoginRequest) -> (StatusCode, serde_json::Value) {
    let (email, password) = match (req.email, req.password) {
        (Some(e), Some(p)) if !e.trim().is_empty() && !p.is_empty() => (e, p),
        _ => {
            return ErrorResponse::new("email and password are required")
                .with(StatusCode::BAD_REQUEST);
        }
    };

    match app.login(email.trim(), &password).await {
        Ok(user) => (StatusCode::OK, serde_json::json!({ "user": user })),
        Err(e) => {
            tracing::warn!(error = ?e, "Login failed");
            ErrorResponse::new(e.to_string()).with(StatusCode::UNAUTHORIZED)
        }
    }
}

/// Inner logout: always succeeds from the caller's point of view.
pub async fn logout_inner(app: &App) -> (StatusCode, serde_json::Value) {
    app.logout().await;
    (StatusCode::OK, serde_json::json!({ "status": "ok" }))
}

/// Inner dashboard: the signed-in user and all three slots.
pub async fn dashboard_inner(app: &App) -> (StatusCode, serde_json::Value) {
    let dashboard = match signed_in(app).await {
        Ok(d) => d,
        Err(resp) => return resp,
    };
    let slots = dashboard.slots().await;
    (
        StatusCode::OK,
        serde_json::json!({
            "user": dashboard.user(),
            "slots": slots,
        }),
    )
}

/// Inner send: persists the message and schedules the reply.
///
/// Store failures are logged by the dashboard; the caller gets the slot as it
/// stands.
pub async fn send_inner(
    app: &App,
    chat_type: &str,
    req: SendRequest,
) -> (StatusCode, serde_json::Value) {
    let chat_type = match parse_chat_type(chat_type) {
        Ok(ct) => ct,
        Err(resp) => return resp,
    };
    let dashboard = match signed_in(app).await {
        Ok(d) => d,
        Err(resp) => return resp,
    };
    let content = req.content.unwrap_or_default();

    match dashboard.send_message(chat_type, &content).await {
        Err(DashboardError::EmptyMessage) => {
            ErrorResponse::new("content must not be empty").with(StatusCode::BAD_REQUEST)
        }
        _ => slot_response(&dashboard, chat_type).await,
    }
}

/// Inner new chat: opens a fresh session in the slot.
pub async fn new_chat_inner(app: &App, chat_type: &str) -> (StatusCode, serde_json::Value) {
    let chat_type = match parse_chat_type(chat_type) {
        Ok(ct) => ct,
        Err(resp) => return resp,
    };
    let dashboard = match signed_in(app).await {
        Ok(d) => d,
        Err(resp) => return resp,
    };

    // failures are logged and leave the slot unchanged
    let _ = dashboard.start_new_chat(chat_type).await;
    slot_response(&dashboard, chat_type).await
}

/// Inner load: replaces the slot with a stored session.
///
/// Sessions owned by another user, or filed under another chat type, are 404
/// and leave the slot untouched.
pub async fn load_inner(
    app: &App,
    chat_type: &str,
    req: LoadRequest,
) -> (StatusCode, serde_json::Value) {
    let chat_type = match parse_chat_type(chat_type) {
        Ok(ct) => ct,
        Err(resp) => return resp,
    };
    let dashboard = match signed_in(app).await {
        Ok(d) => d,
        Err(resp) => return resp,
    };

    match dashboard.load_session(req.session_id, chat_type).await {
        Err(DashboardError::SessionNotFound { .. }) => {
            ErrorResponse::new("chat session not found").with(StatusCode::NOT_FOUND)
        }
        _ => slot_response(&dashboard, chat_type).await,
    }
}

/// Inner history: the signed-in user's sessions, most recent first.
pub async fn history_inner(app: &App) -> (StatusCode, serde_json::Value) {
    let dashboard = match signed_in(app).await {
        Ok(d) => d,
        Err(resp) => return resp,
    };

    let sessions = list_history(app.store().as_ref(), dashboard.user().id, Utc::now())
        .await
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "Error loading chat history");
            Vec::new()
        });
    (StatusCode::OK, serde_json::json!({ "sessions": sessions }))
}

// ============================================================================
// Axum handler wrappers (thin: delegate to inner functions)
// ============================================================================

pub async fn health_handler(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let (status, body) = health_inner(state.app.store().as_ref()).await;
    (status, Json(body))
}

pub async fn version_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(version_inner()))
}

pub async fn auth_handler(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let (status, body) = auth_inner(&state.app).await;
    (status, Json(body))
}

pub async fn login_handler(
    State(state): State<Arc<HttpState>>,
    Json(req): Json<LoginRequest>,
) -> impl IntoResponse {
    let (status, body) = login_inner(&state.app, req).await;
    (status, Json(body))
}

pub async fn logout_handler(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let (status, body) = logout_inner(&state.app).await;
    (status, Json(body))
}

pub async fn dashboard_handler(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let (status, body) = dashboard_inner(&state.app).await;
    (status, Json(body))
}

pub async fn send_handler(
    State(state): State<Arc<HttpState>>,
    Path(chat_type): Path<String>,
    Json(req): Json<SendRequest>,
) -> impl IntoResponse {
    let (status, body) = send_inner(&state.app, &chat_type, req).await;
    (status, Json(body))
}

pub async fn new_chat_handler(
    State(state): State<Arc<HttpState>>,
    Path(chat_type): Path<String>,
) -> impl IntoResponse {
    let (status, body) = new_chat_inner(&state.app, &chat_type).await;
    (status, Json(body))
}

pub async fn load_handler(
    State(state): State<Arc<HttpState>>,
    Path(chat_type): Path<String>,
    Json(req): Json<LoadRequest>,
) -> impl IntoResponse {
    let (status, body) = load_inner(&state.app, &chat_type, req).await;
    (status, Json(body))
}

pub async fn history_handler(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let (status, body) = history_inner(&state.app).await;
    (status, Json(body))
}

// ============================================================================
// Helpers
// ============================================================================

/// Parse a `{type}` path segment, or a 404 body.
pub fn parse_chat_type(raw: &str) -> std::result::Result<ChatType, (StatusCode, serde_json::Value)> {
    raw.parse::<ChatType>()
        .map_err(|e| ErrorResponse::new(e.to_string()).with(StatusCode::NOT_FOUND))
}

async fn signed_in(
    app: &App,
) -> std::result::Result<Arc<Dashboard>, (StatusCode, serde_json::Value)> {
    app.dashboard()
        .await
        .ok_or_else(|| ErrorResponse::new("not logged in").with(StatusCode::UNAUTHORIZED))
}

async fn slot_response(dashboard: &Dashboard, chat_type: ChatType) -> (StatusCode, serde_json::Value) {
    let slot = dashboard.slot(chat_type).await;
    (StatusCode::OK, serde_json::json!({ "slot": slot }))
}

// ============================================================================
// Unit Tests: call inner functions directly
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use fission_core::{AuthSession, MemoryChatStore, MemoryIdentityProvider};

    async fn make_app() -> App {
        let config = FissionConfig::in_memory();
        let store: Arc<dyn ChatStore> = Arc::new(MemoryChatStore::new());
        let auth = AuthSession::new(Arc::new(MemoryIdentityProvider::new()), Arc::clone(&store));
        let app = App::new(auth, store, config.chat);
        app.start().await;
        app
    }

    fn login(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        }
    }

    // ========================================================================
    // TEST 1: version_inner is pure and returns correct fields
    // ========================================================================
    #[test]
    fn test_version_inner_pure() {
        let v = version_inner();
        assert!(v["version"].is_string(), "version must be string");
        assert_eq!(v["protocol"], "fission/1", "protocol must be fission/1");
    }

    // ========================================================================
    // TEST 2: parse_chat_type: known types parse, unknown is 404
    // ========================================================================
    #[test]
    fn test_parse_chat_type() {
        assert_eq!(parse_chat_type("artist").unwrap(), ChatType::Artist);
        let (status, body) = parse_chat_type("poet").unwrap_err();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["status"], "error");
    }

    // ========================================================================
    // TEST 3: health_inner: memory store reports healthy
    // ========================================================================
    #[tokio::test]
    async fn test_health_inner_ok() {
        let store = MemoryChatStore::new();
        let (status, body) = health_inner(&store).await;
        assert_eq!(status, StatusCode::OK, "Health should return 200");
        assert_eq!(body["status"], "healthy");
        assert!(body["store"].as_str().unwrap().starts_with("memory"));
    }

    // ========================================================================
    // TEST 4: auth_inner: signed out after start shows the login view
    // ========================================================================
    #[tokio::test]
    async fn test_auth_inner_signed_out() {
        let app = make_app().await;
        let (status, body) = auth_inner(&app).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["loading"], false);
        assert!(body["user"].is_null());
        assert_eq!(body["view"], "login");
    }

    // ========================================================================
    // TEST 5: login_inner: blank fields are rejected with 400
    // ========================================================================
    #[tokio::test]
    async fn test_login_inner_blank_fields() {
        let app = make_app().await;
        let (status, _) = login_inner(&app, login("  ", "secret1")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let req = LoginRequest {
            email: Some("tess@example.com".to_string()),
            password: None,
        };
        let (status, _) = login_inner(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    // ========================================================================
    // TEST 6: login_inner: wrong password for a known email is 401
    // ========================================================================
    #[tokio::test]
    async fn test_login_inner_wrong_password() {
        let app = make_app().await;
        let (status, _) = login_inner(&app, login("uma@example.com", "secret1")).await;
        assert_eq!(status, StatusCode::OK);
        logout_inner(&app).await;

        let (status, body) = login_inner(&app, login("uma@example.com", "wrong-pass")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "login failed");
    }

    // ========================================================================
    // TEST 7: chat routes require a signed-in user
    // ========================================================================
    #[tokio::test]
    async fn test_chat_routes_require_login() {
        let app = make_app().await;
        let (status, _) = dashboard_inner(&app).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let req = SendRequest {
            content: Some("hi".to_string()),
        };
        let (status, _) = send_inner(&app, "coder", req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = history_inner(&app).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    // ========================================================================
    // TEST 8: send_inner: message and placeholder reply land in the slot
    // ========================================================================
    #[tokio::test(start_paused = true)]
    async fn test_send_inner_appends_exchange() {
        let app = make_app().await;
        login_inner(&app, login("vic@example.com", "secret1")).await;

        let req = SendRequest {
            content: Some("Explain lifetimes".to_string()),
        };
        let (status, body) = send_inner(&app, "tutor", req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["slot"]["messages"][0]["content"], "Explain lifetimes");
        assert_eq!(body["slot"]["messages"][0]["role"], "user");

        let dashboard = app.dashboard().await.unwrap();
        for _ in 0..50 {
            if dashboard.slot(ChatType::Tutor).await.messages.len() == 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        let slot = dashboard.slot(ChatType::Tutor).await;
        assert_eq!(slot.messages.len(), 2);
        assert_eq!(slot.messages[1].content, fission_core::placeholder_reply(ChatType::Tutor));
    }

    // ========================================================================
    // TEST 9: send_inner: blank content is 400, unknown type is 404
    // ========================================================================
    #[tokio::test]
    async fn test_send_inner_rejects_bad_input() {
        let app = make_app().await;
        login_inner(&app, login("wes@example.com", "secret1")).await;

        let req = SendRequest {
            content: Some("   ".to_string()),
        };
        let (status, _) = send_inner(&app, "coder", req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let req = SendRequest {
            content: Some("hello".to_string()),
        };
        let (status, _) = send_inner(&app, "painter", req).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    // ========================================================================
    // TEST 10: new_chat_inner then history_inner lists the user's sessions
    // ========================================================================
    #[tokio::test]
    async fn test_new_chat_and_history() {
        let app = make_app().await;
        login_inner(&app, login("xan@example.com", "secret1")).await;

        let (_, before) = dashboard_inner(&app).await;
        let (status, body) = new_chat_inner(&app, "artist").await;
        assert_eq!(status, StatusCode::OK);
        assert_ne!(body["slot"]["session_id"], before["slots"]["artist"]["session_id"]);
        assert_eq!(body["slot"]["messages"].as_array().unwrap().len(), 0);

        let (status, body) = history_inner(&app).await;
        assert_eq!(status, StatusCode::OK);
        let sessions = body["sessions"].as_array().unwrap();
        // three from initialization plus the new artist chat
        assert_eq!(sessions.len(), 4);
        assert_eq!(sessions[0]["session_id"], body_session(&app, ChatType::Artist).await);
    }

    async fn body_session(app: &App, chat_type: ChatType) -> serde_json::Value {
        let slot = app.dashboard().await.unwrap().slot(chat_type).await;
        serde_json::json!(slot.session_id)
    }

    // ========================================================================
    // TEST 11: load_inner replaces only the targeted slot
    // ========================================================================
    #[tokio::test]
    async fn test_load_inner_targets_one_slot() {
        let app = make_app().await;
        login_inner(&app, login("yara@example.com", "secret1")).await;
        let (_, before) = dashboard_inner(&app).await;
        let coder_session: Uuid =
            serde_json::from_value(before["slots"]["coder"]["session_id"].clone()).unwrap();

        new_chat_inner(&app, "coder").await;
        let (status, body) = load_inner(
            &app,
            "coder",
            LoadRequest {
                session_id: coder_session,
            },
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["slot"]["session_id"], serde_json::json!(coder_session));

        let (_, after) = dashboard_inner(&app).await;
        assert_eq!(after["slots"]["artist"], before["slots"]["artist"]);
        assert_eq!(after["slots"]["tutor"], before["slots"]["tutor"]);
    }

    // ========================================================================
    // TEST 12: load_inner: another user's session or a wrong type is 404
    // ========================================================================
    #[tokio::test]
    async fn test_load_inner_rejects_foreign_session() {
        let app = make_app().await;
        login_inner(&app, login("zed@example.com", "secret1")).await;
        let (_, owner) = dashboard_inner(&app).await;
        let owner_coder: Uuid =
            serde_json::from_value(owner["slots"]["coder"]["session_id"].clone()).unwrap();

        let (status, body) = load_inner(
            &app,
            "artist",
            LoadRequest {
                session_id: owner_coder,
            },
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "chat session not found");

        logout_inner(&app).await;
        login_inner(&app, login("ada@example.com", "secret1")).await;
        let (_, before) = dashboard_inner(&app).await;

        let (status, _) = load_inner(
            &app,
            "coder",
            LoadRequest {
                session_id: owner_coder,
            },
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, after) = dashboard_inner(&app).await;
        assert_eq!(after["slots"], before["slots"]);
    }
}
