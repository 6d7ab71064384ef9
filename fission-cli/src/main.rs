//! fission-cli: terminal frontend for the Fission chat dashboard
//!
//! Talks to a running `fission-server` over its HTTP API. The server holds the
//! signed-in session, so commands only need the server URL.
//!
//! # Subcommands
//! - `status`                     : server health and who is signed in
//! - `login <email> [--password]` : sign in, creating the account on first use
//! - `logout`                     : sign out
//! - `whoami`                     : print the signed-in email
//! - `show [type]`                : print one or all chat transcripts
//! - `send <type> <text…>`        : send a message and wait for the reply
//! - `new <type>`                 : start a new chat
//! - `history`                    : list past chats, most recent first
//! - `resume <session-id>`        : load a past chat into its slot
//! - `chat <type>`                : interactive chat loop

use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use std::time::{Duration, Instant};

use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use fission_core::{ChatMessage, ChatPanel, ChatType, HistoryEntry, Role, Slot, User};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use uuid::Uuid;

const DEFAULT_SERVER: &str = "http://127.0.0.1:8787";
const REPLY_POLL_INTERVAL: Duration = Duration::from_millis(200);
const DEFAULT_REPLY_TIMEOUT_SECS: u64 = 10;

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Debug, Parser)]
#[command(
    name = "fission-cli",
    version,
    about = "Fission chat dashboard from the terminal"
)]
struct Cli {
    /// Fission HTTP server URL (overrides FISSION_HTTP_URL env var)
    #[arg(long, env = "FISSION_HTTP_URL", default_value = DEFAULT_SERVER)]
    server: String,

    /// Seconds to wait for an assistant reply
    #[arg(long, default_value_t = DEFAULT_REPLY_TIMEOUT_SECS)]
    reply_timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show server health and the signed-in user
    Status,

    /// Sign in; an unknown email gets an account
    Login {
        email: String,

        /// Password (prompted on stdin when omitted)
        #[arg(long, env = "FISSION_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Sign out
    Logout,

    /// Print the signed-in email
    Whoami,

    /// Print chat transcripts
    Show {
        /// Only this chat (coder, artist, tutor)
        chat_type: Option<ChatType>,
    },

    /// Send a message and wait for the reply
    Send {
        chat_type: ChatType,

        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,

        /// Return as soon as the message is saved
        #[arg(long)]
        no_wait: bool,
    },

    /// Start a new chat in a slot
    New { chat_type: ChatType },

    /// List past chats, most recent first
    History,

    /// Load a past chat into its slot
    Resume { session_id: Uuid },

    /// Interactive chat (`/new` starts over, `/quit` exits)
    Chat { chat_type: ChatType },
}

// ============================================================================
// API Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct AuthView {
    pub loading: bool,
    pub user: Option<User>,
    pub view: String,
}

#[derive(Debug, Deserialize)]
pub struct DashboardView {
    pub user: User,
    pub slots: BTreeMap<ChatType, Slot>,
}

#[derive(Debug, Deserialize)]
pub struct SlotView {
    pub slot: Slot,
}

#[derive(Debug, Deserialize)]
pub struct HistoryView {
    pub sessions: Vec<HistoryEntry>,
}

// ============================================================================
// HTTP Client
// ============================================================================

struct Api {
    client: reqwest::blocking::Client,
    server: String,
}

impl Api {
    fn new(server: &str) -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            server: server.trim_end_matches('/').to_string(),
        })
    }

    fn get<T: DeserializeOwned>(&self, path: &str) -> anyhow::Result<T> {
        let url = format!("{}{}", self.server, path);
        let resp = self
            .client
            .get(&url)
            .send()
            .with_context(|| format!("connection failed to {url}"))?;
        Self::decode(resp)
    }

    fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> anyhow::Result<T> {
        let url = format!("{}{}", self.server, path);
        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .with_context(|| format!("connection failed to {url}"))?;
        Self::decode(resp)
    }

    fn decode<T: DeserializeOwned>(resp: reqwest::blocking::Response) -> anyhow::Result<T> {
        let status = resp.status();
        if !status.is_success() {
            let body: serde_json::Value = resp.json().unwrap_or_default();
            bail!("server returned {}: {}", status, error_message(&body));
        }
        resp.json().context("failed to parse server response")
    }

    fn slot(&self, chat_type: ChatType) -> anyhow::Result<Slot> {
        let mut dashboard: DashboardView = self.get("/dashboard")?;
        dashboard
            .slots
            .remove(&chat_type)
            .ok_or_else(|| anyhow!("server sent no {chat_type} slot"))
    }

    fn send(&self, chat_type: ChatType, text: &str) -> anyhow::Result<Slot> {
        let view: SlotView = self.post(
            &format!("/chats/{chat_type}/messages"),
            serde_json::json!({ "content": text }),
        )?;
        Ok(view.slot)
    }

    fn new_chat(&self, chat_type: ChatType) -> anyhow::Result<Slot> {
        let view: SlotView = self.post(&format!("/chats/{chat_type}/new"), serde_json::json!({}))?;
        Ok(view.slot)
    }

    /// Poll the slot until an assistant message follows `after`.
    fn wait_for_reply(
        &self,
        chat_type: ChatType,
        after: Option<Uuid>,
        timeout: Duration,
    ) -> anyhow::Result<Slot> {
        let deadline = Instant::now() + timeout;
        loop {
            let slot = self.slot(chat_type)?;
            if has_reply(&slot.messages, after) || Instant::now() >= deadline {
                return Ok(slot);
            }
            std::thread::sleep(REPLY_POLL_INTERVAL);
        }
    }
}

// ============================================================================
// Commands
// ============================================================================

fn do_status(api: &Api) -> anyhow::Result<()> {
    let health: serde_json::Value = api.get("/health")?;
    let auth: AuthView = api.get("/auth")?;

    println!("Fission server: {}", api.server);
    println!("  Status:  {}", health["status"].as_str().unwrap_or("unknown"));
    println!("  Version: {}", health["version"].as_str().unwrap_or("unknown"));
    println!("  Store:   {}", health["store"].as_str().unwrap_or("unknown"));
    println!("  View:    {}", auth.view);
    match (auth.loading, auth.user) {
        (true, _) => println!("  User:    (loading)"),
        (false, Some(user)) => println!("  User:    {}", user.email),
        (false, None) => println!("  User:    (signed out)"),
    }
    Ok(())
}

fn do_login(api: &Api, email: &str, password: Option<String>) -> anyhow::Result<()> {
    let password = match password {
        Some(p) => p,
        None => prompt("Password: ")?,
    };

    #[derive(Deserialize)]
    struct LoginView {
        user: User,
    }

    let view: LoginView = api.post(
        "/auth/login",
        serde_json::json!({ "email": email, "password": password }),
    )?;
    println!("Signed in as {}", view.user.email);
    Ok(())
}

fn do_logout(api: &Api) -> anyhow::Result<()> {
    let _: serde_json::Value = api.post("/auth/logout", serde_json::json!({}))?;
    println!("Signed out");
    Ok(())
}

fn do_whoami(api: &Api) -> anyhow::Result<()> {
    let auth: AuthView = api.get("/auth")?;
    match auth.user {
        Some(user) => println!("{}", user.email),
        None => bail!("not logged in"),
    }
    Ok(())
}

fn do_show(api: &Api, only: Option<ChatType>) -> anyhow::Result<()> {
    let dashboard: DashboardView = api.get("/dashboard")?;
    let mut first = true;
    for (chat_type, slot) in &dashboard.slots {
        if only.is_some_and(|ct| ct != *chat_type) {
            continue;
        }
        if !first {
            println!();
        }
        first = false;
        println!("{}", render_slot(*chat_type, slot));
    }
    Ok(())
}

fn do_send(
    api: &Api,
    chat_type: ChatType,
    text: &str,
    wait: bool,
    timeout: Duration,
) -> anyhow::Result<()> {
    let panel = ChatPanel::new(chat_type);
    let slot = api.send(chat_type, text)?;
    let Some(sent) = slot.messages.last().filter(|m| m.role == Role::User) else {
        bail!("message was not saved (see server log)");
    };
    println!("{}", panel.render_message(sent));

    if !wait {
        return Ok(());
    }
    let slot = api.wait_for_reply(chat_type, Some(sent.id), timeout)?;
    let replies = ChatPanel::unseen(&slot.messages, Some(sent.id));
    if replies.is_empty() {
        eprintln!("fission-cli: no reply within {}s", timeout.as_secs());
    }
    for message in replies {
        println!("{}", panel.render_message(message));
    }
    Ok(())
}

fn do_new(api: &Api, chat_type: ChatType) -> anyhow::Result<()> {
    let slot = api.new_chat(chat_type)?;
    match slot.session_id {
        Some(id) => println!("New {} chat: {}", chat_type.label(), id),
        None => bail!("could not start a new chat (see server log)"),
    }
    Ok(())
}

fn do_history(api: &Api) -> anyhow::Result<()> {
    let history: HistoryView = api.get("/history")?;
    print!("{}", render_history(&history.sessions));
    Ok(())
}

fn do_resume(api: &Api, session_id: Uuid) -> anyhow::Result<()> {
    let history: HistoryView = api.get("/history")?;
    let entry = history
        .sessions
        .iter()
        .find(|e| e.session_id == session_id)
        .ok_or_else(|| anyhow!("no chat {session_id} in history"))?;

    let view: SlotView = api.post(
        &format!("/chats/{}/load", entry.chat_type),
        serde_json::json!({ "session_id": session_id }),
    )?;
    if view.slot.session_id != Some(session_id) {
        bail!("could not load chat {session_id} (see server log)");
    }
    println!("{}", render_slot(entry.chat_type, &view.slot));
    Ok(())
}

fn do_chat(api: &Api, chat_type: ChatType, timeout: Duration) -> anyhow::Result<()> {
    let mut panel = ChatPanel::new(chat_type);
    let slot = api.slot(chat_type)?;
    println!("{}", panel.render(&slot.messages));
    panel.sync(&slot.messages);

    let stdin = std::io::stdin();
    loop {
        print!("{} > ", panel.placeholder());
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        match line.trim() {
            "/quit" | "/exit" => break,
            "/new" => {
                let slot = api.new_chat(chat_type)?;
                panel.sync(&slot.messages);
                println!("{}", panel.render(&slot.messages));
                continue;
            }
            _ => {}
        }

        panel.set_input(line.trim_end_matches(['\r', '\n']));
        let Some(text) = panel.submit() else {
            continue;
        };

        let before = panel.scroll_anchor();
        let slot = api.send(chat_type, &text)?;
        let slot = match slot.messages.last() {
            Some(sent) if sent.role == Role::User => {
                api.wait_for_reply(chat_type, Some(sent.id), timeout)?
            }
            _ => slot,
        };
        for message in ChatPanel::unseen(&slot.messages, before) {
            println!("{}", panel.render_message(message));
        }
        panel.sync(&slot.messages);
    }
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

fn prompt(label: &str) -> anyhow::Result<String> {
    print!("{label}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Pull the `error` field out of an API error body.
pub fn error_message(body: &serde_json::Value) -> String {
    body["error"]
        .as_str()
        .map(str::to_string)
        .unwrap_or_else(|| body.to_string())
}

/// True when an assistant message comes after `after` in the list.
pub fn has_reply(messages: &[ChatMessage], after: Option<Uuid>) -> bool {
    ChatPanel::unseen(messages, after)
        .iter()
        .any(|m| m.role == Role::Assistant)
}

pub fn render_slot(chat_type: ChatType, slot: &Slot) -> String {
    let panel = ChatPanel::new(chat_type);
    format!(
        "== {} ==\n{}",
        chat_type.label(),
        panel.render(&slot.messages)
    )
}

/// One line per session: label, title, age and id.
pub fn render_history(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return "No chat history yet\n".to_string();
    }
    entries
        .iter()
        .map(|e| {
            format!(
                "{:<7} {:<50} {:>10}  {}\n",
                e.label, e.title, e.age, e.session_id
            )
        })
        .collect()
}

// ============================================================================
// Main
// ============================================================================

fn main() {
    let cli = Cli::parse();
    let timeout = Duration::from_secs(cli.reply_timeout);

    let result = Api::new(&cli.server).and_then(|api| match cli.command {
        Commands::Status => do_status(&api),
        Commands::Login { email, password } => do_login(&api, &email, password),
        Commands::Logout => do_logout(&api),
        Commands::Whoami => do_whoami(&api),
        Commands::Show { chat_type } => do_show(&api, chat_type),
        Commands::Send {
            chat_type,
            text,
            no_wait,
        } => do_send(&api, chat_type, &text.join(" "), !no_wait, timeout),
        Commands::New { chat_type } => do_new(&api, chat_type),
        Commands::History => do_history(&api),
        Commands::Resume { session_id } => do_resume(&api, session_id),
        Commands::Chat { chat_type } => do_chat(&api, chat_type, timeout),
    });

    if let Err(e) = result {
        eprintln!("fission-cli: {:#}", e);
        std::process::exit(1);
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
