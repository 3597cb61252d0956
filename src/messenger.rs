//! Platform seam between the sender logic and the Telegram client
//!
//! [`Messenger`] exposes the handful of SDK calls the tool needs. The
//! grammers-backed implementation lives in [`crate::telegram`]; tests drive the
//! sender with scripted implementations.

use std::fmt;

use async_trait::async_trait;

use crate::error::Result;

/// Kind of conversation, as shown in the chat list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatKind {
    User,
    Bot,
    Group,
    Supergroup,
    Gigagroup,
    Channel,
}

impl ChatKind {
    pub fn label(&self) -> &'static str {
        match self {
            ChatKind::User | ChatKind::Bot => "👤 Личный",
            ChatKind::Group => "💬 Группа",
            ChatKind::Supergroup => "👥 Супергруппа",
            ChatKind::Gigagroup => "👥 Гигагруппа",
            ChatKind::Channel => "📢 Канал",
        }
    }
}

/// A resolved conversation the account can post to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub id: i64,
    pub title: String,
    pub username: Option<String>,
    pub kind: ChatKind,
}

impl Destination {
    /// Name used in log lines: title, falling back to the id.
    pub fn display_name(&self) -> String {
        if self.title.trim().is_empty() {
            format!("ID: {}", self.id)
        } else {
            self.title.clone()
        }
    }

    /// Case-insensitive handle comparison, `@` optional on both sides.
    pub fn has_username(&self, handle: &str) -> bool {
        let handle = handle.trim_start_matches('@');
        self.username
            .as_deref()
            .map(|u| u.trim_start_matches('@').eq_ignore_ascii_case(handle))
            .unwrap_or(false)
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.display_name(), self.id)
    }
}

/// Result of a successful send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentMessage {
    pub id: i32,
}

/// Chat joined through an invite link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinedChat {
    pub id: i64,
    pub title: String,
}

#[async_trait]
pub trait Messenger: Send + Sync {
    /// Look a destination up in the client's peer cache without network calls.
    async fn cached_peer(&self, id: i64) -> Result<Option<Destination>>;

    /// Fetch recent dialogs, at most `limit` of them; `None` walks the whole list.
    async fn dialogs(&self, limit: Option<usize>) -> Result<Vec<Destination>>;

    /// Resolve a public handle (without `@`).
    async fn resolve_username(&self, username: &str) -> Result<Option<Destination>>;

    /// Send plain text to a previously resolved destination.
    async fn send_text(&self, destination: &Destination, text: &str) -> Result<SentMessage>;

    /// Import a chat invite by hash.
    async fn import_invite(&self, hash: &str) -> Result<JoinedChat>;
}
