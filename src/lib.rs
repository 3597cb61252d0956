//! Telegram Group Sender Library
//!
//! This library provides tools to:
//! - Authorize a Telegram account and reuse the saved session
//! - Resolve a group or channel by id or username
//! - List chats and join groups by invite link
//! - Post messages once, on a timer, or on a counted schedule

pub mod auth;
pub mod config;
pub mod error;
pub mod menu;
pub mod messenger;
pub mod resolver;
pub mod sender;
pub mod session;
pub mod target;
pub mod telegram;

#[cfg(test)]
mod test_support;

// Re-export common types
pub use config::{Config, SenderDefaults};
pub use error::{Error, Result};
pub use messenger::{ChatKind, Destination, JoinedChat, Messenger, SentMessage};
pub use sender::{GroupSender, RunSummary};
pub use session::{SessionLock, TelegramClient};
pub use target::Target;
pub use telegram::TelegramMessenger;
