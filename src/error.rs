//! Error types for the group sender

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Session file error: {0}")]
    SessionError(String),

    #[error("Session is locked by another process")]
    SessionLocked,

    #[error("Failed to acquire session lock: {0}")]
    LockError(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authorization failed: {0}")]
    AuthorizationFailed(String),

    #[error("Telegram API error: {0}")]
    TelegramError(String),

    #[error("Destination not found: {0}")]
    ChatNotFound(String),

    #[error("Writing to this chat is forbidden")]
    ChatWriteForbidden,

    #[error("Invalid channel or not a participant")]
    ChannelInvalid,

    #[error("Flood wait: retry after {seconds} seconds")]
    FloodWait { seconds: u64 },

    #[error("Already a participant of this chat")]
    AlreadyParticipant,

    #[error("Invalid invite link: {0}")]
    InvalidInvite(String),

    #[error("Stopped by user")]
    Cancelled,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Map an RPC error name (and its numeric value, if any) to a typed error.
    pub fn from_rpc(name: &str, value: Option<u32>, raw: impl Into<String>) -> Self {
        match name {
            "CHAT_WRITE_FORBIDDEN" | "CHAT_ADMIN_REQUIRED" | "CHAT_RESTRICTED" => {
                Error::ChatWriteForbidden
            }
            "CHANNEL_INVALID" | "CHANNEL_PRIVATE" | "PEER_ID_INVALID" => Error::ChannelInvalid,
            "FLOOD_WAIT" | "SLOWMODE_WAIT" | "FLOOD_PREMIUM_WAIT" => Error::FloodWait {
                seconds: value.map(u64::from).unwrap_or(0),
            },
            "USER_ALREADY_PARTICIPANT" => Error::AlreadyParticipant,
            "INVITE_HASH_EXPIRED" | "INVITE_HASH_INVALID" | "INVITE_HASH_EMPTY" => {
                Error::InvalidInvite(name.to_string())
            }
            _ => {
                let raw = raw.into();
                match parse_flood_wait_seconds(&raw) {
                    Some(seconds) => Error::FloodWait { seconds },
                    None => Error::TelegramError(raw),
                }
            }
        }
    }

    /// Errors after which retrying the same destination is pointless.
    pub fn is_unrecoverable(&self) -> bool {
        matches!(
            self,
            Error::ChatWriteForbidden
                | Error::ChannelInvalid
                | Error::ChatNotFound(_)
                | Error::AuthorizationFailed(_)
                | Error::SessionLocked
        )
    }
}

impl From<grammers_client::InvocationError> for Error {
    fn from(err: grammers_client::InvocationError) -> Self {
        match &err {
            grammers_client::InvocationError::Rpc(rpc) => {
                Error::from_rpc(&rpc.name, rpc.value, err.to_string())
            }
            _ => Error::TelegramError(err.to_string()),
        }
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Config(err.to_string())
    }
}

/// Extract flood wait seconds from an error string (best-effort)
pub fn parse_flood_wait_seconds(error: &str) -> Option<u64> {
    if let Some(idx) = error.find("FLOOD_WAIT_") {
        let start = idx + "FLOOD_WAIT_".len();
        let secs = error[start..]
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect::<String>();
        if let Ok(v) = secs.parse::<u64>() {
            return Some(v);
        }
    }

    if error.contains("FLOOD_WAIT") {
        if let Some(idx) = error.find("value:") {
            let start = idx + "value:".len();
            let secs = error[start..]
                .trim_start()
                .trim_start_matches("Some(")
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect::<String>();
            if let Ok(v) = secs.parse::<u64>() {
                return Some(v);
            }
        }
    }

    None
}
