//! Configuration for Telegram API credentials and sender defaults
//!
//! Loads configuration from config.yml file, with `.env` and environment
//! variables taking precedence for credentials.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::warn;

use crate::error::{Error, Result};

/// Default constants (fallback if config.yml not found)
pub const SESSION_NAME: &str = "group_sender";
pub const DEFAULT_TARGET: &str = "3669051362";
pub const DEFAULT_MESSAGE: &str = "Привет!";
pub const DEFAULT_TIMER_MESSAGE: &str = "/drink@BestPivo_bot";
pub const DEFAULT_TIMER_SECONDS: u64 = 3600;
pub const DEFAULT_INTERVAL_MINUTES: u64 = 1;
pub const DEFAULT_DIALOG_LIMIT: usize = 50;

/// YAML config structures
#[derive(Debug, Deserialize)]
struct YamlConfig {
    telegram: Option<TelegramConfig>,
    sender: Option<SenderConfig>,
}

#[derive(Debug, Default, Deserialize)]
struct TelegramConfig {
    #[serde(default, deserialize_with = "deserialize_string_or_number")]
    api_id: Option<String>,
    api_hash: Option<String>,
    phone: Option<String>,
    session_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SenderConfig {
    #[serde(default, deserialize_with = "deserialize_string_or_number")]
    default_target: Option<String>,
    default_message: Option<String>,
    timer_message: Option<String>,
    timer_seconds: Option<u64>,
    interval_minutes: Option<u64>,
    dialog_limit: Option<usize>,
}

/// Deserialize a value that can be either a string or a number
fn deserialize_string_or_number<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    let value: Option<serde_yaml::Value> = Option::deserialize(deserializer)?;
    match value {
        None => Ok(None),
        Some(serde_yaml::Value::String(s)) => Ok(Some(s)),
        Some(serde_yaml::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "expected string or number, got {:?}",
            other
        ))),
    }
}

/// Defaults used by the interactive menu and the CLI subcommands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderDefaults {
    pub target: String,
    pub message: String,
    pub timer_message: String,
    pub timer_seconds: u64,
    pub interval_minutes: u64,
    pub dialog_limit: usize,
}

impl Default for SenderDefaults {
    fn default() -> Self {
        Self {
            target: DEFAULT_TARGET.to_string(),
            message: DEFAULT_MESSAGE.to_string(),
            timer_message: DEFAULT_TIMER_MESSAGE.to_string(),
            timer_seconds: DEFAULT_TIMER_SECONDS,
            interval_minutes: DEFAULT_INTERVAL_MINUTES,
            dialog_limit: DEFAULT_DIALOG_LIMIT,
        }
    }
}

/// Main configuration struct
#[derive(Debug, Clone)]
pub struct Config {
    pub phone: String,
    pub api_id: i32,
    pub api_hash: String,
    pub session_name: String,
    pub sender: SenderDefaults,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Load configuration from config.yml or use defaults
    /// Environment variables take precedence over config.yml values
    pub fn new() -> Self {
        Self::load_first(&[Path::new("config.yml"), Path::new("../config.yml")])
    }

    /// First readable config among `paths`; a file that exists but does not
    /// parse is reported and skipped.
    fn load_first(paths: &[&Path]) -> Self {
        for path in paths.iter().filter(|p| p.exists()) {
            match Self::load_from_file(path) {
                Ok(config) => return config,
                Err(err) => warn!("Ignoring {}: {}", path.display(), err),
            }
        }
        Self::from_env()
    }

    /// Resolve a value: prefer env var if config value looks like ${VAR}
    fn resolve_env_string(value: Option<String>, env_key: &str) -> String {
        if let Some(ref v) = value {
            if let Some(var_name) = placeholder_name(v) {
                if let Ok(env_val) = std::env::var(var_name) {
                    return env_val;
                }
            }
        }
        if let Ok(env_val) = std::env::var(env_key) {
            return env_val;
        }
        value
            .filter(|v| placeholder_name(v).is_none())
            .unwrap_or_default()
    }

    /// Resolve an integer value from string config or env var
    fn resolve_env_i32(value: Option<String>, env_key: &str) -> i32 {
        if let Some(ref v) = value {
            if let Some(var_name) = placeholder_name(v) {
                if let Some(parsed) = std::env::var(var_name)
                    .ok()
                    .and_then(|s| s.parse::<i32>().ok())
                {
                    return parsed;
                }
            }
            // Explicit numbers in YAML win over the environment
            if let Ok(parsed) = v.parse::<i32>() {
                return parsed;
            }
        }
        std::env::var(env_key)
            .ok()
            .and_then(|s| s.parse::<i32>().ok())
            .unwrap_or(0)
    }

    /// Load .env file into environment variables using dotenvy
    fn load_dotenv() {
        if dotenvy::dotenv().is_err() {
            let _ = dotenvy::from_filename("../.env");
        }
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load_dotenv();

        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_yaml_str(&content)
    }

    /// Parse configuration from YAML text
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let yaml: YamlConfig = serde_yaml::from_str(content)?;

        let telegram = yaml.telegram.unwrap_or_default();
        let sender = yaml.sender.unwrap_or_default();
        let fallback = SenderDefaults::default();

        Ok(Self {
            api_id: Self::resolve_env_i32(telegram.api_id, "TELEGRAM_API_ID"),
            api_hash: Self::resolve_env_string(telegram.api_hash, "TELEGRAM_API_HASH"),
            phone: Self::resolve_env_string(telegram.phone, "TELEGRAM_PHONE"),
            session_name: telegram
                .session_name
                .unwrap_or_else(|| SESSION_NAME.to_string()),
            sender: SenderDefaults {
                target: sender.default_target.unwrap_or(fallback.target),
                message: sender.default_message.unwrap_or(fallback.message),
                timer_message: sender.timer_message.unwrap_or(fallback.timer_message),
                timer_seconds: sender.timer_seconds.unwrap_or(fallback.timer_seconds),
                interval_minutes: sender
                    .interval_minutes
                    .filter(|m| *m > 0)
                    .unwrap_or(fallback.interval_minutes),
                dialog_limit: sender
                    .dialog_limit
                    .filter(|l| *l > 0)
                    .unwrap_or(fallback.dialog_limit),
            },
        })
    }

    /// Defaults with credentials taken from the environment only
    pub fn from_env() -> Self {
        Self::load_dotenv();
        Self {
            phone: Self::resolve_env_string(None, "TELEGRAM_PHONE"),
            api_id: Self::resolve_env_i32(None, "TELEGRAM_API_ID"),
            api_hash: Self::resolve_env_string(None, "TELEGRAM_API_HASH"),
            session_name: SESSION_NAME.to_string(),
            sender: SenderDefaults::default(),
        }
    }

    /// Path of the SQLite session file
    pub fn session_file(&self) -> String {
        format!("{}.session", self.session_name)
    }

    /// Path of the lock file guarding the session
    pub fn lock_file(&self) -> String {
        format!("{}.lock", self.session_name)
    }

    /// Fail early when API credentials are missing
    pub fn validate(&self) -> Result<()> {
        if self.api_id == 0 || self.api_hash.is_empty() {
            return Err(Error::Config(
                "TELEGRAM_API_ID and TELEGRAM_API_HASH are required (config.yml or .env)"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

fn placeholder_name(value: &str) -> Option<&str> {
    value
        .strip_prefix("${")
        .and_then(|rest| rest.strip_suffix('}'))
}
