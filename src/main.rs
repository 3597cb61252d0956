//! Group Sender CLI - main entry point
//!
//! Without a subcommand the interactive menu is shown.

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

use group_sender::{
    auth, menu, Config, GroupSender, SessionLock, Target, TelegramClient, TelegramMessenger,
};

#[derive(Parser)]
#[command(name = "group_sender")]
#[command(about = "Telegram group sender", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config.yml (defaults to ./config.yml, then ../config.yml)
    #[arg(short, long, env = "GROUP_SENDER_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List recent chats with their ids
    ListChats {
        /// Number of dialogs to fetch
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Join a group by invite link
    Join {
        /// Invite link (https://t.me/+HASH) or bare hash
        link: String,
    },

    /// Send a message once, or repeatedly with --every
    Send {
        /// Group id (numeric) or @username
        target: String,

        /// Message text
        message: String,

        /// Repeat every N seconds until Ctrl+C
        #[arg(long)]
        every: Option<u64>,
    },

    /// Periodic send with counter and timestamp
    Schedule {
        /// Group id (numeric) or @username
        target: String,

        /// Base message text
        #[arg(short, long)]
        message: Option<String>,

        /// Interval in minutes
        #[arg(short, long)]
        interval: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env for local development
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("group_sender=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::new(),
    };

    let rule = "=".repeat(60);
    println!("{}\nTELEGRAM GROUP SENDER\n{}", rule, rule);

    let _lock = SessionLock::acquire(config.lock_file())?;
    let client = TelegramClient::connect(&config).await?;

    {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut out = io::stdout();
        let authorized = auth::ensure_authorized(&client, &config, &mut input, &mut out).await;
        if let Err(err) = authorized {
            error!("Ошибка подключения: {}", err);
            client.disconnect();
            return Err(err.into());
        }
    }

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    let sender = GroupSender::new(TelegramMessenger::new(client), config.sender.clone());
    let result = execute(&sender, cli.command, &cancel).await;

    cancel.cancel();
    sender.into_messenger().disconnect();

    if let Err(err) = &result {
        error!("Ошибка: {}", err);
    }
    result
}

async fn execute(
    sender: &GroupSender<TelegramMessenger>,
    command: Option<Commands>,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    let defaults = sender.defaults().clone();

    match command {
        None => {
            let stdin = io::stdin();
            let mut input = stdin.lock();
            let mut out = io::stdout();
            menu::run_menu(sender, &mut input, &mut out, cancel).await?;
            out.flush()?;
        }
        Some(Commands::ListChats { limit }) => {
            sender
                .list_chats(limit.unwrap_or(defaults.dialog_limit))
                .await?;
        }
        Some(Commands::Join { link }) => {
            if let Some(chat) = sender.join_by_link(&link).await? {
                println!("ID группы: {}", chat.id);
            }
        }
        Some(Commands::Send {
            target,
            message,
            every,
        }) => {
            let target = Target::parse(&target, &defaults.target)?;
            match every {
                Some(seconds) if seconds > 0 => {
                    sender
                        .send_on_timer(&target, &message, Duration::from_secs(seconds), cancel)
                        .await?;
                }
                _ => {
                    let sent = sender.send_to_group(&target, &message, cancel).await?;
                    println!("✅ Отправлено (ID: {})", sent.id);
                }
            }
        }
        Some(Commands::Schedule {
            target,
            message,
            interval,
        }) => {
            let target = Target::parse(&target, &defaults.target)?;
            let message = message.unwrap_or(defaults.message);
            let interval = interval
                .filter(|m| *m > 0)
                .unwrap_or(defaults.interval_minutes);
            let summary = sender
                .schedule_to_group(&target, &message, interval, cancel)
                .await?;
            println!("Отправлено: {}, ошибок: {}", summary.sent, summary.failed);
        }
    }

    Ok(())
}

/// First Ctrl+C stops the running loop; a second one exits immediately.
fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            warn!("Ctrl+C handler unavailable");
            return;
        }
        println!("\nОстановлено");
        cancel.cancel();

        if tokio::signal::ctrl_c().await.is_ok() {
            println!("\nПрограмма завершена");
            std::process::exit(130);
        }
    });
}
