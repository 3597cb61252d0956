//! Group sender: chat listing, invite joins, one-off and periodic posting
//!
//! All network work goes through a [`Messenger`]. The periodic loops take a
//! [`CancellationToken`]; it is checked once per iteration and once per second
//! of the countdown, and interrupts flood waits.

use std::io::{self, Write};
use std::time::Duration;

use chrono::{Local, NaiveTime};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::SenderDefaults;
use crate::error::{Error, Result};
use crate::messenger::{Destination, JoinedChat, Messenger, SentMessage};
use crate::resolver;
use crate::target::{parse_invite_hash, Target};

const SEPARATOR_WIDTH: usize = 60;

/// Counters reported when a sending loop ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub sent: u64,
    pub failed: u64,
}

pub struct GroupSender<M> {
    messenger: M,
    defaults: SenderDefaults,
}

impl<M: Messenger> GroupSender<M> {
    pub fn new(messenger: M, defaults: SenderDefaults) -> Self {
        Self {
            messenger,
            defaults,
        }
    }

    pub fn defaults(&self) -> &SenderDefaults {
        &self.defaults
    }

    pub fn messenger(&self) -> &M {
        &self.messenger
    }

    pub fn into_messenger(self) -> M {
        self.messenger
    }

    /// Resolve a target through the ordered lookup chain.
    pub async fn resolve(&self, target: &Target) -> Result<Destination> {
        resolver::resolve(&self.messenger, target).await
    }

    /// Print the account's recent dialogs as a numbered table.
    pub async fn list_chats(&self, limit: usize) -> Result<Vec<Destination>> {
        let dialogs = self.messenger.dialogs(Some(limit)).await.map_err(|e| {
            error!("Ошибка получения чатов: {}", e);
            e
        })?;

        let rule = "=".repeat(SEPARATOR_WIDTH);
        println!("\n{}", rule);
        println!("ДОСТУПНЫЕ ЧАТЫ:");
        println!("{}", rule);
        for (i, chat) in dialogs.iter().enumerate() {
            println!("{}", format_chat_row(i + 1, chat));
        }
        println!("{}", rule);
        println!("💡 Для отправки сообщения используйте ID из столбца 'ID'");
        println!("{}", rule);

        Ok(dialogs)
    }

    /// Join a chat by invite link. `Ok(None)` means the account is already a member.
    pub async fn join_by_link(&self, link: &str) -> Result<Option<JoinedChat>> {
        let hash = parse_invite_hash(link)?;

        match self.messenger.import_invite(&hash).await {
            Ok(chat) => {
                info!("Успешно вступили в группу: {}", chat.title);
                Ok(Some(chat))
            }
            Err(Error::AlreadyParticipant) => {
                info!("Вы уже участник этой группы");
                Ok(None)
            }
            Err(err) => {
                error!("Ошибка вступления в группу: {}", err);
                Err(err)
            }
        }
    }

    /// Resolve and send once, retrying a single time after a flood wait.
    pub async fn send_to_group(
        &self,
        target: &Target,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<SentMessage> {
        let destination = self.resolve(target).await?;
        self.send_to_destination(&destination, text, cancel).await
    }

    /// Send to an already resolved destination with the flood-wait retry.
    pub async fn send_to_destination(
        &self,
        destination: &Destination,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<SentMessage> {
        let result = match self.messenger.send_text(destination, text).await {
            Err(Error::FloodWait { seconds }) => {
                error!("⏳ Лимит сообщений! Ждите {} секунд", seconds);
                tokio::select! {
                    _ = cancel.cancelled() => return Err(Error::Cancelled),
                    _ = sleep(Duration::from_secs(seconds)) => {}
                }
                self.messenger.send_text(destination, text).await
            }
            other => other,
        };

        match &result {
            Ok(_) => info!(
                "✅ Сообщение отправлено в '{}'",
                destination.display_name()
            ),
            Err(Error::ChatWriteForbidden) => {
                error!("❌ Нет прав на отправку сообщений в эту группу")
            }
            Err(Error::ChannelInvalid) => error!("❌ Неверный ID группы или вы не участник"),
            Err(err) => error!("❌ Ошибка отправки: {}", err),
        }

        result
    }

    /// Send the same text every `period` until cancelled.
    pub async fn send_on_timer(
        &self,
        target: &Target,
        text: &str,
        period: Duration,
        cancel: &CancellationToken,
    ) -> Result<RunSummary> {
        let destination = self.resolve(target).await?;
        let mut summary = RunSummary::default();

        while !cancel.is_cancelled() {
            match self.send_to_destination(&destination, text, cancel).await {
                Ok(_) => summary.sent += 1,
                Err(Error::Cancelled) => break,
                Err(err) if err.is_unrecoverable() => return Err(err),
                Err(_) => summary.failed += 1,
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = sleep(period) => {}
            }
        }

        info!("Остановлено пользователем");
        Ok(summary)
    }

    /// Periodic send with a running counter, timestamp and visible countdown.
    pub async fn schedule_to_group(
        &self,
        target: &Target,
        text: &str,
        interval_minutes: u64,
        cancel: &CancellationToken,
    ) -> Result<RunSummary> {
        let interval_seconds = interval_minutes.max(1).saturating_mul(60);

        let destination = self.resolve(target).await.map_err(|e| {
            error!("Ошибка доступа к группе: {}", e);
            e
        })?;

        print_banner(&destination, target, text, interval_minutes);

        let mut summary = RunSummary::default();
        let mut counter: u64 = 1;

        while !cancel.is_cancelled() {
            let now = Local::now().time();
            let stamp = now.format("%H:%M:%S").to_string();
            let full_message = compose_message(text, counter, now);

            info!("[{}] Отправка #{}...", stamp, counter);
            match self
                .send_to_destination(&destination, &full_message, cancel)
                .await
            {
                Ok(sent) => {
                    summary.sent += 1;
                    println!("[{}] ✅ #{} отправлено (ID: {})", stamp, counter, sent.id);
                }
                Err(Error::Cancelled) => break,
                Err(err) if err.is_unrecoverable() => {
                    error!("Критическая ошибка: {}", err);
                    return Err(err);
                }
                Err(_) => {
                    summary.failed += 1;
                    println!("[{}] ❌ #{} не отправлено", stamp, counter);
                }
            }

            counter += 1;
            countdown(interval_seconds, cancel).await;
        }

        info!("Остановлено пользователем");
        Ok(summary)
    }
}

/// Wait `seconds`, redrawing a `MM:SS` countdown once per second.
async fn countdown(seconds: u64, cancel: &CancellationToken) {
    let mut stdout = io::stdout();
    for remaining in (1..=seconds).rev() {
        if cancel.is_cancelled() {
            break;
        }
        print!("{}\r", format_countdown(remaining));
        if let Err(err) = stdout.flush() {
            warn!("stdout flush failed: {}", err);
        }
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = sleep(Duration::from_secs(1)) => {}
        }
    }
    print!("{}\r", " ".repeat(50));
    let _ = stdout.flush();
}

fn print_banner(destination: &Destination, target: &Target, text: &str, interval_minutes: u64) {
    let rule = "=".repeat(SEPARATOR_WIDTH);
    println!("\n{}", rule);
    println!("🚀 ЗАПУСК ОТПРАВКИ В ГРУППУ");
    println!("{}", rule);
    println!("Группа: {}", destination.display_name());
    println!("ID: {}", target);
    println!("Сообщение: '{}'", text);
    println!("Интервал: {} минута(ы)", interval_minutes);
    println!("{}", rule);
    println!("Нажмите Ctrl+C для остановки");
    println!("{}\n", rule);
}

/// Message body used by the periodic schedule.
pub fn compose_message(base: &str, counter: u64, time: NaiveTime) -> String {
    format!(
        "{}\n\nСообщение #{}\nВремя: {}",
        base,
        counter,
        time.format("%H:%M:%S")
    )
}

pub fn format_countdown(remaining: u64) -> String {
    let (mins, secs) = (remaining / 60, remaining % 60);
    format!("   Следующее сообщение через: {:02}:{:02}", mins, secs)
}

pub fn format_chat_row(index: usize, chat: &Destination) -> String {
    format!(
        "{:2}. {} | ID: {:15} | {}",
        index,
        chat.kind.label(),
        chat.id,
        chat.title
    )
}
