//! Interactive numbered menu
//!
//! Reads every parameter from the given input, falling back to the configured
//! defaults for blank answers.

use std::io::{BufRead, Write};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::error;

use crate::error::{Error, Result};
use crate::messenger::Messenger;
use crate::sender::GroupSender;
use crate::target::Target;

/// Menu entries, numbered as shown to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    ListChats,
    JoinByLink,
    SendOnTimer,
    Schedule,
}

impl MenuChoice {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(MenuChoice::ListChats),
            "2" => Some(MenuChoice::JoinByLink),
            "3" => Some(MenuChoice::SendOnTimer),
            "4" => Some(MenuChoice::Schedule),
            _ => None,
        }
    }
}

/// Write `label`, then read one trimmed line. EOF reads as an empty answer.
pub fn prompt<R, W>(input: &mut R, out: &mut W, label: &str) -> Result<String>
where
    R: BufRead,
    W: Write,
{
    write!(out, "{}", label)?;
    out.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Period in seconds; blank input takes `default`.
pub fn parse_seconds(input: &str, default: u64) -> Result<u64> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(default);
    }
    match input.parse::<u64>() {
        Ok(0) | Err(_) => Err(Error::InvalidArgument(format!(
            "Неверное время: '{}'",
            input
        ))),
        Ok(seconds) => Ok(seconds),
    }
}

/// Interval in minutes; anything but a positive number takes `default`.
pub fn parse_minutes(input: &str, default: u64) -> u64 {
    let input = input.trim();
    if input.is_empty() || !input.chars().all(|c| c.is_ascii_digit()) {
        return default;
    }
    input.parse::<u64>().ok().filter(|m| *m > 0).unwrap_or(default)
}

fn text_or_default(input: String, default: &str) -> String {
    if input.is_empty() {
        default.to_string()
    } else {
        input
    }
}

/// Show the menu, read one choice and run it.
pub async fn run_menu<M, R, W>(
    sender: &GroupSender<M>,
    input: &mut R,
    out: &mut W,
    cancel: &CancellationToken,
) -> Result<()>
where
    M: Messenger,
    R: BufRead,
    W: Write,
{
    writeln!(out, "\n1. Получить список чатов")?;
    writeln!(out, "2. Вступить в группу по ссылке")?;
    writeln!(out, "3. Отправить сообщение в группу")?;
    writeln!(out, "4. Запустить периодическую отправку")?;

    let choice = prompt(input, out, "\nВыберите действие (1-4): ")?;
    let Some(choice) = MenuChoice::parse(&choice) else {
        writeln!(out, "Неверный выбор!")?;
        return Ok(());
    };

    let defaults = sender.defaults().clone();

    match choice {
        MenuChoice::ListChats => {
            sender.list_chats(defaults.dialog_limit).await?;
        }
        MenuChoice::JoinByLink => {
            let link = prompt(input, out, "Введите ссылку-приглашение: ")?;
            if let Some(chat) = sender.join_by_link(&link).await? {
                writeln!(out, "ID группы: {}", chat.id)?;
            }
        }
        MenuChoice::SendOnTimer => {
            let raw_target = prompt(
                input,
                out,
                &format!("Введите ID группы или username:({}) ", defaults.target),
            )?;
            let message = text_or_default(
                prompt(
                    input,
                    out,
                    &format!("Введите сообщение('{}'): ", defaults.timer_message),
                )?,
                &defaults.timer_message,
            );
            let raw_seconds = prompt(input, out, "Введите время в секундах: ")?;

            let seconds = match parse_seconds(&raw_seconds, defaults.timer_seconds) {
                Ok(seconds) => seconds,
                Err(_) => {
                    writeln!(out, "❌ Неверный формат времени!")?;
                    return Ok(());
                }
            };
            writeln!(out, "Установлено время: {} секунд", seconds)?;

            let Some(target) = parse_target_or_report(&raw_target, &defaults.target, out)? else {
                return Ok(());
            };
            let summary = sender
                .send_on_timer(&target, &message, Duration::from_secs(seconds), cancel)
                .await?;
            writeln!(
                out,
                "Отправлено: {}, ошибок: {}",
                summary.sent, summary.failed
            )?;
        }
        MenuChoice::Schedule => {
            let raw_target = prompt(input, out, "Введите ID группы или username: ")?;
            let message = text_or_default(
                prompt(
                    input,
                    out,
                    &format!("Введите сообщение (по умолчанию '{}'): ", defaults.message),
                )?,
                &defaults.message,
            );
            let raw_interval = prompt(
                input,
                out,
                &format!(
                    "Интервал в минутах (по умолчанию {}): ",
                    defaults.interval_minutes
                ),
            )?;
            let interval = parse_minutes(&raw_interval, defaults.interval_minutes);

            let Some(target) = parse_target_or_report(&raw_target, &defaults.target, out)? else {
                return Ok(());
            };
            match sender
                .schedule_to_group(&target, &message, interval, cancel)
                .await
            {
                Ok(summary) => writeln!(
                    out,
                    "Отправлено: {}, ошибок: {}",
                    summary.sent, summary.failed
                )?,
                // Already reported by the sender
                Err(Error::ChatNotFound(_)) => {}
                Err(err) => return Err(err),
            }
        }
    }

    Ok(())
}

fn parse_target_or_report<W: Write>(
    raw: &str,
    default: &str,
    out: &mut W,
) -> Result<Option<Target>> {
    match Target::parse(raw, default) {
        Ok(target) => Ok(Some(target)),
        Err(err) => {
            error!("{}", err);
            writeln!(out, "❌ Неверный формат ID!")?;
            Ok(None)
        }
    }
}
