//! Interactive authorization
//!
//! Reuses an authorized session when there is one; otherwise asks for the
//! phone number, the login code and, if the account has one, the 2FA password.

use std::io::{BufRead, Write};

use grammers_client::{Client, SignInError};
use tracing::info;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::menu::prompt;

const BANNER_WIDTH: usize = 50;

/// Make sure the client is signed in and log the current account.
pub async fn ensure_authorized<R, W>(
    client: &Client,
    config: &Config,
    input: &mut R,
    out: &mut W,
) -> Result<()>
where
    R: BufRead,
    W: Write,
{
    if client.is_authorized().await? {
        info!("Используем сохраненную сессию");
    } else {
        info!("Требуется авторизация...");
        authorize(client, config, input, out).await?;
    }

    let me = client.get_me().await?;
    info!(
        "Авторизован как: {} (ID: {})",
        display_user(me.username(), &me.full_name()),
        me.raw.id()
    );
    Ok(())
}

async fn authorize<R, W>(client: &Client, config: &Config, input: &mut R, out: &mut W) -> Result<()>
where
    R: BufRead,
    W: Write,
{
    let rule = "=".repeat(BANNER_WIDTH);
    writeln!(out, "\n{}\nАВТОРИЗАЦИЯ\n{}", rule, rule)?;

    let phone = if config.phone.trim().is_empty() {
        prompt(input, out, "Введите номер телефона (+79991234567): ")?
    } else {
        config.phone.trim().to_string()
    };
    if phone.is_empty() {
        return Err(Error::AuthorizationFailed("номер телефона не указан".into()));
    }

    let token = client
        .request_login_code(&phone, &config.api_hash)
        .await
        .map_err(|e| Error::AuthorizationFailed(format!("Failed to request code: {}", e)))?;

    let code = prompt(input, out, "Введите код из Telegram: ")?;

    match client.sign_in(&token, &code).await {
        Ok(_) => Ok(()),
        Err(SignInError::PasswordRequired(password_token)) => {
            let label = match password_token.hint() {
                Some(hint) => format!(
                    "Введите пароль двухфакторной аутентификации (подсказка: {}): ",
                    hint
                ),
                None => "Введите пароль двухфакторной аутентификации: ".to_string(),
            };
            let password = prompt(input, out, &label)?;
            client
                .check_password(password_token, password.as_bytes())
                .await
                .map(|_| ())
                .map_err(|e| Error::AuthorizationFailed(format!("Failed to check password: {}", e)))
        }
        Err(e) => Err(Error::AuthorizationFailed(format!("Failed to sign in: {}", e))),
    }
}

/// Username when set, otherwise the full name.
pub fn display_user(username: Option<&str>, full_name: &str) -> String {
    match username {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => full_name.trim().to_string(),
    }
}
