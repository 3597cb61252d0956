//! Session management for Telegram client
//!
//! Provides:
//! - File-based session locking to prevent parallel execution
//! - Client creation over a persistent SQLite session

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use fs2::FileExt;
use grammers_client::Client;
use grammers_mtsender::SenderPool;
use grammers_session::storages::SqliteSession;
use tracing::info;

use crate::config::Config;
use crate::error::{Error, Result};

/// Session lock guard that ensures exclusive access to the Telegram session.
pub struct SessionLock {
    path: PathBuf,
    lock_file: Option<File>,
}

impl SessionLock {
    /// Acquire an exclusive lock on the session.
    pub fn acquire(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let lock_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .map_err(|e| Error::LockError(format!("Failed to open lock file: {}", e)))?;

        match lock_file.try_lock_exclusive() {
            Ok(()) => Ok(Self {
                path,
                lock_file: Some(lock_file),
            }),
            Err(_) => {
                eprintln!(
                    r#"
⚠️  ОШИБКА: Telegram сессия уже используется другим процессом!

Параллельное использование одной сессии может привести к конфликтам и блокировкам.
Подождите, пока завершится другой процесс, и попробуйте снова.
"#
                );
                Err(Error::SessionLocked)
            }
        }
    }

    /// Release the lock manually
    pub fn release(&mut self) {
        if let Some(file) = self.lock_file.take() {
            let _ = file.unlock();
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

impl Drop for SessionLock {
    fn drop(&mut self) {
        self.release();
    }
}

/// Open the session file, creating an empty one on first run.
pub fn open_session(path: impl AsRef<Path>) -> Result<Arc<SqliteSession>> {
    let path = path.as_ref();
    if !path.exists() {
        info!("Session file {} not found, a new one will be created", path.display());
    }
    let session = SqliteSession::open(path)
        .map_err(|e| Error::SessionError(format!("{}: {}", path.display(), e)))?;
    Ok(Arc::new(session))
}

/// Client plus the task driving its sender pool
pub struct TelegramClient {
    pub client: Client,
    runner: tokio::task::JoinHandle<()>,
}

impl TelegramClient {
    /// Connect using the session configured in `config`.
    pub async fn connect(config: &Config) -> Result<Self> {
        config.validate()?;
        let session = open_session(config.session_file())?;
        let pool = SenderPool::new(session, config.api_id);

        let client = Client::new(&pool);

        let SenderPool { runner, .. } = pool;

        let runner = tokio::spawn(async move {
            runner.run().await;
        });

        Ok(Self { client, runner })
    }

    /// Stop the network runner. The SQLite session is already persisted.
    pub fn disconnect(self) {
        self.runner.abort();
        info!("Отключено");
    }
}

// Implement Deref to allow using TelegramClient as &Client
impl std::ops::Deref for TelegramClient {
    type Target = Client;

    fn deref(&self) -> &Self::Target {
        &self.client
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn lock_file_is_created_on_acquire() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("test.lock");

        assert!(!path.exists());
        let mut lock = SessionLock::acquire(&path).expect("lock");
        assert!(path.exists());
        lock.release();
    }

    #[test]
    fn release_removes_lock_file() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("test.lock");

        let mut lock = SessionLock::acquire(&path).expect("lock");
        lock.release();
        assert!(!path.exists());
    }

    #[test]
    fn lock_dropped_releases_automatically() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("test.lock");

        {
            let _lock = SessionLock::acquire(&path).expect("lock");
            assert!(path.exists());
        }
        assert!(!path.exists());
    }

    #[test]
    fn double_release_is_safe() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("test.lock");

        let mut lock = SessionLock::acquire(&path).expect("lock");
        lock.release();
        lock.release();
    }

    #[test]
    fn lock_can_be_reacquired_after_release() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("test.lock");

        let mut first = SessionLock::acquire(&path).expect("first lock");
        first.release();
        assert!(SessionLock::acquire(&path).is_ok());
    }

    #[test]
    fn acquire_fails_in_missing_directory() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("missing").join("test.lock");

        assert!(matches!(SessionLock::acquire(&path), Err(Error::LockError(_))));
    }

    #[test]
    fn open_session_creates_file() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("fresh.session");

        open_session(&path).expect("create session");
        assert!(path.exists());
    }
}
