//! Scripted [`Messenger`] used by unit tests

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};
use crate::messenger::{ChatKind, Destination, JoinedChat, Messenger, SentMessage};

pub fn destination(id: i64, title: &str, kind: ChatKind) -> Destination {
    Destination {
        id,
        title: title.to_string(),
        username: None,
        kind,
    }
}

#[derive(Default)]
pub struct ScriptedMessenger {
    cached: HashMap<i64, Destination>,
    dialogs: Vec<Destination>,
    usernames: HashMap<String, Destination>,
    dialogs_fail: bool,
    send_results: Mutex<VecDeque<Result<SentMessage>>>,
    invite_result: Mutex<Option<Result<JoinedChat>>>,
    cancel_after_sends: Option<(usize, CancellationToken)>,
    calls: Mutex<Vec<String>>,
    sent: Mutex<Vec<(i64, String, tokio::time::Instant)>>,
}

impl ScriptedMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cached(mut self, destination: Destination) -> Self {
        self.cached.insert(destination.id, destination);
        self
    }

    pub fn with_dialog(mut self, destination: Destination) -> Self {
        self.dialogs.push(destination);
        self
    }

    pub fn with_username(mut self, username: &str, destination: Destination) -> Self {
        self.usernames.insert(username.to_string(), destination);
        self
    }

    pub fn failing_dialogs(mut self) -> Self {
        self.dialogs_fail = true;
        self
    }

    /// Queue send outcomes; once exhausted every send succeeds.
    pub fn with_send_results(self, results: Vec<Result<SentMessage>>) -> Self {
        *self.send_results.lock().unwrap() = results.into();
        self
    }

    pub fn with_invite_result(self, result: Result<JoinedChat>) -> Self {
        *self.invite_result.lock().unwrap() = Some(result);
        self
    }

    /// Cancel `token` once `count` send attempts have been made.
    pub fn cancel_after_sends(mut self, count: usize, token: CancellationToken) -> Self {
        self.cancel_after_sends = Some((count, token));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn sent(&self) -> Vec<(i64, String, tokio::time::Instant)> {
        self.sent.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Messenger for ScriptedMessenger {
    async fn cached_peer(&self, id: i64) -> Result<Option<Destination>> {
        self.record(format!("cached_peer:{}", id));
        Ok(self.cached.get(&id).cloned())
    }

    async fn dialogs(&self, limit: Option<usize>) -> Result<Vec<Destination>> {
        match limit {
            Some(limit) => self.record(format!("dialogs:{}", limit)),
            None => self.record("dialogs:all".to_string()),
        }
        let limit = limit.unwrap_or(usize::MAX);
        if self.dialogs_fail {
            return Err(Error::TelegramError("dialogs unavailable".into()));
        }
        Ok(self.dialogs.iter().take(limit).cloned().collect())
    }

    async fn resolve_username(&self, username: &str) -> Result<Option<Destination>> {
        self.record(format!("resolve_username:{}", username));
        Ok(self.usernames.get(username).cloned())
    }

    async fn send_text(&self, destination: &Destination, text: &str) -> Result<SentMessage> {
        self.record(format!("send:{}", destination.id));
        let attempts = {
            let mut sent = self.sent.lock().unwrap();
            sent.push((destination.id, text.to_string(), tokio::time::Instant::now()));
            sent.len()
        };
        if let Some((count, token)) = &self.cancel_after_sends {
            if attempts >= *count {
                token.cancel();
            }
        }
        self.send_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(SentMessage {
                id: attempts as i32,
            }))
    }

    async fn import_invite(&self, hash: &str) -> Result<JoinedChat> {
        self.record(format!("import_invite:{}", hash));
        self.invite_result
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Err(Error::InvalidInvite(hash.to_string())))
    }
}
