//! grammers implementation of [`Messenger`]
//!
//! Peers seen while scanning dialogs or resolving usernames are kept in an
//! in-process cache keyed by raw id; that cache backs direct id lookup and is
//! where `send_text` finds the peer for a [`Destination`].

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use grammers_client::types::peer::Peer;
use grammers_tl_types as tl;
use tracing::debug;

use crate::error::{Error, Result};
use crate::messenger::{ChatKind, Destination, JoinedChat, Messenger, SentMessage};
use crate::session::TelegramClient;

pub struct TelegramMessenger {
    client: TelegramClient,
    peers: Mutex<HashMap<i64, Peer>>,
}

impl TelegramMessenger {
    pub fn new(client: TelegramClient) -> Self {
        Self {
            client,
            peers: Mutex::new(HashMap::new()),
        }
    }

    pub fn disconnect(self) {
        self.client.disconnect();
    }

    fn remember(&self, peer: &Peer) -> Destination {
        let destination = destination_from_peer(peer);
        self.peers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(destination.id, peer.clone());
        destination
    }

    fn cached(&self, id: i64) -> Option<Peer> {
        self.peers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&id)
            .cloned()
    }
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn cached_peer(&self, id: i64) -> Result<Option<Destination>> {
        Ok(self.cached(id).map(|peer| destination_from_peer(&peer)))
    }

    async fn dialogs(&self, limit: Option<usize>) -> Result<Vec<Destination>> {
        let mut found = Vec::new();
        let mut dialogs = self.client.iter_dialogs();

        while let Some(dialog) = dialogs.next().await? {
            found.push(self.remember(&dialog.peer));
            if limit.is_some_and(|limit| found.len() >= limit) {
                break;
            }
        }

        debug!(count = found.len(), "dialogs fetched");
        Ok(found)
    }

    async fn resolve_username(&self, username: &str) -> Result<Option<Destination>> {
        let username = username.trim_start_matches('@');
        let peer = self.client.resolve_username(username).await?;
        Ok(peer.map(|peer| self.remember(&peer)))
    }

    async fn send_text(&self, destination: &Destination, text: &str) -> Result<SentMessage> {
        let peer = self
            .cached(destination.id)
            .ok_or_else(|| Error::ChatNotFound(destination.id.to_string()))?;

        let message = self.client.send_message(&peer, text).await?;
        Ok(SentMessage { id: message.id() })
    }

    async fn import_invite(&self, hash: &str) -> Result<JoinedChat> {
        let request = tl::functions::messages::ImportChatInvite {
            hash: hash.to_string(),
        };
        let updates = self.client.invoke(&request).await?;

        let chats = match updates {
            tl::enums::Updates::Updates(u) => u.chats,
            tl::enums::Updates::Combined(u) => u.chats,
            _ => Vec::new(),
        };

        chats
            .into_iter()
            .next()
            .map(joined_chat)
            .ok_or_else(|| Error::TelegramError("invite accepted but no chat returned".into()))
    }
}

fn joined_chat(chat: tl::enums::Chat) -> JoinedChat {
    let (id, title) = match chat {
        tl::enums::Chat::Empty(c) => (c.id, String::new()),
        tl::enums::Chat::Chat(c) => (c.id, c.title),
        tl::enums::Chat::Forbidden(c) => (c.id, c.title),
        tl::enums::Chat::Channel(c) => (c.id, c.title),
        tl::enums::Chat::ChannelForbidden(c) => (c.id, c.title),
    };
    JoinedChat { id, title }
}

fn destination_from_peer(peer: &Peer) -> Destination {
    Destination {
        id: peer_id(peer),
        title: chat_title(peer),
        username: peer_username(peer),
        kind: chat_kind(peer),
    }
}

fn peer_id(peer: &Peer) -> i64 {
    match peer {
        Peer::Channel(c) => c.raw.id,
        Peer::Group(g) => match &g.raw {
            tl::enums::Chat::Empty(c) => c.id,
            tl::enums::Chat::Chat(c) => c.id,
            tl::enums::Chat::Forbidden(c) => c.id,
            tl::enums::Chat::Channel(c) => c.id,
            tl::enums::Chat::ChannelForbidden(c) => c.id,
        },
        Peer::User(u) => u.raw.id(),
    }
}

fn chat_title(peer: &Peer) -> String {
    match peer {
        Peer::Channel(c) => c.title().to_string(),
        Peer::Group(g) => g.title().unwrap_or("Group").to_string(),
        Peer::User(u) => u.full_name(),
    }
}

fn peer_username(peer: &Peer) -> Option<String> {
    match peer {
        Peer::Channel(c) => c.raw.username.clone(),
        Peer::Group(g) => match &g.raw {
            tl::enums::Chat::Channel(c) => c.username.clone(),
            _ => None,
        },
        Peer::User(u) => u.username().map(str::to_string),
    }
}

fn chat_kind(peer: &Peer) -> ChatKind {
    match peer {
        Peer::Channel(c) => channel_kind(c.raw.megagroup, c.raw.gigagroup),
        Peer::Group(g) => match &g.raw {
            tl::enums::Chat::Channel(c) => channel_kind(c.megagroup, c.gigagroup),
            _ => ChatKind::Group,
        },
        Peer::User(u) => match &u.raw {
            tl::enums::User::User(user) if user.bot => ChatKind::Bot,
            _ => ChatKind::User,
        },
    }
}

fn channel_kind(megagroup: bool, gigagroup: bool) -> ChatKind {
    if gigagroup {
        ChatKind::Gigagroup
    } else if megagroup {
        ChatKind::Supergroup
    } else {
        ChatKind::Channel
    }
}
