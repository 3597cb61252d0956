//! Destination resolution with ordered fallbacks
//!
//! A target is looked up, in order:
//! 1. directly in the client's peer cache by id,
//! 2. by scanning every dialog for a matching id (or handle),
//! 3. by resolving the input as a public handle.
//!
//! The first hit wins. Errors from one strategy are logged and the next one is
//! tried; only after all three fail is [`Error::ChatNotFound`] returned.

use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::messenger::{Destination, Messenger};
use crate::target::Target;

/// Lookup strategies in the order they are attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    DirectId,
    DialogScan,
    Handle,
}

impl Strategy {
    pub const ORDER: [Strategy; 3] = [Strategy::DirectId, Strategy::DialogScan, Strategy::Handle];
}

/// Resolve `target` to a destination, trying every [`Strategy`] in order.
pub async fn resolve<M>(messenger: &M, target: &Target) -> Result<Destination>
where
    M: Messenger + ?Sized,
{
    for strategy in Strategy::ORDER {
        match attempt(messenger, target, strategy).await {
            Ok(Some(destination)) => {
                match strategy {
                    Strategy::DirectId => info!("Найден чат: {}", destination.display_name()),
                    Strategy::DialogScan => {
                        info!("Найден в диалогах: {}", destination.display_name())
                    }
                    Strategy::Handle => info!("Найден по username: {}", target),
                }
                return Ok(destination);
            }
            Ok(None) => debug!(?strategy, %target, "no match"),
            Err(err) => warn!(?strategy, %target, "lookup failed: {}", err),
        }
    }

    error!("Не удалось найти чат с ID: {}", target);
    info!("Попробуйте:");
    info!("1. Убедитесь, что вы участник группы");
    info!("2. Используйте username группы (например, @groupname)");
    info!("3. Получите актуальный ID через опцию 'Получить список чатов'");

    Err(Error::ChatNotFound(target.to_string()))
}

async fn attempt<M>(messenger: &M, target: &Target, strategy: Strategy) -> Result<Option<Destination>>
where
    M: Messenger + ?Sized,
{
    match strategy {
        Strategy::DirectId => {
            for id in target.candidate_ids() {
                if let Some(found) = messenger.cached_peer(id).await? {
                    return Ok(Some(found));
                }
            }
            Ok(None)
        }
        Strategy::DialogScan => {
            let dialogs = messenger.dialogs(None).await?;
            Ok(dialogs.into_iter().find(|d| match target {
                Target::Id(_) => target.matches_id(d.id),
                Target::Handle(handle) => d.has_username(handle),
            }))
        }
        Strategy::Handle => match target.handle() {
            Some(handle) => messenger.resolve_username(handle).await,
            None => Ok(None),
        },
    }
}
