mod file_store;
mod memory;
mod message;

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

pub use self::file_store::FileOutbox;
pub use self::memory::MemoryOutbox;
pub use self::message::{MessageId, NewMessage, PendingMessage};

/// Errors returned by outbox stores.
#[derive(Debug, Error)]
pub enum OutboxError {
    #[error("failed while reading or writing the outbox")]
    Io { source: std::io::Error },
    #[error("outbox file `{}` is corrupt", path.display())]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to serialise the outbox")]
    Serialize { source: serde_json::Error },
    #[error("no queued message has id {id}")]
    UnknownMessage { id: MessageId },
}

/// Durable queue of commands waiting for a transport handoff.
///
/// Mutations are atomic with respect to each other.
#[async_trait]
pub trait OutboxStore: Send + Sync {
    async fn enqueue(&self, message: NewMessage) -> Result<MessageId, OutboxError>;

    /// Every queued message, oldest first, ties broken by id.
    async fn list_pending(&self) -> Result<Vec<PendingMessage>, OutboxError>;

    async fn get(&self, id: MessageId) -> Result<Option<PendingMessage>, OutboxError>;

    /// Returns `false` when the message was already gone.
    async fn remove(&self, id: MessageId) -> Result<bool, OutboxError>;

    /// Returns `false` when the message was already gone.
    async fn update_attempts(&self, id: MessageId, attempts: u32) -> Result<bool, OutboxError>;
}
