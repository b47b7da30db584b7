use async_trait::async_trait;
use tokio::sync::Mutex;

use super::message::OutboxState;
use super::{MessageId, NewMessage, OutboxError, OutboxStore, PendingMessage};

/// Outbox kept in process memory.
#[derive(Debug, Default)]
pub struct MemoryOutbox {
    state: Mutex<OutboxState>,
}

impl MemoryOutbox {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OutboxStore for MemoryOutbox {
    async fn enqueue(&self, message: NewMessage) -> Result<MessageId, OutboxError> {
        Ok(self.state.lock().await.enqueue(message))
    }

    async fn list_pending(&self) -> Result<Vec<PendingMessage>, OutboxError> {
        Ok(self.state.lock().await.pending())
    }

    async fn get(&self, id: MessageId) -> Result<Option<PendingMessage>, OutboxError> {
        Ok(self.state.lock().await.get(id))
    }

    async fn remove(&self, id: MessageId) -> Result<bool, OutboxError> {
        Ok(self.state.lock().await.remove(id))
    }

    async fn update_attempts(&self, id: MessageId, attempts: u32) -> Result<bool, OutboxError> {
        Ok(self.state.lock().await.update_attempts(id, attempts))
    }
}
