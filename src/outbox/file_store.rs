use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

use super::message::OutboxState;
use super::{MessageId, NewMessage, OutboxError, OutboxStore, PendingMessage};

/// Outbox persisted as one JSON document, rewritten on every mutation.
#[derive(Debug)]
pub struct FileOutbox {
    path: PathBuf,
    state: Mutex<OutboxState>,
}

impl FileOutbox {
    /// Opens the outbox, starting empty when the file does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error when the file exists but cannot be read or parsed.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, OutboxError> {
        let path = path.into();
        let state = if fs::try_exists(&path)
            .await
            .map_err(|source| OutboxError::Io { source })?
        {
            let raw = fs::read(&path)
                .await
                .map_err(|source| OutboxError::Io { source })?;
            serde_json::from_slice(&raw).map_err(|source| OutboxError::Corrupt {
                path: path.clone(),
                source,
            })?
        } else {
            OutboxState::default()
        };
        debug!(path = %path.display(), "opened outbox");
        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Applies `change` to a copy and keeps it only once it is on disk.
    async fn mutate<T>(
        &self,
        change: impl FnOnce(&mut OutboxState) -> T + Send,
    ) -> Result<T, OutboxError> {
        let mut state = self.state.lock().await;
        let mut next = state.clone();
        let result = change(&mut next);
        save(&self.path, &next).await?;
        *state = next;
        Ok(result)
    }
}

async fn save(path: &Path, state: &OutboxState) -> Result<(), OutboxError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|source| OutboxError::Io { source })?;
    }
    let serialised =
        serde_json::to_vec_pretty(state).map_err(|source| OutboxError::Serialize { source })?;
    let staging = path.with_extension("json.tmp");
    fs::write(&staging, serialised)
        .await
        .map_err(|source| OutboxError::Io { source })?;
    fs::rename(&staging, path)
        .await
        .map_err(|source| OutboxError::Io { source })
}

#[async_trait]
impl OutboxStore for FileOutbox {
    async fn enqueue(&self, message: NewMessage) -> Result<MessageId, OutboxError> {
        self.mutate(|state| state.enqueue(message)).await
    }

    async fn list_pending(&self) -> Result<Vec<PendingMessage>, OutboxError> {
        Ok(self.state.lock().await.pending())
    }

    async fn get(&self, id: MessageId) -> Result<Option<PendingMessage>, OutboxError> {
        Ok(self.state.lock().await.get(id))
    }

    async fn remove(&self, id: MessageId) -> Result<bool, OutboxError> {
        self.mutate(|state| state.remove(id)).await
    }

    async fn update_attempts(&self, id: MessageId, attempts: u32) -> Result<bool, OutboxError> {
        self.mutate(|state| state.update_attempts(id, attempts)).await
    }
}
