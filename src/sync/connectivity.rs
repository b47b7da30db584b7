use std::sync::Arc;

use serde::Serialize;
use strum_macros::Display;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::engine::SyncEngine;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Display, Serialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Connectivity {
    Online,
    Offline,
}

/// Publishes the platform's online/offline signal.
#[derive(Debug)]
pub struct ConnectivityMonitor {
    sender: watch::Sender<Connectivity>,
}

impl ConnectivityMonitor {
    #[must_use]
    pub fn new(initial: Connectivity) -> Self {
        let (sender, _receiver) = watch::channel(initial);
        Self { sender }
    }

    /// Records a new state, returning `true` when it differs from the last one.
    pub fn set(&self, state: Connectivity) -> bool {
        self.sender.send_if_modified(|current| {
            if *current == state {
                false
            } else {
                *current = state;
                true
            }
        })
    }

    #[must_use]
    pub fn current(&self) -> Connectivity {
        *self.sender.borrow()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Connectivity> {
        self.sender.subscribe()
    }

    /// Drains the outbox whenever connectivity goes from offline to online.
    ///
    /// The task ends when `cancel` fires or the monitor is dropped.
    pub fn spawn_auto_drain(
        &self,
        engine: Arc<SyncEngine>,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        let mut previous = self.current();
        let mut changes = WatchStream::from_changes(self.subscribe());
        tokio::spawn(async move {
            loop {
                let state = tokio::select! {
                    () = cancel.cancelled() => break,
                    next = changes.next() => match next {
                        Some(state) => state,
                        None => break,
                    },
                };
                let regained = previous == Connectivity::Offline && state == Connectivity::Online;
                previous = state;
                if !regained {
                    continue;
                }

                info!("connectivity regained, draining outbox");
                if let Err(error) = engine.drain_queue().await {
                    warn!(%error, "automatic drain failed");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::outbox::{MemoryOutbox, OutboxStore};
    use crate::profile::CameraId;
    use crate::transport::ScriptedTransport;

    #[test]
    fn set_reports_only_real_changes() {
        let monitor = ConnectivityMonitor::new(Connectivity::Online);
        assert!(!monitor.set(Connectivity::Online));
        assert!(monitor.set(Connectivity::Offline));
        assert_eq!(Connectivity::Offline, monitor.current());
    }

    #[tokio::test]
    async fn regaining_connectivity_drains_the_outbox() {
        let monitor = ConnectivityMonitor::new(Connectivity::Offline);
        let outbox = Arc::new(MemoryOutbox::new());
        let transport = Arc::new(ScriptedTransport::always_ok());
        let engine = Arc::new(
            SyncEngine::builder()
                .outbox(outbox.clone())
                .transport(transport.clone())
                .connectivity(monitor.subscribe())
                .build(),
        );
        engine
            .send_now(&CameraId::from("cam-1"), "+491701234567", "$03*1#1$")
            .await
            .expect("offline send queues");

        let cancel = CancellationToken::new();
        let task = monitor.spawn_auto_drain(engine.clone(), cancel.clone());
        monitor.set(Connectivity::Online);

        tokio::time::timeout(Duration::from_secs(5), async {
            while !outbox.list_pending().await.expect("list").is_empty() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("queued command should drain");

        cancel.cancel();
        task.await.expect("auto drain task ends cleanly");
        assert_eq!(1, transport.call_count());
    }
}
