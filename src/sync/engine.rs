use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use bon::Builder;
use serde::Serialize;
use strum_macros::Display;
use tokio::sync::watch;
use tokio::time::timeout;
use tracing::{Span, debug, info, instrument, warn};
use tracing_indicatif::span_ext::IndicatifSpanExt;

use super::connectivity::Connectivity;
use crate::config::SyncConfig;
use crate::outbox::{MessageId, NewMessage, OutboxError, OutboxStore, PendingMessage};
use crate::profile::CameraId;
use crate::transport::{Handoff, Transport, TransportError};

/// Why a command was queued instead of handed off.
#[derive(Debug, Clone, Eq, PartialEq, derive_more::Display, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum DeferReason {
    #[display("offline")]
    Offline,
    #[display("transport failed: {_0}")]
    TransportFailed(String),
}

/// Result of an immediate send.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SendOutcome {
    Delivered {
        handoff: Handoff,
    },
    /// Queued in the outbox for a later drain.
    Deferred {
        message_id: MessageId,
        reason: DeferReason,
    },
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Default, Display, Serialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DrainStatus {
    #[default]
    Completed,
    /// Another drain was already running; this call did nothing.
    Coalesced,
    /// Connectivity was missing at the start or went away mid-drain.
    Offline,
}

/// Summary of one drain pass.
#[derive(Debug, Clone, Eq, PartialEq, Default, Serialize)]
pub struct DrainReport {
    pub status: DrainStatus,
    pub delivered: usize,
    pub failed: usize,
    pub dead_lettered: usize,
    pub skipped: usize,
    pub dead_letters: Vec<MessageId>,
}

impl DrainReport {
    fn with_status(status: DrainStatus) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    fn record_dead_letter(&mut self, id: MessageId) {
        self.dead_lettered += 1;
        self.dead_letters.push(id);
    }
}

enum AttemptOutcome {
    Delivered,
    Requeued,
    DeadLettered,
    Vanished,
}

/// Delivers commands through a transport, falling back to the outbox.
#[derive(Builder)]
pub struct SyncEngine {
    outbox: Arc<dyn OutboxStore>,
    transport: Arc<dyn Transport>,
    connectivity: watch::Receiver<Connectivity>,
    #[builder(default)]
    config: SyncConfig,
    #[builder(skip)]
    draining: AtomicBool,
    /// Messages with an attempt in progress; drains skip them.
    #[builder(skip)]
    in_flight: Mutex<HashSet<MessageId>>,
}

struct DrainGuard<'a>(&'a AtomicBool);

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

struct Claim<'a> {
    in_flight: &'a Mutex<HashSet<MessageId>>,
    id: MessageId,
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}

impl SyncEngine {
    #[must_use]
    pub fn config(&self) -> SyncConfig {
        self.config
    }

    #[must_use]
    pub fn is_online(&self) -> bool {
        *self.connectivity.borrow() == Connectivity::Online
    }

    /// Hands a command to the transport now, or queues it when that is not
    /// possible. A command is never lost.
    ///
    /// # Errors
    ///
    /// Returns an error only when the outbox cannot store a deferred command.
    #[instrument(skip(self, body), level = "info", fields(camera = %camera_id))]
    pub async fn send_now(
        &self,
        camera_id: &CameraId,
        address: &str,
        body: &str,
    ) -> Result<SendOutcome, OutboxError> {
        if !self.is_online() {
            let message_id = self.enqueue(camera_id, address, body).await?;
            info!(%message_id, "offline, command queued");
            return Ok(SendOutcome::Deferred {
                message_id,
                reason: DeferReason::Offline,
            });
        }

        match self.attempt(address, body).await {
            Ok(handoff) => {
                info!(%handoff, "command handed off");
                Ok(SendOutcome::Delivered { handoff })
            }
            Err(error) => {
                let message_id = self.enqueue(camera_id, address, body).await?;
                info!(%message_id, %error, "send failed, command queued");
                Ok(SendOutcome::Deferred {
                    message_id,
                    reason: DeferReason::TransportFailed(error.to_string()),
                })
            }
        }
    }

    /// Attempts every queued command once, oldest first.
    ///
    /// Overlapping calls coalesce into the running drain, and a message
    /// claimed by another attempt is skipped.
    ///
    /// # Errors
    ///
    /// Returns an error when the outbox cannot be read or updated.
    #[instrument(skip(self), level = "info")]
    pub async fn drain_queue(&self) -> Result<DrainReport, OutboxError> {
        if !self.is_online() {
            debug!("offline, drain skipped");
            return Ok(DrainReport::with_status(DrainStatus::Offline));
        }
        if self.draining.swap(true, Ordering::AcqRel) {
            debug!("drain already running");
            return Ok(DrainReport::with_status(DrainStatus::Coalesced));
        }
        let _draining = DrainGuard(&self.draining);

        let pending = self.outbox.list_pending().await?;
        let span = Span::current();
        span.pb_set_length(pending.len() as u64);
        span.pb_set_message("Draining outbox");

        let mut report = DrainReport::default();
        for message in pending {
            span.pb_inc(1);
            if !self.is_online() {
                info!("connectivity lost, drain stopped");
                report.status = DrainStatus::Offline;
                break;
            }
            if message.is_dead_letter() {
                report.record_dead_letter(message.id());
                continue;
            }
            let Some(_claim) = self.claim(message.id()) else {
                report.skipped += 1;
                continue;
            };

            span.pb_set_message(&format!("Sending #{} to {}", message.id(), message.camera_id()));
            match self.deliver_queued(message.id()).await? {
                AttemptOutcome::Delivered => report.delivered += 1,
                AttemptOutcome::Requeued => report.failed += 1,
                AttemptOutcome::DeadLettered => report.record_dead_letter(message.id()),
                AttemptOutcome::Vanished => report.skipped += 1,
            }
        }

        info!(
            status = %report.status,
            delivered = report.delivered,
            failed = report.failed,
            dead_lettered = report.dead_lettered,
            "drain finished"
        );
        span.pb_set_finish_message(&format!("Delivered {} queued command(s)", report.delivered));
        Ok(report)
    }

    /// Drains once at application start.
    ///
    /// # Errors
    ///
    /// Returns an error when the outbox cannot be read or updated.
    pub async fn drain_on_startup(&self) -> Result<DrainReport, OutboxError> {
        debug!("startup drain");
        self.drain_queue().await
    }

    /// Makes a message eligible again by resetting its attempt counter.
    ///
    /// # Errors
    ///
    /// Returns [`OutboxError::UnknownMessage`] when the message is gone.
    #[instrument(skip(self), level = "info")]
    pub async fn retry_message(&self, id: MessageId) -> Result<PendingMessage, OutboxError> {
        if !self.outbox.update_attempts(id, 0).await? {
            return Err(OutboxError::UnknownMessage { id });
        }
        self.outbox
            .get(id)
            .await?
            .ok_or(OutboxError::UnknownMessage { id })
    }

    /// # Errors
    ///
    /// Returns [`OutboxError::UnknownMessage`] when the message is gone.
    #[instrument(skip(self), level = "info")]
    pub async fn delete_message(&self, id: MessageId) -> Result<(), OutboxError> {
        if self.outbox.remove(id).await? {
            Ok(())
        } else {
            Err(OutboxError::UnknownMessage { id })
        }
    }

    /// Every queued message, oldest first, dead letters included.
    ///
    /// # Errors
    ///
    /// Returns an error when the outbox cannot be read.
    pub async fn pending(&self) -> Result<Vec<PendingMessage>, OutboxError> {
        self.outbox.list_pending().await
    }

    /// Messages that exhausted their attempts and wait for a manual decision.
    ///
    /// # Errors
    ///
    /// Returns an error when the outbox cannot be read.
    pub async fn dead_letters(&self) -> Result<Vec<PendingMessage>, OutboxError> {
        Ok(self
            .outbox
            .list_pending()
            .await?
            .into_iter()
            .filter(PendingMessage::is_dead_letter)
            .collect())
    }

    async fn enqueue(
        &self,
        camera_id: &CameraId,
        address: &str,
        body: &str,
    ) -> Result<MessageId, OutboxError> {
        self.outbox
            .enqueue(NewMessage {
                camera_id: camera_id.clone(),
                destination: address.to_string(),
                body: body.to_string(),
                max_attempts: self.config.max_attempts(),
            })
            .await
    }

    async fn attempt(&self, address: &str, body: &str) -> Result<Handoff, TransportError> {
        let after = self.config.send_timeout();
        timeout(after, self.transport.attempt_send(address, body))
            .await
            .unwrap_or(Err(TransportError::TimedOut { after }))
    }

    fn claim(&self, id: MessageId) -> Option<Claim<'_>> {
        let inserted = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id);
        inserted.then_some(Claim {
            in_flight: &self.in_flight,
            id,
        })
    }

    async fn deliver_queued(&self, id: MessageId) -> Result<AttemptOutcome, OutboxError> {
        let Some(message) = self.outbox.get(id).await? else {
            return Ok(AttemptOutcome::Vanished);
        };
        if message.is_dead_letter() {
            return Ok(AttemptOutcome::DeadLettered);
        }

        let attempts = message.attempts() + 1;
        if !self.outbox.update_attempts(id, attempts).await? {
            return Ok(AttemptOutcome::Vanished);
        }

        match self.attempt(message.destination(), message.body()).await {
            Ok(handoff) => {
                self.outbox.remove(id).await?;
                debug!(%id, %handoff, "queued command handed off");
                Ok(AttemptOutcome::Delivered)
            }
            Err(error) if attempts >= message.max_attempts() => {
                warn!(
                    %id,
                    %error,
                    attempts,
                    "command dead-lettered; retry or delete it from the outbox"
                );
                Ok(AttemptOutcome::DeadLettered)
            }
            Err(error) => {
                debug!(%id, %error, attempts, "queued command requeued");
                Ok(AttemptOutcome::Requeued)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::outbox::MemoryOutbox;
    use crate::transport::ScriptedTransport;

    const ADDRESS: &str = "+491701234567";

    struct Harness {
        engine: SyncEngine,
        outbox: Arc<MemoryOutbox>,
        transport: Arc<ScriptedTransport>,
        connectivity: watch::Sender<Connectivity>,
    }

    fn harness(script: &str, state: Connectivity) -> Harness {
        let outbox = Arc::new(MemoryOutbox::new());
        let transport = Arc::new(ScriptedTransport::new(
            script.parse().expect("script should parse"),
        ));
        let (connectivity, receiver) = watch::channel(state);
        let engine = SyncEngine::builder()
            .outbox(outbox.clone())
            .transport(transport.clone())
            .connectivity(receiver)
            .config(
                SyncConfig::builder()
                    .max_attempts(2)
                    .send_timeout(Duration::from_secs(5))
                    .build(),
            )
            .build();
        Harness {
            engine,
            outbox,
            transport,
            connectivity,
        }
    }

    fn camera() -> CameraId {
        CameraId::from("cam-1")
    }

    #[tokio::test]
    async fn drains_skip_messages_with_an_attempt_in_progress() {
        let harness = harness("ok", Connectivity::Offline);
        harness.engine.send_now(&camera(), ADDRESS, "$03*1#1$").await.expect("queued");
        harness.engine.send_now(&camera(), ADDRESS, "$03*1#1$").await.expect("queued");
        harness.connectivity.send(Connectivity::Online).expect("receiver alive");
        let pending = harness.outbox.list_pending().await.expect("list");

        let claim = harness.engine.claim(pending[0].id()).expect("first claim");
        assert!(harness.engine.claim(pending[0].id()).is_none());

        let report = harness.engine.drain_queue().await.expect("drain");
        assert_eq!(1, report.delivered);
        assert_eq!(1, report.skipped);
        assert_eq!(1, harness.transport.call_count());

        drop(claim);
        let report = harness.engine.drain_queue().await.expect("drain");
        assert_eq!(1, report.delivered);
        assert!(harness.outbox.list_pending().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn online_send_is_delivered_without_queueing() {
        let harness = harness("ok", Connectivity::Online);
        let outcome = harness
            .engine
            .send_now(&camera(), ADDRESS, "$03*1#1$")
            .await
            .expect("send");
        assert_eq!(
            SendOutcome::Delivered {
                handoff: Handoff::Confirmed
            },
            outcome
        );
        assert!(harness.outbox.list_pending().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn offline_send_is_queued_without_touching_the_transport() {
        let harness = harness("ok", Connectivity::Offline);
        let outcome = harness
            .engine
            .send_now(&camera(), ADDRESS, "$03*1#1$")
            .await
            .expect("send");
        assert_matches!(
            outcome,
            SendOutcome::Deferred {
                reason: DeferReason::Offline,
                ..
            }
        );
        assert_eq!(0, harness.transport.call_count());
        assert_eq!(1, harness.outbox.list_pending().await.expect("list").len());
    }

    #[tokio::test(start_paused = true)]
    async fn timed_out_send_is_queued_with_zero_attempts() {
        let harness = harness("timeout", Connectivity::Online);
        let outcome = harness
            .engine
            .send_now(&camera(), ADDRESS, "$03*1#1$")
            .await
            .expect("send");
        let SendOutcome::Deferred {
            message_id,
            reason: DeferReason::TransportFailed(reason),
        } = outcome
        else {
            panic!("expected a deferred send, got {outcome:?}");
        };
        assert_eq!("no handoff within 5s", reason);
        let queued = harness
            .outbox
            .get(message_id)
            .await
            .expect("get")
            .expect("message queued");
        assert_eq!(0, queued.attempts());
    }

    #[tokio::test]
    async fn drain_dead_letters_after_max_attempts_and_then_skips() {
        let harness = harness("fail", Connectivity::Offline);
        harness
            .engine
            .send_now(&camera(), ADDRESS, "$03*1#1$")
            .await
            .expect("send");
        harness.connectivity.send_replace(Connectivity::Online);

        let first = harness.engine.drain_queue().await.expect("drain");
        assert_eq!(1, first.failed);
        let second = harness.engine.drain_queue().await.expect("drain");
        assert_eq!(1, second.dead_lettered);
        let third = harness.engine.drain_queue().await.expect("drain");
        assert_eq!(1, third.dead_lettered);
        assert_eq!(2, harness.transport.call_count());
        assert_eq!(1, harness.engine.dead_letters().await.expect("list").len());
    }

    #[tokio::test]
    async fn retry_resets_attempts_and_delete_removes() {
        let harness = harness("fail,ok", Connectivity::Offline);
        let SendOutcome::Deferred { message_id, .. } = harness
            .engine
            .send_now(&camera(), ADDRESS, "$03*1#1$")
            .await
            .expect("send")
        else {
            panic!("offline send must defer");
        };
        harness
            .outbox
            .update_attempts(message_id, 2)
            .await
            .expect("update");

        let retried = harness.engine.retry_message(message_id).await.expect("retry");
        assert_eq!(0, retried.attempts());
        harness
            .engine
            .delete_message(message_id)
            .await
            .expect("delete");
        assert_matches!(
            harness.engine.delete_message(message_id).await,
            Err(OutboxError::UnknownMessage { id }) if id == message_id
        );
    }

    #[tokio::test]
    async fn offline_drain_reports_offline() {
        let harness = harness("ok", Connectivity::Offline);
        let report = harness.engine.drain_queue().await.expect("drain");
        assert_eq!(DrainStatus::Offline, report.status);
    }
}
