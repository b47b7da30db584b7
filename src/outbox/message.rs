use std::num::ParseIntError;
use std::str::FromStr;

use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::profile::CameraId;

/// Monotonic outbox message identifier.
#[derive(
    Debug,
    Clone,
    Copy,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Display,
    From,
    Into,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct MessageId(u64);

impl FromStr for MessageId {
    type Err = ParseIntError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        value.trim().trim_start_matches('#').parse().map(Self)
    }
}

/// A message handed to the outbox for later delivery.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct NewMessage {
    pub camera_id: CameraId,
    pub destination: String,
    pub body: String,
    pub max_attempts: u32,
}

/// A queued command awaiting delivery.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct PendingMessage {
    id: MessageId,
    camera_id: CameraId,
    destination: String,
    body: String,
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
    attempts: u32,
    max_attempts: u32,
}

impl PendingMessage {
    pub(crate) fn queued(id: MessageId, message: NewMessage, created_at: OffsetDateTime) -> Self {
        Self {
            id,
            camera_id: message.camera_id,
            destination: message.destination,
            body: message.body,
            created_at,
            attempts: 0,
            max_attempts: message.max_attempts,
        }
    }

    #[must_use]
    pub fn id(&self) -> MessageId {
        self.id
    }

    #[must_use]
    pub fn camera_id(&self) -> &CameraId {
        &self.camera_id
    }

    #[must_use]
    pub fn destination(&self) -> &str {
        &self.destination
    }

    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    #[must_use]
    pub fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Exhausted messages stay in the outbox but are never attempted again.
    #[must_use]
    pub fn is_dead_letter(&self) -> bool {
        self.attempts >= self.max_attempts
    }

    pub(crate) fn set_attempts(&mut self, attempts: u32) {
        self.attempts = attempts;
    }
}

/// Outbox contents shared by the in-memory and file-backed stores.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct OutboxState {
    next_id: u64,
    messages: Vec<PendingMessage>,
}

impl OutboxState {
    pub(crate) fn enqueue(&mut self, message: NewMessage) -> MessageId {
        self.next_id += 1;
        let id = MessageId(self.next_id);
        self.messages
            .push(PendingMessage::queued(id, message, OffsetDateTime::now_utc()));
        id
    }

    pub(crate) fn pending(&self) -> Vec<PendingMessage> {
        let mut messages = self.messages.clone();
        messages.sort_by_key(|message| (message.created_at, message.id));
        messages
    }

    pub(crate) fn get(&self, id: MessageId) -> Option<PendingMessage> {
        self.messages.iter().find(|message| message.id == id).cloned()
    }

    pub(crate) fn remove(&mut self, id: MessageId) -> bool {
        let before = self.messages.len();
        self.messages.retain(|message| message.id != id);
        self.messages.len() != before
    }

    pub(crate) fn update_attempts(&mut self, id: MessageId, attempts: u32) -> bool {
        match self.messages.iter_mut().find(|message| message.id == id) {
            Some(message) => {
                message.set_attempts(attempts);
                true
            }
            None => false,
        }
    }
}
