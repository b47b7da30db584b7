mod scripted;
mod sms_uri;

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use strum_macros::Display;
use thiserror::Error;

pub use self::scripted::{ScriptStep, ScriptedTransport, SentMessage, TransportScript};
pub use self::sms_uri::SmsUriTransport;

/// How far a successful attempt got.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Display, Serialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Handoff {
    /// The channel acknowledged the message.
    Confirmed,
    /// The message was handed off without a reliable acknowledgement.
    Tentative,
}

/// Errors returned by a transport attempt.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("the messaging channel rejected the message: {reason}")]
    Rejected { reason: String },
    #[error("the messaging channel is unavailable")]
    Unavailable,
    #[error("no handoff within {}", humantime::format_duration(*after))]
    TimedOut { after: Duration },
    #[error("failed to hand the message to the messaging channel")]
    Io { source: std::io::Error },
}

/// Platform capability that hands one message to the messaging channel.
///
/// Any `Ok` counts as success, whether confirmed or tentative.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn attempt_send(&self, address: &str, body: &str) -> Result<Handoff, TransportError>;
}
