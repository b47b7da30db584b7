use std::str::FromStr;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::debug;

use super::{Handoff, Transport, TransportError};
use crate::error::FixtureError;

/// One scripted transport reaction.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ScriptStep {
    Ok,
    Tentative,
    Fail,
    Unavailable,
    /// Never completes; the caller's bounded wait has to give up.
    Timeout,
}

impl FromStr for ScriptStep {
    type Err = FixtureError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ok" | "confirmed" => Ok(Self::Ok),
            "tentative" => Ok(Self::Tentative),
            "fail" | "rejected" => Ok(Self::Fail),
            "unavailable" => Ok(Self::Unavailable),
            "timeout" | "hang" => Ok(Self::Timeout),
            other => Err(FixtureError::UnknownStep {
                step: other.to_string(),
            }),
        }
    }
}

/// Comma-separated list of transport reactions, e.g. `fail,timeout,ok`.
///
/// The last step repeats once the script runs out.
#[derive(Debug, Clone, Eq, PartialEq, derive_more::Into)]
pub struct TransportScript {
    steps: Vec<ScriptStep>,
}

impl FromStr for TransportScript {
    type Err = FixtureError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let steps = value
            .split(',')
            .map(str::trim)
            .filter(|step| !step.is_empty())
            .map(str::parse)
            .collect::<Result<Vec<ScriptStep>, _>>()?;
        if steps.is_empty() {
            return Err(FixtureError::EmptyFixture);
        }
        Ok(Self { steps })
    }
}

/// One call observed by a [`ScriptedTransport`].
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SentMessage {
    pub address: String,
    pub body: String,
}

#[derive(Debug, Default)]
struct ScriptState {
    cursor: usize,
    calls: Vec<SentMessage>,
}

/// Fake transport driven by a fixture script.
#[derive(Debug)]
pub struct ScriptedTransport {
    steps: Vec<ScriptStep>,
    delay: Duration,
    state: Mutex<ScriptState>,
}

impl ScriptedTransport {
    #[must_use]
    pub fn new(script: TransportScript) -> Self {
        Self {
            steps: script.into(),
            delay: Duration::ZERO,
            state: Mutex::default(),
        }
    }

    /// Transport that confirms every message.
    #[must_use]
    pub fn always_ok() -> Self {
        Self::new(TransportScript {
            steps: vec![ScriptStep::Ok],
        })
    }

    /// Waits `delay` before reacting to each call.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Every call made so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<SentMessage> {
        self.state().calls.clone()
    }

    #[must_use]
    pub fn call_count(&self) -> usize {
        self.state().calls.len()
    }

    fn state(&self) -> MutexGuard<'_, ScriptState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_step(&self, address: &str, body: &str) -> ScriptStep {
        let mut state = self.state();
        state.calls.push(SentMessage {
            address: address.to_string(),
            body: body.to_string(),
        });
        let index = state.cursor.min(self.steps.len().saturating_sub(1));
        state.cursor += 1;
        self.steps.get(index).copied().unwrap_or(ScriptStep::Ok)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn attempt_send(&self, address: &str, body: &str) -> Result<Handoff, TransportError> {
        let step = self.next_step(address, body);
        debug!(?step, address, "scripted transport attempt");
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match step {
            ScriptStep::Ok => Ok(Handoff::Confirmed),
            ScriptStep::Tentative => Ok(Handoff::Tentative),
            ScriptStep::Fail => Err(TransportError::Rejected {
                reason: "scripted failure".to_string(),
            }),
            ScriptStep::Unavailable => Err(TransportError::Unavailable),
            ScriptStep::Timeout => std::future::pending().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    use super::*;

    fn transport(script: &str) -> ScriptedTransport {
        ScriptedTransport::new(script.parse().expect("script should parse"))
    }

    #[test]
    fn script_rejects_unknown_and_empty_fixtures() {
        assert_matches!(
            "ok,explode".parse::<TransportScript>(),
            Err(FixtureError::UnknownStep { step }) if step == "explode"
        );
        assert_matches!(" , ".parse::<TransportScript>(), Err(FixtureError::EmptyFixture));
    }

    #[tokio::test]
    async fn last_step_repeats_after_the_script_runs_out() {
        let transport = transport("fail,tentative");
        assert_matches!(
            transport.attempt_send("+491701234567", "a").await,
            Err(TransportError::Rejected { .. })
        );
        for _ in 0..3 {
            assert_matches!(
                transport.attempt_send("+491701234567", "b").await,
                Ok(Handoff::Tentative)
            );
        }
        assert_eq!(4, transport.call_count());
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_step_never_completes() {
        let transport = transport("timeout");
        let attempt = tokio::time::timeout(
            Duration::from_secs(30),
            transport.attempt_send("+491701234567", "$03*1#1$"),
        )
        .await;
        assert!(attempt.is_err());
        assert_eq!(
            vec![SentMessage {
                address: "+491701234567".into(),
                body: "$03*1#1$".into(),
            }],
            transport.calls()
        );
    }
}
