use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{Span, info, instrument};
use tracing_indicatif::span_ext::IndicatifSpanExt;

use crate::codec::{CapturePreset, CommandEncoder, WireCodecError, WireCommand};
use crate::outbox::OutboxError;
use crate::profile::{CameraId, CameraProfile, ProfileError, ProfileStore, RawSettings, Selection};
use crate::protocol::CommandKind;
use crate::settings::{Correction, FieldId, SettingsError, SettingsSnapshot, Validated, Validator};
use crate::sync::{SendOutcome, SyncEngine};
use crate::utils::sms_segments;

/// Errors returned while turning stored settings into a sent command.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Profile(#[from] ProfileError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("failed to encode the command")]
    Codec(#[from] WireCodecError),
    #[error("failed to queue the command")]
    Outbox(#[from] OutboxError),
}

/// What happened to one dispatched command.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchReceipt {
    pub camera: CameraProfile,
    pub kind: CommandKind,
    pub command: WireCommand,
    pub corrections: Vec<Correction>,
    pub outcome: SendOutcome,
}

/// An encoded command that was not sent.
#[derive(Debug, Clone, Serialize)]
pub struct CommandPreview {
    pub camera: CameraProfile,
    pub kind: CommandKind,
    pub command: WireCommand,
    pub chars: usize,
    pub segments: usize,
    pub corrections: Vec<Correction>,
}

/// Per-camera result of a batch action.
#[derive(Debug)]
pub struct BatchOutcome {
    pub camera_id: CameraId,
    pub result: Result<DispatchReceipt, DispatchError>,
}

/// Glue from stored camera settings to the sync engine.
pub struct Dispatcher {
    profiles: Arc<dyn ProfileStore>,
    engine: Arc<SyncEngine>,
}

impl Dispatcher {
    #[must_use]
    pub fn new(profiles: Arc<dyn ProfileStore>, engine: Arc<SyncEngine>) -> Self {
        Self { profiles, engine }
    }

    #[must_use]
    pub fn profiles(&self) -> &Arc<dyn ProfileStore> {
        &self.profiles
    }

    #[must_use]
    pub fn engine(&self) -> &Arc<SyncEngine> {
        &self.engine
    }

    /// Validates the stored settings of one camera.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown cameras or unreadable stored settings.
    pub fn validated_settings(
        &self,
        camera_id: &CameraId,
    ) -> Result<(CameraProfile, Validated), DispatchError> {
        let camera = self.profiles.camera(camera_id)?;
        let snapshot = stored_snapshot(&self.profiles.settings(camera_id)?)?;
        let validated = Validator::new(camera.tier()).normalize(&snapshot, None);
        Ok((camera, validated))
    }

    /// Merges `entries` into the stored settings and keeps the normalised
    /// result. The last entry wins capture-mode conflicts.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown cameras or unknown setting names.
    #[instrument(skip(self, entries), level = "info", fields(camera = %camera_id))]
    pub fn update_settings(
        &self,
        camera_id: &CameraId,
        entries: &[(String, String)],
    ) -> Result<Validated, DispatchError> {
        let camera = self.profiles.camera(camera_id)?;
        let mut raw = self.profiles.settings(camera_id)?;
        raw.extend(entries.iter().cloned());
        let snapshot = stored_snapshot(&raw)?;
        let last_edit = entries
            .last()
            .and_then(|(key, _value)| key.parse::<FieldId>().ok());

        let validated = Validator::new(camera.tier()).normalize(&snapshot, last_edit);
        self.profiles
            .save_settings(camera_id, validated.snapshot.to_snapshot().to_form())?;
        info!(corrections = validated.corrections.len(), "settings saved");
        Ok(validated)
    }

    /// Encodes one command for a camera without sending it.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown cameras, unreadable settings or a broken
    /// encoding.
    pub fn preview(
        &self,
        camera_id: &CameraId,
        kind: CommandKind,
    ) -> Result<CommandPreview, DispatchError> {
        let (camera, validated) = self.validated_settings(camera_id)?;
        let command = CommandEncoder::encode(kind, &validated.snapshot)?;
        let chars = command.char_len();
        Ok(CommandPreview {
            camera,
            kind,
            command,
            chars,
            segments: sms_segments(chars),
            corrections: validated.corrections,
        })
    }

    /// Validates, encodes and sends one command built from stored settings.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown cameras, unreadable settings, a broken
    /// encoding or an outbox that cannot store a deferred command.
    #[instrument(skip(self), level = "info", fields(camera = %camera_id, %kind))]
    pub async fn send_settings(
        &self,
        camera_id: &CameraId,
        kind: CommandKind,
        last_edit: Option<FieldId>,
    ) -> Result<DispatchReceipt, DispatchError> {
        let camera = self.profiles.camera(camera_id)?;
        let snapshot = stored_snapshot(&self.profiles.settings(camera_id)?)?;
        let validated = Validator::new(camera.tier()).normalize(&snapshot, last_edit);
        self.send_validated(camera, kind, validated).await
    }

    /// Applies a capture preset, stores the result and sends the camera
    /// configuration.
    ///
    /// # Errors
    ///
    /// Same as [`Dispatcher::send_settings`], plus failures to store the
    /// updated settings.
    #[instrument(skip(self), level = "info", fields(camera = %camera_id, %preset))]
    pub async fn send_preset(
        &self,
        camera_id: &CameraId,
        preset: CapturePreset,
    ) -> Result<DispatchReceipt, DispatchError> {
        let camera = self.profiles.camera(camera_id)?;
        let stored = stored_snapshot(&self.profiles.settings(camera_id)?)?;
        let validated =
            Validator::new(camera.tier()).normalize(&preset.apply(&stored), Some(preset.last_edit()));
        self.profiles
            .save_settings(camera_id, validated.snapshot.to_snapshot().to_form())?;
        self.send_validated(camera, CommandKind::CameraConfig, validated)
            .await
    }

    /// Sends one command to every selected camera, independently.
    #[instrument(skip(self, selection), level = "info", fields(cameras = selection.len(), %kind))]
    pub async fn trigger_batch(&self, selection: &Selection, kind: CommandKind) -> Vec<BatchOutcome> {
        let span = Span::current();
        span.pb_set_length(selection.len() as u64);
        span.pb_set_message(&format!("Sending {kind} to {} camera(s)", selection.len()));

        let mut outcomes = Vec::with_capacity(selection.len());
        for camera_id in selection.iter() {
            span.pb_inc(1);
            let result = self.send_settings(camera_id, kind, None).await;
            outcomes.push(BatchOutcome {
                camera_id: camera_id.clone(),
                result,
            });
        }
        outcomes
    }

    async fn send_validated(
        &self,
        camera: CameraProfile,
        kind: CommandKind,
        validated: Validated,
    ) -> Result<DispatchReceipt, DispatchError> {
        let command = CommandEncoder::encode(kind, &validated.snapshot)?;
        let outcome = self
            .engine
            .send_now(camera.id(), camera.phone().as_str(), &command.to_string())
            .await?;
        Ok(DispatchReceipt {
            camera,
            kind,
            command,
            corrections: validated.corrections,
            outcome,
        })
    }
}

fn stored_snapshot(raw: &RawSettings) -> Result<SettingsSnapshot, SettingsError> {
    SettingsSnapshot::from_form(raw)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use tokio::sync::watch;

    use super::*;
    use crate::outbox::{MemoryOutbox, OutboxStore};
    use crate::profile::MemoryProfileStore;
    use crate::settings::CameraTier;
    use crate::sync::{Connectivity, DeferReason};
    use crate::transport::{Handoff, ScriptedTransport};

    struct Harness {
        dispatcher: Dispatcher,
        outbox: Arc<MemoryOutbox>,
        transport: Arc<ScriptedTransport>,
        _connectivity: watch::Sender<Connectivity>,
    }

    fn harness(state: Connectivity) -> Harness {
        let outbox = Arc::new(MemoryOutbox::new());
        let transport = Arc::new(ScriptedTransport::always_ok());
        let (connectivity, receiver) = watch::channel(state);
        let engine = SyncEngine::builder()
            .outbox(outbox.clone())
            .transport(transport.clone())
            .connectivity(receiver)
            .build();
        Harness {
            dispatcher: Dispatcher::new(Arc::new(MemoryProfileStore::new()), Arc::new(engine)),
            outbox,
            transport,
            _connectivity: connectivity,
        }
    }

    fn register(dispatcher: &Dispatcher, tier: CameraTier) -> CameraId {
        dispatcher
            .profiles()
            .register("Hochsitz", "+491701234567", tier)
            .expect("valid camera should register")
            .id()
            .clone()
    }

    fn entries(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect()
    }

    #[tokio::test]
    async fn send_settings_hands_off_to_the_camera_phone() {
        let harness = harness(Connectivity::Online);
        let camera = register(&harness.dispatcher, CameraTier::Base);

        let receipt = harness
            .dispatcher
            .send_settings(&camera, CommandKind::TriggerCapture, None)
            .await
            .expect("dispatch");

        assert_eq!("$03*1#1$", receipt.command.to_string());
        assert_eq!(
            SendOutcome::Delivered {
                handoff: Handoff::Confirmed
            },
            receipt.outcome
        );
        let calls = harness.transport.calls();
        assert_eq!("+491701234567", calls[0].address);
    }

    #[tokio::test]
    async fn offline_dispatch_is_deferred() {
        let harness = harness(Connectivity::Offline);
        let camera = register(&harness.dispatcher, CameraTier::Pro);

        let receipt = harness
            .dispatcher
            .send_settings(&camera, CommandKind::GeneralConfig, None)
            .await
            .expect("dispatch");

        assert_matches!(
            receipt.outcome,
            SendOutcome::Deferred {
                reason: DeferReason::Offline,
                ..
            }
        );
        let pending = harness.outbox.list_pending().await.expect("list");
        assert_eq!(receipt.command.to_string(), pending[0].body());
    }

    #[test]
    fn update_settings_keeps_the_last_edited_send_flag() {
        let harness = harness(Connectivity::Online);
        let camera = register(&harness.dispatcher, CameraTier::Max);

        harness
            .dispatcher
            .update_settings(
                &camera,
                &entries(&[("captureMode", "Video"), ("sendImageSwitch", "on")]),
            )
            .expect("update");
        let (_camera, validated) = harness
            .dispatcher
            .validated_settings(&camera)
            .expect("stored settings stay readable");

        assert_eq!("Image+Video", validated.snapshot.text(FieldId::CaptureMode));
        assert!(validated.snapshot.flag(FieldId::SendImageSwitch));
    }

    #[test]
    fn update_settings_rejects_unknown_keys() {
        let harness = harness(Connectivity::Online);
        let camera = register(&harness.dispatcher, CameraTier::Max);
        assert_matches!(
            harness
                .dispatcher
                .update_settings(&camera, &entries(&[("zoom", "3")])),
            Err(DispatchError::Settings(SettingsError::UnknownField { .. }))
        );
    }

    #[test]
    fn preview_counts_characters_and_segments() {
        let harness = harness(Connectivity::Online);
        let camera = register(&harness.dispatcher, CameraTier::Base);

        let preview = harness
            .dispatcher
            .preview(&camera, CommandKind::CameraConfig)
            .expect("preview");

        assert_eq!(preview.command.char_len(), preview.chars);
        assert_eq!(1, preview.segments);
        assert_eq!(0, harness.transport.call_count());
    }

    #[tokio::test]
    async fn preset_is_stored_and_sent_as_camera_config() {
        let harness = harness(Connectivity::Online);
        let camera = register(&harness.dispatcher, CameraTier::Pro);

        let receipt = harness
            .dispatcher
            .send_preset(&camera, "video-only".parse().expect("preset"))
            .await
            .expect("dispatch");

        assert_eq!(CommandKind::CameraConfig, receipt.kind);
        let stored = harness
            .dispatcher
            .profiles()
            .settings(&camera)
            .expect("settings");
        assert_eq!(Some("Video"), stored.get("captureMode").map(String::as_str));
    }

    #[tokio::test]
    async fn batch_reports_each_camera_independently() {
        let harness = harness(Connectivity::Online);
        let known = register(&harness.dispatcher, CameraTier::Base);
        let selection = Selection::from_iter([known.clone(), CameraId::from("cam-404")]);

        let outcomes = harness
            .dispatcher
            .trigger_batch(&selection, CommandKind::TriggerCapture)
            .await;

        assert_eq!(2, outcomes.len());
        assert!(outcomes[0].result.is_ok());
        assert_matches!(
            outcomes[1].result,
            Err(DispatchError::Profile(ProfileError::UnknownCamera { .. }))
        );
        assert_eq!(1, harness.transport.call_count());
    }
}
