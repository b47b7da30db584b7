use tracing::instrument;

use super::tables::{
    CaptureMode, Choice, FlashLed, FtpMode, HourSystem, ImageResolution, ImageSize, NightMode,
    PirSensitivity, SmsControl, VideoResolution, burst_to_send,
};
use super::wire::{WireCodec, WireCodecError, WireCommand};
use crate::protocol::{CommandKind, command_metadata};
use crate::settings::{FieldId, MAX_SENDABLE_VIDEO_SECONDS, ValidatedSnapshot};

const OFF: &str = "OFF";
const PLACEHOLDER: &str = "0";

/// Pure encoder from validated settings to firmware commands.
pub struct CommandEncoder;

impl CommandEncoder {
    /// Encodes one command kind for a validated snapshot.
    ///
    /// Fields the tier does not carry still occupy their position, filled
    /// with `0` or `OFF`.
    ///
    /// ```
    /// use trailcam::{CameraTier, CommandEncoder, CommandKind, SettingsSnapshot, Validator};
    ///
    /// let snapshot = SettingsSnapshot::from_form([("maxCountSwitch", "false"), ("maxCount", "40")])?;
    /// let validated = Validator::new(CameraTier::Pro).normalize(&snapshot, None);
    /// let command = CommandEncoder::encode(CommandKind::GeneralConfig, &validated.snapshot)?;
    /// assert_eq!("$10*13#1#2#0#OFF#0#0#0#1#0#0#0#0#0$", command.to_string());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error only if the emitted layout breaks the framing rules,
    /// which indicates a defect in the encoder.
    #[instrument(skip(snapshot), level = "debug", fields(tier = %snapshot.tier()))]
    pub fn encode(
        kind: CommandKind,
        snapshot: &ValidatedSnapshot,
    ) -> Result<WireCommand, WireCodecError> {
        let params = match kind {
            CommandKind::GeneralConfig => general_params(snapshot),
            CommandKind::CameraConfig => camera_params(snapshot),
            CommandKind::PhoneList => recipient_params(snapshot, kind, FieldId::phone_slot),
            CommandKind::EmailList => recipient_params(snapshot, kind, FieldId::email_slot),
            CommandKind::TriggerCapture => vec!["1".to_string()],
        };
        WireCodec::frame(kind, params)
    }
}

fn general_params(snapshot: &ValidatedSnapshot) -> Vec<String> {
    let max_count = if snapshot.flag(FieldId::MaxCountSwitch) {
        snapshot.integer(FieldId::MaxCount).to_string()
    } else {
        PLACEHOLDER.to_string()
    };
    let status_time = if snapshot.flag(FieldId::StatusReportSwitch) {
        snapshot.time(FieldId::StatusTime).compact()
    } else {
        OFF.to_string()
    };

    vec![
        code::<SmsControl>(snapshot, FieldId::SmsControl),
        code::<ImageSize>(snapshot, FieldId::ImageSize),
        max_count,
        status_time,
        PLACEHOLDER.to_string(),
        PLACEHOLDER.to_string(),
        switch(snapshot, FieldId::MmsControlSwitch),
        // SMS remote control, always on.
        "1".to_string(),
        code::<FtpMode>(snapshot, FieldId::FtpMode),
        PLACEHOLDER.to_string(),
        PLACEHOLDER.to_string(),
        PLACEHOLDER.to_string(),
        PLACEHOLDER.to_string(),
    ]
}

fn camera_params(snapshot: &ValidatedSnapshot) -> Vec<String> {
    let duration = snapshot.integer(FieldId::VideoDuration);
    let burst = snapshot.integer(FieldId::BurstImages);
    let send_video =
        snapshot.flag(FieldId::SendVideoSwitch) && duration <= MAX_SENDABLE_VIDEO_SECONDS;
    // Device polarity: 0 arms the motion sensor.
    let motion_sensor = if snapshot.flag(FieldId::MotionSensorSwitch) {
        "0"
    } else {
        "1"
    };

    vec![
        code::<CaptureMode>(snapshot, FieldId::CaptureMode),
        code::<ImageResolution>(snapshot, FieldId::ImageResolution),
        code::<VideoResolution>(snapshot, FieldId::VideoResolution),
        duration.to_string(),
        burst.to_string(),
        code::<NightMode>(snapshot, FieldId::NightMode),
        code::<FlashLed>(snapshot, FieldId::FlashLed),
        "1".to_string(),
        motion_sensor.to_string(),
        switch(snapshot, FieldId::SdCycleSwitch),
        PLACEHOLDER.to_string(),
        code::<PirSensitivity>(snapshot, FieldId::PirSensitivity),
        PLACEHOLDER.to_string(),
        PLACEHOLDER.to_string(),
        seconds_or_off(snapshot, FieldId::DelaySwitch, FieldId::DelayTime),
        seconds_or_off(snapshot, FieldId::TimelapseSwitch, FieldId::TimelapseTime),
        window_or_off(snapshot, FieldId::Timer1Switch, FieldId::Timer1),
        window_or_off(snapshot, FieldId::Timer2Switch, FieldId::Timer2),
        switch(snapshot, FieldId::SendImageSwitch),
        u8::from(send_video).to_string(),
        burst_to_send(burst).to_string(),
        OFF.to_string(),
        OFF.to_string(),
        code::<HourSystem>(snapshot, FieldId::HourSystem),
        PLACEHOLDER.to_string(),
        PLACEHOLDER.to_string(),
        PLACEHOLDER.to_string(),
    ]
}

fn recipient_params(
    snapshot: &ValidatedSnapshot,
    kind: CommandKind,
    slot_field: fn(usize) -> Option<FieldId>,
) -> Vec<String> {
    let slots = command_metadata(kind).param_count();
    (1..=slots)
        .map(|slot| {
            slot_field(slot)
                .map(|field| snapshot.text(field))
                .filter(|recipient| !recipient.is_empty())
                .unwrap_or(PLACEHOLDER)
                .to_string()
        })
        .collect()
}

fn code<T: Choice>(snapshot: &ValidatedSnapshot, field: FieldId) -> String {
    snapshot.choice::<T>(field).code().to_string()
}

fn switch(snapshot: &ValidatedSnapshot, field: FieldId) -> String {
    u8::from(snapshot.flag(field)).to_string()
}

fn seconds_or_off(snapshot: &ValidatedSnapshot, switch: FieldId, field: FieldId) -> String {
    if snapshot.flag(switch) {
        snapshot.span(field).total_seconds().to_string()
    } else {
        OFF.to_string()
    }
}

fn window_or_off(snapshot: &ValidatedSnapshot, switch: FieldId, field: FieldId) -> String {
    if snapshot.flag(switch) {
        snapshot.range(field).compact()
    } else {
        OFF.to_string()
    }
}
