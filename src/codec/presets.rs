use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use thiserror::Error;

use super::tables::{CaptureMode, Choice, VideoResolution};
use crate::settings::{
    FieldId, LONG_VIDEO_DURATIONS, MAX_SENDABLE_VIDEO_SECONDS, SettingValue, SettingsSnapshot,
    TimeRange, TimeSpan,
};

const DEFAULT_LONG_VIDEO_SECONDS: i64 = 30;
const FALLBACK_VIDEO_SECONDS: i64 = 5;

/// Errors returned when parsing a capture preset.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum PresetError {
    #[error(
        "unknown preset `{value}`; expected image-only, video-only, image-video, long-video[=N], timer1=HH:MM-HH:MM, timer2=HH:MM-HH:MM, delay=HH:MM:SS or timelapse=HH:MM:SS"
    )]
    Unknown { value: String },
    #[error("preset `{preset}` needs a valid argument, got `{value}`")]
    InvalidArgument { preset: String, value: String },
}

/// Canned camera configurations applied on top of stored settings.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum CapturePreset {
    ImageOnly,
    VideoOnly,
    ImageVideo,
    /// Long recording that is stored on the card and never transmitted.
    LongVideo { seconds: i64 },
    Timer1(TimeRange),
    Timer2(TimeRange),
    Delay(TimeSpan),
    Timelapse(TimeSpan),
}

impl CapturePreset {
    /// Applies the preset, returning a new snapshot.
    ///
    /// ```
    /// use trailcam::{CapturePreset, FieldId, SettingValue, SettingsSnapshot};
    ///
    /// let stored = SettingsSnapshot::from_form([("videoDuration", "20")])?;
    /// let preset: CapturePreset = "video-only".parse()?;
    /// let applied = preset.apply(&stored);
    /// assert_eq!(Some(&SettingValue::Flag(false)), applied.get(FieldId::SendVideoSwitch));
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    #[must_use]
    pub fn apply(&self, snapshot: &SettingsSnapshot) -> SettingsSnapshot {
        let snapshot = snapshot.clone();
        let sendable = stored_duration(&snapshot) <= MAX_SENDABLE_VIDEO_SECONDS;
        match *self {
            Self::ImageOnly => snapshot
                .with(FieldId::CaptureMode, mode(CaptureMode::Image))
                .with(FieldId::SendImageSwitch, SettingValue::Flag(true))
                .with(FieldId::SendVideoSwitch, SettingValue::Flag(false)),
            Self::VideoOnly => snapshot
                .with(FieldId::CaptureMode, mode(CaptureMode::Video))
                .with(FieldId::SendImageSwitch, SettingValue::Flag(false))
                .with(FieldId::SendVideoSwitch, SettingValue::Flag(sendable)),
            Self::ImageVideo => snapshot
                .with(FieldId::CaptureMode, mode(CaptureMode::ImageVideo))
                .with(FieldId::SendImageSwitch, SettingValue::Flag(true))
                .with(FieldId::SendVideoSwitch, SettingValue::Flag(sendable)),
            Self::LongVideo { seconds } => {
                let resolution = snapshot
                    .get(FieldId::VideoResolution)
                    .and_then(SettingValue::as_text)
                    .map(VideoResolution::from_label);
                let snapshot = snapshot
                    .with(FieldId::CaptureMode, mode(CaptureMode::Video))
                    .with(FieldId::SendImageSwitch, SettingValue::Flag(false))
                    .with(FieldId::SendVideoSwitch, SettingValue::Flag(false))
                    .with(FieldId::VideoDuration, SettingValue::Integer(seconds));
                if resolution == Some(VideoResolution::Fhd) {
                    snapshot.with(
                        FieldId::VideoResolution,
                        SettingValue::Text(VideoResolution::Hd.to_string()),
                    )
                } else {
                    snapshot
                }
            }
            Self::Timer1(window) => snapshot
                .with(FieldId::Timer1Switch, SettingValue::Flag(true))
                .with(FieldId::Timer1, SettingValue::Range(window)),
            Self::Timer2(window) => snapshot
                .with(FieldId::Timer2Switch, SettingValue::Flag(true))
                .with(FieldId::Timer2, SettingValue::Range(window)),
            Self::Delay(span) => snapshot
                .with(FieldId::DelaySwitch, SettingValue::Flag(true))
                .with(FieldId::DelayTime, SettingValue::Span(span)),
            Self::Timelapse(span) => snapshot
                .with(FieldId::TimelapseSwitch, SettingValue::Flag(true))
                .with(FieldId::TimelapseTime, SettingValue::Span(span)),
        }
    }

    /// Field the preset edits last, used to settle capture-mode conflicts.
    #[must_use]
    pub fn last_edit(&self) -> FieldId {
        match self {
            Self::ImageOnly | Self::VideoOnly | Self::ImageVideo | Self::LongVideo { .. } => {
                FieldId::CaptureMode
            }
            Self::Timer1(_) => FieldId::Timer1,
            Self::Timer2(_) => FieldId::Timer2,
            Self::Delay(_) => FieldId::DelayTime,
            Self::Timelapse(_) => FieldId::TimelapseTime,
        }
    }
}

impl FromStr for CapturePreset {
    type Err = PresetError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let (name, argument) = match trimmed.split_once(['=', ':']) {
            Some((name, argument)) => (name, Some(argument.trim())),
            None => (trimmed, None),
        };
        let invalid = |argument: &str| PresetError::InvalidArgument {
            preset: name.to_string(),
            value: argument.to_string(),
        };

        match (name.to_ascii_lowercase().replace('_', "-").as_str(), argument) {
            ("image-only", None) => Ok(Self::ImageOnly),
            ("video-only", None) => Ok(Self::VideoOnly),
            ("image-video", None) => Ok(Self::ImageVideo),
            ("long-video", None) => Ok(Self::LongVideo {
                seconds: DEFAULT_LONG_VIDEO_SECONDS,
            }),
            ("long-video", Some(argument)) => {
                let seconds = argument
                    .trim_end_matches('s')
                    .parse::<i64>()
                    .map_err(|_error| invalid(argument))?;
                let seconds = if LONG_VIDEO_DURATIONS.contains(&seconds) {
                    seconds
                } else {
                    DEFAULT_LONG_VIDEO_SECONDS
                };
                Ok(Self::LongVideo { seconds })
            }
            ("timer1", Some(argument)) => argument
                .parse()
                .map(Self::Timer1)
                .map_err(|_error| invalid(argument)),
            ("timer2", Some(argument)) => argument
                .parse()
                .map(Self::Timer2)
                .map_err(|_error| invalid(argument)),
            ("delay", Some(argument)) => argument
                .parse()
                .map(Self::Delay)
                .map_err(|_error| invalid(argument)),
            ("timelapse", Some(argument)) => argument
                .parse()
                .map(Self::Timelapse)
                .map_err(|_error| invalid(argument)),
            _ => Err(PresetError::Unknown {
                value: trimmed.to_string(),
            }),
        }
    }
}

impl Display for CapturePreset {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::ImageOnly => write!(f, "image-only"),
            Self::VideoOnly => write!(f, "video-only"),
            Self::ImageVideo => write!(f, "image-video"),
            Self::LongVideo { seconds } => write!(f, "long-video={seconds}"),
            Self::Timer1(window) => write!(f, "timer1={window}"),
            Self::Timer2(window) => write!(f, "timer2={window}"),
            Self::Delay(span) => write!(f, "delay={span}"),
            Self::Timelapse(span) => write!(f, "timelapse={span}"),
        }
    }
}

fn mode(mode: CaptureMode) -> SettingValue {
    SettingValue::Text(mode.to_string())
}

fn stored_duration(snapshot: &SettingsSnapshot) -> i64 {
    snapshot
        .get(FieldId::VideoDuration)
        .and_then(SettingValue::as_integer)
        .unwrap_or(FALLBACK_VIDEO_SECONDS)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::codec::encoder::CommandEncoder;
    use crate::protocol::CommandKind;
    use crate::settings::{CameraTier, Validator};

    fn field(command: &str, position: usize) -> String {
        command
            .trim_matches('$')
            .split('#')
            .nth(position)
            .map(str::to_string)
            .unwrap_or_default()
    }

    fn encode_with(tier: CameraTier, stored: &[(&str, &str)], preset: &str) -> String {
        let stored = SettingsSnapshot::from_form(stored.iter().copied())
            .expect("stored settings should parse");
        let preset: CapturePreset = preset.parse().expect("preset should parse");
        let validated =
            Validator::new(tier).normalize(&preset.apply(&stored), Some(preset.last_edit()));
        CommandEncoder::encode(CommandKind::CameraConfig, &validated.snapshot)
            .expect("validated snapshot should encode")
            .to_string()
    }

    #[rstest]
    #[case("image-only", CapturePreset::ImageOnly)]
    #[case("VIDEO_ONLY", CapturePreset::VideoOnly)]
    #[case("long-video", CapturePreset::LongVideo { seconds: 30 })]
    #[case("long-video=50s", CapturePreset::LongVideo { seconds: 50 })]
    #[case("long-video=45", CapturePreset::LongVideo { seconds: 30 })]
    fn presets_parse(#[case] input: &str, #[case] expected: CapturePreset) {
        assert_eq!(Ok(expected), input.parse::<CapturePreset>());
    }

    #[test]
    fn presets_with_arguments_reject_garbage() {
        assert_matches!(
            "timer1=soon".parse::<CapturePreset>(),
            Err(PresetError::InvalidArgument { .. })
        );
        assert_matches!(
            "panorama".parse::<CapturePreset>(),
            Err(PresetError::Unknown { .. })
        );
    }

    #[test]
    fn image_only_preset_sends_images_only() {
        let command = encode_with(CameraTier::Pro, &[], "image-only");
        assert_eq!("1", field(&command, 1));
        assert_eq!("1", field(&command, 19));
        assert_eq!("0", field(&command, 20));
    }

    #[rstest]
    #[case("8", "1")]
    #[case("20", "0")]
    fn video_only_preset_sends_short_videos(#[case] duration: &str, #[case] send_video: &str) {
        let command = encode_with(CameraTier::Max, &[("videoDuration", duration)], "video-only");
        assert_eq!("2", field(&command, 1));
        assert_eq!("0", field(&command, 19));
        assert_eq!(send_video, field(&command, 20));
    }

    #[test]
    fn long_video_preset_downgrades_full_hd() {
        let command = encode_with(
            CameraTier::Max,
            &[("videoResolution", "FHD-1920x1080"), ("sendVideoSwitch", "on")],
            "long-video=59",
        );
        assert_eq!("2", field(&command, 3));
        assert_eq!("59", field(&command, 4));
        assert_eq!("0", field(&command, 20));
    }

    #[test]
    fn timer_preset_enables_the_window() {
        let command = encode_with(CameraTier::Pro, &[], "timer2=20:00-23:30");
        assert_eq!("2000-2330", field(&command, 18));
    }

    #[test]
    fn delay_preset_encodes_seconds() {
        let command = encode_with(CameraTier::Base, &[], "delay=00:00:45");
        assert_eq!("45", field(&command, 15));
    }

    #[test]
    fn display_round_trips_through_parse() {
        for preset in ["image-video", "long-video=40", "timer1=06:00-07:00", "timelapse=00:10:00"] {
            let parsed: CapturePreset = preset.parse().expect("preset should parse");
            assert_eq!(preset, parsed.to_string());
        }
    }
}
