use std::collections::HashMap;
use std::sync::LazyLock;

use strum::IntoEnumIterator;

use super::field::FieldId;
use super::snapshot::SettingValue;
use super::tier::CameraTier;
use super::time_value::{TimeOfDay, TimeRange, TimeSpan};
use crate::codec::{
    CaptureMode, FlashLed, FtpMode, HourSystem, ImageResolution, ImageSize, NightMode,
    PirSensitivity, SmsControl, VideoResolution,
};

/// Fields every tier supports.
const COMMON_FIELDS: &[FieldId] = &[
    FieldId::SmsControl,
    FieldId::ImageSize,
    FieldId::StatusReportSwitch,
    FieldId::StatusTime,
    FieldId::FtpMode,
    FieldId::Phone1,
    FieldId::Email1,
    FieldId::SendImageSwitch,
    FieldId::SendVideoSwitch,
    FieldId::CaptureMode,
    FieldId::NightMode,
    FieldId::ImageResolution,
    FieldId::VideoResolution,
    FieldId::PirSensitivity,
    FieldId::FlashLed,
    FieldId::VideoDuration,
    FieldId::HourSystem,
    FieldId::BurstImages,
    FieldId::MotionSensorSwitch,
    FieldId::SdCycleSwitch,
    FieldId::Timer1Switch,
    FieldId::Timer1,
    FieldId::DelaySwitch,
    FieldId::DelayTime,
];

/// Fields added from the Pro tier upwards.
const PRO_FIELDS: &[FieldId] = &[
    FieldId::MaxCountSwitch,
    FieldId::MaxCount,
    FieldId::MmsControlSwitch,
    FieldId::Phone2,
    FieldId::Email2,
    FieldId::Timer2Switch,
    FieldId::Timer2,
    FieldId::TimelapseSwitch,
    FieldId::TimelapseTime,
];

/// Fields only the Max tier supports.
const MAX_FIELDS: &[FieldId] = &[
    FieldId::Phone3,
    FieldId::Phone4,
    FieldId::Email3,
    FieldId::Email4,
];

/// Default status report time when none or an invalid one is given.
pub(crate) const DEFAULT_STATUS_TIME: (u8, u8) = (8, 0);

/// Static per-tier description of legal fields, allowed values and defaults.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    tier: CameraTier,
    fields: Vec<FieldId>,
    image_resolutions: Vec<ImageResolution>,
    video_resolutions: Vec<VideoResolution>,
    pir_levels: Vec<PirSensitivity>,
    night_modes: Vec<NightMode>,
    default_capture_mode: CaptureMode,
    default_pir: PirSensitivity,
    default_video_duration: i64,
}

impl CommandSpec {
    #[must_use]
    pub fn tier(&self) -> CameraTier {
        self.tier
    }

    /// Fields legal for this tier, in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldId] {
        &self.fields
    }

    #[must_use]
    pub fn allows(&self, field: FieldId) -> bool {
        self.fields.contains(&field)
    }

    #[must_use]
    pub fn image_resolutions(&self) -> &[ImageResolution] {
        &self.image_resolutions
    }

    #[must_use]
    pub fn video_resolutions(&self) -> &[VideoResolution] {
        &self.video_resolutions
    }

    #[must_use]
    pub fn pir_levels(&self) -> &[PirSensitivity] {
        &self.pir_levels
    }

    #[must_use]
    pub fn night_modes(&self) -> &[NightMode] {
        &self.night_modes
    }

    /// Default value for a field on this tier.
    ///
    /// ```
    /// use trailcam::{CameraTier, FieldId, SettingValue, command_spec};
    ///
    /// let base = command_spec(CameraTier::Base);
    /// assert_eq!(SettingValue::Text("Image".into()), base.default_value(FieldId::CaptureMode));
    /// ```
    #[must_use]
    pub fn default_value(&self, field: FieldId) -> SettingValue {
        match field {
            FieldId::SmsControl => text(SmsControl::Instant),
            FieldId::ImageSize => text(ImageSize::default()),
            FieldId::MaxCountSwitch
            | FieldId::StatusReportSwitch
            | FieldId::MmsControlSwitch
            | FieldId::SdCycleSwitch
            | FieldId::Timer1Switch
            | FieldId::Timer2Switch
            | FieldId::DelaySwitch
            | FieldId::TimelapseSwitch => SettingValue::Flag(false),
            FieldId::MaxCount => SettingValue::Integer(10),
            FieldId::StatusTime => {
                let (hour, minute) = DEFAULT_STATUS_TIME;
                TimeOfDay::from_hm(hour, minute)
                    .map_or(SettingValue::Time(TimeOfDay::MIDNIGHT), SettingValue::Time)
            }
            FieldId::FtpMode => text(FtpMode::default()),
            FieldId::SendImageSwitch | FieldId::MotionSensorSwitch => SettingValue::Flag(true),
            FieldId::SendVideoSwitch => {
                SettingValue::Flag(self.default_capture_mode.captures_video())
            }
            FieldId::CaptureMode => text(self.default_capture_mode),
            FieldId::NightMode => text(NightMode::Balance),
            FieldId::ImageResolution => text(
                self.image_resolutions
                    .first()
                    .copied()
                    .unwrap_or_default(),
            ),
            FieldId::VideoResolution => text(VideoResolution::Hd),
            FieldId::PirSensitivity => text(self.default_pir),
            FieldId::FlashLed => text(FlashLed::default()),
            FieldId::VideoDuration => SettingValue::Integer(self.default_video_duration),
            FieldId::HourSystem => text(HourSystem::default()),
            FieldId::BurstImages => SettingValue::Integer(1),
            FieldId::Timer1 | FieldId::Timer2 => SettingValue::Range(TimeRange::default()),
            FieldId::DelayTime | FieldId::TimelapseTime => SettingValue::Span(TimeSpan::default()),
            FieldId::Phone1
            | FieldId::Phone2
            | FieldId::Phone3
            | FieldId::Phone4
            | FieldId::Email1
            | FieldId::Email2
            | FieldId::Email3
            | FieldId::Email4 => SettingValue::Text(String::new()),
        }
    }
}

fn text(value: impl ToString) -> SettingValue {
    SettingValue::Text(value.to_string())
}

static SPECS_BY_TIER: LazyLock<HashMap<CameraTier, CommandSpec>> =
    LazyLock::new(|| CameraTier::iter().map(|tier| (tier, spec_for(tier))).collect());

/// Returns the static command spec for a tier.
#[must_use]
pub fn command_spec(tier: CameraTier) -> &'static CommandSpec {
    static FALLBACK: LazyLock<CommandSpec> = LazyLock::new(|| spec_for(CameraTier::Base));
    SPECS_BY_TIER.get(&tier).unwrap_or(&FALLBACK)
}

fn spec_for(tier: CameraTier) -> CommandSpec {
    let extra: &[&[FieldId]] = match tier {
        CameraTier::Base => &[],
        CameraTier::Pro => &[PRO_FIELDS],
        CameraTier::Max => &[PRO_FIELDS, MAX_FIELDS],
    };
    let fields = COMMON_FIELDS
        .iter()
        .chain(extra.iter().flat_map(|fields| fields.iter()))
        .copied()
        .collect();

    match tier {
        CameraTier::Base => CommandSpec {
            tier,
            fields,
            image_resolutions: vec![
                ImageResolution::Mp12,
                ImageResolution::Mp8,
                ImageResolution::Mp5,
            ],
            video_resolutions: vec![VideoResolution::Hd, VideoResolution::Wvga],
            pir_levels: PirSensitivity::NAMED.to_vec(),
            night_modes: vec![NightMode::Balance, NightMode::Eco],
            default_capture_mode: CaptureMode::Image,
            default_pir: PirSensitivity::Medium,
            default_video_duration: 5,
        },
        CameraTier::Pro => CommandSpec {
            tier,
            fields,
            image_resolutions: ImageResolution::iter()
                .filter(|resolution| *resolution != ImageResolution::Mp32)
                .collect(),
            video_resolutions: VideoResolution::iter().collect(),
            pir_levels: PirSensitivity::all(),
            night_modes: NightMode::iter().collect(),
            default_capture_mode: CaptureMode::ImageVideo,
            default_pir: PirSensitivity::Level(5),
            default_video_duration: 10,
        },
        CameraTier::Max => CommandSpec {
            tier,
            fields,
            image_resolutions: ImageResolution::iter().collect(),
            video_resolutions: VideoResolution::iter().collect(),
            pir_levels: PirSensitivity::all(),
            night_modes: NightMode::iter().collect(),
            default_capture_mode: CaptureMode::ImageVideo,
            default_pir: PirSensitivity::Level(7),
            default_video_duration: 10,
        },
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(CameraTier::Base, 24)]
    #[case(CameraTier::Pro, 33)]
    #[case(CameraTier::Max, 37)]
    fn tiers_grow_their_field_sets(#[case] tier: CameraTier, #[case] count: usize) {
        assert_eq!(count, command_spec(tier).fields().len());
    }

    #[test]
    fn base_tier_excludes_pro_features() {
        let base = command_spec(CameraTier::Base);
        assert!(!base.allows(FieldId::MaxCount));
        assert!(!base.allows(FieldId::Timer2));
        assert!(!base.allows(FieldId::TimelapseSwitch));
        assert!(!base.allows(FieldId::Phone2));
        assert!(base.allows(FieldId::Timer1));
    }

    #[rstest]
    #[case(CameraTier::Base, "12MP")]
    #[case(CameraTier::Pro, "24M")]
    #[case(CameraTier::Max, "32M")]
    fn default_image_resolution_is_tier_maximum(#[case] tier: CameraTier, #[case] label: &str) {
        assert_eq!(
            SettingValue::Text(label.into()),
            command_spec(tier).default_value(FieldId::ImageResolution)
        );
    }

    #[rstest]
    #[case(CameraTier::Base, "Medium")]
    #[case(CameraTier::Pro, "L5")]
    #[case(CameraTier::Max, "L7")]
    fn default_pir_follows_tier(#[case] tier: CameraTier, #[case] label: &str) {
        assert_eq!(
            SettingValue::Text(label.into()),
            command_spec(tier).default_value(FieldId::PirSensitivity)
        );
    }
}
