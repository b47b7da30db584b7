use serde_with::{DeserializeFromStr, SerializeDisplay};
use strum_macros::{Display, EnumIter, EnumString};

/// Enumerated identifier for every camera setting the encoder understands.
///
/// Identifiers parse from the camelCase form keys used by the settings form,
/// ignoring ASCII case.
///
/// ```
/// use trailcam::FieldId;
///
/// assert_eq!(FieldId::VideoDuration, "videoDuration".parse()?);
/// assert_eq!("sendVideoSwitch", FieldId::SendVideoSwitch.to_string());
/// # Ok::<(), strum::ParseError>(())
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    Eq,
    PartialEq,
    Hash,
    Ord,
    PartialOrd,
    Display,
    EnumIter,
    EnumString,
    SerializeDisplay,
    DeserializeFromStr,
)]
#[strum(serialize_all = "camelCase", ascii_case_insensitive)]
pub enum FieldId {
    SmsControl,
    ImageSize,
    MaxCountSwitch,
    MaxCount,
    StatusReportSwitch,
    StatusTime,
    MmsControlSwitch,
    FtpMode,
    SendImageSwitch,
    SendVideoSwitch,
    CaptureMode,
    NightMode,
    ImageResolution,
    VideoResolution,
    PirSensitivity,
    FlashLed,
    VideoDuration,
    HourSystem,
    BurstImages,
    MotionSensorSwitch,
    SdCycleSwitch,
    Timer1Switch,
    Timer1,
    Timer2Switch,
    Timer2,
    DelaySwitch,
    DelayTime,
    TimelapseSwitch,
    TimelapseTime,
    Phone1,
    Phone2,
    Phone3,
    Phone4,
    Email1,
    Email2,
    Email3,
    Email4,
}

/// Value shape expected for a field.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum FieldKind {
    /// On/off switch.
    Flag,
    /// Whole number, parsed from leading digits.
    Integer,
    /// One label from a code table.
    Choice,
    /// Time of day (`HH:MM`).
    Time,
    /// Duration (`HH:MM:SS` or seconds).
    Span,
    /// Time-of-day window (`HH:MM-HH:MM`).
    Range,
    /// Phone number recipient.
    Phone,
    /// Email address recipient.
    Email,
}

/// Form section a field belongs to.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum FieldCategory {
    General,
    Capture,
    Timer,
    Recipients,
}

impl FieldId {
    /// Returns the value shape accepted for this field.
    #[must_use]
    pub fn kind(self) -> FieldKind {
        match self {
            Self::MaxCountSwitch
            | Self::StatusReportSwitch
            | Self::MmsControlSwitch
            | Self::SendImageSwitch
            | Self::SendVideoSwitch
            | Self::MotionSensorSwitch
            | Self::SdCycleSwitch
            | Self::Timer1Switch
            | Self::Timer2Switch
            | Self::DelaySwitch
            | Self::TimelapseSwitch => FieldKind::Flag,
            Self::MaxCount | Self::VideoDuration | Self::BurstImages => FieldKind::Integer,
            Self::SmsControl
            | Self::ImageSize
            | Self::FtpMode
            | Self::CaptureMode
            | Self::NightMode
            | Self::ImageResolution
            | Self::VideoResolution
            | Self::PirSensitivity
            | Self::FlashLed
            | Self::HourSystem => FieldKind::Choice,
            Self::StatusTime => FieldKind::Time,
            Self::DelayTime | Self::TimelapseTime => FieldKind::Span,
            Self::Timer1 | Self::Timer2 => FieldKind::Range,
            Self::Phone1 | Self::Phone2 | Self::Phone3 | Self::Phone4 => FieldKind::Phone,
            Self::Email1 | Self::Email2 | Self::Email3 | Self::Email4 => FieldKind::Email,
        }
    }

    /// Returns the form section that owns this field.
    #[must_use]
    pub fn category(self) -> FieldCategory {
        match self {
            Self::SmsControl
            | Self::ImageSize
            | Self::MaxCountSwitch
            | Self::MaxCount
            | Self::StatusReportSwitch
            | Self::StatusTime
            | Self::MmsControlSwitch
            | Self::FtpMode => FieldCategory::General,
            Self::Timer1Switch
            | Self::Timer1
            | Self::Timer2Switch
            | Self::Timer2
            | Self::DelaySwitch
            | Self::DelayTime
            | Self::TimelapseSwitch
            | Self::TimelapseTime => FieldCategory::Timer,
            Self::Phone1
            | Self::Phone2
            | Self::Phone3
            | Self::Phone4
            | Self::Email1
            | Self::Email2
            | Self::Email3
            | Self::Email4 => FieldCategory::Recipients,
            _ => FieldCategory::Capture,
        }
    }

    /// Phone recipient field for a one-based slot, if the slot exists.
    #[must_use]
    pub fn phone_slot(slot: usize) -> Option<Self> {
        match slot {
            1 => Some(Self::Phone1),
            2 => Some(Self::Phone2),
            3 => Some(Self::Phone3),
            4 => Some(Self::Phone4),
            _ => None,
        }
    }

    /// Email recipient field for a one-based slot, if the slot exists.
    #[must_use]
    pub fn email_slot(slot: usize) -> Option<Self> {
        match slot {
            1 => Some(Self::Email1),
            2 => Some(Self::Email2),
            3 => Some(Self::Email3),
            4 => Some(Self::Email4),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use strum::IntoEnumIterator;

    use super::*;

    #[rstest]
    #[case("smsControl", FieldId::SmsControl)]
    #[case("timer1Switch", FieldId::Timer1Switch)]
    #[case("PIRSENSITIVITY", FieldId::PirSensitivity)]
    #[case("email4", FieldId::Email4)]
    fn field_parses_form_keys(#[case] key: &str, #[case] expected: FieldId) {
        assert_eq!(Ok(expected), key.parse::<FieldId>());
    }

    #[test]
    fn every_field_round_trips_through_its_form_key() {
        for field in FieldId::iter() {
            assert_eq!(Ok(field), field.to_string().parse::<FieldId>());
        }
    }

    #[test]
    fn recipient_slots_stop_after_four() {
        assert_eq!(Some(FieldId::Phone4), FieldId::phone_slot(4));
        assert_eq!(None, FieldId::phone_slot(5));
        assert_eq!(None, FieldId::email_slot(0));
    }
}
