use std::collections::BTreeMap;

use serde::Serialize;
use serde_with::{DisplayFromStr, serde_as};
use strum_macros::Display;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::codec::RESERVED;

use super::field::{FieldId, FieldKind};
use super::snapshot::{SettingValue, SettingsSnapshot};
use super::spec::{CommandSpec, command_spec};
use super::tier::CameraTier;
use super::time_value::{TimeOfDay, TimeRange, TimeSpan};
use crate::codec::{
    CaptureMode, Choice, FlashLed, FtpMode, HourSystem, ImageResolution, ImageSize, NightMode,
    PirSensitivity, SmsControl, VideoResolution, nearest_allowed,
};
use crate::profile::PhoneNumber;

/// Longest video the camera can still transmit over the message channel.
pub const MAX_SENDABLE_VIDEO_SECONDS: i64 = 10;
/// Durations the firmware accepts for videos that are recorded but not sent.
pub const LONG_VIDEO_DURATIONS: [i64; 6] = [15, 20, 30, 40, 50, 59];

const MAX_COUNT_RANGE: (i64, i64) = (1, 99);
const BURST_RANGE: (i64, i64) = (1, 5);
const VIDEO_DURATION_RANGE: (i64, i64) = (1, 59);

/// Cross-field rule that adjusted a value.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Display, Serialize)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum CrossFieldRule {
    /// Video-only capture cannot send images.
    CaptureModeClearsSendImage,
    /// Image-only capture cannot send videos.
    CaptureModeClearsSendVideo,
    /// Enabling a send flag promotes capture to images and video.
    SendFlagPromotesCaptureMode,
    /// Long videos snap to a firmware-supported duration.
    LongVideoDuration,
    /// Long videos cannot be recorded in full HD.
    LongVideoResolution,
    /// Videos over ten seconds are never sent.
    DurationDisablesSendVideo,
}

/// A settings value that was outside its domain and has been recovered.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum ValidationError {
    #[error("`{field}` is not supported by {tier} cameras")]
    UnsupportedField { field: FieldId, tier: CameraTier },
    #[error("`{value}` is not a valid value for `{field}`")]
    InvalidValue { field: FieldId, value: String },
    #[error("`{value}` is not available for `{field}` on {tier} cameras")]
    NotAllowedForTier {
        field: FieldId,
        value: String,
        tier: CameraTier,
    },
    #[error("`{field}` value {value} is outside {min}..={max}")]
    OutOfRange {
        field: FieldId,
        value: i64,
        min: i64,
        max: i64,
    },
    #[error("`{field}` adjusted by rule {rule}")]
    Adjusted { field: FieldId, rule: CrossFieldRule },
}

/// One recovered validation problem and the value substituted for it.
#[serde_as]
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Correction {
    field: FieldId,
    rejected: Option<SettingValue>,
    substituted: Option<SettingValue>,
    #[serde_as(as = "DisplayFromStr")]
    reason: ValidationError,
}

impl Correction {
    #[must_use]
    pub fn field(&self) -> FieldId {
        self.field
    }

    /// Value found in the snapshot, if any.
    #[must_use]
    pub fn rejected(&self) -> Option<&SettingValue> {
        self.rejected.as_ref()
    }

    /// Value used instead; `None` when the field was dropped.
    #[must_use]
    pub fn substituted(&self) -> Option<&SettingValue> {
        self.substituted.as_ref()
    }

    #[must_use]
    pub fn reason(&self) -> &ValidationError {
        &self.reason
    }
}

/// Complete, tier-checked settings ready for encoding.
///
/// Only [`Validator::normalize`] builds one, so every field the tier allows
/// is present with an in-domain value.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ValidatedSnapshot {
    tier: CameraTier,
    values: BTreeMap<FieldId, SettingValue>,
}

impl ValidatedSnapshot {
    #[must_use]
    pub fn tier(&self) -> CameraTier {
        self.tier
    }

    /// Whether the tier carries this field at all.
    #[must_use]
    pub fn is_allowed(&self, field: FieldId) -> bool {
        self.values.contains_key(&field)
    }

    #[must_use]
    pub fn get(&self, field: FieldId) -> Option<&SettingValue> {
        self.values.get(&field)
    }

    /// Switch state; disallowed fields read as off.
    #[must_use]
    pub fn flag(&self, field: FieldId) -> bool {
        self.get(field)
            .and_then(SettingValue::as_flag)
            .unwrap_or(false)
    }

    #[must_use]
    pub fn integer(&self, field: FieldId) -> i64 {
        self.get(field)
            .and_then(SettingValue::as_integer)
            .unwrap_or_else(|| self.spec().default_value(field).as_integer().unwrap_or(0))
    }

    /// Table value for a choice field, through the table fallback.
    #[must_use]
    pub fn choice<T: Choice>(&self, field: FieldId) -> T {
        self.get(field)
            .and_then(SettingValue::as_text)
            .map(T::from_label)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn text(&self, field: FieldId) -> &str {
        self.get(field)
            .and_then(SettingValue::as_text)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn time(&self, field: FieldId) -> TimeOfDay {
        self.get(field)
            .and_then(SettingValue::as_time)
            .unwrap_or(TimeOfDay::MIDNIGHT)
    }

    #[must_use]
    pub fn span(&self, field: FieldId) -> TimeSpan {
        self.get(field)
            .and_then(SettingValue::as_span)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn range(&self, field: FieldId) -> TimeRange {
        self.get(field)
            .and_then(SettingValue::as_range)
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldId, &SettingValue)> {
        self.values.iter().map(|(field, value)| (*field, value))
    }

    /// Converts back into a plain snapshot, e.g. to re-validate.
    #[must_use]
    pub fn to_snapshot(&self) -> SettingsSnapshot {
        self.values
            .iter()
            .map(|(field, value)| (*field, value.clone()))
            .collect()
    }

    fn spec(&self) -> &'static CommandSpec {
        command_spec(self.tier)
    }
}

/// Result of normalising a snapshot.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Validated {
    pub snapshot: ValidatedSnapshot,
    pub corrections: Vec<Correction>,
}

/// Tier-aware normaliser for raw settings snapshots.
#[derive(Debug, Clone, Copy)]
pub struct Validator {
    spec: &'static CommandSpec,
}

impl Validator {
    #[must_use]
    pub fn new(tier: CameraTier) -> Self {
        Self {
            spec: command_spec(tier),
        }
    }

    /// Normalises a snapshot for the tier, recovering every problem.
    ///
    /// `last_edit` names the field the user changed most recently; it breaks
    /// ties between a capture mode and a conflicting send flag.
    ///
    /// ```
    /// use trailcam::{CameraTier, FieldId, SettingValue, SettingsSnapshot, Validator};
    ///
    /// let snapshot = SettingsSnapshot::from_form([("videoResolution", "FHD-1920x1080")])?;
    /// let validated = Validator::new(CameraTier::Base).normalize(&snapshot, None);
    /// assert_eq!(
    ///     Some(&SettingValue::Text("HD-1280x720".into())),
    ///     validated.snapshot.get(FieldId::VideoResolution),
    /// );
    /// assert_eq!(1, validated.corrections.len());
    /// # Ok::<(), trailcam::SettingsError>(())
    /// ```
    #[instrument(skip(self, snapshot), level = "debug", fields(tier = %self.spec.tier(), fields = snapshot.len()))]
    #[must_use]
    pub fn normalize(&self, snapshot: &SettingsSnapshot, last_edit: Option<FieldId>) -> Validated {
        let mut pass = Pass {
            spec: self.spec,
            values: BTreeMap::new(),
            corrections: Vec::new(),
        };

        for (field, value) in snapshot.iter() {
            if !self.spec.allows(field) {
                pass.record(
                    field,
                    Some(value.clone()),
                    None,
                    ValidationError::UnsupportedField {
                        field,
                        tier: self.spec.tier(),
                    },
                );
            }
        }

        for &field in self.spec.fields() {
            let value = snapshot
                .get(field)
                .cloned()
                .unwrap_or_else(|| self.spec.default_value(field));
            let checked = pass.check_field(field, value);
            pass.values.insert(field, checked);
        }

        pass.clamp_max_count();
        pass.reconcile_capture_mode(last_edit);
        pass.apply_long_video();
        pass.apply_duration_rule();

        debug!(corrections = pass.corrections.len(), "normalised settings");
        Validated {
            snapshot: ValidatedSnapshot {
                tier: self.spec.tier(),
                values: pass.values,
            },
            corrections: pass.corrections,
        }
    }
}

struct Pass {
    spec: &'static CommandSpec,
    values: BTreeMap<FieldId, SettingValue>,
    corrections: Vec<Correction>,
}

impl Pass {
    fn record(
        &mut self,
        field: FieldId,
        rejected: Option<SettingValue>,
        substituted: Option<SettingValue>,
        reason: ValidationError,
    ) {
        debug!(%field, %reason, "recovered settings value");
        self.corrections.push(Correction {
            field,
            rejected,
            substituted,
            reason,
        });
    }

    fn invalid(&mut self, field: FieldId, value: SettingValue) -> SettingValue {
        let substituted = self.spec.default_value(field);
        self.record(
            field,
            Some(value.clone()),
            Some(substituted.clone()),
            ValidationError::InvalidValue {
                field,
                value: value.to_string(),
            },
        );
        substituted
    }

    fn check_field(&mut self, field: FieldId, value: SettingValue) -> SettingValue {
        if value
            .as_text()
            .is_some_and(|text| text.contains(RESERVED))
        {
            return self.invalid(field, value);
        }

        match field.kind() {
            FieldKind::Flag => match value {
                SettingValue::Flag(_) => value,
                other => self.invalid(field, other),
            },
            FieldKind::Integer => self.check_integer(field, value),
            FieldKind::Choice => self.check_choice(field, value),
            FieldKind::Time => match value {
                SettingValue::Time(_) => value,
                other => self.invalid(field, other),
            },
            FieldKind::Span => match value {
                SettingValue::Span(_) => value,
                other => self.invalid(field, other),
            },
            FieldKind::Range => match value {
                SettingValue::Range(_) => value,
                other => self.invalid(field, other),
            },
            FieldKind::Phone => {
                let valid = value.as_text().is_some_and(|text| {
                    text.is_empty() || text.parse::<PhoneNumber>().is_ok()
                });
                if valid {
                    value
                } else {
                    self.invalid(field, value)
                }
            }
            FieldKind::Email => {
                let valid = value
                    .as_text()
                    .is_some_and(|text| text.is_empty() || is_valid_email(text));
                if valid {
                    value
                } else {
                    self.invalid(field, value)
                }
            }
        }
    }

    fn check_integer(&mut self, field: FieldId, value: SettingValue) -> SettingValue {
        let Some(number) = value.as_integer() else {
            return self.invalid(field, value);
        };
        let bounds = match field {
            FieldId::BurstImages => BURST_RANGE,
            FieldId::VideoDuration => VIDEO_DURATION_RANGE,
            // Clamped after the switch is known.
            _ => return value,
        };
        self.clamp(field, number, bounds)
    }

    fn clamp(&mut self, field: FieldId, number: i64, (min, max): (i64, i64)) -> SettingValue {
        let clamped = number.clamp(min, max);
        if clamped != number {
            self.record(
                field,
                Some(SettingValue::Integer(number)),
                Some(SettingValue::Integer(clamped)),
                ValidationError::OutOfRange {
                    field,
                    value: number,
                    min,
                    max,
                },
            );
        }
        SettingValue::Integer(clamped)
    }

    fn check_choice(&mut self, field: FieldId, value: SettingValue) -> SettingValue {
        let Some(label) = value.as_text() else {
            return self.invalid(field, value);
        };
        let spec = self.spec;
        let resolved = match field {
            FieldId::ImageResolution => self.restrict(
                field,
                label,
                nearest_allowed::<ImageResolution>,
                spec.image_resolutions(),
            ),
            FieldId::VideoResolution => self.restrict(
                field,
                label,
                nearest_allowed::<VideoResolution>,
                spec.video_resolutions(),
            ),
            FieldId::PirSensitivity => self.restrict(
                field,
                label,
                |requested: PirSensitivity, _allowed: &[PirSensitivity]| requested.to_named(),
                spec.pir_levels(),
            ),
            FieldId::NightMode => self.restrict(
                field,
                label,
                |_requested: NightMode, _allowed: &[NightMode]| NightMode::Balance,
                spec.night_modes(),
            ),
            FieldId::SmsControl => canonical::<SmsControl>(label),
            FieldId::ImageSize => canonical::<ImageSize>(label),
            FieldId::FtpMode => canonical::<FtpMode>(label),
            FieldId::CaptureMode => canonical::<CaptureMode>(label),
            FieldId::FlashLed => canonical::<FlashLed>(label),
            FieldId::HourSystem => canonical::<HourSystem>(label),
            _ => None,
        };

        match resolved {
            Some(canonical) => SettingValue::Text(canonical),
            None => self.invalid(field, value),
        }
    }

    /// Parses a label strictly and steps it into the tier's allowed set.
    fn restrict<T, F>(
        &mut self,
        field: FieldId,
        label: &str,
        substitute: F,
        allowed: &[T],
    ) -> Option<String>
    where
        T: Choice,
        F: FnOnce(T, &[T]) -> T,
    {
        let requested = label.trim().parse::<T>().ok()?;
        if allowed.contains(&requested) {
            return Some(requested.to_string());
        }

        let substituted = substitute(requested, allowed);
        self.record(
            field,
            Some(SettingValue::Text(label.to_string())),
            Some(SettingValue::Text(substituted.to_string())),
            ValidationError::NotAllowedForTier {
                field,
                value: requested.to_string(),
                tier: self.spec.tier(),
            },
        );
        Some(substituted.to_string())
    }

    fn clamp_max_count(&mut self) {
        if !self.flag(FieldId::MaxCountSwitch) {
            return;
        }
        let Some(number) = self
            .values
            .get(&FieldId::MaxCount)
            .and_then(SettingValue::as_integer)
        else {
            return;
        };
        let clamped = self.clamp(FieldId::MaxCount, number, MAX_COUNT_RANGE);
        self.values.insert(FieldId::MaxCount, clamped);
    }

    fn reconcile_capture_mode(&mut self, last_edit: Option<FieldId>) {
        let mode = self.capture_mode();
        let send_image = self.flag(FieldId::SendImageSwitch);
        let send_video = self.flag(FieldId::SendVideoSwitch);

        if mode == CaptureMode::Video && send_image {
            if last_edit == Some(FieldId::SendImageSwitch) {
                self.promote_capture_mode(mode);
            } else {
                self.clear_flag(
                    FieldId::SendImageSwitch,
                    CrossFieldRule::CaptureModeClearsSendImage,
                );
            }
        } else if mode == CaptureMode::Image && send_video {
            if last_edit == Some(FieldId::SendVideoSwitch) {
                self.promote_capture_mode(mode);
            } else {
                self.clear_flag(
                    FieldId::SendVideoSwitch,
                    CrossFieldRule::CaptureModeClearsSendVideo,
                );
            }
        }
    }

    fn promote_capture_mode(&mut self, from: CaptureMode) {
        let promoted = SettingValue::Text(CaptureMode::ImageVideo.to_string());
        self.values.insert(FieldId::CaptureMode, promoted.clone());
        self.record(
            FieldId::CaptureMode,
            Some(SettingValue::Text(from.to_string())),
            Some(promoted),
            ValidationError::Adjusted {
                field: FieldId::CaptureMode,
                rule: CrossFieldRule::SendFlagPromotesCaptureMode,
            },
        );
    }

    fn apply_long_video(&mut self) {
        let duration = self.integer(FieldId::VideoDuration);
        if duration <= MAX_SENDABLE_VIDEO_SECONDS {
            return;
        }

        let snapped = nearest_long_duration(duration);
        if snapped != duration {
            self.values
                .insert(FieldId::VideoDuration, SettingValue::Integer(snapped));
            self.record(
                FieldId::VideoDuration,
                Some(SettingValue::Integer(duration)),
                Some(SettingValue::Integer(snapped)),
                ValidationError::Adjusted {
                    field: FieldId::VideoDuration,
                    rule: CrossFieldRule::LongVideoDuration,
                },
            );
        }

        let resolution = self.choice::<VideoResolution>(FieldId::VideoResolution);
        if resolution == VideoResolution::Fhd {
            let downgraded = SettingValue::Text(VideoResolution::Hd.to_string());
            self.values
                .insert(FieldId::VideoResolution, downgraded.clone());
            self.record(
                FieldId::VideoResolution,
                Some(SettingValue::Text(resolution.to_string())),
                Some(downgraded),
                ValidationError::Adjusted {
                    field: FieldId::VideoResolution,
                    rule: CrossFieldRule::LongVideoResolution,
                },
            );
        }
    }

    fn apply_duration_rule(&mut self) {
        if self.integer(FieldId::VideoDuration) > MAX_SENDABLE_VIDEO_SECONDS
            && self.flag(FieldId::SendVideoSwitch)
        {
            self.clear_flag(
                FieldId::SendVideoSwitch,
                CrossFieldRule::DurationDisablesSendVideo,
            );
        }
    }

    fn clear_flag(&mut self, field: FieldId, rule: CrossFieldRule) {
        self.values.insert(field, SettingValue::Flag(false));
        self.record(
            field,
            Some(SettingValue::Flag(true)),
            Some(SettingValue::Flag(false)),
            ValidationError::Adjusted { field, rule },
        );
    }

    fn capture_mode(&self) -> CaptureMode {
        self.choice(FieldId::CaptureMode)
    }

    fn choice<T: Choice>(&self, field: FieldId) -> T {
        self.values
            .get(&field)
            .and_then(SettingValue::as_text)
            .map(T::from_label)
            .unwrap_or_default()
    }

    fn flag(&self, field: FieldId) -> bool {
        self.values
            .get(&field)
            .and_then(SettingValue::as_flag)
            .unwrap_or(false)
    }

    fn integer(&self, field: FieldId) -> i64 {
        self.values
            .get(&field)
            .and_then(SettingValue::as_integer)
            .unwrap_or(0)
    }
}

fn canonical<T: Choice>(label: &str) -> Option<String> {
    label.trim().parse::<T>().ok().map(|value| value.to_string())
}

/// Closest supported long-video duration; ties go to the shorter one.
fn nearest_long_duration(duration: i64) -> i64 {
    LONG_VIDEO_DURATIONS
        .into_iter()
        .min_by_key(|candidate| (candidate - duration).abs())
        .unwrap_or(duration)
}

fn is_valid_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && !value.contains(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn normalize(tier: CameraTier, pairs: &[(&str, &str)], last_edit: Option<FieldId>) -> Validated {
        let snapshot = SettingsSnapshot::from_form(pairs.iter().copied())
            .expect("test form should only use known keys");
        Validator::new(tier).normalize(&snapshot, last_edit)
    }

    fn reasons(validated: &Validated) -> Vec<ValidationError> {
        validated
            .corrections
            .iter()
            .map(|correction| correction.reason().clone())
            .collect()
    }

    #[rstest]
    #[case(CameraTier::Base)]
    #[case(CameraTier::Pro)]
    #[case(CameraTier::Max)]
    fn tier_defaults_need_no_corrections(#[case] tier: CameraTier) {
        let validated = normalize(tier, &[], None);
        assert_eq!(Vec::<Correction>::new(), validated.corrections);
        assert_eq!(
            command_spec(tier).fields().len(),
            validated.snapshot.iter().count()
        );
    }

    #[test]
    fn disallowed_fields_are_dropped_with_a_correction() {
        let validated = normalize(CameraTier::Base, &[("maxCount", "40")], None);
        assert!(!validated.snapshot.is_allowed(FieldId::MaxCount));
        assert_eq!(
            vec![ValidationError::UnsupportedField {
                field: FieldId::MaxCount,
                tier: CameraTier::Base,
            }],
            reasons(&validated)
        );
    }

    #[test]
    fn base_full_hd_steps_down_to_hd() {
        let validated = normalize(
            CameraTier::Base,
            &[("videoResolution", "FHD-1920x1080")],
            None,
        );
        assert_eq!(
            VideoResolution::Hd,
            validated
                .snapshot
                .choice::<VideoResolution>(FieldId::VideoResolution)
        );
        assert_matches!(
            reasons(&validated).as_slice(),
            [ValidationError::NotAllowedForTier {
                field: FieldId::VideoResolution,
                ..
            }]
        );
    }

    #[rstest]
    #[case("32M", "12MP")]
    #[case("24M", "12MP")]
    #[case("8MP", "8MP")]
    fn base_image_resolution_steps_to_nearest_allowed(#[case] requested: &str, #[case] expected: &str) {
        let validated = normalize(CameraTier::Base, &[("imageResolution", requested)], None);
        assert_eq!(expected, validated.snapshot.text(FieldId::ImageResolution));
    }

    #[rstest]
    #[case("L9", "High")]
    #[case("L6", "Medium")]
    #[case("L1", "Low")]
    #[case("Niedrig", "Low")]
    fn base_pir_collapses_to_named_levels(#[case] requested: &str, #[case] expected: &str) {
        let validated = normalize(CameraTier::Base, &[("pirSensitivity", requested)], None);
        assert_eq!(expected, validated.snapshot.text(FieldId::PirSensitivity));
    }

    #[test]
    fn base_quality_night_mode_becomes_balance() {
        let validated = normalize(CameraTier::Base, &[("nightMode", "Qualität")], None);
        assert_eq!("Balance", validated.snapshot.text(FieldId::NightMode));
    }

    #[test]
    fn unknown_choice_label_uses_tier_default() {
        let validated = normalize(CameraTier::Pro, &[("captureMode", "Hologram")], None);
        assert_eq!("Image+Video", validated.snapshot.text(FieldId::CaptureMode));
        assert_matches!(
            reasons(&validated).as_slice(),
            [ValidationError::InvalidValue {
                field: FieldId::CaptureMode,
                ..
            }]
        );
    }

    #[rstest]
    #[case("0", 1)]
    #[case("150", 99)]
    #[case("42", 42)]
    fn max_count_clamps_when_switch_is_on(#[case] raw: &str, #[case] expected: i64) {
        let validated = normalize(
            CameraTier::Pro,
            &[("maxCountSwitch", "true"), ("maxCount", raw)],
            None,
        );
        assert_eq!(expected, validated.snapshot.integer(FieldId::MaxCount));
    }

    #[test]
    fn max_count_is_left_alone_when_switch_is_off() {
        let validated = normalize(
            CameraTier::Pro,
            &[("maxCountSwitch", "false"), ("maxCount", "500")],
            None,
        );
        assert_eq!(500, validated.snapshot.integer(FieldId::MaxCount));
        assert!(validated.corrections.is_empty());
    }

    #[test]
    fn invalid_status_time_falls_back_to_eight_am() {
        let validated = normalize(CameraTier::Base, &[("statusTime", "25:99")], None);
        assert_eq!("08:00", validated.snapshot.time(FieldId::StatusTime).to_string());
    }

    #[rstest]
    #[case("+491701234567", "+491701234567")]
    #[case("12345", "")]
    #[case("+49 170 1234567", "")]
    #[case("+4917012*4567", "")]
    fn recipient_phones_must_match_pattern(#[case] raw: &str, #[case] expected: &str) {
        let validated = normalize(CameraTier::Base, &[("phone1", raw)], None);
        assert_eq!(expected, validated.snapshot.text(FieldId::Phone1));
    }

    #[rstest]
    #[case("owner@example.org", "owner@example.org")]
    #[case("no-at-sign", "")]
    #[case("a@b@c", "")]
    #[case("x#y@z", "")]
    #[case("a*b@c.org", "")]
    fn recipient_emails_must_be_well_formed(#[case] raw: &str, #[case] expected: &str) {
        let validated = normalize(CameraTier::Base, &[("email1", raw)], None);
        assert_eq!(expected, validated.snapshot.text(FieldId::Email1));
    }

    #[test]
    fn video_only_clears_send_image() {
        let validated = normalize(
            CameraTier::Pro,
            &[("captureMode", "Video"), ("sendImageSwitch", "true")],
            Some(FieldId::CaptureMode),
        );
        assert!(!validated.snapshot.flag(FieldId::SendImageSwitch));
        assert_eq!("Video", validated.snapshot.text(FieldId::CaptureMode));
    }

    #[test]
    fn image_only_clears_send_video() {
        let validated = normalize(
            CameraTier::Max,
            &[("captureMode", "Image"), ("sendVideoSwitch", "true")],
            None,
        );
        assert!(!validated.snapshot.flag(FieldId::SendVideoSwitch));
    }

    #[test]
    fn editing_a_send_flag_promotes_capture_mode() {
        let validated = normalize(
            CameraTier::Max,
            &[("captureMode", "Image"), ("sendVideoSwitch", "true")],
            Some(FieldId::SendVideoSwitch),
        );
        assert_eq!("Image+Video", validated.snapshot.text(FieldId::CaptureMode));
        assert!(validated.snapshot.flag(FieldId::SendVideoSwitch));
    }

    #[rstest]
    #[case("11", 15)]
    #[case("25", 20)]
    #[case("33", 30)]
    #[case("55", 59)]
    #[case("40", 40)]
    fn long_videos_snap_to_supported_durations(#[case] raw: &str, #[case] expected: i64) {
        let validated = normalize(CameraTier::Pro, &[("videoDuration", raw)], None);
        assert_eq!(expected, validated.snapshot.integer(FieldId::VideoDuration));
    }

    #[test]
    fn long_video_downgrades_full_hd_and_disables_sending() {
        let validated = normalize(
            CameraTier::Max,
            &[
                ("videoDuration", "30"),
                ("videoResolution", "FHD-1920x1080"),
                ("sendVideoSwitch", "true"),
            ],
            Some(FieldId::SendVideoSwitch),
        );
        assert_eq!("HD-1280x720", validated.snapshot.text(FieldId::VideoResolution));
        assert!(!validated.snapshot.flag(FieldId::SendVideoSwitch));
        assert_eq!(
            vec![
                ValidationError::Adjusted {
                    field: FieldId::VideoResolution,
                    rule: CrossFieldRule::LongVideoResolution,
                },
                ValidationError::Adjusted {
                    field: FieldId::SendVideoSwitch,
                    rule: CrossFieldRule::DurationDisablesSendVideo,
                },
            ],
            reasons(&validated)
        );
    }

    #[test]
    fn framing_characters_are_rejected_everywhere() {
        let validated = normalize(CameraTier::Base, &[("smsControl", "Sofort#1")], None);
        assert_eq!("Instant", validated.snapshot.text(FieldId::SmsControl));
        assert_eq!(1, validated.corrections.len());
    }

    #[rstest]
    #[case(CameraTier::Base)]
    #[case(CameraTier::Max)]
    fn normalising_twice_is_stable(#[case] tier: CameraTier) {
        let first = normalize(
            tier,
            &[
                ("videoDuration", "27"),
                ("captureMode", "Video"),
                ("sendImageSwitch", "on"),
                ("pirSensitivity", "L8"),
            ],
            None,
        );
        let second = Validator::new(tier).normalize(&first.snapshot.to_snapshot(), None);
        assert_eq!(first.snapshot, second.snapshot);
        assert!(second.corrections.is_empty());
    }
}
