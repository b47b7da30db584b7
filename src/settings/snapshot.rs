use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

use serde_with::SerializeDisplay;

use super::SettingsError;
use super::field::{FieldId, FieldKind};
use super::time_value::{TimeOfDay, TimeRange, TimeSpan};

/// One typed setting value.
#[derive(Debug, Clone, Eq, PartialEq, SerializeDisplay)]
pub enum SettingValue {
    Flag(bool),
    Integer(i64),
    Text(String),
    Time(TimeOfDay),
    Span(TimeSpan),
    Range(TimeRange),
}

impl SettingValue {
    /// Interprets a raw form value according to the field's kind.
    ///
    /// Malformed input is kept as [`SettingValue::Text`] so validation can
    /// substitute the tier default and record a correction.
    ///
    /// ```
    /// use trailcam::{FieldId, SettingValue};
    ///
    /// assert_eq!(SettingValue::Integer(15), SettingValue::parse(FieldId::VideoDuration, "15s"));
    /// assert_eq!(SettingValue::Flag(true), SettingValue::parse(FieldId::DelaySwitch, "on"));
    /// ```
    #[must_use]
    pub fn parse(field: FieldId, raw: &str) -> Self {
        let trimmed = raw.trim();
        let text = || Self::Text(trimmed.to_string());
        match field.kind() {
            FieldKind::Flag => parse_flag(trimmed).map_or_else(text, Self::Flag),
            FieldKind::Integer => leading_integer(trimmed).map_or_else(text, Self::Integer),
            FieldKind::Time => trimmed.parse().map_or_else(|_error| text(), Self::Time),
            FieldKind::Span => trimmed.parse().map_or_else(|_error| text(), Self::Span),
            FieldKind::Range => trimmed.parse().map_or_else(|_error| text(), Self::Range),
            FieldKind::Choice | FieldKind::Phone | FieldKind::Email => text(),
        }
    }

    #[must_use]
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_time(&self) -> Option<TimeOfDay> {
        match self {
            Self::Time(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_span(&self) -> Option<TimeSpan> {
        match self {
            Self::Span(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_range(&self) -> Option<TimeRange> {
        match self {
            Self::Range(value) => Some(*value),
            _ => None,
        }
    }
}

impl Display for SettingValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(value) => write!(f, "{value}"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Text(value) => write!(f, "{value}"),
            Self::Time(value) => write!(f, "{value}"),
            Self::Span(value) => write!(f, "{value}"),
            Self::Range(value) => write!(f, "{value}"),
        }
    }
}

/// Immutable settings captured from the form for one camera.
///
/// Absent fields fall back to the tier default during validation.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct SettingsSnapshot {
    values: BTreeMap<FieldId, SettingValue>,
}

impl SettingsSnapshot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a snapshot from raw `name=value` form pairs.
    ///
    /// Split timer bounds (`timer1Start`, `timer1End`, ...) merge into the
    /// matching window field, with a missing bound reading as midnight.
    ///
    /// # Errors
    ///
    /// Returns an error when a key does not name a known field.
    ///
    /// ```
    /// use trailcam::{FieldId, SettingValue, SettingsSnapshot};
    ///
    /// let snapshot = SettingsSnapshot::from_form([
    ///     ("timer1Switch", "true"),
    ///     ("timer1Start", "22:00"),
    ///     ("timer1End", "06:00"),
    /// ])?;
    /// assert_eq!(
    ///     "22:00-06:00",
    ///     snapshot.get(FieldId::Timer1).map(SettingValue::to_string).unwrap_or_default(),
    /// );
    /// # Ok::<(), trailcam::SettingsError>(())
    /// ```
    pub fn from_form<I, K, V>(pairs: I) -> Result<Self, SettingsError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut values = BTreeMap::new();
        let mut bounds: BTreeMap<FieldId, TimerBounds> = BTreeMap::new();

        for (key, value) in pairs {
            let key = key.as_ref().trim();
            let value = value.as_ref();
            if let Some((field, bound)) = timer_bound_key(key) {
                let entry = bounds.entry(field).or_default();
                match bound {
                    Bound::Start => entry.start = Some(value.trim().to_string()),
                    Bound::End => entry.end = Some(value.trim().to_string()),
                }
                continue;
            }

            let field = key
                .parse::<FieldId>()
                .map_err(|_error| SettingsError::UnknownField {
                    key: key.to_string(),
                })?;
            values.insert(field, SettingValue::parse(field, value));
        }

        for (field, bound) in bounds {
            let base = values
                .get(&field)
                .and_then(SettingValue::as_range)
                .unwrap_or_default();
            values.insert(field, bound.merge_into(base));
        }

        Ok(Self { values })
    }

    /// Returns a copy with one field replaced.
    #[must_use]
    pub fn with(mut self, field: FieldId, value: SettingValue) -> Self {
        self.values.insert(field, value);
        self
    }

    #[must_use]
    pub fn get(&self, field: FieldId) -> Option<&SettingValue> {
        self.values.get(&field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldId, &SettingValue)> {
        self.values.iter().map(|(field, value)| (*field, value))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Renders the snapshot back into form pairs.
    #[must_use]
    pub fn to_form(&self) -> BTreeMap<String, String> {
        self.values
            .iter()
            .map(|(field, value)| (field.to_string(), value.to_string()))
            .collect()
    }
}

impl FromIterator<(FieldId, SettingValue)> for SettingsSnapshot {
    fn from_iter<T: IntoIterator<Item = (FieldId, SettingValue)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Bound {
    Start,
    End,
}

#[derive(Debug, Default)]
struct TimerBounds {
    start: Option<String>,
    end: Option<String>,
}

impl TimerBounds {
    fn merge_into(self, base: TimeRange) -> SettingValue {
        let start = match self.start.as_deref().map(str::parse::<TimeOfDay>) {
            None => base.start(),
            Some(Ok(start)) => start,
            Some(Err(_error)) => return self.into_text(),
        };
        let end = match self.end.as_deref().map(str::parse::<TimeOfDay>) {
            None => base.end(),
            Some(Ok(end)) => end,
            Some(Err(_error)) => return self.into_text(),
        };
        SettingValue::Range(TimeRange::new(start, end))
    }

    fn into_text(self) -> SettingValue {
        SettingValue::Text(format!(
            "{}-{}",
            self.start.unwrap_or_default(),
            self.end.unwrap_or_default()
        ))
    }
}

fn timer_bound_key(key: &str) -> Option<(FieldId, Bound)> {
    let lowered = key.to_ascii_lowercase();
    match lowered.as_str() {
        "timer1start" => Some((FieldId::Timer1, Bound::Start)),
        "timer1end" => Some((FieldId::Timer1, Bound::End)),
        "timer2start" => Some((FieldId::Timer2, Bound::Start)),
        "timer2end" => Some((FieldId::Timer2, Bound::End)),
        _ => None,
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" | "checked" => Some(true),
        "false" | "0" | "off" | "no" | "" => Some(false),
        _ => None,
    }
}

/// Parses the leading integer of a string (`"15s"` is 15), like form inputs carry.
fn leading_integer(value: &str) -> Option<i64> {
    let (sign, digits) = match value.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, value.strip_prefix('+').unwrap_or(value)),
    };
    let end = digits
        .find(|character: char| !character.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|parsed| sign * parsed)
}
