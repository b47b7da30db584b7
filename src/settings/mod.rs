mod field;
mod snapshot;
mod spec;
mod tier;
mod time_value;
mod validation;

use thiserror::Error;

pub use self::field::{FieldCategory, FieldId, FieldKind};
pub use self::snapshot::{SettingValue, SettingsSnapshot};
pub use self::spec::{CommandSpec, command_spec};
pub use self::tier::CameraTier;
pub use self::time_value::{TimeOfDay, TimeRange, TimeSpan};
pub use self::validation::{
    Correction, CrossFieldRule, LONG_VIDEO_DURATIONS, MAX_SENDABLE_VIDEO_SECONDS, Validated,
    ValidatedSnapshot, ValidationError, Validator,
};

/// Errors returned while reading raw settings input.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum SettingsError {
    #[error("unknown settings field `{key}`")]
    UnknownField { key: String },
    #[error("settings entries must look like `key=value`, got `{entry}`")]
    MalformedEntry { entry: String },
    #[error("invalid time of day `{value}`, expected HH:MM")]
    InvalidTime { value: String },
    #[error("invalid duration `{value}`, expected HH:MM:SS or whole seconds")]
    InvalidSpan { value: String },
    #[error("invalid time window `{value}`, expected HH:MM-HH:MM")]
    InvalidRange { value: String },
}

/// Splits one `key=value` settings entry.
///
/// ```
/// let (key, value) = trailcam::parse_settings_entry("videoDuration=10")?;
/// assert_eq!(("videoDuration", "10"), (key.as_str(), value.as_str()));
/// # Ok::<(), trailcam::SettingsError>(())
/// ```
///
/// # Errors
///
/// Returns an error when the entry has no `=` or an empty key.
pub fn parse_settings_entry(entry: &str) -> Result<(String, String), SettingsError> {
    match entry.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(SettingsError::MalformedEntry {
            entry: entry.to_string(),
        }),
    }
}
