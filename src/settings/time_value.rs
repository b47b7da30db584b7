use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use time::Time;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

use super::SettingsError;

const CLOCK_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[hour]:[minute]");

/// Wall-clock time of day with minute precision.
///
/// ```
/// use trailcam::TimeOfDay;
///
/// let time: TimeOfDay = "07:45".parse()?;
/// assert_eq!("0745", time.compact());
/// # Ok::<(), trailcam::SettingsError>(())
/// ```
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd)]
pub struct TimeOfDay(Time);

impl TimeOfDay {
    /// Midnight, used for unset timer bounds.
    pub const MIDNIGHT: Self = Self(Time::MIDNIGHT);

    /// Builds a time of day from hour and minute.
    ///
    /// # Errors
    ///
    /// Returns an error when either component is out of range.
    pub fn from_hm(hour: u8, minute: u8) -> Result<Self, SettingsError> {
        Time::from_hms(hour, minute, 0)
            .map(Self)
            .map_err(|_error| SettingsError::InvalidTime {
                value: format!("{hour:02}:{minute:02}"),
            })
    }

    /// Digits-only rendering (`HHMM`) used on the wire.
    #[must_use]
    pub fn compact(self) -> String {
        format!("{:02}{:02}", self.0.hour(), self.0.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = SettingsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Time::parse(trimmed, CLOCK_FORMAT)
            .map(Self)
            .map_err(|_error| SettingsError::InvalidTime {
                value: trimmed.to_string(),
            })
    }
}

impl Display for TimeOfDay {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0.hour(), self.0.minute())
    }
}

/// Duration with second precision, entered as `HH:MM:SS`.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Ord, PartialOrd)]
pub struct TimeSpan(u32);

impl TimeSpan {
    /// Creates a span from whole seconds.
    #[must_use]
    pub fn from_seconds(seconds: u32) -> Self {
        Self(seconds)
    }

    /// Total seconds, the wire rendering for delay and time-lapse.
    #[must_use]
    pub fn total_seconds(self) -> u32 {
        self.0
    }
}

impl FromStr for TimeSpan {
    type Err = SettingsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let invalid = || SettingsError::InvalidSpan {
            value: trimmed.to_string(),
        };

        if let Ok(seconds) = trimmed.parse::<u32>() {
            return Ok(Self(seconds));
        }

        let mut parts = trimmed.split(':');
        let (Some(hours), Some(minutes), Some(seconds), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };
        let hours = hours.parse::<u32>().map_err(|_error| invalid())?;
        let minutes = minutes.parse::<u32>().map_err(|_error| invalid())?;
        let seconds = seconds.parse::<u32>().map_err(|_error| invalid())?;
        if minutes >= 60 || seconds >= 60 {
            return Err(invalid());
        }

        hours
            .checked_mul(3600)
            .and_then(|total| total.checked_add(minutes * 60 + seconds))
            .map(Self)
            .ok_or_else(invalid)
    }
}

impl Display for TimeSpan {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let hours = self.0 / 3600;
        let minutes = (self.0 % 3600) / 60;
        let seconds = self.0 % 60;
        write!(f, "{hours:02}:{minutes:02}:{seconds:02}")
    }
}

/// Daily activity window between two times of day.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd)]
pub struct TimeRange {
    start: TimeOfDay,
    end: TimeOfDay,
}

impl TimeRange {
    /// Creates a window from its bounds.
    #[must_use]
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn start(self) -> TimeOfDay {
        self.start
    }

    #[must_use]
    pub fn end(self) -> TimeOfDay {
        self.end
    }

    /// Wire rendering `HHMM-HHMM`.
    #[must_use]
    pub fn compact(self) -> String {
        format!("{}-{}", self.start.compact(), self.end.compact())
    }
}

impl Default for TimeRange {
    fn default() -> Self {
        Self::new(TimeOfDay::MIDNIGHT, TimeOfDay::MIDNIGHT)
    }
}

impl FromStr for TimeRange {
    type Err = SettingsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let Some((start, end)) = value.split_once('-') else {
            return Err(SettingsError::InvalidRange {
                value: value.trim().to_string(),
            });
        };
        Ok(Self::new(start.parse()?, end.parse()?))
    }
}

impl Display for TimeRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}
