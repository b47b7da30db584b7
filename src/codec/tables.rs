//! Static maps between human-facing setting labels and firmware codes.
//!
//! Every table is total: unrecognised labels resolve to the variant marked
//! `#[default]`, whose code is the documented fallback.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

/// A code table entry with a numeric firmware code.
pub trait Choice: FromStr + Display + Default + Copy + Eq {
    /// Firmware code for this value.
    fn code(self) -> u8;

    /// Resolves a label, falling back to the table default.
    ///
    /// ```
    /// use trailcam::{Choice, VideoResolution};
    ///
    /// assert_eq!(1, VideoResolution::from_label("FHD-1920x1080").code());
    /// assert_eq!(2, VideoResolution::from_label("8K").code());
    /// ```
    fn from_label(label: &str) -> Self {
        label.trim().parse().unwrap_or_default()
    }
}

/// Still image resolution, ordered from highest to lowest.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, Display, EnumIter, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum ImageResolution {
    #[strum(to_string = "32M", serialize = "32MP")]
    Mp32,
    #[strum(to_string = "24M", serialize = "24MP")]
    Mp24,
    #[strum(to_string = "12MP", serialize = "12M")]
    Mp12,
    #[strum(to_string = "8MP", serialize = "8M")]
    Mp8,
    #[default]
    #[strum(to_string = "5MP", serialize = "5M")]
    Mp5,
}

impl Choice for ImageResolution {
    fn code(self) -> u8 {
        match self {
            Self::Mp32 => 1,
            Self::Mp24 => 2,
            Self::Mp12 => 3,
            Self::Mp8 => 4,
            Self::Mp5 => 5,
        }
    }
}

/// Video resolution, ordered from highest to lowest.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, Display, EnumIter, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum VideoResolution {
    #[strum(to_string = "FHD-1920x1080", serialize = "FHD", serialize = "1080p")]
    Fhd,
    #[default]
    #[strum(to_string = "HD-1280x720", serialize = "HD", serialize = "720p")]
    Hd,
    #[strum(to_string = "WVGA-848x480", serialize = "WVGA", serialize = "480p")]
    Wvga,
}

impl Choice for VideoResolution {
    fn code(self) -> u8 {
        match self {
            Self::Fhd => 1,
            Self::Hd => 2,
            Self::Wvga => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, Display, EnumIter, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum CaptureMode {
    #[default]
    #[strum(to_string = "Image", serialize = "Bild", serialize = "Photo")]
    Image,
    #[strum(to_string = "Video")]
    Video,
    #[strum(to_string = "Image+Video", serialize = "P+V", serialize = "Bild+Video")]
    ImageVideo,
}

impl CaptureMode {
    #[must_use]
    pub fn captures_images(self) -> bool {
        matches!(self, Self::Image | Self::ImageVideo)
    }

    #[must_use]
    pub fn captures_video(self) -> bool {
        matches!(self, Self::Video | Self::ImageVideo)
    }
}

impl Choice for CaptureMode {
    fn code(self) -> u8 {
        match self {
            Self::Image => 1,
            Self::Video => 2,
            Self::ImageVideo => 3,
        }
    }
}

/// Night exposure mode.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, Display, EnumIter, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum NightMode {
    #[strum(to_string = "Quality", serialize = "Qualität")]
    Quality,
    #[default]
    #[strum(to_string = "Balance")]
    Balance,
    #[strum(to_string = "Eco", serialize = "Öko")]
    Eco,
}

impl Choice for NightMode {
    fn code(self) -> u8 {
        match self {
            Self::Quality => 1,
            Self::Balance => 2,
            Self::Eco => 3,
        }
    }
}

/// Image size used for SMTP and FTP uploads.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, Display, EnumIter, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum ImageSize {
    #[strum(to_string = "Small", serialize = "Klein")]
    Small,
    #[strum(to_string = "Larger", serialize = "Größer")]
    Larger,
    #[default]
    #[strum(to_string = "Original")]
    Original,
}

impl Choice for ImageSize {
    fn code(self) -> u8 {
        match self {
            Self::Small => 0,
            Self::Larger => 1,
            Self::Original => 2,
        }
    }
}

/// When the camera reports captures over SMS.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, Display, EnumIter, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum SmsControl {
    #[strum(to_string = "Instant", serialize = "Sofort")]
    Instant,
    #[default]
    #[strum(to_string = "Daily", serialize = "Täglich")]
    Daily,
}

impl Choice for SmsControl {
    fn code(self) -> u8 {
        match self {
            Self::Instant => 1,
            Self::Daily => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, Display, EnumIter, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum FtpMode {
    #[default]
    #[strum(to_string = "Off", serialize = "AUS")]
    Off,
    #[strum(to_string = "FTP")]
    Ftp,
    #[strum(to_string = "FTPS")]
    Ftps,
}

impl Choice for FtpMode {
    fn code(self) -> u8 {
        match self {
            Self::Off => 0,
            Self::Ftp => 1,
            Self::Ftps => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, Display, EnumIter, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum FlashLed {
    #[default]
    #[strum(to_string = "High", serialize = "Hoch")]
    High,
    #[strum(to_string = "Low", serialize = "Niedrig")]
    Low,
}

impl Choice for FlashLed {
    fn code(self) -> u8 {
        match self {
            Self::High => 0,
            Self::Low => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, Display, EnumIter, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum HourSystem {
    #[default]
    #[strum(to_string = "24h", serialize = "24")]
    H24,
    #[strum(to_string = "12h", serialize = "12")]
    H12,
}

impl Choice for HourSystem {
    fn code(self) -> u8 {
        match self {
            Self::H24 => 0,
            Self::H12 => 1,
        }
    }
}

/// Passive infrared trigger sensitivity.
///
/// Named levels are shorthands for numeric levels: High is `L9`, Medium is
/// `L7`, Low is `L5`.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash)]
pub enum PirSensitivity {
    High,
    #[default]
    Medium,
    Low,
    /// Explicit level `L1`..=`L9`.
    Level(u8),
}

impl PirSensitivity {
    /// Named levels in descending sensitivity.
    pub const NAMED: [Self; 3] = [Self::High, Self::Medium, Self::Low];

    /// All values accepted by full-featured cameras.
    #[must_use]
    pub fn all() -> Vec<Self> {
        Self::NAMED
            .into_iter()
            .chain((1..=9).map(Self::Level))
            .collect()
    }

    /// Collapses a numeric level onto the nearest named level.
    #[must_use]
    pub fn to_named(self) -> Self {
        match self {
            Self::Level(8..=9) => Self::High,
            Self::Level(6..=7) => Self::Medium,
            Self::Level(_) => Self::Low,
            named => named,
        }
    }
}

impl Choice for PirSensitivity {
    fn code(self) -> u8 {
        match self {
            Self::High => 9,
            Self::Medium => 7,
            Self::Low => 5,
            Self::Level(level) => level,
        }
    }
}

impl FromStr for PirSensitivity {
    type Err = strum::ParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let lowered = trimmed.to_lowercase();
        match lowered.as_str() {
            "high" | "hoch" => return Ok(Self::High),
            "medium" | "mittel" => return Ok(Self::Medium),
            "low" | "niedrig" => return Ok(Self::Low),
            _ => {}
        }

        lowered
            .strip_prefix('l')
            .and_then(|level| level.parse::<u8>().ok())
            .filter(|level| (1..=9).contains(level))
            .map(Self::Level)
            .ok_or(strum::ParseError::VariantNotFound)
    }
}

impl Display for PirSensitivity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => write!(f, "High"),
            Self::Medium => write!(f, "Medium"),
            Self::Low => write!(f, "Low"),
            Self::Level(level) => write!(f, "L{level}"),
        }
    }
}

/// Frames-to-transmit bit pattern for a burst of `count` images.
///
/// ```
/// assert_eq!(1, trailcam::burst_to_send(1));
/// assert_eq!(15, trailcam::burst_to_send(3));
/// assert_eq!(31, trailcam::burst_to_send(5));
/// ```
#[must_use]
pub fn burst_to_send(count: i64) -> u8 {
    match count {
        i64::MIN..=1 => 1,
        2..=4 => 15,
        _ => 31,
    }
}

/// Picks the highest allowed value not above `requested`, else the lowest allowed.
///
/// `T::iter()` must yield values from highest to lowest.
pub(crate) fn nearest_allowed<T>(requested: T, allowed: &[T]) -> T
where
    T: IntoEnumIterator + Copy + Eq,
{
    T::iter()
        .skip_while(|candidate| *candidate != requested)
        .find(|candidate| allowed.contains(candidate))
        .or_else(|| allowed.last().copied())
        .unwrap_or(requested)
}
