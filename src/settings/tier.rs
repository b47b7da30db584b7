use serde_with::{DeserializeFromStr, SerializeDisplay};
use strum_macros::{Display, EnumIter, EnumString};

/// Camera capability class gating which settings are legal.
///
/// ```
/// use trailcam::CameraTier;
///
/// assert_eq!(CameraTier::Base, "Standard".parse()?);
/// assert_eq!(CameraTier::Max, "max".parse()?);
/// # Ok::<(), strum::ParseError>(())
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
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
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum CameraTier {
    #[default]
    #[strum(to_string = "base", serialize = "standard")]
    Base,
    Pro,
    Max,
}
