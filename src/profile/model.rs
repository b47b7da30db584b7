use std::collections::BTreeSet;
use std::str::FromStr;

use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};

use super::ProfileError;
use crate::settings::CameraTier;

const PHONE_DIGITS: std::ops::RangeInclusive<usize> = 8..=15;

/// Opaque camera identifier.
#[derive(
    Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Display, From, Into, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CameraId(String);

impl CameraId {
    pub(crate) fn numbered(number: u64) -> Self {
        Self(format!("cam-{number}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CameraId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl FromStr for CameraId {
    type Err = std::convert::Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(value.trim()))
    }
}

/// Destination number of a camera's SIM card, optionally with a leading `+`.
///
/// ```
/// use trailcam::PhoneNumber;
///
/// assert!("+491701234567".parse::<PhoneNumber>().is_ok());
/// assert!("0170-123".parse::<PhoneNumber>().is_err());
/// ```
#[derive(Debug, Clone, Eq, PartialEq, Hash, Display, SerializeDisplay, DeserializeFromStr)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for PhoneNumber {
    type Err = ProfileError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
        if PHONE_DIGITS.contains(&digits.len()) && digits.bytes().all(|byte| byte.is_ascii_digit())
        {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(ProfileError::InvalidPhone {
                value: value.to_string(),
            })
        }
    }
}

/// A registered camera.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct CameraProfile {
    id: CameraId,
    name: String,
    phone: PhoneNumber,
    tier: CameraTier,
}

impl CameraProfile {
    #[must_use]
    pub fn new(id: CameraId, name: impl Into<String>, phone: PhoneNumber, tier: CameraTier) -> Self {
        Self {
            id,
            name: name.into(),
            phone,
            tier,
        }
    }

    #[must_use]
    pub fn id(&self) -> &CameraId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn phone(&self) -> &PhoneNumber {
        &self.phone
    }

    #[must_use]
    pub fn tier(&self) -> CameraTier {
        self.tier
    }

    pub(crate) fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }
}

/// Cameras picked for a batch action. Owned by the caller, never by the core.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Selection {
    cameras: BTreeSet<CameraId>,
}

impl Selection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when the camera was newly selected.
    pub fn select(&mut self, id: CameraId) -> bool {
        self.cameras.insert(id)
    }

    /// Returns `true` when the camera was selected before.
    pub fn deselect(&mut self, id: &CameraId) -> bool {
        self.cameras.remove(id)
    }

    /// Flips the selection state, returning the new state.
    pub fn toggle(&mut self, id: CameraId) -> bool {
        if self.cameras.remove(&id) {
            false
        } else {
            self.cameras.insert(id);
            true
        }
    }

    pub fn select_all<'a>(&mut self, profiles: impl IntoIterator<Item = &'a CameraProfile>) {
        self.cameras
            .extend(profiles.into_iter().map(|profile| profile.id().clone()));
    }

    pub fn clear(&mut self) {
        self.cameras.clear();
    }

    #[must_use]
    pub fn contains(&self, id: &CameraId) -> bool {
        self.cameras.contains(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CameraId> {
        self.cameras.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cameras.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cameras.is_empty()
    }
}

impl FromIterator<CameraId> for Selection {
    fn from_iter<I: IntoIterator<Item = CameraId>>(iter: I) -> Self {
        Self {
            cameras: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("+491701234567")]
    #[case("01701234567")]
    #[case("12345678")]
    #[case("+123456789012345")]
    fn phone_numbers_accept_eight_to_fifteen_digits(#[case] value: &str) {
        assert_matches!(value.parse::<PhoneNumber>(), Ok(phone) if phone.as_str() == value);
    }

    #[rstest]
    #[case("1234567")]
    #[case("+1234567890123456")]
    #[case("0170 1234567")]
    #[case("++491701234567")]
    #[case("")]
    fn phone_numbers_reject_everything_else(#[case] value: &str) {
        assert_matches!(
            value.parse::<PhoneNumber>(),
            Err(ProfileError::InvalidPhone { .. })
        );
    }

    #[test]
    fn selection_toggle_flips_membership() {
        let mut selection = Selection::new();
        assert!(selection.toggle("cam-1".into()));
        assert!(selection.contains(&"cam-1".into()));
        assert!(!selection.toggle("cam-1".into()));
        assert!(selection.is_empty());
    }

    #[test]
    fn select_all_adds_every_profile_once() {
        let phone: PhoneNumber = "+491701234567".parse().expect("valid phone");
        let profiles = [
            CameraProfile::new(CameraId::numbered(1), "Hochsitz", phone.clone(), CameraTier::Base),
            CameraProfile::new(CameraId::numbered(2), "Kirrung", phone, CameraTier::Max),
        ];
        let mut selection = Selection::from_iter([CameraId::numbered(2)]);
        selection.select_all(&profiles);
        assert_eq!(
            vec!["cam-1", "cam-2"],
            selection.iter().map(CameraId::as_str).collect::<Vec<_>>()
        );
    }
}
