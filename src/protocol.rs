use std::collections::HashMap;
use std::sync::LazyLock;

use serde::Serialize;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

/// Command kinds understood by the camera firmware.
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd, EnumIter, EnumString, Display, Serialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(ascii_case_insensitive)]
pub enum CommandKind {
    /// General configuration (`$10`): reporting, image size, upload modes.
    #[strum(to_string = "general", serialize = "10")]
    GeneralConfig,
    /// Detailed capture configuration (`$01`): capture, sensor and timer settings.
    #[strum(to_string = "camera", serialize = "01")]
    CameraConfig,
    /// Recipient phone numbers (`$06`).
    #[strum(to_string = "phones", serialize = "06")]
    PhoneList,
    /// Recipient email addresses (`$08`).
    #[strum(to_string = "emails", serialize = "08")]
    EmailList,
    /// Manual capture trigger (`$03`).
    #[strum(to_string = "capture", serialize = "03")]
    TriggerCapture,
}

/// Fixed framing metadata for one command id.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct CommandMetadata {
    id: &'static str,
    param_count: usize,
    name: &'static str,
}

impl CommandMetadata {
    /// Two-digit command identifier placed after the start delimiter.
    #[must_use]
    pub fn id(self) -> &'static str {
        self.id
    }

    /// Number of positional parameters the firmware expects.
    #[must_use]
    pub fn param_count(self) -> usize {
        self.param_count
    }

    /// Human-readable command name.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.name
    }
}

/// Command metadata keyed by command kind.
pub(crate) static COMMANDS_BY_KIND: LazyLock<HashMap<CommandKind, CommandMetadata>> =
    LazyLock::new(|| {
        CommandKind::iter()
            .map(|kind| (kind, metadata_for(kind)))
            .collect()
    });

/// Returns framing metadata for one command kind.
///
/// ```
/// use trailcam::{CommandKind, command_metadata};
///
/// let camera = command_metadata(CommandKind::CameraConfig);
/// assert_eq!("01", camera.id());
/// assert_eq!(27, camera.param_count());
/// ```
#[must_use]
pub fn command_metadata(kind: CommandKind) -> CommandMetadata {
    *COMMANDS_BY_KIND
        .get(&kind)
        .unwrap_or(&metadata_for(kind))
}

/// Looks up the command kind for a two-digit wire identifier.
pub(crate) fn kind_for_id(id: &str) -> Option<CommandKind> {
    CommandKind::iter().find(|kind| command_metadata(*kind).id() == id)
}

fn metadata_for(kind: CommandKind) -> CommandMetadata {
    match kind {
        CommandKind::GeneralConfig => CommandMetadata {
            id: "10",
            param_count: 13,
            name: "general configuration",
        },
        CommandKind::CameraConfig => CommandMetadata {
            id: "01",
            param_count: 27,
            name: "camera configuration",
        },
        CommandKind::PhoneList => CommandMetadata {
            id: "06",
            param_count: 8,
            name: "phone recipients",
        },
        CommandKind::EmailList => CommandMetadata {
            id: "08",
            param_count: 8,
            name: "email recipients",
        },
        CommandKind::TriggerCapture => CommandMetadata {
            id: "03",
            param_count: 1,
            name: "capture trigger",
        },
    }
}
