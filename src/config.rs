use std::path::{Path, PathBuf};
use std::time::Duration;

use bon::Builder;
use directories::ProjectDirs;

use crate::error::CliConfigError;

const PROFILES_FILE_NAME: &str = "profiles.json";
const OUTBOX_FILE_NAME: &str = "outbox.json";

/// Delivery tuning for the sync engine.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Builder)]
pub struct SyncConfig {
    /// Attempts before a queued message is dead-lettered.
    #[builder(default = 3)]
    max_attempts: u32,
    /// Bounded wait for one transport attempt.
    #[builder(default = Duration::from_secs(10))]
    send_timeout: Duration,
}

impl SyncConfig {
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    #[must_use]
    pub fn send_timeout(&self) -> Duration {
        self.send_timeout
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Locations of the persisted profile book and outbox.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct StatePaths {
    root: PathBuf,
}

impl StatePaths {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Uses `root` when given, else the platform data directory.
    pub(crate) fn resolve(root: Option<&Path>) -> Result<Self, CliConfigError> {
        match root {
            Some(root) => Ok(Self::new(root)),
            None => default_state_dir()
                .map(Self::new)
                .ok_or(CliConfigError::MissingStateDir),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn profiles(&self) -> PathBuf {
        self.root.join(PROFILES_FILE_NAME)
    }

    #[must_use]
    pub fn outbox(&self) -> PathBuf {
        self.root.join(OUTBOX_FILE_NAME)
    }
}

fn default_state_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "trailcam").map(|dirs| dirs.data_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn sync_config_defaults() {
        let config = SyncConfig::default();
        assert_eq!(3, config.max_attempts());
        assert_eq!(Duration::from_secs(10), config.send_timeout());
    }

    #[test]
    fn state_paths_live_under_the_root() {
        let paths = StatePaths::resolve(Some(Path::new("/tmp/trailcam-state")))
            .expect("explicit root always resolves");
        assert_eq!(PathBuf::from("/tmp/trailcam-state/profiles.json"), paths.profiles());
        assert_eq!(PathBuf::from("/tmp/trailcam-state/outbox.json"), paths.outbox());
    }
}
