use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ProfileError;
use super::model::{CameraId, CameraProfile, PhoneNumber};
use crate::settings::CameraTier;

/// Raw `name=value` settings exactly as the user last saved them.
pub type RawSettings = BTreeMap<String, String>;

/// Registered cameras and their stored settings. Last write wins.
pub trait ProfileStore: Send + Sync {
    /// Lists cameras in registration order.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing storage cannot be read.
    fn cameras(&self) -> Result<Vec<CameraProfile>, ProfileError>;

    /// # Errors
    ///
    /// Returns [`ProfileError::UnknownCamera`] when no camera has the id.
    fn camera(&self, id: &CameraId) -> Result<CameraProfile, ProfileError>;

    /// Registers a camera after validating its phone number.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::InvalidPhone`] for malformed numbers, or a
    /// storage error when the change cannot be persisted.
    fn register(
        &self,
        name: &str,
        phone: &str,
        tier: CameraTier,
    ) -> Result<CameraProfile, ProfileError>;

    /// # Errors
    ///
    /// Returns an error for unknown cameras or failed persistence.
    fn rename(&self, id: &CameraId, name: &str) -> Result<CameraProfile, ProfileError>;

    /// Removes a camera together with its stored settings.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown cameras or failed persistence.
    fn remove(&self, id: &CameraId) -> Result<CameraProfile, ProfileError>;

    /// Returns the stored raw settings, empty when none were saved yet.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::UnknownCamera`] when no camera has the id.
    fn settings(&self, id: &CameraId) -> Result<RawSettings, ProfileError>;

    /// Replaces the stored raw settings.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown cameras or failed persistence.
    fn save_settings(&self, id: &CameraId, settings: RawSettings) -> Result<(), ProfileError>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ProfileBook {
    next_id: u64,
    cameras: Vec<CameraProfile>,
    #[serde(default)]
    settings: BTreeMap<CameraId, RawSettings>,
}

impl ProfileBook {
    fn camera(&self, id: &CameraId) -> Result<&CameraProfile, ProfileError> {
        self.cameras
            .iter()
            .find(|camera| camera.id() == id)
            .ok_or_else(|| unknown(id))
    }

    fn camera_mut(&mut self, id: &CameraId) -> Result<&mut CameraProfile, ProfileError> {
        self.cameras
            .iter_mut()
            .find(|camera| camera.id() == id)
            .ok_or_else(|| unknown(id))
    }

    fn register(
        &mut self,
        name: &str,
        phone: &str,
        tier: CameraTier,
    ) -> Result<CameraProfile, ProfileError> {
        let phone = phone.parse::<PhoneNumber>()?;
        self.next_id += 1;
        let profile = CameraProfile::new(CameraId::numbered(self.next_id), name.trim(), phone, tier);
        self.cameras.push(profile.clone());
        Ok(profile)
    }

    fn rename(&mut self, id: &CameraId, name: &str) -> Result<CameraProfile, ProfileError> {
        let camera = self.camera_mut(id)?;
        camera.rename(name.trim());
        Ok(camera.clone())
    }

    fn remove(&mut self, id: &CameraId) -> Result<CameraProfile, ProfileError> {
        let position = self
            .cameras
            .iter()
            .position(|camera| camera.id() == id)
            .ok_or_else(|| unknown(id))?;
        self.settings.remove(id);
        Ok(self.cameras.remove(position))
    }

    fn settings(&self, id: &CameraId) -> Result<RawSettings, ProfileError> {
        self.camera(id)?;
        Ok(self.settings.get(id).cloned().unwrap_or_default())
    }

    fn save_settings(&mut self, id: &CameraId, settings: RawSettings) -> Result<(), ProfileError> {
        self.camera(id)?;
        self.settings.insert(id.clone(), settings);
        Ok(())
    }
}

fn unknown(id: &CameraId) -> ProfileError {
    ProfileError::UnknownCamera { id: id.clone() }
}

fn lock(book: &Mutex<ProfileBook>) -> MutexGuard<'_, ProfileBook> {
    book.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory profile store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryProfileStore {
    book: Mutex<ProfileBook>,
}

impl MemoryProfileStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProfileStore for MemoryProfileStore {
    fn cameras(&self) -> Result<Vec<CameraProfile>, ProfileError> {
        Ok(lock(&self.book).cameras.clone())
    }

    fn camera(&self, id: &CameraId) -> Result<CameraProfile, ProfileError> {
        lock(&self.book).camera(id).cloned()
    }

    fn register(
        &self,
        name: &str,
        phone: &str,
        tier: CameraTier,
    ) -> Result<CameraProfile, ProfileError> {
        lock(&self.book).register(name, phone, tier)
    }

    fn rename(&self, id: &CameraId, name: &str) -> Result<CameraProfile, ProfileError> {
        lock(&self.book).rename(id, name)
    }

    fn remove(&self, id: &CameraId) -> Result<CameraProfile, ProfileError> {
        lock(&self.book).remove(id)
    }

    fn settings(&self, id: &CameraId) -> Result<RawSettings, ProfileError> {
        lock(&self.book).settings(id)
    }

    fn save_settings(&self, id: &CameraId, settings: RawSettings) -> Result<(), ProfileError> {
        lock(&self.book).save_settings(id, settings)
    }
}

/// Profile store persisted as one JSON document.
#[derive(Debug)]
pub struct FileProfileStore {
    path: PathBuf,
    book: Mutex<ProfileBook>,
}

impl FileProfileStore {
    /// Opens the store, starting empty when the file does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error when the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ProfileError> {
        let path = path.into();
        let book = if path.exists() {
            let raw = fs::read_to_string(&path).map_err(|source| ProfileError::Io { source })?;
            serde_json::from_str(&raw).map_err(|source| ProfileError::Corrupt {
                path: path.clone(),
                source,
            })?
        } else {
            ProfileBook::default()
        };
        debug!(path = %path.display(), cameras = book.cameras.len(), "opened profile store");
        Ok(Self {
            path,
            book: Mutex::new(book),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn mutate<T>(
        &self,
        change: impl FnOnce(&mut ProfileBook) -> Result<T, ProfileError>,
    ) -> Result<T, ProfileError> {
        let mut book = lock(&self.book);
        let mut next = book.clone();
        let result = change(&mut next)?;
        save(&self.path, &next)?;
        *book = next;
        Ok(result)
    }
}

fn save(path: &Path, book: &ProfileBook) -> Result<(), ProfileError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| ProfileError::Io { source })?;
    }
    let serialised =
        serde_json::to_vec_pretty(book).map_err(|source| ProfileError::Serialize { source })?;
    let staging = path.with_extension("json.tmp");
    fs::write(&staging, serialised).map_err(|source| ProfileError::Io { source })?;
    fs::rename(&staging, path).map_err(|source| ProfileError::Io { source })
}

impl ProfileStore for FileProfileStore {
    fn cameras(&self) -> Result<Vec<CameraProfile>, ProfileError> {
        Ok(lock(&self.book).cameras.clone())
    }

    fn camera(&self, id: &CameraId) -> Result<CameraProfile, ProfileError> {
        lock(&self.book).camera(id).cloned()
    }

    fn register(
        &self,
        name: &str,
        phone: &str,
        tier: CameraTier,
    ) -> Result<CameraProfile, ProfileError> {
        self.mutate(|book| book.register(name, phone, tier))
    }

    fn rename(&self, id: &CameraId, name: &str) -> Result<CameraProfile, ProfileError> {
        self.mutate(|book| book.rename(id, name))
    }

    fn remove(&self, id: &CameraId) -> Result<CameraProfile, ProfileError> {
        self.mutate(|book| book.remove(id))
    }

    fn settings(&self, id: &CameraId) -> Result<RawSettings, ProfileError> {
        lock(&self.book).settings(id)
    }

    fn save_settings(&self, id: &CameraId, settings: RawSettings) -> Result<(), ProfileError> {
        self.mutate(|book| book.save_settings(id, settings))
    }
}
