mod model;
mod store;

use std::path::PathBuf;

use thiserror::Error;

pub use self::model::{CameraId, CameraProfile, PhoneNumber, Selection};
pub use self::store::{FileProfileStore, MemoryProfileStore, ProfileStore, RawSettings};

/// Errors returned by camera registration and the profile stores.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("`{value}` is not a valid phone number; expected 8 to 15 digits with an optional leading +")]
    InvalidPhone { value: String },
    #[error("no camera is registered as `{id}`")]
    UnknownCamera { id: CameraId },
    #[error("failed while reading or writing camera profiles")]
    Io { source: std::io::Error },
    #[error("profile file `{}` is corrupt", path.display())]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to serialise camera profiles")]
    Serialize { source: serde_json::Error },
}
