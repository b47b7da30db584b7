mod app;
mod cli;
mod codec;
mod config;
mod dispatch;
mod error;
mod outbox;
mod profile;
mod protocol;
mod settings;
mod sync;
mod telemetry;
mod terminal;
mod transport;
mod utils;

pub use app::{Services, run, run_with_clients};
pub use cli::{
    Args, CameraAction, CameraArgs, CaptureArgs, Command, LogLevel, OutboxAction, OutboxArgs,
    OutputFormat, PreviewArgs, RuntimeOptions, SendArgs, SettingsAction, SettingsArgs,
};
pub use codec::{
    CaptureMode, CapturePreset, Choice, CommandEncoder, FlashLed, FtpMode, HourSystem,
    ImageResolution, ImageSize, NightMode, PirSensitivity, PresetError, SmsControl,
    VideoResolution, WireCodec, WireCodecError, WireCommand, burst_to_send,
};
pub use config::{StatePaths, SyncConfig};
pub use dispatch::{BatchOutcome, CommandPreview, DispatchError, DispatchReceipt, Dispatcher};
pub use error::{FixtureError, TrailcamError};
pub use outbox::{
    FileOutbox, MemoryOutbox, MessageId, NewMessage, OutboxError, OutboxStore, PendingMessage,
};
pub use profile::{
    CameraId, CameraProfile, FileProfileStore, MemoryProfileStore, PhoneNumber, ProfileError,
    ProfileStore, RawSettings, Selection,
};
pub use protocol::{CommandKind, CommandMetadata, command_metadata};
pub use settings::{
    CameraTier, CommandSpec, Correction, CrossFieldRule, FieldCategory, FieldId, FieldKind,
    LONG_VIDEO_DURATIONS, MAX_SENDABLE_VIDEO_SECONDS, SettingValue, SettingsError,
    SettingsSnapshot, TimeOfDay, TimeRange, TimeSpan, Validated, ValidatedSnapshot,
    ValidationError, Validator, command_spec, parse_settings_entry,
};
pub use sync::{
    Connectivity, ConnectivityMonitor, DeferReason, DrainReport, DrainStatus, SendOutcome,
    SyncEngine,
};
pub use terminal::{SystemTerminalClient, TerminalClient};
pub use transport::{
    Handoff, ScriptStep, ScriptedTransport, SentMessage, SmsUriTransport, Transport,
    TransportError, TransportScript,
};
