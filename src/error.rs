use derive_more::From;
use thiserror::Error;

use crate::codec::{PresetError, WireCodecError};
use crate::dispatch::DispatchError;
use crate::outbox::OutboxError;
use crate::profile::ProfileError;
use crate::settings::SettingsError;
use crate::transport::TransportError;

/// Errors returned when parsing fake transport fixtures.
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("the fake transport fixture is empty")]
    EmptyFixture,
    #[error(
        "unknown fake transport step `{step}`; expected ok, tentative, fail, unavailable or timeout"
    )]
    UnknownStep { step: String },
}

/// Errors returned when validating runtime options.
#[derive(Debug, Error)]
pub(crate) enum CliConfigError {
    #[error("no state directory was given and no platform data directory is available")]
    MissingStateDir,
    #[error("--max-attempts must be at least 1")]
    ZeroMaxAttempts,
}

/// Errors returned by telemetry initialisation.
#[derive(Debug, Error)]
pub(crate) enum TelemetryError {
    #[error("failed to install tracing subscriber")]
    Subscriber(#[from] tracing_subscriber::util::TryInitError),
}

/// Top-level error wrapping module-specific error types.
#[derive(Debug, Error, From)]
pub enum TrailcamError {
    #[error(transparent)]
    #[from(SettingsError, Box<SettingsError>)]
    Settings(Box<SettingsError>),
    #[error(transparent)]
    #[from(WireCodecError, Box<WireCodecError>)]
    WireCodec(Box<WireCodecError>),
    #[error(transparent)]
    #[from(PresetError, Box<PresetError>)]
    Preset(Box<PresetError>),
    #[error(transparent)]
    #[from(ProfileError, Box<ProfileError>)]
    Profile(Box<ProfileError>),
    #[error(transparent)]
    #[from(OutboxError, Box<OutboxError>)]
    Outbox(Box<OutboxError>),
    #[error(transparent)]
    #[from(TransportError, Box<TransportError>)]
    Transport(Box<TransportError>),
    #[error(transparent)]
    #[from(DispatchError, Box<DispatchError>)]
    Dispatch(Box<DispatchError>),
    #[error(transparent)]
    #[from(FixtureError, Box<FixtureError>)]
    Fixture(Box<FixtureError>),
}
