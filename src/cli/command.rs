use std::path::PathBuf;
use std::time::Duration;

use bon::Builder;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::level_filters::LevelFilter;

use crate::cli::camera::CameraArgs;
use crate::cli::outbox::OutboxArgs;
use crate::cli::send::{CaptureArgs, PreviewArgs, SendArgs};
use crate::cli::settings::SettingsArgs;
use crate::config::SyncConfig;
use crate::error::{CliConfigError, FixtureError};
use crate::sync::Connectivity;
use crate::transport::TransportScript;

/// Command-line options for the trail camera remote control.
#[derive(Debug, Parser)]
#[command(
    name = "trailcam",
    about = "Configure and trigger SMS-controlled trail cameras."
)]
pub struct Args {
    /// Directory holding `profiles.json` and `outbox.json`.
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,
    /// Treats the messaging channel as unavailable; commands are queued.
    #[arg(long, global = true)]
    offline: bool,
    /// Replaces the SMS handoff with a scripted fake, e.g. `fail,timeout,ok`.
    #[arg(long, global = true)]
    fake_transport: Option<TransportScript>,
    /// Bounded wait for one send attempt (e.g. `500ms`, `10s`).
    #[arg(long, global = true, value_parser = parse_duration)]
    send_timeout: Option<Duration>,
    /// Attempts before a queued command is dead-lettered.
    #[arg(long, global = true)]
    max_attempts: Option<u32>,
    /// Overrides `RUST_LOG` for this run.
    #[arg(long, global = true, value_enum)]
    log_level: Option<LogLevel>,
    /// Output format; defaults to pretty on a terminal and JSON otherwise.
    #[arg(long, global = true, value_enum)]
    output: Option<OutputFormat>,
    #[command(subcommand)]
    command: Command,
}

impl Args {
    #[must_use]
    pub fn log_level(&self) -> Option<LogLevel> {
        self.log_level
    }

    #[must_use]
    pub fn output_format(&self) -> Option<OutputFormat> {
        self.output
    }

    /// Splits parsed CLI arguments into the command and runtime options.
    ///
    /// ```
    /// use clap::Parser;
    ///
    /// let args = trailcam::Args::try_parse_from([
    ///     "trailcam",
    ///     "--offline",
    ///     "--max-attempts",
    ///     "5",
    ///     "outbox",
    ///     "list",
    /// ])?;
    /// let (_command, options) = args.into_command_and_options()?;
    /// assert_eq!(5, options.sync_config().max_attempts());
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the runtime options are inconsistent.
    pub fn into_command_and_options(self) -> anyhow::Result<(Command, RuntimeOptions)> {
        let Args {
            state_dir,
            offline,
            fake_transport,
            send_timeout,
            max_attempts,
            log_level: _,
            output: _,
            command,
        } = self;

        if max_attempts == Some(0) {
            return Err(CliConfigError::ZeroMaxAttempts.into());
        }

        let sync = SyncConfig::builder()
            .maybe_max_attempts(max_attempts)
            .maybe_send_timeout(send_timeout)
            .build();
        let options = RuntimeOptions {
            state_dir,
            offline,
            fake_transport,
            sync,
        };
        Ok((command, options))
    }
}

/// Runtime options shared by every command.
#[derive(Debug, Clone, Builder)]
pub struct RuntimeOptions {
    #[builder(into)]
    state_dir: Option<PathBuf>,
    #[builder(default)]
    offline: bool,
    #[builder(with = |value: &str| -> std::result::Result<_, FixtureError> { value.parse() })]
    fake_transport: Option<TransportScript>,
    #[builder(default)]
    sync: SyncConfig,
}

impl RuntimeOptions {
    #[must_use]
    pub fn state_dir(&self) -> Option<&std::path::Path> {
        self.state_dir.as_deref()
    }

    #[must_use]
    pub fn connectivity(&self) -> Connectivity {
        if self.offline {
            Connectivity::Offline
        } else {
            Connectivity::Online
        }
    }

    #[must_use]
    pub fn fake_transport(&self) -> Option<&TransportScript> {
        self.fake_transport.as_ref()
    }

    #[must_use]
    pub fn sync_config(&self) -> SyncConfig {
        self.sync
    }
}

/// Supported CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Register, rename, remove or list cameras.
    Camera(CameraArgs),
    /// Store or inspect per-camera settings.
    Settings(SettingsArgs),
    /// Encode one command without sending it.
    Preview(PreviewArgs),
    /// Send one command built from a camera's stored settings.
    Send(SendArgs),
    /// Trigger a capture on several cameras at once.
    Capture(CaptureArgs),
    /// Inspect and manage queued commands.
    Outbox(OutboxArgs),
}

impl Command {
    /// Commands that first flush the outbox.
    pub(crate) fn drains_on_startup(&self) -> bool {
        matches!(self, Self::Send(_) | Self::Capture(_))
    }

    pub(crate) fn name(&self) -> &'static str {
        match self {
            Self::Camera(_args) => "camera",
            Self::Settings(_args) => "settings",
            Self::Preview(_args) => "preview",
            Self::Send(_args) => "send",
            Self::Capture(_args) => "capture",
            Self::Outbox(_args) => "outbox",
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    #[must_use]
    pub fn as_level_filter(self) -> LevelFilter {
        match self {
            Self::Error => LevelFilter::ERROR,
            Self::Warn => LevelFilter::WARN,
            Self::Info => LevelFilter::INFO,
            Self::Debug => LevelFilter::DEBUG,
            Self::Trace => LevelFilter::TRACE,
        }
    }
}

fn parse_duration(value: &str) -> Result<Duration, String> {
    humantime::parse_duration(value).map_err(|error| error.to_string())
}
