pub(crate) mod camera;
pub(crate) mod command;
pub(crate) mod outbox;
pub(crate) mod send;
pub(crate) mod settings;
pub(crate) mod ui;

use std::io;

use anyhow::Result;
use serde::Serialize;

pub use self::camera::{CameraAction, CameraArgs};
pub use self::command::{Args, Command, LogLevel, OutputFormat, RuntimeOptions};
pub use self::outbox::{OutboxAction, OutboxArgs};
pub use self::send::{CaptureArgs, PreviewArgs, SendArgs};
pub use self::settings::{SettingsAction, SettingsArgs};

pub(crate) fn write_json_line(out: &mut impl io::Write, value: &impl Serialize) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}
