use std::io;

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;
use tracing::instrument;

use crate::cli::ui::{CorrectionsView, Painter, SettingsView};
use crate::cli::{OutputFormat, write_json_line};
use crate::dispatch::Dispatcher;
use crate::profile::{CameraId, CameraProfile, RawSettings};
use crate::settings::{Correction, parse_settings_entry};

/// Arguments for the `settings` command.
#[derive(Debug, Args)]
pub struct SettingsArgs {
    #[command(subcommand)]
    action: SettingsAction,
}

impl SettingsArgs {
    #[must_use]
    pub fn new(action: SettingsAction) -> Self {
        Self { action }
    }
}

#[derive(Debug, Subcommand)]
pub enum SettingsAction {
    /// Merge `key=value` entries into a camera's stored settings.
    ///
    /// Later entries win conflicts between capture mode and the send flags.
    Set {
        id: CameraId,
        #[arg(required = true, value_parser = parse_settings_entry)]
        entries: Vec<(String, String)>,
    },
    /// Show the effective settings after validation.
    Show { id: CameraId },
}

#[derive(Serialize)]
struct SettingsReport<'a> {
    camera: &'a CameraProfile,
    settings: RawSettings,
    corrections: &'a [Correction],
}

/// Executes the `settings` command.
#[instrument(skip(dispatcher, args, out, painter), level = "info", fields(?output_format))]
pub(crate) fn run<W>(
    dispatcher: &Dispatcher,
    args: &SettingsArgs,
    out: &mut W,
    output_format: OutputFormat,
    painter: &Painter,
) -> Result<()>
where
    W: io::Write,
{
    let (camera, validated) = match &args.action {
        SettingsAction::Set { id, entries } => {
            let validated = dispatcher.update_settings(id, entries)?;
            (dispatcher.profiles().camera(id)?, validated)
        }
        SettingsAction::Show { id } => dispatcher.validated_settings(id)?,
    };

    match output_format {
        OutputFormat::Pretty => match &args.action {
            SettingsAction::Set { .. } => {
                writeln!(
                    out,
                    "{} {}",
                    painter.confirmed("Saved settings for"),
                    painter.identifier(camera.name())
                )?;
                if !validated.corrections.is_empty() {
                    writeln!(out, "{}", CorrectionsView::new(&validated.corrections, painter))?;
                }
            }
            SettingsAction::Show { .. } => {
                writeln!(
                    out,
                    "{}",
                    SettingsView::new(&camera, &validated.snapshot, &validated.corrections, painter)
                )?;
            }
        },
        OutputFormat::Json => write_json_line(
            out,
            &SettingsReport {
                camera: &camera,
                settings: validated.snapshot.to_snapshot().to_form(),
                corrections: &validated.corrections,
            },
        )?,
    }
    Ok(())
}
