use std::io;

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;
use tracing::instrument;

use crate::cli::ui::{CameraListView, Painter};
use crate::cli::{OutputFormat, write_json_line};
use crate::profile::{CameraId, CameraProfile, ProfileStore};
use crate::settings::CameraTier;

/// Arguments for the `camera` command.
#[derive(Debug, Args)]
pub struct CameraArgs {
    #[command(subcommand)]
    action: CameraAction,
}

impl CameraArgs {
    #[must_use]
    pub fn new(action: CameraAction) -> Self {
        Self { action }
    }
}

#[derive(Debug, Subcommand)]
pub enum CameraAction {
    /// Register a camera by the phone number of its SIM card.
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
        /// Feature tier: base (alias standard), pro or max.
        #[arg(long, default_value_t = CameraTier::Base)]
        tier: CameraTier,
    },
    /// Rename a camera.
    Rename { id: CameraId, name: String },
    /// Remove a camera and its stored settings.
    Remove { id: CameraId },
    /// List registered cameras.
    List,
}

#[derive(Serialize)]
struct CameraChange<'a> {
    action: &'static str,
    camera: &'a CameraProfile,
}

/// Executes the `camera` command.
#[instrument(skip(profiles, args, out, painter), level = "info", fields(?output_format))]
pub(crate) fn run<W>(
    profiles: &dyn ProfileStore,
    args: &CameraArgs,
    out: &mut W,
    output_format: OutputFormat,
    painter: &Painter,
) -> Result<()>
where
    W: io::Write,
{
    let (action, camera) = match &args.action {
        CameraAction::Add { name, phone, tier } => {
            ("added", profiles.register(name, phone, *tier)?)
        }
        CameraAction::Rename { id, name } => ("renamed", profiles.rename(id, name)?),
        CameraAction::Remove { id } => ("removed", profiles.remove(id)?),
        CameraAction::List => {
            let cameras = profiles.cameras()?;
            match output_format {
                OutputFormat::Pretty => {
                    writeln!(out, "{}", CameraListView::new(&cameras, painter))?;
                }
                OutputFormat::Json => write_json_line(out, &cameras)?,
            }
            return Ok(());
        }
    };

    match output_format {
        OutputFormat::Pretty => {
            writeln!(
                out,
                "{} {} {}",
                painter.confirmed(capitalised(action)),
                painter.identifier(camera.id().as_str()),
                painter.detail(format!("({}, {}, {})", camera.name(), camera.phone(), camera.tier()))
            )?;
        }
        OutputFormat::Json => write_json_line(
            out,
            &CameraChange {
                action,
                camera: &camera,
            },
        )?,
    }
    Ok(())
}

fn capitalised(word: &str) -> String {
    let mut chars = word.chars();
    chars
        .next()
        .map(|first| first.to_ascii_uppercase().to_string() + chars.as_str())
        .unwrap_or_default()
}
