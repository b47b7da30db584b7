use std::io;

use anyhow::{Result, bail};
use clap::Args;
use serde::Serialize;
use tracing::{instrument, warn};

use crate::cli::ui::{CorrectionsView, Painter, PreviewView, ReceiptView};
use crate::cli::{OutputFormat, write_json_line};
use crate::codec::CapturePreset;
use crate::dispatch::{DispatchReceipt, Dispatcher};
use crate::profile::{CameraId, Selection};
use crate::protocol::CommandKind;
use crate::utils::error_chain;

/// Arguments for the `preview` command.
#[derive(Debug, Args)]
pub struct PreviewArgs {
    id: CameraId,
    /// Command to encode: general, camera, phones, emails or capture.
    kind: CommandKind,
}

impl PreviewArgs {
    #[must_use]
    pub fn new(id: CameraId, kind: CommandKind) -> Self {
        Self { id, kind }
    }
}

/// Arguments for the `send` command.
#[derive(Debug, Args)]
pub struct SendArgs {
    id: CameraId,
    /// Command built from stored settings: general, camera, phones, emails or capture.
    #[arg(required_unless_present = "preset", conflicts_with = "preset")]
    kind: Option<CommandKind>,
    /// Apply a capture preset, store it and send the camera configuration.
    #[arg(long)]
    preset: Option<CapturePreset>,
}

impl SendArgs {
    #[must_use]
    pub fn new(id: CameraId, kind: CommandKind) -> Self {
        Self {
            id,
            kind: Some(kind),
            preset: None,
        }
    }

    #[must_use]
    pub fn with_preset(id: CameraId, preset: CapturePreset) -> Self {
        Self {
            id,
            kind: None,
            preset: Some(preset),
        }
    }
}

/// Arguments for the `capture` command.
#[derive(Debug, Args)]
pub struct CaptureArgs {
    /// Cameras to trigger.
    #[arg(required_unless_present = "all")]
    ids: Vec<CameraId>,
    /// Trigger every registered camera.
    #[arg(long, conflicts_with = "ids")]
    all: bool,
}

impl CaptureArgs {
    #[must_use]
    pub fn new(ids: Vec<CameraId>) -> Self {
        Self { ids, all: false }
    }

    #[must_use]
    pub fn all() -> Self {
        Self {
            ids: Vec::new(),
            all: true,
        }
    }
}

/// Executes the `preview` command.
#[instrument(skip(dispatcher, args, out, painter), level = "info", fields(camera = %args.id, kind = %args.kind))]
pub(crate) fn run_preview<W>(
    dispatcher: &Dispatcher,
    args: &PreviewArgs,
    out: &mut W,
    output_format: OutputFormat,
    painter: &Painter,
) -> Result<()>
where
    W: io::Write,
{
    let preview = dispatcher.preview(&args.id, args.kind)?;
    match output_format {
        OutputFormat::Pretty => {
            writeln!(out, "{}", PreviewView::new(&preview, painter))?;
            if !preview.corrections.is_empty() {
                writeln!(out, "{}", CorrectionsView::new(&preview.corrections, painter))?;
            }
        }
        OutputFormat::Json => write_json_line(out, &preview)?,
    }
    Ok(())
}

/// Executes the `send` command.
#[instrument(skip(dispatcher, args, out, painter), level = "info", fields(camera = %args.id))]
pub(crate) async fn run_send<W>(
    dispatcher: &Dispatcher,
    args: &SendArgs,
    out: &mut W,
    output_format: OutputFormat,
    painter: &Painter,
) -> Result<()>
where
    W: io::Write,
{
    let receipt = match (args.preset, args.kind) {
        (Some(preset), _) => dispatcher.send_preset(&args.id, preset).await?,
        (None, Some(kind)) => dispatcher.send_settings(&args.id, kind, None).await?,
        (None, None) => bail!("either a command kind or --preset is required"),
    };
    write_receipt(&receipt, out, output_format, painter)
}

#[derive(Serialize)]
struct BatchEntry<'a> {
    camera_id: &'a CameraId,
    #[serde(skip_serializing_if = "Option::is_none")]
    receipt: Option<&'a DispatchReceipt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Executes the `capture` command, triggering each selected camera
/// independently.
#[instrument(skip(dispatcher, args, out, painter), level = "info", fields(all = args.all))]
pub(crate) async fn run_capture<W>(
    dispatcher: &Dispatcher,
    args: &CaptureArgs,
    out: &mut W,
    output_format: OutputFormat,
    painter: &Painter,
) -> Result<()>
where
    W: io::Write,
{
    let mut selection = Selection::new();
    if args.all {
        selection.select_all(&dispatcher.profiles().cameras()?);
    } else {
        for id in &args.ids {
            selection.select(id.clone());
        }
    }
    if selection.is_empty() {
        bail!("no cameras selected");
    }

    let outcomes = dispatcher
        .trigger_batch(&selection, CommandKind::TriggerCapture)
        .await;
    let mut failures = 0;
    let mut entries = Vec::with_capacity(outcomes.len());
    for outcome in &outcomes {
        let error = match &outcome.result {
            Ok(_receipt) => None,
            Err(error) => {
                failures += 1;
                warn!(camera = %outcome.camera_id, %error, "capture not dispatched");
                Some(error_chain(error))
            }
        };
        entries.push(BatchEntry {
            camera_id: &outcome.camera_id,
            receipt: outcome.result.as_ref().ok(),
            error,
        });
    }

    match output_format {
        OutputFormat::Pretty => {
            for entry in &entries {
                match (entry.receipt, &entry.error) {
                    (Some(receipt), _) => writeln!(out, "{}", ReceiptView::new(receipt, painter))?,
                    (None, Some(error)) => writeln!(
                        out,
                        "{} {} {}",
                        painter.failed("Failed"),
                        painter.identifier(entry.camera_id.as_str()),
                        painter.detail(error)
                    )?,
                    (None, None) => {}
                }
            }
        }
        OutputFormat::Json => write_json_line(out, &entries)?,
    }

    if failures > 0 {
        bail!("capture failed for {failures} of {} camera(s)", outcomes.len());
    }
    Ok(())
}

fn write_receipt<W>(
    receipt: &DispatchReceipt,
    out: &mut W,
    output_format: OutputFormat,
    painter: &Painter,
) -> Result<()>
where
    W: io::Write,
{
    match output_format {
        OutputFormat::Pretty => {
            writeln!(out, "{}", ReceiptView::new(receipt, painter))?;
            if !receipt.corrections.is_empty() {
                writeln!(out, "{}", CorrectionsView::new(&receipt.corrections, painter))?;
            }
        }
        OutputFormat::Json => write_json_line(out, receipt)?,
    }
    Ok(())
}
