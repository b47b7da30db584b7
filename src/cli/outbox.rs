use std::io;

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;
use tracing::{instrument, warn};

use crate::cli::ui::{DrainReportView, OutboxView, Painter};
use crate::cli::{OutputFormat, write_json_line};
use crate::outbox::{MessageId, PendingMessage};
use crate::sync::{DrainReport, SyncEngine};

/// Arguments for the `outbox` command.
#[derive(Debug, Args)]
pub struct OutboxArgs {
    #[command(subcommand)]
    action: OutboxAction,
}

impl OutboxArgs {
    #[must_use]
    pub fn new(action: OutboxAction) -> Self {
        Self { action }
    }
}

#[derive(Debug, Subcommand)]
pub enum OutboxAction {
    /// List queued commands, dead letters included.
    List,
    /// Attempt every queued command once.
    Drain,
    /// Reset the attempt counter of a message.
    Retry { id: MessageId },
    /// Drop a message from the outbox.
    Delete { id: MessageId },
}

#[derive(Serialize)]
struct Deleted {
    deleted: MessageId,
}

/// Executes the `outbox` command.
#[instrument(skip(engine, args, out, painter), level = "info", fields(?output_format))]
pub(crate) async fn run<W>(
    engine: &SyncEngine,
    args: &OutboxArgs,
    out: &mut W,
    output_format: OutputFormat,
    painter: &Painter,
) -> Result<()>
where
    W: io::Write,
{
    match &args.action {
        OutboxAction::List => {
            let messages = engine.pending().await?;
            match output_format {
                OutputFormat::Pretty => writeln!(out, "{}", OutboxView::new(&messages, painter))?,
                OutputFormat::Json => write_json_line(out, &messages)?,
            }
        }
        OutboxAction::Drain => {
            let report = engine.drain_queue().await?;
            warn_dead_letters(&report);
            match output_format {
                OutputFormat::Pretty => {
                    writeln!(out, "{}", DrainReportView::new(&report, painter))?;
                }
                OutputFormat::Json => write_json_line(out, &report)?,
            }
        }
        OutboxAction::Retry { id } => {
            let message = engine.retry_message(*id).await?;
            write_message(&message, "Reset", out, output_format, painter)?;
        }
        OutboxAction::Delete { id } => {
            engine.delete_message(*id).await?;
            match output_format {
                OutputFormat::Pretty => writeln!(
                    out,
                    "{} {}",
                    painter.confirmed("Deleted"),
                    painter.identifier(format!("#{id}"))
                )?,
                OutputFormat::Json => write_json_line(out, &Deleted { deleted: *id })?,
            }
        }
    }
    Ok(())
}

/// Logs one warning per dead letter with the commands that resolve it.
pub(crate) fn warn_dead_letters(report: &DrainReport) {
    for id in &report.dead_letters {
        warn!(
            message_id = %id,
            "command exhausted its attempts; run `trailcam outbox retry {id}` or `trailcam outbox delete {id}`"
        );
    }
}

fn write_message<W>(
    message: &PendingMessage,
    verb: &str,
    out: &mut W,
    output_format: OutputFormat,
    painter: &Painter,
) -> Result<()>
where
    W: io::Write,
{
    match output_format {
        OutputFormat::Pretty => writeln!(
            out,
            "{} {} {}",
            painter.confirmed(verb),
            painter.identifier(format!("#{}", message.id())),
            painter.detail(format!(
                "({} for {}, attempts {}/{})",
                message.body(),
                message.camera_id(),
                message.attempts(),
                message.max_attempts()
            ))
        )?,
        OutputFormat::Json => write_json_line(out, message)?,
    }
    Ok(())
}
