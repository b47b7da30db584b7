use std::fmt::{self, Display, Formatter};

use time::format_description::well_known::Rfc3339;

use super::painter::Painter;
use super::table::Table;
use crate::dispatch::{CommandPreview, DispatchReceipt};
use crate::outbox::PendingMessage;
use crate::sync::DrainReport;

/// One-line summary of a dispatched command.
pub(crate) struct ReceiptView<'a> {
    receipt: &'a DispatchReceipt,
    painter: &'a Painter,
}

impl<'a> ReceiptView<'a> {
    pub(crate) fn new(receipt: &'a DispatchReceipt, painter: &'a Painter) -> Self {
        Self { receipt, painter }
    }
}

impl Display for ReceiptView<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let camera = &self.receipt.camera;
        let status = self.painter.send_outcome(&self.receipt.outcome);
        write!(
            f,
            "{status} {} to {} {}",
            self.receipt.kind,
            self.painter.identifier(camera.name()),
            self.painter.detail(format!("[{}] {}", camera.id(), self.receipt.command))
        )
    }
}

/// An encoded command shown before sending.
pub(crate) struct PreviewView<'a> {
    preview: &'a CommandPreview,
    painter: &'a Painter,
}

impl<'a> PreviewView<'a> {
    pub(crate) fn new(preview: &'a CommandPreview, painter: &'a Painter) -> Self {
        Self { preview, painter }
    }
}

impl Display for PreviewView<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}",
            self.painter.heading(format!(
                "{} for {}",
                self.preview.kind,
                self.preview.camera.name()
            ))
        )?;
        writeln!(f, "{}", self.painter.identifier(self.preview.command.to_string()))?;
        write!(
            f,
            "{}",
            self.painter.detail(format!(
                "{} characters, {} SMS",
                self.preview.chars, self.preview.segments
            ))
        )
    }
}

/// Counters of one drain pass.
pub(crate) struct DrainReportView<'a> {
    report: &'a DrainReport,
    painter: &'a Painter,
}

impl<'a> DrainReportView<'a> {
    pub(crate) fn new(report: &'a DrainReport, painter: &'a Painter) -> Self {
        Self { report, painter }
    }
}

impl Display for DrainReportView<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let report = self.report;
        let status = self.painter.drain_status(report.status);
        writeln!(f, "{status}")?;
        write!(
            f,
            "{}",
            Table::key_value(
                self.painter,
                vec![
                    ("delivered", report.delivered.to_string()),
                    ("failed", report.failed.to_string()),
                    ("dead letters", report.dead_lettered.to_string()),
                    ("skipped", report.skipped.to_string()),
                ],
            )
        )
    }
}

/// Queued commands, oldest first.
pub(crate) struct OutboxView<'a> {
    messages: &'a [PendingMessage],
    painter: &'a Painter,
}

impl<'a> OutboxView<'a> {
    pub(crate) fn new(messages: &'a [PendingMessage], painter: &'a Painter) -> Self {
        Self { messages, painter }
    }
}

impl Display for OutboxView<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.messages.is_empty() {
            return write!(f, "{}", self.painter.detail("Outbox is empty."));
        }

        let rows = self
            .messages
            .iter()
            .map(|message| {
                vec![
                    format!("#{}", message.id()),
                    message.camera_id().to_string(),
                    message.body().to_string(),
                    format!("{}/{}", message.attempts(), message.max_attempts()),
                    message
                        .created_at()
                        .format(&Rfc3339)
                        .unwrap_or_else(|_error| "-".to_string()),
                    self.painter.message_state(message),
                ]
            })
            .collect();
        writeln!(f, "{}", self.painter.heading("Outbox"))?;
        write!(
            f,
            "{}",
            Table::grid(
                ["id", "camera", "command", "attempts", "queued", "state"],
                rows
            )
        )
    }
}
