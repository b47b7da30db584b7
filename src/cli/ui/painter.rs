use owo_colors::{OwoColorize, Style as OwoStyle};

use crate::outbox::PendingMessage;
use crate::sync::{DrainStatus, SendOutcome};

/// How a piece of terminal output relates to the command's effect.
#[derive(Debug, Clone, Copy)]
enum Tone {
    Heading,
    Confirmed,
    Deferred,
    Failed,
    Corrected,
    Identifier,
    Detail,
}

impl Tone {
    fn style(self) -> OwoStyle {
        match self {
            Self::Heading => OwoStyle::new().bold().cyan(),
            Self::Confirmed => OwoStyle::new().bold().green(),
            Self::Deferred => OwoStyle::new().bold().yellow(),
            Self::Failed => OwoStyle::new().bold().red(),
            Self::Corrected => OwoStyle::new().magenta(),
            Self::Identifier => OwoStyle::new().bold(),
            Self::Detail => OwoStyle::new().dimmed(),
        }
    }
}

/// Styles camera, delivery and outbox output for the terminal.
#[derive(Debug)]
pub(crate) struct Painter {
    use_colour: bool,
}

impl Painter {
    pub(crate) fn new(use_colour: bool) -> Self {
        Self { use_colour }
    }

    pub(crate) fn heading<T: AsRef<str>>(&self, text: T) -> String {
        self.paint(text.as_ref(), Tone::Heading)
    }

    /// A change that took effect: a handoff, a saved camera, a removal.
    pub(crate) fn confirmed<T: AsRef<str>>(&self, text: T) -> String {
        self.paint(text.as_ref(), Tone::Confirmed)
    }

    /// Queued for a later drain.
    pub(crate) fn deferred<T: AsRef<str>>(&self, text: T) -> String {
        self.paint(text.as_ref(), Tone::Deferred)
    }

    pub(crate) fn failed<T: AsRef<str>>(&self, text: T) -> String {
        self.paint(text.as_ref(), Tone::Failed)
    }

    /// A settings value the validator replaced.
    pub(crate) fn corrected<T: AsRef<str>>(&self, text: T) -> String {
        self.paint(text.as_ref(), Tone::Corrected)
    }

    pub(crate) fn identifier<T: AsRef<str>>(&self, text: T) -> String {
        self.paint(text.as_ref(), Tone::Identifier)
    }

    pub(crate) fn detail<T: AsRef<str>>(&self, text: T) -> String {
        self.paint(text.as_ref(), Tone::Detail)
    }

    pub(crate) fn send_outcome(&self, outcome: &SendOutcome) -> String {
        match outcome {
            SendOutcome::Delivered { handoff } => self.confirmed(format!("Sent ({handoff})")),
            SendOutcome::Deferred { message_id, reason } => {
                self.deferred(format!("Queued as #{message_id} ({reason})"))
            }
        }
    }

    pub(crate) fn drain_status(&self, status: DrainStatus) -> String {
        match status {
            DrainStatus::Completed => self.confirmed("Drain completed"),
            DrainStatus::Coalesced => self.detail("Drain already running"),
            DrainStatus::Offline => self.deferred("Offline, drain stopped"),
        }
    }

    pub(crate) fn message_state(&self, message: &PendingMessage) -> String {
        if message.is_dead_letter() {
            self.failed("dead letter")
        } else {
            self.deferred("pending")
        }
    }

    fn paint(&self, text: &str, tone: Tone) -> String {
        if self.use_colour {
            format!("{}", text.style(tone.style()))
        } else {
            text.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::outbox::MessageId;
    use crate::sync::DeferReason;
    use crate::transport::Handoff;

    #[rstest]
    #[case::heading(Tone::Heading)]
    #[case::confirmed(Tone::Confirmed)]
    #[case::deferred(Tone::Deferred)]
    #[case::failed(Tone::Failed)]
    #[case::corrected(Tone::Corrected)]
    #[case::identifier(Tone::Identifier)]
    #[case::detail(Tone::Detail)]
    fn colour_is_only_applied_when_enabled(#[case] tone: Tone) {
        assert_eq!("cam-1", Painter::new(false).paint("cam-1", tone));

        let styled = Painter::new(true).paint("cam-1", tone);
        assert_ne!("cam-1", styled);
        assert!(styled.contains("cam-1"));
    }

    #[test]
    fn send_outcomes_name_the_handoff_or_the_queue_slot() {
        let painter = Painter::new(false);
        assert_eq!(
            "Sent (tentative)",
            painter.send_outcome(&SendOutcome::Delivered {
                handoff: Handoff::Tentative
            })
        );
        assert_eq!(
            "Queued as #4 (offline)",
            painter.send_outcome(&SendOutcome::Deferred {
                message_id: MessageId::from(4),
                reason: DeferReason::Offline,
            })
        );
    }

    #[rstest]
    #[case(DrainStatus::Completed, "Drain completed")]
    #[case(DrainStatus::Coalesced, "Drain already running")]
    #[case(DrainStatus::Offline, "Offline, drain stopped")]
    fn drain_statuses_read_as_sentences(#[case] status: DrainStatus, #[case] expected: &str) {
        assert_eq!(expected, Painter::new(false).drain_status(status));
    }
}
