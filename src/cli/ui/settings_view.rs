use std::fmt::{self, Display, Formatter};

use super::painter::Painter;
use super::table::Table;
use crate::profile::CameraProfile;
use crate::settings::{Correction, ValidatedSnapshot};
use crate::utils::format_optional;

/// Effective settings of one camera after validation.
pub(crate) struct SettingsView<'a> {
    camera: &'a CameraProfile,
    snapshot: &'a ValidatedSnapshot,
    corrections: &'a [Correction],
    painter: &'a Painter,
}

impl<'a> SettingsView<'a> {
    pub(crate) fn new(
        camera: &'a CameraProfile,
        snapshot: &'a ValidatedSnapshot,
        corrections: &'a [Correction],
        painter: &'a Painter,
    ) -> Self {
        Self {
            camera,
            snapshot,
            corrections,
            painter,
        }
    }
}

impl Display for SettingsView<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} {}",
            self.painter.heading(format!("Settings for {}", self.camera.name())),
            self.painter.detail(format!("({}, {})", self.camera.id(), self.snapshot.tier()))
        )?;
        let field_names: Vec<String> = self.snapshot.iter().map(|(field, _)| field.to_string()).collect();
        let rows = self
            .snapshot
            .iter()
            .zip(&field_names)
            .map(|((_, value), name)| (name.as_str(), value.to_string()))
            .collect();
        write!(f, "{}", Table::key_value(self.painter, rows))?;
        if !self.corrections.is_empty() {
            write!(f, "\n{}", CorrectionsView::new(self.corrections, self.painter))?;
        }
        Ok(())
    }
}

/// Values the validator replaced or dropped.
pub(crate) struct CorrectionsView<'a> {
    corrections: &'a [Correction],
    painter: &'a Painter,
}

impl<'a> CorrectionsView<'a> {
    pub(crate) fn new(corrections: &'a [Correction], painter: &'a Painter) -> Self {
        Self {
            corrections,
            painter,
        }
    }
}

impl Display for CorrectionsView<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.painter.corrected("Corrections"))?;
        for correction in self.corrections {
            write!(
                f,
                "\n  {} {} -> {}  {}",
                self.painter.identifier(correction.field().to_string()),
                format_optional(correction.rejected()),
                format_optional(correction.substituted()),
                self.painter.detail(correction.reason().to_string())
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;

    use super::*;
    use crate::settings::{CameraTier, SettingsSnapshot, Validator};

    #[test]
    fn corrections_list_rejected_and_substituted_values() {
        let painter = Painter::new(false);
        let snapshot = SettingsSnapshot::from_form([("videoDuration", "45"), ("sendVideoSwitch", "on")])
            .expect("known fields");
        let validated = Validator::new(CameraTier::Max).normalize(&snapshot, None);
        let rendered = CorrectionsView::new(&validated.corrections, &painter).to_string();

        assert!(rendered.starts_with("Corrections"));
        assert!(rendered.contains("sendVideoSwitch"));
    }

    #[test]
    fn empty_corrections_render_only_the_heading() {
        let painter = Painter::new(false);
        assert_snapshot!(CorrectionsView::new(&[], &painter).to_string(), @"Corrections");
    }
}
