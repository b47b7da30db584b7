use std::fmt::{self, Display, Formatter};

use super::painter::Painter;
use super::table::Table;
use crate::profile::CameraProfile;

/// Registered cameras as a table.
pub(crate) struct CameraListView<'a> {
    cameras: &'a [CameraProfile],
    painter: &'a Painter,
}

impl<'a> CameraListView<'a> {
    pub(crate) fn new(cameras: &'a [CameraProfile], painter: &'a Painter) -> Self {
        Self { cameras, painter }
    }
}

impl Display for CameraListView<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.cameras.is_empty() {
            return write!(f, "{}", self.painter.detail("No cameras registered."));
        }

        let rows = self
            .cameras
            .iter()
            .map(|camera| {
                vec![
                    self.painter.identifier(camera.id().as_str()),
                    camera.name().to_string(),
                    camera.phone().to_string(),
                    camera.tier().to_string(),
                ]
            })
            .collect();
        writeln!(f, "{}", self.painter.heading("Cameras"))?;
        write!(f, "{}", Table::grid(["id", "name", "phone", "tier"], rows))
    }
}
