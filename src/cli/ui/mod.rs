mod camera_view;
mod delivery_view;
mod painter;
mod settings_view;
mod table;

pub(crate) use self::camera_view::CameraListView;
pub(crate) use self::delivery_view::{DrainReportView, OutboxView, PreviewView, ReceiptView};
pub(crate) use self::painter::Painter;
pub(crate) use self::settings_view::{CorrectionsView, SettingsView};
