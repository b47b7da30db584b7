mod encoder;
mod presets;
mod tables;
mod wire;

pub use self::encoder::CommandEncoder;
pub use self::presets::{CapturePreset, PresetError};
pub(crate) use self::tables::nearest_allowed;
pub use self::tables::{
    CaptureMode, Choice, FlashLed, FtpMode, HourSystem, ImageResolution, ImageSize, NightMode,
    PirSensitivity, SmsControl, VideoResolution, burst_to_send,
};
pub(crate) use self::wire::RESERVED;
pub use self::wire::{WireCodec, WireCodecError, WireCommand};
