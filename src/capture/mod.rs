pub mod format;
pub mod frame;
pub mod synthetic;

pub use format::{negotiate_encoding, renderable_formats, FrameFormat, Subtype};
pub use frame::{
    AlphaMode, DepthParams, FrameSource, PixelEncoding, RawFrame, SensorFrame, SensorKind,
};
pub use synthetic::SyntheticCapture;
