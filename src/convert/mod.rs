pub mod converter;
pub mod lut;
pub mod pseudo_color;
pub mod scanline;

pub use converter::PixelConverter;
pub use lut::{ColorRampTable, COLOR_RAMPS};
