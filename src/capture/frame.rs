use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Classification of a camera frame source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorKind {
    Color,
    Depth,
    Infrared,
}

/// Raw bit layout of one pixel sample as delivered by the capture layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelEncoding {
    Gray8,
    Gray16,
    Depth16,
    Bgra8,
    Rgba8,
    Yuy2,
    Nv12,
}

impl PixelEncoding {
    /// Bytes per pixel for packed encodings, `None` for planar or subsampled ones.
    pub fn bytes_per_pixel(self) -> Option<usize> {
        match self {
            PixelEncoding::Gray8 => Some(1),
            PixelEncoding::Gray16 | PixelEncoding::Depth16 => Some(2),
            PixelEncoding::Bgra8 | PixelEncoding::Rgba8 => Some(4),
            PixelEncoding::Yuy2 | PixelEncoding::Nv12 => None,
        }
    }
}

/// How the alpha channel of a color frame is to be interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlphaMode {
    #[default]
    Premultiplied,
    Straight,
    Ignore,
}

/// Depth calibration reported by the sensor.
///
/// Reliable bounds are in raw sensor units; `scale` converts one raw unit to
/// meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthParams {
    pub scale: f32,
    pub min_reliable: u32,
    pub max_reliable: u32,
}

/// Sensor kind together with the parameters its conversion needs
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameSource {
    Color { alpha: AlphaMode },
    Depth(DepthParams),
    Infrared,
}

impl FrameSource {
    pub fn kind(&self) -> SensorKind {
        match self {
            FrameSource::Color { .. } => SensorKind::Color,
            FrameSource::Depth(_) => SensorKind::Depth,
            FrameSource::Infrared => SensorKind::Infrared,
        }
    }
}

/// Borrowed view of one sensor sample, valid for a single conversion call
#[derive(Debug, Clone, Copy)]
pub struct RawFrame<'a> {
    pub width: u32,
    pub height: u32,
    /// Row pitch in bytes, at least `width * bytes_per_pixel`
    pub stride: usize,
    pub encoding: PixelEncoding,
    pub source: FrameSource,
    pub data: &'a [u8],
}

impl RawFrame<'_> {
    pub fn kind(&self) -> SensorKind {
        self.source.kind()
    }
}

/// Captured frame owned by the capture side
#[derive(Clone)]
pub struct SensorFrame {
    /// Immutable frame data - can be shared across threads without copying
    pub data: Bytes,

    /// Frame metadata
    pub meta: Arc<FrameMetadata>,

    /// Capture timestamp for latency tracking
    pub timestamp: Instant,
}

/// Frame metadata
#[derive(Debug, Clone)]
pub struct FrameMetadata {
    pub sequence: u64,
    pub width: u32,
    pub height: u32,
    pub stride: usize,
    pub encoding: PixelEncoding,
    pub source: FrameSource,
    pub device_timestamp: Option<Duration>, // Hardware timestamp if available
}

impl SensorFrame {
    /// Borrow the frame for conversion.
    pub fn raw(&self) -> RawFrame<'_> {
        RawFrame {
            width: self.meta.width,
            height: self.meta.height,
            stride: self.meta.stride,
            encoding: self.meta.encoding,
            source: self.meta.source,
            data: &self.data,
        }
    }
}
