//! Error taxonomy for the frame pipeline

use thiserror::Error;

use crate::capture::frame::{PixelEncoding, SensorKind};

/// Reasons a raw frame could not be turned into a display image.
///
/// Every variant means "no image produced": the caller skips the frame and
/// keeps streaming.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConvertError {
    #[error("{kind:?} frame in unexpected format {encoding:?}")]
    UnsupportedFormat {
        kind: SensorKind,
        encoding: PixelEncoding,
    },

    #[error("invalid depth range: scale {scale}, reliable {min}..{max}")]
    InvalidDepthRange { scale: f32, min: u32, max: u32 },

    #[error(transparent)]
    BufferBounds(#[from] BoundsError),
}

/// A plane whose stride or length cannot hold the requested scanlines.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{plane} plane out of bounds: need stride >= {row_bytes} and {required} bytes, got stride {stride} and {available} bytes")]
pub struct BoundsError {
    pub plane: &'static str,
    pub row_bytes: usize,
    pub stride: usize,
    pub required: usize,
    pub available: usize,
}

/// Frame mailbox errors.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MailboxError {
    #[error("mailbox closed, frame released")]
    Closed,
}

/// Display surface errors.
#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("surface rejected {width}x{height} image: {reason}")]
    Rejected {
        width: u32,
        height: u32,
        reason: String,
    },
}

/// Errors reported by a transmitter. Logged by the worker, never propagated.
#[derive(Debug, Error)]
pub enum TransmitError {
    #[error("transport failed for {endpoint}: {reason}")]
    Transport { endpoint: String, reason: String },
}
