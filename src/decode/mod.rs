//! Decode collaborator seam

/// Extracts structured text (e.g. a 2-D barcode) from a rendered frame.
///
/// `pixels` is tightly packed BGRA8, `width * height * 4` bytes.
pub trait FrameDecoder: Send + Sync {
    fn decode(&self, pixels: &[u8], width: u32, height: u32) -> Option<String>;
}

/// Never finds anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDecoder;

impl FrameDecoder for NullDecoder {
    fn decode(&self, _pixels: &[u8], _width: u32, _height: u32) -> Option<String> {
        None
    }
}

impl<F> FrameDecoder for F
where
    F: Fn(&[u8], u32, u32) -> Option<String> + Send + Sync,
{
    fn decode(&self, pixels: &[u8], width: u32, height: u32) -> Option<String> {
        self(pixels, width, height)
    }
}
