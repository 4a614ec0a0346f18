//! Display-ready image buffer

use crate::convert::scanline::{check_plane, OUTPUT_BYTES_PER_PIXEL};
use crate::error::BoundsError;

/// Row pitch alignment for display images, matching typical texture upload rules
pub const ROW_ALIGNMENT: usize = 64;

/// Owned BGRA8 image with premultiplied alpha.
///
/// Rows are `stride` bytes apart; only the first `width * 4` bytes of a row
/// hold pixels.
#[derive(Clone, PartialEq, Eq)]
pub struct DisplayImage {
    width: u32,
    height: u32,
    stride: usize,
    data: Vec<u8>,
}

impl std::fmt::Debug for DisplayImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisplayImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("stride", &self.stride)
            .finish_non_exhaustive()
    }
}

impl DisplayImage {
    /// Fully transparent image.
    ///
    /// Fails when the buffer size is not addressable.
    pub fn new(width: u32, height: u32) -> Result<Self, BoundsError> {
        let row_bytes = (width as usize).checked_mul(OUTPUT_BYTES_PER_PIXEL);
        let stride = row_bytes
            .and_then(|row| row.div_ceil(ROW_ALIGNMENT).checked_mul(ROW_ALIGNMENT));
        let len = stride
            .and_then(|stride| stride.checked_mul(height as usize))
            .filter(|&len| len <= isize::MAX as usize);

        match (row_bytes, stride, len) {
            (Some(_), Some(stride), Some(len)) => Ok(Self {
                width,
                height,
                stride,
                data: vec![0; len],
            }),
            _ => Err(BoundsError {
                plane: "output",
                row_bytes: row_bytes.unwrap_or(usize::MAX),
                stride: stride.unwrap_or(usize::MAX),
                required: usize::MAX,
                available: 0,
            }),
        }
    }

    /// Copy already display-ready BGRA rows out of a strided source.
    ///
    /// The source is checked before anything is allocated.
    pub fn copy_from(
        width: u32,
        height: u32,
        src: &[u8],
        src_stride: usize,
    ) -> Result<Self, BoundsError> {
        let row_bytes = check_plane(
            "input",
            src.len(),
            src_stride,
            width as usize,
            OUTPUT_BYTES_PER_PIXEL,
            height as usize,
        )?;
        let mut image = Self::new(width, height)?;
        if row_bytes == 0 {
            return Ok(image);
        }

        let stride = image.stride;
        for (src_row, dst_row) in src
            .chunks(src_stride)
            .zip(image.data.chunks_mut(stride))
            .take(height as usize)
        {
            dst_row[..row_bytes].copy_from_slice(&src_row[..row_bytes]);
        }
        Ok(image)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row pitch in bytes
    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Packed `0xAARRGGBB` value at (x, y), `None` outside the image
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = y as usize * self.stride + x as usize * OUTPUT_BYTES_PER_PIXEL;
        let bytes = self.data.get(offset..offset + OUTPUT_BYTES_PER_PIXEL)?;
        Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Pixel rows without stride padding
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        let row_bytes = self.width as usize * OUTPUT_BYTES_PER_PIXEL;
        self.data
            .chunks(self.stride.max(1))
            .take(self.height as usize)
            .map(move |row| &row[..row_bytes])
    }

    /// Tightly packed copy, `width * height * 4` bytes
    pub fn to_packed(&self) -> Vec<u8> {
        let mut packed =
            Vec::with_capacity(self.width as usize * self.height as usize * OUTPUT_BYTES_PER_PIXEL);
        for row in self.rows() {
            packed.extend_from_slice(row);
        }
        packed
    }
}
