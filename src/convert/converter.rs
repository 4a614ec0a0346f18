use std::time::Instant;

use tracing::{debug, instrument};

use crate::capture::frame::{AlphaMode, FrameSource, PixelEncoding, RawFrame};
use crate::convert::lut::{ColorRampTable, COLOR_RAMPS};
use crate::convert::pseudo_color::{infrared16_row, infrared8_row, DepthMapping};
use crate::convert::scanline::{check_plane, map_pixels, transform_scanlines, Plane, PlaneMut};
use crate::display::image::DisplayImage;
use crate::error::ConvertError;

/// Turns raw sensor frames into premultiplied BGRA display images
#[derive(Clone, Copy)]
pub struct PixelConverter {
    table: &'static ColorRampTable,
}

impl Default for PixelConverter {
    fn default() -> Self {
        Self::new(&COLOR_RAMPS)
    }
}

impl PixelConverter {
    pub fn new(table: &'static ColorRampTable) -> Self {
        Self { table }
    }

    /// Convert one frame. Any error means the frame is skipped.
    #[instrument(skip(self, frame), fields(kind = ?frame.kind(), encoding = ?frame.encoding))]
    pub fn convert(&self, frame: &RawFrame<'_>) -> Result<DisplayImage, ConvertError> {
        let start = Instant::now();
        let unsupported = || ConvertError::UnsupportedFormat {
            kind: frame.kind(),
            encoding: frame.encoding,
        };

        let image = match (frame.source, frame.encoding) {
            (FrameSource::Color { alpha }, PixelEncoding::Bgra8) => match alpha {
                AlphaMode::Premultiplied => DisplayImage::copy_from(
                    frame.width,
                    frame.height,
                    frame.data,
                    frame.stride,
                )?,
                AlphaMode::Straight => self.transform(frame, 4, premultiply_row)?,
                AlphaMode::Ignore => self.transform(frame, 4, opaque_row)?,
            },
            (FrameSource::Depth(params), PixelEncoding::Depth16 | PixelEncoding::Gray16) => {
                let mapping = DepthMapping::new(&params)?;
                let table = self.table;
                self.transform(frame, 2, |row_in, row_out| {
                    mapping.map_row(table, row_in, row_out)
                })?
            }
            (FrameSource::Infrared, PixelEncoding::Gray8) => {
                let table = self.table;
                self.transform(frame, 1, |row_in, row_out| {
                    infrared8_row(table, row_in, row_out)
                })?
            }
            (FrameSource::Infrared, PixelEncoding::Gray16) => {
                let table = self.table;
                self.transform(frame, 2, |row_in, row_out| {
                    infrared16_row(table, row_in, row_out)
                })?
            }
            _ => return Err(unsupported()),
        };

        let elapsed = start.elapsed();
        debug!(
            "Converted {}x{} frame in {}us",
            image.width(),
            image.height(),
            elapsed.as_micros()
        );
        metrics::histogram!("convert_time_us").record(elapsed.as_micros() as f64);
        Ok(image)
    }

    fn transform<F>(
        &self,
        frame: &RawFrame<'_>,
        bytes_per_pixel: usize,
        transform: F,
    ) -> Result<DisplayImage, ConvertError>
    where
        F: FnMut(&[u8], &mut [u8]),
    {
        // Validate the header against the buffer before sizing the output
        check_plane(
            "input",
            frame.data.len(),
            frame.stride,
            frame.width as usize,
            bytes_per_pixel,
            frame.height as usize,
        )?;
        let mut image = DisplayImage::new(frame.width, frame.height)?;
        let stride = image.stride();
        transform_scanlines(
            frame.width as usize,
            frame.height as usize,
            Plane {
                data: frame.data,
                stride: frame.stride,
                bytes_per_pixel,
            },
            PlaneMut {
                data: image.as_bytes_mut(),
                stride,
            },
            transform,
        )?;
        Ok(image)
    }
}

/// Scale B, G, R by alpha, rounding to nearest
fn premultiply_row(row_in: &[u8], row_out: &mut [u8]) {
    map_pixels(row_in, row_out, 4, |px| {
        let a = px[3] as u32;
        let scale = |c: u8| (c as u32 * a + 127) / 255;
        scale(px[0]) | scale(px[1]) << 8 | scale(px[2]) << 16 | a << 24
    });
}

fn opaque_row(row_in: &[u8], row_out: &mut [u8]) {
    map_pixels(row_in, row_out, 4, |px| {
        u32::from_le_bytes([px[0], px[1], px[2], 0xFF])
    });
}
