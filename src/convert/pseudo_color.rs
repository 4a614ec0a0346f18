//! Per-scanline pseudo-color mappings for depth and infrared samples

use crate::capture::frame::DepthParams;
use crate::convert::lut::ColorRampTable;
use crate::convert::scanline::map_pixels;
use crate::error::ConvertError;

/// Output for depth samples carrying no measurement
pub const NO_DEPTH: u32 = 0;

/// Depth-to-closeness mapping precomputed from the sensor calibration.
#[derive(Debug, Clone, Copy)]
pub struct DepthMapping {
    scale: f32,
    inv_max: f32,
    inv_range: f32,
}

impl DepthMapping {
    pub fn new(params: &DepthParams) -> Result<Self, ConvertError> {
        let min_m = params.min_reliable as f32 * params.scale;
        let max_m = params.max_reliable as f32 * params.scale;
        let invalid = !(params.scale > 0.0) || params.min_reliable == 0 || max_m <= min_m;
        if invalid {
            return Err(ConvertError::InvalidDepthRange {
                scale: params.scale,
                min: params.min_reliable,
                max: params.max_reliable,
            });
        }

        let inv_min = 1.0 / min_m;
        let inv_max = 1.0 / max_m;
        Ok(Self {
            scale: params.scale,
            inv_max,
            inv_range: inv_min - inv_max,
        })
    }

    /// Normalized closeness: 1 at the minimum reliable depth, 0 at the
    /// maximum, outside [0, 1] beyond either. `None` for a zero reading.
    #[inline]
    pub fn closeness(&self, raw: u16) -> Option<f32> {
        let depth = raw as f32 * self.scale;
        if depth == 0.0 {
            return None;
        }
        Some((1.0 / depth - self.inv_max) / self.inv_range)
    }

    /// Packed color for one raw sample; squaring the closeness stretches
    /// contrast at near range.
    #[inline]
    pub fn color(&self, raw: u16, table: &ColorRampTable) -> u32 {
        match self.closeness(raw) {
            Some(alpha) => table.general(alpha * alpha),
            None => NO_DEPTH,
        }
    }

    /// Map one row of little-endian 16-bit depth samples
    pub fn map_row(&self, table: &ColorRampTable, row_in: &[u8], row_out: &mut [u8]) {
        map_pixels(row_in, row_out, 2, |s| {
            self.color(u16::from_le_bytes([s[0], s[1]]), table)
        });
    }
}

/// Map one row of 8-bit infrared samples
pub fn infrared8_row(table: &ColorRampTable, row_in: &[u8], row_out: &mut [u8]) {
    map_pixels(row_in, row_out, 1, |s| {
        table.infrared(s[0] as f32 / u8::MAX as f32)
    });
}

/// Map one row of little-endian 16-bit infrared samples
pub fn infrared16_row(table: &ColorRampTable, row_in: &[u8], row_out: &mut [u8]) {
    map_pixels(row_in, row_out, 2, |s| {
        table.infrared(u16::from_le_bytes([s[0], s[1]]) as f32 / u16::MAX as f32)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::lut::{table_index, COLOR_RAMPS, TABLE_SIZE};

    fn mapping() -> DepthMapping {
        DepthMapping::new(&DepthParams {
            scale: 0.001,
            min_reliable: 500,
            max_reliable: 4000,
        })
        .unwrap()
    }

    fn index_of(mapping: &DepthMapping, raw: u16) -> usize {
        let alpha = mapping.closeness(raw).unwrap();
        table_index(alpha * alpha)
    }

    #[test]
    fn zero_depth_is_transparent_black() {
        assert_eq!(mapping().color(0, &COLOR_RAMPS), 0);
    }

    #[test]
    fn closeness_spans_reliable_range() {
        let m = mapping();
        assert_eq!(m.closeness(500), Some(1.0));
        assert!(m.closeness(4000).unwrap().abs() < 1e-6);
        assert_eq!(index_of(&m, 500), TABLE_SIZE - 1);
        assert_eq!(index_of(&m, 4000), 0);
    }

    #[test]
    fn table_index_is_monotone_in_distance() {
        let m = mapping();
        let mut previous = index_of(&m, 500);
        for raw in 501..=4000u16 {
            let index = index_of(&m, raw);
            assert!(index <= previous, "raw {raw}: {index} > {previous}");
            previous = index;
        }
    }

    #[test]
    fn adjacent_raw_values_move_at_most_one_slot_past_near_range() {
        let m = mapping();
        for raw in 1000..4000u16 {
            let a = index_of(&m, raw);
            let b = index_of(&m, raw + 1);
            assert!(a - b <= 1, "raw {raw}: jump {a} -> {b}");
        }
    }

    #[test]
    fn degenerate_depth_ranges_are_rejected() {
        let bad = [
            DepthParams {
                scale: 0.0,
                min_reliable: 500,
                max_reliable: 4000,
            },
            DepthParams {
                scale: 0.001,
                min_reliable: 0,
                max_reliable: 4000,
            },
            DepthParams {
                scale: 0.001,
                min_reliable: 4000,
                max_reliable: 4000,
            },
            DepthParams {
                scale: f32::NAN,
                min_reliable: 500,
                max_reliable: 4000,
            },
        ];
        for params in bad {
            assert!(matches!(
                DepthMapping::new(&params),
                Err(ConvertError::InvalidDepthRange { .. })
            ));
        }
    }

    #[test]
    fn infrared_rows_normalize_by_bit_depth() {
        let mut out8 = [0u8; 8];
        infrared8_row(&COLOR_RAMPS, &[0, 255], &mut out8);
        let mut out16 = [0u8; 8];
        infrared16_row(&COLOR_RAMPS, &[0, 0, 0xFF, 0xFF], &mut out16);

        assert_eq!(out8, out16);
        assert_eq!(out8[..4], COLOR_RAMPS.infrared(0.0).to_le_bytes());
        assert_eq!(out8[4..], COLOR_RAMPS.infrared(1.0).to_le_bytes());
    }
}
