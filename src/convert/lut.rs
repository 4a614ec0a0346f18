//! Precomputed pseudo-color ramps for depth and infrared frames

use once_cell::sync::Lazy;

/// Entries per ramp table
pub const TABLE_SIZE: usize = 1024;

/// Shared tables, built on first use
pub static COLOR_RAMPS: Lazy<ColorRampTable> = Lazy::new(ColorRampTable::build);

/// Jet-like ramp from far (dark red, index 0) to near (dark blue), packed as ARGB
pub const COLOR_RAMP: [u32; 9] = [
    pack_argb(0xFF, 0x7F, 0x00, 0x00),
    pack_argb(0xFF, 0xFF, 0x00, 0x00),
    pack_argb(0xFF, 0xFF, 0x7F, 0x00),
    pack_argb(0xFF, 0xFF, 0xFF, 0x00),
    pack_argb(0xFF, 0x7F, 0xFF, 0x7F),
    pack_argb(0xFF, 0x00, 0xFF, 0xFF),
    pack_argb(0xFF, 0x00, 0x7F, 0xFF),
    pack_argb(0xFF, 0x00, 0x00, 0xFF),
    pack_argb(0xFF, 0x00, 0x00, 0x7F),
];

/// Infrared gamma; steep so faint returns still land on visible colors
const INFRARED_GAMMA: i32 = 12;

/// Pack channels as `0xAARRGGBB`. Stored little-endian this is BGRA in memory.
pub const fn pack_argb(a: u8, r: u8, g: u8, b: u8) -> u32 {
    (a as u32) << 24 | (r as u32) << 16 | (g as u32) << 8 | b as u32
}

/// Map a normalized value to a table slot, clamping out-of-range input.
///
/// NaN lands on slot 0.
#[inline]
pub fn table_index(value: f32) -> usize {
    let scaled = (value * TABLE_SIZE as f32).round();
    scaled.clamp(0.0, (TABLE_SIZE - 1) as f32) as usize
}

/// Linear interpolation across [`COLOR_RAMP`] for `value` in [0, 1]
pub fn ramp_color(value: f32) -> u32 {
    let steps = COLOR_RAMP.len() - 1;
    let scaled = value.clamp(0.0, 1.0) * steps as f32;
    let index = (scaled as usize).min(steps - 1);
    let prev = COLOR_RAMP[index];
    let next = COLOR_RAMP[index + 1];

    let weight = ((scaled - index as f32).clamp(0.0, 1.0) * 255.0) as u32;
    let inverse = 255 - weight;

    [24u32, 16, 8, 0].iter().fold(0, |packed, &shift| {
        let a = (prev >> shift) & 0xFF;
        let b = (next >> shift) & 0xFF;
        packed | ((a * inverse + b * weight) / 255) << shift
    })
}

/// Depth and infrared lookup tables
pub struct ColorRampTable {
    depth: Box<[u32; TABLE_SIZE]>,
    infrared: Box<[u32; TABLE_SIZE]>,
}

impl ColorRampTable {
    pub fn build() -> Self {
        let mut depth = Box::new([0u32; TABLE_SIZE]);
        let mut infrared = Box::new([0u32; TABLE_SIZE]);

        for i in 0..TABLE_SIZE {
            let value = i as f32 / TABLE_SIZE as f32;
            depth[i] = ramp_color(value);
            infrared[i] = ramp_color((1.0 - value).powi(INFRARED_GAMMA));
        }

        Self { depth, infrared }
    }

    /// Depth (general purpose) ramp lookup
    #[inline]
    pub fn general(&self, value: f32) -> u32 {
        self.depth[table_index(value)]
    }

    /// Infrared ramp lookup
    #[inline]
    pub fn infrared(&self, value: f32) -> u32 {
        self.infrared[table_index(value)]
    }

    pub fn depth_entries(&self) -> &[u32; TABLE_SIZE] {
        &self.depth
    }

    pub fn infrared_entries(&self) -> &[u32; TABLE_SIZE] {
        &self.infrared
    }
}
