//! Stride-aware row iteration over an input and an output plane.
//!
//! Both planes are validated up front so the per-row callbacks only ever see
//! the first `width` pixels of each row, whatever padding the strides carry.

use crate::error::BoundsError;

/// Bytes per pixel of every display image
pub const OUTPUT_BYTES_PER_PIXEL: usize = 4;

/// Read-only plane of pixel rows
#[derive(Debug, Clone, Copy)]
pub struct Plane<'a> {
    pub data: &'a [u8],
    pub stride: usize,
    pub bytes_per_pixel: usize,
}

/// Writable plane of packed 32-bit pixel rows
#[derive(Debug)]
pub struct PlaneMut<'a> {
    pub data: &'a mut [u8],
    pub stride: usize,
}

/// Check that a `len`-byte plane with `stride`-byte rows holds `height` rows
/// of `width` pixels. Returns the pixel bytes per row.
///
/// Arithmetic overflow counts as out of bounds.
pub fn check_plane(
    plane: &'static str,
    len: usize,
    stride: usize,
    width: usize,
    bytes_per_pixel: usize,
    height: usize,
) -> Result<usize, BoundsError> {
    let row_bytes = width.checked_mul(bytes_per_pixel);
    // The last row does not need its padding
    let required = row_bytes.and_then(|row| match height {
        0 => Some(0),
        h => stride.checked_mul(h - 1)?.checked_add(row),
    });
    match (row_bytes, required) {
        (Some(row), Some(required)) if stride >= row && len >= required => Ok(row),
        _ => Err(BoundsError {
            plane,
            row_bytes: row_bytes.unwrap_or(usize::MAX),
            stride,
            required: required.unwrap_or(usize::MAX),
            available: len,
        }),
    }
}

/// Run `transform` once per row with the `width`-pixel prefix of the input
/// and output rows.
pub fn transform_scanlines<F>(
    width: usize,
    height: usize,
    input: Plane<'_>,
    output: PlaneMut<'_>,
    mut transform: F,
) -> Result<(), BoundsError>
where
    F: FnMut(&[u8], &mut [u8]),
{
    let in_row_bytes = check_plane(
        "input",
        input.data.len(),
        input.stride,
        width,
        input.bytes_per_pixel,
        height,
    )?;
    let out_row_bytes = check_plane(
        "output",
        output.data.len(),
        output.stride,
        width,
        OUTPUT_BYTES_PER_PIXEL,
        height,
    )?;

    if width == 0 || height == 0 {
        return Ok(());
    }

    let rows_in = input.data.chunks(input.stride);
    let rows_out = output.data.chunks_mut(output.stride);
    for (row_in, row_out) in rows_in.zip(rows_out).take(height) {
        transform(&row_in[..in_row_bytes], &mut row_out[..out_row_bytes]);
    }
    Ok(())
}

/// Apply `map` to every pixel of a row, writing packed `0xAARRGGBB` values.
#[inline]
pub fn map_pixels<F>(row_in: &[u8], row_out: &mut [u8], bytes_per_pixel: usize, mut map: F)
where
    F: FnMut(&[u8]) -> u32,
{
    for (sample, pixel) in row_in
        .chunks_exact(bytes_per_pixel)
        .zip(row_out.chunks_exact_mut(OUTPUT_BYTES_PER_PIXEL))
    {
        pixel.copy_from_slice(&map(sample).to_le_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_never_include_stride_padding() {
        // 3 pixels wide, 1 byte each, padded to 5
        let input = [1u8, 2, 3, 0xEE, 0xEE, 4, 5, 6, 0xEE, 0xEE];
        let mut output = vec![0xAAu8; 16 * 2];

        transform_scanlines(
            3,
            2,
            Plane {
                data: &input,
                stride: 5,
                bytes_per_pixel: 1,
            },
            PlaneMut {
                data: &mut output,
                stride: 16,
            },
            |row_in, row_out| {
                assert_eq!(row_in.len(), 3);
                assert_eq!(row_out.len(), 12);
                map_pixels(row_in, row_out, 1, |s| s[0] as u32);
            },
        )
        .unwrap();

        assert_eq!(&output[..4], &[1, 0, 0, 0]);
        assert_eq!(&output[8..12], &[3, 0, 0, 0]);
        // Output padding untouched
        assert_eq!(&output[12..16], &[0xAA; 4]);
        assert_eq!(&output[16..20], &[4, 0, 0, 0]);
    }

    #[test]
    fn last_row_may_omit_padding() {
        let input = [9u8; 5 + 3];
        let mut output = vec![0u8; 12 * 2];
        let result = transform_scanlines(
            3,
            2,
            Plane {
                data: &input,
                stride: 5,
                bytes_per_pixel: 1,
            },
            PlaneMut {
                data: &mut output,
                stride: 12,
            },
            |row_in, row_out| map_pixels(row_in, row_out, 1, |s| s[0] as u32),
        );
        assert!(result.is_ok());
        assert_eq!(output[12], 9);
    }

    #[test]
    fn stride_narrower_than_row_is_rejected() {
        let input = [0u8; 16];
        let mut output = vec![0u8; 64];
        let err = transform_scanlines(
            4,
            2,
            Plane {
                data: &input,
                stride: 6,
                bytes_per_pixel: 2,
            },
            PlaneMut {
                data: &mut output,
                stride: 16,
            },
            |_, _| panic!("no row may be visited"),
        )
        .unwrap_err();
        assert_eq!(err.plane, "input");
        assert_eq!(err.row_bytes, 8);
    }

    #[test]
    fn short_output_is_rejected_before_writing() {
        let input = [0u8; 8];
        let mut output = vec![0x55u8; 20];
        let err = transform_scanlines(
            2,
            2,
            Plane {
                data: &input,
                stride: 4,
                bytes_per_pixel: 2,
            },
            PlaneMut {
                data: &mut output,
                stride: 16,
            },
            |_, _| panic!("no row may be visited"),
        )
        .unwrap_err();
        assert_eq!(err.plane, "output");
        assert_eq!(err.required, 24);
        assert!(output.iter().all(|&b| b == 0x55));
    }

    #[test]
    fn overflowing_geometry_is_out_of_bounds() {
        let err = check_plane("input", 4, 4, usize::MAX, 2, 1).unwrap_err();
        assert_eq!(err.row_bytes, usize::MAX);

        let err = check_plane("input", 4, usize::MAX / 2, 1, 1, 4).unwrap_err();
        assert_eq!(err.required, usize::MAX);
        assert_eq!(err.available, 4);
    }

    #[test]
    fn empty_frame_is_a_no_op() {
        let mut output = Vec::new();
        let result = transform_scanlines(
            0,
            0,
            Plane {
                data: &[],
                stride: 0,
                bytes_per_pixel: 2,
            },
            PlaneMut {
                data: &mut output,
                stride: 0,
            },
            |_, _| panic!("no row may be visited"),
        );
        assert!(result.is_ok());
    }
}
