// SPDX-License-Identifier: GPL-3.0-only

//! Luma (BT.601) grayscale conversion

use super::buffer::PixelBuffer;
use super::parallel::RowBands;
use crate::constants::{BYTES_PER_PIXEL, OPAQUE_ALPHA, luma};

/// Luminance of one RGB triple, rounded to nearest
///
/// Integer evaluation of `0.299R + 0.587G + 0.114B`. Because the weights sum
/// to exactly one, a gray input (R == G == B == v) maps back to v.
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    let weighted =
        luma::WEIGHT_R * r as u32 + luma::WEIGHT_G * g as u32 + luma::WEIGHT_B * b as u32;
    // At most (255_000 + 500) / 1000 = 255
    ((weighted + luma::ROUNDING) / luma::SCALE) as u8
}

/// Write the grayscale version of `frame` into `out` (same length as the frame)
///
/// Every byte of `out` is overwritten, so it may come from a reused buffer.
pub fn gray_into(frame: &PixelBuffer, out: &mut [u8], bands: &RowBands) {
    gray_rgba_into(frame.as_bytes(), frame.width() as usize, out, bands);
}

/// [`gray_into`] over borrowed RGBA8 bytes already checked against `width`
pub(crate) fn gray_rgba_into(input: &[u8], width: usize, out: &mut [u8], bands: &RowBands) {
    let stride = width * BYTES_PER_PIXEL;

    bands.for_each(out, width, BYTES_PER_PIXEL, |first_row, band| {
        let start = first_row * stride;
        let src = &input[start..start + band.len()];
        for (dst, px) in band
            .chunks_exact_mut(BYTES_PER_PIXEL)
            .zip(src.chunks_exact(BYTES_PER_PIXEL))
        {
            let l = luma(px[0], px[1], px[2]);
            dst.copy_from_slice(&[l, l, l, OPAQUE_ALPHA]);
        }
    });
}

/// Single-channel luminance plane of `frame` (`width * height` bytes)
pub fn luma_plane(frame: &PixelBuffer, bands: &RowBands) -> Vec<u8> {
    luma_plane_rgba(frame.as_bytes(), frame.width() as usize, bands)
}

pub(crate) fn luma_plane_rgba(input: &[u8], width: usize, bands: &RowBands) -> Vec<u8> {
    let mut plane = vec![0u8; input.len() / BYTES_PER_PIXEL];

    bands.for_each(&mut plane, width, 1, |first_row, band| {
        let start = first_row * width * BYTES_PER_PIXEL;
        let src = &input[start..start + band.len() * BYTES_PER_PIXEL];
        for (dst, px) in band.iter_mut().zip(src.chunks_exact(BYTES_PER_PIXEL)) {
            *dst = luma(px[0], px[1], px[2]);
        }
    });

    plane
}

/// Freshly allocated grayscale copy of `frame`
pub fn grayscale(frame: &PixelBuffer) -> PixelBuffer {
    let mut out = vec![0u8; frame.as_bytes().len()];
    gray_into(frame, &mut out, &RowBands::INLINE);
    PixelBuffer::from_validated(frame.width(), frame.height(), out)
}
