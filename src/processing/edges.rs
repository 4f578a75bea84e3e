// SPDX-License-Identifier: GPL-3.0-only

//! Gradient-based edge detection
//!
//! Both operators work on the luma plane with the same 3x3 Sobel stencil.
//! Pixels outside the frame replicate the nearest edge pixel (coordinates are
//! clamped), so border pixels are computed exactly like interior ones.
//!
//! - [`EdgeOperator::Sobel`] writes the gradient magnitude `sqrt(Gx² + Gy²)`,
//!   clamped to 255.
//! - [`EdgeOperator::Canny`] thins the gradient with non-maximum suppression
//!   and links it with hysteresis thresholds, producing a binary 0/255 map.

use super::buffer::PixelBuffer;
use super::grayscale::luma_plane_rgba;
use super::parallel::RowBands;
use crate::constants::{BYTES_PER_PIXEL, OPAQUE_ALPHA, edges};
use serde::{Deserialize, Serialize};

/// Edge detection kernel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EdgeOperator {
    /// Clamped Sobel gradient magnitude
    #[default]
    Sobel,
    /// Canny: non-maximum suppression plus hysteresis, binary output
    Canny,
}

impl EdgeOperator {
    pub const ALL: [EdgeOperator; 2] = [EdgeOperator::Sobel, EdgeOperator::Canny];

    pub fn name(&self) -> &'static str {
        match self {
            EdgeOperator::Sobel => "sobel",
            EdgeOperator::Canny => "canny",
        }
    }
}

impl std::fmt::Display for EdgeOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for EdgeOperator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sobel" => Ok(EdgeOperator::Sobel),
            "canny" => Ok(EdgeOperator::Canny),
            other => Err(format!("unknown edge operator '{}' (expected sobel or canny)", other)),
        }
    }
}

/// Edge detection settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeSettings {
    pub operator: EdgeOperator,
    /// Canny weak-edge threshold on the L1 gradient
    pub canny_low: u16,
    /// Canny strong-edge threshold on the L1 gradient
    pub canny_high: u16,
}

impl EdgeSettings {
    /// `(low, high)`, swapped if configured the wrong way round
    pub fn thresholds(&self) -> (u16, u16) {
        if self.canny_low > self.canny_high {
            (self.canny_high, self.canny_low)
        } else {
            (self.canny_low, self.canny_high)
        }
    }
}

impl Default for EdgeSettings {
    fn default() -> Self {
        Self {
            operator: EdgeOperator::default(),
            canny_low: edges::CANNY_LOW_THRESHOLD,
            canny_high: edges::CANNY_HIGH_THRESHOLD,
        }
    }
}

/// Sobel gradient `(Gx, Gy)` at `(x, y)` with replicate-edge border
#[inline]
fn sobel_at(luma: &[u8], width: usize, height: usize, x: usize, y: usize) -> (i32, i32) {
    let xm = x.saturating_sub(1);
    let xp = (x + 1).min(width - 1);
    let ym = y.saturating_sub(1);
    let yp = (y + 1).min(height - 1);

    let p = |px: usize, py: usize| luma[py * width + px] as i32;

    let (tl, tm, tr) = (p(xm, ym), p(x, ym), p(xp, ym));
    let (ml, mr) = (p(xm, y), p(xp, y));
    let (bl, bm, br) = (p(xm, yp), p(x, yp), p(xp, yp));

    let gx = (tr + 2 * mr + br) - (tl + 2 * ml + bl);
    let gy = (bl + 2 * bm + br) - (tl + 2 * tm + tr);
    (gx, gy)
}

/// Write the edge map of `frame` into `out` (same length as the frame)
///
/// Every byte of `out` is overwritten, so it may come from a reused buffer.
pub fn edges_into(frame: &PixelBuffer, settings: &EdgeSettings, out: &mut [u8], bands: &RowBands) {
    let (width, height) = (frame.width() as usize, frame.height() as usize);
    edges_rgba_into(frame.as_bytes(), width, height, settings, out, bands);
}

/// [`edges_into`] over borrowed RGBA8 bytes already checked against the size
pub(crate) fn edges_rgba_into(
    input: &[u8],
    width: usize,
    height: usize,
    settings: &EdgeSettings,
    out: &mut [u8],
    bands: &RowBands,
) {
    let luma = luma_plane_rgba(input, width, bands);

    match settings.operator {
        EdgeOperator::Sobel => sobel_magnitude(&luma, width, height, out, bands),
        EdgeOperator::Canny => {
            let (low, high) = settings.thresholds();
            canny(&luma, width, height, low as i32, high as i32, out, bands);
        }
    }
}

/// Freshly allocated edge map of `frame`
pub fn detect_edges(frame: &PixelBuffer, settings: &EdgeSettings) -> PixelBuffer {
    let mut out = vec![0u8; frame.as_bytes().len()];
    edges_into(frame, settings, &mut out, &RowBands::INLINE);
    PixelBuffer::from_validated(frame.width(), frame.height(), out)
}

fn sobel_magnitude(luma: &[u8], width: usize, height: usize, out: &mut [u8], bands: &RowBands) {
    bands.for_each(out, width, BYTES_PER_PIXEL, |first_row, band| {
        for (row_offset, row) in band.chunks_exact_mut(width * BYTES_PER_PIXEL).enumerate() {
            let y = first_row + row_offset;
            for (x, dst) in row.chunks_exact_mut(BYTES_PER_PIXEL).enumerate() {
                let (gx, gy) = sobel_at(luma, width, height, x, y);
                // At most 2 * 1020², exact in f32
                let magnitude =
                    ((gx * gx + gy * gy) as f32).sqrt().round().min(u8::MAX as f32) as u8;
                dst.copy_from_slice(&[magnitude, magnitude, magnitude, OPAQUE_ALPHA]);
            }
        }
    });
}

/// Gradient of one pixel: components plus L1 magnitude
#[derive(Debug, Clone, Copy, Default)]
struct Gradient {
    gx: i32,
    gy: i32,
    magnitude: i32,
}

/// Hysteresis state of one pixel after non-maximum suppression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EdgeState {
    None,
    Weak,
    Strong,
}

fn canny(
    luma: &[u8],
    width: usize,
    height: usize,
    low: i32,
    high: i32,
    out: &mut [u8],
    bands: &RowBands,
) {
    let mut gradients = vec![Gradient::default(); width * height];
    bands.for_each(&mut gradients, width, 1, |first_row, band| {
        for (offset, g) in band.iter_mut().enumerate() {
            let index = first_row * width + offset;
            let (gx, gy) = sobel_at(luma, width, height, index % width, index / width);
            *g = Gradient {
                gx,
                gy,
                magnitude: gx.abs() + gy.abs(),
            };
        }
    });

    let magnitude_at = |x: isize, y: isize| -> i32 {
        if x < 0 || y < 0 || x >= width as isize || y >= height as isize {
            0
        } else {
            gradients[y as usize * width + x as usize].magnitude
        }
    };

    // Non-maximum suppression and double threshold
    let mut states = vec![EdgeState::None; width * height];
    let mut stack = Vec::new();
    for y in 0..height {
        for x in 0..width {
            let index = y * width + x;
            let g = gradients[index];
            let m = g.magnitude;
            if m <= low {
                continue;
            }

            let (xi, yi) = (x as isize, y as isize);
            let ax = (g.gx as i64).abs();
            let ay = (g.gy as i64).abs();
            let is_local_max = if ay * 1000 < ax * edges::TAN_22_5_MILLI {
                // Gradient points along x
                m > magnitude_at(xi - 1, yi) && m >= magnitude_at(xi + 1, yi)
            } else if ay * 1000 > ax * edges::TAN_67_5_MILLI {
                // Gradient points along y
                m > magnitude_at(xi, yi - 1) && m >= magnitude_at(xi, yi + 1)
            } else if (g.gx < 0) == (g.gy < 0) {
                m > magnitude_at(xi - 1, yi - 1) && m > magnitude_at(xi + 1, yi + 1)
            } else {
                m > magnitude_at(xi + 1, yi - 1) && m > magnitude_at(xi - 1, yi + 1)
            };
            if !is_local_max {
                continue;
            }

            if m > high {
                states[index] = EdgeState::Strong;
                stack.push(index);
            } else {
                states[index] = EdgeState::Weak;
            }
        }
    }

    // Hysteresis: promote weak pixels 8-connected to a strong one
    while let Some(index) = stack.pop() {
        let x = index % width;
        let y = index / width;
        for ny in y.saturating_sub(1)..=(y + 1).min(height - 1) {
            for nx in x.saturating_sub(1)..=(x + 1).min(width - 1) {
                let neighbour = ny * width + nx;
                if states[neighbour] == EdgeState::Weak {
                    states[neighbour] = EdgeState::Strong;
                    stack.push(neighbour);
                }
            }
        }
    }

    for (dst, state) in out.chunks_exact_mut(BYTES_PER_PIXEL).zip(&states) {
        let v = if *state == EdgeState::Strong { 255 } else { 0 };
        dst.copy_from_slice(&[v, v, v, OPAQUE_ALPHA]);
    }
}
