// SPDX-License-Identifier: GPL-3.0-only

//! Synthetic camera for exercising the pipeline without hardware

use crate::errors::ProcessResult;
use crate::processing::PixelBuffer;

/// Animated test pattern: colour bars scrolling left with a bright square
/// bouncing across them
///
/// Every frame has hard vertical edges between the bars and a square
/// outline, so both edge operators have something to find.
#[derive(Debug, Clone)]
pub struct TestPattern {
    width: u32,
    height: u32,
}

/// SMPTE-style bar colours
const BARS: [[u8; 3]; 7] = [
    [192, 192, 192],
    [192, 192, 0],
    [0, 192, 192],
    [0, 192, 0],
    [192, 0, 192],
    [192, 0, 0],
    [0, 0, 192],
];

impl TestPattern {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Render frame number `index`
    pub fn frame(&self, index: u64) -> ProcessResult<PixelBuffer> {
        let bar_width = (self.width / BARS.len() as u32).max(1);
        let scroll = (index % self.width.max(1) as u64) as u32;

        let side = (self.width.min(self.height) / 4).max(1);
        let (square_x, square_y) = self.square_origin(index, side);

        PixelBuffer::from_fn(self.width, self.height, |x, y| {
            let inside_x = x >= square_x && x < square_x + side;
            let inside_y = y >= square_y && y < square_y + side;
            if inside_x && inside_y {
                return [255, 255, 255, 255];
            }
            let bar = ((x + scroll) / bar_width) as usize % BARS.len();
            let [r, g, b] = BARS[bar];
            [r, g, b, 255]
        })
    }

    /// Top-left corner of the square, bouncing between the frame edges
    fn square_origin(&self, index: u64, side: u32) -> (u32, u32) {
        let bounce = |span: u32, speed: u64| -> u32 {
            if span == 0 {
                return 0;
            }
            let period = 2 * span as u64;
            let t = (index * speed) % period;
            if t < span as u64 {
                t as u32
            } else {
                (period - t) as u32
            }
        };
        (
            bounce(self.width.saturating_sub(side), 3),
            bounce(self.height.saturating_sub(side), 2),
        )
    }
}
