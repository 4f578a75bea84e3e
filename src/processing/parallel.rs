// SPDX-License-Identifier: GPL-3.0-only

//! Row-band splitting for per-pixel and per-stencil transforms
//!
//! Every output pixel depends only on the input, never on another output
//! pixel, so the output can be cut into horizontal bands that are written
//! by independent scoped threads without any locking.

/// How a transform may spread its rows across threads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowBands {
    /// Upper bound on concurrently running bands (1 = inline)
    pub workers: usize,
    /// Frames with fewer pixels than this run inline
    pub min_pixels: usize,
}

impl RowBands {
    /// Run everything on the calling thread
    pub const INLINE: RowBands = RowBands {
        workers: 1,
        min_pixels: usize::MAX,
    };

    pub fn new(workers: usize, min_pixels: usize) -> Self {
        Self {
            workers: workers.max(1),
            min_pixels,
        }
    }

    /// Number of bands a `width x rows` frame will be split into
    pub fn band_count(&self, width: usize, rows: usize) -> usize {
        if rows == 0 || width.saturating_mul(rows) < self.min_pixels {
            return 1;
        }
        self.workers.clamp(1, rows)
    }

    /// Call `f(first_row, band)` for disjoint bands covering `out`
    ///
    /// `out` holds `rows` rows of `width * channels` elements. Each band is a
    /// whole number of rows; `first_row` is the index of its first row.
    pub fn for_each<T, F>(&self, out: &mut [T], width: usize, channels: usize, f: F)
    where
        T: Send,
        F: Fn(usize, &mut [T]) + Sync,
    {
        let row_len = width * channels;
        if row_len == 0 || out.is_empty() {
            return;
        }
        let rows = out.len() / row_len;
        let bands = self.band_count(width, rows);
        if bands <= 1 {
            f(0, out);
            return;
        }

        let rows_per_band = rows.div_ceil(bands);
        std::thread::scope(|scope| {
            for (index, band) in out.chunks_mut(rows_per_band * row_len).enumerate() {
                let f = &f;
                scope.spawn(move || f(index * rows_per_band, band));
            }
        });
    }
}

impl Default for RowBands {
    fn default() -> Self {
        Self::new(
            crate::constants::pipeline::worker_threads(),
            crate::constants::pipeline::PARALLEL_MIN_PIXELS,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_frames_stay_inline() {
        let bands = RowBands::new(8, 1000);
        assert_eq!(bands.band_count(10, 10), 1);
        assert_eq!(bands.band_count(100, 10), 8);
        assert_eq!(bands.band_count(1000, 3), 3);
    }

    #[test]
    fn test_bands_cover_every_row_once() {
        let width = 5;
        let rows = 13;
        let mut out = vec![0u32; width * rows];

        RowBands::new(4, 0).for_each(&mut out, width, 1, |first_row, band| {
            for (offset, value) in band.iter_mut().enumerate() {
                *value += (first_row * width + offset) as u32 + 1;
            }
        });

        let expected: Vec<u32> = (1..=(width * rows) as u32).collect();
        assert_eq!(out, expected);
    }

    #[test]
    fn test_inline_passes_whole_buffer() {
        let mut out = vec![0u8; 12];
        RowBands::INLINE.for_each(&mut out, 3, 4, |first_row, band| {
            assert_eq!(first_row, 0);
            assert_eq!(band.len(), 12);
            band.fill(1);
        });
        assert!(out.iter().all(|v| *v == 1));
    }
}
