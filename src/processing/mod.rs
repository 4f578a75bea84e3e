// SPDX-License-Identifier: GPL-3.0-only

//! Frame processing core
//!
//! Pure transforms from one RGBA8 frame to another of the same size:
//!
//! - [`grayscale`]: BT.601 luma replicated into R, G and B
//! - [`edges`]: Sobel gradient magnitude or Canny edge map on the luma plane
//!
//! [`FrameProcessor`] is the entry point a frame callback talks to. It never
//! mutates its input, keeps no per-frame state between calls, and can be
//! shared across threads. The raw byte entry points [`process_to_gray`] and
//! [`process_to_edges`] mirror the `(bytes, width, height)` boundary the
//! camera and renderer speak.

pub mod buffer;
pub mod edges;
pub mod grayscale;
pub mod mode;
pub mod parallel;
pub mod pool;

pub use buffer::{PixelBuffer, PixelFormat};
pub use edges::{EdgeOperator, EdgeSettings};
pub use mode::{Mode, Transform};
pub use parallel::RowBands;
pub use pool::{BufferPool, PoolStats};

use crate::errors::{ProcessError, ProcessResult};
use std::sync::OnceLock;

/// Tuning for a [`FrameProcessor`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingSettings {
    pub edge: EdgeSettings,
    /// Row-band parallelism
    pub bands: RowBands,
    /// Idle output buffers to keep; `None` allocates a fresh buffer per frame
    pub pool_capacity: Option<usize>,
}

impl Default for ProcessingSettings {
    fn default() -> Self {
        Self {
            edge: EdgeSettings::default(),
            bands: RowBands::default(),
            pool_capacity: Some(crate::constants::pipeline::DEFAULT_POOL_CAPACITY),
        }
    }
}

/// Dispatches frames to the transform selected by the caller's mode
#[derive(Debug)]
pub struct FrameProcessor {
    edge: EdgeSettings,
    bands: RowBands,
    pool: Option<BufferPool>,
}

impl FrameProcessor {
    pub fn new(settings: ProcessingSettings) -> Self {
        Self {
            edge: settings.edge,
            bands: settings.bands,
            pool: settings.pool_capacity.map(BufferPool::new),
        }
    }

    /// Run `transform` on `frame`, returning a new frame of the same size
    pub fn process(&self, frame: &PixelBuffer, transform: Transform) -> PixelBuffer {
        let (width, height) = frame.dimensions();
        let mut out = match &self.pool {
            Some(pool) => pool.checkout(width, height),
            None => vec![0u8; frame.as_bytes().len()],
        };

        match transform {
            Transform::Gray => grayscale::gray_into(frame, &mut out, &self.bands),
            Transform::Edge => edges::edges_into(frame, &self.edge, &mut out, &self.bands),
        }

        PixelBuffer::from_validated(width, height, out)
    }

    /// Process `frame` for display in `mode`
    ///
    /// Returns `None` for [`Mode::Normal`]: the caller shows the original
    /// frame and no copy is made.
    pub fn process_mode(&self, frame: &PixelBuffer, mode: Mode) -> Option<PixelBuffer> {
        mode.transform().map(|transform| self.process(frame, transform))
    }

    /// Give a displayed output frame back so its storage can be reused
    pub fn recycle(&self, frame: PixelBuffer) {
        if let Some(pool) = &self.pool {
            pool.recycle(frame);
        }
    }

    pub fn edge_settings(&self) -> &EdgeSettings {
        &self.edge
    }

    pub fn pool_stats(&self) -> Option<PoolStats> {
        self.pool.as_ref().map(BufferPool::stats)
    }
}

impl Default for FrameProcessor {
    fn default() -> Self {
        Self::new(ProcessingSettings::default())
    }
}

/// Validate a raw `(bytes, width, height)` frame from the producer boundary
///
/// `Ok(None)` means a zero-area frame with no bytes, which every transform
/// maps to an empty result.
fn validate_raw(rgba: &[u8], width: i32, height: i32) -> ProcessResult<Option<(u32, u32)>> {
    let invalid = || ProcessError::InvalidDimensions {
        width: width as i64,
        height: height as i64,
        len: rgba.len(),
    };

    if width < 0 || height < 0 {
        return Err(invalid());
    }
    let (w, h) = (width as u32, height as u32);
    if buffer::frame_len(w, h, PixelFormat::Rgba8) != Some(rgba.len()) {
        return Err(invalid());
    }
    if w == 0 || h == 0 {
        return Ok(None);
    }
    Ok(Some((w, h)))
}

fn process_raw(
    rgba: &[u8],
    width: i32,
    height: i32,
    transform: Transform,
) -> ProcessResult<Vec<u8>> {
    static RAW_BANDS: OnceLock<RowBands> = OnceLock::new();

    let Some((w, h)) = validate_raw(rgba, width, height)? else {
        return Ok(Vec::new());
    };
    let bands = RAW_BANDS.get_or_init(RowBands::default);
    let mut out = vec![0u8; rgba.len()];
    match transform {
        Transform::Gray => grayscale::gray_rgba_into(rgba, w as usize, &mut out, bands),
        Transform::Edge => edges::edges_rgba_into(
            rgba,
            w as usize,
            h as usize,
            &EdgeSettings::default(),
            &mut out,
            bands,
        ),
    }
    Ok(out)
}

/// Grayscale an RGBA8 frame, returning `width * height * 4` bytes
pub fn process_to_gray(rgba: &[u8], width: i32, height: i32) -> ProcessResult<Vec<u8>> {
    process_raw(rgba, width, height, Transform::Gray)
}

/// Edge map (Sobel magnitude) of an RGBA8 frame, returning `width * height * 4` bytes
pub fn process_to_edges(rgba: &[u8], width: i32, height: i32) -> ProcessResult<Vec<u8>> {
    process_raw(rgba, width, height, Transform::Edge)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_frame(width: u32, height: u32) -> PixelBuffer {
        PixelBuffer::from_fn(width, height, |x, y| {
            [
                (x * 7 % 256) as u8,
                (y * 13 % 256) as u8,
                ((x + y) * 5 % 256) as u8,
                255,
            ]
        })
        .unwrap()
    }

    #[test]
    fn test_process_mode_normal_skips() {
        let processor = FrameProcessor::default();
        let frame = gradient_frame(4, 4);
        assert!(processor.process_mode(&frame, Mode::Normal).is_none());
        assert!(processor.process_mode(&frame, Mode::Gray).is_some());
    }

    #[test]
    fn test_process_does_not_touch_input() {
        let processor = FrameProcessor::default();
        let frame = gradient_frame(9, 6);
        let before = frame.clone();
        let _ = processor.process(&frame, Transform::Edge);
        assert_eq!(frame, before);
    }

    #[test]
    fn test_parallel_matches_inline() {
        let frame = gradient_frame(37, 23);
        for operator in EdgeOperator::ALL {
            let edge = EdgeSettings {
                operator,
                ..Default::default()
            };
            let inline = FrameProcessor::new(ProcessingSettings {
                edge,
                bands: RowBands::INLINE,
                pool_capacity: None,
            });
            let parallel = FrameProcessor::new(ProcessingSettings {
                edge,
                bands: RowBands::new(4, 0),
                pool_capacity: None,
            });
            for transform in [Transform::Gray, Transform::Edge] {
                assert_eq!(
                    inline.process(&frame, transform),
                    parallel.process(&frame, transform)
                );
            }
        }
    }

    #[test]
    fn test_pooled_output_has_no_stale_pixels() {
        let pooled = FrameProcessor::new(ProcessingSettings {
            pool_capacity: Some(1),
            ..Default::default()
        });
        let fresh = FrameProcessor::new(ProcessingSettings {
            pool_capacity: None,
            ..Default::default()
        });

        let busy = gradient_frame(8, 8);
        let flat = PixelBuffer::filled(8, 8, [50, 50, 50, 255]).unwrap();

        let first = pooled.process(&busy, Transform::Edge);
        pooled.recycle(first);
        let second = pooled.process(&flat, Transform::Edge);

        assert_eq!(pooled.pool_stats().map(|s| s.reuses), Some(1));
        assert_eq!(second, fresh.process(&flat, Transform::Edge));
    }

    #[test]
    fn test_raw_zero_area_is_noop() {
        assert_eq!(process_to_gray(&[], 0, 0), Ok(Vec::new()));
        assert_eq!(process_to_edges(&[], 5, 0), Ok(Vec::new()));
    }

    #[test]
    fn test_raw_rejects_negative_dimensions() {
        assert!(matches!(
            process_to_gray(&[], -1, 0),
            Err(ProcessError::InvalidDimensions { width: -1, .. })
        ));
    }

    #[test]
    fn test_raw_zero_area_with_bytes_is_mismatch() {
        assert!(matches!(
            process_to_edges(&[0, 0, 0, 255], 0, 1),
            Err(ProcessError::InvalidDimensions { .. })
        ));
    }
}
