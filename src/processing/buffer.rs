// SPDX-License-Identifier: GPL-3.0-only

//! RGBA8 frame buffer shared by every transform

use crate::constants::BYTES_PER_PIXEL;
use crate::errors::{ProcessError, ProcessResult};
use serde::{Deserialize, Serialize};

/// Pixel layout a frame producer claims to deliver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelFormat {
    /// Interleaved 8-bit RGBA, 4 bytes per pixel
    Rgba8,
    /// Interleaved 8-bit RGB, 3 bytes per pixel
    Rgb8,
    /// Single 8-bit luminance channel
    Gray8,
}

impl PixelFormat {
    /// Bytes occupied by one pixel
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelFormat::Rgba8 => 4,
            PixelFormat::Rgb8 => 3,
            PixelFormat::Gray8 => 1,
        }
    }
}

impl std::fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PixelFormat::Rgba8 => write!(f, "RGBA8"),
            PixelFormat::Rgb8 => write!(f, "RGB8"),
            PixelFormat::Gray8 => write!(f, "GRAY8"),
        }
    }
}

/// Byte length of a `width x height` frame in `format`, or `None` on overflow
pub fn frame_len(width: u32, height: u32, format: PixelFormat) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(format.bytes_per_pixel())
}

/// RGBA8 byte length for a frame about to be allocated
fn checked_rgba_len(width: u32, height: u32) -> ProcessResult<usize> {
    match frame_len(width, height, PixelFormat::Rgba8) {
        Some(len) if len > 0 => Ok(len),
        _ => Err(ProcessError::InvalidDimensions {
            width: width as i64,
            height: height as i64,
            len: 0,
        }),
    }
}

/// One camera frame or processed frame
///
/// Pixels are interleaved RGBA8, row-major, with a stride of exactly
/// `width * 4` bytes. `data.len() == width * height * 4` holds for every
/// constructed buffer, and both dimensions are at least 1.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap RGBA8 bytes, validating dimensions and length
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> ProcessResult<Self> {
        let valid = width > 0
            && height > 0
            && frame_len(width, height, PixelFormat::Rgba8) == Some(data.len());
        if !valid {
            return Err(ProcessError::InvalidDimensions {
                width: width as i64,
                height: height as i64,
                len: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Wrap bytes delivered in `format`
    ///
    /// The length is checked against the declared format first, so a
    /// truncated frame reports `InvalidDimensions` whatever its format.
    /// Well-formed frames that are not RGBA8 report `UnsupportedFormat`.
    pub fn from_format(
        width: u32,
        height: u32,
        format: PixelFormat,
        data: Vec<u8>,
    ) -> ProcessResult<Self> {
        if width == 0 || height == 0 || frame_len(width, height, format) != Some(data.len()) {
            return Err(ProcessError::InvalidDimensions {
                width: width as i64,
                height: height as i64,
                len: data.len(),
            });
        }
        if format != PixelFormat::Rgba8 {
            return Err(ProcessError::UnsupportedFormat(format));
        }
        Self::new(width, height, data)
    }

    /// A frame where every pixel is `rgba`
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> ProcessResult<Self> {
        let len = checked_rgba_len(width, height)?;
        Self::new(width, height, rgba.repeat(len / BYTES_PER_PIXEL))
    }

    /// Build a frame by evaluating `f(x, y)` for every pixel
    pub fn from_fn<F>(width: u32, height: u32, mut f: F) -> ProcessResult<Self>
    where
        F: FnMut(u32, u32) -> [u8; 4],
    {
        let mut data = Vec::with_capacity(checked_rgba_len(width, height)?);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&f(x, y));
            }
        }
        Self::new(width, height, data)
    }

    /// Only for buffers whose length the caller has already established
    pub(crate) fn from_validated(width: u32, height: u32, data: Vec<u8>) -> Self {
        debug_assert_eq!(
            frame_len(width, height, PixelFormat::Rgba8),
            Some(data.len())
        );
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Bytes per row (no padding)
    pub fn stride(&self) -> usize {
        self.width as usize * BYTES_PER_PIXEL
    }

    /// Raw interleaved bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Pixels as `[r, g, b, a]` quadruples
    pub fn pixels(&self) -> &[[u8; 4]] {
        bytemuck::cast_slice(&self.data)
    }

    /// Pixel at `(x, y)`, or `None` when outside the frame
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels()
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Bytes of row `y`
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }
        let stride = self.stride();
        let start = y as usize * stride;
        self.data.get(start..start + stride)
    }

    /// Release the underlying byte vector
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "PixelBuffer({}x{}, {} bytes)",
            self.width,
            self.height,
            self.data.len()
        )
    }
}

impl AsRef<[u8]> for PixelBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_accepts_exact_length() {
        let frame = PixelBuffer::new(3, 2, vec![0u8; 24]).unwrap();
        assert_eq!(frame.dimensions(), (3, 2));
        assert_eq!(frame.stride(), 12);
        assert_eq!(frame.pixels().len(), 6);
    }

    #[test]
    fn test_new_rejects_length_mismatch() {
        let err = PixelBuffer::new(3, 2, vec![0u8; 23]).unwrap_err();
        assert_eq!(
            err,
            ProcessError::InvalidDimensions {
                width: 3,
                height: 2,
                len: 23
            }
        );
    }

    #[test]
    fn test_new_rejects_zero_dimension() {
        assert!(matches!(
            PixelBuffer::new(0, 4, Vec::new()),
            Err(ProcessError::InvalidDimensions { .. })
        ));
        assert!(matches!(
            PixelBuffer::new(4, 0, Vec::new()),
            Err(ProcessError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_from_format_rejects_rgb() {
        let err = PixelBuffer::from_format(2, 2, PixelFormat::Rgb8, vec![0u8; 12]).unwrap_err();
        assert_eq!(err, ProcessError::UnsupportedFormat(PixelFormat::Rgb8));
    }

    #[test]
    fn test_from_format_checks_length_before_format() {
        let err = PixelBuffer::from_format(2, 2, PixelFormat::Gray8, vec![0u8; 3]).unwrap_err();
        assert!(matches!(err, ProcessError::InvalidDimensions { .. }));
    }

    #[test]
    fn test_pixel_and_row_access() {
        let frame = PixelBuffer::from_fn(2, 2, |x, y| [x as u8, y as u8, 7, 255]).unwrap();
        assert_eq!(frame.pixel(1, 0), Some([1, 0, 7, 255]));
        assert_eq!(frame.pixel(0, 1), Some([0, 1, 7, 255]));
        assert_eq!(frame.pixel(2, 0), None);
        assert_eq!(frame.row(1), Some(&[0, 1, 7, 255, 1, 1, 7, 255][..]));
        assert_eq!(frame.row(2), None);
    }

    #[test]
    fn test_oversized_frames_rejected_before_allocating() {
        assert_eq!(
            PixelBuffer::filled(u32::MAX, u32::MAX, [0; 4]),
            Err(ProcessError::InvalidDimensions {
                width: u32::MAX as i64,
                height: u32::MAX as i64,
                len: 0
            })
        );
        assert!(PixelBuffer::from_fn(u32::MAX, u32::MAX, |_, _| [0; 4]).is_err());
        assert!(PixelBuffer::filled(0, 3, [0; 4]).is_err());
    }

    #[test]
    fn test_filled() {
        let frame = PixelBuffer::filled(3, 1, [9, 8, 7, 6]).unwrap();
        assert!(frame.pixels().iter().all(|p| *p == [9, 8, 7, 6]));
    }
}
