// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// Bytes per interleaved RGBA8 pixel
pub const BYTES_PER_PIXEL: usize = 4;

/// Alpha written into every processed pixel (preview is always opaque)
pub const OPAQUE_ALPHA: u8 = 255;

/// Luma weighting constants (BT.601)
///
/// Weights are scaled by 1000 so the conversion runs in exact integer math:
/// `L = (299*R + 587*G + 114*B + 500) / 1000`, which rounds half up.
pub mod luma {
    /// Red weight (0.299)
    pub const WEIGHT_R: u32 = 299;
    /// Green weight (0.587)
    pub const WEIGHT_G: u32 = 587;
    /// Blue weight (0.114)
    pub const WEIGHT_B: u32 = 114;
    /// Sum of the weights
    pub const SCALE: u32 = 1000;
    /// Added before the division so it rounds to nearest
    pub const ROUNDING: u32 = SCALE / 2;
}

/// Edge detection constants
pub mod edges {
    /// Canny low hysteresis threshold (L1 gradient magnitude)
    pub const CANNY_LOW_THRESHOLD: u16 = 80;

    /// Canny high hysteresis threshold (L1 gradient magnitude)
    pub const CANNY_HIGH_THRESHOLD: u16 = 150;

    /// tan(22.5°) scaled by 1000, for direction quantisation
    pub const TAN_22_5_MILLI: i64 = 414;

    /// tan(67.5°) scaled by 1000, for direction quantisation
    pub const TAN_67_5_MILLI: i64 = 2414;
}

/// Frame pipeline constants
pub mod pipeline {
    use std::time::Duration;

    /// Default preview frame rate
    pub const DEFAULT_FPS: u32 = 30;

    /// Default synthetic preview size
    pub const DEFAULT_WIDTH: u32 = 640;
    pub const DEFAULT_HEIGHT: u32 = 480;

    /// Frame budget at the default frame rate
    pub const DEFAULT_FRAME_BUDGET_MS: u64 = 33;

    /// How long the frame loop waits for a new frame before rechecking its stop signal
    pub const FRAME_WAIT_TIMEOUT: Duration = Duration::from_millis(50);

    /// Frames smaller than this are transformed on the calling thread
    pub const PARALLEL_MIN_PIXELS: usize = 64 * 1024;

    /// Idle output buffers kept by the pool
    pub const DEFAULT_POOL_CAPACITY: usize = 3;

    /// Number of worker threads available for row-band processing
    pub fn worker_threads() -> usize {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4) // Fallback to 4 if detection fails
    }
}

/// Timing constants
pub mod timing {
    /// Frame counter modulo for periodic logging
    pub const FRAME_LOG_INTERVAL: u64 = 30;
}

/// Application metadata
pub mod app_info {
    /// Get the application version from build-time environment
    pub fn version() -> &'static str {
        env!("GIT_VERSION")
    }
}

/// Inter-frame interval for a delivery rate (zero fps is treated as 1 fps)
pub fn frame_interval(fps: u32) -> Duration {
    Duration::from_secs_f64(1.0 / fps.max(1) as f64)
}
