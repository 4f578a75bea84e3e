// SPDX-License-Identifier: GPL-3.0-only

//! Edge Viewer - camera frame processing core
//!
//! Turns RGBA8 camera frames into grayscale or edge-detected frames of the
//! same size, and carries them from a producer to a renderer without
//! queueing or sharing mutable buffers.
//!
//! # Architecture
//!
//! - [`processing`]: pixel buffer, grayscale and edge transforms, the
//!   frame-processing facade and its buffer pool
//! - [`pipeline`]: latest-frame-wins hand-off, frame loop thread, sinks and
//!   a synthetic frame source
//! - [`storage`]: still image load/save
//! - [`config`]: user configuration handling
//!
//! # Example
//!
//! ```
//! use edgeviewer::processing::process_to_gray;
//!
//! let rgba = [100u8, 150, 200, 255].repeat(4);
//! let gray = process_to_gray(&rgba, 2, 2).unwrap();
//! assert_eq!(&gray[..4], &[141, 141, 141, 255]);
//! ```

pub mod config;
pub mod constants;
pub mod errors;
pub mod pipeline;
pub mod processing;
pub mod storage;

// Re-export commonly used types
pub use config::Config;
pub use errors::{AppError, AppResult, ProcessError, ProcessResult};
pub use processing::{
    FrameProcessor, Mode, PixelBuffer, PixelFormat, Transform, process_to_edges, process_to_gray,
};
