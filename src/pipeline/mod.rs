// SPDX-License-Identifier: GPL-3.0-only

//! Producer/consumer plumbing around the processing core
//!
//! The camera side publishes [`RawFrame`]s into a [`LatestFrame`] slot at its
//! own cadence. A [`FrameLoop`] thread takes the newest one, processes it for
//! the mode in a [`ModeSwitch`] and presents the result to a [`FrameSink`].

pub mod frame_loop;
pub mod latest;
pub mod sink;
pub mod source;

pub use frame_loop::{FrameLoop, LoopAction, LoopController, LoopStatsSnapshot};
pub use latest::LatestFrame;
pub use sink::{FrameSink, SharedSink, TextureSink};
pub use source::TestPattern;

use crate::errors::ProcessResult;
use crate::processing::{Mode, PixelBuffer, PixelFormat};
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

/// Frame as delivered by a producer, before validation
#[derive(Debug, Clone)]
pub struct RawFrame {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub data: Vec<u8>,
}

impl RawFrame {
    /// RGBA8 frame
    pub fn rgba(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            format: PixelFormat::Rgba8,
            data,
        }
    }

    /// Validate into a [`PixelBuffer`]
    pub fn into_buffer(self) -> ProcessResult<PixelBuffer> {
        PixelBuffer::from_format(self.width, self.height, self.format, self.data)
    }
}

impl From<PixelBuffer> for RawFrame {
    fn from(frame: PixelBuffer) -> Self {
        let (width, height) = frame.dimensions();
        Self::rgba(width, height, frame.into_raw())
    }
}

/// Display mode shared between the UI (writer) and the frame loop (reader)
#[derive(Debug, Clone, Default)]
pub struct ModeSwitch(Arc<AtomicU8>);

impl ModeSwitch {
    pub fn new(mode: Mode) -> Self {
        Self(Arc::new(AtomicU8::new(mode.to_u8())))
    }

    pub fn get(&self) -> Mode {
        Mode::from_u8(self.0.load(Ordering::Acquire))
    }

    pub fn set(&self, mode: Mode) {
        self.0.store(mode.to_u8(), Ordering::Release);
    }

    /// Advance to the next mode (toggle button press) and return it
    pub fn cycle(&self) -> Mode {
        let previous = self
            .0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |v| {
                Some(Mode::from_u8(v).next().to_u8())
            })
            .unwrap_or_else(|v| v);
        Mode::from_u8(previous).next()
    }
}
