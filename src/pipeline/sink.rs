// SPDX-License-Identifier: GPL-3.0-only

//! Renderer side of the frame contract

use crate::processing::PixelBuffer;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Anything that displays frames
///
/// A sink must copy what it needs during `present`; the frame is recycled
/// as soon as the call returns. Frame sizes may change between calls.
pub trait FrameSink {
    fn present(&mut self, frame: &PixelBuffer);
}

impl<F> FrameSink for F
where
    F: FnMut(&PixelBuffer),
{
    fn present(&mut self, frame: &PixelBuffer) {
        self(frame)
    }
}

/// Sink shared between the frame loop and an observer thread
#[derive(Debug, Default)]
pub struct SharedSink<S>(Arc<Mutex<S>>);

impl<S> SharedSink<S> {
    pub fn new(sink: S) -> Self {
        Self(Arc::new(Mutex::new(sink)))
    }

    /// Run `f` with the inner sink locked
    pub fn with<R>(&self, f: impl FnOnce(&S) -> R) -> Option<R> {
        self.0.lock().ok().map(|guard| f(&guard))
    }
}

impl<S> Clone for SharedSink<S> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<S: FrameSink> FrameSink for SharedSink<S> {
    fn present(&mut self, frame: &PixelBuffer) {
        if let Ok(mut guard) = self.0.lock() {
            guard.present(frame);
        }
    }
}

/// CPU stand-in for a GPU texture that frames are uploaded into
///
/// Storage is reallocated only when the frame size changes; same-size
/// frames are copied into the existing allocation.
#[derive(Debug, Default)]
pub struct TextureSink {
    storage: Vec<u8>,
    width: u32,
    height: u32,
    uploads: u64,
    reallocations: u64,
}

impl TextureSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Size of the current texture, `(0, 0)` before the first upload
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Texture contents, empty before the first upload
    pub fn contents(&self) -> &[u8] {
        &self.storage
    }

    /// Current contents as a frame
    pub fn snapshot(&self) -> Option<PixelBuffer> {
        PixelBuffer::new(self.width, self.height, self.storage.clone()).ok()
    }

    pub fn uploads(&self) -> u64 {
        self.uploads
    }

    pub fn reallocations(&self) -> u64 {
        self.reallocations
    }
}

impl FrameSink for TextureSink {
    fn present(&mut self, frame: &PixelBuffer) {
        let (width, height) = frame.dimensions();
        if (width, height) != (self.width, self.height) {
            debug!(
                from_width = self.width,
                from_height = self.height,
                width,
                height,
                "Reallocating texture storage"
            );
            self.width = width;
            self.height = height;
            self.storage = vec![0u8; frame.as_bytes().len()];
            self.reallocations += 1;
        }
        self.storage.copy_from_slice(frame.as_bytes());
        self.uploads += 1;
    }
}
