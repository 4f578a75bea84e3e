// SPDX-License-Identifier: GPL-3.0-only

//! Reusable output buffers for back-to-back frames of the same size

use super::buffer::{PixelBuffer, PixelFormat, frame_len};
use std::sync::Mutex;
use tracing::debug;

/// Counters describing how the pool has been used
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Buffers allocated because none was idle
    pub allocations: u64,
    /// Checkouts served from an idle buffer
    pub reuses: u64,
    /// Buffers accepted back
    pub recycled: u64,
    /// Buffers refused on return (wrong size or pool full)
    pub discarded: u64,
    /// Buffers currently idle in the pool
    pub idle: usize,
}

#[derive(Debug, Default)]
struct PoolState {
    dimensions: Option<(u32, u32)>,
    free: Vec<Vec<u8>>,
    stats: PoolStats,
}

/// Grow-or-reuse pool of RGBA8 output buffers
///
/// The pool is bound to one frame size at a time. Asking for a different
/// size drops every idle buffer. A checked-out buffer is owned exclusively
/// by its caller until it comes back through [`BufferPool::recycle`], so no
/// two in-flight calls ever write the same memory.
///
/// Checked-out buffers hold whatever the previous frame left in them; the
/// transforms overwrite every byte before handing them out.
#[derive(Debug)]
pub struct BufferPool {
    state: Mutex<PoolState>,
    capacity: usize,
}

impl BufferPool {
    /// Pool keeping at most `capacity` idle buffers
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(PoolState::default()),
            capacity,
        }
    }

    /// Take a buffer of exactly `width * height * 4` bytes
    pub fn checkout(&self, width: u32, height: u32) -> Vec<u8> {
        let len = frame_len(width, height, PixelFormat::Rgba8).unwrap_or(0);
        let Ok(mut state) = self.state.lock() else {
            return vec![0u8; len];
        };

        if state.dimensions != Some((width, height)) {
            if !state.free.is_empty() {
                debug!(
                    width,
                    height,
                    dropped = state.free.len(),
                    "Frame size changed, dropping pooled buffers"
                );
            }
            state.free.clear();
            state.dimensions = Some((width, height));
        }

        match state.free.pop() {
            Some(buffer) => {
                state.stats.reuses += 1;
                buffer
            }
            None => {
                state.stats.allocations += 1;
                vec![0u8; len]
            }
        }
    }

    /// Hand a consumed frame's storage back for reuse
    pub fn recycle(&self, frame: PixelBuffer) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };

        if state.dimensions == Some(frame.dimensions()) && state.free.len() < self.capacity {
            state.free.push(frame.into_raw());
            state.stats.recycled += 1;
        } else {
            state.stats.discarded += 1;
        }
    }

    pub fn stats(&self) -> PoolStats {
        match self.state.lock() {
            Ok(state) => PoolStats {
                idle: state.free.len(),
                ..state.stats
            },
            Err(_) => PoolStats::default(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
