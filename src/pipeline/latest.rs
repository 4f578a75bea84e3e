// SPDX-License-Identifier: GPL-3.0-only

//! Single-slot, latest-wins hand-off between a frame producer and its consumer

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Condvar, Mutex, PoisonError};
use std::time::Duration;

#[derive(Debug)]
struct Slot<T> {
    pending: Option<T>,
    closed: bool,
}

/// Mailbox holding at most one undelivered frame
///
/// Publishing while a frame is still pending replaces it, so a slow consumer
/// always sees the newest frame and memory never grows with the backlog.
#[derive(Debug)]
pub struct LatestFrame<T> {
    slot: Mutex<Slot<T>>,
    ready: Condvar,
    published: AtomicU64,
    dropped: AtomicU64,
}

impl<T> LatestFrame<T> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(Slot {
                pending: None,
                closed: false,
            }),
            ready: Condvar::new(),
            published: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        }
    }

    /// Offer a frame; returns `false` if the slot is closed
    ///
    /// An unconsumed earlier frame is discarded and counted as dropped.
    pub fn publish(&self, frame: T) -> bool {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.closed {
            return false;
        }
        if slot.pending.replace(frame).is_some() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
        self.published.fetch_add(1, Ordering::Relaxed);
        drop(slot);
        self.ready.notify_one();
        true
    }

    /// Take the pending frame without waiting
    pub fn try_take(&self) -> Option<T> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pending
            .take()
    }

    /// Wait up to `timeout` for a frame
    ///
    /// Returns `None` on timeout, or once the slot is closed and drained.
    pub fn take_timeout(&self, timeout: Duration) -> Option<T> {
        let slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        let (mut slot, _) = self
            .ready
            .wait_timeout_while(slot, timeout, |s| s.pending.is_none() && !s.closed)
            .unwrap_or_else(PoisonError::into_inner);
        slot.pending.take()
    }

    /// Refuse further frames and wake any waiting consumer
    ///
    /// A frame published before closing can still be taken.
    pub fn close(&self) {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .closed = true;
        self.ready.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .closed
    }

    /// Frames accepted by [`LatestFrame::publish`]
    pub fn published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }

    /// Frames replaced before anyone took them
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl<T> Default for LatestFrame<T> {
    fn default() -> Self {
        Self::new()
    }
}
