// SPDX-License-Identifier: GPL-3.0-only
//! Worker threads that carry frames from the producer to the renderer
//!
//! [`LoopController`] owns a named thread running one closure iteration at a
//! time until told to stop. [`FrameLoop`] builds on it: each iteration takes
//! the newest frame from a [`LatestFrame`] slot, runs the transform for the
//! caller's current mode, and presents the result.

use super::latest::LatestFrame;
use super::sink::FrameSink;
use super::{ModeSwitch, RawFrame};
use crate::constants::{pipeline::FRAME_WAIT_TIMEOUT, timing::FRAME_LOG_INTERVAL};
use crate::processing::FrameProcessor;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Action returned by the loop callback to control loop behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopAction {
    /// Continue running the loop
    Continue,
    /// Stop the loop gracefully
    Stop,
}

/// Controller for a loop running in a separate thread
///
/// # Example
///
/// ```ignore
/// let mut controller = LoopController::start("producer", move || {
///     slot.publish(next_frame());
///     LoopAction::Continue
/// });
///
/// // Later, stop the loop
/// controller.stop();
/// ```
pub struct LoopController {
    /// Thread handle for joining
    thread_handle: Option<JoinHandle<()>>,
    /// Signal to stop the loop
    stop_signal: Arc<AtomicBool>,
    /// Name for logging
    name: String,
}

impl LoopController {
    /// Start a new loop in a separate thread
    ///
    /// The closure is called repeatedly until it returns `LoopAction::Stop`
    /// or the controller's `stop()` method is called.
    pub fn start<F>(name: &str, mut loop_fn: F) -> Self
    where
        F: FnMut() -> LoopAction + Send + 'static,
    {
        let stop_signal = Arc::new(AtomicBool::new(false));
        let stop_signal_clone = Arc::clone(&stop_signal);
        let name_clone = name.to_string();

        info!(name = %name, "Starting loop");

        let spawned = thread::Builder::new().name(name.to_string()).spawn(move || {
            debug!(name = %name_clone, "Loop thread started");

            loop {
                // Check stop signal first
                if stop_signal_clone.load(Ordering::SeqCst) {
                    debug!(name = %name_clone, "Stop signal received");
                    break;
                }

                match loop_fn() {
                    LoopAction::Continue => {}
                    LoopAction::Stop => {
                        debug!(name = %name_clone, "Loop requested stop");
                        break;
                    }
                }
            }

            info!(name = %name_clone, "Loop thread exiting");
        });

        let thread_handle = match spawned {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!(name = %name, error = %e, "Failed to spawn loop thread");
                None
            }
        };

        Self {
            thread_handle,
            stop_signal,
            name: name.to_string(),
        }
    }

    /// Check if the loop is still running
    pub fn is_running(&self) -> bool {
        self.thread_handle
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    /// Signal the loop to stop (non-blocking)
    pub fn request_stop(&self) {
        debug!(name = %self.name, "Requesting loop stop");
        self.stop_signal.store(true, Ordering::SeqCst);
    }

    /// Stop the loop and wait for the thread to finish
    pub fn stop(&mut self) {
        self.request_stop();
        self.join();
    }

    /// Wait for the thread to finish without sending stop signal
    ///
    /// Useful if the loop stops itself via `LoopAction::Stop`.
    pub fn join(&mut self) {
        if let Some(handle) = self.thread_handle.take() {
            debug!(name = %self.name, "Waiting for loop thread to finish");
            if let Err(e) = handle.join() {
                warn!(name = %self.name, "Loop thread panicked: {:?}", e);
            }
        }
    }
}

impl Drop for LoopController {
    fn drop(&mut self) {
        if self.thread_handle.is_some() {
            debug!(name = %self.name, "LoopController dropped, stopping loop");
            self.stop();
        }
    }
}

/// Counters updated by a running [`FrameLoop`]
#[derive(Debug, Default)]
pub struct LoopStats {
    processed: AtomicU64,
    passthrough: AtomicU64,
    rejected: AtomicU64,
    over_budget: AtomicU64,
    processing_micros: AtomicU64,
}

/// Point-in-time copy of [`LoopStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStatsSnapshot {
    /// Frames run through a transform
    pub processed: u64,
    /// Frames shown unmodified (Normal mode)
    pub passthrough: u64,
    /// Malformed frames refused by the processing core
    pub rejected: u64,
    /// Processed frames that took longer than the frame budget
    pub over_budget: u64,
    /// Total time spent inside transforms
    pub processing_time: Duration,
}

impl LoopStatsSnapshot {
    /// Mean transform time per processed frame
    pub fn mean_processing_time(&self) -> Duration {
        if self.processed == 0 {
            Duration::ZERO
        } else {
            self.processing_time / self.processed as u32
        }
    }

    /// Frames that reached the sink
    pub fn presented(&self) -> u64 {
        self.processed + self.passthrough
    }
}

impl LoopStats {
    pub fn snapshot(&self) -> LoopStatsSnapshot {
        LoopStatsSnapshot {
            processed: self.processed.load(Ordering::Relaxed),
            passthrough: self.passthrough.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            over_budget: self.over_budget.load(Ordering::Relaxed),
            processing_time: Duration::from_micros(self.processing_micros.load(Ordering::Relaxed)),
        }
    }

    fn record_processed(&self, elapsed: Duration, budget: Duration) -> u64 {
        self.processing_micros
            .fetch_add(elapsed.as_micros() as u64, Ordering::Relaxed);
        if elapsed > budget {
            self.over_budget.fetch_add(1, Ordering::Relaxed);
        }
        self.processed.fetch_add(1, Ordering::Relaxed) + 1
    }
}

/// Consumer thread of the preview pipeline
///
/// Frames that arrive while one is being processed replace each other in the
/// slot, so the loop always works on the newest frame and never queues.
pub struct FrameLoop {
    controller: LoopController,
    stats: Arc<LoopStats>,
}

impl FrameLoop {
    /// Start consuming `frames` into `sink`
    ///
    /// The loop ends when stopped or once `frames` is closed and drained.
    /// Processing slower than `budget` is counted, not skipped.
    pub fn spawn<S>(
        name: &str,
        frames: Arc<LatestFrame<RawFrame>>,
        processor: Arc<FrameProcessor>,
        mode: ModeSwitch,
        budget: Duration,
        mut sink: S,
    ) -> Self
    where
        S: FrameSink + Send + 'static,
    {
        let stats = Arc::new(LoopStats::default());
        let loop_stats = Arc::clone(&stats);
        let loop_name = name.to_string();

        let controller = LoopController::start(name, move || {
            let Some(raw) = frames.take_timeout(FRAME_WAIT_TIMEOUT) else {
                return if frames.is_closed() {
                    LoopAction::Stop
                } else {
                    LoopAction::Continue
                };
            };

            let frame = match raw.into_buffer() {
                Ok(frame) => frame,
                Err(e) => {
                    warn!(name = %loop_name, error = %e, "Rejected frame");
                    loop_stats.rejected.fetch_add(1, Ordering::Relaxed);
                    return LoopAction::Continue;
                }
            };

            let current = mode.get();
            let started = Instant::now();
            match processor.process_mode(&frame, current) {
                None => {
                    sink.present(&frame);
                    loop_stats.passthrough.fetch_add(1, Ordering::Relaxed);
                }
                Some(output) => {
                    let elapsed = started.elapsed();
                    let count = loop_stats.record_processed(elapsed, budget);
                    if elapsed > budget {
                        debug!(
                            name = %loop_name,
                            mode = %current,
                            elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                            "Frame over budget"
                        );
                    }
                    if count % FRAME_LOG_INTERVAL == 0 {
                        debug!(
                            name = %loop_name,
                            frames = count,
                            width = output.width(),
                            height = output.height(),
                            "Processed frames"
                        );
                    }
                    sink.present(&output);
                    processor.recycle(output);
                }
            }

            LoopAction::Continue
        });

        Self { controller, stats }
    }

    pub fn stats(&self) -> LoopStatsSnapshot {
        self.stats.snapshot()
    }

    pub fn is_running(&self) -> bool {
        self.controller.is_running()
    }

    /// Stop immediately, abandoning any pending frame
    pub fn stop(&mut self) {
        self.controller.stop();
    }

    /// Wait for the loop to end on its own (after its slot is closed)
    pub fn join(&mut self) {
        self.controller.join();
    }
}
