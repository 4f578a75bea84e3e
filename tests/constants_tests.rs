// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for constants module

use edgeviewer::constants::{edges, frame_interval, luma, pipeline};
use std::time::Duration;

#[test]
fn test_luma_weights_match_bt601() {
    assert_eq!(luma::WEIGHT_R, 299);
    assert_eq!(luma::WEIGHT_G, 587);
    assert_eq!(luma::WEIGHT_B, 114);
}

#[test]
fn test_default_budget_fits_default_frame_rate() {
    // 33 ms is just under one frame interval at 30 fps
    let interval = frame_interval(pipeline::DEFAULT_FPS);
    assert!(Duration::from_millis(pipeline::DEFAULT_FRAME_BUDGET_MS) <= interval);
}

#[test]
fn test_frame_wait_shorter_than_frame_interval_at_low_rates() {
    assert!(pipeline::FRAME_WAIT_TIMEOUT < frame_interval(10));
}

#[test]
fn test_direction_quantisation_bounds() {
    // tan(22.5°) * tan(67.5°) == 1
    let product = edges::TAN_22_5_MILLI * edges::TAN_67_5_MILLI;
    assert!((product - 1_000_000).abs() < 2_000);
}
