// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for configuration module

use edgeviewer::Config;
use edgeviewer::Mode;
use edgeviewer::processing::EdgeOperator;
use std::path::PathBuf;

fn temp_config(name: &str) -> PathBuf {
    std::env::temp_dir()
        .join(format!("edgeviewer-config-{}-{}", name, std::process::id()))
        .join("config.json")
}

#[test]
fn test_config_default() {
    let config = Config::default();

    // Preview starts unprocessed, like the camera app
    assert_eq!(config.default_mode, Mode::Normal);
    assert_eq!(config.edge.operator, EdgeOperator::Sobel);
    assert_eq!((config.edge.canny_low, config.edge.canny_high), (80, 150));
    assert!(config.pool_buffers, "Buffer pooling should be on by default");
    assert_eq!(config.frame_budget_ms, 33);
}

#[test]
fn test_missing_file_gives_defaults() {
    let path = temp_config("missing");
    let config = Config::load_from(&path).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_save_and_reload() {
    let path = temp_config("roundtrip");
    let mut config = Config::default();
    config.default_mode = Mode::Edge;
    config.edge.operator = EdgeOperator::Canny;
    config.worker_threads = 2;

    config.save_to(&path).unwrap();
    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded, config);

    if let Some(dir) = path.parent() {
        let _ = std::fs::remove_dir_all(dir);
    }
}

#[test]
fn test_malformed_file_is_config_error() {
    let path = temp_config("malformed");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "{ not json").unwrap();

    let result = Config::load_from(&path);
    assert!(matches!(result, Err(edgeviewer::AppError::Config(_))));

    if let Some(dir) = path.parent() {
        let _ = std::fs::remove_dir_all(dir);
    }
}
