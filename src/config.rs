// SPDX-License-Identifier: GPL-3.0-only

use crate::constants::pipeline;
use crate::errors::{AppError, AppResult};
use crate::processing::{EdgeSettings, Mode, ProcessingSettings, RowBands};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Persisted settings, stored as JSON in the user config directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Mode the preview starts in
    pub default_mode: Mode,
    /// Edge operator and Canny thresholds
    pub edge: EdgeSettings,
    /// Reuse output buffers between same-size frames
    pub pool_buffers: bool,
    /// Idle output buffers kept when pooling
    pub pool_capacity: usize,
    /// Threads for row-band processing (0 = one per CPU)
    pub worker_threads: usize,
    /// Frames below this many pixels are processed on the calling thread
    pub parallel_min_pixels: usize,
    /// Per-frame processing budget in milliseconds
    pub frame_budget_ms: u64,
    /// Where processed stills are written (None = ~/Pictures/edgeviewer)
    pub output_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_mode: Mode::Normal,
            edge: EdgeSettings::default(),
            pool_buffers: true,
            pool_capacity: pipeline::DEFAULT_POOL_CAPACITY,
            worker_threads: 0, // One per CPU
            parallel_min_pixels: pipeline::PARALLEL_MIN_PIXELS,
            frame_budget_ms: pipeline::DEFAULT_FRAME_BUDGET_MS,
            output_dir: None,
        }
    }
}

impl Config {
    /// `<config dir>/edgeviewer/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("edgeviewer").join("config.json"))
    }

    /// Load from the default location, falling back to defaults
    pub fn load() -> AppResult<Self> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => {
                debug!("No config directory available, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load from `path`; a missing file yields the defaults
    pub fn load_from(path: &Path) -> AppResult<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "Config file not found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str(&contents)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Write to the default location
    pub fn save(&self) -> AppResult<PathBuf> {
        let path = Self::default_path()
            .ok_or_else(|| AppError::Config("no config directory available".to_string()))?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Write to `path`, creating the parent directory
    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        info!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    pub fn to_json(&self) -> AppResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn frame_budget(&self) -> Duration {
        Duration::from_millis(self.frame_budget_ms)
    }

    /// Directory processed stills go to
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(crate::storage::default_output_dir)
    }

    /// Settings for a [`crate::processing::FrameProcessor`]
    pub fn processing_settings(&self) -> ProcessingSettings {
        let workers = match self.worker_threads {
            0 => pipeline::worker_threads(),
            n => n,
        };
        ProcessingSettings {
            edge: self.edge,
            bands: RowBands::new(workers, self.parallel_min_pixels),
            pool_capacity: self.pool_buffers.then_some(self.pool_capacity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_processing_settings_respects_pooling() {
        let mut config = Config::default();
        assert_eq!(
            config.processing_settings().pool_capacity,
            Some(pipeline::DEFAULT_POOL_CAPACITY)
        );

        config.pool_buffers = false;
        assert_eq!(config.processing_settings().pool_capacity, None);
    }

    #[test]
    fn test_explicit_worker_count() {
        let config = Config {
            worker_threads: 3,
            parallel_min_pixels: 10,
            ..Default::default()
        };
        assert_eq!(config.processing_settings().bands, RowBands::new(3, 10));
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: Config = serde_json::from_str(r#"{ "default_mode": "Edge" }"#).unwrap();
        assert_eq!(config.default_mode, Mode::Edge);
        assert_eq!(config.edge, EdgeSettings::default());
        assert!(config.pool_buffers);
    }
}
