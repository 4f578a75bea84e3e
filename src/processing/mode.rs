// SPDX-License-Identifier: GPL-3.0-only

//! Display modes and the transforms they select

use serde::{Deserialize, Serialize};

/// What the preview shows
///
/// The mode belongs to the caller (the UI toggle). Only [`Mode::Gray`] and
/// [`Mode::Edge`] involve the processing core; [`Mode::Normal`] frames are
/// shown as delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Mode {
    /// Raw camera passthrough
    #[default]
    Normal,
    /// Luma grayscale
    Gray,
    /// Edge map
    Edge,
}

/// A transform the processing core can run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transform {
    Gray,
    Edge,
}

impl Mode {
    /// All modes in toggle order
    pub const ALL: [Mode; 3] = [Mode::Normal, Mode::Gray, Mode::Edge];

    /// Next mode in the toggle cycle (Normal -> Gray -> Edge -> Normal)
    pub fn next(self) -> Self {
        match self {
            Mode::Normal => Mode::Gray,
            Mode::Gray => Mode::Edge,
            Mode::Edge => Mode::Normal,
        }
    }

    /// Toggle button caption
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Normal => "Mode: Normal",
            Mode::Gray => "Mode: Gray",
            Mode::Edge => "Mode: Edge",
        }
    }

    /// Short lowercase name, also used for output file suffixes
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Normal => "normal",
            Mode::Gray => "gray",
            Mode::Edge => "edge",
        }
    }

    /// Transform to run, or `None` when frames pass through untouched
    pub fn transform(&self) -> Option<Transform> {
        match self {
            Mode::Normal => None,
            Mode::Gray => Some(Transform::Gray),
            Mode::Edge => Some(Transform::Edge),
        }
    }

    pub(crate) fn to_u8(self) -> u8 {
        match self {
            Mode::Normal => 0,
            Mode::Gray => 1,
            Mode::Edge => 2,
        }
    }

    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            1 => Mode::Gray,
            2 => Mode::Edge,
            _ => Mode::Normal,
        }
    }
}

impl From<Transform> for Mode {
    fn from(transform: Transform) -> Self {
        match transform {
            Transform::Gray => Mode::Gray,
            Transform::Edge => Mode::Edge,
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" | "none" => Ok(Mode::Normal),
            "gray" | "grey" => Ok(Mode::Gray),
            "edge" | "edges" => Ok(Mode::Edge),
            other => Err(format!(
                "unknown mode '{}' (expected normal, gray or edge)",
                other
            )),
        }
    }
}
