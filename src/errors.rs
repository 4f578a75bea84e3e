// SPDX-License-Identifier: GPL-3.0-only

//! Error types for frame processing and the surrounding application

use crate::processing::PixelFormat;
use std::fmt;

/// Result type alias for the processing core
pub type ProcessResult<T> = Result<T, ProcessError>;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Contract violations rejected by the processing core
///
/// Both variants mean the caller handed over malformed data. The core fails
/// fast instead of attempting recovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessError {
    /// Non-positive width/height, or a byte length that does not match them
    InvalidDimensions { width: i64, height: i64, len: usize },
    /// Frame is not interleaved RGBA8
    UnsupportedFormat(PixelFormat),
}

/// Main application error type
#[derive(Debug, Clone)]
pub enum AppError {
    /// Frame processing rejected its input
    Process(ProcessError),
    /// Configuration errors
    Config(String),
    /// Storage/filesystem errors
    Storage(String),
    /// Image decode/encode errors
    Image(String),
    /// Generic error with message
    Other(String),
}

impl fmt::Display for ProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessError::InvalidDimensions { width, height, len } => write!(
                f,
                "Invalid dimensions: {}x{} does not describe {} bytes of RGBA8",
                width, height, len
            ),
            ProcessError::UnsupportedFormat(format) => {
                write!(f, "Unsupported format: {} (expected RGBA8)", format)
            }
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Process(e) => write!(f, "Processing error: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Storage(msg) => write!(f, "Storage error: {}", msg),
            AppError::Image(msg) => write!(f, "Image error: {}", msg),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ProcessError {}
impl std::error::Error for AppError {}

impl From<ProcessError> for AppError {
    fn from(err: ProcessError) -> Self {
        AppError::Process(err)
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Other(msg.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<image::ImageError> for AppError {
    fn from(err: image::ImageError) -> Self {
        AppError::Image(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_dimensions_message() {
        let err = ProcessError::InvalidDimensions {
            width: 4,
            height: 2,
            len: 10,
        };
        let msg = err.to_string();
        assert!(msg.contains("4x2"));
        assert!(msg.contains("10 bytes"));
    }

    #[test]
    fn test_process_error_wraps_into_app_error() {
        let app: AppError = ProcessError::UnsupportedFormat(PixelFormat::Rgb8).into();
        assert!(matches!(
            app,
            AppError::Process(ProcessError::UnsupportedFormat(PixelFormat::Rgb8))
        ));
        assert!(app.to_string().starts_with("Processing error"));
    }
}
