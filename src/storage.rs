// SPDX-License-Identifier: GPL-3.0-only

//! Loading still images into frames and saving processed frames

use crate::errors::{AppError, AppResult};
use crate::processing::{Mode, PixelBuffer};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory processed frames go to when none is configured
///
/// `~/Pictures/edgeviewer`, falling back to the current directory.
pub fn default_output_dir() -> PathBuf {
    dirs::picture_dir()
        .map(|dir| dir.join("edgeviewer"))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Output path for `input` processed in `mode`: `<dir>/<stem>_<mode>.png`
pub fn output_path(dir: &Path, input: &Path, mode: Mode) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "frame".to_string());
    dir.join(format!("{}_{}.png", stem, mode.name()))
}

/// Timestamped file name for a captured frame, e.g. `edge_20250101_120000.png`
pub fn timestamped_name(mode: Mode) -> String {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    format!("{}_{}.png", mode.name(), timestamp)
}

/// Decode any supported image file into an RGBA8 frame
pub fn load_frame(path: &Path) -> AppResult<PixelBuffer> {
    debug!(path = %path.display(), "Loading frame");
    let image = image::open(path)?.to_rgba8();
    let (width, height) = image.dimensions();
    Ok(PixelBuffer::new(width, height, image.into_raw())?)
}

/// Encode a frame as PNG, creating the parent directory if needed
pub fn save_frame(frame: &PixelBuffer, path: &Path) -> AppResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let (width, height) = frame.dimensions();
    let image = image::RgbaImage::from_raw(width, height, frame.as_bytes().to_vec())
        .ok_or_else(|| AppError::Image("frame does not fit its dimensions".to_string()))?;
    image.save_with_format(path, image::ImageFormat::Png)?;

    debug!(path = %path.display(), width, height, "Saved frame");
    Ok(())
}

/// Save `frame` into `dir` under a timestamped name for `mode`
pub fn save_snapshot(frame: &PixelBuffer, dir: &Path, mode: Mode) -> AppResult<PathBuf> {
    let path = dir.join(timestamped_name(mode));
    save_frame(frame, &path)?;
    Ok(path)
}

/// [`load_frame`] on the blocking thread pool
pub async fn load_frame_async(path: PathBuf) -> AppResult<PixelBuffer> {
    tokio::task::spawn_blocking(move || load_frame(&path))
        .await
        .map_err(|e| AppError::Other(format!("Load task error: {}", e)))?
}

/// [`save_frame`] on the blocking thread pool
pub async fn save_frame_async(frame: PixelBuffer, path: PathBuf) -> AppResult<PathBuf> {
    tokio::task::spawn_blocking(move || save_frame(&frame, &path).map(|()| path))
        .await
        .map_err(|e| AppError::Other(format!("Save task error: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("edgeviewer-{}-{}", name, std::process::id()))
    }

    #[test]
    fn test_output_path() {
        let path = output_path(Path::new("/out"), Path::new("/in/photo.jpg"), Mode::Edge);
        assert_eq!(path, PathBuf::from("/out/photo_edge.png"));
    }

    #[test]
    fn test_timestamped_name() {
        let name = timestamped_name(Mode::Gray);
        assert!(name.starts_with("gray_"));
        assert!(name.ends_with(".png"));
    }

    #[test]
    fn test_save_then_load() {
        let dir = temp_dir("roundtrip");
        let path = dir.join("nested").join("frame.png");
        let frame = PixelBuffer::from_fn(3, 2, |x, y| [x as u8 * 80, y as u8 * 100, 7, 255])
            .unwrap();

        save_frame(&frame, &path).unwrap();
        let loaded = load_frame(&path).unwrap();
        assert_eq!(loaded, frame);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_save_snapshot() {
        let dir = temp_dir("snapshot");
        let frame = PixelBuffer::filled(2, 2, [0, 0, 0, 255]).unwrap();

        let path = save_snapshot(&frame, &dir, Mode::Edge).unwrap();
        assert_eq!(path.parent(), Some(dir.as_path()));
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("edge_"));
        assert_eq!(load_frame(&path).unwrap(), frame);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_frame(Path::new("/nonexistent/edgeviewer/frame.png"));
        assert!(matches!(result, Err(AppError::Image(_))));
    }

    #[tokio::test]
    async fn test_async_save() {
        let dir = temp_dir("async");
        let path = dir.join("frame.png");
        let frame = PixelBuffer::filled(4, 4, [10, 20, 30, 255]).unwrap();

        let saved = save_frame_async(frame.clone(), path.clone()).await.unwrap();
        assert_eq!(saved, path);
        assert_eq!(load_frame_async(path).await.unwrap(), frame);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
