use super::ImageSource;
use anyhow::{Context, Result};
use image::RgbImage;
use std::path::Path;

/// Decodes images straight from the filesystem
#[derive(Debug, Default)]
pub struct DiskSource;

impl ImageSource for DiskSource {
    fn load(&mut self, path: &Path) -> Result<RgbImage> {
        let decoded = image::open(path)
            .with_context(|| format!("Failed to decode {}", path.display()))?;

        let frame = decoded.into_rgb8();
        tracing::debug!(
            "Loaded {} ({}x{})",
            path.display(),
            frame.width(),
            frame.height()
        );

        Ok(frame)
    }
}
