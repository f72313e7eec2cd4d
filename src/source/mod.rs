mod disk;

pub use disk::DiskSource;

use anyhow::Result;
use image::RgbImage;
use std::path::Path;

/// Trait for anything that can hand the session an image to annotate
pub trait ImageSource {
    /// Decode the image at `path` into 8-bit RGB
    fn load(&mut self, path: &Path) -> Result<RgbImage>;
}
