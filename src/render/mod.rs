mod export;
mod live;

pub use export::ExportPreview;
pub use live::LivePreview;

use image::{Rgb, RgbImage};

use crate::mask::MaskBuffer;

/// Light sky blue
pub const OVERLAY_COLOR: Rgb<u8> = Rgb([135, 206, 250]);

/// Trait for turning an (image, mask) pair into something a person looks at
/// Allows swapping between the live editing view and the saved preview
pub trait Compositor {
    /// Render the mask over the image
    ///
    /// # Arguments
    /// * `image` - Source image, never modified
    /// * `mask` - Binary mask with the same dimensions as `image`
    ///
    /// # Returns
    /// * A new RGB image with the same dimensions
    fn compose(&self, image: &RgbImage, mask: &MaskBuffer) -> RgbImage;
}

/// Linear mix of one channel toward `tint`, rounded back into `u8`
fn mix(base: u8, tint: u8, weight: f32) -> u8 {
    (base as f32 * (1.0 - weight) + tint as f32 * weight)
        .round()
        .clamp(0.0, 255.0) as u8
}

fn mix_pixel(base: &Rgb<u8>, tint: &Rgb<u8>, weight: f32) -> Rgb<u8> {
    Rgb([
        mix(base[0], tint[0], weight),
        mix(base[1], tint[1], weight),
        mix(base[2], tint[2], weight),
    ])
}
