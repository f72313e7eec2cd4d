use image::{Rgb, RgbImage};

use super::{mix_pixel, Compositor, OVERLAY_COLOR};
use crate::mask::{outer_contours, MaskBuffer};

/// Editing view: translucent tint over the labeled pixels plus a crisp
/// outline along every outer contour
pub struct LivePreview {
    color: Rgb<u8>,
    weight: f32,
    outline: u32,
}

impl LivePreview {
    pub fn new(color: Rgb<u8>, weight: f32, outline: u32) -> Self {
        Self {
            color,
            weight,
            outline,
        }
    }

    fn stroke_outline(&self, canvas: &mut RgbImage, mask: &MaskBuffer) {
        let (width, height) = canvas.dimensions();
        let lo = -((self.outline as i64 - 1) / 2);
        let hi = self.outline as i64 / 2;

        for contour in outer_contours(mask) {
            for &(x, y) in &contour.points {
                for dy in lo..=hi {
                    for dx in lo..=hi {
                        let px = i64::from(x) + dx;
                        let py = i64::from(y) + dy;
                        if px >= 0 && py >= 0 && px < i64::from(width) && py < i64::from(height) {
                            canvas.put_pixel(px as u32, py as u32, self.color);
                        }
                    }
                }
            }
        }
    }
}

impl Default for LivePreview {
    fn default() -> Self {
        Self::new(OVERLAY_COLOR, 0.45, 2)
    }
}

impl Compositor for LivePreview {
    fn compose(&self, image: &RgbImage, mask: &MaskBuffer) -> RgbImage {
        let _span = tracing::debug_span!("live_preview").entered();

        let mut canvas = image.clone();
        for (x, y, pixel) in canvas.enumerate_pixels_mut() {
            if mask.is_set(x, y) {
                *pixel = mix_pixel(pixel, &self.color, self.weight);
            }
        }

        self.stroke_outline(&mut canvas, mask);
        canvas
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_square(size: u32, x0: u32, x1: u32) -> MaskBuffer {
        let mut mask = MaskBuffer::new(size, size);
        for y in x0..=x1 {
            for x in x0..=x1 {
                mask.set(x, y, true);
            }
        }
        mask
    }

    #[test]
    fn empty_mask_leaves_image_alone() {
        let image = RgbImage::from_pixel(12, 9, Rgb([10, 20, 30]));
        let mask = MaskBuffer::new(12, 9);
        assert_eq!(LivePreview::default().compose(&image, &mask), image);
    }

    #[test]
    fn interior_is_tinted_and_border_is_solid() {
        let image = RgbImage::from_pixel(20, 20, Rgb([10, 10, 10]));
        let mask = filled_square(20, 5, 14);
        let out = LivePreview::default().compose(&image, &mask);

        assert_eq!(*out.get_pixel(10, 10), Rgb([66, 98, 118]));
        assert_eq!(*out.get_pixel(5, 5), OVERLAY_COLOR);
        assert_eq!(*out.get_pixel(14, 9), OVERLAY_COLOR);
        assert_eq!(*out.get_pixel(1, 1), Rgb([10, 10, 10]));
    }

    #[test]
    fn outline_is_two_pixels_wide() {
        let image = RgbImage::from_pixel(20, 20, Rgb([0, 0, 0]));
        let mask = filled_square(20, 5, 14);
        let out = LivePreview::default().compose(&image, &mask);

        // left edge at x=5 spreads one pixel inward
        assert_eq!(*out.get_pixel(6, 10), OVERLAY_COLOR);
        assert_ne!(*out.get_pixel(7, 10), OVERLAY_COLOR);
    }

    #[test]
    fn source_image_is_not_mutated() {
        let image = RgbImage::from_pixel(8, 8, Rgb([1, 2, 3]));
        let before = image.clone();
        let mask = filled_square(8, 2, 5);
        let _ = LivePreview::default().compose(&image, &mask);
        assert_eq!(image, before);
    }
}
