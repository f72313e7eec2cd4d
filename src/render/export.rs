use image::{Rgb, RgbImage};
use ndarray::Array2;

use super::{mix_pixel, Compositor, OVERLAY_COLOR};
use crate::mask::MaskBuffer;

/// Preview written next to each saved mask
///
/// The binary mask is feathered with a separable Gaussian blur and the
/// result, scaled by `strength`, is used as the tint alpha. No outline is
/// drawn, so the preview shows a soft-edged wash rather than a hard region.
pub struct ExportPreview {
    color: Rgb<u8>,
    strength: f32,
    kernel: Vec<f32>,
}

impl ExportPreview {
    /// # Arguments
    /// * `color` - Tint color
    /// * `strength` - Alpha multiplier applied after blurring
    /// * `kernel_size` - Number of taps, forced odd
    pub fn new(color: Rgb<u8>, strength: f32, kernel_size: usize) -> Self {
        Self {
            color,
            strength,
            kernel: gaussian_kernel(kernel_size | 1),
        }
    }

    /// Blurred mask as alpha in 0.0-1.0, indexed `[[y, x]]`
    fn feathered_alpha(&self, mask: &MaskBuffer) -> Array2<f32> {
        let (width, height) = mask.dimensions();
        let (w, h) = (width as usize, height as usize);
        let radius = (self.kernel.len() / 2) as isize;
        let gray = mask.as_gray();

        let alpha = Array2::from_shape_fn((h, w), |(y, x)| {
            gray.get_pixel(x as u32, y as u32)[0] as f32 / 255.0
        });

        let horizontal = Array2::from_shape_fn((h, w), |(y, x)| {
            self.kernel
                .iter()
                .enumerate()
                .map(|(k, weight)| {
                    let sx = reflect_101(x as isize + k as isize - radius, w);
                    weight * alpha[[y, sx]]
                })
                .sum::<f32>()
        });

        Array2::from_shape_fn((h, w), |(y, x)| {
            self.kernel
                .iter()
                .enumerate()
                .map(|(k, weight)| {
                    let sy = reflect_101(y as isize + k as isize - radius, h);
                    weight * horizontal[[sy, x]]
                })
                .sum::<f32>()
        })
    }
}

impl Default for ExportPreview {
    fn default() -> Self {
        Self::new(OVERLAY_COLOR, 0.5, 15)
    }
}

impl Compositor for ExportPreview {
    fn compose(&self, image: &RgbImage, mask: &MaskBuffer) -> RgbImage {
        let _span = tracing::debug_span!("export_preview").entered();

        let mut canvas = image.clone();
        if mask.is_empty() {
            return canvas;
        }

        let alpha = self.feathered_alpha(mask);
        for (x, y, pixel) in canvas.enumerate_pixels_mut() {
            let a = alpha[[y as usize, x as usize]].clamp(0.0, 1.0) * self.strength;
            if a > 0.0 {
                *pixel = mix_pixel(pixel, &self.color, a);
            }
        }
        canvas
    }
}

/// Normalized Gaussian taps, sigma derived from the size the same way
/// common vision libraries do when no sigma is given
fn gaussian_kernel(size: usize) -> Vec<f32> {
    let sigma = 0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8;
    let center = (size / 2) as f32;
    let taps: Vec<f32> = (0..size)
        .map(|i| {
            let d = i as f32 - center;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let total: f32 = taps.iter().sum();
    taps.into_iter().map(|t| t / total).collect()
}

/// Mirror an out-of-range index without repeating the edge sample
fn reflect_101(mut i: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let last = len as isize - 1;
    while i < 0 || i > last {
        if i < 0 {
            i = -i;
        }
        if i > last {
            i = 2 * last - i;
        }
    }
    i as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn half_mask(width: u32, height: u32) -> MaskBuffer {
        let mut mask = MaskBuffer::new(width, height);
        for y in 0..height {
            for x in 0..width / 2 {
                mask.set(x, y, true);
            }
        }
        mask
    }

    #[test]
    fn kernel_is_normalized_and_symmetric() {
        let kernel = gaussian_kernel(15);
        assert_eq!(kernel.len(), 15);
        assert!((kernel.iter().sum::<f32>() - 1.0).abs() < 1e-5);
        assert!((kernel[0] - kernel[14]).abs() < 1e-7);
        assert!(kernel[7] > kernel[6]);
    }

    #[test]
    fn reflect_101_mirrors() {
        assert_eq!(reflect_101(-1, 5), 1);
        assert_eq!(reflect_101(-3, 5), 3);
        assert_eq!(reflect_101(5, 5), 3);
        assert_eq!(reflect_101(2, 5), 2);
        assert_eq!(reflect_101(-9, 3), 1);
        assert_eq!(reflect_101(4, 1), 0);
    }

    #[test]
    fn empty_mask_leaves_image_alone() {
        let image = RgbImage::from_pixel(10, 10, Rgb([90, 60, 30]));
        let mask = MaskBuffer::new(10, 10);
        assert_eq!(ExportPreview::default().compose(&image, &mask), image);
    }

    #[test]
    fn full_mask_is_half_tinted() {
        let image = RgbImage::from_pixel(24, 24, Rgb([0, 0, 0]));
        let mut mask = MaskBuffer::new(24, 24);
        for y in 0..24 {
            for x in 0..24 {
                mask.set(x, y, true);
            }
        }
        let out = ExportPreview::default().compose(&image, &mask);
        let p = out.get_pixel(12, 12);
        for (got, want) in p.0.iter().zip([68u8, 103, 125]) {
            assert!(got.abs_diff(want) <= 1, "{got} vs {want}");
        }
    }

    #[test]
    fn edge_is_feathered() {
        let image = RgbImage::from_pixel(60, 8, Rgb([0, 0, 0]));
        let mask = half_mask(60, 8);
        let out = ExportPreview::default().compose(&image, &mask);

        let blue: Vec<u8> = (0..60).map(|x| out.get_pixel(x, 4)[2]).collect();
        // deep inside: full half-strength tint, far outside: untouched
        assert!(blue[2].abs_diff(125) <= 1);
        assert_eq!(blue[57], 0);
        // soft falloff across the boundary, no hard step
        assert!(blue[29] > 0 && blue[29] < 125);
        assert!(blue[30] > 0 && blue[30] < 125);
        for pair in blue.windows(2) {
            assert!(pair[0] >= pair[1]);
        }
    }
}
