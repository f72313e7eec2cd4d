mod fill;
mod stroke;

pub use fill::{fill_enclosed, outer_contours, Contour};
pub use stroke::apply_stroke;

use image::{GrayImage, Luma};

pub const MASK_BACKGROUND: u8 = 0;
pub const MASK_FOREGROUND: u8 = u8::MAX;

pub const MIN_BRUSH_SIZE: u8 = 1;
pub const MAX_BRUSH_SIZE: u8 = 20;
pub const DEFAULT_BRUSH_SIZE: u8 = 3;

/// Binary label raster
///
/// Same dimensions as the image it annotates. Every pixel is either
/// `MASK_BACKGROUND` or `MASK_FOREGROUND`; the only way in is through
/// `set`, the stroke rasterizer or the region filler, all of which write
/// one of the two values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskBuffer {
    pixels: GrayImage,
}

impl MaskBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: GrayImage::new(width, height),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn clear(&mut self) {
        for p in self.pixels.pixels_mut() {
            p[0] = MASK_BACKGROUND;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.pixels().all(|p| p[0] == MASK_BACKGROUND)
    }

    /// Number of foreground pixels
    pub fn count(&self) -> usize {
        self.pixels
            .pixels()
            .filter(|p| p[0] == MASK_FOREGROUND)
            .count()
    }

    pub fn is_set(&self, x: u32, y: u32) -> bool {
        x < self.width() && y < self.height() && self.pixels.get_pixel(x, y)[0] == MASK_FOREGROUND
    }

    /// Out-of-range coordinates are ignored
    pub fn set(&mut self, x: u32, y: u32, on: bool) {
        if x < self.width() && y < self.height() {
            let value = if on { MASK_FOREGROUND } else { MASK_BACKGROUND };
            self.pixels.put_pixel(x, y, Luma([value]));
        }
    }

    pub fn as_gray(&self) -> &GrayImage {
        &self.pixels
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrushMode {
    Draw,
    Erase,
}

impl BrushMode {
    /// Pen diameter in pixels for a given brush size.
    ///
    /// Erasing uses twice the draw diameter.
    pub fn diameter(self, size: u8) -> u32 {
        match self {
            BrushMode::Draw => u32::from(size) * 2,
            BrushMode::Erase => u32::from(size) * 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrushState {
    size: u8,
    pub mode: BrushMode,
}

impl BrushState {
    pub fn new(size: u8) -> Self {
        Self {
            size: size.clamp(MIN_BRUSH_SIZE, MAX_BRUSH_SIZE),
            mode: BrushMode::Draw,
        }
    }

    pub fn size(&self) -> u8 {
        self.size
    }

    /// Grow or shrink the brush, clamped to the valid range
    pub fn adjust(&mut self, delta: i32) -> u8 {
        let size = (i32::from(self.size) + delta)
            .clamp(i32::from(MIN_BRUSH_SIZE), i32::from(MAX_BRUSH_SIZE));
        self.size = size as u8;
        self.size
    }
}

impl Default for BrushState {
    fn default() -> Self {
        Self::new(DEFAULT_BRUSH_SIZE)
    }
}
