/// Uniform scale-to-fit placement of an image inside a surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fit {
    pub scale: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

/// Maps presentation-surface coordinates onto mask coordinates.
///
/// The fit is recomputed whenever the surface or the image changes, so a
/// stroke is never rasterized with a scale from a previous layout.
#[derive(Debug, Clone)]
pub struct CoordinateMapper {
    surface: (f32, f32),
    image: Option<(u32, u32)>,
    fit: Option<Fit>,
}

impl CoordinateMapper {
    pub fn new(surface_width: f32, surface_height: f32) -> Self {
        Self {
            surface: (surface_width, surface_height),
            image: None,
            fit: None,
        }
    }

    pub fn resize(&mut self, surface_width: f32, surface_height: f32) {
        self.surface = (surface_width, surface_height);
        self.refit();
    }

    /// `None` detaches the mapper until the next image arrives
    pub fn set_image(&mut self, dimensions: Option<(u32, u32)>) {
        self.image = dimensions;
        self.refit();
    }

    pub fn surface(&self) -> (f32, f32) {
        self.surface
    }

    pub fn fit(&self) -> Option<Fit> {
        self.fit
    }

    /// Surface point to mask pixel, clamped onto the image.
    ///
    /// Returns `None` when no image is active or the surface has no area.
    pub fn to_image(&self, px: f32, py: f32) -> Option<(u32, u32)> {
        let fit = self.fit?;
        let (w, h) = self.image?;

        let x = ((px - fit.offset_x) / fit.scale).clamp(0.0, (w - 1) as f32);
        let y = ((py - fit.offset_y) / fit.scale).clamp(0.0, (h - 1) as f32);
        Some((x as u32, y as u32))
    }

    fn refit(&mut self) {
        let (cw, ch) = self.surface;
        self.fit = match self.image {
            Some((w, h)) if w > 0 && h > 0 && cw > 0.0 && ch > 0.0 => {
                let scale = (cw / w as f32).min(ch / h as f32);
                Some(Fit {
                    scale,
                    offset_x: (cw - w as f32 * scale) / 2.0,
                    offset_y: (ch - h as f32 * scale) / 2.0,
                })
            }
            _ => None,
        };
        tracing::debug!("surface {}x{} fit {:?}", cw, ch, self.fit);
    }
}
