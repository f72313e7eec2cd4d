use super::{BrushMode, MaskBuffer};

/// Sweep a round pen from `from` to `to`, writing foreground for
/// `BrushMode::Draw` and background for `BrushMode::Erase`.
///
/// A pixel is covered when its center lies within half the pen diameter of
/// the segment, so `from == to` stamps a single disc.
pub fn apply_stroke(
    mask: &mut MaskBuffer,
    from: (u32, u32),
    to: (u32, u32),
    brush_size: u8,
    mode: BrushMode,
) {
    let (width, height) = mask.dimensions();
    if width == 0 || height == 0 {
        return;
    }

    let radius = mode.diameter(brush_size) as f32 / 2.0;
    let reach = radius.ceil() as i64;
    let on = mode == BrushMode::Draw;

    let (x0, y0) = (from.0 as f32, from.1 as f32);
    let (x1, y1) = (to.0 as f32, to.1 as f32);

    let min_x = (i64::from(from.0.min(to.0)) - reach).max(0);
    let max_x = (i64::from(from.0.max(to.0)) + reach).min(i64::from(width) - 1);
    let min_y = (i64::from(from.1.min(to.1)) - reach).max(0);
    let max_y = (i64::from(from.1.max(to.1)) + reach).min(i64::from(height) - 1);

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            if distance_to_segment(x as f32, y as f32, x0, y0, x1, y1) <= radius {
                mask.set(x as u32, y as u32, on);
            }
        }
    }
}

fn distance_to_segment(px: f32, py: f32, x0: f32, y0: f32, x1: f32, y1: f32) -> f32 {
    let (dx, dy) = (x1 - x0, y1 - y0);
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq == 0.0 {
        0.0
    } else {
        (((px - x0) * dx + (py - y0) * dy) / len_sq).clamp(0.0, 1.0)
    };
    let (cx, cy) = (x0 + dx * t, y0 + dy * t);
    ((px - cx).powi(2) + (py - cy).powi(2)).sqrt()
}
