use std::collections::HashSet;

use image::Luma;
use imageproc::contours::{find_contours, BorderType};
use imageproc::region_labelling::{connected_components, Connectivity};

use super::{MaskBuffer, MASK_BACKGROUND, MASK_FOREGROUND};

/// Closed boundary of one top-level foreground component, in tracing order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contour {
    pub points: Vec<(u32, u32)>,
}

/// Outer boundaries of all foreground components that are not nested inside
/// another component's hole
pub fn outer_contours(mask: &MaskBuffer) -> Vec<Contour> {
    find_contours::<u32>(mask.as_gray())
        .into_iter()
        .filter(|c| matches!(c.border_type, BorderType::Outer) && c.parent.is_none())
        .map(|c| Contour {
            points: c.points.into_iter().map(|p| (p.x, p.y)).collect(),
        })
        .collect()
}

/// Replace the mask with the filled interiors of its outer contours.
///
/// Background pixels that cannot reach the image frame through
/// 4-connected background are enclosed and become foreground. Returns the
/// number of filled regions (8-connected components of the result). When
/// that is zero the mask is left untouched.
pub fn fill_enclosed(mask: &mut MaskBuffer) -> usize {
    let _span = tracing::debug_span!("fill_enclosed").entered();

    let (width, height) = mask.dimensions();
    if width == 0 || height == 0 {
        return 0;
    }

    // Label the background; foreground pixels get label 0
    let gaps = connected_components(mask.as_gray(), Connectivity::Four, Luma([MASK_FOREGROUND]));

    let mut exterior = HashSet::new();
    for x in 0..width {
        exterior.insert(gaps.get_pixel(x, 0)[0]);
        exterior.insert(gaps.get_pixel(x, height - 1)[0]);
    }
    for y in 0..height {
        exterior.insert(gaps.get_pixel(0, y)[0]);
        exterior.insert(gaps.get_pixel(width - 1, y)[0]);
    }

    let mut filled = mask.clone();
    for (x, y, label) in gaps.enumerate_pixels() {
        let label = label[0];
        if label != 0 && !exterior.contains(&label) {
            filled.set(x, y, true);
        }
    }

    let regions = count_regions(&filled);
    if regions > 0 {
        *mask = filled;
    }

    tracing::debug!("fill found {} region(s)", regions);
    regions
}

fn count_regions(mask: &MaskBuffer) -> usize {
    let labels = connected_components(mask.as_gray(), Connectivity::Eight, Luma([MASK_BACKGROUND]));
    labels
        .pixels()
        .map(|p| p[0])
        .filter(|&l| l != 0)
        .collect::<HashSet<u32>>()
        .len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draw_rect_outline(mask: &mut MaskBuffer, x0: u32, y0: u32, x1: u32, y1: u32) {
        for x in x0..=x1 {
            mask.set(x, y0, true);
            mask.set(x, y1, true);
        }
        for y in y0..=y1 {
            mask.set(x0, y, true);
            mask.set(x1, y, true);
        }
    }

    /// Deterministic noise masks so idempotence is checked on messy input
    fn noisy_mask(seed: u64, width: u32, height: u32) -> MaskBuffer {
        let mut state = seed;
        let mut mask = MaskBuffer::new(width, height);
        for y in 0..height {
            for x in 0..width {
                state = state
                    .wrapping_mul(6364136223846793005)
                    .wrapping_add(1442695040888963407);
                if (state >> 33) % 3 == 0 {
                    mask.set(x, y, true);
                }
            }
        }
        mask
    }

    #[test]
    fn empty_mask_reports_no_region() {
        let mut mask = MaskBuffer::new(10, 10);
        assert_eq!(fill_enclosed(&mut mask), 0);
        assert!(mask.is_empty());
    }

    #[test]
    fn closed_outline_becomes_solid() {
        let mut mask = MaskBuffer::new(20, 20);
        draw_rect_outline(&mut mask, 3, 4, 12, 15);

        assert_eq!(fill_enclosed(&mut mask), 1);
        assert_eq!(mask.count(), 10 * 12);
        assert!(mask.is_set(7, 9));
        assert!(!mask.is_set(2, 9));
    }

    #[test]
    fn open_curve_keeps_only_its_stroke() {
        let mut mask = MaskBuffer::new(20, 20);
        // U shape, open at the top
        for y in 3..15 {
            mask.set(3, y, true);
            mask.set(12, y, true);
        }
        for x in 3..=12 {
            mask.set(x, 14, true);
        }
        let before = mask.clone();

        assert_eq!(fill_enclosed(&mut mask), 1);
        assert_eq!(mask, before);
    }

    #[test]
    fn nested_island_is_absorbed() {
        let mut mask = MaskBuffer::new(30, 30);
        draw_rect_outline(&mut mask, 2, 2, 27, 27);
        draw_rect_outline(&mut mask, 10, 10, 15, 15);

        assert_eq!(outer_contours(&mask).len(), 1);
        assert_eq!(fill_enclosed(&mut mask), 1);
        assert_eq!(mask.count(), 26 * 26);
    }

    #[test]
    fn separate_regions_are_counted() {
        let mut mask = MaskBuffer::new(40, 20);
        draw_rect_outline(&mut mask, 1, 1, 10, 10);
        draw_rect_outline(&mut mask, 20, 5, 30, 15);

        assert_eq!(outer_contours(&mask).len(), 2);
        assert_eq!(fill_enclosed(&mut mask), 2);
    }

    #[test]
    fn diagonal_neighbours_form_one_region() {
        let mut mask = MaskBuffer::new(6, 6);
        mask.set(1, 1, true);
        mask.set(2, 2, true);
        mask.set(3, 3, true);
        assert_eq!(fill_enclosed(&mut mask), 1);
    }

    #[test]
    fn interior_erase_is_closed_again() {
        let mut mask = MaskBuffer::new(20, 20);
        draw_rect_outline(&mut mask, 2, 2, 17, 17);
        fill_enclosed(&mut mask);
        let solid = mask.clone();

        mask.set(8, 8, false);
        mask.set(9, 8, false);
        assert_eq!(fill_enclosed(&mut mask), 1);
        assert_eq!(mask, solid);
    }

    #[test]
    fn fill_is_idempotent() {
        for seed in 0..8 {
            let mut mask = noisy_mask(seed, 37, 23);
            let first = fill_enclosed(&mut mask);
            let once = mask.clone();
            let second = fill_enclosed(&mut mask);
            assert_eq!(first, second, "count changed for seed {seed}");
            assert_eq!(mask, once, "mask changed for seed {seed}");
            assert!(mask.as_gray().pixels().all(|p| p[0] == 0 || p[0] == 255));
        }
    }

    #[test]
    fn outer_contour_traces_the_boundary() {
        let mut mask = MaskBuffer::new(10, 10);
        draw_rect_outline(&mut mask, 2, 2, 6, 6);
        let contours = outer_contours(&mask);
        assert_eq!(contours.len(), 1);
        assert!(contours[0].points.contains(&(2, 2)));
        assert!(contours[0].points.contains(&(6, 6)));
        assert!(contours[0].points.iter().all(|&(x, y)| mask.is_set(x, y)));
    }
}
