//! Pure calculation functions for crop and mask geometry.
//!
//! All functions here are pure and testable without any I/O or images.

use super::backend::FaceBounds;

/// Crop region within the source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Convert a length in layout units to pixels.
pub fn thumbnail_pixels(units: u32, scale: u32) -> u32 {
    units.saturating_mul(scale)
}

/// Square crop region centered on a face.
///
/// The edge is the longest face side times `margin`, shrunk to fit the
/// image, then the square is shifted (never shrunk further) to stay inside
/// the image bounds. Returns `None` for an empty image or a degenerate box.
///
/// ```text
/// 100×100 face at (200, 200), margin 1.5 → 150×150 crop at (175, 175)
/// ```
pub fn face_crop_region(
    face: &FaceBounds,
    margin: f32,
    img_width: u32,
    img_height: u32,
) -> Option<CropRegion> {
    if img_width == 0 || img_height == 0 || face.width <= 0.0 || face.height <= 0.0 {
        return None;
    }

    let desired = (face.width.max(face.height) * margin as f64).round() as u32;
    let side = desired.clamp(1, img_width.min(img_height));

    let center_x = face.x + face.width / 2.0;
    let center_y = face.y + face.height / 2.0;
    let half = side as f64 / 2.0;

    let x = (center_x - half)
        .round()
        .clamp(0.0, (img_width - side) as f64) as u32;
    let y = (center_y - half)
        .round()
        .clamp(0.0, (img_height - side) as f64) as u32;

    Some(CropRegion {
        x,
        y,
        width: side,
        height: side,
    })
}

/// Fraction of pixel `(x, y)` covered by a `size`×`size` rounded square.
///
/// Pixels away from the corners are fully covered. Inside a corner box the
/// coverage ramps from 1 to 0 across one pixel at the arc, which gives an
/// antialiased edge.
pub fn corner_coverage(x: u32, y: u32, size: u32, radius: u32) -> f32 {
    if radius == 0 {
        return 1.0;
    }
    let r = radius as f32;
    let s = size as f32;
    let px = x as f32 + 0.5;
    let py = y as f32 + 0.5;

    let cx = if px < r {
        r
    } else if px > s - r {
        s - r
    } else {
        return 1.0;
    };
    let cy = if py < r {
        r
    } else if py > s - r {
        s - r
    } else {
        return 1.0;
    };

    let distance = ((px - cx).powi(2) + (py - cy).powi(2)).sqrt();
    (r - distance + 0.5).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::face_at;

    #[test]
    fn thumbnail_pixels_multiplies_scale() {
        assert_eq!(thumbnail_pixels(70, 1), 70);
        assert_eq!(thumbnail_pixels(70, 2), 140);
        assert_eq!(thumbnail_pixels(5, 3), 15);
    }

    #[test]
    fn crop_region_centered_with_margin() {
        let region = face_crop_region(&face_at(200.0, 200.0, 100.0), 1.5, 1000, 1000).unwrap();
        assert_eq!(
            region,
            CropRegion {
                x: 175,
                y: 175,
                width: 150,
                height: 150
            }
        );
    }

    #[test]
    fn crop_region_uses_longest_side() {
        let face = FaceBounds {
            x: 100.0,
            y: 100.0,
            width: 40.0,
            height: 80.0,
            confidence: 3.0,
        };
        let region = face_crop_region(&face, 1.0, 500, 500).unwrap();
        assert_eq!(region.width, 80);
        assert_eq!(region.height, 80);
        // Center (120, 140) minus half (40)
        assert_eq!((region.x, region.y), (80, 100));
    }

    #[test]
    fn crop_region_shifts_inside_near_edge() {
        let region = face_crop_region(&face_at(0.0, 0.0, 50.0), 2.0, 400, 300).unwrap();
        assert_eq!((region.x, region.y), (0, 0));
        assert_eq!(region.width, 100);

        let region = face_crop_region(&face_at(370.0, 270.0, 30.0), 2.0, 400, 300).unwrap();
        assert_eq!(region.x + region.width, 400);
        assert_eq!(region.y + region.height, 300);
    }

    #[test]
    fn crop_region_shrinks_to_image() {
        let region = face_crop_region(&face_at(10.0, 10.0, 80.0), 3.0, 120, 90).unwrap();
        assert_eq!(region.width, 90);
        assert_eq!(region.height, 90);
        assert!(region.x + region.width <= 120);
        assert_eq!(region.y, 0);
    }

    #[test]
    fn crop_region_tolerates_negative_origin() {
        // Detectors may report boxes that start outside the frame
        let region = face_crop_region(&face_at(-20.0, -10.0, 60.0), 1.0, 200, 200).unwrap();
        assert_eq!((region.x, region.y), (0, 0));
        assert_eq!(region.width, 60);
    }

    #[test]
    fn crop_region_rejects_degenerate_input() {
        assert!(face_crop_region(&face_at(0.0, 0.0, 0.0), 1.4, 100, 100).is_none());
        assert!(face_crop_region(&face_at(0.0, 0.0, 10.0), 1.4, 0, 100).is_none());
    }

    #[test]
    fn coverage_is_zero_at_corner_pixel() {
        assert_eq!(corner_coverage(0, 0, 70, 5), 0.0);
        assert_eq!(corner_coverage(69, 0, 70, 5), 0.0);
        assert_eq!(corner_coverage(0, 69, 70, 5), 0.0);
        assert_eq!(corner_coverage(69, 69, 70, 5), 0.0);
    }

    #[test]
    fn coverage_is_full_on_edges_and_center() {
        assert_eq!(corner_coverage(35, 35, 70, 5), 1.0);
        assert_eq!(corner_coverage(35, 0, 70, 5), 1.0);
        assert_eq!(corner_coverage(0, 35, 70, 5), 1.0);
        assert_eq!(corner_coverage(5, 5, 70, 5), 1.0);
    }

    #[test]
    fn coverage_is_partial_on_the_arc() {
        // Pixel center (0.5, 3.5) is ~4.74 from the corner center (5, 5)
        let c = corner_coverage(0, 3, 70, 5);
        assert!(c > 0.0 && c < 1.0, "expected partial coverage, got {c}");
    }

    #[test]
    fn zero_radius_covers_everything() {
        assert_eq!(corner_coverage(0, 0, 70, 0), 1.0);
    }
}
