//! Thumbnail post-processor: extracted face → finished sticker.
//!
//! Steps, in order: apply EXIF orientation, fill-resize and center-crop to a
//! square (Lanczos3), optional light unsharp mask, then fade the corners to
//! transparent with an antialiased rounded-rect mask. The result is encoded
//! as PNG because the corners need alpha.

use super::backend::{ExtractedFace, ImagingError};
use super::calculations::corner_coverage;
use super::params::ThumbnailSpec;
use crate::types::{FaceImage, ProcessedFace};
use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::{ExtendedColorType, ImageEncoder, RgbaImage};

/// Produce a [`ProcessedFace`] from an extracted face.
pub fn process_face(
    face: &ExtractedFace,
    spec: &ThumbnailSpec,
) -> Result<ProcessedFace, ImagingError> {
    if face.image.width() == 0 || face.image.height() == 0 {
        return Err(ImagingError::ProcessingFailed("empty face crop".into()));
    }
    if spec.size == 0 {
        return Err(ImagingError::ProcessingFailed(
            "thumbnail size must be non-zero".into(),
        ));
    }

    let mut upright = face.image.clone();
    upright.apply_orientation(face.orientation);

    let filled = upright.resize_to_fill(spec.size, spec.size, FilterType::Lanczos3);
    let mut rgba = filled.to_rgba8();
    if let Some(sharpening) = spec.sharpening {
        rgba = image::imageops::unsharpen(&rgba, sharpening.sigma, sharpening.threshold);
    }
    round_corners(&mut rgba, spec.corner_radius);

    Ok(ProcessedFace::new(rgba))
}

/// Scale every pixel's alpha by its rounded-square coverage.
///
/// Expects a square image; for non-square input the shorter side is used.
pub fn round_corners(image: &mut RgbaImage, radius: u32) {
    if radius == 0 {
        return;
    }
    let size = image.width().min(image.height());
    for (x, y, pixel) in image.enumerate_pixels_mut() {
        let coverage = corner_coverage(x, y, size, radius);
        if coverage < 1.0 {
            pixel[3] = (pixel[3] as f32 * coverage).round() as u8;
        }
    }
}

/// Encode an RGBA image as PNG.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, ImagingError> {
    let mut buffer = Vec::new();
    PngEncoder::new(&mut buffer).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ExtendedColorType::Rgba8,
    )?;
    Ok(buffer)
}

impl FaceImage {
    /// Encode a processed face, keeping its id.
    pub fn from_processed(face: ProcessedFace) -> Result<Self, ImagingError> {
        let image = encode_png(&face.image)?;
        Ok(Self { id: face.id, image })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::solid_image;
    use image::metadata::Orientation;
    use image::{DynamicImage, Rgb, RgbImage};

    fn face(image: DynamicImage, orientation: Orientation) -> ExtractedFace {
        ExtractedFace {
            image,
            orientation,
            source_index: 0,
        }
    }

    fn plain_spec() -> ThumbnailSpec {
        ThumbnailSpec {
            sharpening: None,
            ..ThumbnailSpec::default()
        }
    }

    #[test]
    fn output_is_70_square() {
        let processed = process_face(
            &face(solid_image(120, 90), Orientation::NoTransforms),
            &ThumbnailSpec::default(),
        )
        .unwrap();
        assert_eq!(processed.image.dimensions(), (70, 70));
    }

    #[test]
    fn corners_are_transparent_and_center_opaque() {
        let processed = process_face(
            &face(solid_image(100, 100), Orientation::NoTransforms),
            &plain_spec(),
        )
        .unwrap();
        let img = &processed.image;
        assert_eq!(img.get_pixel(0, 0)[3], 0);
        assert_eq!(img.get_pixel(69, 0)[3], 0);
        assert_eq!(img.get_pixel(0, 69)[3], 0);
        assert_eq!(img.get_pixel(69, 69)[3], 0);
        assert_eq!(img.get_pixel(35, 35)[3], 255);
        assert_eq!(img.get_pixel(35, 0)[3], 255);
    }

    #[test]
    fn orientation_is_applied_before_resize() {
        // Left half red, right half blue; a 90° clockwise turn puts red on top
        let src = RgbImage::from_fn(40, 20, |x, _| {
            if x < 20 {
                Rgb([255, 0, 0])
            } else {
                Rgb([0, 0, 255])
            }
        });
        let processed = process_face(
            &face(DynamicImage::ImageRgb8(src), Orientation::Rotate90),
            &plain_spec(),
        )
        .unwrap();

        let top = processed.image.get_pixel(35, 10);
        let bottom = processed.image.get_pixel(35, 60);
        assert!(top[0] > 200 && top[2] < 50, "top should be red: {top:?}");
        assert!(bottom[2] > 200 && bottom[0] < 50, "bottom should be blue: {bottom:?}");
    }

    #[test]
    fn empty_crop_is_rejected() {
        let result = process_face(
            &face(solid_image(0, 0), Orientation::NoTransforms),
            &plain_spec(),
        );
        assert!(matches!(result, Err(ImagingError::ProcessingFailed(_))));
    }

    #[test]
    fn round_corners_zero_radius_is_noop() {
        let mut img = RgbaImage::from_pixel(10, 10, image::Rgba([1, 2, 3, 255]));
        round_corners(&mut img, 0);
        assert!(img.pixels().all(|p| p[3] == 255));
    }

    #[test]
    fn face_image_keeps_id_and_encodes_png() {
        let processed = process_face(
            &face(solid_image(80, 80), Orientation::NoTransforms),
            &plain_spec(),
        )
        .unwrap();
        let id = processed.id.clone();
        let face_image = FaceImage::from_processed(processed).unwrap();

        assert_eq!(face_image.id, id);
        assert_eq!(&face_image.image[1..4], b"PNG");
        let decoded = image::load_from_memory(&face_image.image).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (70, 70));
    }
}
