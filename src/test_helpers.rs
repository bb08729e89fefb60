//! Shared test utilities for the face-stickers test suite.
//!
//! Fixture writers for real image files and small in-memory
//! [`FaceImage`] candidates with distinct PNG payloads.

use crate::imaging::encode_png;
use crate::types::FaceImage;
use image::codecs::png::PngEncoder;
use image::{ImageEncoder, Rgba, RgbaImage};
use std::path::Path;

/// Write a gradient PNG of the given size to `path`.
pub fn write_test_png(path: &Path, width: u32, height: u32) {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            128,
        ])
    });
    let mut buffer = Vec::new();
    PngEncoder::new(&mut buffer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
    std::fs::write(path, buffer).unwrap();
}

/// A 70×70 candidate whose pixels (and therefore hash) depend on `shade`.
pub fn face_image(id: &str, shade: u8) -> FaceImage {
    let img = RgbaImage::from_pixel(70, 70, Rgba([shade, shade, shade, 255]));
    FaceImage {
        id: id.to_string(),
        image: encode_png(&img).unwrap(),
    }
}

/// Candidate ids in order.
pub fn ids(faces: &[FaceImage]) -> Vec<&str> {
    faces.iter().map(|f| f.id.as_str()).collect()
}
