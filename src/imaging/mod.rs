//! Image processing: decode, detect, crop, and finish stickers in pure Rust.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode + orientation** | `image::ImageReader` + `ImageDecoder::orientation` |
//! | **Face detection** | `rustface` (SeetaFace frontal model) |
//! | **Crop** | `DynamicImage::crop_imm` around a margin-scaled face box |
//! | **Thumbnail** | `apply_orientation` + `resize_to_fill` + `unsharpen` + corner mask |
//! | **Encode** | `image::codecs::png::PngEncoder` |
//!
//! The module is split into:
//! - **Backend**: collaborator traits ([`ImageSource`], [`FaceExtractor`], [`FaceDetector`]) and shared types
//! - **Calculations**: Pure functions for crop and mask geometry (unit testable)
//! - **Parameters**: [`ThumbnailSpec`] and [`Sharpening`]
//! - **Source / Face / Thumbnail**: the production collaborators

pub mod backend;
mod calculations;
pub mod face;
mod params;
pub mod rustface_backend;
pub mod source;
pub mod thumbnail;

pub use backend::{
    ExtractedFace, ExtractionOutcome, FaceBounds, FaceDetector, FaceExtractor, ImageSource,
    ImagingError, SourceImage,
};
pub use calculations::{CropRegion, corner_coverage, face_crop_region};
pub use face::DetectorExtractor;
pub use params::{Sharpening, ThumbnailSpec};
pub use rustface_backend::RustfaceDetector;
pub use source::{FileSource, Picks, collect_picks, load_source, supported_input_extensions};
pub use thumbnail::{encode_png, process_face};
