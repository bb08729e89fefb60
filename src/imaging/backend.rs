//! Collaborator traits and shared types for the imaging layer.
//!
//! The harvest coordinator only talks to the outside world through two
//! traits: [`ImageSource`] (picker result → bitmap) and [`FaceExtractor`]
//! (bitmap → cropped faces). Face bounding boxes come from a pluggable
//! [`FaceDetector`]; the production one is
//! [`RustfaceDetector`](super::rustface_backend::RustfaceDetector).

use image::DynamicImage;
use image::metadata::Orientation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImagingError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Face detector model error: {0}")]
    Model(String),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// A decoded picker result.
///
/// Pixels are kept as stored; `orientation` is the EXIF transform needed to
/// show them upright and is applied only when thumbnails are produced.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub image: DynamicImage,
    pub orientation: Orientation,
    /// Human-readable origin (file path for [`FileSource`](super::FileSource)).
    pub label: String,
}

/// A cropped face region from exactly one [`SourceImage`].
#[derive(Debug, Clone)]
pub struct ExtractedFace {
    pub image: DynamicImage,
    /// Inherited unchanged from the source.
    pub orientation: Orientation,
    /// Position of the source image within its batch.
    pub source_index: usize,
}

/// Bounding box of a detected face within an image.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceBounds {
    /// X coordinate of the top-left corner (pixels).
    pub x: f64,
    /// Y coordinate of the top-left corner (pixels).
    pub y: f64,
    /// Width of the bounding box (pixels).
    pub width: f64,
    /// Height of the bounding box (pixels).
    pub height: f64,
    /// Detection confidence score.
    pub confidence: f64,
}

/// Result of running face extraction on one bitmap.
#[derive(Debug)]
pub enum ExtractionOutcome {
    Found(Vec<ExtractedFace>),
    NotFound,
    Failed(String),
}

/// Bitmap decode collaborator: one picker result in, a bitmap or nothing out.
pub trait ImageSource: Send + Sync {
    /// Opaque picker result handed to [`decode`](Self::decode).
    type Pick: Send + 'static;

    /// Decode a picker result. `None` means the pick yields no bitmap; the
    /// implementation is responsible for logging why.
    fn decode(&self, pick: &Self::Pick) -> Option<SourceImage>;
}

/// Face extraction collaborator.
pub trait FaceExtractor: Send + Sync {
    fn extract(&self, source: &SourceImage, source_index: usize) -> ExtractionOutcome;
}

/// Pluggable face detection backend.
///
/// Implement this trait to provide a custom detector (ONNX, dlib, etc.)
/// and wrap it in a [`DetectorExtractor`](super::DetectorExtractor).
pub trait FaceDetector: Send + Sync {
    /// Detect faces in a row-major grayscale buffer of `width` × `height` bytes.
    fn detect(&self, gray: &[u8], width: u32, height: u32) -> Vec<FaceBounds>;
}
