//! Face extraction on top of a bounding-box detector.

use super::backend::{ExtractedFace, ExtractionOutcome, FaceDetector, FaceExtractor, SourceImage};
use super::calculations::face_crop_region;

/// Turns a [`FaceDetector`] into a [`FaceExtractor`] by cropping a square
/// region around every detected face.
pub struct DetectorExtractor<D> {
    detector: D,
    face_margin: f32,
}

impl<D: FaceDetector> DetectorExtractor<D> {
    pub fn new(detector: D, face_margin: f32) -> Self {
        Self {
            detector,
            face_margin,
        }
    }
}

impl<D: FaceDetector> FaceExtractor for DetectorExtractor<D> {
    fn extract(&self, source: &SourceImage, source_index: usize) -> ExtractionOutcome {
        let (width, height) = (source.image.width(), source.image.height());
        if width == 0 || height == 0 {
            return ExtractionOutcome::Failed(format!("{} has zero dimensions", source.label));
        }

        let gray = image::imageops::grayscale(&source.image);
        let bounds = self.detector.detect(gray.as_raw(), width, height);

        let faces: Vec<ExtractedFace> = bounds
            .iter()
            .filter_map(|b| face_crop_region(b, self.face_margin, width, height))
            .map(|region| ExtractedFace {
                image: source
                    .image
                    .crop_imm(region.x, region.y, region.width, region.height),
                orientation: source.orientation,
                source_index,
            })
            .collect();

        if faces.is_empty() {
            ExtractionOutcome::NotFound
        } else {
            ExtractionOutcome::Found(faces)
        }
    }
}
