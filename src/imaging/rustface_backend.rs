use super::backend::{FaceBounds, FaceDetector, ImagingError};
use crate::config::DetectionConfig;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Face detector backed by the `rustface` crate (SeetaFace engine).
///
/// The model is read once; each [`detect`](FaceDetector::detect) call builds a
/// fresh detector from a clone of it, so one instance can serve every worker.
pub struct RustfaceDetector {
    model: rustface::Model,
    min_face_size: u32,
    score_threshold: f64,
    pyramid_scale_factor: f32,
    slide_window_step: u32,
}

impl RustfaceDetector {
    /// Load the SeetaFace frontal model from `path` and apply the tuning in `config`.
    pub fn from_file(path: &Path, config: &DetectionConfig) -> Result<Self, ImagingError> {
        let file = File::open(path)
            .map_err(|e| ImagingError::Model(format!("{}: {e}", path.display())))?;
        let model = rustface::read_model(BufReader::new(file))
            .map_err(|e| ImagingError::Model(format!("{}: {e}", path.display())))?;
        Ok(Self {
            model,
            min_face_size: config.min_face_size,
            score_threshold: config.score_threshold,
            pyramid_scale_factor: config.pyramid_scale_factor,
            slide_window_step: config.slide_window_step,
        })
    }
}

impl FaceDetector for RustfaceDetector {
    fn detect(&self, gray: &[u8], width: u32, height: u32) -> Vec<FaceBounds> {
        let mut detector = rustface::create_detector_with_model(self.model.clone());
        detector.set_min_face_size(self.min_face_size);
        detector.set_score_thresh(self.score_threshold);
        detector.set_pyramid_scale_factor(self.pyramid_scale_factor);
        detector.set_slide_window_step(self.slide_window_step, self.slide_window_step);

        let faces = detector.detect(&rustface::ImageData::new(gray, width, height));

        faces
            .iter()
            .map(|face| {
                let bbox = face.bbox();
                FaceBounds {
                    x: bbox.x() as f64,
                    y: bbox.y() as f64,
                    width: bbox.width() as f64,
                    height: bbox.height() as f64,
                    confidence: face.score(),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_model_is_a_model_error() {
        let result =
            RustfaceDetector::from_file(Path::new("/nonexistent/model.bin"), &Default::default());
        assert!(matches!(result, Err(ImagingError::Model(msg)) if msg.contains("model.bin")));
    }

    #[test]
    fn garbage_model_is_rejected() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("model.bin");
        std::fs::write(&path, [0u8; 3]).unwrap();
        assert!(RustfaceDetector::from_file(&path, &Default::default()).is_err());
    }
}
