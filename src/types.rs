//! Shared types passed between the harvest, view-model, and store layers.

use image::RgbaImage;
use serde::{Deserialize, Serialize};

/// A face thumbnail after resizing, corner rounding, and orientation fixup.
///
/// Gets its id at creation; the id follows it into [`FaceImage`] and, once
/// saved, into the store as the sticker id.
#[derive(Debug, Clone)]
pub struct ProcessedFace {
    pub id: String,
    pub image: RgbaImage,
}

impl ProcessedFace {
    /// Wrap a finished thumbnail under a fresh UUID v4.
    pub fn new(image: RgbaImage) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            image,
        }
    }
}

/// A save candidate: id plus PNG-encoded sticker bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaceImage {
    pub id: String,
    pub image: Vec<u8>,
}

/// A persisted sticker entry in the store manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sticker {
    pub id: String,
    /// File name relative to the store directory.
    pub file: String,
    /// SHA-256 hex of the PNG bytes, used to skip duplicate saves.
    pub content_hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn processed_faces_get_distinct_ids() {
        let a = ProcessedFace::new(RgbaImage::new(1, 1));
        let b = ProcessedFace::new(RgbaImage::new(1, 1));
        assert_ne!(a.id, b.id);
        assert!(uuid::Uuid::parse_str(&a.id).is_ok());
    }

    #[test]
    fn sticker_roundtrips_through_json() {
        let sticker = Sticker {
            id: "abc".into(),
            file: "abc.png".into(),
            content_hash: "00ff".into(),
        };
        let json = serde_json::to_string(&sticker).unwrap();
        let back: Sticker = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sticker);
    }
}
