//! Parameter types for sticker post-processing.
//!
//! These structs describe *what* to produce, not *how*. The config layer
//! speaks in layout units; [`ThumbnailSpec`] is already resolved to pixels.

use super::calculations::thumbnail_pixels;
use crate::config::ThumbnailSettings;

/// Sharpening parameters for unsharp mask.
///
/// - `sigma`: Standard deviation of the Gaussian blur (higher = more sharpening)
/// - `threshold`: Minimum brightness difference to sharpen (0 = sharpen all pixels)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sharpening {
    pub sigma: f32,
    pub threshold: i32,
}

impl Sharpening {
    /// Light sharpening suitable for small thumbnails.
    pub fn light() -> Self {
        Self {
            sigma: 0.5,
            threshold: 0,
        }
    }
}

/// Pixel geometry of a finished sticker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThumbnailSpec {
    /// Edge length of the square output.
    pub size: u32,
    /// Rounded corner radius.
    pub corner_radius: u32,
    pub sharpening: Option<Sharpening>,
}

impl ThumbnailSpec {
    pub fn from_settings(settings: &ThumbnailSettings) -> Self {
        Self {
            size: thumbnail_pixels(settings.size, settings.scale),
            corner_radius: thumbnail_pixels(settings.corner_radius, settings.scale),
            sharpening: settings.sharpen.then(Sharpening::light),
        }
    }
}

impl Default for ThumbnailSpec {
    fn default() -> Self {
        Self::from_settings(&ThumbnailSettings::default())
    }
}
