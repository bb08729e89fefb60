//! Sticker configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. The config file
//! lives in the sticker store directory and overrides the stock defaults
//! key-by-key.
//!
//! ## Config File Location
//!
//! ```text
//! stickers/
//! ├── config.toml        # Optional overrides (this module)
//! ├── stickers.json      # Store manifest (see `store`)
//! └── 6f1c….png          # One file per sticker
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [thumbnail]
//! size = 70                 # Sticker edge length in units
//! corner_radius = 5         # Rounded corner radius in units
//! scale = 1                 # Pixels per unit; size × scale ≤ 4096
//! sharpen = true            # Light unsharp mask after downscaling
//!
//! [picker]
//! selection_limit = 10      # Max images per batch
//!
//! [detection]
//! model_path = "seeta_fd_frontal_v1.0.bin"
//! min_face_size = 20
//! score_threshold = 2.0
//! pyramid_scale_factor = 0.8
//! slide_window_step = 4
//! face_margin = 1.4         # Crop edge = longest face side × margin
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Largest sticker edge in pixels (`size × scale`) accepted by validation.
pub const MAX_THUMBNAIL_PIXELS: u32 = 4096;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Sticker configuration loaded from `config.toml`.
///
/// All fields have defaults; user files only specify what they override.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StickerConfig {
    /// Sticker thumbnail geometry.
    pub thumbnail: ThumbnailSettings,
    /// Photo picking limits.
    pub picker: PickerConfig,
    /// Face detector tuning.
    pub detection: DetectionConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl StickerConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.thumbnail;
        if t.size == 0 {
            return Err(ConfigError::Validation(
                "thumbnail.size must be non-zero".into(),
            ));
        }
        if t.scale == 0 {
            return Err(ConfigError::Validation(
                "thumbnail.scale must be non-zero".into(),
            ));
        }
        if t.size.checked_mul(t.scale).is_none_or(|px| px > MAX_THUMBNAIL_PIXELS) {
            return Err(ConfigError::Validation(format!(
                "thumbnail.size × thumbnail.scale ({} × {}) must be at most {MAX_THUMBNAIL_PIXELS} pixels",
                t.size, t.scale
            )));
        }
        if t.corner_radius.saturating_mul(2) > t.size {
            return Err(ConfigError::Validation(format!(
                "thumbnail.corner_radius ({}) must be at most half of thumbnail.size ({})",
                t.corner_radius, t.size
            )));
        }
        if self.picker.selection_limit == 0 {
            return Err(ConfigError::Validation(
                "picker.selection_limit must be non-zero".into(),
            ));
        }
        let d = &self.detection;
        if d.face_margin < 1.0 {
            return Err(ConfigError::Validation(
                "detection.face_margin must be >= 1.0".into(),
            ));
        }
        if !(d.pyramid_scale_factor > 0.0 && d.pyramid_scale_factor < 1.0) {
            return Err(ConfigError::Validation(
                "detection.pyramid_scale_factor must be between 0 and 1 (exclusive)".into(),
            ));
        }
        if d.slide_window_step == 0 {
            return Err(ConfigError::Validation(
                "detection.slide_window_step must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

/// Sticker thumbnail geometry, in layout units.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThumbnailSettings {
    /// Edge length of the square sticker.
    pub size: u32,
    /// Radius of the rounded corners.
    pub corner_radius: u32,
    /// Pixels per unit.
    pub scale: u32,
    /// Apply a light unsharp mask after downscaling.
    pub sharpen: bool,
}

impl Default for ThumbnailSettings {
    fn default() -> Self {
        Self {
            size: 70,
            corner_radius: 5,
            scale: 1,
            sharpen: true,
        }
    }
}

/// Photo picking limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PickerConfig {
    /// Maximum number of images accepted in one batch.
    pub selection_limit: usize,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            selection_limit: 10,
        }
    }
}

/// SeetaFace detector tuning and crop framing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DetectionConfig {
    /// Path to the SeetaFace frontal model. Relative paths resolve against
    /// the store directory.
    pub model_path: String,
    /// Smallest face edge (pixels) the detector looks for.
    pub min_face_size: u32,
    /// Minimum detector score for a face to count.
    pub score_threshold: f64,
    /// Image pyramid downscale per level.
    pub pyramid_scale_factor: f32,
    /// Sliding window step in pixels (both axes).
    pub slide_window_step: u32,
    /// Crop edge = longest face side × margin.
    pub face_margin: f32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            model_path: "seeta_fd_frontal_v1.0.bin".to_string(),
            min_face_size: 20,
            score_threshold: 2.0,
            pyramid_scale_factor: 0.8,
            slide_window_step: 4,
            face_margin: 1.4,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(StickerConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file doesn't exist.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<StickerConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: StickerConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(dir: &Path) -> Result<StickerConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(dir)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Face Stickers Configuration
# ===========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file in the sticker store directory (default: stickers/config.toml).
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Sticker thumbnails
# ---------------------------------------------------------------------------
[thumbnail]
# Edge length of the square sticker, in units.
size = 70

# Rounded corner radius, in units. At most half of `size`.
corner_radius = 5

# Pixels per unit. Use 2 or 3 for high-density displays.
# size x scale must not exceed 4096 pixels.
scale = 1

# Light unsharp mask after downscaling.
sharpen = true

# ---------------------------------------------------------------------------
# Photo picking
# ---------------------------------------------------------------------------
[picker]
# Maximum number of images processed per batch. Extra picks are dropped.
selection_limit = 10

# ---------------------------------------------------------------------------
# Face detection (SeetaFace frontal model)
# ---------------------------------------------------------------------------
[detection]
# Model file. Relative paths resolve against the store directory.
model_path = "seeta_fd_frontal_v1.0.bin"

# Smallest face edge in pixels.
min_face_size = 20

# Minimum detector score.
score_threshold = 2.0

# Pyramid downscale per level, between 0 and 1.
pyramid_scale_factor = 0.8

# Sliding window step in pixels.
slide_window_step = 4

# Sticker crop edge = longest face side x margin. Must be >= 1.0.
face_margin = 1.4

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_has_sticker_geometry() {
        let config = StickerConfig::default();
        assert_eq!(config.thumbnail.size, 70);
        assert_eq!(config.thumbnail.corner_radius, 5);
        assert_eq!(config.thumbnail.scale, 1);
        assert!(config.thumbnail.sharpen);
    }

    #[test]
    fn default_config_picker_limit_is_ten() {
        assert_eq!(StickerConfig::default().picker.selection_limit, 10);
    }

    #[test]
    fn default_config_validates() {
        assert!(StickerConfig::default().validate().is_ok());
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[thumbnail]
scale = 2
"#;
        let config: StickerConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.thumbnail.scale, 2);
        // Defaults preserved
        assert_eq!(config.thumbnail.size, 70);
        assert_eq!(config.detection.min_face_size, 20);
    }

    #[test]
    fn unknown_keys_rejected() {
        let toml = r#"
[thumbnail]
sise = 70
"#;
        let result: Result<StickerConfig, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn validate_rejects_oversized_radius() {
        let mut config = StickerConfig::default();
        config.thumbnail.corner_radius = 36;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(msg)) if msg.contains("corner_radius")
        ));
    }

    #[test]
    fn validate_accepts_radius_of_half_size() {
        let mut config = StickerConfig::default();
        config.thumbnail.corner_radius = 35;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_size_and_scale() {
        let mut config = StickerConfig::default();
        config.thumbnail.size = 0;
        config.thumbnail.corner_radius = 0;
        assert!(config.validate().is_err());

        let mut config = StickerConfig::default();
        config.thumbnail.scale = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_caps_pixel_size() {
        let mut config = StickerConfig::default();
        config.thumbnail.scale = 58; // 70 × 58 = 4060
        assert!(config.validate().is_ok());

        config.thumbnail.scale = 59; // 4130
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(msg)) if msg.contains("4096")
        ));

        config.thumbnail.scale = 100_000;
        assert!(config.validate().is_err());

        config.thumbnail.scale = u32::MAX;
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_config_rejects_huge_scale() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            "[thumbnail]\nscale = 100000\n",
        )
        .unwrap();
        assert!(matches!(
            load_config(tmp.path()),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn validate_rejects_zero_selection_limit() {
        let mut config = StickerConfig::default();
        config.picker.selection_limit = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_detection_values() {
        let mut config = StickerConfig::default();
        config.detection.face_margin = 0.9;
        assert!(config.validate().is_err());

        let mut config = StickerConfig::default();
        config.detection.pyramid_scale_factor = 1.0;
        assert!(config.validate().is_err());

        let mut config = StickerConfig::default();
        config.detection.slide_window_step = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn merge_toml_overlay_wins_and_base_kept() {
        let base: toml::Value = toml::from_str("[a]\nx = 1\ny = 2\n").unwrap();
        let overlay: toml::Value = toml::from_str("[a]\ny = 3\n").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"]["x"].as_integer(), Some(1));
        assert_eq!(merged["a"]["y"].as_integer(), Some(3));
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.thumbnail.size, 70);
        assert_eq!(config.picker.selection_limit, 10);
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r#"
[picker]
selection_limit = 3

[detection]
face_margin = 2.0
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.picker.selection_limit, 3);
        assert_eq!(config.detection.face_margin, 2.0);
        assert_eq!(config.thumbnail.corner_radius, 5);
    }

    #[test]
    fn load_config_rejects_invalid_values() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            "[thumbnail]\ncorner_radius = 50\n",
        )
        .unwrap();
        assert!(matches!(
            load_config(tmp.path()),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn load_config_rejects_broken_toml() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "[thumbnail\n").unwrap();
        assert!(matches!(load_config(tmp.path()), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn stock_config_toml_parses_to_defaults() {
        let config: StickerConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = StickerConfig::default();
        assert_eq!(config.thumbnail.size, defaults.thumbnail.size);
        assert_eq!(config.picker.selection_limit, defaults.picker.selection_limit);
        assert_eq!(config.detection.model_path, defaults.detection.model_path);
        assert_eq!(config.processing.max_processes, None);
    }

    #[test]
    fn effective_threads_clamps_to_cores() {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let config = ProcessingConfig {
            max_processes: Some(cores + 100),
        };
        assert_eq!(effective_threads(&config), cores);
        assert_eq!(effective_threads(&ProcessingConfig::default()), cores);
        let one = ProcessingConfig {
            max_processes: Some(1),
        };
        assert_eq!(effective_threads(&one), 1);
    }
}
