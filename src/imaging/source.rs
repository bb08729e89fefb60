//! File-backed picker: turns paths into [`SourceImage`]s.

use super::backend::{ImageSource, ImagingError, SourceImage};
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageFormat, ImageReader};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::warn;
use walkdir::WalkDir;

/// Extensions whose decoders are compiled in.
const PHOTO_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    PHOTO_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the set of image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| {
            supported_input_extensions()
                .iter()
                .any(|s| s.eq_ignore_ascii_case(e))
        })
}

/// Decode an image file along with its EXIF orientation.
pub fn load_source(path: &Path) -> Result<SourceImage, ImagingError> {
    let mut decoder = ImageReader::open(path)?
        .with_guessed_format()?
        .into_decoder()?;
    let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
    let image = DynamicImage::from_decoder(decoder)?;
    Ok(SourceImage {
        image,
        orientation,
        label: path.display().to_string(),
    })
}

/// Picker backed by the filesystem. Each pick is a file path.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileSource;

impl ImageSource for FileSource {
    type Pick = PathBuf;

    fn decode(&self, pick: &PathBuf) -> Option<SourceImage> {
        match load_source(pick) {
            Ok(source) => Some(source),
            Err(e) => {
                warn!(path = %pick.display(), error = %e, "image could not be decoded");
                None
            }
        }
    }
}

/// Outcome of expanding user-supplied paths into a batch.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Picks {
    pub paths: Vec<PathBuf>,
    /// Paths cut off by the selection limit.
    pub dropped: usize,
    /// Paths skipped for having an unsupported extension.
    pub ignored: usize,
}

/// Expand files and directories into an ordered batch of image paths.
///
/// Directories are walked recursively, files sorted by name. Only supported
/// extensions are kept. The batch is truncated to `limit` entries.
pub fn collect_picks(inputs: &[PathBuf], limit: usize) -> Picks {
    let mut picks = Picks::default();

    for input in inputs {
        if input.is_dir() {
            let walker = WalkDir::new(input)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|entry| match entry {
                    Ok(entry) => Some(entry),
                    Err(e) => {
                        warn!(error = %e, "skipping unreadable directory entry");
                        None
                    }
                })
                .filter(|entry| entry.file_type().is_file());
            for entry in walker {
                if has_supported_extension(entry.path()) {
                    picks.paths.push(entry.into_path());
                } else {
                    picks.ignored += 1;
                }
            }
        } else if has_supported_extension(input) {
            picks.paths.push(input.clone());
        } else {
            picks.ignored += 1;
        }
    }

    if picks.paths.len() > limit {
        picks.dropped = picks.paths.len() - limit;
        picks.paths.truncate(limit);
    }

    picks
}
