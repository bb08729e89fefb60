//! On-disk sticker collection.
//!
//! A store directory holds one PNG per sticker plus a JSON manifest that
//! lists them in insertion order:
//!
//! ```text
//! stickers/
//! ├── stickers.json        # { "version": 1, "stickers": [ … ] }
//! ├── 3f2c…-….png
//! └── 9a10…-….png
//! ```
//!
//! Each entry records the SHA-256 of its PNG bytes. Adding a face whose bytes
//! already exist in the store is a no-op, so re-running a harvest over the
//! same photos does not pile up copies.
//!
//! Unlike a build cache, the manifest is user data: a corrupt or
//! future-version manifest is reported as an error rather than replaced by an
//! empty one.

use crate::types::{FaceImage, Sticker};
use sha2::{Digest, Sha256};
use std::collections::{BTreeSet, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Name of the manifest file within the store directory.
const MANIFEST_FILENAME: &str = "stickers.json";

/// Version of the manifest format.
const MANIFEST_VERSION: u32 = 1;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid manifest {path}: {reason}")]
    Manifest { path: PathBuf, reason: String },
    #[error("Invalid sticker id: {0:?}")]
    InvalidId(String),
    #[error("Sticker id already in use: {0}")]
    IdInUse(String),
    #[error("Sticker not found: {0}")]
    NotFound(String),
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct Manifest {
    version: u32,
    stickers: Vec<Sticker>,
}

/// Result of [`StickerStore::add`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AddSummary {
    pub added: usize,
    /// Candidates skipped because identical bytes were already stored.
    pub duplicates: usize,
}

/// A sticker collection rooted at a directory.
#[derive(Debug)]
pub struct StickerStore {
    dir: PathBuf,
    stickers: Vec<Sticker>,
}

impl StickerStore {
    /// Open (creating if needed) the store at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        let stickers = load_manifest(&dir)?;
        debug!(dir = %dir.display(), count = stickers.len(), "opened sticker store");
        Ok(Self { dir, stickers })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Stickers in insertion order.
    pub fn stickers(&self) -> &[Sticker] {
        &self.stickers
    }

    pub fn len(&self) -> usize {
        self.stickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stickers.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.stickers.iter().any(|s| s.id == id)
    }

    /// Re-read the manifest, picking up changes made by other processes.
    pub fn reload(&mut self) -> Result<(), StoreError> {
        self.stickers = load_manifest(&self.dir)?;
        Ok(())
    }

    /// Write each face's PNG and append it to the manifest.
    ///
    /// Faces whose bytes are already stored (or repeated within `faces`) are
    /// counted as duplicates and skipped.
    ///
    /// All-or-nothing: ids are checked before anything is written, and a
    /// failed write or manifest save removes the files written so far and
    /// leaves the store as it was.
    pub fn add(&mut self, faces: &[FaceImage]) -> Result<AddSummary, StoreError> {
        let mut summary = AddSummary::default();
        let mut known: HashSet<String> = self
            .stickers
            .iter()
            .map(|s| s.content_hash.clone())
            .collect();
        let mut ids: HashSet<&str> = self.stickers.iter().map(|s| s.id.as_str()).collect();

        let mut fresh: Vec<(&FaceImage, Sticker)> = Vec::new();
        for face in faces {
            validate_id(&face.id)?;
            let content_hash = hash_bytes(&face.image);
            if !known.insert(content_hash.clone()) {
                debug!(id = %face.id, "skipping duplicate sticker");
                summary.duplicates += 1;
                continue;
            }
            if !ids.insert(face.id.as_str()) {
                return Err(StoreError::IdInUse(face.id.clone()));
            }
            fresh.push((
                face,
                Sticker {
                    id: face.id.clone(),
                    file: format!("{}.png", face.id),
                    content_hash,
                },
            ));
        }
        if fresh.is_empty() {
            return Ok(summary);
        }

        let mut written: Vec<PathBuf> = Vec::with_capacity(fresh.len());
        for (face, sticker) in &fresh {
            let path = self.dir.join(&sticker.file);
            if let Err(e) = std::fs::write(&path, &face.image) {
                discard_files(&written);
                return Err(e.into());
            }
            written.push(path);
        }

        let before = self.stickers.len();
        self.stickers
            .extend(fresh.into_iter().map(|(_, sticker)| sticker));
        if let Err(e) = self.save() {
            self.stickers.truncate(before);
            discard_files(&written);
            return Err(e);
        }

        summary.added = self.stickers.len() - before;
        Ok(summary)
    }

    /// Delete the stickers with the given ids. Returns how many were removed.
    pub fn remove(&mut self, ids: &BTreeSet<String>) -> Result<usize, StoreError> {
        let (gone, kept): (Vec<Sticker>, Vec<Sticker>) = std::mem::take(&mut self.stickers)
            .into_iter()
            .partition(|s| ids.contains(&s.id));
        self.stickers = kept;

        if gone.is_empty() {
            return Ok(0);
        }
        self.save()?;

        for sticker in &gone {
            match std::fs::remove_file(self.dir.join(&sticker.file)) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => warn!(file = %sticker.file, error = %e, "could not delete sticker file"),
            }
        }
        debug!(count = gone.len(), "removed stickers");
        Ok(gone.len())
    }

    /// PNG bytes of a stored sticker.
    pub fn read_image(&self, id: &str) -> Result<Vec<u8>, StoreError> {
        let sticker = self
            .stickers
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        Ok(std::fs::read(self.dir.join(&sticker.file))?)
    }

    /// Write the manifest to a temp file, then rename it into place.
    fn save(&self) -> Result<(), StoreError> {
        let manifest = Manifest {
            version: MANIFEST_VERSION,
            stickers: self.stickers.clone(),
        };
        let json = serde_json::to_string_pretty(&manifest)?;
        let tmp = self.dir.join(format!("{MANIFEST_FILENAME}.tmp"));
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, manifest_path(&self.dir))?;
        Ok(())
    }
}

fn load_manifest(dir: &Path) -> Result<Vec<Sticker>, StoreError> {
    let path = manifest_path(dir);
    let content = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    let manifest: Manifest =
        serde_json::from_str(&content).map_err(|e| StoreError::Manifest {
            path: path.clone(),
            reason: e.to_string(),
        })?;
    if manifest.version != MANIFEST_VERSION {
        return Err(StoreError::Manifest {
            path,
            reason: format!(
                "unsupported version {} (expected {MANIFEST_VERSION})",
                manifest.version
            ),
        });
    }
    Ok(manifest.stickers)
}

/// Best-effort removal of files written by a failed [`StickerStore::add`].
fn discard_files(paths: &[PathBuf]) {
    for path in paths {
        if let Err(e) = std::fs::remove_file(path)
            && e.kind() != io::ErrorKind::NotFound
        {
            warn!(file = %path.display(), error = %e, "could not clean up sticker file");
        }
    }
}

/// Ids become file names, so only `[A-Za-z0-9_-]` is accepted.
fn validate_id(id: &str) -> Result<(), StoreError> {
    let ok = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok {
        Ok(())
    } else {
        Err(StoreError::InvalidId(id.to_string()))
    }
}

/// SHA-256 of a byte slice as lowercase hex.
pub fn hash_bytes(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Resolve the manifest path for a store directory.
pub fn manifest_path(dir: &Path) -> PathBuf {
    dir.join(MANIFEST_FILENAME)
}
