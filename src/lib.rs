//! # Face Stickers
//!
//! Turn the faces in your photos into a collection of small rounded
//! stickers.
//!
//! # Architecture: Harvest, Choose, Store
//!
//! ```text
//! 1. Harvest   picked photos  →  Vec<FaceImage>   (decode ∥ detect ∥ thumbnail)
//! 2. Choose    candidates     →  chosen subset    (ChooseFacesViewModel)
//! 3. Store     chosen         →  stickers/        (PNG files + stickers.json)
//! ```
//!
//! The sticker collection is then managed through [`StickersViewModel`],
//! a two-state machine (normal / selecting) used for bulk deletion.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`harvest`] | Fan-out/join coordinator: one decode job per photo, one extraction job per decoded bitmap, a single completion |
//! | [`imaging`] | Decode with EXIF orientation, face detection through `rustface`, crop, and the 70×70 rounded thumbnail |
//! | [`store`] | The on-disk sticker collection with content-hash deduplication |
//! | [`viewmodel`] | Selection-mode state machine and candidate choosing, published over channels |
//! | [`config`] | `config.toml` loading, merging over stock defaults, and validation |
//! | [`types`] | Data passed between the layers (`ProcessedFace`, `FaceImage`, `Sticker`) |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Join by Ownership
//!
//! Outstanding work is counted with [`harvest::PendingUnit`] values rather
//! than explicit enter/leave calls. A unit can only be forked from a live
//! unit and is released when dropped, so completion cannot fire early and
//! every failure path releases its unit without extra bookkeeping.
//!
//! ## Orientation Travels With the Face
//!
//! Detection runs on the pixels as stored. The EXIF orientation read at
//! decode time is carried by each extracted face and applied only by the
//! thumbnail step, which keeps crop coordinates in one coordinate space.
//!
//! ## PNG Stickers
//!
//! Rounded corners need alpha, so stickers are PNG. They are 70×70 by
//! default; `[thumbnail] scale` produces larger variants for dense
//! displays.
//!
//! [`StickersViewModel`]: viewmodel::StickersViewModel

pub mod config;
pub mod harvest;
pub mod imaging;
pub mod output;
pub mod store;
pub mod types;
pub mod viewmodel;

#[cfg(test)]
pub(crate) mod test_helpers;
