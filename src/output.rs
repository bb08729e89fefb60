//! CLI output formatting.
//!
//! Every entity leads with a positional index and its identity (a file
//! name for picks, an id for stickers), with secondary context on indented
//! lines underneath.
//!
//! # Output Format
//!
//! ## Add
//!
//! ```text
//! Picked 3 photos (1 over the limit of 10 dropped)
//! 001 dawn.jpg: 2 faces
//! 002 notes.png: could not decode
//! 003 sky.jpg: no faces
//!
//! Found 2 faces in 3 photos
//! Saved 2 stickers
//! ```
//!
//! ## List
//!
//! ```text
//! Stickers (2)
//! 001 3f2c9c1e-…
//!     File: 3f2c9c1e-….png
//! 002 9a10aa4b-…
//!     File: 9a10aa4b-….png
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::harvest::HarvestEvent;
use crate::imaging::Picks;
use crate::store::AddSummary;
use crate::types::Sticker;
use crate::viewmodel::{Affordance, ViewMode};
use std::path::PathBuf;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

/// Display name for the pick at a 0-based batch index.
fn pick_name(picks: &[PathBuf], index: usize) -> String {
    picks
        .get(index)
        .map(|p| {
            p.file_name()
                .map(|f| f.to_string_lossy().into_owned())
                .unwrap_or_else(|| p.display().to_string())
        })
        .unwrap_or_else(|| format!("#{index}"))
}

fn pick_line(picks: &[PathBuf], index: usize, status: &str) -> String {
    format!(
        "{} {}: {}",
        format_index(index + 1),
        pick_name(picks, index),
        status
    )
}

// ============================================================================
// Add
// ============================================================================

/// Header shown before a harvest starts.
pub fn format_picks(picks: &Picks, limit: usize) -> Vec<String> {
    let mut header = format!("Picked {}", plural(picks.paths.len(), "photo", "photos"));
    if picks.dropped > 0 {
        header.push_str(&format!(
            " ({} over the limit of {limit} dropped)",
            picks.dropped
        ));
    }
    let mut lines = vec![header];
    if picks.ignored > 0 {
        lines.push(format!(
            "    Skipped {} with unsupported extensions",
            plural(picks.ignored, "file", "files")
        ));
    }
    lines
}

pub fn print_picks(picks: &Picks, limit: usize) {
    for line in format_picks(picks, limit) {
        println!("{}", line);
    }
}

/// Format a single harvest progress event.
///
/// `picks` maps batch indices back to file names. `Completed` renders as a
/// blank separator; the summary comes from [`format_harvest_summary`].
pub fn format_harvest_event(event: &HarvestEvent, picks: &[PathBuf]) -> Vec<String> {
    match event {
        HarvestEvent::DecodeFailed { index } => {
            vec![pick_line(picks, *index, "could not decode")]
        }
        HarvestEvent::FacesFound { index, count } => {
            vec![pick_line(picks, *index, &plural(*count, "face", "faces"))]
        }
        HarvestEvent::NoFaces { index } => vec![pick_line(picks, *index, "no faces")],
        HarvestEvent::ExtractionFailed { index, reason } => vec![
            pick_line(picks, *index, "detection failed"),
            format!("    Reason: {}", reason),
        ],
        HarvestEvent::FaceDropped { index, reason } => vec![
            pick_line(picks, *index, "dropped a face"),
            format!("    Reason: {}", reason),
        ],
        HarvestEvent::Completed { .. } => vec![String::new()],
    }
}

pub fn format_harvest_summary(faces: usize, photos: usize) -> Vec<String> {
    if faces == 0 {
        vec![format!(
            "No faces found in {}",
            plural(photos, "photo", "photos")
        )]
    } else {
        vec![format!(
            "Found {} in {}",
            plural(faces, "face", "faces"),
            plural(photos, "photo", "photos")
        )]
    }
}

pub fn print_harvest_summary(faces: usize, photos: usize) {
    for line in format_harvest_summary(faces, photos) {
        println!("{}", line);
    }
}

pub fn format_add_summary(summary: &AddSummary) -> Vec<String> {
    let mut line = format!("Saved {}", plural(summary.added, "sticker", "stickers"));
    if summary.duplicates > 0 {
        line.push_str(&format!(
            " ({} already in the collection)",
            summary.duplicates
        ));
    }
    vec![line]
}

pub fn print_add_summary(summary: &AddSummary) {
    for line in format_add_summary(summary) {
        println!("{}", line);
    }
}

// ============================================================================
// List / delete
// ============================================================================

pub fn format_sticker_list(stickers: &[Sticker]) -> Vec<String> {
    if stickers.is_empty() {
        return vec!["No stickers yet".to_string()];
    }
    let mut lines = vec![format!("Stickers ({})", stickers.len())];
    for (i, sticker) in stickers.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), sticker.id));
        lines.push(format!("    File: {}", sticker.file));
    }
    lines
}

pub fn print_sticker_list(stickers: &[Sticker]) {
    for line in format_sticker_list(stickers) {
        println!("{}", line);
    }
}

/// One-line status of the selection state machine.
pub fn format_mode_status(mode: ViewMode, selected: usize, affordance: Affordance) -> Vec<String> {
    let action = match affordance {
        Affordance::Add => "add".to_string(),
        Affordance::Delete { enabled: true } => "delete".to_string(),
        Affordance::Delete { enabled: false } => "delete (disabled)".to_string(),
    };
    match mode {
        ViewMode::Normal => vec![format!("Mode: normal, action: {action}")],
        ViewMode::Selecting => vec![format!(
            "Mode: selecting, {} selected, action: {action}",
            selected
        )],
    }
}

pub fn print_mode_status(mode: ViewMode, selected: usize, affordance: Affordance) {
    for line in format_mode_status(mode, selected, affordance) {
        println!("{}", line);
    }
}

pub fn format_delete_summary(removed: usize, requested: usize) -> Vec<String> {
    let mut lines = vec![format!(
        "Deleted {}",
        plural(removed, "sticker", "stickers")
    )];
    if requested > removed {
        lines.push(format!(
            "    {} not in the collection",
            plural(requested - removed, "id was", "ids were")
        ));
    }
    lines
}

pub fn print_delete_summary(removed: usize, requested: usize) {
    for line in format_delete_summary(removed, requested) {
        println!("{}", line);
    }
}
