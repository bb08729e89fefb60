//! Presentation state, independent of any rendering toolkit.
//!
//! - [`StickersViewModel`]: the sticker collection plus the normal/selecting
//!   mode used for bulk deletion. State changes are published as
//!   [`StickersEvent`]s to every subscriber.
//! - [`ChooseFacesViewModel`]: the candidates produced by one harvest, and
//!   which of them the user wants to keep.

pub mod choose;
pub mod stickers;

pub use choose::ChooseFacesViewModel;
pub use stickers::{Affordance, StickersEvent, StickersViewModel, ViewMode};
