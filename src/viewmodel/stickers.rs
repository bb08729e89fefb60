//! Selection-mode state machine for the sticker collection.
//!
//! ```text
//!            change_view_mode()
//!   Normal ──────────────────────► Selecting
//!     ▲    (delete shown, disabled)   │
//!     │                               │ toggle_selection(id)
//!     └───────────────────────────────┘ enables delete iff selection ≠ ∅
//!            change_view_mode()
//!       (selection cleared, add shown)
//! ```
//!
//! The toggle is the only transition. Deleting keeps the mode; the user
//! leaves selecting explicitly.

use crate::store::{StickerStore, StoreError};
use crate::types::Sticker;
use std::collections::BTreeSet;
use std::sync::mpsc::{self, Receiver, Sender};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Normal,
    Selecting,
}

/// The action offered in place of the primary button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affordance {
    Add,
    Delete { enabled: bool },
}

/// State change published to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StickersEvent {
    StickersChanged { count: usize },
    ModeChanged(ViewMode),
    CanDeleteChanged(bool),
}

pub struct StickersViewModel {
    store: StickerStore,
    mode: ViewMode,
    selected: BTreeSet<String>,
    subscribers: Vec<Sender<StickersEvent>>,
}

impl StickersViewModel {
    pub fn new(store: StickerStore) -> Self {
        Self {
            store,
            mode: ViewMode::Normal,
            selected: BTreeSet::new(),
            subscribers: Vec::new(),
        }
    }

    /// Receive every state change from now on.
    pub fn subscribe(&mut self) -> Receiver<StickersEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn stickers(&self) -> &[Sticker] {
        self.store.stickers()
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn selected(&self) -> &BTreeSet<String> {
        &self.selected
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    /// Delete is reachable only with a non-empty selection.
    pub fn can_delete(&self) -> bool {
        !self.selected.is_empty()
    }

    pub fn affordance(&self) -> Affordance {
        match self.mode {
            ViewMode::Normal => Affordance::Add,
            ViewMode::Selecting => Affordance::Delete {
                enabled: self.can_delete(),
            },
        }
    }

    /// Shared access to the underlying store, e.g. to read sticker bytes.
    pub fn store(&self) -> &StickerStore {
        &self.store
    }

    /// Mutable store access for collaborators that save into it.
    ///
    /// Call [`get_stickers`](Self::get_stickers) afterwards to publish the
    /// change.
    pub fn store_mut(&mut self) -> &mut StickerStore {
        &mut self.store
    }

    /// Refresh from disk. Selected ids that no longer exist are dropped.
    pub fn get_stickers(&mut self) -> Result<&[Sticker], StoreError> {
        let could_delete = self.can_delete();
        self.store.reload()?;
        let store = &self.store;
        self.selected.retain(|id| store.contains(id));

        self.publish(StickersEvent::StickersChanged {
            count: self.store.len(),
        });
        self.publish_can_delete(could_delete);
        Ok(self.store.stickers())
    }

    /// Flip between normal and selecting.
    pub fn change_view_mode(&mut self) {
        let could_delete = self.can_delete();
        self.mode = match self.mode {
            ViewMode::Normal => ViewMode::Selecting,
            ViewMode::Selecting => {
                self.selected.clear();
                ViewMode::Normal
            }
        };
        debug!(mode = ?self.mode, "view mode changed");
        self.publish(StickersEvent::ModeChanged(self.mode));
        self.publish_can_delete(could_delete);
    }

    /// Add or remove `id` from the selection.
    ///
    /// Ignored outside selecting mode and for ids not in the collection.
    /// Returns whether the selection changed.
    pub fn toggle_selection(&mut self, id: &str) -> bool {
        if self.mode != ViewMode::Selecting || !self.store.contains(id) {
            return false;
        }
        let could_delete = self.can_delete();
        if !self.selected.remove(id) {
            self.selected.insert(id.to_string());
        }
        self.publish_can_delete(could_delete);
        true
    }

    /// Delete every selected sticker. Returns how many were removed.
    ///
    /// The collection is re-read first, so stickers saved by another writer
    /// survive the manifest rewrite and show up in the refreshed list.
    pub fn remove_selected_stickers(&mut self) -> Result<usize, StoreError> {
        if self.selected.is_empty() {
            return Ok(0);
        }
        self.store.reload()?;
        let removed = self.store.remove(&self.selected)?;
        self.selected.clear();
        debug!(removed, "removed selected stickers");

        self.publish(StickersEvent::StickersChanged {
            count: self.store.len(),
        });
        self.publish(StickersEvent::CanDeleteChanged(false));
        Ok(removed)
    }

    fn publish_can_delete(&mut self, before: bool) {
        let now = self.can_delete();
        if now != before {
            self.publish(StickersEvent::CanDeleteChanged(now));
        }
    }

    fn publish(&mut self, event: StickersEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}
