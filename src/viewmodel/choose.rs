//! Reviewing the faces found by one harvest before saving them.

use crate::store::{AddSummary, StickerStore, StoreError};
use crate::types::FaceImage;
use std::collections::HashSet;

/// Candidates from a harvest plus the ids the user chose to keep.
#[derive(Debug)]
pub struct ChooseFacesViewModel {
    candidates: Vec<FaceImage>,
    chosen: HashSet<String>,
}

impl ChooseFacesViewModel {
    /// `None` for an empty harvest: there is nothing to choose from.
    pub fn from_harvest(candidates: Vec<FaceImage>) -> Option<Self> {
        if candidates.is_empty() {
            return None;
        }
        Some(Self {
            candidates,
            chosen: HashSet::new(),
        })
    }

    pub fn candidates(&self) -> &[FaceImage] {
        &self.candidates
    }

    pub fn is_chosen(&self, id: &str) -> bool {
        self.chosen.contains(id)
    }

    /// Flip whether a candidate is kept. Unknown ids are ignored.
    pub fn toggle(&mut self, id: &str) -> bool {
        if !self.candidates.iter().any(|c| c.id == id) {
            return false;
        }
        if !self.chosen.remove(id) {
            self.chosen.insert(id.to_string());
        }
        true
    }

    pub fn choose_all(&mut self) {
        self.chosen = self.candidates.iter().map(|c| c.id.clone()).collect();
    }

    pub fn chosen_count(&self) -> usize {
        self.chosen.len()
    }

    /// Chosen candidates, in candidate order.
    pub fn chosen(&self) -> Vec<&FaceImage> {
        self.candidates
            .iter()
            .filter(|c| self.chosen.contains(&c.id))
            .collect()
    }

    /// Persist the chosen candidates.
    pub fn save(self, store: &mut StickerStore) -> Result<AddSummary, StoreError> {
        let chosen: Vec<FaceImage> = self
            .candidates
            .into_iter()
            .filter(|c| self.chosen.contains(&c.id))
            .collect();
        if chosen.is_empty() {
            return Ok(AddSummary::default());
        }
        store.add(&chosen)
    }

    /// Discard the harvest without saving.
    pub fn cancel(self) -> usize {
        self.candidates.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{face_image, ids};
    use tempfile::TempDir;

    fn three() -> ChooseFacesViewModel {
        ChooseFacesViewModel::from_harvest(vec![
            face_image("a", 1),
            face_image("b", 2),
            face_image("c", 3),
        ])
        .unwrap()
    }

    #[test]
    fn empty_harvest_has_no_screen() {
        assert!(ChooseFacesViewModel::from_harvest(Vec::new()).is_none());
    }

    #[test]
    fn nothing_chosen_initially() {
        let vm = three();
        assert_eq!(vm.chosen_count(), 0);
        assert_eq!(vm.candidates().len(), 3);
    }

    #[test]
    fn toggle_flips_and_ignores_unknown() {
        let mut vm = three();
        assert!(vm.toggle("b"));
        assert!(vm.is_chosen("b"));
        assert!(vm.toggle("b"));
        assert!(!vm.is_chosen("b"));
        assert!(!vm.toggle("zzz"));
        assert_eq!(vm.chosen_count(), 0);
    }

    #[test]
    fn chosen_keeps_candidate_order() {
        let mut vm = three();
        vm.toggle("c");
        vm.toggle("a");
        let chosen: Vec<FaceImage> = vm.chosen().into_iter().cloned().collect();
        assert_eq!(ids(&chosen), vec!["a", "c"]);
    }

    #[test]
    fn save_stores_only_chosen() {
        let tmp = TempDir::new().unwrap();
        let mut store = StickerStore::open(tmp.path()).unwrap();
        let mut vm = three();
        vm.toggle("c");
        vm.toggle("a");

        let summary = vm.save(&mut store).unwrap();

        assert_eq!(summary.added, 2);
        let stored: Vec<_> = store.stickers().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(stored, vec!["a", "c"]);
    }

    #[test]
    fn save_all() {
        let tmp = TempDir::new().unwrap();
        let mut store = StickerStore::open(tmp.path()).unwrap();
        let mut vm = three();
        vm.choose_all();
        assert_eq!(vm.chosen_count(), 3);
        assert_eq!(vm.save(&mut store).unwrap().added, 3);
    }

    #[test]
    fn save_nothing_is_noop() {
        let tmp = TempDir::new().unwrap();
        let mut store = StickerStore::open(tmp.path()).unwrap();
        assert_eq!(three().save(&mut store).unwrap(), AddSummary::default());
        assert!(store.is_empty());
    }

    #[test]
    fn cancel_discards() {
        assert_eq!(three().cancel(), 3);
    }
}
