//! Selection state: single, toggle, range and marquee selection.
//!
//! The manager only tracks ids. Every mutating method returns whether the
//! set actually changed so the engine can emit exactly one
//! `SelectionChanged` per effective change.

use crate::entity::{CanvasEntity, EntityId};
use crate::geometry::rect_contains_point;
use kurbo::Rect;

/// Ordered set of selected entity ids plus the range-selection anchor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionManager {
    /// Selected ids in insertion order.
    ids: Vec<EntityId>,
    /// Fixed end of a range selection.
    anchor: Option<EntityId>,
}

impl SelectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected ids in insertion order.
    pub fn ids(&self) -> &[EntityId] {
        &self.ids
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn anchor(&self) -> Option<EntityId> {
        self.anchor
    }

    /// Most recently added id.
    pub fn primary(&self) -> Option<EntityId> {
        self.ids.last().copied()
    }

    /// Select a single entity (clears other selections).
    pub fn select_only(&mut self, id: EntityId) -> bool {
        self.anchor = Some(id);
        if self.ids.len() == 1 && self.ids[0] == id {
            return false;
        }
        self.ids.clear();
        self.ids.push(id);
        true
    }

    /// Add an entity, keeping the rest of the selection.
    pub fn add(&mut self, id: EntityId) -> bool {
        self.anchor = Some(id);
        if self.contains(id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    /// Flip membership of one entity. Always changes the set.
    pub fn toggle(&mut self, id: EntityId) -> bool {
        if let Some(index) = self.ids.iter().position(|&sel| sel == id) {
            self.ids.remove(index);
            if self.anchor == Some(id) {
                self.anchor = self.ids.last().copied();
            }
        } else {
            self.ids.push(id);
            self.anchor = Some(id);
        }
        true
    }

    /// Select the contiguous slice of `ordered` between the anchor and
    /// `target`, inclusive. The anchor stays put.
    ///
    /// Without a usable anchor this degrades to [`select_only`](Self::select_only).
    pub fn select_range(&mut self, target: EntityId, ordered: &[EntityId]) -> bool {
        let Some(target_index) = ordered.iter().position(|&id| id == target) else {
            log::debug!("range target {target} is not in the ordering, ignoring");
            return false;
        };
        let anchor_index = self
            .anchor
            .and_then(|anchor| ordered.iter().position(|&id| id == anchor));
        let Some(anchor_index) = anchor_index else {
            return self.select_only(target);
        };

        let (start, end) = if anchor_index <= target_index {
            (anchor_index, target_index)
        } else {
            (target_index, anchor_index)
        };
        let range = ordered[start..=end].to_vec();
        self.replace(range)
    }

    /// Select every id in `ordered`.
    pub fn select_all(&mut self, ordered: &[EntityId]) -> bool {
        let changed = self.replace(ordered.to_vec());
        if self.anchor.is_none_or(|anchor| !self.contains(anchor)) {
            self.anchor = self.ids.first().copied();
        }
        changed
    }

    pub fn clear(&mut self) -> bool {
        self.anchor = None;
        if self.ids.is_empty() {
            return false;
        }
        self.ids.clear();
        true
    }

    /// Replace the whole set atomically. Duplicates are dropped, first
    /// occurrence wins.
    pub fn set(&mut self, ids: impl IntoIterator<Item = EntityId>) -> bool {
        let mut next: Vec<EntityId> = Vec::new();
        for id in ids {
            if !next.contains(&id) {
                next.push(id);
            }
        }
        let changed = self.replace(next);
        if self.anchor.is_some_and(|anchor| !self.contains(anchor)) {
            self.anchor = None;
        }
        changed
    }

    /// Remove one id if present.
    pub fn remove(&mut self, id: EntityId) -> bool {
        self.retain(|sel| sel != id)
    }

    /// Drop every id for which `exists` returns false.
    pub fn prune(&mut self, exists: impl Fn(EntityId) -> bool) -> bool {
        self.retain(exists)
    }

    fn retain(&mut self, keep: impl Fn(EntityId) -> bool) -> bool {
        let before = self.ids.len();
        self.ids.retain(|&id| keep(id));
        if self.anchor.is_some_and(|anchor| !keep(anchor)) {
            self.anchor = None;
        }
        self.ids.len() != before
    }

    fn replace(&mut self, next: Vec<EntityId>) -> bool {
        if self.ids == next {
            return false;
        }
        self.ids = next;
        true
    }
}

/// Entities whose center lies within `rect` (edges inclusive).
///
/// Hidden entities are never hit. The result keeps the order of `entities`.
pub fn hit_test_marquee(rect: Rect, entities: &[CanvasEntity]) -> Vec<EntityId> {
    entities
        .iter()
        .filter(|entity| entity.visible && rect_contains_point(rect, entity.center()))
        .map(|entity| entity.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{Point, Size};
    use uuid::Uuid;

    fn ids(n: usize) -> Vec<EntityId> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    #[test]
    fn test_select_only_replaces() {
        let all = ids(3);
        let mut selection = SelectionManager::new();

        assert!(selection.select_only(all[0]));
        assert!(selection.select_only(all[1]));
        assert_eq!(selection.ids(), &[all[1]]);
        // Re-selecting the same entity is not a change
        assert!(!selection.select_only(all[1]));
        assert_eq!(selection.anchor(), Some(all[1]));
    }

    #[test]
    fn test_toggle() {
        let all = ids(2);
        let mut selection = SelectionManager::new();

        selection.toggle(all[0]);
        selection.toggle(all[1]);
        assert_eq!(selection.ids(), &[all[0], all[1]]);

        selection.toggle(all[0]);
        assert_eq!(selection.ids(), &[all[1]]);
        assert!(!selection.contains(all[0]));
    }

    #[test]
    fn test_range_from_anchor() {
        let all = ids(5);
        let mut selection = SelectionManager::new();
        selection.select_only(all[1]);

        assert!(selection.select_range(all[3], &all));
        assert_eq!(selection.ids(), &all[1..=3]);
        assert_eq!(selection.anchor(), Some(all[1]));

        // Anchor unchanged, so a second range pivots around it
        selection.select_range(all[0], &all);
        assert_eq!(selection.ids(), &all[0..=1]);
    }

    #[test]
    fn test_range_without_anchor_selects_target() {
        let all = ids(3);
        let mut selection = SelectionManager::new();

        assert!(selection.select_range(all[2], &all));
        assert_eq!(selection.ids(), &[all[2]]);
    }

    #[test]
    fn test_range_unknown_target_is_ignored() {
        let all = ids(3);
        let mut selection = SelectionManager::new();
        selection.select_only(all[0]);

        assert!(!selection.select_range(Uuid::new_v4(), &all));
        assert_eq!(selection.ids(), &[all[0]]);
    }

    #[test]
    fn test_clear_and_select_all() {
        let all = ids(3);
        let mut selection = SelectionManager::new();

        assert!(!selection.clear());
        assert!(selection.select_all(&all));
        assert!(!selection.select_all(&all));
        assert_eq!(selection.len(), 3);
        assert!(selection.clear());
        assert!(selection.is_empty());
        assert_eq!(selection.anchor(), None);
    }

    #[test]
    fn test_set_dedups() {
        let all = ids(2);
        let mut selection = SelectionManager::new();

        assert!(selection.set([all[0], all[1], all[0]]));
        assert_eq!(selection.ids(), &[all[0], all[1]]);
        assert!(!selection.set([all[0], all[1]]));
    }

    #[test]
    fn test_prune_removes_stale_ids() {
        let all = ids(3);
        let mut selection = SelectionManager::new();
        selection.set(all.clone());
        selection.add(all[2]);

        let removed = all[2];
        assert!(selection.prune(|id| id != removed));
        assert_eq!(selection.ids(), &all[0..2]);
        assert_eq!(selection.anchor(), None);
        assert!(!selection.prune(|_| true));
    }

    #[test]
    fn test_marquee_uses_centers() {
        let inside = CanvasEntity::new(Point::new(10.0, 10.0), Size::new(20.0, 20.0));
        // Overlaps the marquee but its center (115, 20) is outside
        let overlapping = CanvasEntity::new(Point::new(90.0, 10.0), Size::new(50.0, 20.0));
        let mut hidden = CanvasEntity::new(Point::new(20.0, 20.0), Size::new(10.0, 10.0));
        hidden.visible = false;

        let hits = hit_test_marquee(
            Rect::new(0.0, 0.0, 100.0, 100.0),
            &[inside.clone(), overlapping, hidden],
        );
        assert_eq!(hits, vec![inside.id]);
    }

    #[test]
    fn test_marquee_rect_orientation_does_not_matter() {
        let entity = CanvasEntity::new(Point::new(10.0, 10.0), Size::new(20.0, 20.0));
        let hits = hit_test_marquee(Rect::new(100.0, 100.0, 0.0, 0.0), &[entity.clone()]);
        assert_eq!(hits, vec![entity.id]);
    }
}
