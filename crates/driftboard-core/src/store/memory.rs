//! In-memory store and viewport implementations.

use super::{EntityStore, StoreError, StoreResult, Viewport};
use crate::entity::{CanvasEntity, EntityId, EntityPatch};
use kurbo::{Rect, Vec2};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Offset applied to duplicates so they do not sit exactly on the original.
const DUPLICATE_OFFSET: f64 = 20.0;

/// In-memory entity store for tests and embedded hosts.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entities: HashMap<EntityId, CanvasEntity>,
    /// Ids whose updates fail, to exercise adapter-failure handling.
    failing: HashSet<EntityId>,
    /// Number of successful `update_entity` calls.
    writes: usize,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a list of entities.
    pub fn with_entities(entities: impl IntoIterator<Item = CanvasEntity>) -> Self {
        let mut store = Self::new();
        for entity in entities {
            store.insert(entity);
        }
        store
    }

    /// Insert or replace an entity.
    pub fn insert(&mut self, entity: CanvasEntity) {
        self.entities.insert(entity.id, entity);
    }

    /// Remove an entity directly, as an external actor would.
    pub fn remove(&mut self, id: EntityId) -> Option<CanvasEntity> {
        self.entities.remove(&id)
    }

    /// Make every future update of `id` fail (or succeed again).
    pub fn set_failing(&mut self, id: EntityId, failing: bool) {
        if failing {
            self.failing.insert(id);
        } else {
            self.failing.remove(&id);
        }
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    fn next_z_index(&self) -> i64 {
        self.entities
            .values()
            .map(|e| e.z_index)
            .max()
            .map_or(0, |z| z + 1)
    }
}

impl EntityStore for MemoryStore {
    fn entity(&self, id: EntityId) -> Option<CanvasEntity> {
        self.entities.get(&id).cloned()
    }

    fn entities(&self) -> Vec<CanvasEntity> {
        let mut entities: Vec<_> = self.entities.values().cloned().collect();
        // Stable order for equal z-indices
        entities.sort_by(|a, b| a.z_index.cmp(&b.z_index).then_with(|| a.id.cmp(&b.id)));
        entities
    }

    fn update_entity(&mut self, id: EntityId, patch: &EntityPatch) -> StoreResult<()> {
        if self.failing.contains(&id) {
            return Err(StoreError::Rejected {
                id,
                reason: "store is rejecting writes".to_string(),
            });
        }
        let entity = self.entities.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        entity.apply(patch);
        self.writes += 1;
        Ok(())
    }

    fn request_delete(&mut self, id: EntityId) -> StoreResult<()> {
        self.entities
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }

    fn request_duplicate(&mut self, id: EntityId) -> StoreResult<EntityId> {
        let source = self.entities.get(&id).ok_or(StoreError::NotFound(id))?;
        let mut copy = source.clone();
        copy.id = Uuid::new_v4();
        copy.position.x += DUPLICATE_OFFSET;
        copy.position.y += DUPLICATE_OFFSET;
        copy.z_index = self.next_z_index();
        let new_id = copy.id;
        self.entities.insert(new_id, copy);
        Ok(new_id)
    }
}

/// A fixed-bounds viewport that tracks its scroll offset.
#[derive(Debug, Clone)]
pub struct MemoryViewport {
    bounds: Rect,
    visible: Rect,
    /// Total scroll applied so far.
    pub scrolled: Vec2,
}

impl MemoryViewport {
    /// `bounds` is the container; `visible` the initially visible region.
    pub fn new(bounds: Rect, visible: Rect) -> Self {
        Self {
            bounds,
            visible,
            scrolled: Vec2::ZERO,
        }
    }

    /// A viewport whose visible region equals its bounds.
    pub fn fixed(bounds: Rect) -> Self {
        Self::new(bounds, bounds)
    }
}

impl Viewport for MemoryViewport {
    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn visible_rect(&self) -> Rect {
        self.visible
    }

    fn scroll_by(&mut self, delta: Vec2) {
        self.visible = self.visible + delta;
        self.scrolled += delta;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{Point, Size};

    fn entity(x: f64, z: i64) -> CanvasEntity {
        CanvasEntity::new(Point::new(x, 0.0), Size::new(10.0, 10.0)).with_z_index(z)
    }

    #[test]
    fn test_entities_ordered_by_z_index() {
        let a = entity(0.0, 2);
        let b = entity(1.0, 0);
        let c = entity(2.0, 1);
        let store = MemoryStore::with_entities([a.clone(), b.clone(), c.clone()]);

        let ids: Vec<_> = store.entities().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![b.id, c.id, a.id]);
    }

    #[test]
    fn test_update_missing_entity() {
        let mut store = MemoryStore::new();
        let id = Uuid::new_v4();
        let result = store.update_entity(id, &EntityPatch::z_index(1));

        assert_eq!(result, Err(StoreError::NotFound(id)));
    }

    #[test]
    fn test_failing_updates() {
        let e = entity(0.0, 0);
        let mut store = MemoryStore::with_entities([e.clone()]);
        store.set_failing(e.id, true);

        assert!(matches!(
            store.update_entity(e.id, &EntityPatch::z_index(5)),
            Err(StoreError::Rejected { .. })
        ));
        assert_eq!(store.write_count(), 0);

        store.set_failing(e.id, false);
        assert!(store.update_entity(e.id, &EntityPatch::z_index(5)).is_ok());
        assert_eq!(store.entity(e.id).map(|e| e.z_index), Some(5));
    }

    #[test]
    fn test_duplicate_goes_on_top() {
        let a = entity(0.0, 0);
        let b = entity(50.0, 3);
        let mut store = MemoryStore::with_entities([a.clone(), b]);

        let copy_id = store.request_duplicate(a.id).unwrap();
        let copy = store.entity(copy_id).unwrap();

        assert_ne!(copy_id, a.id);
        assert_eq!(copy.z_index, 4);
        assert_eq!(copy.size, a.size);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_delete() {
        let a = entity(0.0, 0);
        let mut store = MemoryStore::with_entities([a.clone()]);

        store.request_delete(a.id).unwrap();
        assert!(store.is_empty());
        assert!(store.request_delete(a.id).is_err());
    }

    #[test]
    fn test_viewport_scroll() {
        let mut viewport = MemoryViewport::fixed(Rect::new(0.0, 0.0, 100.0, 100.0));
        viewport.scroll_by(Vec2::new(5.0, -3.0));

        assert_eq!(viewport.visible_rect(), Rect::new(5.0, -3.0, 105.0, 97.0));
        assert_eq!(viewport.bounds(), Rect::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(viewport.scrolled, Vec2::new(5.0, -3.0));
    }
}
