//! Marquee session: rubber-band selection over empty space.

use crate::entity::{CanvasEntity, EntityId};
use crate::selection::hit_test_marquee;
use kurbo::{Point, Rect};

#[derive(Debug, Clone, PartialEq)]
pub struct MarqueeSession {
    origin: Point,
    current: Point,
    /// Ids kept regardless of the rectangle (the prior selection when
    /// extending, otherwise empty).
    base: Vec<EntityId>,
    /// Selection to put back on cancel.
    restore: Vec<EntityId>,
}

impl MarqueeSession {
    pub fn new(origin: Point, base: Vec<EntityId>, restore: Vec<EntityId>) -> Self {
        Self {
            origin,
            current: origin,
            base,
            restore,
        }
    }

    /// The normalized selection rectangle.
    pub fn rect(&self) -> Rect {
        Rect::from_points(self.origin, self.current)
    }

    pub fn update(&mut self, pointer: Point) {
        self.current = pointer;
    }

    pub fn restore(&self) -> &[EntityId] {
        &self.restore
    }

    /// Selection for the current rectangle: the base ids still present in
    /// `entities`, followed by every newly hit entity.
    pub fn selection(&self, entities: &[CanvasEntity]) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self
            .base
            .iter()
            .copied()
            .filter(|id| entities.iter().any(|entity| entity.id == *id))
            .collect();
        for id in hit_test_marquee(self.rect(), entities) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }
}
