//! Drop zones: named rectangles that react when a drag hovers or drops on
//! them.
//!
//! Zones are collected from a [`DropZoneProvider`] when a drag starts and
//! discarded when it ends.

use crate::entity::CanvasEntity;
use crate::geometry::rect_contains_point;
use kurbo::{Point, Rect};
use std::rc::Rc;
use uuid::Uuid;

/// Unique identifier for a drop zone.
pub type DropZoneId = Uuid;

type AcceptFn = Rc<dyn Fn(&CanvasEntity) -> bool>;

/// A rectangular target for dragged entities.
#[derive(Clone)]
pub struct DropZone {
    pub id: DropZoneId,
    /// Axis-aligned, in workspace coordinates.
    pub rect: Rect,
    accepts: Option<AcceptFn>,
}

impl DropZone {
    /// A zone accepting every entity.
    pub fn new(rect: Rect) -> Self {
        Self {
            id: Uuid::new_v4(),
            rect,
            accepts: None,
        }
    }

    /// Restrict which entities the zone takes.
    pub fn with_accepts(mut self, accepts: impl Fn(&CanvasEntity) -> bool + 'static) -> Self {
        self.accepts = Some(Rc::new(accepts));
        self
    }

    pub fn accepts(&self, entity: &CanvasEntity) -> bool {
        self.accepts.as_ref().is_none_or(|accepts| accepts(entity))
    }

    pub fn contains(&self, point: Point) -> bool {
        rect_contains_point(self.rect, point)
    }
}

impl std::fmt::Debug for DropZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DropZone")
            .field("id", &self.id)
            .field("rect", &self.rect)
            .field("filtered", &self.accepts.is_some())
            .finish()
    }
}

/// Supplies the zones that are live for a drag.
pub trait DropZoneProvider {
    /// Zones for a drag of `dragged`. Later zones take precedence where
    /// they overlap.
    fn drop_zones(&self, dragged: &[CanvasEntity]) -> Vec<DropZone>;
}

impl DropZoneProvider for Vec<DropZone> {
    fn drop_zones(&self, _dragged: &[CanvasEntity]) -> Vec<DropZone> {
        self.clone()
    }
}

/// Change in the hovered zone after a pointer move.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HoverChange {
    pub left: Option<DropZoneId>,
    pub entered: Option<DropZoneId>,
}

impl HoverChange {
    pub fn is_empty(&self) -> bool {
        self.left.is_none() && self.entered.is_none()
    }
}

/// Zones registered for the current drag plus the one being hovered.
#[derive(Debug, Clone, Default)]
pub struct DropZoneRegistry {
    zones: Vec<DropZone>,
    hovered: Option<DropZoneId>,
}

impl DropZoneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_zones(zones: Vec<DropZone>) -> Self {
        Self { zones, hovered: None }
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn hovered(&self) -> Option<DropZoneId> {
        self.hovered
    }

    /// The topmost zone under `point` that accepts every dragged entity.
    pub fn resolve(&self, point: Point, dragged: &[CanvasEntity]) -> Option<DropZoneId> {
        self.zones
            .iter()
            .rev()
            .find(|zone| zone.contains(point) && dragged.iter().all(|entity| zone.accepts(entity)))
            .map(|zone| zone.id)
    }

    /// Re-resolve the hovered zone and report what changed.
    pub fn update_hover(&mut self, point: Point, dragged: &[CanvasEntity]) -> HoverChange {
        let next = self.resolve(point, dragged);
        if next == self.hovered {
            return HoverChange::default();
        }
        let change = HoverChange {
            left: self.hovered,
            entered: next,
        };
        self.hovered = next;
        change
    }

    /// Forget the hovered zone, returning it.
    pub fn take_hovered(&mut self) -> Option<DropZoneId> {
        self.hovered.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Size;

    fn entity() -> CanvasEntity {
        CanvasEntity::new(Point::ZERO, Size::new(50.0, 50.0))
    }

    #[test]
    fn test_hover_enter_and_leave() {
        let zone = DropZone::new(Rect::new(100.0, 100.0, 200.0, 200.0));
        let zone_id = zone.id;
        let mut registry = DropZoneRegistry::from_zones(vec![zone]);
        let dragged = [entity()];

        let change = registry.update_hover(Point::new(150.0, 150.0), &dragged);
        assert_eq!(change, HoverChange { left: None, entered: Some(zone_id) });

        // Staying inside is not a change
        assert!(registry.update_hover(Point::new(160.0, 150.0), &dragged).is_empty());

        let change = registry.update_hover(Point::new(10.0, 10.0), &dragged);
        assert_eq!(change, HoverChange { left: Some(zone_id), entered: None });
        assert_eq!(registry.hovered(), None);
    }

    #[test]
    fn test_later_zone_wins_overlap() {
        let below = DropZone::new(Rect::new(0.0, 0.0, 100.0, 100.0));
        let above = DropZone::new(Rect::new(50.0, 50.0, 150.0, 150.0));
        let above_id = above.id;
        let registry = DropZoneRegistry::from_zones(vec![below, above]);

        assert_eq!(registry.resolve(Point::new(75.0, 75.0), &[entity()]), Some(above_id));
    }

    #[test]
    fn test_rejecting_zone_is_skipped() {
        let open = DropZone::new(Rect::new(0.0, 0.0, 100.0, 100.0));
        let open_id = open.id;
        let picky = DropZone::new(Rect::new(0.0, 0.0, 100.0, 100.0))
            .with_accepts(|entity| entity.size.width > 500.0);
        let registry = DropZoneRegistry::from_zones(vec![open, picky]);

        assert_eq!(registry.resolve(Point::new(10.0, 10.0), &[entity()]), Some(open_id));
    }

    #[test]
    fn test_vec_provider_clones_zones() {
        let zones = vec![DropZone::new(Rect::new(0.0, 0.0, 10.0, 10.0))];
        let provided = zones.drop_zones(&[]);
        assert_eq!(provided.len(), 1);
        assert_eq!(provided[0].id, zones[0].id);
    }
}
