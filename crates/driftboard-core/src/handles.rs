//! Resize handle definitions and hit testing.

use crate::entity::CanvasEntity;
use crate::geometry::rotate_point_about;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// The eight resize handles around an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeHandle {
    N,
    S,
    E,
    W,
    NE,
    NW,
    SE,
    SW,
}

impl ResizeHandle {
    /// All handles, corners first so they win over edges on small entities.
    pub const ALL: [ResizeHandle; 8] = [
        ResizeHandle::NW,
        ResizeHandle::NE,
        ResizeHandle::SE,
        ResizeHandle::SW,
        ResizeHandle::N,
        ResizeHandle::E,
        ResizeHandle::S,
        ResizeHandle::W,
    ];

    /// Horizontal edge moved by this handle: -1 west, 1 east, 0 none.
    pub fn horizontal(self) -> i8 {
        match self {
            ResizeHandle::E | ResizeHandle::NE | ResizeHandle::SE => 1,
            ResizeHandle::W | ResizeHandle::NW | ResizeHandle::SW => -1,
            ResizeHandle::N | ResizeHandle::S => 0,
        }
    }

    /// Vertical edge moved by this handle: -1 north, 1 south, 0 none.
    pub fn vertical(self) -> i8 {
        match self {
            ResizeHandle::S | ResizeHandle::SE | ResizeHandle::SW => 1,
            ResizeHandle::N | ResizeHandle::NE | ResizeHandle::NW => -1,
            ResizeHandle::E | ResizeHandle::W => 0,
        }
    }

    pub fn is_corner(self) -> bool {
        self.horizontal() != 0 && self.vertical() != 0
    }

    /// Handle position on an unrotated rectangle.
    pub fn position_on(self, rect: Rect) -> Point {
        let center = rect.center();
        let x = match self.horizontal() {
            -1 => rect.x0,
            1 => rect.x1,
            _ => center.x,
        };
        let y = match self.vertical() {
            -1 => rect.y0,
            1 => rect.y1,
            _ => center.y,
        };
        Point::new(x, y)
    }
}

/// A resize handle with its position in workspace coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    pub kind: ResizeHandle,
    pub position: Point,
}

impl Handle {
    /// Check if a point (in workspace coordinates) hits this handle.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.position.distance(point) <= tolerance
    }
}

/// Handles of an entity, rotated with it.
pub fn entity_handles(entity: &CanvasEntity) -> Vec<Handle> {
    let rect = entity.rect();
    let center = rect.center();
    ResizeHandle::ALL
        .iter()
        .map(|&kind| Handle {
            kind,
            position: rotate_point_about(kind.position_on(rect), center, entity.rotation),
        })
        .collect()
}

/// Find which handle (if any) is hit at the given point.
pub fn hit_test_handles(entity: &CanvasEntity, point: Point, tolerance: f64) -> Option<ResizeHandle> {
    entity_handles(entity)
        .into_iter()
        .find(|handle| handle.hit_test(point, tolerance))
        .map(|handle| handle.kind)
}
