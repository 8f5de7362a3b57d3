//! Drag session: rigid translation of the selection with snapping, bounds
//! clamping, throttling, auto-scroll and drop-zone tracking.

use super::{Constraints, MoveThrottle, Snapshot};
use crate::config::GridConfig;
use crate::drop_zone::DropZoneRegistry;
use crate::entity::{EntityGeometry, EntityId};
use crate::geometry::rect_contains_rect;
use crate::snap::{SnapCandidate, SnapInfo, resolve_snapped_position};
use kurbo::{Point, Rect, Vec2};
use std::time::Duration;

/// Geometry produced by one drag move.
#[derive(Debug, Clone, PartialEq)]
pub struct DragUpdate {
    /// Translation applied to every dragged entity.
    pub delta: Vec2,
    /// New geometry of every dragged entity, primary first.
    pub entities: Vec<EntityGeometry>,
    pub snap: SnapInfo,
}

/// State of an in-progress drag.
#[derive(Debug, Clone)]
pub struct DragSession {
    snapshot: Snapshot,
    pointer_start: Point,
    constraints: Constraints,
    /// Snap points of entities not being dragged, gathered at start.
    candidates: Vec<SnapCandidate>,
    throttle: MoveThrottle,
    moved: bool,
    /// Entity to deselect if the gesture ends as a plain modifier-click.
    deferred_toggle: Option<EntityId>,
    scroll_direction: Vec2,
    drop_zones: DropZoneRegistry,
}

impl DragSession {
    pub fn new(
        snapshot: Snapshot,
        pointer_start: Point,
        constraints: Constraints,
        candidates: Vec<SnapCandidate>,
        throttle_interval: Duration,
    ) -> Self {
        Self {
            snapshot,
            pointer_start,
            constraints,
            candidates,
            throttle: MoveThrottle::new(throttle_interval),
            moved: false,
            deferred_toggle: None,
            scroll_direction: Vec2::ZERO,
            drop_zones: DropZoneRegistry::new(),
        }
    }

    pub fn with_deferred_toggle(mut self, id: EntityId) -> Self {
        self.deferred_toggle = Some(id);
        self
    }

    pub fn with_drop_zones(mut self, drop_zones: DropZoneRegistry) -> Self {
        self.drop_zones = drop_zones;
        self
    }

    pub fn primary(&self) -> EntityId {
        self.snapshot.primary().id
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn pointer_start(&self) -> Point {
        self.pointer_start
    }

    pub fn remove_follower(&mut self, id: EntityId) -> bool {
        self.snapshot.remove_follower(id)
    }

    /// Run a sample through the throttle. Dropped samples are discarded.
    pub fn admit(&mut self, now: Duration) -> bool {
        self.throttle.admit(now)
    }

    pub fn mark_moved(&mut self) {
        self.moved = true;
        self.deferred_toggle = None;
    }

    pub fn has_moved(&self) -> bool {
        self.moved
    }

    pub fn deferred_toggle(&self) -> Option<EntityId> {
        self.deferred_toggle
    }

    pub fn scroll_direction(&self) -> Vec2 {
        self.scroll_direction
    }

    pub fn set_scroll_direction(&mut self, direction: Vec2) {
        self.scroll_direction = direction;
    }

    pub fn drop_zones(&self) -> &DropZoneRegistry {
        &self.drop_zones
    }

    pub fn drop_zones_mut(&mut self) -> &mut DropZoneRegistry {
        &mut self.drop_zones
    }

    /// Compute where everything lands for a pointer at `pointer`.
    ///
    /// The primary's proposed position is snapped, then clamped to the
    /// bounds. The resulting delta is applied to every follower unchanged,
    /// after being narrowed so no entity that started inside the bounds
    /// leaves them. A snap the narrowing pulled the primary away from is
    /// not reported.
    pub fn compute(&self, pointer: Point, grid: &GridConfig) -> DragUpdate {
        let primary = self.snapshot.primary();
        let raw_delta = pointer - self.pointer_start;
        let proposed = primary.position + raw_delta;

        let snapped = resolve_snapped_position(proposed, primary.size, grid, &self.candidates);
        let clamped = self.constraints.clamp_position(snapped.position, primary.size);
        let mut delta = clamped - primary.position;
        let mut snap = snapped.info;
        if let Some(bounds) = self.constraints.bounds {
            let narrowed = clamp_group_delta(delta, self.snapshot.entries(), bounds);
            if narrowed != delta {
                snap = SnapInfo::default();
            }
            delta = narrowed;
        }

        let entities = self
            .snapshot
            .entries()
            .iter()
            .map(|entry| EntityGeometry {
                position: entry.position + delta,
                ..*entry
            })
            .collect();

        DragUpdate {
            delta,
            entities,
            snap,
        }
    }
}

/// Narrow a group translation so that every entity whose rectangle started
/// inside `bounds` stays inside. Entities that started outside do not
/// constrain the group.
pub fn clamp_group_delta(delta: Vec2, entries: &[EntityGeometry], bounds: Rect) -> Vec2 {
    let bounds = bounds.abs();
    let (mut min_x, mut max_x) = (f64::NEG_INFINITY, f64::INFINITY);
    let (mut min_y, mut max_y) = (f64::NEG_INFINITY, f64::INFINITY);

    for entry in entries {
        let rect = entry.rect();
        if !rect_contains_rect(bounds, rect) {
            continue;
        }
        min_x = min_x.max(bounds.x0 - rect.x0);
        max_x = max_x.min(bounds.x1 - rect.x1);
        min_y = min_y.max(bounds.y0 - rect.y0);
        max_y = max_y.min(bounds.y1 - rect.y1);
    }

    // Every contributing entity allows a zero delta, so min <= 0 <= max
    Vec2::new(delta.x.max(min_x).min(max_x), delta.y.max(min_y).min(max_y))
}

/// Direction to auto-scroll for a pointer near the edges of `visible`.
///
/// Each component is -1, 0 or 1. Zero means the pointer is clear of the
/// margin on that axis.
pub fn auto_scroll_direction(pointer: Point, visible: Rect, margin: f64) -> Vec2 {
    if margin <= 0.0 {
        return Vec2::ZERO;
    }
    let visible = visible.abs();
    let axis = |value: f64, min: f64, max: f64| {
        if value < min + margin {
            -1.0
        } else if value > max - margin {
            1.0
        } else {
            0.0
        }
    };
    Vec2::new(
        axis(pointer.x, visible.x0, visible.x1),
        axis(pointer.y, visible.y0, visible.y1),
    )
}
