//! Resize session and the shared resize computation.

use super::Constraints;
use crate::entity::{EntityGeometry, EntityId};
use crate::geometry::rotate_point_about;
use crate::handles::ResizeHandle;
use crate::snap::snap_size_to_presets;
use kurbo::{Point, Rect, Size, Vec2};

/// State of an in-progress handle resize. Only the primary entity resizes.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeSession {
    snapshot: EntityGeometry,
    handle: ResizeHandle,
    pointer_start: Point,
    constraints: Constraints,
}

impl ResizeSession {
    pub fn new(snapshot: EntityGeometry, handle: ResizeHandle, pointer_start: Point, constraints: Constraints) -> Self {
        Self {
            snapshot,
            handle,
            pointer_start,
            constraints,
        }
    }

    pub fn entity(&self) -> EntityId {
        self.snapshot.id
    }

    pub fn handle(&self) -> ResizeHandle {
        self.handle
    }

    pub fn snapshot(&self) -> &EntityGeometry {
        &self.snapshot
    }

    /// Geometry for the pointer at `pointer`.
    pub fn compute(&self, pointer: Point, keep_aspect: bool) -> EntityGeometry {
        compute_resize(
            &self.snapshot,
            self.handle,
            pointer - self.pointer_start,
            &self.constraints,
            keep_aspect,
        )
    }
}

/// Resize `snapshot` by dragging `handle` by `delta` (workspace units).
///
/// The edge opposite the handle stays fixed. The raw size is clamped to the
/// minimum and maximum, where the maximum also accounts for the container
/// bounds, and then snapped to a size preset if one is close enough and
/// itself within limits. When limits conflict the minimum wins.
pub fn compute_resize(
    snapshot: &EntityGeometry,
    handle: ResizeHandle,
    delta: Vec2,
    constraints: &Constraints,
    keep_aspect: bool,
) -> EntityGeometry {
    let rotated = snapshot.rotation.abs() > f64::EPSILON;
    // Work in the entity's own frame
    let local = if rotated {
        let p = rotate_point_about(Point::new(delta.x, delta.y), Point::ZERO, -snapshot.rotation);
        Vec2::new(p.x, p.y)
    } else {
        delta
    };

    let sx = f64::from(handle.horizontal());
    let sy = f64::from(handle.vertical());
    let mut width = snapshot.size.width + sx * local.x;
    let mut height = snapshot.size.height + sy * local.y;

    if keep_aspect && handle.is_corner() && snapshot.size.width > 0.0 && snapshot.size.height > 0.0 {
        let scale_x = width / snapshot.size.width;
        let scale_y = height / snapshot.size.height;
        let scale = if (scale_x - 1.0).abs() >= (scale_y - 1.0).abs() {
            scale_x
        } else {
            scale_y
        };
        width = snapshot.size.width * scale;
        height = snapshot.size.height * scale;
    }

    let max = max_size_for(snapshot, handle, constraints, rotated);
    let min = constraints.min_size;
    let mut size = Size::new(
        width.min(max.width).max(min.width),
        height.min(max.height).max(min.height),
    );

    if let Some(preset) = snap_size_to_presets(size, &constraints.size_presets, constraints.size_preset_threshold) {
        let fits = preset.width >= min.width
            && preset.height >= min.height
            && preset.width <= max.width
            && preset.height <= max.height;
        if fits {
            size = preset;
        }
    }

    let rect = snapshot.rect();
    let x = if handle.horizontal() < 0 { rect.x1 - size.width } else { rect.x0 };
    let y = if handle.vertical() < 0 { rect.y1 - size.height } else { rect.y0 };
    let mut position = Point::new(x, y);

    if rotated {
        // Keep the fixed anchor where it was on screen
        let anchor = anchor_point(rect, handle);
        let before = rotate_point_about(anchor, rect.center(), snapshot.rotation);
        let new_rect = Rect::from_origin_size(position, size);
        let after = rotate_point_about(anchor, new_rect.center(), snapshot.rotation);
        position += before - after;
    }

    EntityGeometry {
        position,
        size,
        ..*snapshot
    }
}

/// Point that stays fixed while `handle` is dragged.
fn anchor_point(rect: Rect, handle: ResizeHandle) -> Point {
    let x = match handle.horizontal() {
        1 => rect.x0,
        -1 => rect.x1,
        _ => rect.center().x,
    };
    let y = match handle.vertical() {
        1 => rect.y0,
        -1 => rect.y1,
        _ => rect.center().y,
    };
    Point::new(x, y)
}

/// Largest size allowed for this handle, combining the configured maximum
/// with the room left between the fixed edge and the bounds.
fn max_size_for(snapshot: &EntityGeometry, handle: ResizeHandle, constraints: &Constraints, rotated: bool) -> Size {
    let mut max = constraints.max_size.unwrap_or(Size::new(f64::INFINITY, f64::INFINITY));
    // Rotated entities are not bounds-limited while resizing
    if rotated {
        return max;
    }
    if let Some(bounds) = constraints.bounds {
        let rect = snapshot.rect();
        match handle.horizontal() {
            1 => max.width = max.width.min(bounds.x1 - rect.x0),
            -1 => max.width = max.width.min(rect.x1 - bounds.x0),
            _ => {}
        }
        match handle.vertical() {
            1 => max.height = max.height.min(bounds.y1 - rect.y0),
            -1 => max.height = max.height.min(rect.y1 - bounds.y0),
            _ => {}
        }
    }
    max
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn geometry(x: f64, y: f64, w: f64, h: f64) -> EntityGeometry {
        EntityGeometry {
            id: EntityId::nil(),
            position: Point::new(x, y),
            size: Size::new(w, h),
            rotation: 0.0,
        }
    }

    fn min_only(min: Size) -> Constraints {
        Constraints {
            min_size: min,
            ..Constraints::default()
        }
    }

    #[test]
    fn test_se_resize_respects_min_width() {
        let snapshot = geometry(0.0, 0.0, 100.0, 80.0);
        let constraints = min_only(Size::new(100.0, 40.0));

        let result = compute_resize(&snapshot, ResizeHandle::SE, Vec2::new(-150.0, 0.0), &constraints, false);
        assert_eq!(result.size, Size::new(100.0, 80.0));
        assert_eq!(result.position, Point::new(0.0, 0.0));
    }

    #[test]
    fn test_nw_keeps_opposite_corner() {
        let snapshot = geometry(100.0, 100.0, 100.0, 100.0);
        let result = compute_resize(
            &snapshot,
            ResizeHandle::NW,
            Vec2::new(-20.0, 30.0),
            &min_only(Size::ZERO),
            false,
        );
        assert_eq!(result.size, Size::new(120.0, 70.0));
        assert_eq!(result.position, Point::new(80.0, 130.0));
        assert_eq!(result.rect().x1, 200.0);
        assert_eq!(result.rect().y1, 200.0);
    }

    #[test]
    fn test_edge_handle_ignores_other_axis() {
        let snapshot = geometry(0.0, 0.0, 100.0, 100.0);
        let result = compute_resize(&snapshot, ResizeHandle::E, Vec2::new(25.0, 400.0), &min_only(Size::ZERO), false);
        assert_eq!(result.size, Size::new(125.0, 100.0));
    }

    #[test]
    fn test_west_min_size_keeps_right_edge() {
        let snapshot = geometry(100.0, 0.0, 100.0, 100.0);
        let result = compute_resize(
            &snapshot,
            ResizeHandle::W,
            Vec2::new(90.0, 0.0),
            &min_only(Size::new(40.0, 40.0)),
            false,
        );
        assert_eq!(result.size.width, 40.0);
        assert_eq!(result.position.x, 160.0);
    }

    #[test]
    fn test_bounds_cap_growth() {
        let snapshot = geometry(50.0, 50.0, 100.0, 100.0);
        let constraints = Constraints {
            bounds: Some(Rect::new(0.0, 0.0, 200.0, 300.0)),
            ..Constraints::default()
        };
        let result = compute_resize(&snapshot, ResizeHandle::SE, Vec2::new(500.0, 500.0), &constraints, false);
        assert_eq!(result.size, Size::new(150.0, 250.0));

        let result = compute_resize(&snapshot, ResizeHandle::NW, Vec2::new(-500.0, -500.0), &constraints, false);
        assert_eq!(result.position, Point::new(0.0, 0.0));
        assert_eq!(result.size, Size::new(150.0, 150.0));
    }

    #[test]
    fn test_min_wins_over_max() {
        let snapshot = geometry(0.0, 0.0, 100.0, 100.0);
        let constraints = Constraints {
            bounds: Some(Rect::new(0.0, 0.0, 30.0, 1000.0)),
            min_size: Size::new(40.0, 40.0),
            ..Constraints::default()
        };
        let result = compute_resize(&snapshot, ResizeHandle::E, Vec2::new(10.0, 0.0), &constraints, false);
        assert_eq!(result.size.width, 40.0);
    }

    #[test]
    fn test_preset_snap_within_limits() {
        let snapshot = geometry(0.0, 0.0, 100.0, 100.0);
        let constraints = Constraints {
            size_presets: vec![Size::new(200.0, 100.0), Size::new(20.0, 20.0)],
            size_preset_threshold: 10.0,
            min_size: Size::new(40.0, 40.0),
            ..Constraints::default()
        };

        let result = compute_resize(&snapshot, ResizeHandle::E, Vec2::new(96.0, 0.0), &constraints, false);
        assert_eq!(result.size, Size::new(200.0, 100.0));

        // The 20x20 preset is below the minimum and never applies
        let result = compute_resize(&snapshot, ResizeHandle::SE, Vec2::new(-80.0, -80.0), &constraints, false);
        assert_eq!(result.size, Size::new(40.0, 40.0));
    }

    #[test]
    fn test_keep_aspect_on_corner() {
        let snapshot = geometry(0.0, 0.0, 200.0, 100.0);
        let result = compute_resize(&snapshot, ResizeHandle::SE, Vec2::new(100.0, 10.0), &min_only(Size::ZERO), true);
        assert_eq!(result.size, Size::new(300.0, 150.0));
    }

    #[test]
    fn test_rotated_resize_uses_local_axes() {
        let mut snapshot = geometry(0.0, 0.0, 100.0, 100.0);
        snapshot.rotation = 90.0;
        // After a quarter turn the local east edge faces down the screen
        let result = compute_resize(&snapshot, ResizeHandle::E, Vec2::new(0.0, 50.0), &min_only(Size::ZERO), false);
        assert!((result.size.width - 150.0).abs() < 1e-9);
        assert!((result.size.height - 100.0).abs() < 1e-9);

        // The local west edge stays put on screen: its midpoint was at (50, 0)
        let west_mid = Point::new(result.position.x, result.position.y + result.size.height / 2.0);
        let on_screen = rotate_point_about(west_mid, result.center(), 90.0);
        assert!((on_screen.x - 50.0).abs() < 1e-9);
        assert!(on_screen.y.abs() < 1e-9);
    }

    #[test]
    fn test_session_uses_pointer_delta() {
        let snapshot = geometry(0.0, 0.0, 100.0, 100.0);
        let session = ResizeSession::new(snapshot, ResizeHandle::S, Point::new(50.0, 100.0), min_only(Size::ZERO));
        let result = session.compute(Point::new(70.0, 130.0), false);
        assert_eq!(result.size, Size::new(100.0, 130.0));
        assert_eq!(session.entity(), EntityId::nil());
    }
}
