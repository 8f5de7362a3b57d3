//! Rotate session: turns one entity around its center.

use crate::entity::{EntityGeometry, EntityId};
use crate::geometry::compute_rotation_angle;
use crate::snap::snap_angle;
use kurbo::Point;

#[derive(Debug, Clone, PartialEq)]
pub struct RotateSession {
    snapshot: EntityGeometry,
    /// Pivot, fixed when the session starts.
    center: Point,
    /// Snap increment in degrees, `0` for free rotation.
    increment: f64,
}

impl RotateSession {
    pub fn new(snapshot: EntityGeometry, increment: f64) -> Self {
        Self {
            center: snapshot.center(),
            snapshot,
            increment,
        }
    }

    pub fn entity(&self) -> EntityId {
        self.snapshot.id
    }

    pub fn snapshot(&self) -> &EntityGeometry {
        &self.snapshot
    }

    pub fn center(&self) -> Point {
        self.center
    }

    /// Rotation in degrees for the pointer at `pointer`, in `[0, 360)`.
    pub fn compute(&self, pointer: Point) -> f64 {
        let angle = compute_rotation_angle(self.center, pointer);
        if self.increment > 0.0 {
            snap_angle(angle, self.increment)
        } else {
            angle
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Size;

    fn snapshot() -> EntityGeometry {
        EntityGeometry {
            id: EntityId::nil(),
            position: Point::new(0.0, 0.0),
            size: Size::new(100.0, 100.0),
            rotation: 30.0,
        }
    }

    #[test]
    fn test_free_rotation() {
        let session = RotateSession::new(snapshot(), 0.0);
        assert_eq!(session.center(), Point::new(50.0, 50.0));
        // Pointer straight right of the center reads as 90°
        assert!((session.compute(Point::new(150.0, 50.0)) - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_snapped_rotation() {
        let session = RotateSession::new(snapshot(), 15.0);
        // 100° from up is 10° past a quarter turn, rounds to 105°
        let theta = 10f64.to_radians();
        let pointer = Point::new(50.0 + 100.0 * theta.cos(), 50.0 + 100.0 * theta.sin());
        assert!((session.compute(pointer) - 105.0).abs() < 1e-9);
    }

    #[test]
    fn test_snapped_rotation_wraps_to_zero() {
        let session = RotateSession::new(snapshot(), 15.0);
        // A hair left of straight up
        let angle = session.compute(Point::new(49.0, -100.0));
        assert!(angle.abs() < 1e-9);
    }
}
