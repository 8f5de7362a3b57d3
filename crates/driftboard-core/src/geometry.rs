//! Pure geometry helpers: bounds clamping, rotation math, containment.

use crate::entity::CanvasEntity;
use kurbo::{Point, Rect, Size};

/// Normalize an angle in degrees to `[0, 360)`.
pub fn normalize_degrees(angle: f64) -> f64 {
    let normalized = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if normalized >= 360.0 { 0.0 } else { normalized }
}

/// Angle of `pointer` around `center`, in degrees.
///
/// Offset by +90° so that straight up from the center reads as 0°, and
/// normalized to `[0, 360)`.
pub fn compute_rotation_angle(center: Point, pointer: Point) -> f64 {
    let dx = pointer.x - center.x;
    let dy = pointer.y - center.y;
    normalize_degrees(dy.atan2(dx).to_degrees() + 90.0)
}

/// Clamp a position so the whole `size` rectangle stays inside `bounds`.
///
/// An entity larger than the bounds on an axis is pinned to the bounds'
/// leading edge on that axis.
pub fn clamp_to_bounds(position: Point, size: Size, bounds: Rect) -> Point {
    let bounds = bounds.abs();
    Point::new(
        clamp_axis(position.x, size.width, bounds.x0, bounds.x1),
        clamp_axis(position.y, size.height, bounds.y0, bounds.y1),
    )
}

fn clamp_axis(value: f64, extent: f64, min: f64, max: f64) -> f64 {
    let upper = max - extent;
    if upper < min {
        min
    } else {
        value.clamp(min, upper)
    }
}

/// Inclusive point-in-rectangle test.
///
/// `kurbo::Rect::contains` excludes the far edges; marquee selection and
/// drop zones treat the boundary as inside.
pub fn rect_contains_point(rect: Rect, point: Point) -> bool {
    let rect = rect.abs();
    point.x >= rect.x0 && point.x <= rect.x1 && point.y >= rect.y0 && point.y <= rect.y1
}

/// Whether `inner` lies entirely within `outer` (edges inclusive).
pub fn rect_contains_rect(outer: Rect, inner: Rect) -> bool {
    let outer = outer.abs();
    let inner = inner.abs();
    inner.x0 >= outer.x0 && inner.y0 >= outer.y0 && inner.x1 <= outer.x1 && inner.y1 <= outer.y1
}

/// Rotate `point` around `center` by `degrees` (clockwise in screen space).
pub fn rotate_point_about(point: Point, center: Point, degrees: f64) -> Point {
    let (sin_r, cos_r) = degrees.to_radians().sin_cos();
    let dx = point.x - center.x;
    let dy = point.y - center.y;
    Point::new(
        center.x + dx * cos_r - dy * sin_r,
        center.y + dx * sin_r + dy * cos_r,
    )
}

/// Rotation-aware hit test against an entity's rectangle.
pub fn entity_contains_point(entity: &CanvasEntity, point: Point) -> bool {
    let local = if entity.rotation.abs() > f64::EPSILON {
        rotate_point_about(point, entity.center(), -entity.rotation)
    } else {
        point
    };
    rect_contains_point(entity.rect(), local)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_rotation_angle_up_is_zero() {
        let center = Point::new(50.0, 50.0);
        assert!(approx(compute_rotation_angle(center, Point::new(50.0, 0.0)), 0.0));
        assert!(approx(compute_rotation_angle(center, Point::new(100.0, 50.0)), 90.0));
        assert!(approx(compute_rotation_angle(center, Point::new(50.0, 100.0)), 180.0));
        assert!(approx(compute_rotation_angle(center, Point::new(0.0, 50.0)), 270.0));
    }

    #[test]
    fn test_rotation_angle_is_normalized() {
        let center = Point::ZERO;
        for i in 0..36 {
            let theta = (i as f64 * 10.0).to_radians();
            let angle = compute_rotation_angle(center, Point::new(theta.cos(), theta.sin()));
            assert!((0.0..360.0).contains(&angle), "angle {angle} out of range");
        }
    }

    #[test]
    fn test_normalize_degrees() {
        assert!(approx(normalize_degrees(-90.0), 270.0));
        assert!(approx(normalize_degrees(360.0), 0.0));
        assert!(approx(normalize_degrees(725.0), 5.0));
        assert!(normalize_degrees(-1e-18) < 360.0);
    }

    #[test]
    fn test_clamp_inside_is_unchanged() {
        let bounds = Rect::new(0.0, 0.0, 500.0, 500.0);
        let pos = clamp_to_bounds(Point::new(100.0, 100.0), Size::new(50.0, 50.0), bounds);
        assert_eq!(pos, Point::new(100.0, 100.0));
    }

    #[test]
    fn test_clamp_pushes_back_inside() {
        let bounds = Rect::new(0.0, 0.0, 500.0, 400.0);
        let size = Size::new(100.0, 80.0);

        assert_eq!(clamp_to_bounds(Point::new(-20.0, 10.0), size, bounds), Point::new(0.0, 10.0));
        assert_eq!(clamp_to_bounds(Point::new(450.0, 390.0), size, bounds), Point::new(400.0, 320.0));
    }

    #[test]
    fn test_clamp_oversized_pins_to_origin() {
        let bounds = Rect::new(10.0, 10.0, 60.0, 60.0);
        let pos = clamp_to_bounds(Point::new(30.0, 30.0), Size::new(100.0, 20.0), bounds);
        assert_eq!(pos, Point::new(10.0, 30.0));
    }

    #[test]
    fn test_rect_contains_point_is_inclusive() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(rect_contains_point(rect, Point::new(10.0, 10.0)));
        assert!(rect_contains_point(rect, Point::new(0.0, 5.0)));
        assert!(!rect_contains_point(rect, Point::new(10.1, 5.0)));
        // Unnormalized rectangles behave the same
        assert!(rect_contains_point(Rect::new(10.0, 10.0, 0.0, 0.0), Point::new(5.0, 5.0)));
    }

    #[test]
    fn test_rotated_entity_hit() {
        let entity = CanvasEntity::new(Point::new(0.0, 40.0), Size::new(100.0, 20.0))
            .with_rotation(90.0);
        // Rotated 90° around (50, 50): now spans x 40..60, y 0..100
        assert!(entity_contains_point(&entity, Point::new(50.0, 5.0)));
        assert!(!entity_contains_point(&entity, Point::new(5.0, 50.0)));
    }

    #[test]
    fn test_rotate_point_about() {
        let p = rotate_point_about(Point::new(10.0, 0.0), Point::ZERO, 90.0);
        assert!(approx(p.x, 0.0));
        assert!(approx(p.y, 10.0));
    }
}
