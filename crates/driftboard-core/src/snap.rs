//! Snap functionality for aligning entities to the grid, to each other, to
//! size presets and to angle increments.
//!
//! All functions are pure. The engine feeds them the grid configuration read
//! at the current move, so they never cache anything.

use crate::config::GridConfig;
use crate::entity::{CanvasEntity, EntityId};
use crate::geometry::normalize_degrees;
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Type of canvas snap point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnapPointKind {
    /// Corner or edge midpoint.
    Edge,
    /// Center of an entity.
    Center,
}

/// A point on another entity that a moving entity can align to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapCandidate {
    pub point: Point,
    pub kind: SnapPointKind,
    /// The entity the point belongs to.
    pub source: EntityId,
}

/// Which snap fired, for visual feedback only.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum SnapKind {
    #[default]
    None,
    Grid,
    Canvas(SnapPointKind),
}

/// Informational record of a snap. Never consumed by engine logic.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SnapInfo {
    pub kind: SnapKind,
    /// The grid point or canvas point aligned to.
    pub target: Option<Point>,
    /// Entity owning the canvas point.
    pub source: Option<EntityId>,
}

impl SnapInfo {
    pub fn is_snapped(&self) -> bool {
        self.kind != SnapKind::None
    }
}

/// Result of resolving a proposed position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnappedPosition {
    pub position: Point,
    pub info: SnapInfo,
}

/// Round a value to the nearest multiple of `cell_size`.
pub fn snap_to_grid(value: f64, cell_size: f64) -> f64 {
    if cell_size <= 0.0 {
        return value;
    }
    (value / cell_size).round() * cell_size
}

/// Snap a point to the nearest grid intersection.
pub fn nearest_grid_point(point: Point, cell_size: f64) -> Point {
    Point::new(snap_to_grid(point.x, cell_size), snap_to_grid(point.y, cell_size))
}

/// The nine alignment points of a rectangle: 4 corners, 4 edge midpoints,
/// then the center.
pub fn anchor_points(bounds: Rect) -> [(Point, SnapPointKind); 9] {
    let center = bounds.center();
    [
        // Corners
        (Point::new(bounds.x0, bounds.y0), SnapPointKind::Edge),
        (Point::new(bounds.x1, bounds.y0), SnapPointKind::Edge),
        (Point::new(bounds.x1, bounds.y1), SnapPointKind::Edge),
        (Point::new(bounds.x0, bounds.y1), SnapPointKind::Edge),
        // Edge midpoints
        (Point::new(center.x, bounds.y0), SnapPointKind::Edge),
        (Point::new(bounds.x1, center.y), SnapPointKind::Edge),
        (Point::new(center.x, bounds.y1), SnapPointKind::Edge),
        (Point::new(bounds.x0, center.y), SnapPointKind::Edge),
        (center, SnapPointKind::Center),
    ]
}

/// Collect snap candidates from every other visible entity.
pub fn candidate_snap_points(entity: EntityId, others: &[CanvasEntity]) -> Vec<SnapCandidate> {
    others
        .iter()
        .filter(|other| other.visible && other.id != entity)
        .flat_map(|other| {
            anchor_points(other.rect())
                .into_iter()
                .map(move |(point, kind)| SnapCandidate {
                    point,
                    kind,
                    source: other.id,
                })
        })
        .collect()
}

/// Find the candidate closest to `point` within `threshold`.
///
/// Ties go to the candidate that comes first in the list.
pub fn find_nearest_within_threshold(
    point: Point,
    candidates: &[SnapCandidate],
    threshold: f64,
) -> Option<&SnapCandidate> {
    let mut best: Option<(&SnapCandidate, f64)> = None;
    for candidate in candidates {
        let dist = point.distance(candidate.point);
        if dist > threshold {
            continue;
        }
        if best.is_none_or(|(_, best_dist)| dist < best_dist) {
            best = Some((candidate, dist));
        }
    }
    best.map(|(candidate, _)| candidate)
}

/// Resolve where an entity of `size` proposed at `proposed` should land.
///
/// Canvas snapping is tried first: each of the moving rectangle's anchor
/// points is matched against `candidates`, and the closest pair within the
/// threshold wins. Otherwise the top-left corner snaps to the nearest grid
/// point if the grid is enabled and the point is within the threshold.
/// Otherwise `proposed` is returned unchanged. Pass an empty candidate list
/// to disable canvas snapping.
pub fn resolve_snapped_position(
    proposed: Point,
    size: Size,
    grid: &GridConfig,
    candidates: &[SnapCandidate],
) -> SnappedPosition {
    let threshold = grid.snap_threshold_px.max(0.0);

    if !candidates.is_empty() {
        let moving = Rect::from_origin_size(proposed, size);
        let mut best: Option<(Vec2, &SnapCandidate, f64)> = None;
        for (anchor, _) in anchor_points(moving) {
            if let Some(candidate) = find_nearest_within_threshold(anchor, candidates, threshold) {
                let dist = anchor.distance(candidate.point);
                if best.is_none_or(|(_, _, best_dist)| dist < best_dist) {
                    best = Some((candidate.point - anchor, candidate, dist));
                }
            }
        }
        if let Some((offset, candidate, _)) = best {
            return SnappedPosition {
                position: proposed + offset,
                info: SnapInfo {
                    kind: SnapKind::Canvas(candidate.kind),
                    target: Some(candidate.point),
                    source: Some(candidate.source),
                },
            };
        }
    }

    if grid.enabled {
        let grid_point = nearest_grid_point(proposed, grid.cell_size);
        if proposed.distance(grid_point) <= threshold {
            return SnappedPosition {
                position: grid_point,
                info: SnapInfo {
                    kind: SnapKind::Grid,
                    target: Some(grid_point),
                    source: None,
                },
            };
        }
    }

    SnappedPosition {
        position: proposed,
        info: SnapInfo::default(),
    }
}

/// Snap an angle to the nearest increment.
/// Returns the snapped angle in degrees (0-360). A non-positive increment
/// only normalizes.
pub fn snap_angle(angle_degrees: f64, increment: f64) -> f64 {
    if increment <= 0.0 {
        return normalize_degrees(angle_degrees);
    }
    normalize_degrees((angle_degrees / increment).round() * increment)
}

/// Find the preset closest to `size` in size space, if within `threshold`.
pub fn snap_size_to_presets(size: Size, presets: &[Size], threshold: f64) -> Option<Size> {
    let mut best: Option<(Size, f64)> = None;
    for &preset in presets {
        let dist = (preset.width - size.width).hypot(preset.height - size.height);
        if dist > threshold {
            continue;
        }
        if best.is_none_or(|(_, best_dist)| dist < best_dist) {
            best = Some((preset, dist));
        }
    }
    best.map(|(preset, _)| preset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn grid(cell_size: f64, threshold: f64) -> GridConfig {
        GridConfig {
            cell_size,
            enabled: true,
            snap_threshold_px: threshold,
        }
    }

    fn entity(x: f64, y: f64, w: f64, h: f64) -> CanvasEntity {
        CanvasEntity::new(Point::new(x, y), Size::new(w, h))
    }

    #[test]
    fn test_snap_to_grid() {
        assert_eq!(snap_to_grid(23.0, 20.0), 20.0);
        assert_eq!(snap_to_grid(31.0, 20.0), 40.0);
        assert_eq!(snap_to_grid(40.0, 20.0), 40.0);
        assert_eq!(snap_to_grid(-9.0, 20.0), -0.0);
    }

    #[test]
    fn test_nearest_grid_point() {
        assert_eq!(nearest_grid_point(Point::new(23.0, 47.0), 20.0), Point::new(20.0, 40.0));
    }

    #[test]
    fn test_candidate_points_skip_self_and_hidden() {
        let me = entity(0.0, 0.0, 10.0, 10.0);
        let other = entity(100.0, 100.0, 40.0, 20.0);
        let mut hidden = entity(300.0, 300.0, 10.0, 10.0);
        hidden.visible = false;

        let candidates = candidate_snap_points(me.id, &[me.clone(), other.clone(), hidden]);

        assert_eq!(candidates.len(), 9);
        assert!(candidates.iter().all(|c| c.source == other.id));
        assert_eq!(candidates.iter().filter(|c| c.kind == SnapPointKind::Center).count(), 1);
        assert!(candidates.iter().any(|c| c.point == Point::new(120.0, 110.0)));
    }

    #[test]
    fn test_nearest_tie_prefers_first() {
        let source = EntityId::nil();
        let candidates = [
            SnapCandidate { point: Point::new(5.0, 0.0), kind: SnapPointKind::Edge, source },
            SnapCandidate { point: Point::new(-5.0, 0.0), kind: SnapPointKind::Center, source },
        ];
        let best = find_nearest_within_threshold(Point::ZERO, &candidates, 10.0).unwrap();
        assert_eq!(best.kind, SnapPointKind::Edge);
    }

    #[test]
    fn test_nearest_outside_threshold() {
        let source = EntityId::nil();
        let candidates = [SnapCandidate { point: Point::new(11.0, 0.0), kind: SnapPointKind::Edge, source }];
        assert!(find_nearest_within_threshold(Point::ZERO, &candidates, 10.0).is_none());
    }

    #[test]
    fn test_grid_snap_example() {
        // Entity at (105, 58) dragged by (2, 1)
        let proposed = Point::new(107.0, 59.0);
        let result = resolve_snapped_position(proposed, Size::new(50.0, 50.0), &grid(20.0, 10.0), &[]);

        assert_eq!(result.position, Point::new(100.0, 60.0));
        assert_eq!(result.info.kind, SnapKind::Grid);
    }

    #[test]
    fn test_grid_snap_out_of_threshold() {
        let proposed = Point::new(110.0, 50.0);
        let result = resolve_snapped_position(proposed, Size::new(50.0, 50.0), &grid(40.0, 5.0), &[]);

        assert_eq!(result.position, proposed);
        assert!(!result.info.is_snapped());
    }

    #[test]
    fn test_grid_disabled() {
        let mut config = grid(20.0, 10.0);
        config.enabled = false;
        let proposed = Point::new(107.0, 59.0);
        let result = resolve_snapped_position(proposed, Size::new(50.0, 50.0), &config, &[]);
        assert_eq!(result.position, proposed);
    }

    #[test]
    fn test_canvas_snap_beats_grid() {
        let other = entity(203.0, 0.0, 50.0, 50.0);
        let candidates = candidate_snap_points(EntityId::nil(), &[other.clone()]);
        // Right edge of the moving entity is 3 away from other's left edge,
        // while the grid point (100, 0) is 0 away from the proposed top-left.
        let proposed = Point::new(100.0, 0.0);
        let result = resolve_snapped_position(proposed, Size::new(100.0, 50.0), &grid(20.0, 10.0), &candidates);

        assert_eq!(result.position, Point::new(103.0, 0.0));
        assert_eq!(result.info.kind, SnapKind::Canvas(SnapPointKind::Edge));
        assert_eq!(result.info.source, Some(other.id));
    }

    #[test]
    fn test_canvas_center_snap() {
        let other = entity(0.0, 0.0, 100.0, 100.0);
        let candidates = candidate_snap_points(EntityId::nil(), &[other]);
        // A 20x20 entity whose center is at (52, 49) aligns centers
        let result = resolve_snapped_position(
            Point::new(42.0, 39.0),
            Size::new(20.0, 20.0),
            &grid(1000.0, 5.0),
            &candidates,
        );
        assert_eq!(result.position, Point::new(40.0, 40.0));
        assert_eq!(result.info.kind, SnapKind::Canvas(SnapPointKind::Center));
    }

    #[test]
    fn test_snap_angle() {
        assert!((snap_angle(7.0, 15.0) - 0.0).abs() < 0.01);
        assert!((snap_angle(8.0, 15.0) - 15.0).abs() < 0.01);
        assert!((snap_angle(359.0, 15.0) - 0.0).abs() < 0.01);
        assert!((snap_angle(-10.0, 15.0) - 345.0).abs() < 0.01);
        assert!((snap_angle(123.4, 0.0) - 123.4).abs() < 0.01);
    }

    #[test]
    fn test_size_preset_snap() {
        let presets = [Size::new(200.0, 100.0), Size::new(400.0, 300.0)];
        assert_eq!(
            snap_size_to_presets(Size::new(195.0, 104.0), &presets, 10.0),
            Some(Size::new(200.0, 100.0))
        );
        // Far from every preset: left unsnapped
        assert_eq!(snap_size_to_presets(Size::new(300.0, 200.0), &presets, 10.0), None);
        assert_eq!(snap_size_to_presets(Size::new(300.0, 200.0), &[], 10.0), None);
    }

    proptest! {
        #[test]
        fn grid_snap_is_idempotent(
            cell in 5.0f64..100.0,
            threshold in 0.0f64..50.0,
            x in -2000.0f64..2000.0,
            y in -2000.0f64..2000.0,
        ) {
            let config = grid(cell, threshold);
            let size = Size::new(30.0, 30.0);
            let once = resolve_snapped_position(Point::new(x, y), size, &config, &[]);
            let twice = resolve_snapped_position(once.position, size, &config, &[]);
            prop_assert!((once.position.x - twice.position.x).abs() < 1e-9);
            prop_assert!((once.position.y - twice.position.y).abs() < 1e-9);
        }

        #[test]
        fn canvas_snap_is_idempotent(
            ox in -300.0f64..300.0,
            oy in -300.0f64..300.0,
            anchor in 0usize..9,
            dx in -3.0f64..3.0,
            dy in -3.0f64..3.0,
        ) {
            let other = entity(ox, oy, 60.0, 40.0);
            let candidates = candidate_snap_points(EntityId::nil(), &[other.clone()]);
            let config = grid(20.0, 10.0);
            let size = Size::new(30.0, 30.0);
            // Top-left lands within the threshold of one of the other's anchors
            let (target, _) = anchor_points(other.rect())[anchor];
            let proposed = target + Vec2::new(dx, dy);

            let once = resolve_snapped_position(proposed, size, &config, &candidates);
            prop_assert!(matches!(once.info.kind, SnapKind::Canvas(_)));
            let twice = resolve_snapped_position(once.position, size, &config, &candidates);
            prop_assert!((once.position.x - twice.position.x).abs() < 1e-6);
            prop_assert!((once.position.y - twice.position.y).abs() < 1e-6);
        }
    }
}
