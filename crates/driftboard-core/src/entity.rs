//! Canvas entities and the geometry the engine reads and writes.

use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an entity, stable for its lifetime.
pub type EntityId = Uuid;

/// A positioned, resizable, rotatable rectangular panel.
///
/// Entities are owned by the external store. The engine only reads them and
/// writes [`EntityPatch`]es back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasEntity {
    pub id: EntityId,
    /// Top-left corner in workspace coordinates.
    pub position: Point,
    pub size: Size,
    /// Rotation in degrees, in `[0, 360)`.
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub z_index: i64,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

fn default_visible() -> bool {
    true
}

impl CanvasEntity {
    /// Create a visible, unrotated entity with a fresh id.
    pub fn new(position: Point, size: Size) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            size,
            rotation: 0.0,
            z_index: 0,
            visible: true,
        }
    }

    /// Builder-style z-index setter.
    pub fn with_z_index(mut self, z_index: i64) -> Self {
        self.z_index = z_index;
        self
    }

    /// Builder-style rotation setter.
    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    /// Axis-aligned rectangle of the unrotated entity.
    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(self.position, self.size)
    }

    /// Geometric center.
    pub fn center(&self) -> Point {
        self.rect().center()
    }

    /// Capture the mutable geometry of this entity.
    pub fn geometry(&self) -> EntityGeometry {
        EntityGeometry {
            id: self.id,
            position: self.position,
            size: self.size,
            rotation: self.rotation,
        }
    }

    /// Apply a patch in place. Used by in-memory stores.
    pub fn apply(&mut self, patch: &EntityPatch) {
        if let Some(position) = patch.position {
            self.position = position;
        }
        if let Some(size) = patch.size {
            self.size = size;
        }
        if let Some(rotation) = patch.rotation {
            self.rotation = rotation;
        }
        if let Some(z_index) = patch.z_index {
            self.z_index = z_index;
        }
        if let Some(visible) = patch.visible {
            self.visible = visible;
        }
    }
}

/// The spatial state of one entity at a point in time.
///
/// Used both for session snapshots and for event payloads.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntityGeometry {
    pub id: EntityId,
    pub position: Point,
    pub size: Size,
    pub rotation: f64,
}

impl EntityGeometry {
    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(self.position, self.size)
    }

    pub fn center(&self) -> Point {
        self.rect().center()
    }

    /// Patch that writes this geometry back verbatim.
    pub fn restore_patch(&self) -> EntityPatch {
        EntityPatch {
            position: Some(self.position),
            size: Some(self.size),
            rotation: Some(self.rotation),
            ..EntityPatch::default()
        }
    }
}

/// Partial update for an entity. `None` fields are left untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
}

impl EntityPatch {
    pub fn position(position: Point) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    pub fn rotation(rotation: f64) -> Self {
        Self {
            rotation: Some(rotation),
            ..Self::default()
        }
    }

    pub fn z_index(z_index: i64) -> Self {
        Self {
            z_index: Some(z_index),
            ..Self::default()
        }
    }

    pub fn bounds(position: Point, size: Size) -> Self {
        Self {
            position: Some(position),
            size: Some(size),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
