//! Per-gesture state: snapshots, constraints and the four session kinds.
//!
//! A session is created on pointer-down, fed pointer moves, and dropped on
//! pointer-up or cancel. Sessions compute geometry; the engine writes it.

mod drag;
mod marquee;
mod resize;
mod rotate;

pub use drag::{DragSession, DragUpdate, auto_scroll_direction, clamp_group_delta};
pub use marquee::MarqueeSession;
pub use resize::{ResizeSession, compute_resize};
pub use rotate::RotateSession;

use crate::config::EngineSettings;
use crate::entity::{EntityGeometry, EntityId};
use crate::geometry::clamp_to_bounds;
use crate::store::EntityStore;
use kurbo::{Point, Rect, Size};
use std::time::Duration;

/// Limits copied from the settings and viewport at session start.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraints {
    /// Container bounds, when enforced.
    pub bounds: Option<Rect>,
    pub min_size: Size,
    pub max_size: Option<Size>,
    pub size_presets: Vec<Size>,
    pub size_preset_threshold: f64,
}

impl Constraints {
    pub fn from_settings(settings: &EngineSettings, bounds: Rect) -> Self {
        Self {
            bounds: settings.enforce_bounds.then(|| bounds.abs()),
            min_size: settings.min_size,
            max_size: settings.max_size,
            size_presets: settings.size_presets.clone(),
            size_preset_threshold: settings.size_preset_threshold,
        }
    }

    /// Keep a rectangle of `size` at `position` inside the bounds, if any.
    pub fn clamp_position(&self, position: Point, size: Size) -> Point {
        match self.bounds {
            Some(bounds) => clamp_to_bounds(position, size, bounds),
            None => position,
        }
    }
}

impl Default for Constraints {
    fn default() -> Self {
        Self {
            bounds: None,
            min_size: Size::ZERO,
            max_size: None,
            size_presets: Vec::new(),
            size_preset_threshold: 0.0,
        }
    }
}

/// Pre-gesture geometry of every entity a session touches. The primary
/// entity comes first.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    entries: Vec<EntityGeometry>,
}

impl Snapshot {
    pub fn new(primary: EntityGeometry, followers: impl IntoIterator<Item = EntityGeometry>) -> Self {
        let mut entries = vec![primary];
        for follower in followers {
            if !entries.iter().any(|entry| entry.id == follower.id) {
                entries.push(follower);
            }
        }
        Self { entries }
    }

    pub fn primary(&self) -> &EntityGeometry {
        &self.entries[0]
    }

    pub fn get(&self, id: EntityId) -> Option<&EntityGeometry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn entries(&self) -> &[EntityGeometry] {
        &self.entries
    }

    pub fn followers(&self) -> &[EntityGeometry] {
        &self.entries[1..]
    }

    pub fn ids(&self) -> Vec<EntityId> {
        self.entries.iter().map(|entry| entry.id).collect()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    /// Drop a follower. The primary cannot be removed.
    pub fn remove_follower(&mut self, id: EntityId) -> bool {
        match self.entries.iter().skip(1).position(|entry| entry.id == id) {
            Some(index) => {
                self.entries.remove(index + 1);
                true
            }
            None => false,
        }
    }

    /// Write every snapshot back to the store, skipping entities that no
    /// longer exist. Returns the geometries that were restored.
    pub fn restore<S: EntityStore>(&self, store: &mut S) -> Vec<EntityGeometry> {
        let mut restored = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            if store.entity(entry.id).is_none() {
                log::debug!("skipping restore of missing entity {}", entry.id);
                continue;
            }
            if let Err(e) = store.update_entity(entry.id, &entry.restore_patch()) {
                log::warn!("Failed to restore entity {}: {}", entry.id, e);
            }
            restored.push(*entry);
        }
        restored
    }
}

/// Admits at most one sample per interval. Samples in between are dropped,
/// not queued.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveThrottle {
    interval: Duration,
    last_admitted: Option<Duration>,
}

impl MoveThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_admitted: None,
        }
    }

    /// Whether a sample at `now` should be processed. The first sample
    /// always is.
    pub fn admit(&mut self, now: Duration) -> bool {
        let admitted = self
            .last_admitted
            .is_none_or(|last| now.saturating_sub(last) >= self.interval);
        if admitted {
            self.last_admitted = Some(now);
        }
        admitted
    }
}
