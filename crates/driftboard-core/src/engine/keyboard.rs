//! Keyboard shortcuts and context menu actions.

use super::{Hit, Interaction, InteractionEngine};
use crate::config::SettingsSource;
use crate::entity::{EntityId, EntityPatch};
use crate::events::{EngineEvent, SessionOutcome};
use crate::handles::ResizeHandle;
use crate::input::{Key, KeyEvent, PointerEvent};
use crate::session::{Constraints, clamp_group_delta, compute_resize};
use crate::store::{EntityStore, Viewport};
use kurbo::Vec2;
use serde::{Deserialize, Serialize};

/// Items offered by the context menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextMenuAction {
    Duplicate,
    Delete,
    BringToFront,
    SendToBack,
    SelectAll,
    ResetRotation,
}

impl<S: EntityStore, V: Viewport, C: SettingsSource> InteractionEngine<S, V, C> {
    pub fn on_key_down(&mut self, event: &KeyEvent) {
        if event.key == Key::Escape {
            self.escape();
            return;
        }
        if !matches!(self.interaction, Interaction::Idle) {
            log::debug!("key {:?} ignored in {:?}", event.key, self.mode());
            return;
        }

        self.active = self.settings.settings();
        let modifiers = event.modifiers;

        if let Some((dx, dy)) = event.key.arrow_direction() {
            let direction = Vec2::new(dx, dy);
            if modifiers.holds(self.active.resize_modifier) {
                if self.active.features.resize {
                    self.keyboard_resize(direction);
                }
            } else if self.active.features.drag {
                let step = if modifiers.shift {
                    self.active.nudge_step_large
                } else {
                    self.active.nudge_step
                };
                self.nudge_selection(direction * step);
            }
            return;
        }

        match &event.key {
            Key::Delete | Key::Backspace => self.delete_selection(),
            key if modifiers.command() && key.is_char('a') => self.select_all(),
            key if modifiers.command() && key.is_char('d') => self.duplicate_selection(),
            key => log::trace!("unbound key {key:?}"),
        }
    }

    /// Escape cancels the active gesture, closes the menu, or clears the
    /// selection when idle.
    fn escape(&mut self) {
        if !self.cancel() {
            self.clear_selection();
        }
    }

    pub fn on_context_menu(&mut self, event: &PointerEvent) {
        if !matches!(self.interaction, Interaction::Idle) {
            log::debug!("context menu ignored in {:?}", self.mode());
            return;
        }
        self.active = self.settings.settings();
        if !self.active.features.context_menu {
            return;
        }

        let settings = self.active.clone();
        let target = match self.hit_test_with(event.position, &settings) {
            Hit::Handle { entity, .. } | Hit::Entity(entity) => Some(entity),
            Hit::Empty => None,
        };
        if let Some(id) = target {
            if !self.selection.contains(id) {
                let changed = self.selection.select_only(id);
                self.selection_changed_if(changed);
            }
        }
        log::debug!("context menu opened at {:?}", event.position);
        self.interaction = Interaction::ContextMenu {
            position: event.position,
        };
    }

    /// Run a context menu item and close the menu.
    pub fn select_menu_item(&mut self, action: ContextMenuAction) {
        if !matches!(self.interaction, Interaction::ContextMenu { .. }) {
            log::debug!("menu item {action:?} ignored, menu not open");
            return;
        }
        self.interaction = Interaction::Idle;
        log::debug!("context menu action {action:?}");

        match action {
            ContextMenuAction::Duplicate => self.duplicate_selection(),
            ContextMenuAction::Delete => self.delete_selection(),
            ContextMenuAction::BringToFront => self.bring_to_front(),
            ContextMenuAction::SendToBack => self.send_to_back(),
            ContextMenuAction::SelectAll => self.select_all(),
            ContextMenuAction::ResetRotation => self.reset_rotation(),
        }
    }

    /// Move the selection by `delta` as a rigid group, kept inside the
    /// bounds.
    pub fn nudge_selection(&mut self, delta: Vec2) {
        self.prune_selection();
        let ids = self.selection.ids().to_vec();
        let Some(&primary) = ids.last() else {
            return;
        };
        let before = self.current_geometry(&ids);
        let constraints = Constraints::from_settings(&self.active, self.viewport.bounds());
        let delta = match constraints.bounds {
            Some(bounds) => clamp_group_delta(delta, &before, bounds),
            None => delta,
        };
        if delta == Vec2::ZERO {
            return;
        }

        for geometry in &before {
            let position = geometry.position + delta;
            if let Err(e) = self.store.update_entity(geometry.id, &EntityPatch::position(position)) {
                log::warn!("Failed to nudge entity {}: {}", geometry.id, e);
            }
        }
        let entities = self.current_geometry(&ids);
        self.emit(EngineEvent::DragEnd {
            primary,
            entities,
            outcome: SessionOutcome::Committed,
        });
    }

    /// Grow or shrink the primary by a fixed step, top-left corner fixed.
    fn keyboard_resize(&mut self, direction: Vec2) {
        self.prune_selection();
        let Some(primary) = self.selection.primary() else {
            return;
        };
        let Some(entity) = self.store.entity(primary) else {
            return;
        };
        let mut constraints = Constraints::from_settings(&self.active, self.viewport.bounds());
        // Presets would swallow small steps
        constraints.size_presets.clear();

        let handle = ResizeHandle::SE;
        let snapshot = entity.geometry();
        let delta = direction * self.active.keyboard_resize_step;
        let geometry = compute_resize(&snapshot, handle, delta, &constraints, false);
        if geometry == snapshot {
            return;
        }
        if let Err(e) = self
            .store
            .update_entity(primary, &EntityPatch::bounds(geometry.position, geometry.size))
        {
            log::warn!("Failed to resize entity {}: {}", primary, e);
        }
        self.emit(EngineEvent::ResizeEnd {
            entity: geometry,
            handle,
            outcome: SessionOutcome::Committed,
        });
    }

    /// Ask the store to delete every selected entity.
    pub fn delete_selection(&mut self) {
        let ids = self.selection.ids().to_vec();
        for id in ids {
            if let Err(e) = self.store.request_delete(id) {
                log::warn!("Failed to delete entity {}: {}", id, e);
            }
        }
        self.prune_selection();
    }

    /// Ask the store to duplicate every selected entity, then select the
    /// copies.
    pub fn duplicate_selection(&mut self) {
        let ids = self.selection.ids().to_vec();
        if ids.is_empty() {
            return;
        }
        let mut copies: Vec<EntityId> = Vec::with_capacity(ids.len());
        for id in ids {
            match self.store.request_duplicate(id) {
                Ok(copy) => copies.push(copy),
                Err(e) => log::warn!("Failed to duplicate entity {}: {}", id, e),
            }
        }
        if copies.is_empty() {
            return;
        }
        let changed = self.selection.set(copies);
        self.selection_changed_if(changed);
    }

    /// Put the selection above everything else, keeping its relative order.
    pub fn bring_to_front(&mut self) {
        let entities = self.store.entities();
        let Some(top) = entities.iter().map(|entity| entity.z_index).max() else {
            return;
        };
        let mut z = top;
        for entity in entities.iter().filter(|entity| self.selection.contains(entity.id)) {
            z += 1;
            if let Err(e) = self.store.update_entity(entity.id, &EntityPatch::z_index(z)) {
                log::warn!("Failed to reorder entity {}: {}", entity.id, e);
            }
        }
    }

    /// Put the selection below everything else, keeping its relative order.
    pub fn send_to_back(&mut self) {
        let entities = self.store.entities();
        let Some(bottom) = entities.iter().map(|entity| entity.z_index).min() else {
            return;
        };
        let selected: Vec<EntityId> = entities
            .iter()
            .filter(|entity| self.selection.contains(entity.id))
            .map(|entity| entity.id)
            .collect();
        let mut z = bottom - selected.len() as i64;
        for id in selected {
            if let Err(e) = self.store.update_entity(id, &EntityPatch::z_index(z)) {
                log::warn!("Failed to reorder entity {}: {}", id, e);
            }
            z += 1;
        }
    }

    /// Set rotation back to 0° for every selected entity.
    pub fn reset_rotation(&mut self) {
        let ids = self.selection.ids().to_vec();
        for entity in self.entities_by_id(&ids) {
            if entity.rotation == 0.0 {
                continue;
            }
            if let Err(e) = self.store.update_entity(entity.id, &EntityPatch::rotation(0.0)) {
                log::warn!("Failed to reset rotation of {}: {}", entity.id, e);
                continue;
            }
            let mut geometry = entity.geometry();
            geometry.rotation = 0.0;
            self.emit(EngineEvent::RotateEnd {
                entity: geometry,
                outcome: SessionOutcome::Committed,
            });
        }
    }
}
