//! Pointer handling: gesture start, move, commit and cancel for every
//! session kind, plus auto-scroll ticks.

use super::{Hit, Interaction, InteractionEngine};
use crate::config::SettingsSource;
use crate::drop_zone::DropZoneRegistry;
use crate::entity::{EntityId, EntityPatch};
use crate::events::{EngineEvent, SessionOutcome};
use crate::handles::ResizeHandle;
use crate::input::PointerEvent;
use crate::session::{
    Constraints, DragSession, MarqueeSession, ResizeSession, RotateSession, Snapshot, auto_scroll_direction,
};
use crate::snap::candidate_snap_points;
use crate::store::{EntityStore, Viewport};
use kurbo::{Point, Rect, Vec2};
use std::time::Duration;

impl<S: EntityStore, V: Viewport, C: SettingsSource> InteractionEngine<S, V, C> {
    pub fn on_pointer_down(&mut self, event: &PointerEvent) {
        match self.interaction {
            Interaction::Idle => {}
            Interaction::ContextMenu { .. } => {
                log::debug!("outside click closes context menu");
                self.interaction = Interaction::Idle;
                return;
            }
            _ => {
                log::debug!("pointer down ignored in {:?}", self.mode());
                return;
            }
        }
        if !event.button.is_primary() {
            log::debug!("ignoring pointer down with {:?}", event.button);
            return;
        }

        // Fresh settings for this gesture. Stale ids are dropped quietly and
        // announced together with whatever this pointer-down selects.
        self.active = self.settings.settings();
        self.prune_selection_deferred();

        let settings = self.active.clone();
        let features = settings.features;
        match self.hit_test_with(event.position, &settings) {
            Hit::Handle { entity, handle } => {
                self.selection_changed_if(false);
                self.start_resize(entity, handle, event.position)
            }
            Hit::Entity(id) if features.rotate && event.modifiers.holds(settings.rotate_modifier) => {
                self.start_rotate(id)
            }
            Hit::Entity(id) => self.start_drag(id, event),
            Hit::Empty if features.marquee => self.start_marquee(event),
            Hit::Empty => {
                if !event.modifiers.multi_select() {
                    self.clear_selection();
                }
            }
        }
        self.selection_changed_if(false);
    }

    pub fn on_pointer_move(&mut self, event: &PointerEvent) {
        let next = match std::mem::take(&mut self.interaction) {
            Interaction::Dragging(mut drag) => {
                let visible = self.viewport.visible_rect();
                drag.set_scroll_direction(auto_scroll_direction(
                    event.position,
                    visible,
                    self.active.auto_scroll_margin,
                ));
                if drag.admit(event.time) {
                    self.apply_drag(drag, event.position)
                } else {
                    log::debug!("throttled drag sample at {:?}", event.time);
                    Interaction::Dragging(drag)
                }
            }
            Interaction::Resizing(resize) => self.apply_resize(resize, event),
            Interaction::Rotating(rotate) => self.apply_rotate(rotate, event.position),
            Interaction::Marquee(mut marquee) => {
                marquee.update(event.position);
                self.apply_marquee(&marquee);
                Interaction::Marquee(marquee)
            }
            other => other,
        };
        self.interaction = next;
    }

    pub fn on_pointer_up(&mut self, _event: &PointerEvent) {
        let next = match std::mem::take(&mut self.interaction) {
            Interaction::Dragging(drag) => self.commit_drag(drag),
            Interaction::Resizing(resize) => self.commit_resize(resize),
            Interaction::Rotating(rotate) => self.commit_rotate(rotate),
            Interaction::Marquee(marquee) => self.commit_marquee(marquee),
            Interaction::ContextMenu { position } => {
                // The release of the opening click must not close the menu
                Interaction::ContextMenu { position }
            }
            Interaction::Idle => {
                log::debug!("pointer up with no active gesture");
                Interaction::Idle
            }
        };
        self.interaction = next;
    }

    /// Pointer capture was lost: cancel whatever is in progress.
    pub fn on_pointer_cancel(&mut self) {
        self.cancel();
    }

    /// Advance time-based behaviour. While a drag holds the pointer near
    /// the visible edge, each tick scrolls the viewport.
    pub fn tick(&mut self, now: Duration) {
        let Interaction::Dragging(drag) = &self.interaction else {
            return;
        };
        let direction = drag.scroll_direction();
        if direction == Vec2::ZERO {
            return;
        }
        let delta = direction * self.active.auto_scroll_speed;
        log::trace!("auto-scroll by {delta:?} at {now:?}");
        self.viewport.scroll_by(delta);
    }

    /// Cancel the active gesture, restoring snapshots, or close the menu.
    /// Returns whether anything was cancelled.
    pub fn cancel(&mut self) -> bool {
        let next = match std::mem::take(&mut self.interaction) {
            Interaction::Dragging(drag) => self.cancel_drag(drag),
            Interaction::Resizing(resize) => self.cancel_resize(resize),
            Interaction::Rotating(rotate) => self.cancel_rotate(rotate),
            Interaction::Marquee(marquee) => self.cancel_marquee(marquee),
            Interaction::ContextMenu { .. } => Interaction::Idle,
            Interaction::Idle => return false,
        };
        self.interaction = next;
        true
    }

    // --- Drag ---

    fn start_drag(&mut self, id: EntityId, event: &PointerEvent) {
        let already_selected = self.selection.contains(id);
        let multi = event.modifiers.multi_select();
        let mut deferred_toggle = None;

        let changed = if !already_selected {
            if multi {
                self.selection.add(id)
            } else {
                self.selection.select_only(id)
            }
        } else {
            if multi {
                deferred_toggle = Some(id);
            }
            false
        };
        self.selection_changed_if(changed);

        if !self.active.features.drag {
            return;
        }
        let Some(primary) = self.store.entity(id) else {
            return;
        };

        let followers = self
            .selection
            .ids()
            .iter()
            .filter(|&&sel| sel != id)
            .filter_map(|&sel| self.store.entity(sel))
            .map(|entity| entity.geometry());
        let snapshot = Snapshot::new(primary.geometry(), followers);

        let candidates = if self.active.features.canvas_snap {
            let others: Vec<_> = self
                .store
                .entities()
                .into_iter()
                .filter(|entity| !snapshot.contains(entity.id))
                .collect();
            candidate_snap_points(id, &others)
        } else {
            Vec::new()
        };

        let drop_zones = match &self.drop_zones {
            Some(provider) => {
                let dragged = self.entities_by_id(&snapshot.ids());
                DropZoneRegistry::from_zones(provider.drop_zones(&dragged))
            }
            None => DropZoneRegistry::new(),
        };

        let constraints = Constraints::from_settings(&self.active, self.viewport.bounds());
        let entities = snapshot.entries().to_vec();
        let mut drag = DragSession::new(
            snapshot,
            event.position,
            constraints,
            candidates,
            self.active.move_throttle(),
        )
        .with_drop_zones(drop_zones);
        if let Some(toggle) = deferred_toggle {
            drag = drag.with_deferred_toggle(toggle);
        }

        log::debug!("drag start: {} with {} follower(s)", id, entities.len() - 1);
        self.emit(EngineEvent::DragStart { primary: id, entities });
        self.interaction = Interaction::Dragging(drag);
    }

    /// Write one drag sample to the store. Returns `Idle` if the primary
    /// has vanished and the session was voided.
    fn apply_drag(&mut self, mut drag: DragSession, pointer: Point) -> Interaction {
        let primary = drag.primary();
        if self.store.entity(primary).is_none() {
            return self.void_drag(drag);
        }

        let vanished: Vec<EntityId> = drag
            .snapshot()
            .followers()
            .iter()
            .map(|follower| follower.id)
            .filter(|&id| self.store.entity(id).is_none())
            .collect();
        if !vanished.is_empty() {
            for id in &vanished {
                log::debug!("follower {id} vanished, dropping it from the drag");
                drag.remove_follower(*id);
            }
            self.prune_selection();
        }

        if pointer != drag.pointer_start() {
            drag.mark_moved();
        }

        // Grid settings may change between moves
        let grid = self.settings.grid();
        let update = drag.compute(pointer, &grid);
        for geometry in &update.entities {
            if let Err(e) = self.store.update_entity(geometry.id, &EntityPatch::position(geometry.position)) {
                log::warn!("Failed to move entity {}: {}", geometry.id, e);
            }
        }
        self.emit(EngineEvent::DragMove {
            primary,
            entities: update.entities,
            snap: update.snap,
        });

        if !drag.drop_zones().is_empty() {
            let ids = drag.snapshot().ids();
            let dragged = self.entities_by_id(&ids);
            let change = drag.drop_zones_mut().update_hover(pointer, &dragged);
            if let Some(zone) = change.left {
                self.emit(EngineEvent::DropZoneLeft { zone, entities: ids.clone() });
            }
            if let Some(zone) = change.entered {
                self.emit(EngineEvent::DropZoneEntered { zone, entities: ids });
            }
        }

        Interaction::Dragging(drag)
    }

    /// Positions are already live from the last admitted move; commit only
    /// settles selection and drop-zone state.
    fn commit_drag(&mut self, mut drag: DragSession) -> Interaction {
        if self.store.entity(drag.primary()).is_none() {
            return self.void_drag(drag);
        }

        if let Some(id) = drag.deferred_toggle() {
            if !drag.has_moved() {
                let changed = self.selection.remove(id);
                self.selection_changed_if(changed);
            }
        }

        let entities = self.current_geometry(&drag.snapshot().ids());
        if let Some(zone) = drag.drop_zones_mut().take_hovered() {
            log::info!("dropped {} entit(ies) on zone {}", entities.len(), zone);
            self.emit(EngineEvent::DropZoneDropped {
                zone,
                entities: entities.clone(),
            });
        }
        log::info!("drag committed: {}", drag.primary());
        self.emit(EngineEvent::DragEnd {
            primary: drag.primary(),
            entities,
            outcome: SessionOutcome::Committed,
        });
        Interaction::Idle
    }

    fn cancel_drag(&mut self, drag: DragSession) -> Interaction {
        self.end_drag(drag, SessionOutcome::Cancelled)
    }

    pub(super) fn void_drag(&mut self, drag: DragSession) -> Interaction {
        log::warn!("drag primary {} vanished, voiding session", drag.primary());
        let next = self.end_drag(drag, SessionOutcome::Voided);
        self.prune_selection();
        next
    }

    /// Restore every surviving snapshot and close the session.
    fn end_drag(&mut self, mut drag: DragSession, outcome: SessionOutcome) -> Interaction {
        let restored = drag.snapshot().restore(&mut self.store);
        if let Some(zone) = drag.drop_zones_mut().take_hovered() {
            self.emit(EngineEvent::DropZoneLeft {
                zone,
                entities: drag.snapshot().ids(),
            });
        }
        log::info!("drag {:?}: {}", outcome, drag.primary());
        self.emit(EngineEvent::DragEnd {
            primary: drag.primary(),
            entities: restored,
            outcome,
        });
        Interaction::Idle
    }

    // --- Resize ---

    fn start_resize(&mut self, id: EntityId, handle: ResizeHandle, pointer: Point) {
        let Some(entity) = self.store.entity(id) else {
            return;
        };
        let constraints = Constraints::from_settings(&self.active, self.viewport.bounds());
        let snapshot = entity.geometry();
        log::debug!("resize start: {id} via {handle:?}");
        self.emit(EngineEvent::ResizeStart { entity: snapshot, handle });
        self.interaction = Interaction::Resizing(ResizeSession::new(snapshot, handle, pointer, constraints));
    }

    fn apply_resize(&mut self, resize: ResizeSession, event: &PointerEvent) -> Interaction {
        if self.store.entity(resize.entity()).is_none() {
            return self.void_resize(resize);
        }
        let geometry = resize.compute(event.position, event.modifiers.shift);
        if let Err(e) = self
            .store
            .update_entity(geometry.id, &EntityPatch::bounds(geometry.position, geometry.size))
        {
            log::warn!("Failed to resize entity {}: {}", geometry.id, e);
        }
        self.emit(EngineEvent::ResizeMove {
            entity: geometry,
            handle: resize.handle(),
        });
        Interaction::Resizing(resize)
    }

    fn commit_resize(&mut self, resize: ResizeSession) -> Interaction {
        let Some(entity) = self.store.entity(resize.entity()) else {
            return self.void_resize(resize);
        };
        log::info!("resize committed: {}", resize.entity());
        self.emit(EngineEvent::ResizeEnd {
            entity: entity.geometry(),
            handle: resize.handle(),
            outcome: SessionOutcome::Committed,
        });
        Interaction::Idle
    }

    fn cancel_resize(&mut self, resize: ResizeSession) -> Interaction {
        let snapshot = *resize.snapshot();
        if let Err(e) = self.store.update_entity(snapshot.id, &snapshot.restore_patch()) {
            log::warn!("Failed to restore entity {}: {}", snapshot.id, e);
        }
        log::info!("resize cancelled: {}", snapshot.id);
        self.emit(EngineEvent::ResizeEnd {
            entity: snapshot,
            handle: resize.handle(),
            outcome: SessionOutcome::Cancelled,
        });
        Interaction::Idle
    }

    pub(super) fn void_resize(&mut self, resize: ResizeSession) -> Interaction {
        log::warn!("resize target {} vanished, voiding session", resize.entity());
        self.emit(EngineEvent::ResizeEnd {
            entity: *resize.snapshot(),
            handle: resize.handle(),
            outcome: SessionOutcome::Voided,
        });
        self.prune_selection();
        Interaction::Idle
    }

    // --- Rotate ---

    fn start_rotate(&mut self, id: EntityId) {
        let Some(entity) = self.store.entity(id) else {
            return;
        };
        let changed = !self.selection.contains(id) && self.selection.select_only(id);
        self.selection_changed_if(changed);
        let snapshot = entity.geometry();
        log::debug!("rotate start: {id}");
        self.emit(EngineEvent::RotateStart { entity: snapshot });
        self.interaction = Interaction::Rotating(RotateSession::new(snapshot, self.active.rotation_snap_deg));
    }

    fn apply_rotate(&mut self, rotate: RotateSession, pointer: Point) -> Interaction {
        let Some(entity) = self.store.entity(rotate.entity()) else {
            return self.void_rotate(rotate);
        };
        let rotation = rotate.compute(pointer);
        if let Err(e) = self.store.update_entity(entity.id, &EntityPatch::rotation(rotation)) {
            log::warn!("Failed to rotate entity {}: {}", entity.id, e);
        }
        let mut geometry = entity.geometry();
        geometry.rotation = rotation;
        self.emit(EngineEvent::RotateMove { entity: geometry });
        Interaction::Rotating(rotate)
    }

    fn commit_rotate(&mut self, rotate: RotateSession) -> Interaction {
        let Some(entity) = self.store.entity(rotate.entity()) else {
            return self.void_rotate(rotate);
        };
        log::info!("rotate committed: {} at {:.1}°", entity.id, entity.rotation);
        self.emit(EngineEvent::RotateEnd {
            entity: entity.geometry(),
            outcome: SessionOutcome::Committed,
        });
        Interaction::Idle
    }

    fn cancel_rotate(&mut self, rotate: RotateSession) -> Interaction {
        let snapshot = *rotate.snapshot();
        if let Err(e) = self.store.update_entity(snapshot.id, &EntityPatch::rotation(snapshot.rotation)) {
            log::warn!("Failed to restore entity {}: {}", snapshot.id, e);
        }
        log::info!("rotate cancelled: {}", snapshot.id);
        self.emit(EngineEvent::RotateEnd {
            entity: snapshot,
            outcome: SessionOutcome::Cancelled,
        });
        Interaction::Idle
    }

    pub(super) fn void_rotate(&mut self, rotate: RotateSession) -> Interaction {
        log::warn!("rotate target {} vanished, voiding session", rotate.entity());
        self.emit(EngineEvent::RotateEnd {
            entity: *rotate.snapshot(),
            outcome: SessionOutcome::Voided,
        });
        self.prune_selection();
        Interaction::Idle
    }

    // --- Marquee ---

    fn start_marquee(&mut self, event: &PointerEvent) {
        let restore = self.selection.ids().to_vec();
        let multi = event.modifiers.multi_select();
        let changed = !multi && self.selection.clear();
        self.selection_changed_if(changed);
        let base = if multi { restore.clone() } else { Vec::new() };
        log::debug!("marquee start at {:?}", event.position);
        self.emit(EngineEvent::MarqueeStart {
            rect: Rect::from_points(event.position, event.position),
        });
        self.interaction = Interaction::Marquee(MarqueeSession::new(event.position, base, restore));
    }

    fn apply_marquee(&mut self, marquee: &MarqueeSession) {
        let ids = marquee.selection(&self.store.entities());
        let changed = self.selection.set(ids.clone());
        self.selection_changed_if(changed);
        self.emit(EngineEvent::MarqueeUpdate {
            rect: marquee.rect(),
            ids,
        });
    }

    fn commit_marquee(&mut self, marquee: MarqueeSession) -> Interaction {
        let ids = self.selection.ids().to_vec();
        log::info!("marquee committed with {} entit(ies)", ids.len());
        self.emit(EngineEvent::MarqueeEnd {
            rect: marquee.rect(),
            ids,
            outcome: SessionOutcome::Committed,
        });
        Interaction::Idle
    }

    fn cancel_marquee(&mut self, marquee: MarqueeSession) -> Interaction {
        let store = &self.store;
        let restore: Vec<EntityId> = marquee
            .restore()
            .iter()
            .copied()
            .filter(|&id| store.entity(id).is_some())
            .collect();
        let changed = self.selection.set(restore);
        self.selection_changed_if(changed);
        log::info!("marquee cancelled");
        self.emit(EngineEvent::MarqueeEnd {
            rect: marquee.rect(),
            ids: self.selection.ids().to_vec(),
            outcome: SessionOutcome::Cancelled,
        });
        Interaction::Idle
    }
}
