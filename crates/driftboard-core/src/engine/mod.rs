//! The interaction engine: a mode state machine routing input to the
//! selection manager and the active session, and committing the results to
//! the entity store.

mod keyboard;
mod pointer;

pub use keyboard::ContextMenuAction;

use crate::config::{EngineSettings, SettingsSource};
use crate::drop_zone::DropZoneProvider;
use crate::entity::{CanvasEntity, EntityGeometry, EntityId};
use crate::events::{EngineEvent, EventBus, SubscriptionId};
use crate::geometry::entity_contains_point;
use crate::handles::{ResizeHandle, hit_test_handles};
use crate::input::InputEvent;
use crate::selection::SelectionManager;
use crate::session::{DragSession, MarqueeSession, ResizeSession, RotateSession};
use crate::store::{EntityStore, Viewport};
use kurbo::Point;

/// What the engine is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Idle,
    Dragging,
    Resizing,
    Rotating,
    MarqueeSelecting,
    ContextMenuOpen,
}

/// What lies under a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    /// A resize handle of a selected entity.
    Handle { entity: EntityId, handle: ResizeHandle },
    /// The body of the topmost visible entity.
    Entity(EntityId),
    Empty,
}

/// Mode plus the state only that mode carries. Holding one value makes
/// overlapping sessions unrepresentable.
#[derive(Debug, Default)]
enum Interaction {
    #[default]
    Idle,
    Dragging(DragSession),
    Resizing(ResizeSession),
    Rotating(RotateSession),
    Marquee(MarqueeSession),
    ContextMenu { position: Point },
}

impl Interaction {
    fn mode(&self) -> Mode {
        match self {
            Interaction::Idle => Mode::Idle,
            Interaction::Dragging(_) => Mode::Dragging,
            Interaction::Resizing(_) => Mode::Resizing,
            Interaction::Rotating(_) => Mode::Rotating,
            Interaction::Marquee(_) => Mode::MarqueeSelecting,
            Interaction::ContextMenu { .. } => Mode::ContextMenuOpen,
        }
    }
}

/// Turns pointer and keyboard input into entity mutations.
///
/// The engine owns no entities. It reads and writes them through `S`,
/// reads container bounds and scrolls through `V`, and takes its settings
/// from `C`. Observers subscribe to [`EngineEvent`]s.
pub struct InteractionEngine<S, V, C> {
    store: S,
    viewport: V,
    settings: C,
    /// Settings snapshot taken at the start of the current gesture.
    active: EngineSettings,
    selection: SelectionManager,
    events: EventBus,
    interaction: Interaction,
    drop_zones: Option<Box<dyn DropZoneProvider>>,
    /// Selection changed without an event yet; folded into the next one.
    selection_dirty: bool,
}

impl<S: EntityStore, V: Viewport, C: SettingsSource> InteractionEngine<S, V, C> {
    pub fn new(store: S, viewport: V, settings: C) -> Self {
        let active = settings.settings();
        Self {
            store,
            viewport,
            settings,
            active,
            selection: SelectionManager::new(),
            events: EventBus::new(),
            interaction: Interaction::Idle,
            drop_zones: None,
            selection_dirty: false,
        }
    }

    /// Supply drop zones to drag sessions.
    pub fn with_drop_zones(mut self, provider: impl DropZoneProvider + 'static) -> Self {
        self.drop_zones = Some(Box::new(provider));
        self
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&EngineEvent) + 'static) -> SubscriptionId {
        self.events.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    pub fn mode(&self) -> Mode {
        self.interaction.mode()
    }

    pub fn selection(&self) -> &SelectionManager {
        &self.selection
    }

    pub fn selected_ids(&self) -> &[EntityId] {
        self.selection.ids()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Mutable store access for hosts. Call [`on_entity_removed`](Self::on_entity_removed)
    /// after deleting entities behind the engine's back.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn viewport(&self) -> &V {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut V {
        &mut self.viewport
    }

    pub fn settings(&self) -> &C {
        &self.settings
    }

    /// Where the context menu was opened, while it is open.
    pub fn context_menu_position(&self) -> Option<Point> {
        match self.interaction {
            Interaction::ContextMenu { position } => Some(position),
            _ => None,
        }
    }

    /// Feed one recorded input event.
    pub fn handle(&mut self, event: &InputEvent) {
        match event {
            InputEvent::PointerDown(pointer) => self.on_pointer_down(pointer),
            InputEvent::PointerMove(pointer) => self.on_pointer_move(pointer),
            InputEvent::PointerUp(pointer) => self.on_pointer_up(pointer),
            InputEvent::PointerCancel => self.on_pointer_cancel(),
            InputEvent::KeyDown(key) => self.on_key_down(key),
            InputEvent::ContextMenu(pointer) => self.on_context_menu(pointer),
            InputEvent::Tick { time } => self.tick(*time),
        }
    }

    /// Resolve what lies under `point` with the current settings.
    pub fn hit_test(&self, point: Point) -> Hit {
        let settings = self.settings.settings();
        self.hit_test_with(point, &settings)
    }

    fn hit_test_with(&self, point: Point, settings: &EngineSettings) -> Hit {
        let entities = self.store.entities();

        if settings.features.resize {
            // Most recently selected first
            for &id in self.selection.ids().iter().rev() {
                let Some(entity) = entities.iter().find(|entity| entity.id == id && entity.visible) else {
                    continue;
                };
                if let Some(handle) = hit_test_handles(entity, point, settings.handle_hit_tolerance) {
                    return Hit::Handle { entity: id, handle };
                }
            }
        }

        entities
            .iter()
            .rev()
            .find(|entity| entity.visible && entity_contains_point(entity, point))
            .map_or(Hit::Empty, |entity| Hit::Entity(entity.id))
    }

    // --- Selection API ---

    pub fn select_only(&mut self, id: EntityId) {
        if self.store.entity(id).is_none() {
            log::debug!("select_only: unknown entity {id}");
            return;
        }
        let changed = self.selection.select_only(id);
        self.selection_changed_if(changed);
    }

    pub fn toggle_selection(&mut self, id: EntityId) {
        if !self.selection.contains(id) && self.store.entity(id).is_none() {
            log::debug!("toggle: unknown entity {id}");
            return;
        }
        let changed = self.selection.toggle(id);
        self.selection_changed_if(changed);
    }

    /// Range-select to `target` in back-to-front order of visible entities.
    pub fn select_range(&mut self, target: EntityId) {
        let ordered = self.visible_ids();
        let changed = self.selection.select_range(target, &ordered);
        self.selection_changed_if(changed);
    }

    /// Select every visible entity.
    pub fn select_all(&mut self) {
        let ordered = self.visible_ids();
        let changed = self.selection.select_all(&ordered);
        self.selection_changed_if(changed);
    }

    pub fn clear_selection(&mut self) {
        let changed = self.selection.clear();
        self.selection_changed_if(changed);
    }

    /// Tell the engine an entity is gone. Prunes it from the selection and
    /// from the active session, voiding the session if it was the primary.
    pub fn on_entity_removed(&mut self, id: EntityId) {
        let next = match std::mem::take(&mut self.interaction) {
            Interaction::Dragging(mut drag) => {
                if drag.primary() == id {
                    self.void_drag(drag)
                } else {
                    drag.remove_follower(id);
                    Interaction::Dragging(drag)
                }
            }
            Interaction::Resizing(resize) if resize.entity() == id => self.void_resize(resize),
            Interaction::Rotating(rotate) if rotate.entity() == id => self.void_rotate(rotate),
            other => other,
        };
        self.interaction = next;

        let changed = self.selection.remove(id);
        self.selection_changed_if(changed);
    }

    // --- Internal helpers ---

    fn visible_ids(&self) -> Vec<EntityId> {
        self.store
            .entities()
            .into_iter()
            .filter(|entity| entity.visible)
            .map(|entity| entity.id)
            .collect()
    }

    fn emit(&mut self, event: EngineEvent) {
        self.events.emit(event);
    }

    fn selection_changed_if(&mut self, changed: bool) {
        let dirty = std::mem::take(&mut self.selection_dirty);
        if changed || dirty {
            let ids = self.selection.ids().to_vec();
            self.emit(EngineEvent::SelectionChanged { ids });
        }
    }

    /// Drop selected ids whose entities no longer exist.
    fn prune_selection(&mut self) {
        let store = &self.store;
        let changed = self.selection.prune(|id| store.entity(id).is_some());
        self.selection_changed_if(changed);
    }

    /// Like [`prune_selection`](Self::prune_selection), but leaves the event
    /// to the next selection change.
    fn prune_selection_deferred(&mut self) {
        let store = &self.store;
        let changed = self.selection.prune(|id| store.entity(id).is_some());
        self.selection_dirty |= changed;
    }

    /// Current geometry of the given entities, skipping missing ones.
    fn current_geometry(&self, ids: &[EntityId]) -> Vec<EntityGeometry> {
        ids.iter()
            .filter_map(|&id| self.store.entity(id))
            .map(|entity| entity.geometry())
            .collect()
    }

    fn entities_by_id(&self, ids: &[EntityId]) -> Vec<CanvasEntity> {
        ids.iter().filter_map(|&id| self.store.entity(id)).collect()
    }
}

impl<S, V, C> std::fmt::Debug for InteractionEngine<S, V, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteractionEngine")
            .field("mode", &self.interaction.mode())
            .field("selection", &self.selection)
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}
