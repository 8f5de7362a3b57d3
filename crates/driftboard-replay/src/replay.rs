//! Feeds a scene's trace through the engine.

use crate::scene::{Scene, ZoneSpec};
use driftboard_core::{
    CanvasEntity, DropZone, EngineEvent, EntityId, EntityStore, InteractionEngine, MemoryStore, MemoryViewport,
};
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;

/// Outcome of a replay.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Entities after the last event, back to front.
    pub entities: Vec<CanvasEntity>,
    pub selection: Vec<EntityId>,
    /// Engine mode after the last event.
    pub mode: String,
    pub events: Vec<EngineEvent>,
}

/// Run every event of `scene` and collect the result.
pub fn replay(scene: &Scene) -> Report {
    let store = MemoryStore::with_entities(scene.entities.iter().cloned());
    let viewport = MemoryViewport::new(scene.bounds, scene.visible.unwrap_or(scene.bounds));
    let zones: Vec<DropZone> = scene.drop_zones.iter().map(ZoneSpec::to_zone).collect();

    let mut engine = InteractionEngine::new(store, viewport, scene.settings.clone());
    if !zones.is_empty() {
        engine = engine.with_drop_zones(zones);
    }

    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = log.clone();
    engine.subscribe(move |event| sink.borrow_mut().push(event.clone()));

    for (i, event) in scene.events.iter().enumerate() {
        log::debug!("event {i}: {event:?}");
        engine.handle(event);
    }
    log::info!(
        "replayed {} input event(s), {} engine event(s)",
        scene.events.len(),
        log.borrow().len()
    );

    let events = log.borrow().clone();
    Report {
        entities: engine.store().entities(),
        selection: engine.selected_ids().to_vec(),
        mode: format!("{:?}", engine.mode()),
        events,
    }
}
