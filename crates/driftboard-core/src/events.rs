//! Engine events and the bus that delivers them to subscribers.
//!
//! Events fire after every committed change. Renderers and persistence layers
//! subscribe; callbacks run synchronously and must not call back into the
//! engine.

use crate::drop_zone::DropZoneId;
use crate::entity::{EntityGeometry, EntityId};
use crate::handles::ResizeHandle;
use crate::snap::SnapInfo;
use kurbo::Rect;
use serde::{Deserialize, Serialize};

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionOutcome {
    /// Pointer-up: the last applied state stays.
    Committed,
    /// Escape or capture loss: snapshot restored.
    Cancelled,
    /// The primary entity disappeared mid-gesture.
    Voided,
}

/// Something observable the engine did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    SelectionChanged {
        ids: Vec<EntityId>,
    },
    DragStart {
        primary: EntityId,
        entities: Vec<EntityGeometry>,
    },
    DragMove {
        primary: EntityId,
        entities: Vec<EntityGeometry>,
        snap: SnapInfo,
    },
    DragEnd {
        primary: EntityId,
        entities: Vec<EntityGeometry>,
        outcome: SessionOutcome,
    },
    ResizeStart {
        entity: EntityGeometry,
        handle: ResizeHandle,
    },
    ResizeMove {
        entity: EntityGeometry,
        handle: ResizeHandle,
    },
    ResizeEnd {
        entity: EntityGeometry,
        handle: ResizeHandle,
        outcome: SessionOutcome,
    },
    RotateStart {
        entity: EntityGeometry,
    },
    RotateMove {
        entity: EntityGeometry,
    },
    RotateEnd {
        entity: EntityGeometry,
        outcome: SessionOutcome,
    },
    MarqueeStart {
        rect: Rect,
    },
    MarqueeUpdate {
        rect: Rect,
        ids: Vec<EntityId>,
    },
    MarqueeEnd {
        rect: Rect,
        ids: Vec<EntityId>,
        outcome: SessionOutcome,
    },
    DropZoneEntered {
        zone: DropZoneId,
        entities: Vec<EntityId>,
    },
    DropZoneLeft {
        zone: DropZoneId,
        entities: Vec<EntityId>,
    },
    DropZoneDropped {
        zone: DropZoneId,
        entities: Vec<EntityGeometry>,
    },
}

impl EngineEvent {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            EngineEvent::SelectionChanged { .. } => "selection_changed",
            EngineEvent::DragStart { .. } => "drag_start",
            EngineEvent::DragMove { .. } => "drag_move",
            EngineEvent::DragEnd { .. } => "drag_end",
            EngineEvent::ResizeStart { .. } => "resize_start",
            EngineEvent::ResizeMove { .. } => "resize_move",
            EngineEvent::ResizeEnd { .. } => "resize_end",
            EngineEvent::RotateStart { .. } => "rotate_start",
            EngineEvent::RotateMove { .. } => "rotate_move",
            EngineEvent::RotateEnd { .. } => "rotate_end",
            EngineEvent::MarqueeStart { .. } => "marquee_start",
            EngineEvent::MarqueeUpdate { .. } => "marquee_update",
            EngineEvent::MarqueeEnd { .. } => "marquee_end",
            EngineEvent::DropZoneEntered { .. } => "drop_zone_entered",
            EngineEvent::DropZoneLeft { .. } => "drop_zone_left",
            EngineEvent::DropZoneDropped { .. } => "drop_zone_dropped",
        }
    }
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&EngineEvent)>;

/// Fan-out of engine events to subscribers.
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. It is called for every event, in emission order.
    pub fn subscribe(&mut self, listener: impl FnMut(&EngineEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sub, _)| *sub != id);
        self.listeners.len() != before
    }

    pub fn emit(&mut self, event: EngineEvent) {
        log::trace!("event: {}", event.name());
        for (_, listener) in &mut self.listeners {
            listener(&event);
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_subscribers_receive_events_in_order() {
        let mut bus = EventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        bus.subscribe(move |event| sink.borrow_mut().push(event.name()));

        bus.emit(EngineEvent::SelectionChanged { ids: vec![] });
        bus.emit(EngineEvent::MarqueeStart { rect: Rect::ZERO });

        assert_eq!(*seen.borrow(), vec!["selection_changed", "marquee_start"]);
    }

    #[test]
    fn test_unsubscribe() {
        let mut bus = EventBus::new();
        let count = Rc::new(RefCell::new(0));
        let counter = count.clone();
        let id = bus.subscribe(move |_| *counter.borrow_mut() += 1);

        bus.emit(EngineEvent::SelectionChanged { ids: vec![] });
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.emit(EngineEvent::SelectionChanged { ids: vec![] });

        assert_eq!(*count.borrow(), 1);
        assert_eq!(format!("{bus:?}"), "EventBus { listeners: 0 }");
    }

    #[test]
    fn test_event_serializes_with_tag() {
        let json = serde_json::to_string(&EngineEvent::SelectionChanged { ids: vec![] }).unwrap();
        assert_eq!(json, r#"{"type":"selection_changed","ids":[]}"#);
    }
}
