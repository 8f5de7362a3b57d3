//! Driftboard Core Library
//!
//! Interaction engine for a free-form workspace of positioned, resizable,
//! rotatable panels. It turns pointer and keyboard input into drag, resize,
//! rotate and selection changes, snapping to a grid or to other panels, and
//! writes the results to a host-owned entity store.

pub mod config;
pub mod drop_zone;
pub mod engine;
pub mod entity;
pub mod events;
pub mod geometry;
pub mod handles;
pub mod input;
pub mod selection;
pub mod session;
pub mod snap;
pub mod store;

pub use config::{ConfigError, EngineSettings, FeatureToggles, GridConfig, SettingsSource, SharedSettings};
pub use drop_zone::{DropZone, DropZoneId, DropZoneProvider};
pub use engine::{ContextMenuAction, Hit, InteractionEngine, Mode};
pub use entity::{CanvasEntity, EntityGeometry, EntityId, EntityPatch};
pub use events::{EngineEvent, EventBus, SessionOutcome, SubscriptionId};
pub use handles::ResizeHandle;
pub use input::{InputEvent, Key, KeyEvent, ModifierKey, Modifiers, MouseButton, PointerEvent};
pub use selection::SelectionManager;
pub use snap::{SnapInfo, SnapKind, SnapPointKind, resolve_snapped_position, snap_to_grid};
pub use store::{EntityStore, MemoryStore, MemoryViewport, StoreError, StoreResult, Viewport};
