//! Adapters the engine consumes: the entity store and the viewport.

mod memory;

pub use memory::{MemoryStore, MemoryViewport};

use crate::entity::{CanvasEntity, EntityId, EntityPatch};
use kurbo::{Rect, Vec2};
use thiserror::Error;

/// Entity store errors.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoreError {
    #[error("Entity not found: {0}")]
    NotFound(EntityId),
    #[error("Update rejected for {id}: {reason}")]
    Rejected { id: EntityId, reason: String },
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Read/write access to the entities the engine manipulates.
///
/// All calls are synchronous from the engine's point of view. The engine is
/// the only writer during a gesture; if the implementation accepts writes
/// from elsewhere, last write wins.
pub trait EntityStore {
    /// Look up a single entity.
    fn entity(&self, id: EntityId) -> Option<CanvasEntity>;

    /// All entities, ordered by `z_index` ascending (back to front).
    fn entities(&self) -> Vec<CanvasEntity>;

    /// Apply a partial update.
    fn update_entity(&mut self, id: EntityId, patch: &EntityPatch) -> StoreResult<()>;

    /// Ask the owner to delete an entity.
    fn request_delete(&mut self, id: EntityId) -> StoreResult<()>;

    /// Ask the owner to duplicate an entity. Returns the id of the copy.
    fn request_duplicate(&mut self, id: EntityId) -> StoreResult<EntityId>;
}

/// The scrollable region the workspace is shown through.
pub trait Viewport {
    /// Container bounds in workspace coordinates. Entities are kept inside
    /// this rectangle when bounds enforcement is on.
    fn bounds(&self) -> Rect;

    /// The workspace region currently visible. Auto-scroll arms when the
    /// pointer nears its edges.
    fn visible_rect(&self) -> Rect;

    /// Scroll the visible region by a delta in workspace units.
    fn scroll_by(&mut self, delta: Vec2);
}
