//! Driftboard Replay
//!
//! Loads a scene (settings, container, entities, drop zones) and a recorded
//! input trace from JSON, feeds the trace through the interaction engine,
//! and reports the resulting entities and emitted events.

mod replay;
mod scene;

pub use replay::{Report, replay};
pub use scene::{Scene, SceneError, ZoneSpec};
