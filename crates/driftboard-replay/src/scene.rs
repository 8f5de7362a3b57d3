//! Scene files: everything needed to reproduce a session.

use driftboard_core::{CanvasEntity, ConfigError, DropZone, EngineSettings, InputEvent};
use kurbo::Rect;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("Failed to read scene: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid scene JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Duplicate entity id {0}")]
    DuplicateEntity(Uuid),
}

/// A drop zone as written in a scene file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneSpec {
    /// Fixed id so reports are stable across runs. Random if absent.
    #[serde(default)]
    pub id: Option<Uuid>,
    pub rect: Rect,
    /// Only entities at most this wide are accepted.
    #[serde(default)]
    pub max_width: Option<f64>,
}

impl ZoneSpec {
    pub fn to_zone(&self) -> DropZone {
        let mut zone = DropZone::new(self.rect);
        if let Some(id) = self.id {
            zone.id = id;
        }
        match self.max_width {
            Some(max) => zone.with_accepts(move |entity| entity.size.width <= max),
            None => zone,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub settings: EngineSettings,
    /// Container bounds.
    pub bounds: Rect,
    /// Initially visible region. Defaults to the bounds.
    #[serde(default)]
    pub visible: Option<Rect>,
    pub entities: Vec<CanvasEntity>,
    #[serde(default)]
    pub drop_zones: Vec<ZoneSpec>,
    pub events: Vec<InputEvent>,
}

impl Scene {
    pub fn from_json(json: &str) -> Result<Self, SceneError> {
        let scene: Scene = serde_json::from_str(json)?;
        scene.validate()?;
        Ok(scene)
    }

    pub fn load(path: &Path) -> Result<Self, SceneError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    fn validate(&self) -> Result<(), SceneError> {
        self.settings.validate()?;
        let mut seen = std::collections::HashSet::new();
        for entity in &self.entities {
            if !seen.insert(entity.id) {
                return Err(SceneError::DuplicateEntity(entity.id));
            }
        }
        Ok(())
    }
}
