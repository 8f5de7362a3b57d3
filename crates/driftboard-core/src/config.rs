//! Engine settings and the source they are read from.
//!
//! Settings are injected at construction through a [`SettingsSource`]. The
//! engine takes a fresh snapshot at the start of each gesture and re-reads
//! the [`GridConfig`] on every pointer move, so live edits from a settings
//! panel apply immediately.

use crate::input::ModifierKey;
use kurbo::Size;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;
use thiserror::Error;

/// Grid size for snapping (matches the visual grid).
pub const DEFAULT_GRID_SIZE: f64 = 20.0;
/// Distance threshold for grid and canvas snapping (in workspace units).
pub const DEFAULT_SNAP_THRESHOLD: f64 = 10.0;
/// Angle snap increment in degrees.
pub const DEFAULT_ANGLE_SNAP_INCREMENT: f64 = 15.0;
/// One commit per frame at 60 Hz.
pub const DEFAULT_MOVE_THROTTLE_MS: u64 = 16;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid settings JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Grid snapping configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Cell size, must be positive.
    pub cell_size: f64,
    pub enabled: bool,
    /// Maximum distance at which a snap fires, must be non-negative.
    pub snap_threshold_px: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_GRID_SIZE,
            enabled: true,
            snap_threshold_px: DEFAULT_SNAP_THRESHOLD,
        }
    }
}

/// Per-gesture feature switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureToggles {
    pub drag: bool,
    pub resize: bool,
    pub rotate: bool,
    pub marquee: bool,
    pub context_menu: bool,
    /// Snap to other entities' edges and centers.
    pub canvas_snap: bool,
}

impl Default for FeatureToggles {
    fn default() -> Self {
        Self {
            drag: true,
            resize: true,
            rotate: true,
            marquee: true,
            context_menu: true,
            canvas_snap: true,
        }
    }
}

/// Everything the engine reads from the outside world besides entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub grid: GridConfig,
    pub features: FeatureToggles,
    /// Smallest allowed entity size.
    pub min_size: Size,
    /// Largest allowed entity size, if any. Container bounds tighten it
    /// further when bounds are enforced.
    pub max_size: Option<Size>,
    /// Keep entities inside the viewport's container bounds.
    pub enforce_bounds: bool,
    /// Sizes a resize snaps to when close enough.
    pub size_presets: Vec<Size>,
    /// Size-space distance within which a preset snap fires.
    pub size_preset_threshold: f64,
    /// Rotation snap increment in degrees. `0` disables angle snapping.
    pub rotation_snap_deg: f64,
    /// Hit radius around resize handles.
    pub handle_hit_tolerance: f64,
    /// Distance from the visible edge at which auto-scroll arms.
    pub auto_scroll_margin: f64,
    /// Scroll distance per auto-scroll tick.
    pub auto_scroll_speed: f64,
    /// Minimum interval between drag commits.
    pub move_throttle_ms: u64,
    pub nudge_step: f64,
    /// Nudge step with Shift held.
    pub nudge_step_large: f64,
    pub keyboard_resize_step: f64,
    /// Held with pointer-down on an entity to rotate instead of drag.
    pub rotate_modifier: ModifierKey,
    /// Held with arrow keys to resize instead of nudge.
    pub resize_modifier: ModifierKey,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            features: FeatureToggles::default(),
            min_size: Size::new(40.0, 40.0),
            max_size: None,
            enforce_bounds: true,
            size_presets: Vec::new(),
            size_preset_threshold: 12.0,
            rotation_snap_deg: DEFAULT_ANGLE_SNAP_INCREMENT,
            handle_hit_tolerance: 8.0,
            auto_scroll_margin: 40.0,
            auto_scroll_speed: 12.0,
            move_throttle_ms: DEFAULT_MOVE_THROTTLE_MS,
            nudge_step: 1.0,
            nudge_step_large: 10.0,
            keyboard_resize_step: 10.0,
            rotate_modifier: ModifierKey::Alt,
            resize_modifier: ModifierKey::Ctrl,
        }
    }
}

impl EngineSettings {
    /// Parse and validate settings from JSON. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check the value ranges the engine relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.grid.cell_size > 0.0) {
            return Err(ConfigError::Invalid {
                field: "grid.cell_size",
                reason: format!("must be positive, got {}", self.grid.cell_size),
            });
        }
        if !(self.grid.snap_threshold_px >= 0.0) {
            return Err(ConfigError::Invalid {
                field: "grid.snap_threshold_px",
                reason: format!("must be non-negative, got {}", self.grid.snap_threshold_px),
            });
        }
        if self.min_size.width < 0.0 || self.min_size.height < 0.0 {
            return Err(ConfigError::Invalid {
                field: "min_size",
                reason: "must be non-negative".to_string(),
            });
        }
        if let Some(max) = self.max_size {
            if max.width < self.min_size.width || max.height < self.min_size.height {
                return Err(ConfigError::Invalid {
                    field: "max_size",
                    reason: "must not be smaller than min_size".to_string(),
                });
            }
        }
        if self.rotation_snap_deg < 0.0 {
            return Err(ConfigError::Invalid {
                field: "rotation_snap_deg",
                reason: "must be non-negative".to_string(),
            });
        }
        Ok(())
    }

    /// Throttle interval as a duration.
    pub fn move_throttle(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.move_throttle_ms)
    }
}

/// Read-only access to engine settings.
pub trait SettingsSource {
    /// Snapshot of all settings, taken at gesture start.
    fn settings(&self) -> EngineSettings;

    /// Current grid configuration, read on every pointer move.
    fn grid(&self) -> GridConfig {
        self.settings().grid
    }
}

impl SettingsSource for EngineSettings {
    fn settings(&self) -> EngineSettings {
        self.clone()
    }

    fn grid(&self) -> GridConfig {
        self.grid
    }
}

/// Settings shared with an external settings UI that may edit them live.
#[derive(Debug, Clone, Default)]
pub struct SharedSettings(Rc<RefCell<EngineSettings>>);

impl SharedSettings {
    pub fn new(settings: EngineSettings) -> Self {
        Self(Rc::new(RefCell::new(settings)))
    }

    /// Edit the settings in place.
    pub fn update(&self, f: impl FnOnce(&mut EngineSettings)) {
        f(&mut self.0.borrow_mut());
    }
}

impl SettingsSource for SharedSettings {
    fn settings(&self) -> EngineSettings {
        self.0.borrow().clone()
    }

    fn grid(&self) -> GridConfig {
        self.0.borrow().grid
    }
}
