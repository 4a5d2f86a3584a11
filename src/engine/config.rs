// Tunables for navigation and exhibit interaction.
// Defaults match the gallery as shipped; a JSON file may override any subset.

use glam::Vec3;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// NAVIGATION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Fixed y of the viewpoint after every update.
    pub eye_height: f32,
    /// Walk speed in world units per second.
    pub walk_speed: f32,
    /// Speed while the sprint modifier is held.
    pub sprint_speed: f32,
    /// Radians of yaw/pitch per pixel of mouse drag.
    pub mouse_sensitivity: f32,
    /// Multiplier applied on top of `mouse_sensitivity` for touch drags.
    pub touch_sensitivity_scale: f32,
    /// The viewpoint never gets closer than this to an obstruction along its movement ray.
    pub collision_buffer: f32,
    /// Hits closer than this are treated as self-intersection noise.
    pub hit_epsilon: f32,
    pub spawn_position: [f32; 3],
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            eye_height: 5.0,
            walk_speed: 7.5,
            sprint_speed: 15.0,
            mouse_sensitivity: 0.001,
            touch_sensitivity_scale: 1.5,
            collision_buffer: 0.6,
            hit_epsilon: 0.01,
            spawn_position: [0.0, 5.0, 8.0],
        }
    }
}

impl NavigationConfig {
    pub fn spawn(&self) -> Vec3 {
        Vec3::from_array(self.spawn_position)
    }

    pub fn touch_sensitivity(&self) -> f32 {
        self.mouse_sensitivity * self.touch_sensitivity_scale
    }
}

// ============================================================================
// EXHIBITS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExhibitConfig {
    /// Time the pointer must rest on an unobstructed exhibit before its info panel shows.
    pub hover_delay_ms: u64,
    /// A non-self hit must be at least this much closer than the anchor to count as an obstruction.
    pub obstruction_tolerance: f32,
    pub zoom_entry_magnification: f32,
    pub min_magnification: f32,
    pub max_magnification: f32,
    pub pinch_sensitivity: f32,
    /// Magnification change per unit of wheel deltaY (pixels).
    pub wheel_sensitivity: f32,
    /// Two clicks on the same exhibit within this window count as a double-click.
    pub double_click_ms: u64,
}

impl Default for ExhibitConfig {
    fn default() -> Self {
        Self {
            hover_delay_ms: 500,
            obstruction_tolerance: 0.1,
            zoom_entry_magnification: 1.5,
            min_magnification: 1.0,
            max_magnification: 3.0,
            pinch_sensitivity: 1.0,
            wheel_sensitivity: 0.01,
            double_click_ms: 300,
        }
    }
}

impl ExhibitConfig {
    pub fn hover_delay(&self) -> Duration {
        Duration::from_millis(self.hover_delay_ms)
    }

    pub fn double_click_window(&self) -> Duration {
        Duration::from_millis(self.double_click_ms)
    }

    pub fn clamp_magnification(&self, value: f32) -> f32 {
        value.clamp(self.min_magnification, self.max_magnification)
    }
}

// ============================================================================
// TOP LEVEL
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AtriumConfig {
    pub navigation: NavigationConfig,
    pub exhibits: ExhibitConfig,
}

impl AtriumConfig {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let nav = &self.navigation;
        let ex = &self.exhibits;

        let non_negative = [
            ("navigation.walk_speed", nav.walk_speed),
            ("navigation.sprint_speed", nav.sprint_speed),
            ("navigation.mouse_sensitivity", nav.mouse_sensitivity),
            ("navigation.touch_sensitivity_scale", nav.touch_sensitivity_scale),
            ("navigation.collision_buffer", nav.collision_buffer),
            ("navigation.hit_epsilon", nav.hit_epsilon),
            ("exhibits.obstruction_tolerance", ex.obstruction_tolerance),
            ("exhibits.pinch_sensitivity", ex.pinch_sensitivity),
            ("exhibits.wheel_sensitivity", ex.wheel_sensitivity),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be a finite value >= 0, got {value}"
                )));
            }
        }

        if !nav.eye_height.is_finite() {
            return Err(ConfigError::Invalid("navigation.eye_height must be finite".into()));
        }
        if !(ex.min_magnification > 0.0 && ex.min_magnification <= ex.max_magnification) {
            return Err(ConfigError::Invalid(format!(
                "exhibits magnification bounds [{}, {}] are not a valid range",
                ex.min_magnification, ex.max_magnification
            )));
        }
        if !(ex.min_magnification..=ex.max_magnification).contains(&ex.zoom_entry_magnification) {
            return Err(ConfigError::Invalid(format!(
                "exhibits.zoom_entry_magnification {} lies outside [{}, {}]",
                ex.zoom_entry_magnification, ex.min_magnification, ex.max_magnification
            )));
        }
        Ok(())
    }
}
