// Engine module - navigation, collision, exhibits and the ECS scene plumbing

pub mod camera;
pub mod collision;
pub mod components;
pub mod config;
pub mod controller;
pub mod debug_overlay;
pub mod exhibit;
pub mod exhibition;
pub mod input;
pub mod motion;
pub mod occlusion;
pub mod picking;
pub mod pinch;
pub mod platform;
pub mod systems;
pub mod timer;

// Re-export commonly used items
pub use components::*;
pub use config::{AtriumConfig, ConfigError};
pub use exhibit::{Exhibit, ExhibitId, ExhibitKind};
pub use exhibition::Exhibition;
pub use input::{InputEvent, NavKey, VirtualKeyPress};
