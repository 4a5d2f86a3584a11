// Walkable 3D exhibition: first-person navigation with ray-clamped collision,
// occlusion-gated info panels and pinch/wheel zoom on exhibits.

pub mod engine;
pub mod scene;
