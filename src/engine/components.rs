// ECS components describing the static exhibition layout
// Geometry lives on entities; the collidable registry and draw list are derived from them

use bevy_ecs::prelude::*;
use glam::{Mat3, Mat4, Quat, Vec3};

use super::collision::{NodeId, Obb, Shape};
use super::exhibit::ExhibitId;

/// Placement of a unit primitive. `scale` is the full extent along each local axis.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self { position, ..Default::default() }
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Rotation about +Y in radians.
    pub fn with_yaw(mut self, yaw: f32) -> Self {
        self.rotation = Quat::from_rotation_y(yaw);
        self
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

/// RGB color for rendering
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColliderKind {
    Box,
    /// Radius is half of `Transform::scale.x`.
    Sphere,
}

/// Makes an entity ray-testable under a stable node id.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Collider {
    pub node: NodeId,
    pub label: String,
    pub kind: ColliderKind,
}

impl Collider {
    pub fn cuboid(node: NodeId, label: impl Into<String>) -> Self {
        Self { node, label: label.into(), kind: ColliderKind::Box }
    }

    pub fn sphere(node: NodeId, label: impl Into<String>) -> Self {
        Self { node, label: label.into(), kind: ColliderKind::Sphere }
    }

    pub fn shape(&self, transform: &Transform) -> Shape {
        match self.kind {
            ColliderKind::Box => Shape::Box(Obb {
                center: transform.position,
                half_extents: transform.scale * 0.5,
                rotation: Mat3::from_quat(transform.rotation),
            }),
            ColliderKind::Sphere => Shape::Sphere {
                center: transform.position,
                radius: transform.scale.x * 0.5,
            },
        }
    }
}

/// Blocks movement and sightlines. Colliders without it are pick targets only.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Solid;

/// Groups several colliders under one registry node (a divider with an opening, a sculpture).
#[derive(Component, Debug, Clone, PartialEq)]
pub struct PartOf {
    pub group: NodeId,
    pub label: String,
}

impl PartOf {
    pub fn new(group: NodeId, label: impl Into<String>) -> Self {
        Self { group, label: label.into() }
    }
}

/// Renders as part of an exhibit; a zoomed exhibit is drawn in front of the viewer.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExhibitPart(pub ExhibitId);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::collision::Ray;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn box_shape_follows_rotation() {
        // A 4-wide, 0.2-deep panel turned a quarter: now thin along X.
        let transform = Transform::from_position(Vec3::new(0.0, 0.0, -5.0))
            .with_scale(Vec3::new(4.0, 2.0, 0.2))
            .with_yaw(FRAC_PI_2);
        let shape = Collider::cuboid(NodeId(1), "panel").shape(&transform);

        let along_x = Ray::new(Vec3::new(-5.0, 0.0, -5.0), Vec3::X).unwrap();
        assert!((shape.ray_entry(&along_x).unwrap() - 4.9).abs() < 1e-4);
    }

    #[test]
    fn sphere_radius_is_half_scale() {
        let transform = Transform::from_position(Vec3::ZERO).with_scale(Vec3::splat(3.0));
        match Collider::sphere(NodeId(2), "ball").shape(&transform) {
            Shape::Sphere { radius, .. } => assert_eq!(radius, 1.5),
            other => panic!("expected sphere, got {other:?}"),
        }
    }
}
