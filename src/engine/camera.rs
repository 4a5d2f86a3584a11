// First-person gallery camera
//
// Camera model:
//   - Yaw and pitch are independent, unclamped accumulators
//   - Orientation quaternion = yaw about +Y, then pitch about local +X (YXZ order)
//   - yaw=0, pitch=0 looks along -Z
//   - Movement basis is the look basis flattened onto the XZ plane, so walking
//     speed does not depend on where the viewer is looking vertically
//   - Position y is pinned to the eye height by the controller every frame

use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Orientation {
    /// Horizontal rotation in radians about +Y.
    pub yaw: f32,
    /// Vertical rotation in radians about the local +X axis. Not limited.
    pub pitch: f32,
}

impl Orientation {
    pub fn new(yaw: f32, pitch: f32) -> Self {
        Self { yaw, pitch }
    }

    /// Accumulate a (yaw, pitch) delta.
    pub fn rotate(&mut self, delta: Vec2) {
        self.yaw += delta.x;
        self.pitch += delta.y;
    }

    pub fn quat(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    /// Full 3D look direction.
    pub fn look_direction(&self) -> Vec3 {
        self.quat() * Vec3::NEG_Z
    }

    /// Look direction flattened onto XZ. Zero when looking straight up or down.
    pub fn forward(&self) -> Vec3 {
        flatten(self.quat() * Vec3::NEG_Z)
    }

    /// Camera right flattened onto XZ.
    pub fn right(&self) -> Vec3 {
        flatten(self.quat() * Vec3::X)
    }

    /// Point the orientation from `position` toward `target`.
    /// Returns false and leaves the orientation untouched when the two coincide.
    pub fn look_at(&mut self, position: Vec3, target: Vec3) -> bool {
        let dir = (target - position).normalize_or_zero();
        if dir == Vec3::ZERO {
            return false;
        }
        // Inverse of look_direction(): (-sin(yaw)cos(pitch), sin(pitch), -cos(yaw)cos(pitch))
        self.yaw = (-dir.x).atan2(-dir.z);
        self.pitch = dir.y.clamp(-1.0, 1.0).asin();
        true
    }
}

const DEGENERATE_LENGTH_SQ: f32 = 1e-10;

fn flatten(v: Vec3) -> Vec3 {
    let flat = Vec3::new(v.x, 0.0, v.z);
    if flat.length_squared() < DEGENERATE_LENGTH_SQ {
        return Vec3::ZERO;
    }
    flat.normalize()
}

/// The navigable camera: position plus orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewpoint {
    pub position: Vec3,
    pub orientation: Orientation,

    /// Vertical field of view in radians
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl Viewpoint {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            orientation: Orientation::default(),
            fov: 60.0_f32.to_radians(),
            near: 0.1,
            far: 200.0,
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, self.orientation.look_direction(), Vec3::Y)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov, aspect, self.near, self.far)
    }

    /// Combined view-projection matrix ready to upload to the GPU.
    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn default_looks_down_negative_z() {
        let o = Orientation::default();
        assert!(close(o.forward(), Vec3::NEG_Z));
        assert!(close(o.right(), Vec3::X));
    }

    #[test]
    fn quarter_yaw_turns_left() {
        let o = Orientation::new(FRAC_PI_2, 0.0);
        assert!(close(o.forward(), Vec3::NEG_X));
        assert!(close(o.right(), Vec3::NEG_Z));
    }

    #[test]
    fn pitch_does_not_tilt_movement_basis() {
        let o = Orientation::new(0.3, 0.7);
        let f = o.forward();
        assert_eq!(f.y, 0.0);
        assert!((f.length() - 1.0).abs() < 1e-5);
        assert!(o.look_direction().y > 0.0);
    }

    #[test]
    fn pitch_past_vertical_inverts_forward() {
        // Pitch is unclamped; going over the top flips horizontal forward.
        let o = Orientation::new(0.0, PI * 0.75);
        assert!(close(o.forward(), Vec3::Z));
    }

    #[test]
    fn straight_up_has_zero_forward() {
        let o = Orientation::new(0.0, FRAC_PI_2);
        assert_eq!(o.forward(), Vec3::ZERO);
    }

    #[test]
    fn look_at_points_forward_at_target() {
        let mut o = Orientation::default();
        let pos = Vec3::new(1.0, 5.0, 2.0);
        let target = Vec3::new(-3.0, 7.0, -6.0);
        assert!(o.look_at(pos, target));
        assert!(close(o.look_direction(), (target - pos).normalize()));
    }

    #[test]
    fn look_at_same_point_keeps_orientation() {
        let mut o = Orientation::new(0.4, -0.2);
        assert!(!o.look_at(Vec3::ONE, Vec3::ONE));
        assert_eq!(o, Orientation::new(0.4, -0.2));
    }

    #[test]
    fn view_matrix_maps_eye_to_origin() {
        let vp = Viewpoint::new(Vec3::new(2.0, 5.0, 8.0));
        let eye = vp.view_matrix().transform_point3(vp.position);
        assert!(eye.length() < 1e-5);
    }
}
