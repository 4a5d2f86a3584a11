// Per-frame intended displacement from held keys.
// Produces the movement a frame would make absent any obstruction;
// the collision resolver decides how much of it is allowed.

use glam::Vec3;

use super::camera::Orientation;
use super::input::InputState;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedProfile {
    /// World units per second
    pub walk: f32,
    pub sprint: f32,
}

impl SpeedProfile {
    pub fn speed(&self, sprinting: bool) -> f32 {
        if sprinting { self.sprint } else { self.walk }
    }
}

/// Unit direction plus length for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionIntent {
    pub direction: Vec3,
    pub length: f32,
}

pub struct MotionIntegrator {
    pub speeds: SpeedProfile,
}

impl MotionIntegrator {
    pub fn new(speeds: SpeedProfile) -> Self {
        Self { speeds }
    }

    /// `None` when no movement key is held, opposing keys cancel out,
    /// or the movement basis is degenerate (looking straight up/down).
    pub fn integrate(
        &self,
        input: &InputState,
        orientation: &Orientation,
        dt: f32,
    ) -> Option<MotionIntent> {
        let axes = input.movement_axes();
        if axes == glam::Vec2::ZERO {
            return None;
        }

        let desired = orientation.forward() * axes.y + orientation.right() * axes.x;
        let direction = desired.normalize_or_zero();
        if direction == Vec3::ZERO {
            return None;
        }

        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        Some(MotionIntent {
            direction,
            length: self.speeds.speed(input.sprinting()) * dt,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::input::{InputEvent, NavKey};

    fn integrator() -> MotionIntegrator {
        MotionIntegrator::new(SpeedProfile { walk: 7.5, sprint: 15.0 })
    }

    fn hold(input: &mut InputState, key: NavKey) {
        input.process_event(&InputEvent::Key { key, pressed: true, repeat: false });
    }

    #[test]
    fn no_keys_no_motion() {
        let input = InputState::new(0.001, 0.0015);
        assert!(integrator().integrate(&input, &Orientation::default(), 0.016).is_none());
    }

    #[test]
    fn walk_and_sprint_lengths() {
        let mut input = InputState::new(0.001, 0.0015);
        hold(&mut input, NavKey::Forward);
        let walk = integrator().integrate(&input, &Orientation::default(), 0.5).unwrap();
        assert!((walk.length - 3.75).abs() < 1e-6);
        assert!((walk.direction - Vec3::NEG_Z).length() < 1e-6);

        hold(&mut input, NavKey::Sprint);
        let sprint = integrator().integrate(&input, &Orientation::default(), 0.5).unwrap();
        assert!((sprint.length - 7.5).abs() < 1e-6);
    }

    #[test]
    fn diagonal_is_normalized() {
        let mut input = InputState::new(0.001, 0.0015);
        hold(&mut input, NavKey::Forward);
        hold(&mut input, NavKey::StrafeRight);
        let m = integrator().integrate(&input, &Orientation::default(), 1.0).unwrap();
        assert!((m.direction.length() - 1.0).abs() < 1e-6);
        assert!(m.direction.x > 0.0 && m.direction.z < 0.0);
        assert!((m.length - 7.5).abs() < 1e-6);
    }

    #[test]
    fn negative_dt_moves_nowhere() {
        let mut input = InputState::new(0.001, 0.0015);
        hold(&mut input, NavKey::Back);
        let m = integrator().integrate(&input, &Orientation::default(), -1.0).unwrap();
        assert_eq!(m.length, 0.0);
    }

    #[test]
    fn non_finite_dt_moves_nowhere() {
        let mut input = InputState::new(0.001, 0.0015);
        hold(&mut input, NavKey::Forward);
        for dt in [f32::INFINITY, f32::NEG_INFINITY, f32::NAN] {
            let m = integrator().integrate(&input, &Orientation::default(), dt).unwrap();
            assert_eq!(m.length, 0.0);
        }
    }

    #[test]
    fn looking_straight_down_blocks_forward_only() {
        let mut input = InputState::new(0.001, 0.0015);
        hold(&mut input, NavKey::Forward);
        let down = Orientation::new(0.0, -std::f32::consts::FRAC_PI_2);
        assert!(integrator().integrate(&input, &down, 1.0).is_none());

        hold(&mut input, NavKey::StrafeLeft);
        let m = integrator().integrate(&input, &down, 1.0).unwrap();
        assert!((m.direction - Vec3::NEG_X).length() < 1e-5);
    }
}
