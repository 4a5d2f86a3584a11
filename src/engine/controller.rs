// First-person navigation controller
//
// Per tick: held keys -> intended displacement -> collision clamp -> advance,
// then y is pinned to the eye height. Look deltas are applied as events arrive.

use glam::Vec3;

use super::camera::Viewpoint;
use super::collision::{CollidableRegistry, CollisionResolver};
use super::config::NavigationConfig;
use super::input::{InputEvent, InputState};
use super::motion::{MotionIntegrator, SpeedProfile};

pub struct NavigationController {
    config: NavigationConfig,
    input: InputState,
    viewpoint: Viewpoint,
    motion: MotionIntegrator,
    resolver: CollisionResolver,
    attached: bool,
}

impl NavigationController {
    pub fn new(config: NavigationConfig) -> Self {
        let mut spawn = config.spawn();
        spawn.y = config.eye_height;
        Self {
            input: InputState::new(config.mouse_sensitivity, config.touch_sensitivity()),
            viewpoint: Viewpoint::new(spawn),
            motion: MotionIntegrator::new(SpeedProfile {
                walk: config.walk_speed,
                sprint: config.sprint_speed,
            }),
            resolver: CollisionResolver::new(config.collision_buffer, config.hit_epsilon),
            attached: true,
            config,
        }
    }

    pub fn config(&self) -> &NavigationConfig {
        &self.config
    }

    pub fn viewpoint(&self) -> &Viewpoint {
        &self.viewpoint
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn attach(&mut self) {
        self.attached = true;
    }

    /// Stop listening and forget any held keys or drags.
    pub fn detach(&mut self) {
        self.attached = false;
        self.input.clear();
    }

    pub fn handle_event(&mut self, event: &InputEvent) {
        if !self.attached {
            return;
        }
        let look = self.input.process_event(event);
        if look != glam::Vec2::ZERO {
            self.viewpoint.orientation.rotate(look);
        }
    }

    /// Teleport. The position is stored as given; the next `update` pins y.
    pub fn set_view(&mut self, position: Vec3, look_at: Vec3) {
        self.viewpoint.position = position;
        if !self.viewpoint.orientation.look_at(position, look_at) {
            log::debug!("set_view target coincides with position, orientation kept");
        }
    }

    pub fn update(&mut self, dt: f32, collidables: Option<&CollidableRegistry>) {
        if let Some(intent) = self.motion.integrate(&self.input, &self.viewpoint.orientation, dt) {
            let allowed = self.resolver.allowed_length(
                self.viewpoint.position,
                intent.direction,
                intent.length,
                collidables,
            );
            self.viewpoint.position += intent.direction * allowed;
        }
        self.viewpoint.position.y = self.config.eye_height;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::collision::{CollidableNode, NodeId, Obb, Shape};
    use crate::engine::input::NavKey;

    fn press(key: NavKey) -> InputEvent {
        InputEvent::Key { key, pressed: true, repeat: false }
    }

    fn wall_ahead(face_distance: f32) -> CollidableRegistry {
        // Viewer spawns at z=8 looking toward -Z.
        let z = 8.0 - face_distance - 0.1;
        CollidableRegistry::new(vec![CollidableNode::leaf(
            NodeId(1),
            "wall",
            Shape::Box(Obb::axis_aligned(Vec3::new(0.0, 5.0, z), Vec3::new(20.0, 6.0, 0.1))),
        )])
    }

    #[test]
    fn spawns_at_eye_height() {
        let nav = NavigationController::new(NavigationConfig::default());
        assert_eq!(nav.viewpoint().position, Vec3::new(0.0, 5.0, 8.0));
    }

    #[test]
    fn idle_update_is_idempotent() {
        let mut nav = NavigationController::new(NavigationConfig::default());
        let before = *nav.viewpoint();
        for _ in 0..10 {
            nav.update(0.016, None);
        }
        assert_eq!(*nav.viewpoint(), before);
    }

    #[test]
    fn walks_forward_unclamped() {
        let mut nav = NavigationController::new(NavigationConfig::default());
        nav.handle_event(&press(NavKey::Forward));
        nav.update(0.5, None);
        assert!((nav.viewpoint().position.z - 4.25).abs() < 1e-5);
    }

    #[test]
    fn stops_buffer_short_of_wall() {
        let mut nav = NavigationController::new(NavigationConfig::default());
        let registry = wall_ahead(2.0);
        nav.handle_event(&press(NavKey::Forward));
        nav.handle_event(&press(NavKey::Sprint));
        for _ in 0..20 {
            nav.update(0.1, Some(&registry));
        }
        let travelled = 8.0 - nav.viewpoint().position.z;
        assert!((travelled - 1.4).abs() < 1e-4, "travelled {travelled}");
    }

    #[test]
    fn y_is_pinned_after_teleport_and_update() {
        let mut nav = NavigationController::new(NavigationConfig::default());
        nav.set_view(Vec3::new(3.0, 20.0, -2.0), Vec3::new(3.0, 20.0, -12.0));
        assert_eq!(nav.viewpoint().position.y, 20.0);
        nav.update(0.016, None);
        assert_eq!(nav.viewpoint().position, Vec3::new(3.0, 5.0, -2.0));
    }

    #[test]
    fn detached_ignores_events_and_drops_keys() {
        let mut nav = NavigationController::new(NavigationConfig::default());
        nav.handle_event(&press(NavKey::Forward));
        nav.detach();
        nav.update(1.0, None);
        assert_eq!(nav.viewpoint().position.z, 8.0);

        nav.handle_event(&press(NavKey::Back));
        assert!(!nav.input().is_held(NavKey::Back));

        nav.attach();
        nav.handle_event(&press(NavKey::Back));
        nav.update(1.0, None);
        assert!((nav.viewpoint().position.z - 15.5).abs() < 1e-5);
    }

    #[test]
    fn drag_rotates_viewpoint() {
        let mut nav = NavigationController::new(NavigationConfig::default());
        nav.handle_event(&InputEvent::PointerDown { position: glam::Vec2::ZERO });
        nav.handle_event(&InputEvent::PointerMove { position: glam::Vec2::new(100.0, 0.0) });
        assert!((nav.viewpoint().orientation.yaw + 0.1).abs() < 1e-6);
    }
}
