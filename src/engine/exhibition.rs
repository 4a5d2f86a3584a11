// Exhibition facade: navigation, exhibits and the collidable snapshot behind one API.
//
// Tick order:
//   1. drain the virtual-key bus into navigation input
//   2. navigation update (motion + collision + eye height)
//   3. hover timers advance
//
// Touch routing: while a zoomed exhibit owns a pinch (or a two-finger touch
// starts on one) touch events go to the pinch and never reach navigation.

use bevy_ecs::event::Events;
use glam::Vec3;
use std::time::Duration;

use super::camera::Viewpoint;
use super::collision::CollidableRegistry;
use super::config::AtriumConfig;
use super::controller::NavigationController;
use super::exhibit::{Exhibit, ExhibitBoard, ExhibitId};
use super::input::{InputEvent, VirtualKeyPress};

pub struct Exhibition {
    navigation: NavigationController,
    exhibits: ExhibitBoard,
    collidables: Option<CollidableRegistry>,
    virtual_keys: Events<VirtualKeyPress>,
}

impl Exhibition {
    pub fn new(config: AtriumConfig) -> Self {
        Self {
            navigation: NavigationController::new(config.navigation),
            exhibits: ExhibitBoard::new(config.exhibits),
            collidables: None,
            virtual_keys: Events::default(),
        }
    }

    // ------------------------------------------------------------------------
    // Snapshot and bus
    // ------------------------------------------------------------------------

    /// Replace the collidable snapshot. `None` turns collision and occlusion off.
    pub fn set_collidables(&mut self, registry: Option<CollidableRegistry>) {
        log::debug!(
            "collidables {}",
            if registry.is_some() { "replaced" } else { "cleared" }
        );
        self.collidables = registry;
    }

    pub fn collidables(&self) -> Option<&CollidableRegistry> {
        self.collidables.as_ref()
    }

    /// Bus for on-screen control surfaces. Drained at the start of every `update`.
    pub fn virtual_keys(&mut self) -> &mut Events<VirtualKeyPress> {
        &mut self.virtual_keys
    }

    // ------------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------------

    pub fn viewpoint(&self) -> &Viewpoint {
        self.navigation.viewpoint()
    }

    pub fn navigation(&self) -> &NavigationController {
        &self.navigation
    }

    pub fn attach(&mut self) {
        self.navigation.attach();
    }

    pub fn detach(&mut self) {
        self.navigation.detach();
        self.virtual_keys.clear();
    }

    pub fn set_view(&mut self, position: Vec3, look_at: Vec3) {
        self.navigation.set_view(position, look_at);
    }

    pub fn handle_input(&mut self, event: &InputEvent) {
        if self.route_to_pinch(event) {
            return;
        }
        self.navigation.handle_event(event);
    }

    fn route_to_pinch(&mut self, event: &InputEvent) -> bool {
        match event {
            InputEvent::TouchStart { touches } => {
                if self.exhibits.pinch_active() {
                    return true;
                }
                if !self.exhibits.pinch_start(touches) {
                    return false;
                }
                // The pinch owns these fingers now; end any look drag so it
                // does not resume from a stale position afterwards.
                if let Some(id) = self.navigation.input().tracked_touch_id() {
                    self.navigation.handle_event(&InputEvent::TouchCancel {
                        touches: touches.clone(),
                        ended: vec![id],
                    });
                }
                true
            }
            InputEvent::TouchMove { touches } => {
                if !self.exhibits.pinch_active() {
                    return false;
                }
                self.exhibits.pinch_move(touches);
                true
            }
            InputEvent::TouchEnd { touches, .. } | InputEvent::TouchCancel { touches, .. } => {
                if !self.exhibits.pinch_active() {
                    return false;
                }
                self.exhibits.pinch_end(touches);
                true
            }
            _ => false,
        }
    }

    pub fn update(&mut self, delta_seconds: f32) {
        let presses: Vec<VirtualKeyPress> = self.virtual_keys.drain().collect();
        for press in presses {
            self.navigation.handle_event(&InputEvent::Virtual(press));
        }

        self.navigation.update(delta_seconds, self.collidables.as_ref());

        let elapsed = if delta_seconds.is_finite() && delta_seconds > 0.0 {
            Duration::try_from_secs_f32(delta_seconds).unwrap_or(Duration::MAX)
        } else {
            Duration::ZERO
        };
        self.exhibits.advance(elapsed);
    }

    /// Advance hover timers without moving the viewpoint.
    pub fn advance_timers(&mut self, elapsed: Duration) {
        self.exhibits.advance(elapsed);
    }

    // ------------------------------------------------------------------------
    // Exhibits
    // ------------------------------------------------------------------------

    pub fn add_exhibit(&mut self, exhibit: Exhibit) {
        self.exhibits.add(exhibit);
    }

    pub fn remove_exhibit(&mut self, id: ExhibitId) -> Option<Exhibit> {
        self.exhibits.remove(id)
    }

    pub fn exhibit(&self, id: ExhibitId) -> Option<&Exhibit> {
        self.exhibits.get(id)
    }

    pub fn exhibits(&self) -> &ExhibitBoard {
        &self.exhibits
    }

    pub fn on_pointer_enter(&mut self, id: ExhibitId) {
        let eye = Some(self.navigation.viewpoint().position);
        self.exhibits.pointer_enter(id, eye, self.collidables.as_ref());
    }

    pub fn on_pointer_leave(&mut self, id: ExhibitId) {
        self.exhibits.pointer_leave(id);
    }

    pub fn on_toggle_zoom(&mut self, id: ExhibitId) {
        self.exhibits.toggle_zoom(id);
    }

    pub fn on_wheel(&mut self, id: ExhibitId, delta_y: f32) {
        self.exhibits.wheel(id, delta_y);
    }

    pub fn on_screen_click(&mut self, id: ExhibitId) -> Option<bool> {
        let eye = Some(self.navigation.viewpoint().position);
        self.exhibits.screen_click(id, eye, self.collidables.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::exhibit::ExhibitKind;
    use crate::engine::input::{NavKey, TouchPoint};
    use glam::Vec2;

    const ART: ExhibitId = ExhibitId(1);

    fn exhibition() -> Exhibition {
        let mut ex = Exhibition::new(AtriumConfig::default());
        ex.add_exhibit(Exhibit::new(ART, ExhibitKind::Artwork, "Art", Vec3::new(0.0, 5.0, -4.0)));
        ex
    }

    fn touches(points: &[(u64, f32)]) -> Vec<TouchPoint> {
        points.iter().map(|&(id, x)| TouchPoint { id, position: Vec2::new(x, 0.0) }).collect()
    }

    #[test]
    fn virtual_keys_are_applied_on_next_update() {
        let mut ex = exhibition();
        ex.virtual_keys().send(VirtualKeyPress { key: NavKey::Forward, pressed: true });
        ex.update(1.0);
        assert!((ex.viewpoint().position.z - 0.5).abs() < 1e-5);

        ex.virtual_keys().send(VirtualKeyPress { key: NavKey::Forward, pressed: false });
        ex.update(1.0);
        assert!((ex.viewpoint().position.z - 0.5).abs() < 1e-5);
    }

    #[test]
    fn pinch_touches_do_not_rotate_view() {
        let mut ex = exhibition();
        ex.on_toggle_zoom(ART);
        ex.handle_input(&InputEvent::TouchStart { touches: touches(&[(1, 0.0), (2, 100.0)]) });
        ex.handle_input(&InputEvent::TouchMove { touches: touches(&[(1, 0.0), (2, 150.0)]) });
        assert_eq!(ex.viewpoint().orientation.yaw, 0.0);
        assert!((ex.exhibit(ART).unwrap().magnification - 2.25).abs() < 1e-5);

        ex.handle_input(&InputEvent::TouchEnd { touches: touches(&[(1, 0.0)]), ended: vec![2] });
        assert!(!ex.exhibits().pinch_active());
    }

    #[test]
    fn single_touch_drags_view_when_nothing_zoomed() {
        let mut ex = exhibition();
        ex.handle_input(&InputEvent::TouchStart { touches: touches(&[(1, 0.0)]) });
        ex.handle_input(&InputEvent::TouchMove { touches: touches(&[(1, 10.0)]) });
        assert!(ex.viewpoint().orientation.yaw < 0.0);
    }

    #[test]
    fn hover_needs_a_registry_but_an_empty_one_arms() {
        let mut ex = exhibition();
        ex.on_pointer_enter(ART);
        ex.advance_timers(Duration::from_secs(1));
        assert!(!ex.exhibit(ART).unwrap().panel_visible);

        ex.set_collidables(Some(CollidableRegistry::default()));
        ex.on_pointer_enter(ART);
        ex.advance_timers(Duration::from_millis(500));
        assert!(ex.exhibit(ART).unwrap().panel_visible);
    }

    #[test]
    fn look_drag_does_not_jump_after_pinch() {
        let mut ex = exhibition();
        ex.on_toggle_zoom(ART);
        ex.handle_input(&InputEvent::TouchStart { touches: touches(&[(1, 0.0)]) });
        assert!(ex.navigation().input().is_touch_dragging());

        ex.handle_input(&InputEvent::TouchStart { touches: touches(&[(1, 0.0), (2, 100.0)]) });
        assert!(!ex.navigation().input().is_touch_dragging());
        ex.handle_input(&InputEvent::TouchMove { touches: touches(&[(1, 400.0), (2, 600.0)]) });
        ex.handle_input(&InputEvent::TouchEnd { touches: touches(&[(1, 400.0)]), ended: vec![2] });
        ex.handle_input(&InputEvent::TouchMove { touches: touches(&[(1, 401.0)]) });
        assert_eq!(ex.viewpoint().orientation.yaw, 0.0);
    }

    #[test]
    fn huge_or_infinite_dt_is_survivable() {
        let mut ex = exhibition();
        ex.set_collidables(Some(CollidableRegistry::default()));
        let before = *ex.viewpoint();
        ex.on_pointer_enter(ART);
        ex.update(1.0e20);
        assert_eq!(*ex.viewpoint(), before);
        assert!(ex.exhibit(ART).unwrap().panel_visible);
        ex.update(1.0e20);
        assert_eq!(*ex.viewpoint(), before);

        ex.handle_input(&InputEvent::Key { key: NavKey::Forward, pressed: true, repeat: false });
        ex.update(f32::INFINITY);
        assert_eq!(*ex.viewpoint(), before);
        assert!(ex.viewpoint().position.is_finite());
    }

    #[test]
    fn detach_drops_queued_virtual_keys() {
        let mut ex = exhibition();
        ex.virtual_keys().send(VirtualKeyPress { key: NavKey::Forward, pressed: true });
        ex.detach();
        ex.attach();
        ex.update(1.0);
        assert_eq!(ex.viewpoint().position.z, 8.0);
    }
}
