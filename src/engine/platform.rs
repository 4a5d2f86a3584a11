// winit -> InputEvent translation
//
// winit reports touches one finger at a time; the core wants the full list of
// fingers still down with every touch event, so the tracker keeps it.

use glam::Vec2;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, TouchPhase, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use super::input::{InputEvent, NavKey, TouchPoint};

/// Pixels per wheel line, matching what browsers report for one notch.
const LINE_HEIGHT_PX: f32 = 100.0;

pub fn nav_key(code: KeyCode) -> Option<NavKey> {
    match code {
        KeyCode::KeyW => Some(NavKey::Forward),
        KeyCode::KeyS => Some(NavKey::Back),
        KeyCode::KeyA => Some(NavKey::StrafeLeft),
        KeyCode::KeyD => Some(NavKey::StrafeRight),
        KeyCode::ShiftLeft | KeyCode::ShiftRight => Some(NavKey::Sprint),
        _ => None,
    }
}

/// Wheel delta in browser convention: positive when scrolling down, in pixels.
pub fn wheel_delta_y(delta: &MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => -y * LINE_HEIGHT_PX,
        MouseScrollDelta::PixelDelta(pos) => -pos.y as f32,
    }
}

/// Fingers currently on the surface, in the order they touched down.
#[derive(Debug, Default)]
pub struct TouchTracker {
    active: Vec<TouchPoint>,
}

impl TouchTracker {
    pub fn active(&self) -> &[TouchPoint] {
        &self.active
    }

    pub fn apply(&mut self, id: u64, phase: TouchPhase, position: Vec2) -> InputEvent {
        match phase {
            TouchPhase::Started => {
                self.active.retain(|t| t.id != id);
                self.active.push(TouchPoint { id, position });
                InputEvent::TouchStart { touches: self.active.clone() }
            }
            TouchPhase::Moved => {
                if let Some(t) = self.active.iter_mut().find(|t| t.id == id) {
                    t.position = position;
                }
                InputEvent::TouchMove { touches: self.active.clone() }
            }
            TouchPhase::Ended => {
                self.active.retain(|t| t.id != id);
                InputEvent::TouchEnd { touches: self.active.clone(), ended: vec![id] }
            }
            TouchPhase::Cancelled => {
                self.active.retain(|t| t.id != id);
                InputEvent::TouchCancel { touches: self.active.clone(), ended: vec![id] }
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct PlatformInput {
    touches: TouchTracker,
    cursor: Option<Vec2>,
}

impl PlatformInput {
    /// Last cursor position in physical pixels, `None` once it leaves the window.
    pub fn cursor(&self) -> Option<Vec2> {
        self.cursor
    }

    pub fn touches(&self) -> &TouchTracker {
        &self.touches
    }

    pub fn translate(&mut self, event: &WindowEvent) -> Option<InputEvent> {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                let PhysicalKey::Code(code) = event.physical_key else {
                    return None;
                };
                nav_key(code).map(|key| InputEvent::Key {
                    key,
                    pressed: event.state == ElementState::Pressed,
                    repeat: event.repeat,
                })
            }
            WindowEvent::MouseInput { state, button: MouseButton::Left, .. } => {
                match state {
                    ElementState::Pressed => {
                        self.cursor.map(|position| InputEvent::PointerDown { position })
                    }
                    ElementState::Released => Some(InputEvent::PointerUp),
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let position = Vec2::new(position.x as f32, position.y as f32);
                self.cursor = Some(position);
                Some(InputEvent::PointerMove { position })
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                Some(InputEvent::PointerLeave)
            }
            WindowEvent::Touch(touch) => {
                let position = Vec2::new(touch.location.x as f32, touch.location.y as f32);
                Some(self.touches.apply(touch.id, touch.phase, position))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalPosition;

    #[test]
    fn maps_wasd_and_both_shifts() {
        assert_eq!(nav_key(KeyCode::KeyW), Some(NavKey::Forward));
        assert_eq!(nav_key(KeyCode::KeyD), Some(NavKey::StrafeRight));
        assert_eq!(nav_key(KeyCode::ShiftRight), Some(NavKey::Sprint));
        assert_eq!(nav_key(KeyCode::ArrowUp), None);
    }

    #[test]
    fn wheel_follows_browser_sign() {
        assert_eq!(wheel_delta_y(&MouseScrollDelta::LineDelta(0.0, -1.0)), 100.0);
        let pixels = MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, 40.0));
        assert_eq!(wheel_delta_y(&pixels), -40.0);
    }

    #[test]
    fn tracker_reports_remaining_fingers() {
        let mut tracker = TouchTracker::default();
        tracker.apply(1, TouchPhase::Started, Vec2::ZERO);
        let second = tracker.apply(2, TouchPhase::Started, Vec2::new(50.0, 0.0));
        assert!(matches!(second, InputEvent::TouchStart { ref touches } if touches.len() == 2));

        let moved = tracker.apply(2, TouchPhase::Moved, Vec2::new(80.0, 0.0));
        match moved {
            InputEvent::TouchMove { touches } => {
                assert_eq!(touches[1].position, Vec2::new(80.0, 0.0))
            }
            other => panic!("unexpected {other:?}"),
        }

        let ended = tracker.apply(1, TouchPhase::Ended, Vec2::ZERO);
        assert_eq!(
            ended,
            InputEvent::TouchEnd {
                touches: vec![TouchPoint { id: 2, position: Vec2::new(80.0, 0.0) }],
                ended: vec![1],
            }
        );

        tracker.apply(2, TouchPhase::Cancelled, Vec2::ZERO);
        assert!(tracker.active().is_empty());
    }
}
