// Input state tracking for keyboard, mouse drag, touch drag and virtual keys
// Folds every source into one key table plus per-event look deltas

use bevy_ecs::prelude::*;
use glam::Vec2;
use std::collections::HashSet;

/// Logical navigation keys. Physical keys and the on-screen pad both map here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavKey {
    Forward,
    Back,
    StrafeLeft,
    StrafeRight,
    Sprint,
}

impl NavKey {
    /// Parse the key names used by the virtual control surface: w, a, s, d, shift.
    pub fn from_virtual_name(name: &str) -> Option<Self> {
        match name {
            "w" => Some(Self::Forward),
            "a" => Some(Self::StrafeLeft),
            "s" => Some(Self::Back),
            "d" => Some(Self::StrafeRight),
            "shift" => Some(Self::Sprint),
            _ => None,
        }
    }

    pub fn virtual_name(self) -> &'static str {
        match self {
            Self::Forward => "w",
            Self::StrafeLeft => "a",
            Self::Back => "s",
            Self::StrafeRight => "d",
            Self::Sprint => "shift",
        }
    }
}

/// Key event emitted by an on-screen control surface.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualKeyPress {
    pub key: NavKey,
    pub pressed: bool,
}

impl VirtualKeyPress {
    pub fn parse(key: &str, pressed: bool) -> Option<Self> {
        NavKey::from_virtual_name(key).map(|key| Self { key, pressed })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub id: u64,
    pub position: Vec2,
}

/// Platform-neutral input event. Touch events carry the full list of
/// touches still on the surface after the event.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Key { key: NavKey, pressed: bool, repeat: bool },
    Virtual(VirtualKeyPress),
    PointerDown { position: Vec2 },
    PointerMove { position: Vec2 },
    PointerUp,
    PointerLeave,
    TouchStart { touches: Vec<TouchPoint> },
    TouchMove { touches: Vec<TouchPoint> },
    TouchEnd { touches: Vec<TouchPoint>, ended: Vec<u64> },
    TouchCancel { touches: Vec<TouchPoint>, ended: Vec<u64> },
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct TrackedTouch {
    id: u64,
    last: Vec2,
}

pub struct InputState {
    keys_held: HashSet<NavKey>,

    // Pointer drag
    dragging: bool,
    last_cursor: Vec2,

    // Single-finger look drag
    touch: Option<TrackedTouch>,

    mouse_sensitivity: f32,
    touch_sensitivity: f32,
}

impl InputState {
    pub fn new(mouse_sensitivity: f32, touch_sensitivity: f32) -> Self {
        Self {
            keys_held: HashSet::new(),
            dragging: false,
            last_cursor: Vec2::ZERO,
            touch: None,
            mouse_sensitivity,
            touch_sensitivity,
        }
    }

    /// Feed one event into the aggregate.
    /// Returns the (yaw, pitch) delta in radians the event produced, zero if none.
    pub fn process_event(&mut self, event: &InputEvent) -> Vec2 {
        match event {
            InputEvent::Key { key, pressed, repeat } => {
                if !(*pressed && *repeat) {
                    self.set_key(*key, *pressed);
                }
                Vec2::ZERO
            }
            InputEvent::Virtual(press) => {
                self.set_key(press.key, press.pressed);
                Vec2::ZERO
            }
            InputEvent::PointerDown { position } => {
                self.dragging = true;
                self.last_cursor = *position;
                Vec2::ZERO
            }
            InputEvent::PointerMove { position } => {
                if !self.dragging {
                    return Vec2::ZERO;
                }
                let delta = *position - self.last_cursor;
                self.last_cursor = *position;
                look_delta(delta, self.mouse_sensitivity)
            }
            InputEvent::PointerUp | InputEvent::PointerLeave => {
                self.dragging = false;
                Vec2::ZERO
            }
            InputEvent::TouchStart { touches } => {
                if touches.len() == 1 && !self.dragging {
                    let t = touches[0];
                    self.touch = Some(TrackedTouch { id: t.id, last: t.position });
                }
                Vec2::ZERO
            }
            InputEvent::TouchMove { touches } => {
                let Some(tracked) = self.touch else {
                    return Vec2::ZERO;
                };
                match touches.iter().find(|t| t.id == tracked.id) {
                    Some(t) => {
                        let delta = t.position - tracked.last;
                        self.touch = Some(TrackedTouch { id: tracked.id, last: t.position });
                        look_delta(delta, self.touch_sensitivity)
                    }
                    None => {
                        // Tracked finger lifted without an end event reaching us.
                        self.touch = None;
                        Vec2::ZERO
                    }
                }
            }
            InputEvent::TouchEnd { ended, .. } | InputEvent::TouchCancel { ended, .. } => {
                if let Some(tracked) = self.touch {
                    if ended.contains(&tracked.id) {
                        self.touch = None;
                    }
                }
                Vec2::ZERO
            }
        }
    }

    /// Drop all held keys and active gestures.
    pub fn clear(&mut self) {
        self.keys_held.clear();
        self.dragging = false;
        self.touch = None;
    }

    pub fn is_held(&self, key: NavKey) -> bool {
        self.keys_held.contains(&key)
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn is_touch_dragging(&self) -> bool {
        self.touch.is_some()
    }

    pub fn tracked_touch_id(&self) -> Option<u64> {
        self.touch.map(|t| t.id)
    }

    /// Planar intent in camera-local axes: x = strafe right, y = forward.
    /// Opposing keys cancel. Not normalized.
    pub fn movement_axes(&self) -> Vec2 {
        let mut axes = Vec2::ZERO;
        if self.is_held(NavKey::Forward) {
            axes.y += 1.0;
        }
        if self.is_held(NavKey::Back) {
            axes.y -= 1.0;
        }
        if self.is_held(NavKey::StrafeRight) {
            axes.x += 1.0;
        }
        if self.is_held(NavKey::StrafeLeft) {
            axes.x -= 1.0;
        }
        axes
    }

    pub fn sprinting(&self) -> bool {
        self.is_held(NavKey::Sprint)
    }

    fn set_key(&mut self, key: NavKey, pressed: bool) {
        if pressed {
            self.keys_held.insert(key);
        } else {
            self.keys_held.remove(&key);
        }
    }
}

// Dragging right turns left (yaw decreases), dragging down looks up.
fn look_delta(screen_delta: Vec2, sensitivity: f32) -> Vec2 {
    Vec2::new(-screen_delta.x * sensitivity, -screen_delta.y * sensitivity)
}
