// Two-finger pinch gesture on a zoomed exhibit.
//
// State machine:
//   Idle   -> Active  two touches at touch start while the exhibit is zoomed
//   Active -> Active  two-finger move: scale by distance ratio, then re-anchor
//   Active -> Idle    fewer than two touches remain
//
// Deltas are frame-to-frame: the reference distance is replaced after every
// applied move, so the product of ratios equals the overall spread.

use super::input::TouchPoint;

/// Distances below this are treated as a collapsed pinch and never divided by.
const MIN_REFERENCE_DISTANCE: f32 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PinchPhase {
    #[default]
    Idle,
    Active { reference_distance: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MagnificationBounds {
    pub min: f32,
    pub max: f32,
}

impl MagnificationBounds {
    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PinchGesture {
    phase: PinchPhase,
}

impl PinchGesture {
    pub fn phase(&self) -> PinchPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase, PinchPhase::Active { .. })
    }

    /// Reference distance, 0 while idle.
    pub fn reference_distance(&self) -> f32 {
        match self.phase {
            PinchPhase::Idle => 0.0,
            PinchPhase::Active { reference_distance } => reference_distance,
        }
    }

    /// Returns true if the gesture took ownership of this touch start.
    pub fn touch_start(&mut self, touches: &[TouchPoint], zoomed: bool) -> bool {
        if !zoomed {
            return false;
        }
        match finger_distance(touches) {
            Some(reference_distance) => {
                self.phase = PinchPhase::Active { reference_distance };
                log::debug!("pinch started at {reference_distance:.1}px");
                true
            }
            None => false,
        }
    }

    /// Apply a two-finger move to `magnification`. Returns true if the gesture consumed the event.
    pub fn touch_move(
        &mut self,
        touches: &[TouchPoint],
        zoomed: bool,
        sensitivity: f32,
        bounds: MagnificationBounds,
        magnification: &mut f32,
    ) -> bool {
        let PinchPhase::Active { reference_distance } = self.phase else {
            return false;
        };
        if !zoomed {
            return false;
        }
        let Some(current) = finger_distance(touches) else {
            return false;
        };

        if reference_distance >= MIN_REFERENCE_DISTANCE {
            let delta = (current / reference_distance - 1.0) * sensitivity;
            *magnification = bounds.clamp(*magnification * (1.0 + delta));
        }
        self.phase = PinchPhase::Active { reference_distance: current };
        true
    }

    /// `remaining` is the touch list after the end/cancel. Returns true if the gesture ended.
    pub fn touch_end(&mut self, remaining: &[TouchPoint]) -> bool {
        if self.is_active() && remaining.len() < 2 {
            self.phase = PinchPhase::Idle;
            log::debug!("pinch ended");
            return true;
        }
        false
    }

    pub fn reset(&mut self) {
        self.phase = PinchPhase::Idle;
    }
}

/// Additive wheel path to the same magnification value.
/// `delta_y` follows the browser convention: positive scrolls down and zooms out.
pub fn apply_wheel(
    magnification: f32,
    delta_y: f32,
    sensitivity: f32,
    bounds: MagnificationBounds,
) -> f32 {
    bounds.clamp(magnification + (-delta_y * sensitivity))
}

fn finger_distance(touches: &[TouchPoint]) -> Option<f32> {
    match touches {
        [a, b] => Some(a.position.distance(b.position)),
        _ => None,
    }
}
