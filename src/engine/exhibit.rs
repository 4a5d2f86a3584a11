// Interactive exhibits: hover-gated info panels, exclusive zoom, pinch/wheel
// magnification and screen playback.
//
// The board owns every exhibit plus the hover timers. All callbacks are
// synchronous; the only deferred work is the panel reveal, which fires from
// `advance` and is ignored unless the exhibit still holds that exact handle.

use glam::Vec3;
use std::collections::BTreeMap;
use std::time::Duration;

use super::collision::{CollidableRegistry, NodeId};
use super::config::ExhibitConfig;
use super::input::TouchPoint;
use super::occlusion::{OcclusionProbe, Sightline};
use super::pinch::{self, MagnificationBounds, PinchGesture};
use super::timer::{DelayTimers, TimerHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExhibitId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExhibitKind {
    Artwork,
    Sculpture,
    Screen,
}

impl ExhibitKind {
    pub fn zoomable(self) -> bool {
        matches!(self, Self::Artwork)
    }

    pub fn has_hover_panel(self) -> bool {
        matches!(self, Self::Artwork | Self::Sculpture)
    }

    pub fn plays_media(self) -> bool {
        matches!(self, Self::Screen)
    }
}

#[derive(Debug, Clone)]
pub struct Exhibit {
    pub id: ExhibitId,
    pub kind: ExhibitKind,
    pub title: String,
    pub description: String,
    /// Point the sightline probe aims at.
    pub anchor: Vec3,
    /// Collidable subtree that belongs to this exhibit, skipped by its own sightline.
    pub root: Option<NodeId>,

    pub zoomed: bool,
    pub magnification: f32,
    pub panel_visible: bool,
    pub playing: bool,

    hover_timer: Option<TimerHandle>,
    pinch: PinchGesture,
}

impl Exhibit {
    pub fn new(id: ExhibitId, kind: ExhibitKind, title: impl Into<String>, anchor: Vec3) -> Self {
        Self {
            id,
            kind,
            title: title.into(),
            description: String::new(),
            anchor,
            root: None,
            zoomed: false,
            magnification: 1.0,
            panel_visible: false,
            playing: false,
            hover_timer: None,
            pinch: PinchGesture::default(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_root(mut self, root: NodeId) -> Self {
        self.root = Some(root);
        self
    }

    pub fn hover_pending(&self) -> bool {
        self.hover_timer.is_some()
    }

    pub fn pinch(&self) -> &PinchGesture {
        &self.pinch
    }
}

pub struct ExhibitBoard {
    exhibits: BTreeMap<ExhibitId, Exhibit>,
    timers: DelayTimers<ExhibitId>,
    config: ExhibitConfig,
    probe: OcclusionProbe,
}

impl ExhibitBoard {
    pub fn new(config: ExhibitConfig) -> Self {
        let probe = OcclusionProbe::new(config.obstruction_tolerance);
        Self { exhibits: BTreeMap::new(), timers: DelayTimers::new(), config, probe }
    }

    pub fn config(&self) -> &ExhibitConfig {
        &self.config
    }

    /// Insert or replace an exhibit. A replaced exhibit's pending timer is cancelled.
    pub fn add(&mut self, exhibit: Exhibit) {
        let id = exhibit.id;
        if let Some(old) = self.exhibits.insert(id, exhibit) {
            if let Some(handle) = old.hover_timer {
                self.timers.cancel(handle);
            }
            log::debug!("exhibit {id:?} replaced");
        }
    }

    pub fn remove(&mut self, id: ExhibitId) -> Option<Exhibit> {
        let mut removed = self.exhibits.remove(&id)?;
        if let Some(handle) = removed.hover_timer.take() {
            self.timers.cancel(handle);
        }
        Some(removed)
    }

    pub fn get(&self, id: ExhibitId) -> Option<&Exhibit> {
        self.exhibits.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Exhibit> {
        self.exhibits.values()
    }

    pub fn len(&self) -> usize {
        self.exhibits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exhibits.is_empty()
    }

    pub fn zoomed(&self) -> Option<ExhibitId> {
        self.exhibits.values().find(|e| e.zoomed).map(|e| e.id)
    }

    pub fn find_by_root(&self, root: NodeId) -> Option<ExhibitId> {
        self.exhibits.values().find(|e| e.root == Some(root)).map(|e| e.id)
    }

    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    // ------------------------------------------------------------------------
    // Hover
    // ------------------------------------------------------------------------

    /// Arm the info panel if the exhibit is in plain sight.
    pub fn pointer_enter(
        &mut self,
        id: ExhibitId,
        eye: Option<Vec3>,
        registry: Option<&CollidableRegistry>,
    ) {
        if self.zoomed().is_some() {
            log::trace!("pointer enter {id:?} ignored while zoomed");
            return;
        }
        let Some(exhibit) = self.exhibits.get(&id) else {
            log::debug!("pointer enter on unknown exhibit {id:?}");
            return;
        };
        if !exhibit.kind.has_hover_panel() {
            return;
        }
        let (Some(eye), Some(registry)) = (eye, registry) else {
            log::debug!("pointer enter {id:?} skipped: no viewpoint or collidables");
            return;
        };

        match self.probe.probe(eye, exhibit.anchor, exhibit.root, registry) {
            Sightline::Clear => self.arm_panel(id),
            Sightline::Obstructed { by, distance } => {
                log::debug!("exhibit {id:?} hidden behind {by:?} at {distance:.2}");
                self.hide_panel(id);
            }
        }
    }

    pub fn pointer_leave(&mut self, id: ExhibitId) {
        self.hide_panel(id);
    }

    fn arm_panel(&mut self, id: ExhibitId) {
        let delay = self.config.hover_delay();
        let Some(exhibit) = self.exhibits.get_mut(&id) else {
            return;
        };
        if let Some(old) = exhibit.hover_timer.take() {
            self.timers.cancel(old);
        }
        exhibit.hover_timer = Some(self.timers.schedule(delay, id));
    }

    fn hide_panel(&mut self, id: ExhibitId) {
        let Some(exhibit) = self.exhibits.get_mut(&id) else {
            return;
        };
        if let Some(handle) = exhibit.hover_timer.take() {
            self.timers.cancel(handle);
        }
        exhibit.panel_visible = false;
    }

    /// Advance the hover clock and reveal panels whose delay elapsed.
    pub fn advance(&mut self, elapsed: Duration) {
        for (handle, id) in self.timers.advance(elapsed) {
            let Some(exhibit) = self.exhibits.get_mut(&id) else {
                continue;
            };
            if exhibit.hover_timer != Some(handle) {
                log::trace!("stale hover timer for {id:?}");
                continue;
            }
            exhibit.hover_timer = None;
            exhibit.panel_visible = true;
            log::debug!("info panel shown for {id:?}");
        }
    }

    // ------------------------------------------------------------------------
    // Zoom
    // ------------------------------------------------------------------------

    /// Toggle zoom on `id`. Zooming one exhibit releases any other.
    pub fn toggle_zoom(&mut self, id: ExhibitId) {
        let Some(exhibit) = self.exhibits.get(&id) else {
            log::debug!("zoom toggle on unknown exhibit {id:?}");
            return;
        };
        if !exhibit.kind.zoomable() {
            return;
        }
        let entering = !exhibit.zoomed;

        if entering {
            let ids: Vec<ExhibitId> = self.exhibits.keys().copied().collect();
            for other in ids {
                self.hide_panel(other);
            }
        } else {
            self.hide_panel(id);
        }

        let entry = self.config.zoom_entry_magnification;
        for exhibit in self.exhibits.values_mut() {
            let zoom = entering && exhibit.id == id;
            if exhibit.zoomed && !zoom {
                exhibit.zoomed = false;
                exhibit.pinch.reset();
            }
            if zoom {
                exhibit.zoomed = true;
                exhibit.magnification = entry;
            }
        }
        log::debug!("exhibit {id:?} zoom {}", if entering { "on" } else { "off" });
    }

    pub fn wheel(&mut self, id: ExhibitId, delta_y: f32) {
        let bounds = self.bounds();
        let sensitivity = self.config.wheel_sensitivity;
        if let Some(exhibit) = self.exhibits.get_mut(&id).filter(|e| e.zoomed) {
            exhibit.magnification =
                pinch::apply_wheel(exhibit.magnification, delta_y, sensitivity, bounds);
        }
    }

    fn bounds(&self) -> MagnificationBounds {
        MagnificationBounds {
            min: self.config.min_magnification,
            max: self.config.max_magnification,
        }
    }

    // ------------------------------------------------------------------------
    // Pinch
    // ------------------------------------------------------------------------

    pub fn pinch_active(&self) -> bool {
        self.exhibits.values().any(|e| e.pinch.is_active())
    }

    /// Returns true if the zoomed exhibit claimed the touch start.
    pub fn pinch_start(&mut self, touches: &[TouchPoint]) -> bool {
        let Some(exhibit) = self.exhibits.values_mut().find(|e| e.zoomed) else {
            return false;
        };
        exhibit.pinch.touch_start(touches, exhibit.zoomed)
    }

    pub fn pinch_move(&mut self, touches: &[TouchPoint]) -> bool {
        let bounds = self.bounds();
        let sensitivity = self.config.pinch_sensitivity;
        let Some(exhibit) = self.exhibits.values_mut().find(|e| e.pinch.is_active()) else {
            return false;
        };
        let zoomed = exhibit.zoomed;
        exhibit.pinch.touch_move(touches, zoomed, sensitivity, bounds, &mut exhibit.magnification)
    }

    pub fn pinch_end(&mut self, remaining: &[TouchPoint]) -> bool {
        self.exhibits.values_mut().any(|e| e.pinch.touch_end(remaining))
    }

    // ------------------------------------------------------------------------
    // Screen
    // ------------------------------------------------------------------------

    /// Toggle playback if the screen is visible from `eye`. Returns the new state when toggled.
    pub fn screen_click(
        &mut self,
        id: ExhibitId,
        eye: Option<Vec3>,
        registry: Option<&CollidableRegistry>,
    ) -> Option<bool> {
        let exhibit = self.exhibits.get(&id).filter(|e| e.kind.plays_media())?;
        let (Some(eye), Some(registry)) = (eye, registry) else {
            log::debug!("screen click {id:?} skipped: no viewpoint or collidables");
            return None;
        };
        if !self.probe.probe(eye, exhibit.anchor, exhibit.root, registry).is_clear() {
            log::debug!("screen {id:?} is obstructed, click ignored");
            return None;
        }
        let exhibit = self.exhibits.get_mut(&id)?;
        exhibit.playing = !exhibit.playing;
        log::debug!("screen {id:?} playing={}", exhibit.playing);
        Some(exhibit.playing)
    }
}
