// Cursor picking: screen ray, hovered-exhibit transitions, double-click detection.

use glam::{Vec2, Vec3};
use std::time::Duration;

use super::camera::Viewpoint;
use super::collision::{CollidableRegistry, Ray};
use super::exhibit::{ExhibitBoard, ExhibitId};

/// World-space ray through `cursor` (physical pixels, origin top-left).
pub fn screen_ray(viewpoint: &Viewpoint, viewport: Vec2, cursor: Vec2) -> Option<Ray> {
    if viewport.x <= 0.0 || viewport.y <= 0.0 {
        return None;
    }
    let ndc = Vec2::new(2.0 * cursor.x / viewport.x - 1.0, 1.0 - 2.0 * cursor.y / viewport.y);
    let inv = viewpoint.view_projection(viewport.x / viewport.y).inverse();
    let near = inv.project_point3(Vec3::new(ndc.x, ndc.y, 0.0));
    let far = inv.project_point3(Vec3::new(ndc.x, ndc.y, 1.0));
    Ray::new(near, far - near)
}

/// Exhibit owning the nearest surface along `ray`. Anything else in front blocks the pick.
pub fn pick_exhibit(
    registry: &CollidableRegistry,
    ray: &Ray,
    board: &ExhibitBoard,
) -> Option<ExhibitId> {
    let hit = registry.raycast(ray, f32::INFINITY).into_iter().next()?;
    std::iter::once(hit.node)
        .chain(hit.ancestors.iter().rev().copied())
        .find_map(|node| board.find_by_root(node))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverChange {
    Enter(ExhibitId),
    Leave(ExhibitId),
}

#[derive(Debug, Default)]
pub struct HoverTracker {
    current: Option<ExhibitId>,
}

impl HoverTracker {
    pub fn current(&self) -> Option<ExhibitId> {
        self.current
    }

    /// Leave is always reported before enter.
    pub fn update(&mut self, hovered: Option<ExhibitId>) -> Vec<HoverChange> {
        if hovered == self.current {
            return Vec::new();
        }
        let mut changes = Vec::with_capacity(2);
        if let Some(old) = self.current {
            changes.push(HoverChange::Leave(old));
        }
        if let Some(new) = hovered {
            changes.push(HoverChange::Enter(new));
        }
        self.current = hovered;
        changes
    }
}

pub struct ClickTracker {
    window: Duration,
    last: Option<(ExhibitId, Duration)>,
}

impl ClickTracker {
    pub fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    /// Record a click at time `at`. True when it completes a double-click on the same exhibit.
    pub fn click(&mut self, id: ExhibitId, at: Duration) -> bool {
        if let Some((prev, when)) = self.last {
            if prev == id && at.saturating_sub(when) <= self.window {
                self.last = None;
                return true;
            }
        }
        self.last = Some((id, at));
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::collision::{CollidableNode, NodeId, Obb, Shape};
    use crate::engine::config::ExhibitConfig;
    use crate::engine::exhibit::{Exhibit, ExhibitKind};

    #[test]
    fn centre_of_screen_looks_forward() {
        let vp = Viewpoint::new(Vec3::new(0.0, 5.0, 8.0));
        let ray = screen_ray(&vp, Vec2::new(800.0, 600.0), Vec2::new(400.0, 300.0)).unwrap();
        assert!((ray.direction - Vec3::NEG_Z).length() < 1e-3);
    }

    #[test]
    fn left_half_points_left() {
        let vp = Viewpoint::new(Vec3::ZERO);
        let ray = screen_ray(&vp, Vec2::new(800.0, 600.0), Vec2::new(100.0, 300.0)).unwrap();
        assert!(ray.direction.x < 0.0);
        assert!(screen_ray(&vp, Vec2::ZERO, Vec2::ZERO).is_none());
    }

    #[test]
    fn nearest_surface_decides_pick() {
        let mut board = ExhibitBoard::new(ExhibitConfig::default());
        board.add(
            Exhibit::new(ExhibitId(7), ExhibitKind::Sculpture, "Bust", Vec3::new(0.0, 0.0, -10.0))
                .with_root(NodeId(100)),
        );

        let bust = CollidableNode::group(
            NodeId(100),
            "bust",
            vec![CollidableNode::leaf(
                NodeId(101),
                "head",
                Shape::Sphere { center: Vec3::new(0.0, 0.0, -10.0), radius: 1.0 },
            )],
        );
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z).unwrap();
        let open = CollidableRegistry::new(vec![bust.clone()]);
        assert_eq!(pick_exhibit(&open, &ray, &board), Some(ExhibitId(7)));

        let glass = Obb::axis_aligned(Vec3::new(0.0, 0.0, -5.0), Vec3::ONE);
        let screen = CollidableNode::leaf(NodeId(1), "glass", Shape::Box(glass));
        let blocked = CollidableRegistry::new(vec![screen, bust]);
        assert_eq!(pick_exhibit(&blocked, &ray, &board), None);
    }

    #[test]
    fn hover_transitions() {
        let mut hover = HoverTracker::default();
        assert_eq!(hover.update(Some(ExhibitId(1))), vec![HoverChange::Enter(ExhibitId(1))]);
        assert!(hover.update(Some(ExhibitId(1))).is_empty());
        assert_eq!(
            hover.update(Some(ExhibitId(2))),
            vec![HoverChange::Leave(ExhibitId(1)), HoverChange::Enter(ExhibitId(2))]
        );
        assert_eq!(hover.update(None), vec![HoverChange::Leave(ExhibitId(2))]);
    }

    #[test]
    fn double_click_within_window_on_same_exhibit() {
        let mut clicks = ClickTracker::new(Duration::from_millis(300));
        let a = ExhibitId(1);
        assert!(!clicks.click(a, Duration::from_millis(1000)));
        assert!(clicks.click(a, Duration::from_millis(1250)));
        // Third click starts a new pair.
        assert!(!clicks.click(a, Duration::from_millis(1300)));
        assert!(!clicks.click(ExhibitId(2), Duration::from_millis(1350)));
        assert!(!clicks.click(a, Duration::from_millis(2000)));
    }
}
