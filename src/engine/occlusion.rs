// Line-of-sight probe between the viewpoint and an exhibit anchor.
// Used to gate hover panels and screen clicks: an exhibit only reacts when
// nothing but its own geometry lies between it and the viewer.

use glam::Vec3;

use super::collision::{CollidableRegistry, NodeId, Ray};

#[derive(Debug, Clone, PartialEq)]
pub enum Sightline {
    Clear,
    Obstructed { by: NodeId, distance: f32 },
}

impl Sightline {
    pub fn is_clear(&self) -> bool {
        matches!(self, Sightline::Clear)
    }
}

pub struct OcclusionProbe {
    /// A non-self hit must be closer than `anchor distance - tolerance` to count.
    pub tolerance: f32,
}

impl OcclusionProbe {
    pub fn new(tolerance: f32) -> Self {
        Self { tolerance }
    }

    /// Cast from `eye` toward `anchor` and report the first non-self hit that sits
    /// in front of the anchor. Hits on `own_root` or anything grouped under it are skipped.
    pub fn probe(
        &self,
        eye: Vec3,
        anchor: Vec3,
        own_root: Option<NodeId>,
        registry: &CollidableRegistry,
    ) -> Sightline {
        let Some(ray) = Ray::new(eye, anchor - eye) else {
            // Eye sits on the anchor; nothing can be in between.
            return Sightline::Clear;
        };
        let anchor_distance = eye.distance(anchor);

        for hit in registry.raycast(&ray, f32::INFINITY) {
            if own_root.is_some_and(|root| hit.belongs_to(root)) {
                log::trace!("sightline skips self hit {:?} at {:.2}", hit.node, hit.distance);
                continue;
            }
            if hit.distance < anchor_distance - self.tolerance {
                log::trace!(
                    "sightline obstructed by {:?} at {:.2} (anchor at {:.2})",
                    hit.node, hit.distance, anchor_distance
                );
                return Sightline::Obstructed { by: hit.node, distance: hit.distance };
            }
            // Hits are sorted, so nothing after this one can be closer.
            break;
        }
        Sightline::Clear
    }
}
