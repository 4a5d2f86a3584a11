// Static collidable geometry and ray queries.
//
// The registry is a tree: leaves carry a shape (oriented box or sphere),
// groups carry children. Ray queries walk the whole tree and report every
// hit with the chain of group ids above it, so callers can tell whether a
// hit belongs to a particular subtree.
//
// Only entry hits are reported. A ray starting inside a shape does not hit it,
// matching front-face-only picking.

use glam::{Mat3, Vec3};

/// Stable identity of a collidable node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

// ============================================================================
// SHAPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length
    pub direction: Vec3,
}

impl Ray {
    /// `None` if `direction` has no length.
    pub fn new(origin: Vec3, direction: Vec3) -> Option<Self> {
        let direction = direction.normalize_or_zero();
        (direction != Vec3::ZERO).then_some(Self { origin, direction })
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Oriented box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obb {
    pub center: Vec3,
    pub half_extents: Vec3,
    pub rotation: Mat3,
}

impl Obb {
    pub fn axis_aligned(center: Vec3, half_extents: Vec3) -> Self {
        Self { center, half_extents, rotation: Mat3::IDENTITY }
    }

    /// Slab test in box-local space. Returns the entry distance.
    pub fn ray_entry(&self, ray: &Ray) -> Option<f32> {
        let inv_rot = self.rotation.transpose();
        let o = inv_rot * (ray.origin - self.center);
        let d = inv_rot * ray.direction;

        let mut t_near = f32::NEG_INFINITY;
        let mut t_far = f32::INFINITY;
        for axis in 0..3 {
            let (o, d, h) = (o[axis], d[axis], self.half_extents[axis]);
            if d.abs() < 1e-9 {
                // Parallel to this slab: inside or never.
                if o < -h || o > h {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / d;
            let (mut t0, mut t1) = ((-h - o) * inv, (h - o) * inv);
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_near = t_near.max(t0);
            t_far = t_far.min(t1);
            if t_near > t_far {
                return None;
            }
        }
        (t_near >= 0.0).then_some(t_near)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Box(Obb),
    Sphere { center: Vec3, radius: f32 },
}

impl Shape {
    pub fn ray_entry(&self, ray: &Ray) -> Option<f32> {
        match self {
            Shape::Box(obb) => obb.ray_entry(ray),
            Shape::Sphere { center, radius } => ray_sphere(ray, *center, *radius),
        }
    }
}

fn ray_sphere(ray: &Ray, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray.origin - center;
    let b = oc.dot(ray.direction);
    let c = oc.dot(oc) - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let t = -b - disc.sqrt();
    (t >= 0.0).then_some(t)
}

// ============================================================================
// REGISTRY
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct CollidableNode {
    pub id: NodeId,
    pub label: String,
    pub shape: Option<Shape>,
    pub children: Vec<CollidableNode>,
}

impl CollidableNode {
    pub fn leaf(id: NodeId, label: impl Into<String>, shape: Shape) -> Self {
        Self { id, label: label.into(), shape: Some(shape), children: Vec::new() }
    }

    pub fn group(id: NodeId, label: impl Into<String>, children: Vec<CollidableNode>) -> Self {
        Self { id, label: label.into(), shape: None, children }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RayHit {
    pub node: NodeId,
    pub distance: f32,
    pub point: Vec3,
    /// Group ids from the outermost ancestor down to the direct parent.
    pub ancestors: Vec<NodeId>,
}

impl RayHit {
    /// True if the hit node is `root` or lies anywhere under it.
    pub fn belongs_to(&self, root: NodeId) -> bool {
        self.node == root || self.ancestors.contains(&root)
    }
}

/// Ordered snapshot of static geometry. Rebuilt by the scene, never mutated by navigation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollidableRegistry {
    roots: Vec<CollidableNode>,
}

impl CollidableRegistry {
    pub fn new(roots: Vec<CollidableNode>) -> Self {
        Self { roots }
    }

    pub fn roots(&self) -> &[CollidableNode] {
        &self.roots
    }

    /// True if the tree contains no shapes at all.
    pub fn is_empty(&self) -> bool {
        fn any_shape(nodes: &[CollidableNode]) -> bool {
            nodes.iter().any(|n| n.shape.is_some() || any_shape(&n.children))
        }
        !any_shape(&self.roots)
    }

    /// Every hit along `ray` with distance in `[0, far]`, nearest first.
    /// Ties keep registry order.
    pub fn raycast(&self, ray: &Ray, far: f32) -> Vec<RayHit> {
        let mut hits = Vec::new();
        let mut path = Vec::new();
        for node in &self.roots {
            collect_hits(node, ray, far, &mut path, &mut hits);
        }
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    pub fn find(&self, id: NodeId) -> Option<&CollidableNode> {
        fn walk(nodes: &[CollidableNode], id: NodeId) -> Option<&CollidableNode> {
            nodes.iter().find_map(|n| if n.id == id { Some(n) } else { walk(&n.children, id) })
        }
        walk(&self.roots, id)
    }
}

fn collect_hits(
    node: &CollidableNode,
    ray: &Ray,
    far: f32,
    path: &mut Vec<NodeId>,
    out: &mut Vec<RayHit>,
) {
    if let Some(shape) = &node.shape {
        if let Some(t) = shape.ray_entry(ray) {
            if t <= far {
                out.push(RayHit {
                    node: node.id,
                    distance: t,
                    point: ray.at(t),
                    ancestors: path.clone(),
                });
            }
        }
    }
    if !node.children.is_empty() {
        path.push(node.id);
        for child in &node.children {
            collect_hits(child, ray, far, path, out);
        }
        path.pop();
    }
}

// ============================================================================
// RESOLVER
// ============================================================================

/// Largest displacement allowed by an obstruction `hit_distance` ahead.
///
/// Always within `[0, intended]` and never more than `hit_distance - buffer`.
pub fn clamp_displacement(intended: f32, hit_distance: Option<f32>, buffer: f32) -> f32 {
    let intended = intended.max(0.0);
    match hit_distance {
        Some(d) => intended.min((d - buffer).max(0.0)),
        None => intended,
    }
}

pub struct CollisionResolver {
    pub buffer: f32,
    pub hit_epsilon: f32,
}

impl CollisionResolver {
    pub fn new(buffer: f32, hit_epsilon: f32) -> Self {
        Self { buffer, hit_epsilon }
    }

    /// How far the viewpoint may travel from `origin` along the unit `direction`.
    /// With no registry, or an empty one, the full intended length is allowed.
    pub fn allowed_length(
        &self,
        origin: Vec3,
        direction: Vec3,
        intended: f32,
        registry: Option<&CollidableRegistry>,
    ) -> f32 {
        let Some(registry) = registry.filter(|r| !r.is_empty()) else {
            log::trace!("no collidables loaded, movement unclamped");
            return intended.max(0.0);
        };
        let Some(ray) = Ray::new(origin, direction) else {
            return 0.0;
        };

        let far = intended.max(0.0) + self.buffer;
        let nearest = registry
            .raycast(&ray, far)
            .into_iter()
            .find(|hit| hit.distance > self.hit_epsilon);

        if let Some(hit) = &nearest {
            log::trace!("movement ray hits {:?} at {:.3}", hit.node, hit.distance);
        }
        clamp_displacement(intended, nearest.map(|h| h.distance), self.buffer)
    }
}
