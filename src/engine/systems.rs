// ECS passes over the exhibition layout
// Derive the collidable registry, the pick registry and the per-frame draw list from entities

use bevy_ecs::prelude::*;
use glam::{Mat4, Vec3};
use std::collections::BTreeMap;

use super::collision::{CollidableNode, CollidableRegistry, NodeId};
use super::components::*;
use super::exhibition::Exhibition;

/// Distance in front of the viewer at which a zoomed exhibit is shown.
const ZOOM_DISTANCE: f32 = 3.0;
/// On-screen height of a zoomed exhibit at magnification 1, in world units at `ZOOM_DISTANCE`.
const ZOOM_BASE_HEIGHT: f32 = 1.2;

/// Set whenever entities with colliders are spawned, moved or despawned.
#[derive(Resource, Debug, Default)]
pub struct LayoutDirty(pub bool);

pub fn mark_layout_dirty(world: &mut World) {
    world.get_resource_or_insert_with(LayoutDirty::default).0 = true;
}

/// Build a registry from colliders. `solid_only` keeps just the movement/sightline blockers.
/// Roots and group children are ordered by node id so the snapshot is stable.
pub fn build_registry(world: &mut World, solid_only: bool) -> CollidableRegistry {
    let mut loose = Vec::new();
    let mut groups: BTreeMap<NodeId, (String, Vec<CollidableNode>)> = BTreeMap::new();

    let mut query = world.query::<(&Collider, &Transform, Option<&PartOf>, Has<Solid>)>();
    for (collider, transform, part_of, solid) in query.iter(world) {
        if solid_only && !solid {
            continue;
        }
        let leaf =
            CollidableNode::leaf(collider.node, collider.label.clone(), collider.shape(transform));
        match part_of {
            Some(part) => groups
                .entry(part.group)
                .or_insert_with(|| (part.label.clone(), Vec::new()))
                .1
                .push(leaf),
            None => loose.push(leaf),
        }
    }

    let mut roots = loose;
    for (id, (label, mut children)) in groups {
        children.sort_by_key(|c| c.id);
        roots.push(CollidableNode::group(id, label, children));
    }
    roots.sort_by_key(|n| n.id);
    CollidableRegistry::new(roots)
}

pub fn rebuild_collidables(world: &mut World) -> CollidableRegistry {
    build_registry(world, true)
}

pub fn rebuild_pick_targets(world: &mut World) -> CollidableRegistry {
    build_registry(world, false)
}

/// Refresh the exhibition snapshot and `pick_targets` if the layout changed.
/// Returns true when a rebuild happened.
pub fn sync_layout(
    world: &mut World,
    exhibition: &mut Exhibition,
    pick_targets: &mut CollidableRegistry,
) -> bool {
    let dirty = world.get_resource::<LayoutDirty>().is_some_and(|d| d.0);
    if !dirty {
        return false;
    }
    let collidables = rebuild_collidables(world);
    *pick_targets = rebuild_pick_targets(world);
    log::debug!(
        "layout rebuilt: {} collidable roots, {} pick roots",
        collidables.roots().len(),
        pick_targets.roots().len()
    );
    exhibition.set_collidables(Some(collidables));
    world.insert_resource(LayoutDirty(false));
    true
}

/// One instanced cube to draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawBox {
    pub model: Mat4,
    pub color: [f32; 4],
}

/// Collect every colored entity. Parts of a zoomed exhibit are lifted in front of the viewer.
pub fn collect_draw_boxes(world: &mut World, exhibition: &Exhibition) -> Vec<DrawBox> {
    let viewpoint = exhibition.viewpoint();
    let zoom = exhibition.exhibits().zoomed().and_then(|id| exhibition.exhibit(id));

    let mut boxes = Vec::new();
    let mut query = world.query::<(&Transform, &Color, Option<&ExhibitPart>)>();
    for (transform, color, part) in query.iter(world) {
        let model = match (zoom, part) {
            (Some(zoomed), Some(ExhibitPart(id))) if zoomed.id == *id => {
                let rotation = viewpoint.orientation.quat();
                let forward = viewpoint.orientation.look_direction();
                let center = viewpoint.position + forward * ZOOM_DISTANCE;
                let height = transform.scale.y.max(f32::EPSILON);
                let fit = ZOOM_BASE_HEIGHT * zoomed.magnification / height;
                let scale = transform.scale * Vec3::new(fit, fit, 1.0);
                Mat4::from_scale_rotation_translation(scale, rotation, center)
            }
            _ => transform.matrix(),
        };
        boxes.push(DrawBox { model, color: [color.r, color.g, color.b, 1.0] });
    }
    boxes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::collision::Ray;
    use crate::engine::config::AtriumConfig;
    use crate::engine::exhibit::{Exhibit, ExhibitId, ExhibitKind};

    fn slab(world: &mut World, id: u32, z: f32) -> Entity {
        world
            .spawn((
                Transform::from_position(Vec3::new(0.0, 5.0, z))
                    .with_scale(Vec3::new(10.0, 10.0, 0.2)),
                Collider::cuboid(NodeId(id), "slab"),
                Solid,
                Color::rgb(0.5, 0.5, 0.5),
            ))
            .id()
    }

    #[test]
    fn pick_targets_include_non_solid_colliders() {
        let mut world = World::new();
        slab(&mut world, 1, -10.0);
        world.spawn((
            Transform::from_position(Vec3::new(0.0, 5.0, -9.8))
                .with_scale(Vec3::new(4.0, 3.0, 0.1)),
            Collider::cuboid(NodeId(2), "painting"),
        ));

        assert_eq!(rebuild_collidables(&mut world).roots().len(), 1);
        assert_eq!(rebuild_pick_targets(&mut world).roots().len(), 2);
    }

    #[test]
    fn parts_are_grouped_and_sorted() {
        let mut world = World::new();
        for (id, x) in [(12, 4.0), (11, -4.0)] {
            world.spawn((
                Transform::from_position(Vec3::new(x, 5.0, -10.0))
                    .with_scale(Vec3::new(2.0, 10.0, 1.0)),
                Collider::cuboid(NodeId(id), "divider part"),
                PartOf::new(NodeId(10), "divider"),
                Solid,
            ));
        }
        slab(&mut world, 1, -20.0);

        let registry = rebuild_collidables(&mut world);
        let roots = registry.roots();
        assert_eq!(roots.iter().map(|n| n.id).collect::<Vec<_>>(), vec![NodeId(1), NodeId(10)]);
        let children: Vec<_> = roots[1].children.iter().map(|n| n.id).collect();
        assert_eq!(children, vec![NodeId(11), NodeId(12)]);

        let ray = Ray::new(Vec3::new(-4.0, 5.0, 0.0), Vec3::NEG_Z).unwrap();
        let hits = registry.raycast(&ray, 100.0);
        assert!(hits[0].belongs_to(NodeId(10)));
    }

    #[test]
    fn sync_only_runs_when_dirty() {
        let mut world = World::new();
        let mut exhibition = Exhibition::new(AtriumConfig::default());
        let mut picks = CollidableRegistry::default();
        slab(&mut world, 1, -10.0);

        assert!(!sync_layout(&mut world, &mut exhibition, &mut picks));
        assert!(exhibition.collidables().is_none());

        mark_layout_dirty(&mut world);
        assert!(sync_layout(&mut world, &mut exhibition, &mut picks));
        assert!(exhibition.collidables().is_some());
        assert!(!picks.is_empty());
        assert!(!sync_layout(&mut world, &mut exhibition, &mut picks));
    }

    #[test]
    fn zoomed_exhibit_is_drawn_in_front_of_viewer() {
        let mut world = World::new();
        let mut exhibition = Exhibition::new(AtriumConfig::default());
        let art = ExhibitId(3);
        let anchor = Vec3::new(-9.8, 5.0, 6.0);
        exhibition.add_exhibit(Exhibit::new(art, ExhibitKind::Artwork, "Art", anchor));
        world.spawn((
            Transform::from_position(anchor).with_scale(Vec3::new(4.0, 3.0, 0.1)),
            Color::rgb(1.0, 0.0, 0.0),
            ExhibitPart(art),
        ));

        let before = collect_draw_boxes(&mut world, &exhibition);
        assert_eq!(before[0].model.w_axis.truncate(), Vec3::new(-9.8, 5.0, 6.0));

        exhibition.on_toggle_zoom(art);
        let after = collect_draw_boxes(&mut world, &exhibition);
        let center = after[0].model.w_axis.truncate();
        let expected = exhibition.viewpoint().position + Vec3::NEG_Z * ZOOM_DISTANCE;
        assert!((center - expected).length() < 1e-4);
    }
}
