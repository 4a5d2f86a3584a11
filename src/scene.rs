// Gallery layout
//
// Rooms (x right, z toward the entrance):
//   front hall  x -9.8..9.8,  z -10.5..14.8   entrance artwork + two per side wall
//   back hall   x -9.8..9.8,  z -24.8..-9.5   sculpture
//   new room    x  9.8..29.4                  video screen on the entrance wall
// A divider at z = -10 with an 8-wide, 10-high opening separates the halls.

use bevy_ecs::prelude::*;
use glam::Vec3;
use std::f32::consts::{FRAC_PI_2, PI};

use crate::engine::collision::NodeId;
use crate::engine::components::{Collider, Color, ExhibitPart, PartOf, Solid, Transform};
use crate::engine::exhibit::{Exhibit, ExhibitId, ExhibitKind};
use crate::engine::exhibition::Exhibition;
use crate::engine::systems::mark_layout_dirty;

pub const WALL_HEIGHT: f32 = 12.1;
pub const WALL_THICKNESS: f32 = 0.2;
pub const DIVIDER_Z: f32 = -10.0;
pub const DIVIDER_THICKNESS: f32 = 1.0;
pub const OPENING_WIDTH: f32 = 8.0;
pub const OPENING_HEIGHT: f32 = 10.0;
const HALL_WIDTH: f32 = 19.6;

/// Where the viewer looks on startup.
pub const START_LOOK_AT: Vec3 = Vec3::new(0.0, 5.0, 0.0);

const WALL: Color = Color::rgb(0.82, 0.80, 0.76);
const FLOOR: Color = Color::rgb(0.35, 0.30, 0.26);
const CEILING: Color = Color::rgb(0.92, 0.92, 0.92);
const STONE: Color = Color::rgb(0.75, 0.74, 0.70);
const CANVAS: Color = Color::rgb(0.55, 0.36, 0.22);
const SCREEN: Color = Color::rgb(0.05, 0.05, 0.08);

pub mod ids {
    use super::{ExhibitId, NodeId};

    pub const FLOOR: NodeId = NodeId(1);
    pub const CEILING: NodeId = NodeId(2);
    pub const LEFT_WALL: NodeId = NodeId(3);
    pub const RIGHT_WALL: NodeId = NodeId(4);
    pub const BACK_WALL: NodeId = NodeId(5);
    pub const ENTRANCE_WALL: NodeId = NodeId(6);
    pub const FRONT_HALL_RIGHT_WALL: NodeId = NodeId(7);
    pub const DIVIDER: NodeId = NodeId(10);
    pub const SCULPTURE: NodeId = NodeId(20);
    pub const SCREEN_NODE: NodeId = NodeId(40);

    pub const CENTRAL: ExhibitId = ExhibitId(1);
    pub const LEFT_1: ExhibitId = ExhibitId(2);
    pub const LEFT_2: ExhibitId = ExhibitId(3);
    pub const RIGHT_1: ExhibitId = ExhibitId(4);
    pub const RIGHT_2: ExhibitId = ExhibitId(5);
    pub const LAOCOON: ExhibitId = ExhibitId(6);
    pub const FILM: ExhibitId = ExhibitId(7);
}

fn solid_box(
    world: &mut World,
    node: NodeId,
    label: &str,
    center: Vec3,
    size: Vec3,
    color: Color,
) -> Entity {
    world
        .spawn((
            Transform::from_position(center).with_scale(size),
            Collider::cuboid(node, label),
            Solid,
            color,
        ))
        .id()
}

fn spawn_shell(world: &mut World) {
    let depth = 40.0;
    let width = 39.2;
    let mid_y = WALL_HEIGHT / 2.0;

    solid_box(
        world,
        ids::FLOOR,
        "floor",
        Vec3::new(9.8, -0.1, -5.0),
        Vec3::new(width, 0.2, depth),
        FLOOR,
    );
    solid_box(
        world,
        ids::CEILING,
        "ceiling",
        Vec3::new(9.8, 12.2, -5.0),
        Vec3::new(width, 0.2, depth),
        CEILING,
    );
    solid_box(
        world,
        ids::LEFT_WALL,
        "left wall",
        Vec3::new(-9.9, mid_y, -5.0),
        Vec3::new(WALL_THICKNESS, WALL_HEIGHT, depth),
        WALL,
    );
    solid_box(
        world,
        ids::RIGHT_WALL,
        "right wall",
        Vec3::new(29.5, mid_y, -5.0),
        Vec3::new(WALL_THICKNESS, WALL_HEIGHT, depth),
        WALL,
    );
    solid_box(
        world,
        ids::BACK_WALL,
        "back wall",
        Vec3::new(9.8, mid_y, -24.8 - WALL_THICKNESS / 2.0),
        Vec3::new(width, WALL_HEIGHT, WALL_THICKNESS),
        WALL,
    );
    solid_box(
        world,
        ids::ENTRANCE_WALL,
        "entrance wall",
        Vec3::new(9.8, mid_y, 14.8 + WALL_THICKNESS / 2.0),
        Vec3::new(width, WALL_HEIGHT, WALL_THICKNESS),
        WALL,
    );
    let front_depth = 14.8 + 10.5;
    solid_box(
        world,
        ids::FRONT_HALL_RIGHT_WALL,
        "front hall right wall",
        Vec3::new(9.8 + WALL_THICKNESS / 2.0, mid_y, (14.8 + -10.5) / 2.0),
        Vec3::new(WALL_THICKNESS, WALL_HEIGHT, front_depth),
        WALL,
    );
}

/// Divider wall: two side slabs plus a lintel over the opening, grouped under one node.
fn spawn_divider(world: &mut World) {
    let side_width = (HALL_WIDTH - OPENING_WIDTH) / 2.0;
    let side_x = OPENING_WIDTH / 2.0 + side_width / 2.0;
    let lintel_height = WALL_HEIGHT - OPENING_HEIGHT;
    let parts = [
        (
            NodeId(11),
            "divider left",
            Vec3::new(-side_x, WALL_HEIGHT / 2.0, DIVIDER_Z),
            Vec3::new(side_width, WALL_HEIGHT, DIVIDER_THICKNESS),
        ),
        (
            NodeId(12),
            "divider right",
            Vec3::new(side_x, WALL_HEIGHT / 2.0, DIVIDER_Z),
            Vec3::new(side_width, WALL_HEIGHT, DIVIDER_THICKNESS),
        ),
        (
            NodeId(13),
            "divider lintel",
            Vec3::new(0.0, OPENING_HEIGHT + lintel_height / 2.0, DIVIDER_Z),
            Vec3::new(OPENING_WIDTH, lintel_height, DIVIDER_THICKNESS),
        ),
    ];
    for (node, label, center, size) in parts {
        let entity = solid_box(world, node, label, center, size, WALL);
        world.entity_mut(entity).insert(PartOf::new(ids::DIVIDER, "divider"));
    }
}

fn spawn_sculpture(world: &mut World) -> Exhibit {
    let base = Vec3::new(0.0, 0.0, -21.0);
    let pedestal = solid_box(
        world,
        NodeId(21),
        "pedestal",
        base + Vec3::new(0.0, 0.5, 0.0),
        Vec3::new(2.0, 1.0, 2.0),
        STONE,
    );
    world
        .entity_mut(pedestal)
        .insert((PartOf::new(ids::SCULPTURE, "sculpture"), ExhibitPart(ids::LAOCOON)));
    world.spawn((
        Transform::from_position(base + Vec3::new(0.0, 2.5, 0.0)).with_scale(Vec3::splat(3.0)),
        Collider::sphere(NodeId(22), "figure"),
        Solid,
        PartOf::new(ids::SCULPTURE, "sculpture"),
        ExhibitPart(ids::LAOCOON),
        STONE,
    ));

    Exhibit::new(
        ids::LAOCOON,
        ExhibitKind::Sculpture,
        "Laocoön and His Sons",
        base + Vec3::new(0.0, 2.5, 0.0),
    )
    .with_description(
        "A famous ancient Greek sculpture, depicting the Trojan priest Laocoön \
         and his sons being entwined by sea serpents.",
    )
    .with_root(ids::SCULPTURE)
}

struct Hanging {
    id: ExhibitId,
    node: NodeId,
    title: &'static str,
    description: &'static str,
    position: Vec3,
    size: Vec3,
    yaw: f32,
}

const HANGINGS: [Hanging; 5] = [
    Hanging {
        id: ids::CENTRAL,
        node: NodeId(30),
        title: "Entrance Wall Exhibition",
        description: "The artwork displayed on the entrance wall.",
        position: Vec3::new(0.0, 6.2, 14.75),
        size: Vec3::new(12.0, 4.5, 0.1),
        yaw: PI,
    },
    Hanging {
        id: ids::LEFT_1,
        node: NodeId(31),
        title: "Left Exhibition 1",
        description: "The first artwork displayed on the left wall.",
        position: Vec3::new(-9.8, 5.0, 6.0),
        size: Vec3::new(6.0, 4.0, 0.1),
        yaw: FRAC_PI_2,
    },
    Hanging {
        id: ids::LEFT_2,
        node: NodeId(32),
        title: "Left Exhibition 2",
        description: "The second artwork displayed on the left wall.",
        position: Vec3::new(-9.8, 5.0, -2.0),
        size: Vec3::new(6.0, 4.0, 0.1),
        yaw: FRAC_PI_2,
    },
    Hanging {
        id: ids::RIGHT_1,
        node: NodeId(33),
        title: "Right Exhibition 1",
        description: "The first artwork displayed on the right wall.",
        position: Vec3::new(9.8, 5.0, 6.0),
        size: Vec3::new(6.0, 4.0, 0.1),
        yaw: -FRAC_PI_2,
    },
    Hanging {
        id: ids::RIGHT_2,
        node: NodeId(34),
        title: "Right Exhibition 2",
        description: "The second artwork displayed on the right wall.",
        position: Vec3::new(9.8, 5.0, -2.0),
        size: Vec3::new(6.0, 4.0, 0.1),
        yaw: -FRAC_PI_2,
    },
];

fn spawn_artworks(world: &mut World) -> Vec<Exhibit> {
    HANGINGS
        .iter()
        .map(|h| {
            // Pick target only: artworks never block movement or sightlines.
            world.spawn((
                Transform::from_position(h.position).with_scale(h.size).with_yaw(h.yaw),
                Collider::cuboid(h.node, h.title),
                ExhibitPart(h.id),
                CANVAS,
            ));
            Exhibit::new(h.id, ExhibitKind::Artwork, h.title, h.position)
                .with_description(h.description)
                .with_root(h.node)
        })
        .collect()
}

fn spawn_screen(world: &mut World) -> Exhibit {
    let position = Vec3::new(19.6, 6.2, 14.8);
    world.spawn((
        Transform::from_position(position).with_scale(Vec3::new(15.68, 8.82, 0.05)).with_yaw(PI),
        Collider::cuboid(ids::SCREEN_NODE, "screen"),
        ExhibitPart(ids::FILM),
        SCREEN,
    ));
    Exhibit::new(ids::FILM, ExhibitKind::Screen, "Screening Room", position)
        .with_root(ids::SCREEN_NODE)
}

/// Spawn the full gallery into `world` and return its exhibits.
pub fn spawn_gallery(world: &mut World) -> Vec<Exhibit> {
    spawn_shell(world);
    spawn_divider(world);

    let mut exhibits = spawn_artworks(world);
    exhibits.push(spawn_sculpture(world));
    exhibits.push(spawn_screen(world));

    mark_layout_dirty(world);
    log::info!("gallery spawned with {} exhibits", exhibits.len());
    exhibits
}

/// Spawn the gallery, register its exhibits and face the entrance hall.
pub fn load_gallery(world: &mut World, exhibition: &mut Exhibition) {
    for exhibit in spawn_gallery(world) {
        exhibition.add_exhibit(exhibit);
    }
    let spawn = exhibition.navigation().config().spawn();
    exhibition.set_view(spawn, START_LOOK_AT);
}
