// Navigation through the real gallery layout: collision clamping, eye height, fail-open.

use bevy_ecs::world::World;
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use atrium::engine::collision::{CollidableRegistry, CollisionResolver, Ray};
use atrium::engine::config::AtriumConfig;
use atrium::engine::systems;
use atrium::engine::{Exhibition, InputEvent, NavKey};
use atrium::scene;

fn gallery(config: AtriumConfig) -> Exhibition {
    let mut world = World::new();
    let mut exhibition = Exhibition::new(config);
    let mut picks = CollidableRegistry::default();
    scene::load_gallery(&mut world, &mut exhibition);
    systems::sync_layout(&mut world, &mut exhibition, &mut picks);
    exhibition
}

fn hold(exhibition: &mut Exhibition, key: NavKey) {
    exhibition.handle_input(&InputEvent::Key { key, pressed: true, repeat: false });
}

fn run(exhibition: &mut Exhibition, steps: usize, dt: f32) {
    for _ in 0..steps {
        exhibition.update(dt);
    }
}

#[test]
fn walk_through_opening_stops_at_back_wall() {
    let mut ex = gallery(AtriumConfig::default());
    hold(&mut ex, NavKey::Forward);
    hold(&mut ex, NavKey::Sprint);
    run(&mut ex, 40, 0.1);

    let p = ex.viewpoint().position;
    assert_eq!(p.y, 5.0);
    assert!((p.z - (-24.8 + 0.6)).abs() < 1e-3, "stopped at z={}", p.z);
}

#[test]
fn divider_blocks_outside_the_opening() {
    let mut ex = gallery(AtriumConfig::default());
    ex.set_view(Vec3::new(-6.9, 5.0, 0.0), Vec3::new(-6.9, 5.0, -10.0));
    hold(&mut ex, NavKey::Forward);
    run(&mut ex, 30, 0.1);
    let z = ex.viewpoint().position.z;
    assert!((z - (-9.5 + 0.6)).abs() < 1e-3, "stopped at z={z}");
}

#[test]
fn configured_buffer_is_respected() {
    let config =
        AtriumConfig::from_json_str(r#"{ "navigation": { "collision_buffer": 1.0 } }"#).unwrap();
    let mut ex = gallery(config);
    hold(&mut ex, NavKey::Forward);
    hold(&mut ex, NavKey::Sprint);
    run(&mut ex, 40, 0.1);
    assert!((ex.viewpoint().position.z - (-24.8 + 1.0)).abs() < 1e-3);
}

#[test]
fn fail_open_without_collidables() {
    let mut ex = Exhibition::new(AtriumConfig::default());
    hold(&mut ex, NavKey::Forward);
    run(&mut ex, 10, 0.1);
    // 7.5 u/s for one second from z = 8, straight through where walls would be.
    assert!((ex.viewpoint().position.z - 0.5).abs() < 1e-4);
}

#[test]
fn idle_updates_leave_viewpoint_unchanged() {
    let mut ex = gallery(AtriumConfig::default());
    let before = *ex.viewpoint();
    run(&mut ex, 60, 1.0 / 60.0);
    assert_eq!(*ex.viewpoint(), before);
}

#[test]
fn eye_height_holds_after_every_update() {
    let mut ex = gallery(AtriumConfig::default());
    ex.set_view(Vec3::new(2.0, 9.0, 4.0), Vec3::new(-5.0, 0.0, -3.0));
    hold(&mut ex, NavKey::StrafeLeft);
    for _ in 0..50 {
        ex.update(0.05);
        assert_eq!(ex.viewpoint().position.y, 5.0);
    }
}

#[test]
fn allowed_length_never_exceeds_intent_or_gap() {
    let mut world = World::new();
    scene::spawn_gallery(&mut world);
    let registry = systems::rebuild_collidables(&mut world);
    let resolver = CollisionResolver::new(0.6, 0.01);
    let mut rng = StdRng::seed_from_u64(0x6a11);

    for _ in 0..500 {
        let origin = Vec3::new(rng.gen_range(-9.0..9.0), 5.0, rng.gen_range(-24.0..14.0));
        let angle: f32 = rng.gen_range(0.0..std::f32::consts::TAU);
        let direction = Vec3::new(angle.cos(), 0.0, angle.sin());
        let intended = rng.gen_range(0.0..3.0);

        let allowed = resolver.allowed_length(origin, direction, intended, Some(&registry));
        assert!(allowed >= 0.0 && allowed <= intended, "allowed {allowed} for intended {intended}");

        let ray = Ray::new(origin, direction).unwrap();
        let hits = registry.raycast(&ray, intended + 0.6);
        if let Some(hit) = hits.into_iter().find(|h| h.distance > 0.01) {
            assert!(allowed <= (hit.distance - 0.6).max(0.0) + 1e-5);
        }
    }
}
