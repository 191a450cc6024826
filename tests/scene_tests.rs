//! Integration tests for the headless scene.
//!
//! These drive the public API the way the frame loop does, without a window
//! or GPU.

use orbswarm::gpu::{mip_weights, render_extent};
use orbswarm::prelude::*;
use orbswarm::physics::to_glam;
use orbswarm::{center_pull, BodyEntity, PhysicsWorld, PointerBody};

// ============================================================================
// Whole-scene runs
// ============================================================================

#[test]
fn test_default_swarm_stays_bounded_for_a_second() {
    let mut scene = Scene::new(SwarmConfig::default().with_star_count(100).with_seed(1234));
    assert_eq!(scene.bodies().len(), 100);

    scene.run_ticks(60, &PointerState::new(Vec2::ZERO));

    assert!(!scene.has_non_finite());
    assert!(scene.max_extent() < 50.0, "extent {}", scene.max_extent());
    assert_eq!(scene.ticks(), 60);
}

#[test]
fn test_swarm_bounded_for_several_seeds() {
    for seed in [0, 7, 99, 2024] {
        let mut scene = Scene::new(
            SwarmConfig::default()
                .with_body_count(30)
                .with_star_count(0)
                .with_seed(seed),
        );
        scene.run_ticks(60, &PointerState::default());
        assert!(!scene.has_non_finite(), "seed {seed}");
        assert!(scene.max_extent() < 50.0, "seed {seed}");
    }
}

#[test]
fn test_pointer_sweep_keeps_swarm_finite() {
    let mut scene = Scene::new(
        SwarmConfig::default()
            .with_body_count(40)
            .with_star_count(0)
            .with_seed(5),
    );
    for i in 0..120 {
        let t = i as f32 / 120.0 * std::f32::consts::TAU;
        scene.advance(&PointerState::new(Vec2::new(t.cos() * 0.5, t.sin() * 0.5)));
    }
    assert!(!scene.has_non_finite());
}

#[test]
fn test_pointer_lands_on_scaled_target_each_tick() {
    let mut scene = Scene::new(
        SwarmConfig::default()
            .with_body_count(5)
            .with_star_count(0)
            .with_seed(3),
    );
    scene.advance(&PointerState::new(Vec2::new(0.5, -0.5)));
    assert_eq!(scene.pointer().position(), Vec3::new(2.5, -2.5, 0.0));

    scene.advance(&PointerState::new(Vec2::new(-1.0, 0.0)));
    assert_eq!(scene.pointer().position(), Vec3::new(-5.0, 0.0, 0.0));
}

#[test]
fn test_first_pull_accelerates_toward_center() {
    let config = SwarmConfig::default().with_body_count(1).with_star_count(0).with_seed(11);
    let mut scene = Scene::new(config);
    // Park the invader in a corner, away from the spawn cube
    let parked = PointerState::new(Vec2::new(1.0, -1.0));

    scene.advance(&parked);
    let queued_at = scene.bodies()[0].position();
    scene.advance(&parked);

    let body = scene.world().body(scene.bodies()[0].handle()).unwrap();
    let velocity = to_glam(body.linvel());
    assert!(velocity.dot(queued_at) < 0.0);
}

#[test]
fn test_starfield_rotates_every_tick() {
    let config = SwarmConfig::default().with_body_count(0).with_star_count(10).with_seed(1);
    let step = config.star_rotation_step;
    let mut scene = Scene::new(config);
    scene.run_ticks(10, &PointerState::default());

    let rotation = scene.starfield().rotation();
    for axis in rotation.to_array() {
        assert!((axis - 10.0 * step).abs() < 1e-6);
    }
}

// ============================================================================
// Entities on a bare world
// ============================================================================

#[test]
fn test_center_pull_magnitude_and_direction() {
    assert_eq!(center_pull(Vec3::new(2.0, 0.0, 0.0), Vec3::ZERO, 0.5), Vec3::new(-0.5, 0.0, 0.0));

    let at_center = center_pull(Vec3::ZERO, Vec3::ZERO, 0.5);
    assert!(at_center.is_finite());
    assert_eq!(at_center, Vec3::ZERO);

    let off_axis = center_pull(Vec3::new(1.0, 2.0, -3.0), Vec3::ZERO, 0.5);
    assert!((off_axis.length() - 0.5).abs() < 1e-6);
}

#[test]
fn test_body_update_is_idempotent_between_steps() {
    let mut world = PhysicsWorld::new(Vec3::ZERO);
    let mut entity = BodyEntity::spawn(
        &mut world,
        &orbswarm::spawn::BodySpawn {
            radius: 0.3,
            density: 0.3,
            position: Vec3::new(1.0, 1.0, 1.0),
        },
    );

    entity.update(&mut world, Vec3::ZERO, 0.5);
    let first = entity.position();
    let first_force = entity.queued_force(&world);
    entity.update(&mut world, Vec3::ZERO, 0.5);

    assert_eq!(entity.position(), first);
    assert_eq!(entity.queued_force(&world), first_force);
}

#[test]
fn test_pointer_body_collider_is_three_times_visual_radius() {
    let config = SwarmConfig::default();
    let mut world = PhysicsWorld::new(Vec3::ZERO);
    let pointer = PointerBody::spawn(&mut world, &config);
    assert!((pointer.collision_radius() - 3.0 * config.pointer_radius).abs() < 1e-6);
}

// ============================================================================
// Render-side helpers that need no GPU
// ============================================================================

#[test]
fn test_render_extent_never_exceeds_double_density() {
    assert_eq!(render_extent(2560, 1440, 2.0), (2560, 1440));
    assert_eq!(render_extent(4000, 2000, 4.0), (2000, 1000));
}

#[test]
fn test_default_bloom_weights() {
    let weights = mip_weights(&BloomSettings::default());
    // Wider levels gain weight as the radius grows from zero
    assert!(weights[4] > 1.5 * 0.2);
    assert!(weights[0] < 1.5 * 1.0);
    assert!(weights.iter().all(|w| *w > 0.0));
}
