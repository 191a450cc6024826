//! CPU side of a frame: physics, entity sync and background motion.
//!
//! [`Scene::advance`] is everything a tick does between the camera update and
//! the render, in this order:
//!
//! 1. step the physics world
//! 2. move the invader sphere to the pointer
//! 3. update every swarm body (queue center pull, sync mesh)
//! 4. rotate the starfield
//!
//! The pointer is moved after the step, so its effect on the swarm shows up
//! one tick late. Swapping steps 1 and 2 would remove that lag.

use crate::body::{BodyEntity, MeshInstance};
use crate::config::SwarmConfig;
use crate::physics::PhysicsWorld;
use crate::pointer::{PointerBody, PointerState};
use crate::spawn::SpawnContext;
use crate::starfield::Starfield;

/// The whole simulated scene.
pub struct Scene {
    config: SwarmConfig,
    world: PhysicsWorld,
    bodies: Vec<BodyEntity>,
    pointer: PointerBody,
    starfield: Starfield,
    ticks: u64,
}

impl Scene {
    /// Build the world, spawn the swarm and the pointer, scatter the stars.
    pub fn new(config: SwarmConfig) -> Self {
        let seed = config.resolve_seed();
        let mut ctx = SpawnContext::from_seed(seed);
        let mut world = PhysicsWorld::new(config.gravity);

        let bodies: Vec<BodyEntity> = (0..config.body_count)
            .map(|_| {
                let spawn = ctx.body(&config);
                BodyEntity::spawn(&mut world, &spawn)
            })
            .collect();
        let pointer = PointerBody::spawn(&mut world, &config);
        let starfield = Starfield::generate(&mut ctx, config.star_count, config.star_rotation_step);

        log::info!(
            "scene ready: {} bodies, {} stars, seed {}",
            bodies.len(),
            starfield.len(),
            seed
        );

        Self {
            config,
            world,
            bodies,
            pointer,
            starfield,
            ticks: 0,
        }
    }

    /// Run one tick of simulation.
    pub fn advance(&mut self, pointer: &PointerState) {
        self.world.step();
        self.pointer.update(&mut self.world, pointer);

        let center = self.config.center;
        let pull = self.config.center_pull;
        for body in &mut self.bodies {
            body.update(&mut self.world, center, pull);
        }

        self.starfield.advance();
        self.ticks += 1;
    }

    /// Run `count` ticks with a fixed pointer.
    pub fn run_ticks(&mut self, count: usize, pointer: &PointerState) {
        for _ in 0..count {
            self.advance(pointer);
        }
    }

    pub fn bodies(&self) -> &[BodyEntity] {
        &self.bodies
    }

    pub fn pointer(&self) -> &PointerBody {
        &self.pointer
    }

    pub fn starfield(&self) -> &Starfield {
        &self.starfield
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    pub fn config(&self) -> &SwarmConfig {
        &self.config
    }

    /// Ticks run since creation.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Mesh instances of the swarm, in entity order.
    pub fn body_instances(&self) -> Vec<MeshInstance> {
        self.bodies.iter().map(|b| *b.mesh()).collect()
    }

    /// Largest distance of any swarm body from the pull center.
    pub fn max_extent(&self) -> f32 {
        self.bodies
            .iter()
            .map(|b| (b.position() - self.config.center).length())
            .fold(0.0, f32::max)
    }

    /// Whether any swarm body has a non-finite position.
    pub fn has_non_finite(&self) -> bool {
        self.bodies.iter().any(|b| !b.position().is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{to_glam, to_rapier};
    use glam::{Vec2, Vec3};

    fn small_config() -> SwarmConfig {
        SwarmConfig::default()
            .with_body_count(10)
            .with_star_count(50)
            .with_seed(42)
    }

    #[test]
    fn test_scene_registers_every_body() {
        let scene = Scene::new(small_config());
        assert_eq!(scene.bodies().len(), 10);
        assert_eq!(scene.world().body_count(), 11);
        assert_eq!(scene.starfield().len(), 50);
    }

    #[test]
    fn test_advance_steps_once_per_tick() {
        let mut scene = Scene::new(small_config());
        scene.run_ticks(5, &PointerState::default());
        assert_eq!(scene.ticks(), 5);
        assert_eq!(scene.world().steps(), 5);
    }

    #[test]
    fn test_meshes_track_bodies_each_tick() {
        let mut scene = Scene::new(small_config());
        scene.run_ticks(3, &PointerState::default());
        for body in scene.bodies() {
            let rb = scene.world().body(body.handle()).unwrap();
            let t = rb.translation();
            assert_eq!(body.position(), Vec3::new(t.x, t.y, t.z));
        }
    }

    #[test]
    fn test_pointer_follows_state() {
        let mut scene = Scene::new(small_config());
        scene.advance(&PointerState::new(Vec2::new(0.2, 0.4)));
        assert_eq!(scene.pointer().position(), Vec3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn test_pull_only_acts_after_next_step() {
        let mut scene = Scene::new(small_config().with_body_count(1));
        // Move the pointer far away so only the pull acts
        let far = PointerState::new(Vec2::new(1.0, -1.0));
        let spawned = scene.bodies()[0].position();

        scene.advance(&far);
        assert_eq!(scene.bodies()[0].position(), spawned);
        let queued_at = scene.bodies()[0].position();

        scene.advance(&far);
        let body = scene.world().body(scene.bodies()[0].handle()).unwrap();
        assert!(to_glam(body.linvel()).dot(queued_at) < 0.0);
    }

    #[test]
    fn test_pointer_push_lands_one_tick_late() {
        let config = small_config()
            .with_body_count(1)
            .with_star_count(0)
            .with_center_pull(0.0);
        let mut scene = Scene::new(config);
        let handle = scene.bodies()[0].handle();
        // Just outside the invader's collider while it rests at the origin
        let start = Vec3::new(1.2, 0.0, 0.0);
        scene
            .world
            .body_mut(handle)
            .unwrap()
            .set_translation(to_rapier(start), true);

        // Invader moves to (1, 0, 0), overlapping the body
        let overlapping = PointerState::new(Vec2::new(0.2, 0.0));
        scene.advance(&overlapping);
        assert_eq!(scene.pointer().position(), Vec3::new(1.0, 0.0, 0.0));
        let after_first = to_glam(scene.world().body(handle).unwrap().translation());
        assert_eq!(after_first, start);

        scene.advance(&overlapping);
        let after_second = to_glam(scene.world().body(handle).unwrap().translation());
        assert!(after_second.x > start.x, "body at {after_second}");
    }

    #[test]
    fn test_world_uses_configured_gravity() {
        let gravity = Vec3::new(0.0, -9.81, 0.0);
        let scene = Scene::new(small_config().with_gravity(gravity));
        assert_eq!(scene.world().gravity(), gravity);
    }

    #[test]
    fn test_same_seed_same_scene() {
        let a = Scene::new(small_config());
        let b = Scene::new(small_config());
        assert_eq!(a.body_instances(), b.body_instances());
    }
}
