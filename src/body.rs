//! Swarm bodies.
//!
//! A [`BodyEntity`] pairs one dynamic rapier body with the mesh instance the
//! renderer draws for it. Once per tick, after the physics step, the entity
//! queues a constant-magnitude pull toward the scene center and copies the
//! body translation into its mesh.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use rapier3d::prelude::*;

use crate::physics::{to_glam, to_rapier, PhysicsWorld};
use crate::spawn::BodySpawn;

/// Per-instance transform uploaded to the GPU.
///
/// Meshes are unit icospheres, so `scale` is the sphere radius.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct MeshInstance {
    pub position: [f32; 3],
    pub scale: f32,
}

impl MeshInstance {
    pub fn new(position: Vec3, scale: f32) -> Self {
        Self {
            position: position.to_array(),
            scale,
        }
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    #[inline]
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position.to_array();
    }
}

/// Force pulling a body at `position` toward `center` with the given
/// magnitude.
///
/// A body sitting exactly on the center has no direction to be pulled in and
/// receives a zero force.
pub fn center_pull(position: Vec3, center: Vec3, magnitude: f32) -> Vec3 {
    let direction = (position - center).normalize_or_zero();
    direction * -magnitude
}

/// One simulated sphere of the swarm.
#[derive(Debug, Clone)]
pub struct BodyEntity {
    handle: RigidBodyHandle,
    radius: f32,
    mesh: MeshInstance,
}

impl BodyEntity {
    /// Register a dynamic ball body in `world` from sampled spawn parameters.
    pub fn spawn(world: &mut PhysicsWorld, spawn: &BodySpawn) -> Self {
        let body = RigidBodyBuilder::dynamic()
            .translation(to_rapier(spawn.position))
            .build();
        let collider = ColliderBuilder::ball(spawn.radius)
            .density(spawn.density)
            .build();
        let handle = world.insert_body(body, collider);

        Self {
            handle,
            radius: spawn.radius,
            mesh: MeshInstance::new(spawn.position, spawn.radius),
        }
    }

    /// Queue the center pull for the next step and sync the mesh.
    ///
    /// Forces in rapier persist until reset, so the previous tick's pull is
    /// cleared first. The mesh receives the translation read before the new
    /// force is queued; the force only shows up after the next step.
    pub fn update(&mut self, world: &mut PhysicsWorld, center: Vec3, magnitude: f32) {
        let Some(body) = world.body_mut(self.handle) else {
            return;
        };
        body.reset_forces(true);
        let position = to_glam(body.translation());
        let force = center_pull(position, center, magnitude);
        body.add_force(to_rapier(force), true);
        self.mesh.set_position(position);
    }

    pub fn handle(&self) -> RigidBodyHandle {
        self.handle
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Position the mesh was last synced to.
    pub fn position(&self) -> Vec3 {
        self.mesh.position()
    }

    pub fn mesh(&self) -> &MeshInstance {
        &self.mesh
    }

    /// Force currently queued on the rigid body.
    pub fn queued_force(&self, world: &PhysicsWorld) -> Vec3 {
        world
            .body(self.handle)
            .map(|body| to_glam(&body.user_force()))
            .unwrap_or(Vec3::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn_at(world: &mut PhysicsWorld, position: Vec3) -> BodyEntity {
        BodyEntity::spawn(
            world,
            &BodySpawn {
                radius: 0.2,
                density: 0.2,
                position,
            },
        )
    }

    #[test]
    fn test_pull_points_toward_center() {
        let mut world = PhysicsWorld::new(Vec3::ZERO);
        let mut entity = spawn_at(&mut world, Vec3::new(2.0, 0.0, 0.0));

        entity.update(&mut world, Vec3::ZERO, 0.5);

        assert_eq!(entity.queued_force(&world), Vec3::new(-0.5, 0.0, 0.0));
    }

    #[test]
    fn test_body_on_center_gets_finite_force() {
        let mut world = PhysicsWorld::new(Vec3::ZERO);
        let mut entity = spawn_at(&mut world, Vec3::ZERO);

        entity.update(&mut world, Vec3::ZERO, 0.5);

        let force = entity.queued_force(&world);
        assert!(force.is_finite());
        assert_eq!(force, Vec3::ZERO);

        world.step();
        entity.update(&mut world, Vec3::ZERO, 0.5);
        assert!(entity.position().is_finite());
    }

    #[test]
    fn test_forces_do_not_accumulate() {
        let mut world = PhysicsWorld::new(Vec3::ZERO);
        let mut entity = spawn_at(&mut world, Vec3::new(0.0, 4.0, 0.0));

        entity.update(&mut world, Vec3::ZERO, 0.5);
        entity.update(&mut world, Vec3::ZERO, 0.5);

        assert_eq!(entity.queued_force(&world), Vec3::new(0.0, -0.5, 0.0));
    }

    #[test]
    fn test_update_is_idempotent_without_step() {
        let mut world = PhysicsWorld::new(Vec3::ZERO);
        let mut entity = spawn_at(&mut world, Vec3::new(1.0, 2.0, -1.0));

        entity.update(&mut world, Vec3::ZERO, 0.5);
        let first = *entity.mesh();
        entity.update(&mut world, Vec3::ZERO, 0.5);

        assert_eq!(*entity.mesh(), first);
        assert_eq!(entity.position(), Vec3::new(1.0, 2.0, -1.0));
    }

    #[test]
    fn test_mesh_shows_pre_force_position() {
        let mut world = PhysicsWorld::new(Vec3::ZERO);
        let mut entity = spawn_at(&mut world, Vec3::new(3.0, 0.0, 0.0));

        entity.update(&mut world, Vec3::ZERO, 0.5);
        assert_eq!(entity.position(), Vec3::new(3.0, 0.0, 0.0));

        world.step();
        entity.update(&mut world, Vec3::ZERO, 0.5);
        assert!(entity.position().x < 3.0);
    }

    #[test]
    fn test_unforced_body_stays_motionless() {
        let mut world = PhysicsWorld::new(Vec3::ZERO);
        let entity = spawn_at(&mut world, Vec3::new(0.5, 1.5, 2.5));

        world.step();

        let body = world.body(entity.handle()).unwrap();
        assert_eq!(to_glam(body.translation()), Vec3::new(0.5, 1.5, 2.5));
        assert_eq!(to_glam(body.linvel()), Vec3::ZERO);
    }

    #[test]
    fn test_center_pull_helper() {
        let f = center_pull(Vec3::new(0.0, 0.0, -4.0), Vec3::ZERO, 2.0);
        assert_eq!(f, Vec3::new(0.0, 0.0, 2.0));
        assert_eq!(center_pull(Vec3::ONE, Vec3::ONE, 1.0), Vec3::ZERO);
    }
}
