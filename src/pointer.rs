//! The invader sphere that follows the pointer.
//!
//! The sphere is a kinematic rapier body: its translation is set from input
//! every tick and the solver only uses it to push swarm bodies away. It never
//! receives forces itself.

use glam::{Vec2, Vec3};
use rapier3d::prelude::*;

use crate::body::MeshInstance;
use crate::config::SwarmConfig;
use crate::physics::{to_glam, to_rapier, PhysicsWorld};

/// Latest pointer position in normalized device coordinates.
///
/// Written by input handling whenever the cursor moves and read once per
/// tick. The last write before a tick wins.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerState {
    /// `(-1, -1)` is the bottom-left corner of the window, `(1, 1)` the
    /// top-right.
    pub ndc: Vec2,
}

impl PointerState {
    pub fn new(ndc: Vec2) -> Self {
        Self { ndc }
    }
}

/// Kinematic sphere driven by the pointer.
#[derive(Debug, Clone)]
pub struct PointerBody {
    handle: RigidBodyHandle,
    scale: f32,
    collision_radius: f32,
    mesh: MeshInstance,
}

impl PointerBody {
    /// Register the kinematic body at the origin.
    pub fn spawn(world: &mut PhysicsWorld, config: &SwarmConfig) -> Self {
        let body = RigidBodyBuilder::kinematic_position_based()
            .translation(vector![0.0, 0.0, 0.0])
            .build();
        let collision_radius = config.pointer_collider_radius();
        let handle = world.insert_body(body, ColliderBuilder::ball(collision_radius).build());

        Self {
            handle,
            scale: config.pointer_scale,
            collision_radius,
            mesh: MeshInstance::new(Vec3::ZERO, config.pointer_radius),
        }
    }

    /// World-space target for a pointer position. Depth is always zero.
    pub fn target(&self, pointer: &PointerState) -> Vec3 {
        Vec3::new(pointer.ndc.x * self.scale, pointer.ndc.y * self.scale, 0.0)
    }

    /// Teleport the body to the pointer target and sync the mesh.
    pub fn update(&mut self, world: &mut PhysicsWorld, pointer: &PointerState) {
        let target = self.target(pointer);
        let Some(body) = world.body_mut(self.handle) else {
            return;
        };
        body.set_translation(to_rapier(target), true);
        self.mesh.set_position(to_glam(body.translation()));
    }

    pub fn handle(&self) -> RigidBodyHandle {
        self.handle
    }

    pub fn position(&self) -> Vec3 {
        self.mesh.position()
    }

    pub fn collision_radius(&self) -> f32 {
        self.collision_radius
    }

    pub fn mesh(&self) -> &MeshInstance {
        &self.mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_maps_to_scaled_translation() {
        let mut world = PhysicsWorld::new(Vec3::ZERO);
        let mut pointer = PointerBody::spawn(&mut world, &SwarmConfig::default());

        pointer.update(&mut world, &PointerState::new(Vec2::new(0.5, -0.5)));

        let body = world.body(pointer.handle()).unwrap();
        assert_eq!(to_glam(body.translation()), Vec3::new(2.5, -2.5, 0.0));
        assert_eq!(pointer.position(), Vec3::new(2.5, -2.5, 0.0));
    }

    #[test]
    fn test_pointer_body_is_kinematic() {
        let mut world = PhysicsWorld::new(Vec3::ZERO);
        let pointer = PointerBody::spawn(&mut world, &SwarmConfig::default());
        let body = world.body(pointer.handle()).unwrap();
        assert!(body.is_kinematic());
        assert!((pointer.collision_radius() - 0.75).abs() < 1e-6);
        assert_eq!(pointer.mesh().scale, 0.25);
    }

    #[test]
    fn test_pointer_holds_position_through_step() {
        let mut world = PhysicsWorld::new(Vec3::ZERO);
        let mut pointer = PointerBody::spawn(&mut world, &SwarmConfig::default());
        pointer.update(&mut world, &PointerState::new(Vec2::new(-1.0, 1.0)));

        world.step();

        let body = world.body(pointer.handle()).unwrap();
        assert_eq!(to_glam(body.translation()), Vec3::new(-5.0, 5.0, 0.0));
    }

    #[test]
    fn test_pointer_pushes_overlapping_body() {
        use crate::body::BodyEntity;
        use crate::spawn::BodySpawn;

        let mut world = PhysicsWorld::new(Vec3::ZERO);
        let mut pointer = PointerBody::spawn(&mut world, &SwarmConfig::default());
        let mut entity = BodyEntity::spawn(
            &mut world,
            &BodySpawn {
                radius: 0.2,
                density: 0.2,
                position: Vec3::new(0.6, 0.0, 0.0),
            },
        );
        pointer.update(&mut world, &PointerState::default());

        for _ in 0..10 {
            world.step();
            entity.update(&mut world, Vec3::ZERO, 0.0);
        }

        assert!(entity.position().x > 0.6);
        assert_eq!(pointer.position(), Vec3::ZERO);
    }
}
