//! Random sampling for scene setup.
//!
//! [`SpawnContext`] wraps a seeded RNG with the few distributions the scene
//! needs: body radii and positions, and star placement and tint.

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

use crate::config::SwarmConfig;

/// Seeded sampler used while building the scene.
pub struct SpawnContext {
    rng: SmallRng,
}

impl SpawnContext {
    /// Create a context with a fixed seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Random f32 in `[0, 1)`.
    #[inline]
    pub fn random(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Random f32 in `[min, max)`.
    #[inline]
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        min + self.random() * (max - min)
    }

    /// Random point inside an axis-aligned cube of the given half-size,
    /// centered at `center`.
    pub fn random_in_cube(&mut self, center: Vec3, half_size: f32) -> Vec3 {
        center
            + Vec3::new(
                self.random_range(-half_size, half_size),
                self.random_range(-half_size, half_size),
                self.random_range(-half_size, half_size),
            )
    }

    /// Random unit vector, uniform over the sphere surface.
    pub fn random_direction(&mut self) -> Vec3 {
        let z = self.random_range(-1.0, 1.0);
        let theta = self.random_range(0.0, TAU);
        let r = (1.0 - z * z).max(0.0).sqrt();
        Vec3::new(r * theta.cos(), r * theta.sin(), z)
    }

    /// Random point between two concentric spheres.
    pub fn random_in_shell(&mut self, inner: f32, outer: f32) -> Vec3 {
        self.random_direction() * self.random_range(inner, outer)
    }

    /// Sample the spawn parameters of one swarm body.
    pub fn body(&mut self, config: &SwarmConfig) -> BodySpawn {
        let radius = self.random_range(config.min_radius, config.max_radius);
        let center = Vec3::new(0.0, config.spawn_vertical_offset, 0.0);
        let position = self.random_in_cube(center, config.spawn_half_extent);
        BodySpawn {
            radius,
            density: radius,
            position,
        }
    }
}

/// Initial parameters of one swarm body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodySpawn {
    pub radius: f32,
    /// Collider density. Always equal to the radius so larger spheres are
    /// disproportionately heavier.
    pub density: f32,
    pub position: Vec3,
}

/// Convert HSV (all components in `[0, 1]`) to RGB.
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Vec3 {
    let h = h.rem_euclid(1.0);
    let c = v * s;
    let x = c * (1.0 - ((h * 6.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = match (h * 6.0) as u32 % 6 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    Vec3::new(r + m, g + m, b + m)
}
