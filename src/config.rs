//! Scene configuration.
//!
//! Every tunable of the swarm lives in [`SwarmConfig`]. The defaults are the
//! values the demo ships with; the `with_*` methods exist so tests and
//! benchmarks can shrink or reshape the scene.
//!
//! ```ignore
//! let config = SwarmConfig::default()
//!     .with_body_count(20)
//!     .with_seed(7);
//! ```

use std::borrow::Cow;

use glam::Vec3;

/// Embedded WGSL for the swarm body material.
pub const BODY_VERTEX_SHADER: &str = include_str!("shaders/body_vertex.wgsl");
pub const BODY_FRAGMENT_SHADER: &str = include_str!("shaders/body_fragment.wgsl");

/// Vertex and fragment source for the swarm body material.
///
/// The renderer compiles each string as its own module: the vertex source must
/// export `vs_main`, the fragment source `fs_main`, and both must agree on the
/// interstage struct. Bindings are documented in `shaders/body_vertex.wgsl`.
#[derive(Debug, Clone)]
pub struct ShaderSource {
    pub vertex: Cow<'static, str>,
    pub fragment: Cow<'static, str>,
}

impl Default for ShaderSource {
    fn default() -> Self {
        Self {
            vertex: Cow::Borrowed(BODY_VERTEX_SHADER),
            fragment: Cow::Borrowed(BODY_FRAGMENT_SHADER),
        }
    }
}

/// Parameters of the bloom pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BloomSettings {
    /// Multiplier on the blurred glow before it is added to the scene.
    pub strength: f32,
    /// Spread of the glow. 0.0 keeps the tight mip levels dominant, 1.0
    /// shifts weight to the wide ones.
    pub radius: f32,
    /// Luminance above which a pixel contributes to the glow.
    pub threshold: f32,
}

impl Default for BloomSettings {
    fn default() -> Self {
        Self {
            strength: 1.5,
            radius: 0.305,
            threshold: 0.0,
        }
    }
}

/// Perspective camera placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSettings {
    pub position: Vec3,
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            position: Vec3::new(1.0, 0.0, 4.0),
            target: Vec3::ZERO,
            fov_y_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

/// Full configuration of the swarm scene.
#[derive(Debug, Clone)]
pub struct SwarmConfig {
    /// Number of dynamic spheres spawned at startup.
    pub body_count: usize,
    /// Smallest sampled body radius (inclusive).
    pub min_radius: f32,
    /// Largest sampled body radius (exclusive).
    pub max_radius: f32,
    /// Half the side length of the spawn cube.
    pub spawn_half_extent: f32,
    /// Vertical offset of the spawn cube center.
    pub spawn_vertical_offset: f32,
    /// Point every body is pulled toward.
    pub center: Vec3,
    /// Magnitude of the inward pull applied each tick.
    pub center_pull: f32,
    /// Gravity of the physics world.
    pub gravity: Vec3,
    /// Visual radius of the invader sphere.
    pub pointer_radius: f32,
    /// Collider radius is `pointer_radius * pointer_collider_scale`.
    pub pointer_collider_scale: f32,
    /// World units per unit of normalized pointer coordinate.
    pub pointer_scale: f32,
    /// Number of background stars.
    pub star_count: usize,
    /// Radians added to each starfield axis per tick.
    pub star_rotation_step: f32,
    /// RNG seed. `None` seeds from the clock.
    pub seed: Option<u64>,
    pub bloom: BloomSettings,
    pub camera: CameraSettings,
    pub shaders: ShaderSource,
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            body_count: 100,
            min_radius: 0.1,
            max_radius: 0.35,
            spawn_half_extent: 3.0,
            spawn_vertical_offset: 3.0,
            center: Vec3::ZERO,
            center_pull: 0.5,
            gravity: Vec3::ZERO,
            pointer_radius: 0.25,
            pointer_collider_scale: 3.0,
            pointer_scale: 5.0,
            star_count: 10_000,
            star_rotation_step: 0.0003,
            seed: None,
            bloom: BloomSettings::default(),
            camera: CameraSettings::default(),
            shaders: ShaderSource::default(),
        }
    }
}

impl SwarmConfig {
    /// Set the number of swarm bodies.
    pub fn with_body_count(mut self, count: usize) -> Self {
        self.body_count = count;
        self
    }

    /// Set the radius range `[min, max)` for sampled bodies.
    pub fn with_radius_range(mut self, min: f32, max: f32) -> Self {
        self.min_radius = min;
        self.max_radius = max;
        self
    }

    /// Set the inward pull magnitude.
    pub fn with_center_pull(mut self, magnitude: f32) -> Self {
        self.center_pull = magnitude;
        self
    }

    /// Set the world gravity.
    pub fn with_gravity(mut self, gravity: Vec3) -> Self {
        self.gravity = gravity;
        self
    }

    /// Set the number of background stars.
    pub fn with_star_count(mut self, count: usize) -> Self {
        self.star_count = count;
        self
    }

    /// Fix the RNG seed so spawns are reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Override bloom parameters.
    pub fn with_bloom(mut self, bloom: BloomSettings) -> Self {
        self.bloom = bloom;
        self
    }

    /// Override the body material shaders.
    pub fn with_shaders(mut self, shaders: ShaderSource) -> Self {
        self.shaders = shaders;
        self
    }

    /// Radius of the invader sphere's collider.
    pub fn pointer_collider_radius(&self) -> f32 {
        self.pointer_radius * self.pointer_collider_scale
    }

    /// Resolved RNG seed.
    pub(crate) fn resolve_seed(&self) -> u64 {
        self.seed.unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(42)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_demo() {
        let config = SwarmConfig::default();
        assert_eq!(config.body_count, 100);
        assert_eq!(config.star_count, 10_000);
        assert_eq!(config.gravity, Vec3::ZERO);
        assert!((config.pointer_collider_radius() - 0.75).abs() < 1e-6);
        assert_eq!(config.bloom.strength, 1.5);
        assert_eq!(config.bloom.radius, 0.305);
        assert_eq!(config.bloom.threshold, 0.0);
    }

    #[test]
    fn test_builder_chain() {
        let config = SwarmConfig::default()
            .with_body_count(3)
            .with_center_pull(0.0)
            .with_seed(9);
        assert_eq!(config.body_count, 3);
        assert_eq!(config.center_pull, 0.0);
        assert_eq!(config.resolve_seed(), 9);
    }

    #[test]
    fn test_with_bloom_replaces_all_parameters() {
        let bloom = BloomSettings {
            strength: 0.8,
            radius: 1.0,
            threshold: 0.4,
        };
        let config = SwarmConfig::default().with_bloom(bloom);
        assert_eq!(config.bloom, bloom);
    }

    #[test]
    fn test_with_shaders_keeps_supplied_source() {
        let fragment = BODY_FRAGMENT_SHADER.replace("fn fs_main", "fn fs_main_unused");
        let shaders = ShaderSource {
            vertex: Cow::Borrowed(BODY_VERTEX_SHADER),
            fragment: Cow::Owned(fragment.clone()),
        };
        let config = SwarmConfig::default().with_shaders(shaders);
        assert_eq!(config.shaders.vertex, BODY_VERTEX_SHADER);
        assert_eq!(config.shaders.fragment, fragment);
        assert!(matches!(config.shaders.fragment, Cow::Owned(_)));
    }

    #[test]
    fn test_default_shaders_are_embedded() {
        let shaders = ShaderSource::default();
        assert!(shaders.vertex.contains("fn vs_main"));
        assert!(shaders.fragment.contains("fn fs_main"));
    }
}
