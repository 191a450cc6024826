//! Decorative star background.
//!
//! Stars sit on a thick spherical shell around the scene and slowly tumble.
//! Nothing here touches physics.

use bytemuck::{Pod, Zeroable};
use glam::{EulerRot, Mat4, Vec3};

use crate::spawn::{hsv_to_rgb, SpawnContext};

const SHELL_INNER: f32 = 25.0;
const SHELL_OUTER: f32 = 50.0;
const STAR_HUE: f32 = 0.6;
const STAR_SATURATION: f32 = 0.2;

/// One star as uploaded to the GPU.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Star {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

/// Star positions plus the accumulated rotation of the whole field.
#[derive(Debug, Clone)]
pub struct Starfield {
    stars: Vec<Star>,
    rotation: Vec3,
    rotation_step: f32,
}

impl Starfield {
    /// Scatter `count` pale blue-white stars over the background shell.
    pub fn generate(ctx: &mut SpawnContext, count: usize, rotation_step: f32) -> Self {
        let stars = (0..count)
            .map(|_| {
                let position = ctx.random_in_shell(SHELL_INNER, SHELL_OUTER);
                let hue = STAR_HUE + ctx.random_range(-0.05, 0.05);
                let value = ctx.random_range(0.3, 1.0);
                Star {
                    position: position.to_array(),
                    color: hsv_to_rgb(hue, STAR_SATURATION, value).to_array(),
                }
            })
            .collect();

        Self {
            stars,
            rotation: Vec3::ZERO,
            rotation_step,
        }
    }

    /// Rotate every axis by one step.
    pub fn advance(&mut self) {
        self.rotation += Vec3::splat(self.rotation_step);
    }

    /// Accumulated Euler rotation in radians.
    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    /// Model matrix for the current rotation.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z)
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_star_count_and_shell() {
        let mut ctx = SpawnContext::from_seed(1);
        let field = Starfield::generate(&mut ctx, 2000, 0.0003);
        assert_eq!(field.len(), 2000);
        for star in field.stars() {
            let r = Vec3::from_array(star.position).length();
            assert!(r >= SHELL_INNER - 0.01 && r <= SHELL_OUTER + 0.01);
            assert!(star.color.iter().all(|c| (0.0..=1.0).contains(c)));
        }
    }

    #[test]
    fn test_rotation_advances_all_axes() {
        let mut ctx = SpawnContext::from_seed(1);
        let mut field = Starfield::generate(&mut ctx, 0, 0.0003);
        assert!(field.is_empty());
        for _ in 0..10 {
            field.advance();
        }
        let r = field.rotation();
        assert!((r.x - 0.003).abs() < 1e-6);
        assert_eq!(r.x, r.y);
        assert_eq!(r.y, r.z);
    }
}
