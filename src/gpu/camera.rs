//! Orbit camera and its controls.

use glam::{Mat4, Vec2, Vec3};

use crate::config::CameraSettings;

const MIN_PITCH: f32 = -1.5;
const MAX_PITCH: f32 = 1.5;
const MIN_DISTANCE: f32 = 1.0;
const MAX_DISTANCE: f32 = 100.0;

/// Perspective camera orbiting a target point.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Horizontal rotation angle in radians.
    pub yaw: f32,
    /// Vertical rotation angle in radians.
    pub pitch: f32,
    /// Distance from the target point.
    pub distance: f32,
    /// Point the camera orbits around.
    pub target: Vec3,
    fov_y: f32,
    near: f32,
    far: f32,
}

impl Camera {
    /// Place the camera at `settings.position`, looking at `settings.target`.
    pub fn new(settings: &CameraSettings) -> Self {
        let offset = settings.position - settings.target;
        let distance = offset.length().max(MIN_DISTANCE);
        Self {
            yaw: offset.x.atan2(offset.z),
            pitch: (offset.y / distance).clamp(-1.0, 1.0).asin(),
            distance,
            target: settings.target,
            fov_y: settings.fov_y_degrees.to_radians(),
            near: settings.near,
            far: settings.far,
        }
    }

    /// Calculate the camera's world position.
    pub fn position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + Vec3::new(x, y, z)
    }

    /// Calculate the view matrix for rendering.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, aspect, self.near, self.far)
    }
}

/// Turns accumulated drag and scroll into camera motion.
#[derive(Debug, Clone, Copy)]
pub struct OrbitControls {
    /// Radians per dragged pixel.
    pub rotate_speed: f32,
    /// Fractional zoom per scrolled line.
    pub zoom_speed: f32,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            rotate_speed: 0.005,
            zoom_speed: 0.05,
        }
    }
}

impl OrbitControls {
    /// Apply one tick's worth of input to the camera.
    pub fn update(&self, camera: &mut Camera, drag: Vec2, scroll: f32) {
        camera.yaw -= drag.x * self.rotate_speed;
        camera.pitch = (camera.pitch + drag.y * self.rotate_speed).clamp(MIN_PITCH, MAX_PITCH);

        if scroll != 0.0 {
            let factor = (1.0 - self.zoom_speed).powf(scroll);
            camera.distance = (camera.distance * factor).clamp(MIN_DISTANCE, MAX_DISTANCE);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_starts_at_configured_position() {
        let camera = Camera::new(&CameraSettings::default());
        let pos = camera.position();
        assert!((pos - Vec3::new(1.0, 0.0, 4.0)).length() < 1e-4);
    }

    #[test]
    fn test_controls_clamp_pitch_and_distance() {
        let mut camera = Camera::new(&CameraSettings::default());
        let controls = OrbitControls::default();

        controls.update(&mut camera, Vec2::new(0.0, 10_000.0), 0.0);
        assert_eq!(camera.pitch, MAX_PITCH);

        controls.update(&mut camera, Vec2::ZERO, 1_000.0);
        assert_eq!(camera.distance, MIN_DISTANCE);

        controls.update(&mut camera, Vec2::ZERO, -1_000.0);
        assert_eq!(camera.distance, MAX_DISTANCE);
    }

    #[test]
    fn test_scroll_forward_zooms_in() {
        let mut camera = Camera::new(&CameraSettings::default());
        let before = camera.distance;
        OrbitControls::default().update(&mut camera, Vec2::ZERO, 1.0);
        assert!(camera.distance < before);
    }

    #[test]
    fn test_no_input_no_motion() {
        let mut camera = Camera::new(&CameraSettings::default());
        let before = camera.position();
        OrbitControls::default().update(&mut camera, Vec2::ZERO, 0.0);
        assert_eq!(camera.position(), before);
    }
}
