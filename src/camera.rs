//! Camera state and projection matrices

use serde::{Serialize, Deserialize};

use crate::math::{Mat4, Vec3};

/// Perspective camera aimed at a target point. Serializes into scene
/// files, so angles are kept in degrees and missing fields fall back
/// to the stock framing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(2.0, 1.5, 3.0),
            target: Vec3::ZERO,
            up: Vec3::UP,
            fov_y: 60.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl Camera {
    pub fn view(&self) -> Mat4 {
        Mat4::look_at(self.eye, self.target, self.up)
    }

    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective(self.fov_y.to_radians(), aspect, self.near, self.far)
    }

    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection(aspect) * self.view()
    }

    /// Orbit the eye around the target. Pitch is clamped short of the
    /// poles so the view never flips.
    pub fn orbit(&mut self, yaw_delta: f32, pitch_delta: f32) {
        let offset = self.eye - self.target;
        let radius = offset.len();
        if radius == 0.0 {
            return;
        }
        let yaw = offset.x.atan2(offset.z) + yaw_delta;
        let pitch = ((offset.y / radius).clamp(-1.0, 1.0).asin() + pitch_delta).clamp(
            -std::f32::consts::FRAC_PI_2 + 0.01,
            std::f32::consts::FRAC_PI_2 - 0.01,
        );
        self.eye = self.target
            + Vec3::new(
                radius * pitch.cos() * yaw.sin(),
                radius * pitch.sin(),
                radius * pitch.cos() * yaw.cos(),
            );
    }

    /// Scale the eye-target distance, with a floor so the camera can
    /// never land on its own target.
    pub fn dolly(&mut self, factor: f32) {
        let offset = self.eye - self.target;
        let radius = (offset.len() * factor).max(0.05);
        self.eye = self.target + offset.normalize() * radius;
    }

    /// Re-aim at the center of the given bounds and back off far
    /// enough that the whole bounding sphere fits the vertical FOV.
    pub fn frame(&mut self, min: Vec3, max: Vec3) {
        let center = (min + max) * 0.5;
        let radius = ((max - min).len() * 0.5).max(0.001);
        let mut dir = self.eye - self.target;
        if dir.len() == 0.0 {
            dir = Vec3::new(1.0, 0.75, 1.5);
        }
        let distance = radius / (self.fov_y.to_radians() * 0.5).sin().max(0.1);
        self.target = center;
        self.eye = center + dir.normalize() * distance;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orbit_preserves_radius() {
        let mut cam = Camera::default();
        let before = (cam.eye - cam.target).len();
        cam.orbit(0.7, 0.3);
        let after = (cam.eye - cam.target).len();
        assert!((before - after).abs() < 1e-4);
    }

    #[test]
    fn test_orbit_pitch_clamped_at_pole() {
        let mut cam = Camera::default();
        cam.orbit(0.0, 10.0);
        let offset = cam.eye - cam.target;
        // Still short of straight up.
        assert!(offset.y < offset.len() * 0.9999);
        // And the view matrix stays usable.
        let v = cam.view().transform_point(cam.target);
        assert!(v.z < 0.0);
    }

    #[test]
    fn test_dolly_has_minimum_distance() {
        let mut cam = Camera::default();
        cam.dolly(0.0);
        assert!((cam.eye - cam.target).len() >= 0.05);
    }

    #[test]
    fn test_target_projects_to_screen_center() {
        let cam = Camera::default();
        let clip = cam.view_projection(16.0 / 9.0).transform_point(cam.target);
        assert!(clip.w > 0.0);
        assert!(clip.x.abs() < 1e-4);
        assert!(clip.y.abs() < 1e-4);
    }

    #[test]
    fn test_frame_fits_bounds() {
        let mut cam = Camera::default();
        cam.frame(Vec3::new(-2.0, -2.0, -2.0), Vec3::new(2.0, 2.0, 2.0));
        assert_eq!(cam.target, Vec3::ZERO);
        let radius = 12.0f32.sqrt() * 0.5;
        let expected = radius / (cam.fov_y.to_radians() * 0.5).sin();
        assert!(((cam.eye - cam.target).len() - expected).abs() < 1e-3);
    }
}
