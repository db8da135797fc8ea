//! Orbit camera for the 3D viewport.

use glam::{Mat4, Vec3};

use crate::config::ModelScale;

/// Vertical field of view in degrees.
pub const FOV_Y_DEGREES: f32 = 60.0;
pub const NEAR: f32 = 0.1;
pub const FAR: f32 = 1000.0;

/// Ratio between the framing offset along each axis and the largest box side.
const FRAMING: f32 = 1.2;
const MIN_PITCH: f32 = -1.5;
const MAX_PITCH: f32 = 1.5;

/// Orbit camera looking at the simulation box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitCamera {
    /// Horizontal rotation angle in radians.
    pub yaw: f32,
    /// Vertical rotation angle in radians.
    pub pitch: f32,
    /// Distance from the target point.
    pub distance: f32,
    /// Point the camera orbits around.
    pub target: Vec3,
    /// Viewport width over height.
    pub aspect: f32,
}

impl OrbitCamera {
    /// Camera on the `(d, d, d)` diagonal with `d = 1.2 * max side`.
    pub fn framing(scale: &ModelScale, aspect: f32) -> Self {
        let d = scale.max_extent() as f32 * FRAMING;
        Self {
            yaw: std::f32::consts::FRAC_PI_4,
            pitch: (1.0 / 2.0_f32.sqrt()).atan(),
            distance: d * 3.0_f32.sqrt(),
            target: Vec3::ZERO,
            aspect: sanitize_aspect(aspect),
        }
    }

    /// Calculate the camera's world position.
    pub fn position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + Vec3::new(x, y, z)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(FOV_Y_DEGREES.to_radians(), self.aspect, NEAR, FAR)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = sanitize_aspect(aspect);
    }

    /// Rotate around the target by a pointer drag (radians).
    pub fn orbit(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.yaw += delta_yaw;
        self.pitch = (self.pitch + delta_pitch).clamp(MIN_PITCH, MAX_PITCH);
    }

    /// Scale the distance; `factor < 1` moves closer.
    pub fn zoom(&mut self, factor: f32) {
        if factor.is_finite() && factor > 0.0 {
            self.distance = (self.distance * factor).clamp(NEAR * 2.0, FAR * 0.5);
        }
    }
}

fn sanitize_aspect(aspect: f32) -> f32 {
    if aspect.is_finite() && aspect > 0.0 {
        aspect
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_framing_sits_on_diagonal() {
        let scale = ModelScale {
            length: 0.5,
            width: 2.0,
            height: 1.0,
        };
        let camera = OrbitCamera::framing(&scale, 1.5);
        let pos = camera.position();
        let d = 2.4;
        assert!((pos - Vec3::splat(d)).length() < 1e-4, "{pos:?}");
        assert_eq!(camera.aspect, 1.5);
    }

    #[test]
    fn test_degenerate_aspect_falls_back() {
        let mut camera = OrbitCamera::framing(
            &ModelScale {
                length: 1.0,
                width: 1.0,
                height: 1.0,
            },
            0.0,
        );
        assert_eq!(camera.aspect, 1.0);
        camera.set_aspect(f32::NAN);
        assert_eq!(camera.aspect, 1.0);
    }

    #[test]
    fn test_pitch_is_clamped() {
        let mut camera = OrbitCamera::framing(
            &ModelScale {
                length: 1.0,
                width: 1.0,
                height: 1.0,
            },
            1.0,
        );
        camera.orbit(0.0, 10.0);
        assert_eq!(camera.pitch, MAX_PITCH);
    }
}
