//! Head position to camera transform.
//!
//! The default path keeps the camera unrotated and skews the frustum so the
//! physical screen rectangle at `z = 0` stays pinned to the viewport. As the
//! viewer moves, the scene behind the screen shifts like a view through a
//! window.
//!
//! Smoothing uses a fixed per-frame factor. Sensitivities were tuned against
//! a steady display refresh, so changing the refresh rate changes the feel
//! unless `smoothing_reference_hz` is set.

use api::{CameraFrame, PoseSample, ProjectionFrustum};
use glam::{Mat4, Quat, Vec3};

use crate::calibration::CalibrationProfile;

pub const SMOOTHING_FACTOR: f32 = 0.15;
pub const NEAR_PLANE: f32 = 0.1;
pub const FAR_PLANE: f32 = 1000.0;
pub const MIN_CAMERA_Z: f32 = 1.0;
pub const MAX_CAMERA_Z: f32 = 200.0;
pub const LOOK_AT_FOV_DEGREES: f32 = 50.0;

/// Minimum distance from camera to screen plane in the off-axis math.
const MIN_SCREEN_DISTANCE: f32 = 0.1;

/// Maps a pose to the camera position it should settle at.
pub fn target_position(pose: &PoseSample, profile: &CalibrationProfile) -> Vec3 {
    let corrected = profile.corrected(pose);
    let sens_x = profile.sensitivity_x(corrected.x);
    let sens_y = profile.sensitivity_y(corrected.y);

    let world_x = corrected.x * (profile.screen_width() / 2.0) * sens_x;
    let world_y = corrected.y * (profile.screen_height / 2.0) * sens_y;

    let mut z_delta = (pose.depth - 1.0) * profile.z_sensitivity;
    if profile.invert_z {
        z_delta = -z_delta;
    }
    let world_z = (profile.base_z * (1.0 + z_delta)).clamp(MIN_CAMERA_Z, MAX_CAMERA_Z);

    Vec3::new(world_x, world_y, world_z)
}

/// Projects the screen rectangle through the near plane as seen from `camera`.
pub fn off_axis_frustum(camera: Vec3, profile: &CalibrationProfile) -> ProjectionFrustum {
    let half_w = profile.screen_width() / 2.0;
    let half_h = profile.screen_height / 2.0;
    let dist = camera.z.max(MIN_SCREEN_DISTANCE);

    ProjectionFrustum {
        left: NEAR_PLANE * (-half_w - camera.x) / dist,
        right: NEAR_PLANE * (half_w - camera.x) / dist,
        bottom: NEAR_PLANE * (-half_h - camera.y) / dist,
        top: NEAR_PLANE * (half_h - camera.y) / dist,
        near: NEAR_PLANE,
        far: FAR_PLANE,
    }
}

/// Orientation of a camera at `eye` facing `target` with +Y up.
pub fn look_at_orientation(eye: Vec3, target: Vec3) -> Quat {
    let forward = target - eye;
    if forward.length_squared() < f32::EPSILON {
        return Quat::IDENTITY;
    }
    let forward = forward.normalize();
    let up = if forward.cross(Vec3::Y).length_squared() < 1e-8 {
        Vec3::Z
    } else {
        Vec3::Y
    };
    // view matrix maps world into camera space; its inverse rotation is the camera's
    let view = Mat4::look_at_rh(eye, target, up);
    Quat::from_mat4(&view).inverse()
}

/// Keeps the smoothed camera position between frames.
#[derive(Debug, Clone)]
pub struct ViewportProjector {
    position: Vec3,
    target: Vec3,
    smoothing_reference_hz: Option<f32>,
}

impl ViewportProjector {
    pub fn new(profile: &CalibrationProfile) -> Self {
        let start = Vec3::new(0.0, 0.0, profile.base_z);
        Self {
            position: start,
            target: start,
            smoothing_reference_hz: None,
        }
    }

    /// Normalizes smoothing to frame time. `None` keeps the per-frame factor.
    pub fn with_smoothing_reference(mut self, hz: Option<f32>) -> Self {
        self.smoothing_reference_hz = hz.filter(|h| h.is_finite() && *h > 0.0);
        self
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    fn smoothing_factor(&self, dt: f32) -> f32 {
        match self.smoothing_reference_hz {
            Some(hz) if dt.is_finite() && dt > 0.0 => {
                1.0 - (1.0 - SMOOTHING_FACTOR).powf(dt * hz)
            }
            _ => SMOOTHING_FACTOR,
        }
    }

    /// Advances one render tick and returns the camera for this frame.
    pub fn project(&mut self, pose: &PoseSample, profile: &CalibrationProfile) -> CameraFrame {
        self.project_with_dt(pose, profile, 0.0)
    }

    pub fn project_with_dt(
        &mut self,
        pose: &PoseSample,
        profile: &CalibrationProfile,
        dt: f32,
    ) -> CameraFrame {
        self.target = target_position(pose, profile);
        let alpha = self.smoothing_factor(dt);
        self.position = self.position.lerp(self.target, alpha);

        if profile.look_at_center {
            let frustum = ProjectionFrustum::symmetric(
                LOOK_AT_FOV_DEGREES,
                profile.aspect_ratio,
                NEAR_PLANE,
                FAR_PLANE,
            );
            CameraFrame {
                position: self.position,
                orientation: look_at_orientation(self.position, Vec3::ZERO),
                look_at: Some(Vec3::ZERO),
                frustum,
                projection: frustum.projection_matrix(),
            }
        } else {
            let frustum = off_axis_frustum(self.position, profile);
            CameraFrame {
                position: self.position,
                orientation: Quat::IDENTITY,
                look_at: None,
                frustum,
                projection: frustum.projection_matrix(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smoothing_factor_matches_fixed_at_reference_rate() {
        let projector =
            ViewportProjector::new(&CalibrationProfile::default()).with_smoothing_reference(Some(60.0));
        assert!((projector.smoothing_factor(1.0 / 60.0) - SMOOTHING_FACTOR).abs() < 1e-5);
        assert!(projector.smoothing_factor(1.0 / 30.0) > SMOOTHING_FACTOR);
        assert_eq!(projector.smoothing_factor(0.0), SMOOTHING_FACTOR);
    }

    #[test]
    fn test_look_at_orientation_faces_target() {
        let eye = Vec3::new(5.0, 3.0, 40.0);
        let q = look_at_orientation(eye, Vec3::ZERO);
        let forward = q * Vec3::NEG_Z;
        let expected = (-eye).normalize();
        assert!(forward.abs_diff_eq(expected, 1e-4));
    }
}
