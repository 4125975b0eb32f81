use glam::{Mat4, Quat, Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// Near-plane bounds of a (possibly asymmetric) perspective frustum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionFrustum {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
    pub near: f32,
    pub far: f32,
}

impl ProjectionFrustum {
    /// Frustum symmetric about the view axis.
    pub fn symmetric(fov_y_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        let top = near * (fov_y_degrees.to_radians() / 2.0).tan();
        let right = top * aspect;
        Self {
            left: -right,
            right,
            top,
            bottom: -top,
            near,
            far,
        }
    }

    pub fn is_symmetric(&self, tolerance: f32) -> bool {
        (self.left + self.right).abs() <= tolerance && (self.top + self.bottom).abs() <= tolerance
    }

    /// Right-handed, OpenGL-style clip matrix (camera looks down -Z).
    pub fn projection_matrix(&self) -> Mat4 {
        let width = (self.right - self.left).max(f32::EPSILON);
        let height = (self.top - self.bottom).max(f32::EPSILON);
        let depth = (self.far - self.near).max(f32::EPSILON);

        let x = 2.0 * self.near / width;
        let y = 2.0 * self.near / height;
        let a = (self.right + self.left) / width;
        let b = (self.top + self.bottom) / height;
        let c = -(self.far + self.near) / depth;
        let d = -2.0 * self.far * self.near / depth;

        Mat4::from_cols(
            Vec4::new(x, 0.0, 0.0, 0.0),
            Vec4::new(0.0, y, 0.0, 0.0),
            Vec4::new(a, b, c, -1.0),
            Vec4::new(0.0, 0.0, d, 0.0),
        )
    }
}

/// Camera state handed to the renderer every frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraFrame {
    pub position: Vec3,
    pub orientation: Quat,
    /// Set when the camera is aimed at a point instead of using an off-axis frustum.
    pub look_at: Option<Vec3>,
    pub frustum: ProjectionFrustum,
    pub projection: Mat4,
}
