use serde::{Deserialize, Serialize};

use super::axis::AxisPermutation;
use crate::error::ParallaxError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetargetConfig {
    pub axis_map: AxisPermutation,

    pub mirror_x: bool,
    pub mirror_y: bool,
    pub mirror_z: bool,

    /// Rotation-vector sign flips, independent of mirroring.
    pub invert_x: bool,
    pub invert_y: bool,
    pub invert_z: bool,

    pub hip_scale: f32,
    pub hip_height_offset: f32,
    pub arm_pose_offset_degrees: f32,

    pub rotation_offset_x_degrees: f32,
    pub rotation_offset_y_degrees: f32,
    pub rotation_offset_z_degrees: f32,

    pub playback_speed: f32,
    #[serde(rename = "loop", alias = "looping")]
    pub looping: bool,
}

impl Default for RetargetConfig {
    fn default() -> Self {
        Self {
            axis_map: AxisPermutation::Xyz,
            mirror_x: true,
            mirror_y: false,
            mirror_z: true,
            invert_x: true,
            invert_y: true,
            invert_z: false,
            hip_scale: 0.1,
            hip_height_offset: 0.0,
            arm_pose_offset_degrees: 0.0,
            rotation_offset_x_degrees: 0.0,
            rotation_offset_y_degrees: 0.0,
            rotation_offset_z_degrees: 0.0,
            playback_speed: 1.0,
            looping: true,
        }
    }
}

impl RetargetConfig {
    /// Identity conversion apart from the fixed handedness flip.
    pub fn passthrough() -> Self {
        Self {
            mirror_x: false,
            mirror_z: false,
            invert_x: false,
            invert_y: false,
            hip_scale: 1.0,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ParallaxError> {
        if !self.hip_scale.is_finite() || self.hip_scale <= 0.0 {
            return Err(ParallaxError::invalid(
                "hip_scale",
                format!("must be a finite value > 0, got {}", self.hip_scale),
            ));
        }
        if !self.playback_speed.is_finite() || self.playback_speed <= 0.0 {
            return Err(ParallaxError::invalid(
                "playback_speed",
                format!("must be a finite value > 0, got {}", self.playback_speed),
            ));
        }
        let finite = [
            ("hip_height_offset", self.hip_height_offset),
            ("arm_pose_offset_degrees", self.arm_pose_offset_degrees),
            ("rotation_offset_x_degrees", self.rotation_offset_x_degrees),
            ("rotation_offset_y_degrees", self.rotation_offset_y_degrees),
            ("rotation_offset_z_degrees", self.rotation_offset_z_degrees),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(ParallaxError::invalid(field, "must be finite"));
            }
        }
        Ok(())
    }
}
