use api::PoseSample;
use glam::Vec2;
use log::info;
use serde::{Deserialize, Serialize};

use crate::error::ParallaxError;

/// Corner readings closer to center than this leave the sensitivity alone.
pub const SENSITIVITY_EPSILON: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DevicePreset {
    #[default]
    #[serde(alias = "pc")]
    Desktop,
    Mobile,
}

/// One step of the manual five-point calibration. Steps are independent;
/// the usual order is center first, then the corners clockwise from top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationStep {
    Center,
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl CalibrationStep {
    pub const ALL: [CalibrationStep; 5] = [
        Self::Center,
        Self::TopLeft,
        Self::TopRight,
        Self::BottomRight,
        Self::BottomLeft,
    ];

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "center" => Some(Self::Center),
            "top_left" => Some(Self::TopLeft),
            "top_right" => Some(Self::TopRight),
            "bottom_right" => Some(Self::BottomRight),
            "bottom_left" => Some(Self::BottomLeft),
            _ => None,
        }
    }

    /// `(is_left, is_top)` for corner steps.
    fn corner(self) -> Option<(bool, bool)> {
        match self {
            Self::Center => None,
            Self::TopLeft => Some((true, true)),
            Self::TopRight => Some((false, true)),
            Self::BottomRight => Some((false, false)),
            Self::BottomLeft => Some((true, false)),
        }
    }
}

/// Offsets, quadrant sensitivities and physical screen geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationProfile {
    pub offset_x: f32,
    pub offset_y: f32,

    pub sensitivity_x_left: f32,
    pub sensitivity_x_right: f32,
    pub sensitivity_y_top: f32,
    pub sensitivity_y_bottom: f32,

    pub invert_x: bool,
    pub invert_y: bool,
    pub invert_z: bool,
    pub look_at_center: bool,

    /// Physical screen height in world units (cm).
    pub screen_height: f32,
    pub aspect_ratio: f32,
    /// Neutral viewing distance in world units.
    pub base_z: f32,
    pub z_sensitivity: f32,
}

impl Default for CalibrationProfile {
    fn default() -> Self {
        Self::desktop()
    }
}

impl CalibrationProfile {
    pub fn desktop() -> Self {
        Self {
            offset_x: 0.0,
            offset_y: 0.0,
            sensitivity_x_left: 1.691377,
            sensitivity_x_right: 1.652277,
            sensitivity_y_top: 1.943930,
            sensitivity_y_bottom: 1.2780,
            invert_x: false,
            invert_y: false,
            invert_z: false,
            look_at_center: false,
            screen_height: 20.0,
            aspect_ratio: 1.0,
            base_z: 70.8,
            z_sensitivity: 0.8,
        }
    }

    pub fn mobile() -> Self {
        Self {
            sensitivity_x_left: 1.5574,
            sensitivity_x_right: 1.5574,
            sensitivity_y_top: 1.7548,
            sensitivity_y_bottom: 2.6053,
            base_z: 50.0,
            ..Self::desktop()
        }
    }

    pub fn from_preset(preset: DevicePreset) -> Self {
        match preset {
            DevicePreset::Desktop => Self::desktop(),
            DevicePreset::Mobile => Self::mobile(),
        }
    }

    pub fn screen_width(&self) -> f32 {
        self.screen_height * self.aspect_ratio
    }

    /// Raw pose plus offset, with the X/Y invert flags applied.
    pub fn corrected(&self, pose: &PoseSample) -> Vec2 {
        let x = pose.x + self.offset_x;
        let y = pose.y + self.offset_y;
        Vec2::new(
            if self.invert_x { -x } else { x },
            if self.invert_y { -y } else { y },
        )
    }

    /// Horizontal sensitivity for a corrected X coordinate.
    pub fn sensitivity_x(&self, corrected_x: f32) -> f32 {
        if corrected_x < 0.0 {
            self.sensitivity_x_left
        } else {
            self.sensitivity_x_right
        }
    }

    /// Vertical sensitivity for a corrected Y coordinate (+Y is up).
    pub fn sensitivity_y(&self, corrected_y: f32) -> f32 {
        if corrected_y > 0.0 {
            self.sensitivity_y_top
        } else {
            self.sensitivity_y_bottom
        }
    }

    pub fn apply_step(&mut self, step: CalibrationStep, pose: &PoseSample) {
        let Some((is_left, is_top)) = step.corner() else {
            self.offset_x = -pose.x;
            self.offset_y = -pose.y;
            info!(
                "Center calibrated: offset_x={:.4}, offset_y={:.4}",
                self.offset_x, self.offset_y
            );
            return;
        };

        let corrected = self.corrected(pose);

        if corrected.x.abs() > SENSITIVITY_EPSILON {
            let value = 1.0 / corrected.x.abs();
            if is_left {
                self.sensitivity_x_left = value;
            } else {
                self.sensitivity_x_right = value;
            }
        }
        if corrected.y.abs() > SENSITIVITY_EPSILON {
            let value = 1.0 / corrected.y.abs();
            if is_top {
                self.sensitivity_y_top = value;
            } else {
                self.sensitivity_y_bottom = value;
            }
        }

        info!(
            "{:?} calibrated: sens_x=({:.4}, {:.4}) sens_y=({:.4}, {:.4})",
            step,
            self.sensitivity_x_left,
            self.sensitivity_x_right,
            self.sensitivity_y_top,
            self.sensitivity_y_bottom
        );
    }

    pub fn validate(&self) -> Result<(), ParallaxError> {
        let positive = [
            ("sensitivity_x_left", self.sensitivity_x_left),
            ("sensitivity_x_right", self.sensitivity_x_right),
            ("sensitivity_y_top", self.sensitivity_y_top),
            ("sensitivity_y_bottom", self.sensitivity_y_bottom),
            ("screen_height", self.screen_height),
            ("aspect_ratio", self.aspect_ratio),
            ("base_z", self.base_z),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ParallaxError::invalid(
                    field,
                    format!("must be a finite value > 0, got {}", value),
                ));
            }
        }

        let finite = [
            ("offset_x", self.offset_x),
            ("offset_y", self.offset_y),
            ("z_sensitivity", self.z_sensitivity),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(ParallaxError::invalid(field, "must be finite"));
            }
        }

        Ok(())
    }
}
