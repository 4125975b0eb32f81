mod camera;
mod detection;
mod motion;

pub use camera::{CameraFrame, ProjectionFrustum};
pub use detection::{BoundingBox, Category, Detection, ObjectDetection};
pub use motion::{HumanoidBone, MotionSample, MotionSource, DEFAULT_SOURCE_FRAME_RATE};

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Normalized viewer position for one sampling tick.
///
/// `x`/`y` sit roughly in `[-1.5, 1.5]` with +y up. `depth` is a unitless
/// ratio against the calibrated neutral distance: 1.0 is neutral, smaller is
/// closer to the screen, larger is farther away.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoseSample {
    pub x: f32,
    pub y: f32,
    pub depth: f32,
}

impl PoseSample {
    pub const NEUTRAL: Self = Self {
        x: 0.0,
        y: 0.0,
        depth: 1.0,
    };

    pub fn new(x: f32, y: f32, depth: f32) -> Self {
        Self { x, y, depth }
    }
}

impl Default for PoseSample {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// Which detector output drives the pose signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TrackingMode {
    #[default]
    #[serde(alias = "face")]
    Face,
    #[serde(alias = "object", alias = "phone", alias = "Phone")]
    Object,
}

/// A detector backend producing at most one detection per poll.
pub trait DetectionSource: Send {
    fn initialize(&mut self) -> Result<()>;

    /// Returns the newest detection since the previous poll, if any.
    fn poll(&mut self) -> Result<Option<Detection>>;

    fn unload(&mut self);
}
