use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::TrackingMode;

/// One detector result for a single camera frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Detection {
    /// Face landmarks in normalized image space (`[0,1] x [0,1]`).
    Face { landmarks: Vec<Vec2> },
    /// Classified boxes in pixel space of a `frame_width x frame_height` frame.
    Objects {
        frame_width: f32,
        frame_height: f32,
        detections: Vec<ObjectDetection>,
    },
}

impl Detection {
    pub fn mode(&self) -> TrackingMode {
        match self {
            Self::Face { .. } => TrackingMode::Face,
            Self::Objects { .. } => TrackingMode::Object,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub origin_x: f32,
    pub origin_y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    pub fn center(&self) -> Vec2 {
        Vec2::new(
            self.origin_x + self.width / 2.0,
            self.origin_y + self.height / 2.0,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    #[serde(default)]
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectDetection {
    pub bounding_box: BoundingBox,
    #[serde(default)]
    pub categories: Vec<Category>,
}

impl ObjectDetection {
    pub fn has_category(&self, name: &str) -> bool {
        self.categories.iter().any(|c| c.name == name)
    }
}
