use api::{Detection, PoseSample, TrackingMode};
use glam::Vec2;
use log::{debug, info};

/// Nose tip in the face landmark topology.
pub const PRIMARY_LANDMARK: usize = 1;
/// Left/right face edges used as the distance proxy.
pub const FACE_EDGE_LEFT: usize = 234;
pub const FACE_EDGE_RIGHT: usize = 454;

/// Fixed linear gain; negative because the camera feed is mirrored.
pub const POSITION_GAIN: f32 = -3.0;
pub const WIDTH_EPSILON: f32 = 0.01;
pub const DEFAULT_NEUTRAL_WIDTH: f32 = 0.2;
pub const DEFAULT_TARGET_CATEGORY: &str = "cell phone";

#[derive(Debug, Clone, Copy)]
struct WidthTracker {
    neutral: f32,
    last_observed: f32,
}

impl Default for WidthTracker {
    fn default() -> Self {
        Self {
            neutral: DEFAULT_NEUTRAL_WIDTH,
            last_observed: DEFAULT_NEUTRAL_WIDTH,
        }
    }
}

impl WidthTracker {
    fn observe(&mut self, width: f32) -> f32 {
        self.last_observed = width;
        self.neutral / width.max(WIDTH_EPSILON)
    }
}

/// Turns raw detections into a normalized `(x, y, depth)` pose.
///
/// Face and object modes keep separate neutral widths so switching modes
/// does not lose either calibration.
#[derive(Debug, Clone)]
pub struct PoseSignalAdapter {
    mode: TrackingMode,
    target_category: String,
    info: PoseSample,
    face: WidthTracker,
    object: WidthTracker,
}

impl Default for PoseSignalAdapter {
    fn default() -> Self {
        Self::new(TrackingMode::Face, DEFAULT_TARGET_CATEGORY)
    }
}

impl PoseSignalAdapter {
    pub fn new(mode: TrackingMode, target_category: &str) -> Self {
        Self {
            mode,
            target_category: target_category.to_string(),
            info: PoseSample::NEUTRAL,
            face: WidthTracker::default(),
            object: WidthTracker::default(),
        }
    }

    pub fn mode(&self) -> TrackingMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: TrackingMode) {
        if self.mode != mode {
            info!("Tracking mode switched to {:?}", mode);
        }
        self.mode = mode;
    }

    pub fn latest(&self) -> PoseSample {
        self.info
    }

    pub fn neutral_width(&self) -> f32 {
        self.active().neutral
    }

    pub fn last_observed_width(&self) -> f32 {
        self.active().last_observed
    }

    fn active(&self) -> &WidthTracker {
        match self.mode {
            TrackingMode::Face => &self.face,
            TrackingMode::Object => &self.object,
        }
    }

    fn active_mut(&mut self) -> &mut WidthTracker {
        match self.mode {
            TrackingMode::Face => &mut self.face,
            TrackingMode::Object => &mut self.object,
        }
    }

    fn map_position(raw: Vec2) -> (f32, f32) {
        ((raw.x - 0.5) * POSITION_GAIN, (raw.y - 0.5) * POSITION_GAIN)
    }

    /// Feeds one sampling tick. With no usable detection the previous pose is kept.
    pub fn update(&mut self, detection: Option<&Detection>) -> PoseSample {
        match detection {
            Some(Detection::Face { landmarks }) if self.mode == TrackingMode::Face => {
                self.update_face(landmarks);
            }
            Some(Detection::Objects {
                frame_width,
                frame_height,
                detections,
            }) if self.mode == TrackingMode::Object => {
                let target = detections
                    .iter()
                    .find(|d| d.has_category(&self.target_category));
                if let Some(found) = target {
                    if *frame_width > 0.0 && *frame_height > 0.0 {
                        let center = found.bounding_box.center();
                        let normalized =
                            Vec2::new(center.x / frame_width, center.y / frame_height);
                        let width = found.bounding_box.width / frame_width;
                        self.apply(normalized, width);
                    }
                }
            }
            _ => {}
        }
        self.info
    }

    fn update_face(&mut self, landmarks: &[Vec2]) {
        let (Some(nose), Some(left), Some(right)) = (
            landmarks.get(PRIMARY_LANDMARK),
            landmarks.get(FACE_EDGE_LEFT),
            landmarks.get(FACE_EDGE_RIGHT),
        ) else {
            debug!(
                "Ignoring face detection with {} landmarks",
                landmarks.len()
            );
            return;
        };

        let width = left.distance(*right);
        self.apply(*nose, width);
    }

    fn apply(&mut self, raw: Vec2, width: f32) {
        let (x, y) = Self::map_position(raw);
        let depth = self.active_mut().observe(width);
        self.info = PoseSample { x, y, depth };
    }

    /// Adopts the last observed width as neutral distance for the active mode.
    pub fn calibrate_distance(&mut self) {
        let mode = self.mode;
        let tracker = self.active_mut();
        if tracker.last_observed > 0.0 {
            tracker.neutral = tracker.last_observed;
            info!(
                "Calibrated neutral {:?} width: {:.4}",
                mode, tracker.neutral
            );
        }
    }
}
