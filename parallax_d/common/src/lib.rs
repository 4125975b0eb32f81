pub use api::{
    CameraFrame, Detection, HumanoidBone, MotionSample, MotionSource, PoseSample,
    ProjectionFrustum, TrackingMode,
};

mod calibration;
pub mod calibration_manager;
pub mod config;
mod error;
mod pose_signal;
pub mod projector;
pub mod retarget;
mod snapshot;
mod throttle;

pub use calibration::{CalibrationProfile, CalibrationStep, DevicePreset, SENSITIVITY_EPSILON};
pub use calibration_manager::CalibrationManager;
pub use config::{AppConfig, OutputMode};
pub use error::ParallaxError;
pub use pose_signal::{PoseSignalAdapter, DEFAULT_NEUTRAL_WIDTH, DEFAULT_TARGET_CATEGORY};
pub use projector::ViewportProjector;
pub use retarget::{
    MotionRetargeter, RetargetConfig, RetargetSession, RetargetedClip, TargetSkeleton,
};
pub use snapshot::PoseChannel;
pub use throttle::{SamplingThrottle, DEFAULT_SAMPLING_INTERVAL};
