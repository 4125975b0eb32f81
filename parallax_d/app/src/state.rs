use api::{CameraFrame, PoseSample, TrackingMode};
use common::retarget::RetargetSession;
use common::{CalibrationManager, CalibrationProfile, CalibrationStep, ParallaxError, PoseChannel};
use log::{error, info};
use serde::Serialize;
use std::sync::{Arc, RwLock};

/// Work handed from the control surface to the sampling thread.
#[derive(Debug, Clone, Default)]
pub struct SamplingRequests {
    pub calibrate_distance: bool,
    pub mode: Option<TrackingMode>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub pose: PoseSample,
    pub has_pose: bool,
    pub mode: TrackingMode,
    pub camera: Option<CameraFrame>,
    pub retarget_busy: bool,
}

/// Everything shared between the sampling thread, the render loop and the
/// control server.
#[derive(Clone)]
pub struct DaemonState {
    pub pose: PoseChannel,
    pub calibration: Arc<RwLock<CalibrationManager>>,
    pub camera: Arc<RwLock<Option<CameraFrame>>>,
    pub mode: Arc<RwLock<TrackingMode>>,
    pub requests: Arc<RwLock<SamplingRequests>>,
    pub retarget: Arc<RetargetSession>,
}

impl DaemonState {
    pub fn new(calibration: CalibrationManager, mode: TrackingMode, retarget: RetargetSession) -> Self {
        Self {
            pose: PoseChannel::new(),
            calibration: Arc::new(RwLock::new(calibration)),
            camera: Arc::new(RwLock::new(None)),
            mode: Arc::new(RwLock::new(mode)),
            requests: Arc::new(RwLock::new(SamplingRequests::default())),
            retarget: Arc::new(retarget),
        }
    }

    pub fn status(&self) -> StatusSnapshot {
        StatusSnapshot {
            pose: self.pose.latest(),
            has_pose: self.pose.has_sample(),
            mode: *self.mode.read().unwrap_or_else(|e| e.into_inner()),
            camera: *self.camera.read().unwrap_or_else(|e| e.into_inner()),
            retarget_busy: self.retarget.is_busy(),
        }
    }

    pub fn profile(&self) -> CalibrationProfile {
        self.calibration
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .profile
            .clone()
    }

    /// Replaces the profile after validating it and persists the result.
    pub fn set_profile(&self, profile: CalibrationProfile) -> Result<(), ParallaxError> {
        profile.validate()?;
        let mut manager = self.calibration.write().unwrap_or_else(|e| e.into_inner());
        manager.profile = profile;
        if let Err(e) = manager.save() {
            error!("Failed to save calibration: {}", e);
        }
        Ok(())
    }

    /// Applies one calibration step against the latest published pose.
    pub fn calibration_step(&self, step: CalibrationStep) -> Result<CalibrationProfile, ParallaxError> {
        if !self.pose.has_sample() {
            return Err(ParallaxError::MissingTarget(
                "no pose has been observed yet".into(),
            ));
        }
        let pose = self.pose.latest();

        let profile = {
            let mut manager = self.calibration.write().unwrap_or_else(|e| e.into_inner());
            manager.profile.apply_step(step, &pose);
            if let Err(e) = manager.save() {
                error!("Failed to save calibration: {}", e);
            }
            manager.profile.clone()
        };

        if step == CalibrationStep::Center {
            self.request_distance_calibration();
        }
        Ok(profile)
    }

    pub fn request_distance_calibration(&self) {
        self.requests
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .calibrate_distance = true;
    }

    pub fn request_mode(&self, mode: TrackingMode) {
        info!("Tracking mode change requested: {:?}", mode);
        self.requests.write().unwrap_or_else(|e| e.into_inner()).mode = Some(mode);
    }

    /// Hands pending requests to the sampling thread and clears them.
    pub fn take_requests(&self) -> SamplingRequests {
        std::mem::take(&mut *self.requests.write().unwrap_or_else(|e| e.into_inner()))
    }
}
