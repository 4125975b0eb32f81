use api::MotionSource;
use log::{info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use super::{MotionRetargeter, RetargetConfig, RetargetedClip, TargetSkeleton};
use crate::error::ParallaxError;

#[derive(Default)]
struct SessionState {
    retargeter: MotionRetargeter,
    config: RetargetConfig,
    source: Option<Arc<MotionSource>>,
    clip: Option<Arc<RetargetedClip>>,
}

/// Owns the last good clip for one avatar and serializes retargets onto it.
///
/// Only one retarget runs at a time; a second request while one is running
/// gets `RetargetInFlight`. A failed retarget leaves the previous clip in place.
#[derive(Default)]
pub struct RetargetSession {
    state: Mutex<SessionState>,
    in_flight: AtomicBool,
}

struct FlightGuard<'a>(&'a AtomicBool);

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl RetargetSession {
    pub fn new(config: RetargetConfig) -> Self {
        Self {
            state: Mutex::new(SessionState {
                config,
                ..SessionState::default()
            }),
            in_flight: AtomicBool::new(false),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn begin(&self) -> Result<FlightGuard<'_>, ParallaxError> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ParallaxError::RetargetInFlight)?;
        Ok(FlightGuard(&self.in_flight))
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn clip(&self) -> Option<Arc<RetargetedClip>> {
        self.lock().clip.clone()
    }

    pub fn config(&self) -> RetargetConfig {
        self.lock().config.clone()
    }

    pub fn skeleton(&self) -> Option<TargetSkeleton> {
        self.lock().retargeter.skeleton().cloned()
    }

    pub fn has_source(&self) -> bool {
        self.lock().source.is_some()
    }

    /// Installs a new avatar. Any loaded motion is retargeted onto it; if that
    /// fails the old clip is dropped since it belongs to the old skeleton.
    pub fn load_skeleton(
        &self,
        skeleton: TargetSkeleton,
    ) -> Result<Option<Arc<RetargetedClip>>, ParallaxError> {
        let _guard = self.begin()?;
        let (source, config, retargeter) = {
            let mut state = self.lock();
            state.retargeter.load_skeleton(skeleton);
            state.clip = None;
            (
                state.source.clone(),
                state.config.clone(),
                state.retargeter.clone(),
            )
        };
        let Some(source) = source else {
            return Ok(None);
        };
        let clip = Arc::new(retargeter.retarget(&source, &config)?);
        self.lock().clip = Some(clip.clone());
        Ok(Some(clip))
    }

    /// Retargets `source` with the current config and keeps it for later re-runs.
    pub fn load_source(&self, source: MotionSource) -> Result<Arc<RetargetedClip>, ParallaxError> {
        let _guard = self.begin()?;
        let source = Arc::new(source);
        let (config, retargeter) = {
            let state = self.lock();
            (state.config.clone(), state.retargeter.clone())
        };
        let clip = match retargeter.retarget(&source, &config) {
            Ok(clip) => Arc::new(clip),
            Err(e) => {
                warn!("Retarget failed, keeping previous clip: {}", e);
                return Err(e);
            }
        };
        let mut state = self.lock();
        state.source = Some(source);
        state.clip = Some(clip.clone());
        Ok(clip)
    }

    /// Replaces the config and re-runs against the loaded motion, if any.
    /// The config is only adopted when the re-run succeeds.
    pub fn set_config(
        &self,
        config: RetargetConfig,
    ) -> Result<Option<Arc<RetargetedClip>>, ParallaxError> {
        config.validate()?;
        let _guard = self.begin()?;
        let (source, retargeter) = {
            let state = self.lock();
            (state.source.clone(), state.retargeter.clone())
        };

        let clip = match source {
            Some(source) if retargeter.skeleton().is_some() => {
                Some(Arc::new(retargeter.retarget(&source, &config)?))
            }
            _ => None,
        };

        let mut state = self.lock();
        state.config = config;
        if let Some(clip) = &clip {
            state.clip = Some(clip.clone());
        }
        info!("Retarget config updated");
        Ok(clip)
    }
}
