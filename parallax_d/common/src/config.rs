use anyhow::{Context, Result};
use api::TrackingMode;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::calibration::{CalibrationProfile, DevicePreset};
use crate::error::ParallaxError;
use crate::pose_signal::DEFAULT_TARGET_CATEGORY;
use crate::retarget::RetargetConfig;

/// Where detections come from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum DetectionSourceConfig {
    #[serde(alias = "udp")]
    Udp { port: u16 },
    #[serde(alias = "replay")]
    Replay { path: PathBuf },
}

impl Default for DetectionSourceConfig {
    fn default() -> Self {
        Self::Udp {
            port: default_detection_port(),
        }
    }
}

fn default_detection_port() -> u16 {
    5005
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrackingConfig {
    pub mode: TrackingMode,
    pub target_category: String,
    pub source: DetectionSourceConfig,
    pub sampling_interval_ms: u64,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            mode: TrackingMode::Face,
            target_category: DEFAULT_TARGET_CATEGORY.to_string(),
            source: DetectionSourceConfig::default(),
            sampling_interval_ms: 33,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct CalibrationConfig {
    pub preset: DevicePreset,
    /// Seeds the profile when no calibration file exists yet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<CalibrationProfile>,
}

impl CalibrationConfig {
    pub fn initial_profile(&self) -> CalibrationProfile {
        self.profile
            .clone()
            .unwrap_or_else(|| CalibrationProfile::from_preset(self.preset))
    }
}

pub const MIN_RENDER_FPS: f32 = 1.0;
pub const MAX_RENDER_FPS: f32 = 1000.0;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    pub fps: f32,
    pub smoothing_reference_hz: Option<f32>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            fps: 60.0,
            smoothing_reference_hz: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub enum OutputMode {
    #[default]
    #[serde(alias = "json", alias = "JsonUdp")]
    Json,
    #[serde(alias = "osc", alias = "OSC")]
    Osc,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    pub mode: OutputMode,
    pub address: String,
    pub port: u16,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            mode: OutputMode::default(),
            address: "127.0.0.1".to_string(),
            port: 9100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ControlConfig {
    /// 0 picks an ephemeral port.
    pub port: u16,
    pub advertise_mdns: bool,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            port: 0,
            advertise_mdns: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct AppConfig {
    pub tracking: TrackingConfig,
    pub calibration: CalibrationConfig,
    pub retarget: RetargetConfig,
    pub render: RenderConfig,
    pub output: OutputConfig,
    pub control: ControlConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ParallaxError> {
        if !(MIN_RENDER_FPS..=MAX_RENDER_FPS).contains(&self.render.fps) {
            return Err(ParallaxError::invalid(
                "render.fps",
                format!(
                    "must be within {}..={}, got {}",
                    MIN_RENDER_FPS, MAX_RENDER_FPS, self.render.fps
                ),
            ));
        }
        if self.tracking.sampling_interval_ms == 0 {
            return Err(ParallaxError::invalid(
                "tracking.sampling_interval_ms",
                "must be at least 1",
            ));
        }
        if let Some(profile) = &self.calibration.profile {
            profile.validate()?;
        }
        self.retarget.validate()
    }
}

/// Reads `path`, or writes a default config there when it does not exist.
pub fn load_config(path: &Path) -> Result<AppConfig> {
    if path.exists() {
        info!("Loading config from {:?}", path);
        let file = fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let config: AppConfig =
            serde_json::from_reader(reader).with_context(|| format!("Failed to parse {:?}", path))?;
        config.validate()?;
        Ok(config)
    } else {
        info!("Config not found. Creating default at {:?}", path);
        let config = AppConfig::default();
        let file = fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, &config)?;
        Ok(config)
    }
}
