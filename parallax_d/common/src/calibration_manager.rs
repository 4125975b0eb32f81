use crate::calibration::{CalibrationProfile, DevicePreset};
use anyhow::{Context, Result};
use log::info;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

const CALIBRATION_FILENAME: &str = "calibration.json";

pub struct CalibrationManager {
    pub profile: CalibrationProfile,
    preset: DevicePreset,
    storage_path: PathBuf,
}

impl CalibrationManager {
    pub fn new(storage_dir: PathBuf, preset: DevicePreset) -> Self {
        Self {
            profile: CalibrationProfile::from_preset(preset),
            preset,
            storage_path: storage_dir.join(CALIBRATION_FILENAME),
        }
    }

    pub fn storage_path(&self) -> &Path {
        &self.storage_path
    }

    /// Non-finite or non-positive values fall back to the preset's.
    fn sanitized_for_save(&self) -> CalibrationProfile {
        let defaults = CalibrationProfile::from_preset(self.preset);
        let mut profile = self.profile.clone();

        let positive = |value: f32, fallback: f32| {
            if value.is_finite() && value > 0.0 {
                value
            } else {
                fallback
            }
        };
        let finite = |value: f32, fallback: f32| {
            if value.is_finite() {
                value
            } else {
                fallback
            }
        };

        profile.offset_x = finite(profile.offset_x, defaults.offset_x);
        profile.offset_y = finite(profile.offset_y, defaults.offset_y);
        profile.sensitivity_x_left =
            positive(profile.sensitivity_x_left, defaults.sensitivity_x_left);
        profile.sensitivity_x_right =
            positive(profile.sensitivity_x_right, defaults.sensitivity_x_right);
        profile.sensitivity_y_top = positive(profile.sensitivity_y_top, defaults.sensitivity_y_top);
        profile.sensitivity_y_bottom =
            positive(profile.sensitivity_y_bottom, defaults.sensitivity_y_bottom);
        profile.screen_height = positive(profile.screen_height, defaults.screen_height);
        profile.aspect_ratio = positive(profile.aspect_ratio, defaults.aspect_ratio);
        profile.base_z = positive(profile.base_z, defaults.base_z);
        profile.z_sensitivity = finite(profile.z_sensitivity, defaults.z_sensitivity);

        profile
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.storage_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create calibration dir: {:?}", parent))?;
            }
        }
        let file = File::create(&self.storage_path).context("Failed to create calibration file")?;
        let sanitized = self.sanitized_for_save();
        serde_json::to_writer_pretty(file, &sanitized)
            .context("Failed to serialize calibration profile")?;
        info!("Saved calibration profile to {:?}", self.storage_path);
        Ok(())
    }

    pub fn load(&mut self) -> Result<()> {
        if !self.storage_path.exists() {
            info!(
                "No calibration file found at {:?}, using {:?} defaults",
                self.storage_path, self.preset
            );
            return Ok(());
        }

        let file = File::open(&self.storage_path).context("Failed to open calibration file")?;
        let reader = BufReader::new(file);
        let profile: CalibrationProfile =
            serde_json::from_reader(reader).context("Failed to deserialize calibration profile")?;
        profile
            .validate()
            .context("Stored calibration profile is invalid")?;

        self.profile = profile;
        info!("Loaded calibration profile from {:?}", self.storage_path);
        Ok(())
    }

    pub fn reset(&mut self) {
        self.profile = CalibrationProfile::from_preset(self.preset);
    }
}
