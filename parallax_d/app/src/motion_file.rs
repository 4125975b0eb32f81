//! Motion samples exported by an external animation parser.
//!
//! ```json
//! { "frame_rate": 30.0,
//!   "samples": [ { "bone": "センター", "frame": 0,
//!                  "position": [0.0, 10.0, 0.0], "rotation": [0.0, 0.0, 0.0, 1.0] } ] }
//! ```

use anyhow::{Context, Result};
use api::MotionSource;
use common::retarget::validate_source;
use common::ParallaxError;
use log::info;
use std::fs;
use std::path::Path;

/// Parse errors and bad values come back as `ParallaxError::MalformedSource`;
/// read failures keep their IO error.
pub fn parse_motion(json: &str) -> Result<MotionSource, ParallaxError> {
    let source: MotionSource =
        serde_json::from_str(json).map_err(|e| ParallaxError::malformed(e.to_string()))?;
    validate_source(&source)?;
    Ok(source)
}

pub fn load_motion_file(path: &Path) -> Result<MotionSource> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read motion file {:?}", path))?;
    let source = parse_motion(&json)?;
    info!(
        "Loaded {} motion samples at {} fps from {:?}",
        source.samples.len(),
        source.frame_rate,
        path
    );
    Ok(source)
}
