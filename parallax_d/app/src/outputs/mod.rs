mod dispatcher;
pub mod json_udp;
pub mod osc;

pub use dispatcher::Dispatcher;

use anyhow::Result;
use api::CameraFrame;
use common::config::OutputConfig;
use common::OutputMode;
use json_udp::JsonUdpSink;
use osc::OscSink;

/// A renderer-facing transport for per-frame camera state.
pub trait CameraSink {
    fn initialize(&mut self) -> Result<()>;
    fn send(&self, frame: &CameraFrame) -> Result<()>;
}

pub enum OutputBackend {
    Json(JsonUdpSink),
    Osc(OscSink),
}

impl CameraSink for OutputBackend {
    fn initialize(&mut self) -> Result<()> {
        match self {
            Self::Json(s) => s.initialize(),
            Self::Osc(s) => s.initialize(),
        }
    }

    fn send(&self, frame: &CameraFrame) -> Result<()> {
        match self {
            Self::Json(s) => s.send(frame),
            Self::Osc(s) => s.send(frame),
        }
    }
}

pub fn create_backend(config: &OutputConfig) -> OutputBackend {
    let target = format!("{}:{}", config.address, config.port);
    match config.mode {
        OutputMode::Json => OutputBackend::Json(JsonUdpSink::new(target)),
        OutputMode::Osc => OutputBackend::Osc(OscSink::new(&target)),
    }
}
