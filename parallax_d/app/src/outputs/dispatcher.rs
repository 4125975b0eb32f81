use super::{CameraSink, OutputBackend};
use anyhow::Result;
use api::CameraFrame;

pub struct Dispatcher {
    backend: OutputBackend,
    sent: u64,
}

impl Dispatcher {
    pub fn new(backend: OutputBackend) -> Self {
        Self { backend, sent: 0 }
    }

    pub fn initialize(&mut self) -> Result<()> {
        self.backend.initialize()
    }

    pub fn send(&mut self, frame: &CameraFrame) -> Result<()> {
        self.backend.send(frame)?;
        self.sent += 1;
        Ok(())
    }

    pub fn frames_sent(&self) -> u64 {
        self.sent
    }
}
