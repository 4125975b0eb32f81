use super::CameraSink;
use anyhow::{Context, Result};
use api::CameraFrame;
use log::info;
use std::net::UdpSocket;

/// One JSON `CameraFrame` per datagram.
pub struct JsonUdpSink {
    socket: Option<UdpSocket>,
    target_address: String,
}

impl JsonUdpSink {
    pub fn new(target_address: String) -> Self {
        Self {
            socket: None,
            target_address,
        }
    }
}

impl CameraSink for JsonUdpSink {
    fn initialize(&mut self) -> Result<()> {
        let socket = UdpSocket::bind("0.0.0.0:0").context("Failed to bind UDP socket")?;
        socket
            .connect(&self.target_address)
            .with_context(|| format!("Failed to connect to {}", self.target_address))?;
        socket
            .set_nonblocking(true)
            .context("Failed to set non-blocking mode")?;

        self.socket = Some(socket);
        info!("JSON camera output ready. Target: {}", self.target_address);
        Ok(())
    }

    fn send(&self, frame: &CameraFrame) -> Result<()> {
        if let Some(socket) = &self.socket {
            let payload = serde_json::to_vec(frame)?;
            socket.send(&payload)?;
        }
        Ok(())
    }
}
