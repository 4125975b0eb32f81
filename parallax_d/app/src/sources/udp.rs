use anyhow::{Context, Result};
use api::{Detection, DetectionSource};
use log::{info, warn};
use std::net::UdpSocket;

const MAX_PACKET_SIZE: usize = 65_536;

/// Receives JSON-encoded detections from an out-of-process detector.
pub struct UdpDetectionSource {
    port: u16,
    socket: Option<UdpSocket>,
    buf: Vec<u8>,
}

impl UdpDetectionSource {
    pub fn new(port: u16) -> Self {
        Self {
            port,
            socket: None,
            buf: vec![0u8; MAX_PACKET_SIZE],
        }
    }

    /// Bound port, useful when constructed with port 0.
    pub fn local_port(&self) -> Option<u16> {
        self.socket
            .as_ref()
            .and_then(|s| s.local_addr().ok())
            .map(|a| a.port())
    }
}

impl DetectionSource for UdpDetectionSource {
    fn initialize(&mut self) -> Result<()> {
        let socket = UdpSocket::bind(format!("0.0.0.0:{}", self.port))
            .with_context(|| format!("Failed to bind detection port {}", self.port))?;
        socket
            .set_nonblocking(true)
            .context("Failed to set non-blocking mode")?;
        self.socket = Some(socket);
        info!("Listening for detections on UDP port {}", self.port);
        Ok(())
    }

    /// Drains everything queued and keeps only the newest valid detection.
    fn poll(&mut self) -> Result<Option<Detection>> {
        let Some(socket) = &self.socket else {
            return Ok(None);
        };

        let mut latest = None;
        loop {
            match socket.recv_from(&mut self.buf) {
                Ok((amt, src)) => match serde_json::from_slice::<Detection>(&self.buf[..amt]) {
                    Ok(detection) => latest = Some(detection),
                    Err(e) => warn!("Dropping malformed detection packet from {}: {}", src, e),
                },
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => break,
                Err(e) => return Err(e).context("Detection socket receive failed"),
            }
        }
        Ok(latest)
    }

    fn unload(&mut self) {
        self.socket = None;
    }
}
