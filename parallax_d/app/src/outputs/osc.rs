use super::CameraSink;
use anyhow::Result;
use api::CameraFrame;
use log::info;
use rosc::{encoder, OscBundle, OscMessage, OscPacket, OscType};
use std::net::UdpSocket;

pub const POSITION_ADDR: &str = "/parallax/camera/position";
pub const ORIENTATION_ADDR: &str = "/parallax/camera/orientation";
pub const FRUSTUM_ADDR: &str = "/parallax/camera/frustum";
pub const LOOK_AT_ADDR: &str = "/parallax/camera/look_at";

pub struct OscSink {
    socket: Option<UdpSocket>,
    target_addr: String,
}

impl OscSink {
    pub fn new(target_addr: &str) -> Self {
        Self {
            socket: None,
            target_addr: target_addr.to_string(),
        }
    }
}

fn floats(values: &[f32]) -> Vec<OscType> {
    values.iter().copied().map(OscType::Float).collect()
}

/// Immediate bundle with one message per camera attribute.
pub fn camera_bundle(frame: &CameraFrame) -> OscPacket {
    let f = &frame.frustum;
    let look_at = match frame.look_at {
        Some(target) => vec![1.0, target.x, target.y, target.z],
        None => vec![0.0, 0.0, 0.0, 0.0],
    };

    let messages = [
        (POSITION_ADDR, floats(&frame.position.to_array())),
        (ORIENTATION_ADDR, floats(&frame.orientation.to_array())),
        (
            FRUSTUM_ADDR,
            floats(&[f.left, f.right, f.bottom, f.top, f.near, f.far]),
        ),
        (LOOK_AT_ADDR, floats(&look_at)),
    ];

    OscPacket::Bundle(OscBundle {
        timetag: rosc::OscTime::from((0, 0)),
        content: messages
            .into_iter()
            .map(|(addr, args)| {
                OscPacket::Message(OscMessage {
                    addr: addr.to_string(),
                    args,
                })
            })
            .collect(),
    })
}

impl CameraSink for OscSink {
    fn initialize(&mut self) -> Result<()> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        self.socket = Some(socket);
        info!("OSC camera output ready. Target: {}", self.target_addr);
        Ok(())
    }

    fn send(&self, frame: &CameraFrame) -> Result<()> {
        let socket = self
            .socket
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("OscSink not initialized"))?;

        let msg_buf = encoder::encode(&camera_bundle(frame))?;
        socket.send_to(&msg_buf, &self.target_addr)?;
        Ok(())
    }
}
