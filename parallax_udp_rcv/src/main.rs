use anyhow::{Context, Result};
use api::CameraFrame;
use log::{info, warn};
use std::net::UdpSocket;

const DEFAULT_PORT: u16 = 9100;
/// Position changes smaller than this are not printed.
const PRINT_THRESHOLD: f32 = 0.01;

fn changed(last: Option<&CameraFrame>, next: &CameraFrame) -> bool {
    match last {
        None => true,
        Some(last) => {
            last.look_at != next.look_at
                || !last.position.abs_diff_eq(next.position, PRINT_THRESHOLD)
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let port = std::env::args()
        .nth(1)
        .map(|p| p.parse::<u16>())
        .transpose()
        .context("Port must be a number")?
        .unwrap_or(DEFAULT_PORT);
    let addr = format!("0.0.0.0:{}", port);
    let socket = UdpSocket::bind(&addr).with_context(|| format!("Failed to bind {}", addr))?;

    info!("Listening for camera frames on {}...", addr);

    let mut buf = [0u8; 65535];
    let mut last_frame: Option<CameraFrame> = None;

    loop {
        match socket.recv_from(&mut buf) {
            Ok((amt, src)) => {
                let slice = &buf[..amt];
                match serde_json::from_slice::<CameraFrame>(slice) {
                    Ok(frame) => {
                        if changed(last_frame.as_ref(), &frame) {
                            let f = &frame.frustum;
                            println!(
                                "{} pos=({:.2}, {:.2}, {:.2}) frustum=[l {:.4} r {:.4} b {:.4} t {:.4}]{}",
                                src,
                                frame.position.x,
                                frame.position.y,
                                frame.position.z,
                                f.left,
                                f.right,
                                f.bottom,
                                f.top,
                                if frame.look_at.is_some() { " look_at" } else { "" }
                            );
                            last_frame = Some(frame);
                        }
                    }
                    Err(e) => {
                        warn!("Failed to deserialize packet from {}: {}", src, e);
                        if let Ok(s) = std::str::from_utf8(slice) {
                            warn!("Raw data: {}", s);
                        }
                    }
                }
            }
            Err(e) => {
                warn!("Error receiving data: {}", e);
            }
        }
    }
}
