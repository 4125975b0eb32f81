mod replay;
mod udp;

pub use replay::ReplaySource;
pub use udp::UdpDetectionSource;

use api::DetectionSource;
use common::config::DetectionSourceConfig;

pub fn create_source(config: &DetectionSourceConfig) -> Box<dyn DetectionSource> {
    match config {
        DetectionSourceConfig::Udp { port } => Box::new(UdpDetectionSource::new(*port)),
        DetectionSourceConfig::Replay { path } => Box::new(ReplaySource::new(path.clone())),
    }
}
