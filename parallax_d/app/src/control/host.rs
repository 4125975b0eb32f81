use axum::Router;
use log::{info, warn};
use mdns_sd::{ServiceDaemon, ServiceInfo};
use std::net::SocketAddr;
use tokio::net::TcpListener;

const SERVICE_TYPE: &str = "_parallax._tcp.local.";
const INSTANCE_NAME: &str = "parallax_d";

pub struct ControlHost;

impl ControlHost {
    pub async fn bind(requested_port: u16) -> anyhow::Result<TcpListener> {
        // 0 picks a free port
        let addr = SocketAddr::from(([0, 0, 0, 0], requested_port));
        Ok(TcpListener::bind(addr).await?)
    }

    fn advertise(port: u16) -> anyhow::Result<ServiceDaemon> {
        let mdns = ServiceDaemon::new()?;
        let host_name = format!("parallax_{}.local.", port);
        let properties = [("txtvers", "1"), ("api", "http")];

        let service_info = ServiceInfo::new(
            SERVICE_TYPE,
            INSTANCE_NAME,
            &host_name,
            "",
            port,
            &properties[..],
        )?
        .enable_addr_auto();

        mdns.register(service_info)?;
        info!(
            "Advertised control service via mDNS: {} on port {}",
            INSTANCE_NAME, port
        );
        Ok(mdns)
    }

    pub async fn serve(listener: TcpListener, app_router: Router, advertise: bool) -> anyhow::Result<()> {
        let local_addr = listener.local_addr()?;
        info!("Control server listening on http://{}", local_addr);

        // keep the daemon alive for as long as we serve
        let _mdns = if advertise {
            match Self::advertise(local_addr.port()) {
                Ok(daemon) => Some(daemon),
                Err(e) => {
                    warn!("mDNS advertisement failed: {}", e);
                    None
                }
            }
        } else {
            None
        };

        axum::serve(listener, app_router).await?;
        Ok(())
    }

    pub async fn start(requested_port: u16, app_router: Router, advertise: bool) -> anyhow::Result<()> {
        let listener = Self::bind(requested_port).await?;
        Self::serve(listener, app_router, advertise).await
    }
}
