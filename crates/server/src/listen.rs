//! Listener setup and the server entry point.

use std::io::ErrorKind;
use std::net::SocketAddr;
use std::path::Path;
use tfd_core::config::DashboardConfig;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::error::ServerError;
use crate::routes::router;
use crate::state::AppState;

/// Run the dashboard until Ctrl-C.
pub async fn serve(config: &DashboardConfig) -> Result<(), ServerError> {
    let state = AppState::from_config(config);

    let (listener, addr) =
        bind_with_retry(&config.host, config.base_port, config.port_retries).await?;
    info!("Dashboard server started on http://{addr}");
    info!(config_dir = %config.config_dir.display(), "config directory");
    info!(compose_bin = %config.compose_bin, "compose binary");
    info!(
        commands_schema = %config.commands_schema_path().display(),
        deployments = %state.store.deployments_path().display(),
        registry = %state.store.apps_path().display(),
        "compose state files"
    );

    write_port_file(&config.port_file_path(), addr.port());

    let app = router(state, config.public_dir.as_deref());
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Serve)?;

    info!("Dashboard server stopped");
    Ok(())
}

/// Bind `host:base_port`, moving to the next port while the address is in
/// use, at most `retries` times. Any other bind error is returned at once.
pub async fn bind_with_retry(
    host: &str,
    base_port: u16,
    retries: u16,
) -> Result<(TcpListener, SocketAddr), ServerError> {
    let last = base_port.saturating_add(retries);

    for port in base_port..=last {
        match TcpListener::bind((host, port)).await {
            Ok(listener) => {
                let addr = listener
                    .local_addr()
                    .map_err(|e| ServerError::InvalidAddress {
                        host: host.to_string(),
                        port,
                        reason: e.to_string(),
                    })?;
                return Ok((listener, addr));
            }
            Err(e) if e.kind() == ErrorKind::AddrInUse && port < last => {
                warn!("Port {port} in use, trying {}...", port + 1);
            }
            Err(e) if e.kind() == ErrorKind::AddrInUse => break,
            Err(source) => {
                let addr = resolve(host, port)?;
                return Err(ServerError::Bind { addr, source });
            }
        }
    }

    Err(ServerError::PortsExhausted {
        first: base_port,
        last,
    })
}

fn resolve(host: &str, port: u16) -> Result<SocketAddr, ServerError> {
    use std::net::ToSocketAddrs;

    (host, port)
        .to_socket_addrs()
        .ok()
        .and_then(|mut addrs| addrs.next())
        .ok_or_else(|| ServerError::InvalidAddress {
            host: host.to_string(),
            port,
            reason: "does not resolve".to_string(),
        })
}

/// Record the bound port for local clients. Failures are logged only.
pub fn write_port_file(path: &Path, port: u16) {
    if let Some(parent) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            warn!(path = %path.display(), error = %e, "Failed to write port file");
            return;
        }
    }
    if let Err(e) = std::fs::write(path, port.to_string()) {
        warn!(path = %path.display(), error = %e, "Failed to write port file");
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
