use std::net::{IpAddr, SocketAddr};

use axum::Router;
use if_addrs::get_if_addrs;
use tokio::net::{TcpListener, ToSocketAddrs};

/// Bind `addr` and serve `router` until Ctrl-C or SIGTERM.
pub async fn serve<A: ToSocketAddrs>(addr: A, router: Router) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    log_listen_urls(&listener);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

fn log_listen_urls(listener: &TcpListener) {
    let addr = match listener.local_addr() {
        Ok(addr) => addr,
        Err(e) => {
            tracing::warn!("could not determine listen address: {e}");
            return;
        }
    };

    let port = addr.port();
    let ips = match addr {
        SocketAddr::V4(v4) if v4.ip().is_unspecified() => interface_ips(false),
        SocketAddr::V6(v6) if v6.ip().is_unspecified() => interface_ips(true),
        _ => vec![addr.ip()],
    };
    for ip in ips {
        match ip {
            _ if ip.is_loopback() => tracing::info!("Listening on http://localhost:{port}"),
            IpAddr::V4(_) => tracing::info!("Listening on http://{ip}:{port}"),
            IpAddr::V6(_) => tracing::info!("Listening on http://[{ip}]:{port}"),
        }
    }
}

fn interface_ips(ipv6: bool) -> Vec<IpAddr> {
    get_if_addrs()
        .into_iter()
        .flatten()
        .map(|i| i.ip())
        .filter(|ip| ip.is_ipv6() == ipv6)
        .collect()
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutting down");
}
