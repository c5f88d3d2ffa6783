use std::sync::{Arc, RwLock};
use std::time::Duration;

use anyhow::Context;
use tokio::net::{TcpListener, TcpSocket};
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::config::ServerConfig;
use crate::http::connection::Connection;
use crate::server::router::Router;

/// Pause after a failed accept before trying again.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(10);

/// Binds the listening socket with address reuse enabled.
pub async fn bind(cfg: &ServerConfig) -> anyhow::Result<TcpListener> {
    let addr = tokio::net::lookup_host(cfg.listen_addr.as_str())
        .await
        .with_context(|| format!("resolving {}", cfg.listen_addr))?
        .next()
        .with_context(|| format!("{} resolved to no address", cfg.listen_addr))?;

    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()?
    } else {
        TcpSocket::new_v6()?
    };
    socket.set_reuseaddr(true)?;
    socket
        .bind(addr)
        .with_context(|| format!("binding {addr}"))?;
    let listener = socket.listen(cfg.backlog)?;

    info!("Listening on {}", listener.local_addr()?);
    Ok(listener)
}

/// Accepts connections until `shutdown` fires.
///
/// At most `max_connections` connections are served at once; while all
/// permits are taken, new clients wait in the listen backlog. On shutdown
/// the listener is closed and every in-flight connection is aborted and
/// awaited before this returns.
pub async fn run(
    listener: TcpListener,
    router: Arc<RwLock<Router>>,
    cfg: ServerConfig,
    mut shutdown: watch::Receiver<bool>,
) {
    let permits = Arc::new(Semaphore::new(cfg.max_connections));
    let read_timeout = cfg.read_timeout();
    let mut connections = JoinSet::new();

    loop {
        while let Some(finished) = connections.try_join_next() {
            if let Err(e) = finished {
                error!(error = %e, "Connection task panicked");
            }
        }

        let permit = tokio::select! {
            _ = shutdown.changed() => break,
            permit = Arc::clone(&permits).acquire_owned() => match permit {
                Ok(permit) => permit,
                Err(_) => break,
            },
        };

        let (socket, peer) = tokio::select! {
            _ = shutdown.changed() => break,
            accepted = listener.accept() => match accepted {
                Ok(accepted) => accepted,
                Err(e) => {
                    error!(error = %e, "Failed to accept connection");
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                    continue;
                }
            },
        };
        debug!("Accepted connection from {}", peer);

        let router = Arc::clone(&router);
        connections.spawn(async move {
            let _permit = permit;
            let mut conn = Connection::new(socket, router, read_timeout);
            if let Err(e) = conn.run().await {
                warn!(%peer, error = %e, "Dropping connection");
            }
        });
    }

    drop(listener);
    let in_flight = connections.len();
    connections.shutdown().await;
    info!(in_flight, "Accept loop stopped");
}
