//! The embeddable HTTP server.
//!
//! [`HttpServer`] runs its own Tokio runtime on a dedicated thread, so an
//! application with a synchronous main loop (a GUI event loop, typically)
//! can start and stop it without being async itself.
//!
//! # Lifecycle
//!
//! ```text
//!   stopped ──start()──► running ──stop()──► stopped
//! ```
//!
//! `start()` binds the socket before returning, so a port conflict is
//! reported immediately as `false`. `stop()` returns only once the accept
//! loop and every connection task have finished.
//!
//! # Example
//!
//! ```no_run
//! use embedhttp::server::{HttpServer, RouteReply};
//! use embedhttp::vfs::VirtualFileSystem;
//!
//! let mut assets = VirtualFileSystem::new();
//! assets.add_file("index.html", "<html>hi</html>");
//!
//! let mut server = HttpServer::new(8080);
//! server.mount("/", assets.into_shared());
//! server.register_route("/api/ping", |_req| RouteReply::new("pong"));
//!
//! assert!(server.start());
//! // ... run the window ...
//! server.stop();
//! ```

pub mod listener;
pub mod router;

use std::net::SocketAddr;
use std::sync::{mpsc, Arc, PoisonError, RwLock};
use std::thread::{self, JoinHandle};

use anyhow::Context;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::config::ServerConfig;
use crate::http::request::Request;
use crate::vfs::SharedVfs;

pub use router::{RouteHandler, RouteReply, Router};

pub struct HttpServer {
    config: ServerConfig,
    router: Arc<RwLock<Router>>,
    running: bool,
    local_addr: Option<SocketAddr>,
    shutdown: Option<watch::Sender<bool>>,
    thread: Option<JoinHandle<()>>,
}

impl HttpServer {
    /// A server for `127.0.0.1:<port>` with default settings.
    pub fn new(port: u16) -> Self {
        Self::with_config(ServerConfig::localhost(port))
    }

    pub fn with_config(config: ServerConfig) -> Self {
        Self {
            config,
            router: Arc::new(RwLock::new(Router::new())),
            running: false,
            local_addr: None,
            shutdown: None,
            thread: None,
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Serves `vfs` under `prefix`. Takes effect immediately, even while
    /// running.
    pub fn mount(&self, prefix: &str, vfs: SharedVfs) {
        self.router_mut().mount(prefix, vfs);
    }

    pub fn unmount(&self, prefix: &str) -> bool {
        self.router_mut().unmount(prefix)
    }

    /// Binds an exact request path to `handler`. Routes win over mounts.
    pub fn register_route<F>(&self, path: impl Into<String>, handler: F)
    where
        F: Fn(&Request) -> RouteReply + Send + Sync + 'static,
    {
        self.router_mut().register_route(path, handler);
    }

    /// Shared handle to the route and mount tables, for code that mounts
    /// without holding the server itself.
    pub fn router(&self) -> Arc<RwLock<Router>> {
        Arc::clone(&self.router)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// The bound address while running. Resolves port 0 to the real port.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Starts serving. Returns `false` if already running or if the socket
    /// could not be set up; the cause is logged.
    pub fn start(&mut self) -> bool {
        if self.running {
            warn!("HTTP server already running");
            return false;
        }

        match self.spawn_server() {
            Ok(()) => true,
            Err(e) => {
                error!(addr = %self.config.listen_addr, error = %e, "Failed to start HTTP server");
                false
            }
        }
    }

    /// Stops serving and waits for all server tasks to finish.
    ///
    /// Safe to call repeatedly; calls after the first are no-ops.
    pub fn stop(&mut self) {
        let Some(shutdown) = self.shutdown.take() else {
            return;
        };
        self.running = false;

        info!("Stopping HTTP server");
        let _ = shutdown.send(true);

        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                error!("HTTP server thread panicked");
            }
        }
        self.local_addr = None;
    }

    fn router_mut(&self) -> std::sync::RwLockWriteGuard<'_, Router> {
        self.router.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn spawn_server(&mut self) -> anyhow::Result<()> {
        let config = self.config.clone();
        let router = Arc::clone(&self.router);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (ready_tx, ready_rx) = mpsc::channel::<anyhow::Result<SocketAddr>>();

        // The runtime is created and dropped on this thread only, which keeps
        // start/stop usable from inside another runtime.
        let thread = thread::Builder::new()
            .name("embedhttp-server".to_string())
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_multi_thread()
                    .worker_threads(config.worker_threads.max(1))
                    .thread_name("embedhttp-worker")
                    .enable_all()
                    .build()
                {
                    Ok(runtime) => runtime,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e.into()));
                        return;
                    }
                };

                runtime.block_on(async move {
                    let listener = match listener::bind(&config).await {
                        Ok(listener) => listener,
                        Err(e) => {
                            let _ = ready_tx.send(Err(e));
                            return;
                        }
                    };
                    let addr = match listener.local_addr() {
                        Ok(addr) => addr,
                        Err(e) => {
                            let _ = ready_tx.send(Err(e.into()));
                            return;
                        }
                    };
                    let _ = ready_tx.send(Ok(addr));

                    listener::run(listener, router, config, shutdown_rx).await;
                });
            })
            .context("spawning server thread")?;

        let ready = ready_rx
            .recv()
            .context("server thread exited during startup")
            .and_then(|addr| addr);

        match ready {
            Ok(addr) => {
                self.local_addr = Some(addr);
                self.shutdown = Some(shutdown_tx);
                self.thread = Some(thread);
                self.running = true;
                Ok(())
            }
            Err(e) => {
                drop(shutdown_tx);
                let _ = thread.join();
                Err(e)
            }
        }
    }
}

impl Drop for HttpServer {
    fn drop(&mut self) {
        self.stop();
    }
}
