//! Server and asset configuration.
//!
//! Loaded from YAML, with the `LISTEN` environment variable taking precedence
//! over the listen address in the file:
//!
//! ```yaml
//! server:
//!   listen_addr: "127.0.0.1:8080"
//!   read_timeout_ms: 5000
//!   max_connections: 64
//!   worker_threads: 4
//! assets:
//!   dir: "./dist"
//!   entry: "index.html"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

/// Env var naming a YAML config file.
pub const CONFIG_ENV: &str = "EMBEDHTTP_CONFIG";
/// Env var overriding `server.listen_addr`.
pub const LISTEN_ENV: &str = "LISTEN";

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub assets: AssetsConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    /// How long a single read may wait for request bytes
    pub read_timeout_ms: u64,
    /// Connections handled at once; further clients wait in the backlog
    pub max_connections: usize,
    pub worker_threads: usize,
    pub backlog: u32,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AssetsConfig {
    /// Directory loaded into the root VFS, if any
    pub dir: Option<PathBuf>,
    /// Page the window navigates to first
    pub entry: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
            read_timeout_ms: 5000,
            max_connections: 64,
            worker_threads: 4,
            backlog: 128,
        }
    }
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            dir: None,
            entry: "index.html".to_string(),
        }
    }
}

impl ServerConfig {
    /// Defaults, listening on `127.0.0.1:<port>`. Port 0 picks a free one.
    pub fn localhost(port: u16) -> Self {
        Self {
            listen_addr: format!("127.0.0.1:{port}"),
            ..Self::default()
        }
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

impl Config {
    /// Loads the file named by `EMBEDHTTP_CONFIG`, or defaults when unset,
    /// then applies `LISTEN`.
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(&path)?,
            Err(_) => Self::default(),
        };
        cfg.apply_env();
        Ok(cfg)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_yaml(text: &str) -> anyhow::Result<Self> {
        let cfg: Config = serde_yaml::from_str(text)?;
        anyhow::ensure!(
            cfg.server.worker_threads > 0,
            "server.worker_threads must be at least 1"
        );
        anyhow::ensure!(
            cfg.server.max_connections > 0,
            "server.max_connections must be at least 1"
        );
        Ok(cfg)
    }

    fn apply_env(&mut self) {
        if let Ok(addr) = std::env::var(LISTEN_ENV) {
            self.server.listen_addr = addr;
        }
    }
}
