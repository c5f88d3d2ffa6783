//! Application-facing facade.
//!
//! [`Host`] bundles what a desktop app embedding a web UI needs: a server
//! on localhost, a root VFS served at `/`, any number of named VFS instances
//! served at `/<name>/`, and a function registry for the GUI bridge.
//!
//! ```no_run
//! use embedhttp::config::Config;
//! use embedhttp::host::Host;
//!
//! let mut host = Host::new(Config::default()).unwrap();
//! host.add_vfs("index.html", "<html>hi</html>");
//! host.register_builtin_functions();
//!
//! assert!(host.start());
//! let url = host.entry_url("index.html").unwrap();
//! println!("navigate to {url}");
//! host.stop();
//! ```

pub mod builtins;
pub mod catalog;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::PoisonError;

use bytes::Bytes;
use serde_json::Value;
use tracing::info;
use url::Url;

use crate::config::Config;
use crate::http::request::Request;
use crate::registry::FunctionRegistry;
use crate::server::{HttpServer, RouteReply};
use crate::vfs::{self, FileEntry, SharedVfs, VirtualFileSystem};

pub use catalog::VfsCatalog;

pub struct Host {
    server: HttpServer,
    root: SharedVfs,
    catalog: VfsCatalog,
    registry: FunctionRegistry,
}

impl Host {
    /// Builds the server and mounts the root VFS at `/`.
    ///
    /// With `assets.dir` set, the root VFS is loaded from (and mirrored to)
    /// that directory; otherwise it starts empty and lives in memory.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let root = match &config.assets.dir {
            Some(dir) => VirtualFileSystem::persistent(dir)?,
            None => VirtualFileSystem::new(),
        };
        let root = root.into_shared();

        let server = HttpServer::with_config(config.server);
        server.mount("/", root.clone());
        let catalog = VfsCatalog::new(server.router());

        Ok(Self {
            server,
            root,
            catalog,
            registry: FunctionRegistry::new(),
        })
    }

    pub fn start(&mut self) -> bool {
        self.server.start()
    }

    pub fn stop(&mut self) {
        self.server.stop();
    }

    pub fn is_running(&self) -> bool {
        self.server.is_running()
    }

    pub fn server(&self) -> &HttpServer {
        &self.server
    }

    /// Where the window should navigate to show `entry`.
    ///
    /// `None` while the server is stopped.
    pub fn entry_url(&self, entry: &str) -> Option<Url> {
        let addr = self.server.local_addr()?;
        let base = Url::parse(&format!("http://{addr}/")).ok()?;
        base.join(entry.trim_start_matches('/')).ok()
    }

    pub fn register_endpoint_handler<F>(&self, path: impl Into<String>, handler: F)
    where
        F: Fn(&Request) -> RouteReply + Send + Sync + 'static,
    {
        self.server.register_route(path, handler);
    }

    /// Adds a file to the root VFS.
    pub fn add_vfs(&self, path: impl Into<String>, data: impl Into<Bytes>) {
        self.root
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .add_file(path, data);
    }

    pub fn root_vfs(&self) -> SharedVfs {
        self.root.clone()
    }

    pub fn catalog(&self) -> &VfsCatalog {
        &self.catalog
    }

    /// Creates a memory-only VFS served at `/<name>/`.
    pub fn add_custom_vfs(&self, name: &str) {
        self.catalog.create(name);
    }

    /// Creates a VFS served at `/<name>/` and mirrored to `dir`.
    pub fn add_persistent_vfs(&self, name: &str, dir: impl Into<PathBuf>) -> vfs::Result<()> {
        self.catalog.create_persistent(name, dir)
    }

    pub fn add_to_custom_vfs(
        &self,
        name: &str,
        path: &str,
        data: impl Into<Bytes>,
    ) -> vfs::Result<()> {
        self.catalog.add_file(name, path, data)
    }

    pub fn save_vfs_to_disk(&self, name: &str) -> vfs::Result<()> {
        self.catalog.save(name)
    }

    pub fn save_all_vfs_to_disk(&self) -> bool {
        self.catalog.save_all()
    }

    pub fn get_files(&self, name: &str) -> Option<BTreeMap<String, FileEntry>> {
        self.catalog.files(name)
    }

    pub fn get_file(&self, name: &str, path: &str) -> Option<FileEntry> {
        self.catalog.file(name, path)
    }

    pub fn register_function<F>(&self, name: impl Into<String>, func: F)
    where
        F: Fn(&Value) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.registry.register(name, func);
    }

    pub fn call_function(&self, name: &str, args: &Value) -> Value {
        self.registry.call(name, args)
    }

    pub fn registered_functions(&self) -> Vec<String> {
        self.registry.names()
    }

    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    pub fn register_builtin_functions(&self) {
        builtins::register(&self.registry, &self.catalog);
        info!(count = self.registry.len(), "Registered builtin functions");
    }
}

/// Asks the OS for a free localhost port.
///
/// The port is released again before returning, so another process may
/// take it first.
pub fn find_available_port() -> std::io::Result<u16> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}
