//! Request dispatch: exact-path routes first, then mounted filesystems.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::http::request::Request;
use crate::http::response::{Response, ResponseBuilder, StatusCode};
use crate::vfs::SharedVfs;

/// What a route handler hands back. The server always answers with 200 OK.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteReply {
    pub body: Vec<u8>,
    pub headers: HashMap<String, String>,
}

impl RouteReply {
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        Self {
            body: body.into(),
            headers: HashMap::new(),
        }
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }
}

/// Callback bound to an exact request path.
///
/// It sees the whole request (method, lower-cased headers, body) and runs on
/// a connection task, so it must be thread-safe.
pub type RouteHandler = Arc<dyn Fn(&Request) -> RouteReply + Send + Sync>;

/// A VFS served under a prefix.
#[derive(Clone)]
pub struct Mount {
    prefix: String,
    vfs: SharedVfs,
}

/// Where a request goes, detached from the router so the lock can be
/// released before any handler runs.
#[derive(Clone)]
pub enum Target {
    Route(RouteHandler),
    Mounts(Vec<Mount>),
}

/// Route and mount tables.
///
/// Mounts are kept sorted by descending prefix length so the longest
/// matching prefix is always tried first.
#[derive(Default)]
pub struct Router {
    routes: HashMap<String, RouteHandler>,
    mounts: Vec<Mount>,
}

/// Normalizes a mount prefix so it both starts and ends with `/`.
///
/// ```
/// # use embedhttp::server::router::normalize_prefix;
/// assert_eq!(normalize_prefix("static"), "/static/");
/// assert_eq!(normalize_prefix("/"), "/");
/// assert_eq!(normalize_prefix(""), "/");
/// ```
pub fn normalize_prefix(prefix: &str) -> String {
    let mut normalized = String::with_capacity(prefix.len() + 2);
    if !prefix.starts_with('/') {
        normalized.push('/');
    }
    normalized.push_str(prefix);
    if !normalized.ends_with('/') {
        normalized.push('/');
    }
    normalized
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `prefix` to `vfs`. Mounting the same prefix again replaces it.
    pub fn mount(&mut self, prefix: &str, vfs: SharedVfs) {
        let prefix = normalize_prefix(prefix);
        self.mounts.retain(|m| m.prefix != prefix);
        self.mounts.push(Mount { prefix, vfs });
        self.mounts.sort_by(|a, b| {
            b.prefix
                .len()
                .cmp(&a.prefix.len())
                .then_with(|| a.prefix.cmp(&b.prefix))
        });
    }

    /// Removes the mount at `prefix`, returning whether one existed.
    pub fn unmount(&mut self, prefix: &str) -> bool {
        let prefix = normalize_prefix(prefix);
        let before = self.mounts.len();
        self.mounts.retain(|m| m.prefix != prefix);
        self.mounts.len() != before
    }

    /// Mounted prefixes in match order.
    pub fn mount_prefixes(&self) -> Vec<&str> {
        self.mounts.iter().map(|m| m.prefix.as_str()).collect()
    }

    /// Binds an exact path to a handler, replacing any previous one.
    pub fn register_route<F>(&mut self, path: impl Into<String>, handler: F)
    where
        F: Fn(&Request) -> RouteReply + Send + Sync + 'static,
    {
        self.routes.insert(path.into(), Arc::new(handler));
    }

    pub fn has_route(&self, path: &str) -> bool {
        self.routes.contains_key(path)
    }

    /// Picks what serves `path`: the exact route if one exists, otherwise
    /// every mount in match order.
    pub fn resolve(&self, path: &str) -> Target {
        match self.routes.get(path) {
            Some(handler) => Target::Route(Arc::clone(handler)),
            None => Target::Mounts(self.mounts.clone()),
        }
    }
}

/// Produces the response for a request. Never fails: misses become 404.
///
/// The router lock is held only while resolving, so handlers may mount or
/// register routes themselves.
pub fn dispatch(router: &RwLock<Router>, req: &Request) -> Response {
    let target = router
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .resolve(&req.path);
    target.respond(req)
}

impl Target {
    pub fn respond(self, req: &Request) -> Response {
        let mounts = match self {
            Target::Route(handler) => {
                debug!(method = %req.method, path = %req.path, "Route matched");
                let reply = handler(req);
                return ResponseBuilder::new(StatusCode::Ok)
                    .headers(reply.headers)
                    .body(reply.body)
                    .build();
            }
            Target::Mounts(mounts) => mounts,
        };

        if let Some(response) = serve_from_mounts(&mounts, &req.path) {
            return response;
        }

        debug!(method = %req.method, path = %req.path, "No route or file, 404");
        Response::not_found()
    }
}

fn serve_from_mounts(mounts: &[Mount], path: &str) -> Option<Response> {
    let normalized = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };

    for mount in mounts {
        let Some(rest) = normalized.strip_prefix(mount.prefix.as_str()) else {
            continue;
        };

        let vfs_path = match rest {
            "" | "/" => "index.html",
            other => other.trim_start_matches('/'),
        };

        let vfs = mount.vfs.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = vfs.get_file(vfs_path) {
            debug!(prefix = %mount.prefix, file = vfs_path, "Serving from VFS");
            return Some(
                ResponseBuilder::new(StatusCode::Ok)
                    .header("Content-Type", entry.mime_type.clone())
                    .header("Content-Length", entry.data.len().to_string())
                    .body(entry.data.to_vec())
                    .build(),
            );
        }
    }

    None
}
