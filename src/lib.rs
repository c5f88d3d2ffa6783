//! embedhttp - HTTP server for desktop apps with a web UI
//!
//! Serves in-memory assets to an embedded browser window over localhost and
//! exposes native functions to it.

pub mod config;
pub mod host;
pub mod http;
pub mod registry;
pub mod server;
pub mod vfs;
