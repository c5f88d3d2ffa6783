use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use bytes::Bytes;
use tracing::{debug, info};

use crate::server::Router;
use crate::vfs::{FileEntry, Result, SharedVfs, VfsError, VirtualFileSystem};

/// Named VFS instances, each served under `/<name>/`.
///
/// Clones share the same instances and the same router, so the catalog can
/// be handed to bridge functions while the host keeps using it.
#[derive(Clone)]
pub struct VfsCatalog {
    instances: Arc<RwLock<HashMap<String, SharedVfs>>>,
    router: Arc<RwLock<Router>>,
}

impl VfsCatalog {
    pub fn new(router: Arc<RwLock<Router>>) -> Self {
        Self {
            instances: Arc::new(RwLock::new(HashMap::new())),
            router,
        }
    }

    /// Creates (or replaces) a memory-only VFS called `name`.
    pub fn create(&self, name: &str) {
        self.insert(name, VirtualFileSystem::new());
    }

    /// Creates (or replaces) a VFS called `name` mirrored to `dir`, loading
    /// whatever is already there.
    pub fn create_persistent(&self, name: &str, dir: impl Into<PathBuf>) -> Result<()> {
        let vfs = VirtualFileSystem::persistent(dir)?;
        self.insert(name, vfs);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<SharedVfs> {
        self.instances().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.instances().contains_key(name)
    }

    /// Names of every instance, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.instances().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn add_file(&self, name: &str, path: &str, data: impl Into<Bytes>) -> Result<()> {
        let vfs = self.lookup(name)?;
        vfs.write()
            .unwrap_or_else(PoisonError::into_inner)
            .add_file(path, data);
        Ok(())
    }

    pub fn save(&self, name: &str) -> Result<()> {
        let vfs = self.lookup(name)?;
        let vfs = vfs.read().unwrap_or_else(PoisonError::into_inner);
        vfs.save_to_disk()
    }

    /// Saves every persistent instance. Memory-only instances are skipped.
    ///
    /// Keeps going after a failure; returns `true` only if every save
    /// succeeded.
    pub fn save_all(&self) -> bool {
        let instances: Vec<SharedVfs> = self.instances().values().cloned().collect();

        let mut all_saved = true;
        for vfs in instances {
            let vfs = vfs.read().unwrap_or_else(PoisonError::into_inner);
            if vfs.is_persistent() && vfs.save_to_disk().is_err() {
                all_saved = false;
            }
        }
        all_saved
    }

    pub fn files(&self, name: &str) -> Option<BTreeMap<String, FileEntry>> {
        let vfs = self.get(name)?;
        let vfs = vfs.read().unwrap_or_else(PoisonError::into_inner);
        Some(vfs.files().clone())
    }

    pub fn file(&self, name: &str, path: &str) -> Option<FileEntry> {
        let vfs = self.get(name)?;
        let vfs = vfs.read().unwrap_or_else(PoisonError::into_inner);
        vfs.get_file(path).cloned()
    }

    fn insert(&self, name: &str, vfs: VirtualFileSystem) {
        let shared = vfs.into_shared();
        let prefix = format!("/{name}/");

        self.router
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .mount(&prefix, Arc::clone(&shared));

        let replaced = self
            .instances
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), shared)
            .is_some();

        if replaced {
            debug!(name, "Replaced VFS");
        }
        info!(name, prefix = %prefix, "Mounted VFS");
    }

    fn lookup(&self, name: &str) -> Result<SharedVfs> {
        self.get(name).ok_or_else(|| VfsError::UnknownVfs {
            name: name.to_string(),
        })
    }

    fn instances(&self) -> RwLockReadGuard<'_, HashMap<String, SharedVfs>> {
        self.instances.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for VfsCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VfsCatalog")
            .field("instances", &self.names())
            .finish()
    }
}
