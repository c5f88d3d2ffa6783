//! In-memory virtual filesystem.
//!
//! A [`VirtualFileSystem`] is a flat map from relative logical paths
//! (`"css/app.css"`, never `"/css/app.css"`) to [`FileEntry`] values. It is a
//! snapshot, not a view of the real filesystem: nothing is invalidated or
//! watched.
//!
//! A VFS can optionally mirror itself to a directory. Persistence is chosen
//! once, at construction, through [`Persistence`]. A persistent VFS loads
//! every file under its directory when it is created and writes everything
//! back when it is dropped.
//!
//! # Example
//!
//! ```
//! use embedhttp::vfs::VirtualFileSystem;
//!
//! let mut vfs = VirtualFileSystem::new();
//! vfs.add_file("index.html", "<html>hi</html>");
//!
//! let entry = vfs.get_file("index.html").unwrap();
//! assert_eq!(entry.mime_type, "text/html");
//! assert!(vfs.save_to_disk().is_err());
//! ```

pub mod error;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, RwLock};

use bytes::Bytes;
use tracing::{debug, error};
use walkdir::WalkDir;

use crate::http::mime;

pub use error::{Result, VfsError};

/// A VFS shared between the embedding application and the server.
pub type SharedVfs = Arc<RwLock<VirtualFileSystem>>;

/// File contents plus the MIME type inferred when it was added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub data: Bytes,
    pub mime_type: String,
}

/// Where, if anywhere, a VFS mirrors its contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Persistence {
    /// Memory only. `save_to_disk` and `load_from_disk` always fail.
    #[default]
    InMemory,
    /// Mirror to this directory.
    Directory(PathBuf),
}

/// In-memory content store keyed by logical path.
///
/// The map has no internal locking. Wrap it with [`into_shared`] to serve it
/// while the application keeps adding files.
///
/// [`into_shared`]: VirtualFileSystem::into_shared
#[derive(Debug, Default)]
pub struct VirtualFileSystem {
    files: BTreeMap<String, FileEntry>,
    persistence: Persistence,
}

impl VirtualFileSystem {
    /// Creates an empty, memory-only VFS.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a VFS mirrored to `dir`.
    ///
    /// The directory is created if it does not exist, then every regular file
    /// under it is loaded. A failed load is logged and leaves the VFS with
    /// whatever was read before the failure.
    ///
    /// # Errors
    ///
    /// Returns [`VfsError::CreateDir`] when the directory cannot be created.
    pub fn persistent(dir: impl Into<PathBuf>) -> Result<Self> {
        Self::with_persistence(Persistence::Directory(dir.into()))
    }

    /// Creates a VFS with an explicit persistence setting.
    pub fn with_persistence(persistence: Persistence) -> Result<Self> {
        let mut vfs = Self {
            files: BTreeMap::new(),
            persistence,
        };

        if let Some(dir) = vfs.persistence_dir().map(Path::to_path_buf) {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(&dir).map_err(|source| VfsError::CreateDir {
                    path: dir.clone(),
                    source,
                })?;
            }
            // Start with whatever was read; the cause is already logged
            let _ = vfs.load_from_disk();
        }

        Ok(vfs)
    }

    /// Wraps the VFS for sharing with an [`HttpServer`](crate::server::HttpServer).
    pub fn into_shared(self) -> SharedVfs {
        Arc::new(RwLock::new(self))
    }

    /// Inserts or replaces the file at `path`.
    ///
    /// The MIME type comes from the path's extension.
    pub fn add_file(&mut self, path: impl Into<String>, data: impl Into<Bytes>) {
        let path = path.into();
        let mime_type = mime::from_path(&path).to_string();
        self.files.insert(
            path,
            FileEntry {
                data: data.into(),
                mime_type,
            },
        );
    }

    pub fn exists(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    pub fn get_file(&self, path: &str) -> Option<&FileEntry> {
        self.files.get(path)
    }

    pub fn remove_file(&mut self, path: &str) -> Option<FileEntry> {
        self.files.remove(path)
    }

    /// All entries, ordered by path.
    pub fn files(&self) -> &BTreeMap<String, FileEntry> {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn is_persistent(&self) -> bool {
        matches!(self.persistence, Persistence::Directory(_))
    }

    pub fn persistence_dir(&self) -> Option<&Path> {
        match &self.persistence {
            Persistence::Directory(dir) => Some(dir),
            Persistence::InMemory => None,
        }
    }

    /// Writes every entry to `persistence_dir/path`.
    ///
    /// Parent directories are created as needed. The first failed write
    /// stops the batch; files already written by this call stay on disk.
    /// Failures are logged before being returned.
    pub fn save_to_disk(&self) -> Result<()> {
        self.try_save().inspect_err(|e| {
            error!(error = %e, "Failed to save VFS to disk");
        })
    }

    /// Reads every regular file under the persistence directory into the map.
    ///
    /// Keys are paths relative to the directory with `/` separators.
    /// Existing entries at the same paths are replaced.
    pub fn load_from_disk(&mut self) -> Result<()> {
        self.try_load().inspect_err(|e| {
            error!(error = %e, "Failed to load VFS from disk");
        })
    }

    fn directory(&self) -> Result<&Path> {
        match &self.persistence {
            Persistence::InMemory => Err(VfsError::NotPersistent),
            Persistence::Directory(dir) if dir.as_os_str().is_empty() => Err(VfsError::NoDirectory),
            Persistence::Directory(dir) => Ok(dir),
        }
    }

    fn try_save(&self) -> Result<()> {
        let dir = self.directory()?;

        if !dir.exists() {
            fs::create_dir_all(dir).map_err(|source| VfsError::CreateDir {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        for (path, entry) in &self.files {
            let target = dir.join(checked_relative(path)?);

            if let Some(parent) = target.parent() {
                if !parent.exists() {
                    fs::create_dir_all(parent).map_err(|source| VfsError::CreateDir {
                        path: parent.to_path_buf(),
                        source,
                    })?;
                }
            }

            fs::write(&target, &entry.data).map_err(|source| VfsError::Write {
                path: target.clone(),
                source,
            })?;
        }

        debug!(dir = %dir.display(), files = self.files.len(), "Saved VFS to disk");
        Ok(())
    }

    fn try_load(&mut self) -> Result<()> {
        let dir = self.directory()?.to_path_buf();

        if !dir.exists() {
            return Err(VfsError::MissingDirectory { path: dir });
        }

        for entry in WalkDir::new(&dir) {
            let entry = entry.map_err(|source| VfsError::Walk {
                path: dir.clone(),
                source,
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            let Ok(relative) = entry.path().strip_prefix(&dir) else {
                continue;
            };
            let key = relative.to_string_lossy().replace('\\', "/");

            let data = fs::read(entry.path()).map_err(|source| VfsError::Read {
                path: entry.path().to_path_buf(),
                source,
            })?;

            self.add_file(key, data);
        }

        debug!(dir = %dir.display(), files = self.files.len(), "Loaded VFS from disk");
        Ok(())
    }
}

impl Drop for VirtualFileSystem {
    fn drop(&mut self) {
        if self.is_persistent() {
            // save_to_disk already logged the cause
            let _ = self.save_to_disk();
        }
    }
}

/// Maps a logical path to one relative to the persistence directory.
///
/// A leading `/` is dropped, so `/index.html` lands at `dir/index.html`.
/// Paths that would climb out of the directory are rejected.
fn checked_relative(path: &str) -> Result<PathBuf> {
    let invalid = || VfsError::InvalidPath {
        path: path.to_string(),
    };

    let mut relative = PathBuf::new();
    for component in Path::new(path).components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::RootDir | Component::CurDir => {}
            Component::ParentDir | Component::Prefix(_) => return Err(invalid()),
        }
    }

    if relative.as_os_str().is_empty() {
        return Err(invalid());
    }
    Ok(relative)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overwrite_keeps_last_write() {
        let mut vfs = VirtualFileSystem::new();
        vfs.add_file("a.txt", "one");
        vfs.add_file("a.txt", "two");

        assert_eq!(vfs.len(), 1);
        assert_eq!(vfs.get_file("a.txt").unwrap().data, Bytes::from("two"));
    }

    #[test]
    fn parent_components_are_rejected() {
        assert!(checked_relative("../evil").is_err());
        assert!(checked_relative("a/../../evil").is_err());
        assert!(checked_relative("").is_err());
        assert!(checked_relative("/").is_err());
    }

    #[test]
    fn leading_slash_is_dropped() {
        assert_eq!(checked_relative("/index.html").unwrap(), Path::new("index.html"));
        assert_eq!(checked_relative("./b/c").unwrap(), Path::new("b/c"));
    }
}
