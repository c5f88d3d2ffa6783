use bytes::Bytes;
use embedhttp::vfs::{Persistence, VfsError, VirtualFileSystem};

#[test]
fn test_vfs_add_exists_get() {
    let mut vfs = VirtualFileSystem::new();
    vfs.add_file("index.html", "<html></html>");

    assert!(vfs.exists("index.html"));
    assert!(!vfs.exists("missing.html"));

    let entry = vfs.get_file("index.html").unwrap();
    assert_eq!(entry.data, Bytes::from("<html></html>"));
    assert_eq!(entry.mime_type, "text/html");
}

#[test]
fn test_vfs_mime_types() {
    let cases = [
        ("a.html", "text/html"),
        ("a.css", "text/css"),
        ("a.js", "application/javascript"),
        ("a.png", "image/png"),
        ("a.jpg", "image/jpeg"),
        ("a.jpeg", "image/jpeg"),
        ("a.svg", "image/svg+xml"),
        ("a.json", "application/json"),
        ("a.wasm", "application/wasm"),
        ("a.bin", "application/octet-stream"),
        ("noext", "application/octet-stream"),
    ];

    let mut vfs = VirtualFileSystem::new();
    for (path, _) in cases {
        vfs.add_file(path, "x");
    }

    for (path, mime) in cases {
        assert_eq!(vfs.get_file(path).unwrap().mime_type, mime, "{path}");
    }
}

#[test]
fn test_vfs_unknown_path_is_none() {
    let vfs = VirtualFileSystem::new();
    assert!(vfs.get_file("nope.txt").is_none());
    assert!(vfs.is_empty());
}

#[test]
fn test_vfs_leading_slash_is_a_different_key() {
    let mut vfs = VirtualFileSystem::new();
    vfs.add_file("app.js", "x");

    assert!(!vfs.exists("/app.js"));
}

#[test]
fn test_vfs_files_are_sorted() {
    let mut vfs = VirtualFileSystem::new();
    vfs.add_file("b.txt", "b");
    vfs.add_file("a.txt", "a");

    let keys: Vec<_> = vfs.files().keys().cloned().collect();
    assert_eq!(keys, vec!["a.txt", "b.txt"]);
}

#[test]
fn test_vfs_disk_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let all_bytes: Vec<u8> = (0..=255u8).collect();

    {
        let mut vfs = VirtualFileSystem::persistent(dir.path()).unwrap();
        vfs.add_file("a.txt", "alpha");
        vfs.add_file("b/c.bin", all_bytes.clone());
        vfs.save_to_disk().unwrap();
    }

    assert!(dir.path().join("b").join("c.bin").is_file());

    let reloaded = VirtualFileSystem::persistent(dir.path()).unwrap();
    assert_eq!(reloaded.len(), 2);
    assert_eq!(reloaded.get_file("a.txt").unwrap().data, Bytes::from("alpha"));
    assert_eq!(reloaded.get_file("b/c.bin").unwrap().data, Bytes::from(all_bytes));
}

#[test]
fn test_vfs_saves_on_drop() {
    let dir = tempfile::tempdir().unwrap();

    {
        let mut vfs = VirtualFileSystem::persistent(dir.path()).unwrap();
        vfs.add_file("late.txt", "written by drop");
    }

    let on_disk = std::fs::read_to_string(dir.path().join("late.txt")).unwrap();
    assert_eq!(on_disk, "written by drop");
}

#[test]
fn test_vfs_persistent_creates_directory() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("x").join("y");

    let vfs = VirtualFileSystem::persistent(&nested).unwrap();

    assert!(nested.is_dir());
    assert!(vfs.is_persistent());
    assert_eq!(vfs.persistence_dir(), Some(nested.as_path()));
}

#[test]
fn test_vfs_save_without_persistence_fails() {
    let mut vfs = VirtualFileSystem::new();
    vfs.add_file("a.txt", "x");

    let err = vfs.save_to_disk().unwrap_err();
    assert!(err.is_not_persistent());
}

#[test]
fn test_vfs_load_without_persistence_fails() {
    let mut vfs = VirtualFileSystem::with_persistence(Persistence::InMemory).unwrap();
    assert!(matches!(vfs.load_from_disk(), Err(VfsError::NotPersistent)));
}

#[test]
fn test_vfs_save_rejects_escaping_paths() {
    let dir = tempfile::tempdir().unwrap();
    let mut vfs = VirtualFileSystem::persistent(dir.path().join("store")).unwrap();
    vfs.add_file("../outside.txt", "x");

    let err = vfs.save_to_disk().unwrap_err();
    assert!(matches!(err, VfsError::InvalidPath { .. }));
    assert!(!dir.path().join("outside.txt").exists());

    // Keep drop from retrying the bad path
    vfs.remove_file("../outside.txt");
}

#[test]
fn test_vfs_save_strips_leading_slash() {
    let dir = tempfile::tempdir().unwrap();
    let mut vfs = VirtualFileSystem::persistent(dir.path()).unwrap();
    vfs.add_file("/index.html", "<html>root</html>");
    vfs.add_file("app.js", "let a;");

    vfs.save_to_disk().unwrap();

    assert_eq!(
        std::fs::read_to_string(dir.path().join("index.html")).unwrap(),
        "<html>root</html>"
    );
    assert!(dir.path().join("app.js").is_file());
}

#[test]
fn test_vfs_save_stops_at_first_failed_write() {
    let dir = tempfile::tempdir().unwrap();
    // A directory where b.txt should go makes that write fail
    std::fs::create_dir(dir.path().join("b.txt")).unwrap();

    let mut vfs = VirtualFileSystem::persistent(dir.path()).unwrap();
    vfs.add_file("a.txt", "first");
    vfs.add_file("b.txt", "blocked");
    vfs.add_file("c.txt", "never");

    let err = vfs.save_to_disk().unwrap_err();

    assert!(matches!(err, VfsError::Write { .. }));
    assert_eq!(std::fs::read_to_string(dir.path().join("a.txt")).unwrap(), "first");
    assert!(dir.path().join("b.txt").is_dir());
    assert!(!dir.path().join("c.txt").exists());

    // Keep drop from retrying the blocked write
    vfs.remove_file("b.txt");
}
