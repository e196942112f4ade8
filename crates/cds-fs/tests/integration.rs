use cds_fs::{
    AtomicWriteOptions, Workspace, atomic_read, atomic_write, remove_dir_all_if_exists,
    remove_file_if_exists, replace_dir,
};
use tempfile::tempdir;

#[test]
fn test_atomic_write_basic() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.txt");

    atomic_write(&path, b"hello world", AtomicWriteOptions::new()).unwrap();

    assert!(path.exists());
    assert_eq!(atomic_read(&path).unwrap(), b"hello world");
}

#[test]
fn test_atomic_write_overwrites_existing() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("existing.txt");

    std::fs::write(&path, "original").unwrap();

    atomic_write(&path, b"new content", AtomicWriteOptions::new()).unwrap();

    assert_eq!(atomic_read(&path).unwrap(), b"new content");
}

#[test]
fn test_atomic_write_missing_parent_fails() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing/test.txt");

    let err = atomic_write(&path, b"data", AtomicWriteOptions::new()).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_workspace_replaces_populated_tree() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("current");
    std::fs::create_dir_all(dest.join("a")).unwrap();
    std::fs::write(dest.join("a/old.txt"), "old").unwrap();

    let workspace = Workspace::for_destination(&dest).unwrap();
    std::fs::create_dir_all(workspace.path().join("b")).unwrap();
    std::fs::write(workspace.path().join("b/new.txt"), "new").unwrap();
    workspace.commit().unwrap();

    assert_eq!(std::fs::read_to_string(dest.join("b/new.txt")).unwrap(), "new");
    assert!(!dest.join("a").exists());

    let hidden = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().starts_with('.'))
        .count();
    assert_eq!(hidden, 0);
}

#[test]
fn test_replace_then_remove() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("new_version");
    let dest = dir.path().join("current");
    let archive = dir.path().join("current.zip");

    std::fs::create_dir_all(&src).unwrap();
    std::fs::write(src.join("index.html"), "hi").unwrap();
    std::fs::write(&archive, "zip").unwrap();

    replace_dir(&src, &dest).unwrap();
    assert!(dest.join("index.html").exists());

    assert!(remove_file_if_exists(&archive).unwrap());
    assert!(remove_dir_all_if_exists(&dest).unwrap());
    assert!(!dest.exists());
    assert!(!archive.exists());
}
