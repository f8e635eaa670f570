use collet_util::fs::{ensure_dir, find_ancestor_with, write_atomic};
use tempfile::TempDir;

#[test]
fn find_ancestor_in_same_dir() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("collections.toml"), "").unwrap();
    let found = find_ancestor_with(tmp.path(), "collections.toml").unwrap();
    assert_eq!(found, tmp.path());
}

#[test]
fn find_ancestor_in_parent() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("collections.toml"), "").unwrap();
    let nested = tmp.path().join("roles").join("web");
    std::fs::create_dir_all(&nested).unwrap();
    let found = find_ancestor_with(&nested, "collections.toml").unwrap();
    assert_eq!(found, tmp.path());
}

#[test]
fn find_ancestor_missing() {
    let tmp = TempDir::new().unwrap();
    assert!(find_ancestor_with(tmp.path(), "no-such-file.toml").is_none());
}

#[test]
fn ensure_dir_creates_nested() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("a").join("b");
    ensure_dir(&dir).unwrap();
    assert!(dir.is_dir());
    ensure_dir(&dir).unwrap();
}

#[test]
fn write_atomic_replaces_content() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("cache").join("doc.json");
    write_atomic(&path, b"first").unwrap();
    write_atomic(&path, b"second").unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
    assert!(!tmp.path().join("cache").join("doc.json.tmp").exists());
}
