use std::fs;
use std::path::{Path, PathBuf};

use collet_core::lockfile::Lockfile;
use collet_core::name::CollectionName;
use collet_ops::ops_lock::lockfile_from;
use collet_ops::session::{ResolveOptions, Session};
use collet_resolver::NullReporter;
use tempfile::TempDir;

const INDEX: &str = r#"{
  "registry": "fixture",
  "collections": [
    {"namespace": "ansible", "name": "utils", "version": "2.0.0"},
    {"namespace": "ansible", "name": "utils", "version": "2.5.0"},
    {"namespace": "community", "name": "general", "version": "7.0.0",
     "dependencies": {"ansible.utils": ">=2.0.0"}},
    {"namespace": "community", "name": "general", "version": "8.0.0",
     "dependencies": {"ansible.utils": ">=2.0.0"}}
  ]
}"#;

fn project(requirements: &str) -> (TempDir, ResolveOptions) {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("collections.toml"), requirements).unwrap();
    fs::write(tmp.path().join("index.json"), INDEX).unwrap();
    let opts = ResolveOptions {
        requirements: Some(tmp.path().join("collections.toml")),
        index: Some(tmp.path().join("index.json")),
        config: Some(tmp.path().join("no-config.toml")),
        ..ResolveOptions::default()
    };
    (tmp, opts)
}

fn version(session: &Session, fqcn: &str) -> String {
    let resolution = session.resolve_with(NullReporter).unwrap();
    resolution.mapping[&CollectionName::parse(fqcn).unwrap()]
        .version
        .to_string()
}

fn write_lock(dir: &Path, session: &Session) -> PathBuf {
    let resolution = session.resolve_with(NullReporter).unwrap();
    let lock = lockfile_from(&resolution, Some(session.requirements_hash.clone()));
    let path = dir.join("collet.lock");
    lock.write_to(&path).unwrap();
    path
}

#[tokio::test]
async fn resolves_against_an_index_file() {
    let (_tmp, opts) = project("[collections]\n\"community.general\" = \"*\"\n");
    let session = Session::load(&opts).await.unwrap();

    assert_eq!(session.requirements.len(), 1);
    assert!(session.lockfile.is_none());
    assert_eq!(version(&session, "community.general"), "8.0.0");
    assert_eq!(version(&session, "ansible.utils"), "2.5.0");
}

#[tokio::test]
async fn lockfile_lists_dependencies_and_hash() {
    let (tmp, opts) = project("[collections]\n\"community.general\" = \"*\"\n");
    let session = Session::load(&opts).await.unwrap();
    let path = write_lock(tmp.path(), &session);

    let lock = Lockfile::from_path(&path).unwrap();
    let names: Vec<_> = lock.collection.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["ansible.utils", "community.general"]);
    assert_eq!(lock.collection[1].dependencies, vec!["ansible.utils".to_string()]);
    assert!(lock.collection[0].dependencies.is_empty());
    assert_eq!(lock.collection[0].source, "fixture");

    let requirements = fs::read(tmp.path().join("collections.toml")).unwrap();
    assert!(lock.is_fresh(&requirements));
}

#[tokio::test]
async fn locked_versions_are_kept_until_upgrade() {
    let (tmp, mut opts) = project("[collections]\n\"community.general\" = \"<8.0.0\"\n");
    let session = Session::load(&opts).await.unwrap();
    assert_eq!(version(&session, "community.general"), "7.0.0");
    write_lock(tmp.path(), &session);

    fs::write(
        tmp.path().join("collections.toml"),
        "[collections]\n\"community.general\" = \"*\"\n",
    )
    .unwrap();
    let session = Session::load(&opts).await.unwrap();
    assert!(session.lockfile.is_some());
    assert_eq!(version(&session, "community.general"), "7.0.0");

    opts.upgrade = true;
    let session = Session::load(&opts).await.unwrap();
    assert_eq!(version(&session, "community.general"), "8.0.0");
}

#[tokio::test]
async fn no_deps_resolves_only_roots() {
    let (_tmp, mut opts) = project("[collections]\n\"community.general\" = \"*\"\n");
    opts.no_deps = true;
    let session = Session::load(&opts).await.unwrap();
    let resolution = session.resolve_with(NullReporter).unwrap();
    assert_eq!(resolution.mapping.len(), 1);
}

#[tokio::test]
async fn conflict_becomes_a_resolution_error() {
    let (_tmp, opts) = project(
        "[collections]\n\"community.general\" = \"*\"\n\"ansible.utils\" = \"<2.0.0\"\n",
    );
    let session = Session::load(&opts).await.unwrap();
    let err = session.resolve_with(NullReporter).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("Dependency resolution failed"));
}

#[tokio::test]
async fn missing_requirements_file_is_reported() {
    let tmp = TempDir::new().unwrap();
    let opts = ResolveOptions {
        requirements: Some(tmp.path().join("collections.toml")),
        config: Some(tmp.path().join("no-config.toml")),
        ..ResolveOptions::default()
    };
    let err = Session::load(&opts).await.err().unwrap();
    assert!(err.to_string().contains("Failed to read"));
}
