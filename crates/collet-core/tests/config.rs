use collet_core::config::{GlobalConfig, DEFAULT_REGISTRY_NAME, DEFAULT_REGISTRY_URL};

#[test]
fn test_default_resolver_policy() {
    let config = GlobalConfig::default();
    assert!(config.resolver.with_deps);
    assert!(!config.resolver.pre_releases);
    assert!(!config.resolver.upgrade);
    assert!(!config.resolver.signatures);
    assert!(!config.resolver.offline);
    assert!(config.resolver.max_rounds > 0);
}

#[test]
fn test_empty_toml_uses_serde_defaults() {
    let config: GlobalConfig = toml::from_str("").unwrap();
    assert!(config.resolver.with_deps);
    assert_eq!(config.network.jobs, 8);
    assert_eq!(config.cache.dir, "~/.collet/cache");
}

#[test]
fn test_default_registry_fallback() {
    let config = GlobalConfig::default();
    assert_eq!(
        config.registry_urls(),
        vec![(
            DEFAULT_REGISTRY_NAME.to_string(),
            DEFAULT_REGISTRY_URL.to_string()
        )]
    );
}

#[test]
fn test_parse_from_toml() {
    let toml = r#"
[resolver]
with-deps = false
pre-releases = true
upgrade = true
signatures = true
offline = true
max-rounds = 500

[registries]
mirror = "https://mirror.example.com"
galaxy = "https://galaxy.ansible.com"

[tokens]
mirror = "s3cr3t"

[cache]
dir = "/custom/cache"

[network]
jobs = 2
timeout-secs = 5
"#;
    let config: GlobalConfig = toml::from_str(toml).unwrap();
    assert!(!config.resolver.with_deps);
    assert!(config.resolver.pre_releases);
    assert!(config.resolver.upgrade);
    assert!(config.resolver.signatures);
    assert!(config.resolver.offline);
    assert_eq!(config.resolver.max_rounds, 500);
    assert_eq!(config.tokens.get("mirror").map(String::as_str), Some("s3cr3t"));
    assert_eq!(config.cache.resolved_dir().to_str(), Some("/custom/cache"));
    assert_eq!(config.network.jobs, 2);
    assert_eq!(config.network.timeout_secs, 5);

    let names: Vec<String> = config.registry_urls().into_iter().map(|(n, _)| n).collect();
    assert_eq!(names, vec!["galaxy", "mirror"]);
}

#[test]
fn test_load_from_missing_path_returns_defaults() {
    let tmp = tempfile::TempDir::new().unwrap();
    let config = GlobalConfig::load_from(&tmp.path().join("config.toml")).unwrap();
    assert!(config.registries.is_empty());
}

#[test]
fn test_load_from_invalid_file_errors() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("config.toml");
    std::fs::write(&path, "[resolver\n").unwrap();
    let err = GlobalConfig::load_from(&path).unwrap_err();
    assert!(err.to_string().contains("Configuration error"), "got: {err}");
}
