use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use collet_util::errors::CollectError;

/// Name of the registry used when no registries are configured.
pub const DEFAULT_REGISTRY_NAME: &str = "galaxy";

/// URL of the registry used when no registries are configured.
pub const DEFAULT_REGISTRY_URL: &str = "https://galaxy.ansible.com";

/// Global user configuration loaded from `~/.collet/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Registry name to base URL, consulted in name order.
    #[serde(default)]
    pub registries: BTreeMap<String, String>,

    /// Registry name to API token.
    #[serde(default)]
    pub tokens: BTreeMap<String, String>,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub network: NetworkConfig,
}

/// Resolution policy from `[resolver]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Resolve transitive dependencies, not just the listed collections.
    #[serde(default = "default_true", rename = "with-deps")]
    pub with_deps: bool,
    #[serde(default, rename = "pre-releases")]
    pub pre_releases: bool,
    /// Prefer the newest version over a locked one.
    #[serde(default)]
    pub upgrade: bool,
    /// Only consider candidates that carry a signature.
    #[serde(default)]
    pub signatures: bool,
    /// Never contact a registry; resolve from cached metadata only.
    #[serde(default)]
    pub offline: bool,
    #[serde(default = "default_max_rounds", rename = "max-rounds")]
    pub max_rounds: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            with_deps: true,
            pre_releases: false,
            upgrade: false,
            signatures: false,
            offline: false,
            max_rounds: default_max_rounds(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_max_rounds() -> usize {
    200_000
}

/// Metadata cache configuration from `[cache]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_dir")]
    pub dir: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
        }
    }
}

fn default_cache_dir() -> String {
    "~/.collet/cache".to_string()
}

impl CacheConfig {
    /// The cache directory with a leading `~` expanded. The default lives
    /// under [`dirs_path`], so it follows `COLLET_HOME`.
    pub fn resolved_dir(&self) -> PathBuf {
        if self.dir == default_cache_dir() {
            return dirs_path().join("cache");
        }
        match self.dir.strip_prefix("~/") {
            Some(rest) => home_dir().join(rest),
            None => PathBuf::from(&self.dir),
        }
    }
}

/// Network settings from `[network]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Maximum concurrent metadata requests.
    #[serde(default = "default_jobs")]
    pub jobs: usize,
    #[serde(default = "default_timeout", rename = "timeout-secs")]
    pub timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            jobs: default_jobs(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_jobs() -> usize {
    8
}

fn default_timeout() -> u64 {
    60
}

impl GlobalConfig {
    /// Load the global configuration from `~/.collet/config.toml`, or return defaults if the file doesn't exist.
    pub fn load() -> miette::Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load configuration from an explicit path, or return defaults if it doesn't exist.
    pub fn load_from(path: &Path) -> miette::Result<Self> {
        if !path.is_file() {
            tracing::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| CollectError::Config {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        toml::from_str(&content).map_err(|e| {
            CollectError::Config {
                message: format!("Failed to parse {}: {e}", path.display()),
            }
            .into()
        })
    }

    /// Returns the default path to the global config file.
    pub fn default_path() -> PathBuf {
        dirs_path().join("config.toml")
    }

    /// Configured registries in name order, falling back to the public one.
    pub fn registry_urls(&self) -> Vec<(String, String)> {
        if self.registries.is_empty() {
            return vec![(
                DEFAULT_REGISTRY_NAME.to_string(),
                DEFAULT_REGISTRY_URL.to_string(),
            )];
        }
        self.registries
            .iter()
            .map(|(name, url)| (name.clone(), url.clone()))
            .collect()
    }
}

/// Returns the path to the collet data directory.
///
/// `COLLET_HOME` overrides the default `~/.collet/`.
pub fn dirs_path() -> PathBuf {
    if let Ok(home) = std::env::var("COLLET_HOME") {
        return PathBuf::from(home);
    }
    home_dir().join(".collet")
}

fn home_dir() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    Path::new(&home).to_path_buf()
}
