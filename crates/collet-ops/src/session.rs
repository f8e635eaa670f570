//! Everything a command needs before the resolver runs: settings, root
//! requirements, the previous lock, and a provider over warmed-up metadata.

use std::path::{Path, PathBuf};
use std::time::Duration;

use collet_core::candidate::Candidate;
use collet_core::config::{GlobalConfig, ResolverConfig};
use collet_core::lockfile::Lockfile;
use collet_core::name::CollectionName;
use collet_core::requirement::Requirement;
use collet_core::requirements_file::RequirementsFile;
use collet_core::{LOCKFILE, REQUIREMENTS_FILE};
use collet_registry::api;
use collet_registry::cache::MetadataCache;
use collet_registry::prefetch::{self, PrefetchOptions};
use collet_registry::registry::Registry;
use collet_registry::source::{CacheSource, MemoryIndex, MetadataSource};
use collet_resolver::collection::{CollectionProvider, CollectionResolution, ProviderOptions};
use collet_resolver::{Reporter, Resolver};
use collet_util::errors::CollectError;
use collet_util::progress;

/// Flags shared by every resolving command.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// Requirements file; searched upwards from the working directory when unset.
    pub requirements: Option<PathBuf>,
    /// JSON index to resolve against instead of the configured registries.
    pub index: Option<PathBuf>,
    /// Global config file; `~/.collet/config.toml` when unset.
    pub config: Option<PathBuf>,
    pub offline: bool,
    pub pre: bool,
    pub upgrade: bool,
    pub no_deps: bool,
    pub signatures: bool,
    pub max_rounds: Option<usize>,
    /// Re-download metadata even when it is cached.
    pub refresh: bool,
}

/// A loaded project, ready to resolve.
pub struct Session {
    pub project_dir: PathBuf,
    pub requirements_path: PathBuf,
    pub requirements: Vec<Requirement>,
    pub requirements_hash: String,
    pub lockfile: Option<Lockfile>,
    pub settings: ResolverConfig,
    provider: CollectionProvider,
}

impl Session {
    /// Load configuration and requirements, warm the metadata cache unless
    /// offline, and build the provider.
    pub async fn load(opts: &ResolveOptions) -> miette::Result<Self> {
        let config = match &opts.config {
            Some(path) => GlobalConfig::load_from(path)?,
            None => GlobalConfig::load()?,
        };
        let settings = apply_flags(config.resolver.clone(), opts);

        let requirements_path = match &opts.requirements {
            Some(path) => path.clone(),
            None => locate_requirements()?,
        };
        let project_dir = requirements_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let content = std::fs::read(&requirements_path).map_err(|e| CollectError::Requirement {
            message: format!("Failed to read {}: {e}", requirements_path.display()),
        })?;
        let requirements_hash = collet_util::hash::sha256_bytes(&content);
        let requirements =
            RequirementsFile::parse_toml(&String::from_utf8_lossy(&content))?.requirements()?;

        let lockfile_path = project_dir.join(LOCKFILE);
        let lockfile = if lockfile_path.is_file() {
            Some(Lockfile::from_path(&lockfile_path)?)
        } else {
            None
        };
        if let Some(lock) = &lockfile {
            if !lock.is_fresh(&content) {
                progress::status_warn(
                    "Stale",
                    &format!("{LOCKFILE} was produced from different requirements"),
                );
            }
        }

        let sources = match &opts.index {
            Some(path) => {
                let index = MemoryIndex::from_path(path)?;
                tracing::debug!(
                    "resolving against index {} ({} versions)",
                    path.display(),
                    index.len()
                );
                vec![Box::new(index) as Box<dyn MetadataSource>]
            }
            None => registry_sources(&config, &settings, &requirements, opts.refresh).await?,
        };

        let mut options = ProviderOptions::from(&settings);
        if !settings.upgrade {
            if let Some(lock) = &lockfile {
                options.preferred_candidates = lock.preferred_candidates()?;
            }
        }

        Ok(Self {
            project_dir,
            requirements_path,
            requirements,
            requirements_hash,
            lockfile,
            settings,
            provider: CollectionProvider::new(sources, options),
        })
    }

    pub fn provider(&self) -> &CollectionProvider {
        &self.provider
    }

    pub fn lockfile_path(&self) -> PathBuf {
        self.project_dir.join(LOCKFILE)
    }

    /// Run the resolver over the root requirements.
    pub fn resolve_with<R>(&self, reporter: R) -> miette::Result<CollectionResolution>
    where
        R: Reporter<CollectionName, Requirement, Candidate>,
    {
        let resolution = Resolver::new(&self.provider, reporter)
            .with_max_rounds(self.settings.max_rounds)
            .resolve(self.requirements.iter().cloned())
            .map_err(CollectError::from)?;
        Ok(resolution)
    }
}

/// Command-line flags only ever tighten or enable; they never switch a
/// configured setting back off.
fn apply_flags(mut settings: ResolverConfig, opts: &ResolveOptions) -> ResolverConfig {
    settings.offline |= opts.offline;
    settings.pre_releases |= opts.pre;
    settings.upgrade |= opts.upgrade;
    settings.signatures |= opts.signatures;
    if opts.no_deps {
        settings.with_deps = false;
    }
    if let Some(rounds) = opts.max_rounds {
        settings.max_rounds = rounds;
    }
    settings
}

fn locate_requirements() -> miette::Result<PathBuf> {
    let cwd = std::env::current_dir().map_err(CollectError::Io)?;
    collet_util::fs::find_ancestor_with(&cwd, REQUIREMENTS_FILE)
        .map(|dir| dir.join(REQUIREMENTS_FILE))
        .ok_or_else(|| {
            CollectError::Requirement {
                message: format!(
                    "Could not find {REQUIREMENTS_FILE} in this or any parent directory"
                ),
            }
            .into()
        })
}

/// One cache-backed source per configured registry, after fetching whatever
/// the roots can reach (skipped when offline).
async fn registry_sources(
    config: &GlobalConfig,
    settings: &ResolverConfig,
    requirements: &[Requirement],
    refresh: bool,
) -> miette::Result<Vec<Box<dyn MetadataSource>>> {
    let registries = Registry::from_config(config);
    let cache = MetadataCache::new(config.cache.resolved_dir());

    if settings.offline {
        progress::status_info(
            "Offline",
            &format!("using cached metadata in {}", cache.root().display()),
        );
    } else {
        if refresh {
            let removed = cache.clear()?;
            tracing::debug!("cleared {removed} cached metadata document(s)");
        }
        let client = api::build_client(Duration::from_secs(config.network.timeout_secs))?;
        let roots: Vec<CollectionName> = requirements.iter().map(|r| r.name.clone()).collect();
        let opts = PrefetchOptions {
            jobs: config.network.jobs,
            refresh,
        };

        let spinner = if console::user_attended_stderr() {
            progress::spinner("Fetching collection metadata")
        } else {
            progress::hidden_spinner()
        };
        let stats = prefetch::prefetch(&client, &registries, &cache, &roots, &opts).await;
        spinner.finish_and_clear();
        let stats = stats?;
        progress::status(
            "Fetched",
            &format!(
                "metadata for {} collection(s) ({} cached, {} not found)",
                stats.fetched, stats.cached, stats.missing
            ),
        );
    }

    Ok(registries
        .into_iter()
        .map(|registry| {
            Box::new(CacheSource::new(registry.name, cache.clone())) as Box<dyn MetadataSource>
        })
        .collect())
}
