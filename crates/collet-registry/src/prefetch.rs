//! Concurrent, transitive warm-up of the metadata cache.
//!
//! Resolution itself is synchronous and reads only local metadata. Before it
//! runs, this module walks the collection graph breadth-first from the root
//! names, fetching every collection it discovers from every registry with a
//! bounded number of requests in flight.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use reqwest::Client;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use collet_core::name::CollectionName;
use collet_util::errors::CollectError;

use crate::api;
use crate::cache::MetadataCache;
use crate::metadata::CollectionDocument;
use crate::registry::Registry;

/// Tracks which collection names have been scheduled during a prefetch run,
/// so each one is fetched at most once even across dependency cycles.
#[derive(Debug, Default)]
pub struct VisitedSet {
    visited: HashSet<CollectionName>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a name as visited. Returns `false` if already visited.
    pub fn visit(&mut self, name: &CollectionName) -> bool {
        self.visited.insert(name.clone())
    }

    pub fn len(&self) -> usize {
        self.visited.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visited.is_empty()
    }
}

/// Counters reported after a prefetch run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PrefetchStats {
    /// Documents downloaded from a registry.
    pub fetched: usize,
    /// Documents already present in the cache.
    pub cached: usize,
    /// Registry/collection pairs the registry does not know.
    pub missing: usize,
}

/// Options for [`prefetch`].
#[derive(Debug, Clone)]
pub struct PrefetchOptions {
    /// Maximum requests in flight.
    pub jobs: usize,
    /// Re-download documents that are already cached.
    pub refresh: bool,
}

impl Default for PrefetchOptions {
    fn default() -> Self {
        Self {
            jobs: 8,
            refresh: false,
        }
    }
}

/// Fetch metadata for `roots` and everything they can transitively depend on.
///
/// Any network failure aborts the run. A collection a registry does not know
/// is cached as an empty document so offline runs can tell "absent" from
/// "never fetched".
pub async fn prefetch(
    client: &Client,
    registries: &[Registry],
    cache: &MetadataCache,
    roots: &[CollectionName],
    opts: &PrefetchOptions,
) -> miette::Result<PrefetchStats> {
    let mut stats = PrefetchStats::default();
    let mut visited = VisitedSet::new();
    let semaphore = Arc::new(Semaphore::new(opts.jobs.max(1)));

    let mut level: Vec<CollectionName> = roots
        .iter()
        .filter(|name| visited.visit(name))
        .cloned()
        .collect();

    while !level.is_empty() {
        let mut discovered: BTreeSet<CollectionName> = BTreeSet::new();
        let mut join_set = JoinSet::new();

        for name in &level {
            for registry in registries {
                if !opts.refresh {
                    if let Some(doc) = cache.get(&registry.name, name)? {
                        stats.cached += 1;
                        collect_dependency_names(&doc, &mut discovered);
                        continue;
                    }
                }
                let client = client.clone();
                let registry = registry.clone();
                let name = name.clone();
                let sem = semaphore.clone();
                join_set.spawn(async move {
                    let _permit = sem.acquire().await;
                    let result = api::fetch_collection(&client, &registry, &name).await;
                    (registry.name, name, result)
                });
            }
        }

        while let Some(joined) = join_set.join_next().await {
            let (registry, name, result) = joined.map_err(|e| CollectError::Network {
                message: format!("Prefetch task failed: {e}"),
            })?;
            let doc = match result? {
                Some(doc) => {
                    stats.fetched += 1;
                    doc
                }
                None => {
                    tracing::debug!("{name} not found in {registry}");
                    stats.missing += 1;
                    CollectionDocument {
                        namespace: name.namespace().to_string(),
                        name: name.name().to_string(),
                        versions: Vec::new(),
                    }
                }
            };
            cache.put(&registry, &doc)?;
            collect_dependency_names(&doc, &mut discovered);
        }

        level = discovered
            .into_iter()
            .filter(|name| visited.visit(name))
            .collect();
    }

    tracing::debug!(
        "prefetch done: {} fetched, {} cached, {} missing across {} collections",
        stats.fetched,
        stats.cached,
        stats.missing,
        visited.len()
    );
    Ok(stats)
}

fn collect_dependency_names(doc: &CollectionDocument, into: &mut BTreeSet<CollectionName>) {
    for dep in doc.dependency_names() {
        match CollectionName::parse(dep) {
            Ok(name) => {
                into.insert(name);
            }
            Err(e) => tracing::warn!("{}.{}: skipping dependency: {e}", doc.namespace, doc.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::VersionMetadata;

    fn name(s: &str) -> CollectionName {
        CollectionName::parse(s).unwrap()
    }

    #[test]
    fn visited_tracking() {
        let mut set = VisitedSet::new();
        assert!(set.is_empty());
        assert!(set.visit(&name("ns.a")));
        assert!(!set.visit(&name("NS.A")));
        assert!(set.visit(&name("ns.b")));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn dependency_names_skip_invalid() {
        let mut deps = std::collections::BTreeMap::new();
        deps.insert("ns.b".to_string(), "*".to_string());
        deps.insert("broken".to_string(), "*".to_string());
        let doc = CollectionDocument {
            namespace: "ns".to_string(),
            name: "a".to_string(),
            versions: vec![VersionMetadata {
                namespace: "ns".to_string(),
                name: "a".to_string(),
                version: "1.0.0".to_string(),
                dependencies: deps,
                signatures: vec![],
                download_url: None,
                sha256: None,
            }],
        };
        let mut found = BTreeSet::new();
        collect_dependency_names(&doc, &mut found);
        assert_eq!(found.into_iter().collect::<Vec<_>>(), vec![name("ns.b")]);
    }

    #[tokio::test]
    async fn fully_cached_roots_need_no_network() {
        let tmp = tempfile::TempDir::new().unwrap();
        let cache = MetadataCache::new(tmp.path());
        let mut deps = std::collections::BTreeMap::new();
        deps.insert("ns.b".to_string(), ">=1".to_string());
        for (coll, deps) in [("a", deps), ("b", Default::default())] {
            cache
                .put(
                    "galaxy",
                    &CollectionDocument {
                        namespace: "ns".to_string(),
                        name: coll.to_string(),
                        versions: vec![VersionMetadata {
                            namespace: "ns".to_string(),
                            name: coll.to_string(),
                            version: "1.0.0".to_string(),
                            dependencies: deps,
                            signatures: vec![],
                            download_url: None,
                            sha256: None,
                        }],
                    },
                )
                .unwrap();
        }

        // Unroutable URL: any request would fail the run.
        let registries = vec![Registry::new("galaxy", "http://127.0.0.1:9")];
        let client = api::build_client(std::time::Duration::from_secs(1)).unwrap();
        let stats = prefetch(
            &client,
            &registries,
            &cache,
            &[name("ns.a")],
            &PrefetchOptions::default(),
        )
        .await
        .unwrap();
        assert_eq!(
            stats,
            PrefetchStats {
                fetched: 0,
                cached: 2,
                missing: 0
            }
        );
    }
}
