//! Synchronous metadata sources the resolver's provider reads from.
//!
//! Network access happens before resolution (see [`crate::prefetch`]); by the
//! time the resolver runs, every source answers from local data.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use collet_core::name::CollectionName;
use collet_util::errors::CollectError;

use crate::cache::MetadataCache;
use crate::metadata::VersionMetadata;

/// A named supplier of published versions for collections.
pub trait MetadataSource {
    /// Registry name stamped on every candidate from this source.
    fn name(&self) -> &str;

    /// Every known version of `name`. Unknown collections yield an empty list.
    fn versions(&self, name: &CollectionName) -> Result<Vec<VersionMetadata>, CollectError>;
}

/// Reads one registry's documents from the on-disk metadata cache.
#[derive(Debug, Clone)]
pub struct CacheSource {
    registry: String,
    cache: MetadataCache,
}

impl CacheSource {
    pub fn new(registry: impl Into<String>, cache: MetadataCache) -> Self {
        Self {
            registry: registry.into(),
            cache,
        }
    }
}

impl MetadataSource for CacheSource {
    fn name(&self) -> &str {
        &self.registry
    }

    fn versions(&self, name: &CollectionName) -> Result<Vec<VersionMetadata>, CollectError> {
        Ok(self
            .cache
            .get(&self.registry, name)?
            .map(|doc| doc.versions)
            .unwrap_or_default())
    }
}

/// On-disk form of a [`MemoryIndex`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexFile {
    pub registry: String,
    #[serde(default)]
    pub collections: Vec<VersionMetadata>,
}

/// An in-memory metadata source, loaded from an index file or built in code.
#[derive(Debug, Clone, Default)]
pub struct MemoryIndex {
    registry: String,
    versions: BTreeMap<CollectionName, Vec<VersionMetadata>>,
}

impl MemoryIndex {
    pub fn new(registry: impl Into<String>) -> Self {
        Self {
            registry: registry.into(),
            versions: BTreeMap::new(),
        }
    }

    /// Load a JSON index file: `{ "registry": "...", "collections": [...] }`.
    pub fn from_path(path: &Path) -> miette::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CollectError::Metadata {
            message: format!("Failed to read index {}: {e}", path.display()),
        })?;
        let file: IndexFile = serde_json::from_str(&content).map_err(|e| CollectError::Metadata {
            message: format!("Failed to parse index {}: {e}", path.display()),
        })?;
        let mut index = Self::new(file.registry);
        for meta in file.collections {
            index.insert(meta)?;
        }
        Ok(index)
    }

    /// Add one version. Versions keep their insertion order per collection.
    pub fn insert(&mut self, meta: VersionMetadata) -> Result<(), CollectError> {
        let name =
            CollectionName::parse(&meta.fqcn()).map_err(|e| CollectError::Metadata {
                message: e.to_string(),
            })?;
        self.versions.entry(name).or_default().push(meta);
        Ok(())
    }

    /// Convenience for building fixtures: one version with dependency pairs.
    pub fn add(
        &mut self,
        fqcn: &str,
        version: &str,
        dependencies: &[(&str, &str)],
    ) -> Result<(), CollectError> {
        let (namespace, name) = fqcn.split_once('.').ok_or_else(|| CollectError::Metadata {
            message: format!("`{fqcn}` is not `namespace.name`"),
        })?;
        self.insert(VersionMetadata {
            namespace: namespace.to_string(),
            name: name.to_string(),
            version: version.to_string(),
            dependencies: dependencies
                .iter()
                .map(|(n, s)| (n.to_string(), s.to_string()))
                .collect(),
            signatures: Vec::new(),
            download_url: None,
            sha256: None,
        })
    }

    pub fn len(&self) -> usize {
        self.versions.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}

impl MetadataSource for MemoryIndex {
    fn name(&self) -> &str {
        &self.registry
    }

    fn versions(&self, name: &CollectionName) -> Result<Vec<VersionMetadata>, CollectError> {
        Ok(self.versions.get(name).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::CollectionDocument;

    #[test]
    fn memory_index_lookup() {
        let mut index = MemoryIndex::new("local");
        index.add("ns.a", "1.0.0", &[("ns.b", ">=1")]).unwrap();
        index.add("ns.a", "2.0.0", &[]).unwrap();
        index.add("NS.B", "1.0.0", &[]).unwrap();
        assert_eq!(index.len(), 3);
        assert_eq!(index.name(), "local");

        let a = CollectionName::parse("ns.a").unwrap();
        let versions = index.versions(&a).unwrap();
        assert_eq!(versions.len(), 2);
        assert_eq!(versions[0].dependencies.get("ns.b").map(String::as_str), Some(">=1"));

        let b = CollectionName::parse("ns.b").unwrap();
        assert_eq!(index.versions(&b).unwrap().len(), 1);

        let missing = CollectionName::parse("ns.zzz").unwrap();
        assert!(index.versions(&missing).unwrap().is_empty());
    }

    #[test]
    fn memory_index_rejects_bad_name() {
        let mut index = MemoryIndex::new("local");
        assert!(index.add("nodot", "1.0.0", &[]).is_err());
    }

    #[test]
    fn memory_index_from_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("index.json");
        std::fs::write(
            &path,
            r#"{"registry": "fixture", "collections": [
                {"namespace": "ns", "name": "a", "version": "1.0.0"},
                {"namespace": "ns", "name": "a", "version": "1.1.0", "dependencies": {"ns.b": "*"}}
            ]}"#,
        )
        .unwrap();
        let index = MemoryIndex::from_path(&path).unwrap();
        assert_eq!(index.name(), "fixture");
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn cache_source_reads_documents() {
        let tmp = tempfile::TempDir::new().unwrap();
        let cache = MetadataCache::new(tmp.path());
        let mut index = MemoryIndex::new("galaxy");
        index.add("ns.a", "1.0.0", &[]).unwrap();
        let name = CollectionName::parse("ns.a").unwrap();
        cache
            .put(
                "galaxy",
                &CollectionDocument {
                    namespace: "ns".to_string(),
                    name: "a".to_string(),
                    versions: index.versions(&name).unwrap(),
                },
            )
            .unwrap();

        let source = CacheSource::new("galaxy", cache.clone());
        assert_eq!(source.versions(&name).unwrap().len(), 1);
        let other = CacheSource::new("mirror", cache);
        assert!(other.versions(&name).unwrap().is_empty());
    }
}
