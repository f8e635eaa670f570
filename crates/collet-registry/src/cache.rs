//! On-disk metadata cache, one JSON document per collection per registry.

use std::fs;
use std::path::{Path, PathBuf};

use collet_core::name::CollectionName;
use collet_util::errors::CollectError;

use crate::metadata::CollectionDocument;

/// Metadata cache laid out as `<root>/<registry>/<namespace>/<name>.json`.
#[derive(Debug, Clone)]
pub struct MetadataCache {
    root: PathBuf,
}

impl MetadataCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory of this cache.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the cached document for `name` in `registry`.
    pub fn document_path(&self, registry: &str, name: &CollectionName) -> PathBuf {
        self.root
            .join(registry)
            .join(name.namespace())
            .join(format!("{}.json", name.name()))
    }

    /// Read a cached document. A missing file is `Ok(None)`; an unreadable or
    /// malformed one is an error, since it means the cache cannot be trusted.
    pub fn get(
        &self,
        registry: &str,
        name: &CollectionName,
    ) -> Result<Option<CollectionDocument>, CollectError> {
        let path = self.document_path(registry, name);
        if !path.is_file() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        let doc = serde_json::from_str(&content).map_err(|e| CollectError::Metadata {
            message: format!("Corrupt cache entry {}: {e}", path.display()),
        })?;
        Ok(Some(doc))
    }

    /// Store a document, replacing any previous one.
    pub fn put(&self, registry: &str, doc: &CollectionDocument) -> miette::Result<PathBuf> {
        let name = CollectionName::parse(&format!("{}.{}", doc.namespace, doc.name)).map_err(
            |e| CollectError::Metadata {
                message: e.to_string(),
            },
        )?;
        let path = self.document_path(registry, &name);
        let json = serde_json::to_vec_pretty(doc).map_err(|e| CollectError::Metadata {
            message: format!("Failed to serialize {name}: {e}"),
        })?;
        collet_util::fs::write_atomic(&path, &json).map_err(CollectError::Io)?;
        Ok(path)
    }

    /// Remove every cached document. Returns the number of files removed.
    pub fn clear(&self) -> miette::Result<u32> {
        let mut removed = 0u32;
        if !self.root.is_dir() {
            return Ok(removed);
        }
        for registry in fs::read_dir(&self.root).map_err(CollectError::Io)? {
            let registry = registry.map_err(CollectError::Io)?.path();
            if !registry.is_dir() {
                continue;
            }
            for ns in fs::read_dir(&registry).map_err(CollectError::Io)? {
                let ns = ns.map_err(CollectError::Io)?.path();
                if !ns.is_dir() {
                    continue;
                }
                for doc in fs::read_dir(&ns).map_err(CollectError::Io)? {
                    let doc = doc.map_err(CollectError::Io)?.path();
                    if doc.extension().is_some_and(|e| e == "json") {
                        fs::remove_file(&doc).map_err(CollectError::Io)?;
                        removed += 1;
                    }
                }
            }
        }
        Ok(removed)
    }
}
