use serde::{Deserialize, Serialize};
use std::path::Path;

use collet_util::errors::CollectError;

use crate::candidate::Candidate;
use crate::name::CollectionName;
use crate::version::parse_version;

/// Deterministic lockfile recording the exact resolved collection versions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Lockfile {
    /// SHA-256 of the requirements file the lock was produced from.
    #[serde(default, rename = "requirements-hash")]
    pub requirements_hash: Option<String>,
    #[serde(default)]
    pub collection: Vec<LockedCollection>,
}

/// A single locked collection with its registry and artifact digest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockedCollection {
    pub name: String,
    pub version: String,
    pub source: String,
    #[serde(default)]
    pub sha256: Option<String>,
    #[serde(default)]
    pub signed: bool,
    /// Names of the collections this one depends on.
    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl Lockfile {
    /// Build a lockfile from locked entries, sorted by name for stable output.
    pub fn generate(mut collection: Vec<LockedCollection>, requirements_hash: Option<String>) -> Self {
        collection.sort_by(|a, b| a.name.cmp(&b.name));
        Self {
            requirements_hash,
            collection,
        }
    }

    /// Load and parse a `collet.lock` file from the given path.
    pub fn from_path(path: &Path) -> miette::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CollectError::Lockfile {
            message: format!("Failed to read lockfile: {e}"),
        })?;
        toml::from_str(&content).map_err(|e| {
            CollectError::Lockfile {
                message: format!("Failed to parse lockfile: {e}"),
            }
            .into()
        })
    }

    /// Serialize the lockfile to a pretty-printed TOML string.
    pub fn to_string_pretty(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Write the lockfile to `path`.
    pub fn write_to(&self, path: &Path) -> miette::Result<()> {
        let content = self.to_string_pretty().map_err(|e| CollectError::Lockfile {
            message: format!("Failed to serialize lockfile: {e}"),
        })?;
        collet_util::fs::write_atomic(path, content.as_bytes()).map_err(CollectError::Io)?;
        Ok(())
    }

    /// Whether the lock was produced from requirements with this content.
    pub fn is_fresh(&self, requirements: &[u8]) -> bool {
        self.requirements_hash
            .as_deref()
            .is_some_and(|h| collet_util::hash::sha256_matches(requirements, h))
    }

    pub fn locked_version(&self, name: &str) -> Option<&str> {
        self.collection
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.version.as_str())
    }

    /// The locked collections as candidates, to be preferred on re-resolution.
    pub fn preferred_candidates(&self) -> miette::Result<Vec<Candidate>> {
        self.collection
            .iter()
            .map(|locked| {
                let name = CollectionName::parse(&locked.name).map_err(|e| CollectError::Lockfile {
                    message: e.to_string(),
                })?;
                let version = parse_version(&locked.version).map_err(|e| CollectError::Lockfile {
                    message: format!("{}: {e}", locked.name),
                })?;
                let mut candidate = Candidate::new(name, version, locked.source.clone());
                candidate.sha256 = locked.sha256.clone();
                Ok(candidate)
            })
            .collect()
    }
}

impl LockedCollection {
    pub fn from_candidate(candidate: &Candidate, dependencies: Vec<String>) -> Self {
        Self {
            name: candidate.name.to_string(),
            version: candidate.version.to_string(),
            source: candidate.source.clone(),
            sha256: candidate.sha256.clone(),
            signed: candidate.is_signed(),
            dependencies,
        }
    }
}
