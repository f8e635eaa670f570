//! Stored form of registry metadata.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Everything the resolver needs to know about one published version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionMetadata {
    pub namespace: String,
    pub name: String,
    pub version: String,
    /// Dependency name (`namespace.name`) to version specifier.
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
    #[serde(default)]
    pub signatures: Vec<SignatureInfo>,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub sha256: Option<String>,
}

impl VersionMetadata {
    /// `namespace.name` of the collection this version belongs to.
    pub fn fqcn(&self) -> String {
        format!("{}.{}", self.namespace, self.name)
    }
}

/// A detached signature published alongside a collection version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureInfo {
    pub signature: String,
    #[serde(default)]
    pub pubkey_fingerprint: Option<String>,
}

/// All known versions of one collection in one registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionDocument {
    pub namespace: String,
    pub name: String,
    #[serde(default)]
    pub versions: Vec<VersionMetadata>,
}

impl CollectionDocument {
    /// Union of dependency names across every version.
    pub fn dependency_names(&self) -> impl Iterator<Item = &str> {
        self.versions
            .iter()
            .flat_map(|v| v.dependencies.keys().map(String::as_str))
    }
}
