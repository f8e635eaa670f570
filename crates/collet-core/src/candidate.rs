//! What exists: one concrete, resolvable collection version.

use std::fmt;
use std::hash::{Hash, Hasher};

use semver::Version;

use crate::name::CollectionName;

/// One published version of a collection, as offered by one registry.
///
/// Two candidates are equal when name, version and source match; signature
/// and artifact details are carried along but do not affect identity. The
/// candidate's own dependencies are not embedded: the provider looks them up
/// on demand.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub name: CollectionName,
    pub version: Version,
    /// Name of the registry the candidate was discovered in.
    pub source: String,
    pub signatures: Vec<String>,
    pub sha256: Option<String>,
    pub download_url: Option<String>,
}

impl Candidate {
    pub fn new(name: CollectionName, version: Version, source: impl Into<String>) -> Self {
        Self {
            name,
            version,
            source: source.into(),
            signatures: Vec::new(),
            sha256: None,
            download_url: None,
        }
    }

    pub fn is_pre_release(&self) -> bool {
        !self.version.pre.is_empty()
    }

    pub fn is_signed(&self) -> bool {
        !self.signatures.is_empty()
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.version == other.version && self.source == other.source
    }
}

impl Eq for Candidate {}

impl Hash for Candidate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.version.hash(state);
        self.source.hash(state);
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(version: &str, source: &str) -> Candidate {
        Candidate::new(
            CollectionName::parse("ns.coll").unwrap(),
            Version::parse(version).unwrap(),
            source,
        )
    }

    #[test]
    fn identity_ignores_artifact_details() {
        let a = c("1.0.0", "galaxy");
        let mut b = c("1.0.0", "galaxy");
        b.signatures.push("sig".to_string());
        b.sha256 = Some("abc".to_string());
        assert_eq!(a, b);
        assert_ne!(a, c("1.0.0", "mirror"));
        assert_ne!(a, c("1.0.1", "galaxy"));
    }

    #[test]
    fn pre_release_flag() {
        assert!(c("2.0.0-rc.1", "galaxy").is_pre_release());
        assert!(!c("2.0.0", "galaxy").is_pre_release());
    }

    #[test]
    fn display() {
        assert_eq!(c("1.8.0", "galaxy").to_string(), "ns.coll:1.8.0");
    }
}
