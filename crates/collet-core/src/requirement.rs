//! What is wanted: a constraint on one collection.

use std::fmt;

use semver::Version;

use crate::candidate::Candidate;
use crate::name::CollectionName;
use crate::version::VersionSpec;

/// A constraint on a collection: accepted versions, optionally a fixed
/// registry, optionally a demand that the chosen version carries a signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Requirement {
    pub name: CollectionName,
    pub spec: VersionSpec,
    /// Registry name the collection must come from.
    pub source: Option<String>,
    /// Only signed candidates satisfy this requirement.
    pub signed: bool,
}

impl Requirement {
    pub fn new(name: CollectionName, spec: VersionSpec) -> Self {
        Self {
            name,
            spec,
            source: None,
            signed: false,
        }
    }

    /// Parse `namespace.name` or `namespace.name:<spec>`.
    pub fn parse(s: &str) -> miette::Result<Self> {
        let (name, spec) = match s.split_once(':') {
            Some((name, spec)) => (name, spec),
            None => (s, "*"),
        };
        let name = CollectionName::parse(name).map_err(requirement_error)?;
        let spec = VersionSpec::parse(spec).map_err(requirement_error)?;
        Ok(Self::new(name, spec))
    }

    /// A requirement pinning exactly this candidate's version and registry.
    pub fn pinning(candidate: &Candidate) -> Self {
        Self {
            name: candidate.name.clone(),
            spec: VersionSpec::exact(candidate.version.clone()),
            source: Some(candidate.source.clone()),
            signed: false,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_signed(mut self, signed: bool) -> Self {
        self.signed = signed;
        self
    }

    /// Whether `version` from `source` with the given signature state meets
    /// this requirement.
    pub fn accepts(&self, version: &Version, source: &str, signed: bool) -> bool {
        self.spec.matches(version)
            && self.source.as_deref().map_or(true, |s| s == source)
            && (!self.signed || signed)
    }

    /// Whether `candidate` meets this requirement.
    pub fn is_satisfied_by(&self, candidate: &Candidate) -> bool {
        candidate.name == self.name
            && self.accepts(&candidate.version, &candidate.source, candidate.is_signed())
    }
}

fn requirement_error(e: impl fmt::Display) -> collet_util::errors::CollectError {
    collet_util::errors::CollectError::Requirement {
        message: e.to_string(),
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.spec)?;
        if let Some(ref source) = self.source {
            write!(f, " from {source}")?;
        }
        if self.signed {
            f.write_str(" (signed)")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(version: &str, source: &str, signed: bool) -> Candidate {
        let mut c = Candidate::new(
            CollectionName::parse("ns.coll").unwrap(),
            crate::version::parse_version(version).unwrap(),
            source,
        );
        if signed {
            c.signatures.push("sig".to_string());
        }
        c
    }

    #[test]
    fn parse_with_and_without_spec() {
        let r = Requirement::parse("ns.coll").unwrap();
        assert!(r.spec.is_any());
        let r = Requirement::parse("NS.Coll:>=1.0.0,<2.0.0").unwrap();
        assert_eq!(r.name.to_string(), "ns.coll");
        assert_eq!(r.to_string(), "ns.coll:>=1.0.0,<2.0.0");
    }

    #[test]
    fn equal_requirements_hash_alike() {
        let mut seen = std::collections::HashSet::new();
        assert!(seen.insert(Requirement::parse("ns.coll:>=1.0.0,<2.0.0").unwrap()));
        assert!(!seen.insert(Requirement::parse("NS.coll:>=1,<2").unwrap()));
        assert!(seen.insert(Requirement::parse("ns.coll:>=1.0.0").unwrap()));
        assert!(seen.insert(Requirement::parse("ns.coll:>=1.0.0").unwrap().with_signed(true)));
    }

    #[test]
    fn parse_rejects_bad_name() {
        assert!(Requirement::parse("nonamespace:1.0.0").is_err());
    }

    #[test]
    fn source_and_signature_constraints() {
        let r = Requirement::parse("ns.coll:>=1")
            .unwrap()
            .with_source("galaxy")
            .with_signed(true);
        assert!(r.is_satisfied_by(&candidate("1.2.0", "galaxy", true)));
        assert!(!r.is_satisfied_by(&candidate("1.2.0", "galaxy", false)));
        assert!(!r.is_satisfied_by(&candidate("1.2.0", "mirror", true)));
        assert!(!r.is_satisfied_by(&candidate("0.9.0", "galaxy", true)));
    }

    #[test]
    fn pinning_requirement_matches_only_that_candidate() {
        let c = candidate("1.2.0", "galaxy", false);
        let r = Requirement::pinning(&c);
        assert!(r.is_satisfied_by(&c));
        assert!(!r.is_satisfied_by(&candidate("1.2.1", "galaxy", false)));
    }
}
