//! Provider for collections, backed by registry metadata sources.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use collet_core::candidate::Candidate;
use collet_core::config::ResolverConfig;
use collet_core::name::CollectionName;
use collet_core::requirement::Requirement;
use collet_core::version::{parse_version, VersionSpec};
use collet_registry::source::MetadataSource;
use collet_util::errors::CollectError;

use crate::error::ResolutionError;
use crate::provider::Provider;
use crate::resolver::Resolution;
use crate::structs::RequirementInformation;

/// Requirement provenance for collections.
pub type CollectionInformation = RequirementInformation<Requirement, Candidate>;

/// Successful resolution of collections.
pub type CollectionResolution = Resolution<CollectionName, Requirement, Candidate>;

/// Resolution error for collections.
pub type CollectionResolveError = ResolutionError<Requirement, Candidate, CollectError>;

/// Policy knobs for [`CollectionProvider`].
#[derive(Debug, Clone)]
pub struct ProviderOptions {
    /// Follow dependencies; when off, only root requirements are resolved.
    pub with_deps: bool,
    /// Offer pre-release versions even when no requirement names one.
    pub with_pre_releases: bool,
    /// Prefer the newest version over the preferred (locked) one.
    pub upgrade: bool,
    /// Drop candidates without a signature.
    pub include_signatures: bool,
    /// Candidates kept from a previous resolution, tried first unless
    /// upgrading.
    pub preferred_candidates: Vec<Candidate>,
}

impl Default for ProviderOptions {
    fn default() -> Self {
        Self {
            with_deps: true,
            with_pre_releases: false,
            upgrade: false,
            include_signatures: false,
            preferred_candidates: Vec::new(),
        }
    }
}

impl From<&ResolverConfig> for ProviderOptions {
    fn from(config: &ResolverConfig) -> Self {
        Self {
            with_deps: config.with_deps,
            with_pre_releases: config.pre_releases,
            upgrade: config.upgrade,
            include_signatures: config.signatures,
            preferred_candidates: Vec::new(),
        }
    }
}

#[derive(Debug)]
struct Entry {
    candidate: Candidate,
    dependencies: BTreeMap<String, String>,
}

/// Answers resolver queries from a list of metadata sources, consulted in
/// order. Versions found in several sources are distinct candidates.
pub struct CollectionProvider {
    sources: Vec<Box<dyn MetadataSource>>,
    options: ProviderOptions,
    universe: RefCell<BTreeMap<CollectionName, Rc<Vec<Entry>>>>,
    dependencies: RefCell<HashMap<Candidate, Vec<Requirement>>>,
}

impl CollectionProvider {
    pub fn new(sources: Vec<Box<dyn MetadataSource>>, options: ProviderOptions) -> Self {
        Self {
            sources,
            options,
            universe: RefCell::new(BTreeMap::new()),
            dependencies: RefCell::new(HashMap::new()),
        }
    }

    pub fn options(&self) -> &ProviderOptions {
        &self.options
    }

    /// Replace the policy and forget everything read from the sources.
    pub fn set_options(&mut self, options: ProviderOptions) {
        self.options = options;
        self.universe.get_mut().clear();
        self.dependencies.get_mut().clear();
    }

    /// Every candidate of `name` across all sources, in discovery order.
    /// Read once per name and memoized.
    fn universe(&self, name: &CollectionName) -> Result<Rc<Vec<Entry>>, CollectError> {
        if let Some(entries) = self.universe.borrow().get(name) {
            return Ok(Rc::clone(entries));
        }

        let mut entries: Vec<Entry> = Vec::new();
        for source in &self.sources {
            for meta in source.versions(name)? {
                let version = match parse_version(&meta.version) {
                    Ok(v) => v,
                    Err(e) => {
                        tracing::warn!(
                            "skipping {name} version `{}` from {}: {e}",
                            meta.version,
                            source.name()
                        );
                        continue;
                    }
                };
                let mut candidate = Candidate::new(name.clone(), version, source.name());
                if entries.iter().any(|e| e.candidate == candidate) {
                    continue;
                }
                candidate.signatures = meta.signatures.into_iter().map(|s| s.signature).collect();
                candidate.sha256 = meta.sha256;
                candidate.download_url = meta.download_url;
                entries.push(Entry {
                    candidate,
                    dependencies: meta.dependencies,
                });
            }
        }
        tracing::debug!("{name}: {} candidate(s)", entries.len());

        let entries = Rc::new(entries);
        self.universe
            .borrow_mut()
            .insert(name.clone(), Rc::clone(&entries));
        Ok(entries)
    }

    fn preferred_for(&self, name: &CollectionName) -> Option<&Candidate> {
        self.options
            .preferred_candidates
            .iter()
            .find(|c| &c.name == name)
    }
}

impl Provider for CollectionProvider {
    type Identifier = CollectionName;
    type Requirement = Requirement;
    type Candidate = Candidate;
    /// `(not a backtrack cause, not pinned to one version, candidate count)`
    type Preference = (bool, bool, usize);
    type Error = CollectError;

    fn identify(&self, requirement: &Requirement) -> Result<CollectionName, CollectError> {
        Ok(requirement.name.clone())
    }

    fn get_preference(
        &self,
        identifier: &CollectionName,
        _resolutions: &BTreeMap<CollectionName, Candidate>,
        candidates: &[Candidate],
        information: &[CollectionInformation],
        backtrack_causes: &[CollectionInformation],
    ) -> Self::Preference {
        let is_cause = backtrack_causes.iter().any(|cause| {
            &cause.requirement.name == identifier
                || cause.parent.as_ref().is_some_and(|p| &p.name == identifier)
        });
        let is_pinned = information.iter().any(|i| i.requirement.spec.is_pinned());
        (!is_cause, !is_pinned, candidates.len())
    }

    /// Newest first; equal versions keep the order their sources were
    /// listed in. Without `upgrade`, the preferred candidate moves to the
    /// front.
    fn find_matches(
        &self,
        identifier: &CollectionName,
        requirements: &[&Requirement],
        incompatibilities: &[Candidate],
    ) -> Result<Vec<Candidate>, CollectError> {
        let entries = self.universe(identifier)?;
        let preferred = self.preferred_for(identifier);
        let allow_pre_releases = self.options.with_pre_releases
            || requirements.iter().any(|r| r.spec.mentions_pre_release());

        let mut matches: Vec<Candidate> = entries
            .iter()
            .map(|e| &e.candidate)
            .filter(|c| !incompatibilities.contains(*c))
            .filter(|c| requirements.iter().all(|r| r.is_satisfied_by(c)))
            .filter(|c| allow_pre_releases || !c.is_pre_release() || preferred == Some(*c))
            .filter(|c| !self.options.include_signatures || c.is_signed())
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.version.cmp(&a.version));

        if !self.options.upgrade {
            if let Some(pos) = preferred.and_then(|p| matches.iter().position(|c| c == p)) {
                let candidate = matches.remove(pos);
                matches.insert(0, candidate);
            }
        }
        Ok(matches)
    }

    fn is_satisfied_by(&self, requirement: &Requirement, candidate: &Candidate) -> bool {
        requirement.is_satisfied_by(candidate)
    }

    fn get_dependencies(&self, candidate: &Candidate) -> Result<Vec<Requirement>, CollectError> {
        if !self.options.with_deps {
            return Ok(Vec::new());
        }
        if let Some(known) = self.dependencies.borrow().get(candidate) {
            return Ok(known.clone());
        }

        let entries = self.universe(&candidate.name)?;
        let entry = entries
            .iter()
            .find(|e| &e.candidate == candidate)
            .ok_or_else(|| CollectError::Metadata {
                message: format!("no metadata recorded for {candidate} from {}", candidate.source),
            })?;

        let requirements = entry
            .dependencies
            .iter()
            .map(|(name, spec)| {
                let name = CollectionName::parse(name).map_err(|e| CollectError::Metadata {
                    message: format!("{candidate} declares an invalid dependency: {e}"),
                })?;
                let spec = VersionSpec::parse(spec).map_err(|e| CollectError::Metadata {
                    message: format!("{candidate} declares an invalid range for {name}: {e}"),
                })?;
                Ok(Requirement::new(name, spec))
            })
            .collect::<Result<Vec<_>, CollectError>>()?;

        self.dependencies
            .borrow_mut()
            .insert(candidate.clone(), requirements.clone());
        Ok(requirements)
    }
}

/// One line per cause: the requirement, then who asked for it.
pub fn explain(causes: &[CollectionInformation]) -> String {
    causes
        .iter()
        .map(|cause| match &cause.parent {
            Some(parent) => format!("{} (required by {parent})", cause.requirement),
            None => format!("{} (required by the root requirements)", cause.requirement),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

impl From<CollectionResolveError> for CollectError {
    fn from(err: CollectionResolveError) -> Self {
        match err {
            ResolutionError::Impossible { causes } => CollectError::Resolution {
                message: format!("conflicting requirements:\n{}", explain(&causes)),
            },
            ResolutionError::TooDeep { rounds } => CollectError::Resolution {
                message: format!("gave up after {rounds} rounds"),
            },
            ResolutionError::Provider(e) => e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use collet_registry::source::MemoryIndex;

    fn name(s: &str) -> CollectionName {
        CollectionName::parse(s).unwrap()
    }

    fn provider(index: MemoryIndex, options: ProviderOptions) -> CollectionProvider {
        CollectionProvider::new(vec![Box::new(index)], options)
    }

    #[test]
    fn unparseable_versions_are_skipped() {
        let mut index = MemoryIndex::new("local");
        index.add("ns.a", "1.0.0", &[]).unwrap();
        index.add("ns.a", "not-a-version", &[]).unwrap();
        let p = provider(index, ProviderOptions::default());

        let req = Requirement::parse("ns.a").unwrap();
        let matches = p.find_matches(&name("ns.a"), &[&req], &[]).unwrap();
        assert_eq!(matches.len(), 1);
    }

    #[test]
    fn equal_versions_keep_source_order() {
        let mut first = MemoryIndex::new("first");
        first.add("ns.a", "1.0.0", &[]).unwrap();
        let mut second = MemoryIndex::new("second");
        second.add("ns.a", "1.0.0", &[]).unwrap();
        second.add("ns.a", "1.1.0", &[]).unwrap();
        let p = CollectionProvider::new(
            vec![Box::new(first), Box::new(second)],
            ProviderOptions::default(),
        );

        let req = Requirement::parse("ns.a").unwrap();
        let matches = p.find_matches(&name("ns.a"), &[&req], &[]).unwrap();
        let got: Vec<_> = matches
            .iter()
            .map(|c| format!("{}@{}", c.version, c.source))
            .collect();
        assert_eq!(got, vec!["1.1.0@second", "1.0.0@first", "1.0.0@second"]);
    }

    #[test]
    fn preference_orders_causes_then_pins_then_count() {
        let p = provider(MemoryIndex::new("local"), ProviderOptions::default());
        let a = name("ns.a");
        let pinned = RequirementInformation::root(Requirement::parse("ns.a:==1.0.0").unwrap());
        let loose = RequirementInformation::root(Requirement::parse("ns.a").unwrap());
        let none = BTreeMap::new();

        let plain = p.get_preference(&a, &none, &[], std::slice::from_ref(&loose), &[]);
        let exact = p.get_preference(&a, &none, &[], std::slice::from_ref(&pinned), &[]);
        let cause = p.get_preference(
            &a,
            &none,
            &[],
            std::slice::from_ref(&loose),
            std::slice::from_ref(&loose),
        );
        assert!(exact < plain);
        assert!(cause < exact);
    }

    #[test]
    fn invalid_dependency_is_a_metadata_error() {
        let mut index = MemoryIndex::new("local");
        index.add("ns.a", "1.0.0", &[("broken", "*")]).unwrap();
        let p = provider(index, ProviderOptions::default());

        let req = Requirement::parse("ns.a").unwrap();
        let candidate = p.find_matches(&name("ns.a"), &[&req], &[]).unwrap().remove(0);
        let err = p.get_dependencies(&candidate).unwrap_err();
        assert!(matches!(err, CollectError::Metadata { .. }));
    }

    #[test]
    fn explain_names_every_cause() {
        let parent = Candidate::new(name("ns.a"), parse_version("1.0.0").unwrap(), "local");
        let causes = vec![
            RequirementInformation::root(Requirement::parse("ns.b:>=2").unwrap()),
            RequirementInformation {
                requirement: Requirement::parse("ns.b:<2").unwrap(),
                parent: Some(parent),
            },
        ];
        assert_eq!(
            explain(&causes),
            "ns.b:>=2.0.0 (required by the root requirements)\nns.b:<2.0.0 (required by ns.a:1.0.0)"
        );
    }

    #[test]
    fn too_deep_maps_to_resolution_error() {
        let err: CollectError = CollectionResolveError::TooDeep { rounds: 5 }.into();
        assert!(err.to_string().contains("5 rounds"));
    }
}
