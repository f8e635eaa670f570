//! The capability set a caller supplies to drive the resolver.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::hash::Hash;

use crate::error::ResolutionError;
use crate::resolver::Resolution;
use crate::structs::{RequirementInformation, State};

/// Source of candidates and policy for a resolution.
///
/// The resolver never talks to a registry itself. Everything it knows about
/// the candidate universe comes through these calls, and every preference
/// (pre-releases, upgrades, pins, signatures) is decided here.
pub trait Provider {
    /// Normalized name of a resolvable unit; the key of every map.
    type Identifier: Clone + Ord + Hash + Debug;
    type Requirement: Clone + Debug;
    /// Equality must mean "the same concrete version from the same source".
    type Candidate: Clone + PartialEq + Debug;
    /// Sort key for choosing the next identifier; lower is resolved first.
    type Preference: Ord;
    type Error: std::error::Error + 'static;

    /// The identifier a requirement constrains. Must be stable for equal
    /// requirements.
    fn identify(&self, requirement: &Self::Requirement) -> Result<Self::Identifier, Self::Error>;

    /// Ordering key for unresolved identifiers. Identifiers with fewer
    /// candidates or that caused the last backtrack should sort first. Ties
    /// are broken by the identifier itself.
    fn get_preference(
        &self,
        identifier: &Self::Identifier,
        resolutions: &BTreeMap<Self::Identifier, Self::Candidate>,
        candidates: &[Self::Candidate],
        information: &[RequirementInformation<Self::Requirement, Self::Candidate>],
        backtrack_causes: &[RequirementInformation<Self::Requirement, Self::Candidate>],
    ) -> Self::Preference;

    /// Candidates for `identifier` satisfying every one of `requirements`,
    /// none of which appears in `incompatibilities`, most preferred first.
    fn find_matches(
        &self,
        identifier: &Self::Identifier,
        requirements: &[&Self::Requirement],
        incompatibilities: &[Self::Candidate],
    ) -> Result<Vec<Self::Candidate>, Self::Error>;

    /// Must agree with [`Provider::find_matches`]: nothing it returns for a
    /// requirement may fail this check.
    fn is_satisfied_by(&self, requirement: &Self::Requirement, candidate: &Self::Candidate) -> bool;

    /// The candidate's direct dependencies. May do I/O; a failure aborts the
    /// whole resolution.
    fn get_dependencies(
        &self,
        candidate: &Self::Candidate,
    ) -> Result<Vec<Self::Requirement>, Self::Error>;
}

pub type Id<P> = <P as Provider>::Identifier;
pub type Req<P> = <P as Provider>::Requirement;
pub type Cand<P> = <P as Provider>::Candidate;

/// [`RequirementInformation`] for a provider's types.
pub type Info<P> = RequirementInformation<Req<P>, Cand<P>>;

/// [`State`] for a provider's types.
pub type ProviderState<P> = State<Id<P>, Req<P>, Cand<P>>;

/// [`Resolution`] for a provider's types.
pub type ProviderResolution<P> = Resolution<Id<P>, Req<P>, Cand<P>>;

/// [`ResolutionError`] for a provider's types.
pub type ResolveError<P> = ResolutionError<Req<P>, Cand<P>, <P as Provider>::Error>;
