//! Resolution state: requirement provenance, per-identifier criteria, and
//! the snapshot a round works on.

use std::collections::BTreeMap;

/// A requirement together with the candidate whose dependency list produced
/// it. `parent` is `None` for root requirements.
///
/// Only used to explain conflicts; never consulted for satisfiability.
#[derive(Debug, Clone, PartialEq)]
pub struct RequirementInformation<R, C> {
    pub requirement: R,
    pub parent: Option<C>,
}

impl<R, C> RequirementInformation<R, C> {
    pub fn root(requirement: R) -> Self {
        Self {
            requirement,
            parent: None,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Everything currently known about one identifier: who asks for it, which
/// candidates still satisfy all of them, and which were ruled out on this
/// branch.
#[derive(Debug, Clone)]
pub struct Criterion<R, C> {
    pub(crate) information: Vec<RequirementInformation<R, C>>,
    pub(crate) candidates: Vec<C>,
    pub(crate) incompatibilities: Vec<C>,
}

impl<R, C> Criterion<R, C> {
    pub fn information(&self) -> &[RequirementInformation<R, C>] {
        &self.information
    }

    /// Viable candidates, most preferred first. Never empty in a live state.
    pub fn candidates(&self) -> &[C] {
        &self.candidates
    }

    pub fn incompatibilities(&self) -> &[C] {
        &self.incompatibilities
    }

    pub fn requirements(&self) -> impl Iterator<Item = &R> {
        self.information.iter().map(|i| &i.requirement)
    }
}

/// One snapshot of the resolution: decisions made so far and the criteria
/// of every identifier touched so far, pinned or not.
#[derive(Debug, Clone)]
pub struct State<I, R, C> {
    pub mapping: BTreeMap<I, C>,
    pub criteria: BTreeMap<I, Criterion<R, C>>,
    /// Causes of the most recent backtrack, fed to preference ordering.
    pub backtrack_causes: Vec<RequirementInformation<R, C>>,
}

impl<I: Ord, R, C> State<I, R, C> {
    pub fn new() -> Self {
        Self {
            mapping: BTreeMap::new(),
            criteria: BTreeMap::new(),
            backtrack_causes: Vec::new(),
        }
    }

    /// Identifiers that have a criterion but no pinned candidate yet.
    pub fn unpinned(&self) -> impl Iterator<Item = (&I, &Criterion<R, C>)> {
        self.criteria
            .iter()
            .filter(|(id, _)| !self.mapping.contains_key(*id))
    }
}

impl<I: Ord, R, C> Default for State<I, R, C> {
    fn default() -> Self {
        Self::new()
    }
}
