//! Backtracking resolution.
//!
//! Each round picks the most preferred unpinned identifier and tries its
//! candidates in order. Pinning a candidate merges its dependencies into a
//! copy of the state; the first candidate that merges cleanly wins. When none
//! does, the most recent decision is undone, its candidate is marked
//! incompatible on that branch, and the search continues from there.
//!
//! States are kept as a stack of frames, one per decision, so that undoing
//! a decision is a pop and the previous state is never mutated in place.

use std::collections::BTreeMap;

use crate::error::ResolutionError;
use crate::graph::DependencyGraph;
use crate::provider::{Cand, Id, Info, Provider, ProviderResolution, ProviderState, Req, ResolveError};
use crate::reporter::Reporter;
use crate::structs::{Criterion, RequirementInformation, State};

/// Round limit used when none is configured.
pub const DEFAULT_MAX_ROUNDS: usize = 200_000;

/// A successful resolution: one candidate per reachable identifier, plus the
/// criteria that justified each choice.
#[derive(Debug, Clone)]
pub struct Resolution<I, R, C> {
    pub mapping: BTreeMap<I, C>,
    pub criteria: BTreeMap<I, Criterion<R, C>>,
}

impl<I: Ord + Clone, R, C: PartialEq + Clone> Resolution<I, R, C> {
    /// Dependency graph of the resolution. Root requirements hang off the
    /// root node; every other edge runs from the pinned parent to the
    /// identifier its dependency named.
    pub fn graph(&self) -> DependencyGraph<I, C> {
        let mut graph = DependencyGraph::new();
        for (id, candidate) in &self.mapping {
            graph.add_node(id.clone(), candidate.clone());
        }
        for (id, criterion) in &self.criteria {
            let Some(to) = graph.find(id) else {
                continue;
            };
            for info in &criterion.information {
                let from = match &info.parent {
                    None => Some(graph.root()),
                    Some(parent) => self
                        .mapping
                        .iter()
                        .find(|(_, pinned)| *pinned == parent)
                        .and_then(|(parent_id, _)| graph.find(parent_id)),
                };
                if let Some(from) = from {
                    graph.add_edge(from, to);
                }
            }
        }
        graph
    }
}

impl<I, R, C> From<State<I, R, C>> for Resolution<I, R, C> {
    fn from(state: State<I, R, C>) -> Self {
        Self {
            mapping: state.mapping,
            criteria: state.criteria,
        }
    }
}

/// One decision on the search path.
struct Frame<I, R, C> {
    state: State<I, R, C>,
    /// The pin that produced `state`; `None` for the root frame.
    decision: Option<(I, C)>,
    /// Candidates for the same identifier that failed before `decision`.
    rejected: Vec<C>,
}

enum Failure<P: Provider> {
    Conflict(Vec<Info<P>>),
    Provider(P::Error),
}

/// Drives a [`Provider`] to a complete, consistent set of pins.
pub struct Resolver<'p, P, Rep> {
    provider: &'p P,
    reporter: Rep,
    max_rounds: usize,
}

impl<'p, P, Rep> Resolver<'p, P, Rep>
where
    P: Provider,
    Rep: Reporter<Id<P>, Req<P>, Cand<P>>,
{
    pub fn new(provider: &'p P, reporter: Rep) -> Self {
        Self {
            provider,
            reporter,
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }

    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    pub fn reporter(&self) -> &Rep {
        &self.reporter
    }

    pub fn into_reporter(self) -> Rep {
        self.reporter
    }

    /// Resolve `requirements` to one candidate per reachable identifier.
    ///
    /// An empty requirement list resolves to an empty mapping. The same
    /// provider answers and requirements always give the same result.
    /// Only rounds that pin or backtrack count toward `max_rounds`.
    pub fn resolve(
        &mut self,
        requirements: impl IntoIterator<Item = Req<P>>,
    ) -> Result<ProviderResolution<P>, ResolveError<P>> {
        self.reporter.starting();

        let root = match self.initial_state(requirements) {
            Ok(state) => state,
            Err(Failure::Conflict(causes)) => {
                self.reporter.resolving_conflicts(&causes);
                return Err(ResolutionError::Impossible { causes });
            }
            Err(Failure::Provider(e)) => return Err(ResolutionError::Provider(e)),
        };

        let mut history: Vec<Frame<Id<P>, Req<P>, Cand<P>>> = Vec::new();
        let mut current = Frame {
            state: root,
            decision: None,
            rejected: Vec::new(),
        };

        let mut round = 0;
        loop {
            let Some(name) = self.next_identifier(&current.state) else {
                self.reporter.ending(&current.state);
                tracing::debug!(rounds = round, "resolution complete");
                return Ok(current.state.into());
            };
            if round >= self.max_rounds {
                return Err(ResolutionError::TooDeep {
                    rounds: self.max_rounds,
                });
            }
            self.reporter.starting_round(round);

            match self.attempt_to_pin(&current.state, &name) {
                Ok((state, candidate, rejected)) => {
                    let previous = std::mem::replace(
                        &mut current,
                        Frame {
                            state,
                            decision: Some((name, candidate)),
                            rejected,
                        },
                    );
                    history.push(previous);
                }
                Err(Failure::Conflict(causes)) => {
                    self.reporter.resolving_conflicts(&causes);
                    current = self.backtrack(current, &mut history, causes)?;
                }
                Err(Failure::Provider(e)) => return Err(ResolutionError::Provider(e)),
            }

            self.reporter.ending_round(round, &current.state);
            round += 1;
        }
    }

    fn initial_state(
        &mut self,
        requirements: impl IntoIterator<Item = Req<P>>,
    ) -> Result<ProviderState<P>, Failure<P>> {
        let mut state = State::new();
        for requirement in requirements {
            let info = RequirementInformation::root(requirement);
            self.reporter.adding_requirement(&info);
            self.merge(&mut state, info)?;
        }
        Ok(state)
    }

    /// The unpinned identifier with the lowest `(preference, identifier)`.
    fn next_identifier(&self, state: &ProviderState<P>) -> Option<Id<P>> {
        state
            .unpinned()
            .map(|(id, criterion)| {
                let preference = self.provider.get_preference(
                    id,
                    &state.mapping,
                    &criterion.candidates,
                    &criterion.information,
                    &state.backtrack_causes,
                );
                (preference, id)
            })
            .min()
            .map(|(_, id)| id.clone())
    }

    /// Try each candidate of `name` in order; return the first state that
    /// merges cleanly with the pin, the pinned candidate, and the candidates
    /// rejected before it.
    #[allow(clippy::type_complexity)]
    fn attempt_to_pin(
        &mut self,
        state: &ProviderState<P>,
        name: &Id<P>,
    ) -> Result<(ProviderState<P>, Cand<P>, Vec<Cand<P>>), Failure<P>> {
        let Some(criterion) = state.criteria.get(name) else {
            return Err(Failure::Conflict(Vec::new()));
        };

        let mut rejected = Vec::new();
        let mut causes = criterion.information.clone();
        for candidate in &criterion.candidates {
            match self.pin(state, name, candidate) {
                Ok(next) => {
                    self.reporter.pinning(name, candidate);
                    return Ok((next, candidate.clone(), rejected));
                }
                Err(Failure::Conflict(conflict)) => {
                    self.reporter.rejecting_candidate(name, candidate);
                    rejected.push(candidate.clone());
                    causes = conflict;
                }
                Err(e) => return Err(e),
            }
        }
        Err(Failure::Conflict(causes))
    }

    fn pin(
        &mut self,
        state: &ProviderState<P>,
        name: &Id<P>,
        candidate: &Cand<P>,
    ) -> Result<ProviderState<P>, Failure<P>> {
        let mut next = state.clone();
        next.mapping.insert(name.clone(), candidate.clone());

        let dependencies = self
            .provider
            .get_dependencies(candidate)
            .map_err(Failure::Provider)?;
        for requirement in dependencies {
            let info = RequirementInformation {
                requirement,
                parent: Some(candidate.clone()),
            };
            self.reporter.adding_requirement(&info);
            self.merge(&mut next, info)?;
        }
        Ok(next)
    }

    /// Add one requirement to the criterion of the identifier it names.
    ///
    /// Candidates only ever narrow: the new list is what the provider
    /// matches for all requirements, restricted to what was viable before.
    /// An empty list, or a list without the already pinned candidate, is a
    /// conflict carrying every requirement on that identifier.
    fn merge(&mut self, state: &mut ProviderState<P>, info: Info<P>) -> Result<(), Failure<P>> {
        let id = self
            .provider
            .identify(&info.requirement)
            .map_err(Failure::Provider)?;

        let criterion = {
            let existing = state.criteria.get(&id);
            let mut information = existing
                .map(|c| c.information.clone())
                .unwrap_or_default();
            information.push(info);
            let incompatibilities = existing
                .map(|c| c.incompatibilities.clone())
                .unwrap_or_default();

            let requirements: Vec<&Req<P>> = information.iter().map(|i| &i.requirement).collect();
            let mut candidates = self
                .provider
                .find_matches(&id, &requirements, &incompatibilities)
                .map_err(Failure::Provider)?;
            if let Some(existing) = existing {
                candidates.retain(|c| existing.candidates.contains(c));
            }

            if candidates.is_empty() {
                return Err(Failure::Conflict(information));
            }
            Criterion {
                information,
                candidates,
                incompatibilities,
            }
        };

        if let Some(pinned) = state.mapping.get(&id) {
            if !criterion.candidates.contains(pinned) {
                return Err(Failure::Conflict(criterion.information));
            }
        }

        state.criteria.insert(id, criterion);
        Ok(())
    }

    /// Undo decisions until one identifier still has an untried candidate.
    ///
    /// The undone candidate, and everything rejected before it, become
    /// incompatibilities of the restored state. Running out of decisions
    /// means no combination works.
    fn backtrack(
        &mut self,
        mut frame: Frame<Id<P>, Req<P>, Cand<P>>,
        history: &mut Vec<Frame<Id<P>, Req<P>, Cand<P>>>,
        causes: Vec<Info<P>>,
    ) -> Result<Frame<Id<P>, Req<P>, Cand<P>>, ResolveError<P>> {
        loop {
            let Some((name, candidate)) = frame.decision.take() else {
                return Err(ResolutionError::Impossible { causes });
            };
            let Some(base) = history.pop() else {
                return Err(ResolutionError::Impossible { causes });
            };

            let mut excluded = std::mem::take(&mut frame.rejected);
            excluded.push(candidate);
            tracing::trace!(?name, excluded = excluded.len(), "backtracking");

            match self
                .exclude(&base.state, &name, excluded, &causes)
                .map_err(ResolutionError::Provider)?
            {
                Some(state) => {
                    return Ok(Frame {
                        state,
                        decision: base.decision,
                        rejected: base.rejected,
                    });
                }
                None => frame = base,
            }
        }
    }

    /// `state` with `excluded` added to the incompatibilities of `name`, or
    /// `None` when that leaves `name` without candidates.
    fn exclude(
        &self,
        state: &ProviderState<P>,
        name: &Id<P>,
        excluded: Vec<Cand<P>>,
        causes: &[Info<P>],
    ) -> Result<Option<ProviderState<P>>, P::Error> {
        let Some(criterion) = state.criteria.get(name) else {
            return Ok(None);
        };

        let mut incompatibilities = criterion.incompatibilities.clone();
        for candidate in excluded {
            if !incompatibilities.contains(&candidate) {
                incompatibilities.push(candidate);
            }
        }

        let requirements: Vec<&Req<P>> = criterion.requirements().collect();
        let mut candidates =
            self.provider
                .find_matches(name, &requirements, &incompatibilities)?;
        candidates
            .retain(|c| criterion.candidates.contains(c) && !incompatibilities.contains(c));
        if candidates.is_empty() {
            return Ok(None);
        }

        let mut next = state.clone();
        next.criteria.insert(
            name.clone(),
            Criterion {
                information: criterion.information.clone(),
                candidates,
                incompatibilities,
            },
        );
        next.backtrack_causes = causes.to_vec();
        Ok(Some(next))
    }
}

/// Resolve `requirements` with a fresh [`Resolver`] and the default round
/// limit.
pub fn resolve<P, Rep>(
    provider: &P,
    reporter: Rep,
    requirements: impl IntoIterator<Item = Req<P>>,
) -> Result<ProviderResolution<P>, ResolveError<P>>
where
    P: Provider,
    Rep: Reporter<Id<P>, Req<P>, Cand<P>>,
{
    Resolver::new(provider, reporter).resolve(requirements)
}
