//! Progress hooks the resolver calls while it works.
//!
//! Hooks are observational only: a reporter sees the state but cannot change
//! the outcome, and every hook defaults to a no-op.

use std::fmt::Display;

use crate::structs::{RequirementInformation, State};

#[allow(unused_variables)]
pub trait Reporter<I, R, C> {
    /// Called once, before the root requirements are merged.
    fn starting(&mut self) {}

    fn starting_round(&mut self, index: usize) {}

    fn ending_round(&mut self, index: usize, state: &State<I, R, C>) {}

    /// Called once with the final state of a successful resolution.
    fn ending(&mut self, state: &State<I, R, C>) {}

    fn adding_requirement(&mut self, information: &RequirementInformation<R, C>) {}

    /// A pin failed or a root requirement could not be met; `causes` are the
    /// requirements that could not be satisfied together.
    fn resolving_conflicts(&mut self, causes: &[RequirementInformation<R, C>]) {}

    fn rejecting_candidate(&mut self, identifier: &I, candidate: &C) {}

    fn pinning(&mut self, identifier: &I, candidate: &C) {}
}

impl<I, R, C, T> Reporter<I, R, C> for &mut T
where
    T: Reporter<I, R, C> + ?Sized,
{
    fn starting(&mut self) {
        (**self).starting()
    }

    fn starting_round(&mut self, index: usize) {
        (**self).starting_round(index)
    }

    fn ending_round(&mut self, index: usize, state: &State<I, R, C>) {
        (**self).ending_round(index, state)
    }

    fn ending(&mut self, state: &State<I, R, C>) {
        (**self).ending(state)
    }

    fn adding_requirement(&mut self, information: &RequirementInformation<R, C>) {
        (**self).adding_requirement(information)
    }

    fn resolving_conflicts(&mut self, causes: &[RequirementInformation<R, C>]) {
        (**self).resolving_conflicts(causes)
    }

    fn rejecting_candidate(&mut self, identifier: &I, candidate: &C) {
        (**self).rejecting_candidate(identifier, candidate)
    }

    fn pinning(&mut self, identifier: &I, candidate: &C) {
        (**self).pinning(identifier, candidate)
    }
}

/// Ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl<I, R, C> Reporter<I, R, C> for NullReporter {}

/// Emits every event as a `tracing` debug event under the `collet::resolve`
/// target. Round boundaries go to trace level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl<I: Display, R: Display, C: Display> Reporter<I, R, C> for TracingReporter {
    fn starting(&mut self) {
        tracing::debug!(target: "collet::resolve", "starting resolution");
    }

    fn starting_round(&mut self, index: usize) {
        tracing::trace!(target: "collet::resolve", round = index, "starting round");
    }

    fn ending_round(&mut self, index: usize, state: &State<I, R, C>) {
        tracing::trace!(
            target: "collet::resolve",
            round = index,
            pinned = state.mapping.len(),
            known = state.criteria.len(),
            "ending round"
        );
    }

    fn ending(&mut self, state: &State<I, R, C>) {
        tracing::debug!(
            target: "collet::resolve",
            pinned = state.mapping.len(),
            "resolution finished"
        );
    }

    fn adding_requirement(&mut self, information: &RequirementInformation<R, C>) {
        match &information.parent {
            Some(parent) => tracing::debug!(
                target: "collet::resolve",
                "adding requirement {} (from {parent})",
                information.requirement
            ),
            None => tracing::debug!(
                target: "collet::resolve",
                "adding root requirement {}",
                information.requirement
            ),
        }
    }

    fn resolving_conflicts(&mut self, causes: &[RequirementInformation<R, C>]) {
        let causes: Vec<String> = causes.iter().map(|c| c.requirement.to_string()).collect();
        tracing::debug!(
            target: "collet::resolve",
            "conflict between {}",
            causes.join(", ")
        );
    }

    fn rejecting_candidate(&mut self, identifier: &I, candidate: &C) {
        tracing::debug!(target: "collet::resolve", "rejecting {candidate} for {identifier}");
    }

    fn pinning(&mut self, identifier: &I, candidate: &C) {
        tracing::debug!(target: "collet::resolve", "pinning {identifier} to {candidate}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counting {
        rounds: usize,
        pins: Vec<String>,
    }

    impl Reporter<String, String, String> for Counting {
        fn starting_round(&mut self, _index: usize) {
            self.rounds += 1;
        }

        fn pinning(&mut self, identifier: &String, candidate: &String) {
            self.pins.push(format!("{identifier}={candidate}"));
        }
    }

    #[test]
    fn mut_ref_forwards_to_inner() {
        let mut counting = Counting::default();
        {
            let mut by_ref = &mut counting;
            Reporter::<String, String, String>::starting_round(&mut by_ref, 0);
            by_ref.pinning(&"a".to_string(), &"1".to_string());
        }
        assert_eq!(counting.rounds, 1);
        assert_eq!(counting.pins, vec!["a=1".to_string()]);
    }

    #[test]
    fn default_hooks_are_noops() {
        let mut counting = Counting::default();
        let state: State<String, String, String> = State::new();
        counting.starting();
        counting.ending(&state);
        counting.rejecting_candidate(&"a".to_string(), &"1".to_string());
        assert_eq!(counting.rounds, 0);
        assert!(counting.pins.is_empty());
    }
}
