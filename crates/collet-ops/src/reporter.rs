//! Terminal progress for a running resolution.

use indicatif::ProgressBar;

use collet_core::candidate::Candidate;
use collet_core::name::CollectionName;
use collet_core::requirement::Requirement;
use collet_resolver::{Reporter, RequirementInformation, State};

/// Drives a spinner from resolver events and logs them at debug level.
pub struct ProgressReporter {
    bar: ProgressBar,
    rounds: usize,
    backtracks: usize,
}

impl ProgressReporter {
    pub fn new(bar: ProgressBar) -> Self {
        Self {
            bar,
            rounds: 0,
            backtracks: 0,
        }
    }

    pub fn rounds(&self) -> usize {
        self.rounds
    }

    pub fn backtracks(&self) -> usize {
        self.backtracks
    }

    /// Clear the spinner; used when resolution stops with an error.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Reporter<CollectionName, Requirement, Candidate> for ProgressReporter {
    fn starting(&mut self) {
        self.bar.set_message("Resolving collections");
    }

    fn starting_round(&mut self, index: usize) {
        self.rounds = index + 1;
    }

    fn ending(&mut self, state: &State<CollectionName, Requirement, Candidate>) {
        tracing::debug!(
            "resolved {} collection(s) in {} round(s), {} backtrack(s)",
            state.mapping.len(),
            self.rounds,
            self.backtracks
        );
        self.bar.finish_and_clear();
    }

    fn adding_requirement(&mut self, information: &RequirementInformation<Requirement, Candidate>) {
        match &information.parent {
            Some(parent) => tracing::debug!("{parent} requires {}", information.requirement),
            None => tracing::debug!("root requires {}", information.requirement),
        }
    }

    fn resolving_conflicts(&mut self, causes: &[RequirementInformation<Requirement, Candidate>]) {
        self.backtracks += 1;
        if let Some(first) = causes.first() {
            let from_roots = causes.iter().filter(|c| c.is_root()).count();
            tracing::debug!(
                "conflict on {} ({} requirement(s), {from_roots} from the roots)",
                first.requirement.name,
                causes.len()
            );
        }
    }

    fn rejecting_candidate(&mut self, _identifier: &CollectionName, candidate: &Candidate) {
        tracing::debug!("rejected {candidate}");
    }

    fn pinning(&mut self, _identifier: &CollectionName, candidate: &Candidate) {
        self.bar.set_message(format!("Resolving {candidate}"));
        tracing::debug!("pinned {candidate} from {}", candidate.source);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use collet_core::version::parse_version;

    #[test]
    fn counts_rounds_and_conflicts() {
        let mut reporter = ProgressReporter::new(ProgressBar::hidden());
        let name = CollectionName::parse("ns.a").unwrap();
        let candidate = Candidate::new(name.clone(), parse_version("1.0.0").unwrap(), "galaxy");

        reporter.starting();
        reporter.starting_round(0);
        reporter.starting_round(1);
        reporter.pinning(&name, &candidate);
        reporter.resolving_conflicts(&[RequirementInformation::root(
            Requirement::parse("ns.a").unwrap(),
        )]);

        assert_eq!(reporter.rounds(), 2);
        assert_eq!(reporter.backtracks(), 1);
        reporter.finish();
    }
}
