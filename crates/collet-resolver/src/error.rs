use thiserror::Error;

use crate::structs::RequirementInformation;

/// Why a resolution did not produce a mapping.
#[derive(Debug, Error)]
pub enum ResolutionError<R, C, E> {
    /// Every combination was tried. `causes` are the requirements on the
    /// identifier that could not be satisfied, each with the candidate (or
    /// root) that introduced it.
    #[error("no set of candidates satisfies all requirements ({} conflicting)", .causes.len())]
    Impossible {
        causes: Vec<RequirementInformation<R, C>>,
    },

    /// The round limit was reached before the search finished.
    #[error("resolution did not finish within {rounds} rounds")]
    TooDeep { rounds: usize },

    /// The provider failed; propagated as-is, never retried.
    #[error("provider failed: {0}")]
    Provider(#[source] E),
}

impl<R, C, E> ResolutionError<R, C, E> {
    pub fn causes(&self) -> &[RequirementInformation<R, C>] {
        match self {
            Self::Impossible { causes } => causes,
            _ => &[],
        }
    }

    pub fn is_impossible(&self) -> bool {
        matches!(self, Self::Impossible { .. })
    }
}
