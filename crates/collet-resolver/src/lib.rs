//! Dependency resolution engine.
//!
//! The core ([`resolver`], [`structs`], [`provider`], [`reporter`]) is a
//! generic backtracking solver that knows nothing about registries: it picks
//! one candidate per identifier through a caller-supplied [`Provider`].
//! [`collection`] is the provider for collections, built over registry
//! metadata sources.

pub mod collection;
pub mod error;
pub mod graph;
pub mod provider;
pub mod reporter;
pub mod resolver;
pub mod structs;

pub use error::ResolutionError;
pub use provider::Provider;
pub use reporter::{NullReporter, Reporter, TracingReporter};
pub use resolver::{resolve, Resolution, Resolver, DEFAULT_MAX_ROUNDS};
pub use structs::{Criterion, RequirementInformation, State};
