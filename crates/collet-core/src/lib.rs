//! Core data types for collet.
//!
//! This crate defines the value types the resolver works with: collection
//! names, version specifiers, requirements and candidates, together with the
//! files a project keeps on disk (requirements file, lockfile) and the global
//! configuration.
//!
//! This crate is intentionally free of async code and network I/O.

/// File name of the project requirements file.
pub const REQUIREMENTS_FILE: &str = "collections.toml";

/// File name of the lockfile written next to the requirements file.
pub const LOCKFILE: &str = "collet.lock";

pub mod candidate;
pub mod config;
pub mod lockfile;
pub mod name;
pub mod requirement;
pub mod requirements_file;
pub mod version;
