//! Shared utilities for collet.
//!
//! This crate provides cross-cutting concerns used by all other collet crates:
//! error types, filesystem helpers, hashing, and terminal progress indicators.

pub mod errors;
pub mod fs;
pub mod hash;
pub mod progress;
