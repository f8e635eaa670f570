//! Collection registry metadata: API wire types, HTTP download with retries,
//! the on-disk metadata cache, concurrent prefetch, and the synchronous
//! metadata sources the resolver reads from.

pub mod api;
pub mod cache;
pub mod metadata;
pub mod prefetch;
pub mod registry;
pub mod source;
