//! Entity store contracts and the in-memory store.

/// Query/writer traits, scope filter and store errors.
pub mod contract;
/// Helper index aliases.
pub mod indices;
/// Authoritative in-memory entity store.
pub mod store;
