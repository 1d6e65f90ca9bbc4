//! SQLite persistence for the entity store.

/// SQLite-backed [`crate::core::contract::EntityQuery`] / [`crate::core::contract::EntityWriter`].
pub mod sqlite;
