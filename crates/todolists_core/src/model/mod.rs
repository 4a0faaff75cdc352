//! Domain model for the managed list collection.
//!
//! # Invariants
//! - Every list is identified by a store-assigned `ListId`.
//! - List names are unique across the whole collection.

pub mod todo_list;
