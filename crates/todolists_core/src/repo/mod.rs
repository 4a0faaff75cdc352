//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the list store contract consumed by the service layer.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - The list store is the only writer of list rows.
//! - Expected outcomes (`DuplicateName`, `NotFound`) are returned as error
//!   variants, distinct from storage failures.

pub mod list_repo;
