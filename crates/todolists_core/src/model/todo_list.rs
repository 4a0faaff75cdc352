//! TodoList domain record.
//!
//! # Responsibility
//! - Define the identity + name pair persisted by the list store.
//!
//! # Invariants
//! - `id` is assigned by the store at creation and never changes.
//! - `id` is never reused for another list, even after deletion.
//! - `name` is unique among existing lists.

use serde::{Deserialize, Serialize};

/// Store-assigned surrogate key of a list.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type ListId = i64;

/// Canonical list record as read back from storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoList {
    /// Surrogate primary key.
    pub id: ListId,
    /// Unique display name.
    pub name: String,
}

impl TodoList {
    pub fn new(id: ListId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}
