//! Core use-case services.
//!
//! # Responsibility
//! - Implement the `TodoLists` RPC methods on top of the list repository.
//! - Translate repository outcomes into typed replies or RPC statuses.

pub mod list_service;
