//! RPC transport for the `TodoLists` service.
//!
//! # Responsibility
//! - Frame typed requests and replies as line-delimited JSON over TCP.
//! - Run decoded calls on a fixed-size worker pool.
//! - Provide a blocking client for manual testing and integration tests.
//!
//! # Invariants
//! - The transport never interprets list semantics; it only routes methods
//!   to `TodoListService` and encodes what it returns.
//! - Connectivity failures reach callers as `UNAVAILABLE` statuses.

pub mod client;
pub mod dispatch;
pub mod frame;
pub mod server;

pub use client::TodoListsClient;
pub use dispatch::Dispatcher;
pub use frame::{Method, RequestFrame, ResponseFrame};
pub use server::{serve, ServerHandle, ServerOptions};
