//! SQLite storage bootstrap and scoped session access.
//!
//! # Responsibility
//! - Own the process-wide session pool bound to one SQLite target.
//! - Hand out scoped sessions that are returned to the pool on every exit path.
//! - Ensure the list table exists before application data is touched.
//!
//! # Invariants
//! - Every pooled connection has `foreign_keys=ON` and a busy timeout.
//! - No session object is ever shared by two in-flight operations.

use thiserror::Error;

mod handle;
pub mod schema;

pub use handle::{PoolOptions, Session, StorageHandle};

pub type DbResult<T> = Result<T, DbError>;

/// Storage-level failure outside the list store's expected outcomes.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("session pool error: {0}")]
    Pool(#[from] r2d2::Error),
}
