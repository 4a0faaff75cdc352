//! Core domain logic for the TodoLists service.
//! This crate owns list persistence, pagination and RPC status translation;
//! transports only decode requests and encode what the service returns.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod pagination;
pub mod proto;
pub mod repo;
pub mod service;

pub use config::{ConfigError, ServiceConfig};
pub use db::{DbError, DbResult, PoolOptions, Session, StorageHandle};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::todo_list::{ListId, TodoList};
pub use pagination::{PageLimits, PageWindow};
pub use proto::status::{Code, Status};
pub use repo::list_repo::{ListRepository, RepoError, RepoResult, SqliteListRepository};
pub use service::list_service::TodoListService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
