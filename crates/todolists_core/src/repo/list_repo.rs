//! List repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/get/delete/count/page over the `todo_lists` table.
//! - Translate uniqueness violations and missing rows into semantic errors.
//!
//! # Invariants
//! - Every operation runs in its own scoped session, released before the
//!   operation returns on all paths.
//! - Mutations commit only on success; an early return rolls back.

use crate::db::{DbError, StorageHandle};
use crate::model::todo_list::{ListId, TodoList};
use log::debug;
use rusqlite::{ffi, params, OptionalExtension, Row};
use thiserror::Error;

const LIST_SELECT_SQL: &str = "SELECT id, name FROM todo_lists";

pub type RepoResult<T> = Result<T, RepoError>;

/// List store error: expected outcomes plus storage failures.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("list name must be unique: `{0}` already exists")]
    DuplicateName(String),
    #[error("list not found: {0}")]
    NotFound(ListId),
    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for list CRUD and paging.
///
/// Each method is an independent transaction.
pub trait ListRepository {
    /// Inserts a list and returns its assigned id.
    fn create(&self, name: &str) -> RepoResult<ListId>;
    /// Loads one list by id.
    fn get(&self, id: ListId) -> RepoResult<TodoList>;
    /// Deletes one list by id.
    fn delete(&self, id: ListId) -> RepoResult<()>;
    /// Total number of lists.
    fn count(&self) -> RepoResult<i64>;
    /// Lists in id order restricted to `[offset, offset + limit)`.
    fn page(&self, offset: i64, limit: i64) -> RepoResult<Vec<TodoList>>;
}

/// SQLite-backed list repository.
#[derive(Debug, Clone)]
pub struct SqliteListRepository {
    handle: StorageHandle,
}

impl SqliteListRepository {
    pub fn new(handle: StorageHandle) -> Self {
        Self { handle }
    }

    pub fn handle(&self) -> &StorageHandle {
        &self.handle
    }
}

impl ListRepository for SqliteListRepository {
    fn create(&self, name: &str) -> RepoResult<ListId> {
        self.handle.with_session(|conn| {
            let tx = conn.transaction()?;
            match tx.execute("INSERT INTO todo_lists (name) VALUES (?1);", [name]) {
                Ok(_) => {}
                Err(err) if is_unique_violation(&err) => {
                    debug!("event=list_create module=repo status=duplicate name={name:?}");
                    return Err(RepoError::DuplicateName(name.to_string()));
                }
                Err(err) => return Err(err.into()),
            }
            let id = tx.last_insert_rowid();
            tx.commit()?;

            debug!("event=list_create module=repo status=ok list_id={id}");
            Ok(id)
        })
    }

    fn get(&self, id: ListId) -> RepoResult<TodoList> {
        self.handle.with_session(|conn| {
            conn.query_row(
                &format!("{LIST_SELECT_SQL} WHERE id = ?1;"),
                [id],
                parse_list_row,
            )
            .optional()?
            .ok_or(RepoError::NotFound(id))
        })
    }

    fn delete(&self, id: ListId) -> RepoResult<()> {
        self.handle.with_session(|conn| {
            let tx = conn.transaction()?;
            let changed = tx.execute("DELETE FROM todo_lists WHERE id = ?1;", [id])?;
            if changed == 0 {
                debug!("event=list_delete module=repo status=not_found list_id={id}");
                return Err(RepoError::NotFound(id));
            }
            tx.commit()?;

            debug!("event=list_delete module=repo status=ok list_id={id}");
            Ok(())
        })
    }

    fn count(&self) -> RepoResult<i64> {
        self.handle.with_session(|conn| {
            let count: i64 =
                conn.query_row("SELECT COUNT(*) FROM todo_lists;", [], |row| row.get(0))?;
            Ok(count)
        })
    }

    fn page(&self, offset: i64, limit: i64) -> RepoResult<Vec<TodoList>> {
        if limit <= 0 {
            return Ok(Vec::new());
        }

        self.handle.with_session(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{LIST_SELECT_SQL} ORDER BY id ASC LIMIT ?1 OFFSET ?2;"
            ))?;
            let mut rows = stmt.query(params![limit, offset.max(0)])?;
            let mut lists = Vec::new();

            while let Some(row) = rows.next()? {
                lists.push(parse_list_row(row)?);
            }

            Ok(lists)
        })
    }
}

fn parse_list_row(row: &Row<'_>) -> rusqlite::Result<TodoList> {
    Ok(TodoList {
        id: row.get("id")?,
        name: row.get("name")?,
    })
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}
