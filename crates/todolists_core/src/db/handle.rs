//! Storage handle: a session pool bound to one SQLite target.
//!
//! # Responsibility
//! - Open file or in-memory SQLite targets behind an `r2d2` pool.
//! - Configure connection pragmas required by core behavior.
//! - Track outstanding sessions so callers can verify release discipline.
//!
//! # Invariants
//! - A `Session` is returned to the pool when dropped, on success and error
//!   paths alike.
//! - In-memory targets use exactly one pooled connection; every SQLite
//!   `:memory:` connection is a separate database.

use super::schema::{create_schema, reset_schema};
use super::{DbError, DbResult};
use log::{error, info};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use std::fmt::{Debug, Formatter};
use std::ops::{Deref, DerefMut};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_MAX_SESSIONS: u32 = 10;
const DEFAULT_CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Pool sizing for file-backed targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolOptions {
    /// Maximum number of sessions checked out at the same time.
    pub max_sessions: u32,
    /// How long `acquire` waits for a free session before failing.
    pub connection_timeout: Duration,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            max_sessions: DEFAULT_MAX_SESSIONS,
            connection_timeout: DEFAULT_CONNECTION_TIMEOUT,
        }
    }
}

/// Explicitly constructed, cheaply cloneable handle to the list database.
///
/// Clones share one pool; construct a fresh handle per test for isolation.
#[derive(Clone)]
pub struct StorageHandle {
    shared: Arc<Shared>,
}

struct Shared {
    pool: Pool<SqliteConnectionManager>,
    outstanding: AtomicUsize,
    mode: &'static str,
}

impl StorageHandle {
    /// Opens a SQLite database file behind a session pool.
    ///
    /// # Side effects
    /// - Establishes the pool's connections eagerly.
    /// - Emits `db_open` logging events with duration and status.
    pub fn open(path: impl AsRef<Path>, options: PoolOptions) -> DbResult<Self> {
        let manager = SqliteConnectionManager::file(path).with_init(|conn| {
            conn.busy_timeout(BUSY_TIMEOUT)?;
            conn.execute_batch("PRAGMA foreign_keys = ON;")
        });
        let builder = Pool::builder()
            .max_size(options.max_sessions)
            .connection_timeout(options.connection_timeout);
        let handle = Self::build(builder, manager, "file")?;

        // Journal mode is a property of the database file; switch it once.
        handle.with_session(|conn| {
            conn.query_row("PRAGMA journal_mode = WAL;", [], |_| Ok(()))
                .map_err(DbError::from)
        })?;
        Ok(handle)
    }

    /// Opens a private in-memory database.
    ///
    /// The pool holds a single connection that is never recycled, so the
    /// database lives as long as the handle and sessions are serialized.
    pub fn open_in_memory() -> DbResult<Self> {
        let manager = SqliteConnectionManager::memory().with_init(|conn| {
            conn.busy_timeout(BUSY_TIMEOUT)?;
            conn.execute_batch("PRAGMA foreign_keys = ON;")
        });
        let builder = Pool::builder()
            .max_size(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connection_timeout(DEFAULT_CONNECTION_TIMEOUT);
        Self::build(builder, manager, "memory")
    }

    fn build(
        builder: r2d2::Builder<SqliteConnectionManager>,
        manager: SqliteConnectionManager,
        mode: &'static str,
    ) -> DbResult<Self> {
        let started_at = Instant::now();
        info!("event=db_open module=db status=start mode={mode}");

        match builder.build(manager) {
            Ok(pool) => {
                info!(
                    "event=db_open module=db status=ok mode={} max_sessions={} duration_ms={}",
                    mode,
                    pool.max_size(),
                    started_at.elapsed().as_millis()
                );
                Ok(Self {
                    shared: Arc::new(Shared {
                        pool,
                        outstanding: AtomicUsize::new(0),
                        mode,
                    }),
                })
            }
            Err(err) => {
                error!(
                    "event=db_open module=db status=error mode={} duration_ms={} error_code=db_open_failed error={}",
                    mode,
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err.into())
            }
        }
    }

    /// Checks a session out of the pool.
    ///
    /// Blocks up to the configured connection timeout when every session is
    /// in use.
    pub fn acquire(&self) -> DbResult<Session> {
        let conn = self.shared.pool.get()?;
        self.shared.outstanding.fetch_add(1, Ordering::SeqCst);
        Ok(Session {
            conn,
            _guard: OutstandingGuard {
                shared: Arc::clone(&self.shared),
            },
        })
    }

    /// Returns a session to the pool.
    ///
    /// Dropping a session has the same effect; this spells the pairing out.
    pub fn release(&self, session: Session) {
        drop(session);
    }

    /// Runs one unit of work on a freshly acquired session.
    ///
    /// The session is released before this returns, whatever `work` yields,
    /// and also while unwinding.
    pub fn with_session<T, E>(
        &self,
        work: impl FnOnce(&mut Connection) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<DbError>,
    {
        let mut session = self.acquire()?;
        let result = work(&mut session);
        self.release(session);
        result
    }

    /// Ensures the list table exists. Idempotent.
    pub fn create_schema(&self) -> DbResult<()> {
        self.with_session(|conn| create_schema(conn))?;
        info!(
            "event=schema_ready module=db status=ok mode={}",
            self.shared.mode
        );
        Ok(())
    }

    /// Drops every list row and restarts id assignment.
    ///
    /// Test and bootstrap use only.
    pub fn reset(&self) -> DbResult<()> {
        self.with_session(|conn| reset_schema(conn))?;
        info!("event=schema_reset module=db status=ok mode={}", self.shared.mode);
        Ok(())
    }

    /// Number of sessions currently checked out through this handle.
    pub fn outstanding_sessions(&self) -> usize {
        self.shared.outstanding.load(Ordering::SeqCst)
    }

    /// Upper bound of concurrently checked out sessions.
    pub fn max_sessions(&self) -> u32 {
        self.shared.pool.max_size()
    }
}

impl Debug for StorageHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageHandle")
            .field("mode", &self.shared.mode)
            .field("max_sessions", &self.max_sessions())
            .field("outstanding", &self.outstanding_sessions())
            .finish()
    }
}

/// Scoped unit-of-work handle against the list database.
///
/// Dereferences to a `rusqlite::Connection`.
pub struct Session {
    conn: PooledConnection<SqliteConnectionManager>,
    // Declared after `conn`: the connection is back in the pool before the
    // outstanding counter drops.
    _guard: OutstandingGuard,
}

struct OutstandingGuard {
    shared: Arc<Shared>,
}

impl Drop for OutstandingGuard {
    fn drop(&mut self) {
        self.shared.outstanding.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Deref for Session {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        &self.conn
    }
}

impl DerefMut for Session {
    fn deref_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }
}

#[cfg(test)]
mod tests {
    use super::{PoolOptions, StorageHandle};
    use crate::db::schema::list_table_exists;
    use crate::db::DbError;

    #[test]
    fn acquire_and_release_track_outstanding_sessions() {
        let handle = StorageHandle::open_in_memory().unwrap();
        assert_eq!(handle.outstanding_sessions(), 0);

        let session = handle.acquire().unwrap();
        assert_eq!(handle.outstanding_sessions(), 1);

        handle.release(session);
        assert_eq!(handle.outstanding_sessions(), 0);
    }

    #[test]
    fn with_session_releases_on_error() {
        let handle = StorageHandle::open_in_memory().unwrap();

        let result: Result<(), DbError> = handle.with_session(|conn| {
            conn.execute_batch("SELECT * FROM missing_table;")?;
            Ok(())
        });

        assert!(result.is_err());
        assert_eq!(handle.outstanding_sessions(), 0);
    }

    #[test]
    fn in_memory_database_survives_between_sessions() {
        let handle = StorageHandle::open_in_memory().unwrap();
        handle.create_schema().unwrap();

        let session = handle.acquire().unwrap();
        assert!(list_table_exists(&session).unwrap());
    }

    #[test]
    fn file_pool_respects_max_sessions() {
        let dir = tempfile::tempdir().unwrap();
        let options = PoolOptions {
            max_sessions: 3,
            ..PoolOptions::default()
        };
        let handle = StorageHandle::open(dir.path().join("pool.db"), options).unwrap();

        assert_eq!(handle.max_sessions(), 3);
        let first = handle.acquire().unwrap();
        let second = handle.acquire().unwrap();
        assert_eq!(handle.outstanding_sessions(), 2);
        drop(first);
        drop(second);
        assert_eq!(handle.outstanding_sessions(), 0);
    }
}
