//! List table definition.
//!
//! `AUTOINCREMENT` keeps SQLite from handing out the id of a deleted row
//! again, including the highest one.

use super::DbResult;
use rusqlite::Connection;

pub const LIST_TABLE: &str = "todo_lists";

const CREATE_LIST_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS todo_lists (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);";

const DROP_LIST_TABLE_SQL: &str = "DROP TABLE IF EXISTS todo_lists;";

/// Creates the list table when missing. Safe to call repeatedly.
pub fn create_schema(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(CREATE_LIST_TABLE_SQL)?;
    Ok(())
}

/// Drops all list rows together with the id sequence, then recreates the table.
pub fn reset_schema(conn: &mut Connection) -> DbResult<()> {
    let tx = conn.transaction()?;
    tx.execute_batch(DROP_LIST_TABLE_SQL)?;
    tx.execute_batch(CREATE_LIST_TABLE_SQL)?;
    tx.commit()?;
    Ok(())
}

/// Returns whether the list table is present.
pub fn list_table_exists(conn: &Connection) -> DbResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [LIST_TABLE],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
