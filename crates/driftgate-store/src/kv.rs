//! Scoped key-value storage
//!
//! One SQLite table holds every persisted map of the approval pipeline.
//! Writes are atomic per (scope, item) row; multi-row sequences are not
//! transactional (see the approval state machine for the ordering that
//! keeps them durable).
//!
//! Canonical layout:
//! - `("approvals", "")`: the ApprovalRecord map
//! - `("schema-update-pending", <endpoint-key>)`: staged candidate shapes
//! - `("rawBlocks", <endpoint-key>)`: cached notification payloads
//! - `("lastRunTimestamp", "")`: ISO timestamp of the last completed run

use crate::errors::{from_rusqlite, Result};
use rusqlite::{Connection, OptionalExtension};
use serde_json::Value;

/// Scope holding the single ApprovalRecord map
pub const SCOPE_APPROVALS: &str = "approvals";
/// Scope holding staged candidate shapes, one item per endpoint-key
pub const SCOPE_PENDING: &str = "schema-update-pending";
/// Scope holding cached notification payloads, one item per endpoint-key
pub const SCOPE_RAW_BLOCKS: &str = "rawBlocks";
/// Scope holding the last-run timestamp
pub const SCOPE_LAST_RUN: &str = "lastRunTimestamp";

/// Item name for single-value scopes
pub const ITEM_NONE: &str = "";

/// Scoped key-value repository over a SQLite connection
pub struct KvStore;

impl KvStore {
    /// Create the kv table if it does not exist yet
    pub fn ensure_schema(conn: &Connection) -> Result<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                scope TEXT NOT NULL,
                item TEXT NOT NULL,
                value TEXT NOT NULL,
                PRIMARY KEY (scope, item)
            )",
            [],
        )
        .map_err(from_rusqlite)?;
        Ok(())
    }

    /// Upsert one JSON value under (scope, item)
    pub fn put(conn: &Connection, scope: &str, item: &str, value: &Value) -> Result<()> {
        conn.execute(
            "INSERT INTO kv (scope, item, value) VALUES (?1, ?2, ?3)
             ON CONFLICT(scope, item) DO UPDATE SET value = excluded.value",
            rusqlite::params![scope, item, value],
        )
        .map_err(from_rusqlite)?;
        Ok(())
    }

    /// Read one JSON value under (scope, item)
    pub fn get(conn: &Connection, scope: &str, item: &str) -> Result<Option<Value>> {
        conn.query_row(
            "SELECT value FROM kv WHERE scope = ?1 AND item = ?2",
            rusqlite::params![scope, item],
            |row| row.get::<_, Value>(0),
        )
        .optional()
        .map_err(from_rusqlite)
    }

    /// Delete one row; deleting an absent row is a no-op
    pub fn delete(conn: &Connection, scope: &str, item: &str) -> Result<()> {
        conn.execute(
            "DELETE FROM kv WHERE scope = ?1 AND item = ?2",
            rusqlite::params![scope, item],
        )
        .map_err(from_rusqlite)?;
        Ok(())
    }

    /// List all (item, value) pairs in a scope, ordered by item
    pub fn list(conn: &Connection, scope: &str) -> Result<Vec<(String, Value)>> {
        let mut stmt = conn
            .prepare("SELECT item, value FROM kv WHERE scope = ?1 ORDER BY item")
            .map_err(from_rusqlite)?;

        let rows = stmt
            .query_map([scope], |row| {
                let item: String = row.get(0)?;
                let value: Value = row.get(1)?;
                Ok((item, value))
            })
            .map_err(from_rusqlite)?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row.map_err(from_rusqlite)?);
        }
        Ok(result)
    }
}
