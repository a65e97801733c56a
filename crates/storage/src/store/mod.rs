#![forbid(unsafe_code)]

mod checklist_items;
mod checklists;
mod edges;
mod error;
mod graphs;
mod images;
mod nodes;
mod notes;
mod ownership;
mod requests;
mod schema;
mod soft_delete;
mod support;
mod sync;
mod users;

pub use error::StoreError;
pub use requests::*;
pub use support::LIVE;

use ng_core::clock;
use ng_core::ids::{RowKey, UserId};
use ng_core::kind::EntityKind;
use rusqlite::types::Value as SqlValue;
use rusqlite::Connection;
use rusqlite::ffi::{SQLITE_CONSTRAINT_PRIMARYKEY, SQLITE_CONSTRAINT_UNIQUE};
use std::path::{Path, PathBuf};
use std::time::Duration;

use ownership::*;
use soft_delete::*;
use support::*;

pub const DB_FILE_NAME: &str = "notegraph.db";

#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
    storage_dir: PathBuf,
    /// Lowest `updated_at`/`deleted_at` a write may still receive: one past
    /// the newest `serverTimestamp` this handle has returned.
    stamp_floor_ms: i64,
}

impl SqliteStore {
    pub fn open(storage_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let storage_dir = storage_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&storage_dir)?;

        let db_path = storage_dir.join(DB_FILE_NAME);
        let conn = Connection::open(db_path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch(
            "PRAGMA foreign_keys = ON; PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL;",
        )?;

        schema::preflight_gate(&conn)?;
        schema::install_schema(&conn)?;

        tracing::debug!(dir = %storage_dir.display(), "sqlite store opened");
        Ok(Self {
            conn,
            storage_dir,
            stamp_floor_ms: i64::MIN,
        })
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    /// Wall-clock time, lifted past every cutoff already handed out. Sample
    /// it while holding exclusive access to the store so the value cannot go
    /// stale against a concurrent sync.
    pub fn now_ms(&self) -> i64 {
        self.stamp(clock::now_ms())
    }

    fn stamp(&self, requested_ms: i64) -> i64 {
        requested_ms.max(self.stamp_floor_ms)
    }

    fn raise_stamp_floor(&mut self, cutoff_ms: i64) {
        self.stamp_floor_ms = self.stamp_floor_ms.max(cutoff_ms.saturating_add(1));
    }
}

fn map_insert_conflict(err: rusqlite::Error) -> StoreError {
    if is_constraint_violation(&err) {
        return StoreError::AlreadyExists;
    }
    StoreError::Sql(err)
}

/// Only key collisions. Foreign key, NOT NULL and CHECK failures stay
/// `StoreError::Sql`.
fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(code, _) => matches!(
            code.extended_code,
            SQLITE_CONSTRAINT_UNIQUE | SQLITE_CONSTRAINT_PRIMARYKEY
        ),
        _ => false,
    }
}

fn key_value(key: &RowKey) -> SqlValue {
    match key {
        RowKey::Int(value) => SqlValue::Integer(*value),
        RowKey::Text(value) => SqlValue::Text(value.clone()),
    }
}

fn to_sqlite_i64(value: usize) -> Result<i64, StoreError> {
    i64::try_from(value).map_err(|_| StoreError::InvalidInput("numeric overflow"))
}

fn require_text(value: &str, message: &'static str) -> Result<(), StoreError> {
    if value.trim().is_empty() {
        return Err(StoreError::InvalidInput(message));
    }
    Ok(())
}
