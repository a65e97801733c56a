#![forbid(unsafe_code)]

use super::super::StoreError;
use super::live::LIVE;
use ng_core::kind::EntityKind;
use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, params_from_iter};

/// `updated_at` never moves backwards and never repeats, even when two
/// writes land in the same millisecond.
pub(in crate::store) const TOUCH: &str = "updated_at=MAX(?, updated_at+1)";

/// Field assignments of one partial update. The statement always touches
/// `updated_at`, so an empty patch still marks the row as changed.
#[derive(Debug, Default)]
pub(in crate::store) struct Assignments {
    sets: Vec<&'static str>,
    params: Vec<SqlValue>,
}

impl Assignments {
    pub(in crate::store) fn new() -> Self {
        Self::default()
    }

    pub(in crate::store) fn set(&mut self, column: &'static str, value: impl Into<SqlValue>) {
        self.sets.push(column);
        self.params.push(value.into());
    }

    pub(in crate::store) fn set_opt(
        &mut self,
        column: &'static str,
        value: Option<impl Into<SqlValue>>,
    ) {
        if let Some(value) = value {
            self.set(column, value);
        }
    }

    pub(in crate::store) fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Applies the assignments to one live row. Returns the number of rows
    /// written (0 when the row is missing or tombstoned).
    pub(in crate::store) fn apply(
        self,
        conn: &Connection,
        kind: EntityKind,
        key: SqlValue,
        now_ms: i64,
    ) -> Result<usize, StoreError> {
        let mut sql = format!("UPDATE {} SET ", kind.table());
        for column in &self.sets {
            sql.push_str(column);
            sql.push_str("=?, ");
        }
        sql.push_str(TOUCH);
        sql.push_str(" WHERE id=? AND ");
        sql.push_str(LIVE);

        let mut params = self.params;
        params.push(SqlValue::Integer(now_ms));
        params.push(key);
        Ok(conn.execute(&sql, params_from_iter(params))?)
    }
}
