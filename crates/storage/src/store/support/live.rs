#![forbid(unsafe_code)]

use super::super::StoreError;
use super::rows::StoredRow;
use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, OptionalExtension, params_from_iter};

/// Predicate every live read appends. Tombstoned rows stay visible only to
/// the sync collector.
pub const LIVE: &str = "deleted_at IS NULL";

/// `SELECT <columns> FROM <table> WHERE <filter> AND deleted_at IS NULL`.
pub(in crate::store) fn live_select<R: StoredRow>(filter: &str) -> String {
    format!(
        "SELECT {} FROM {} WHERE ({filter}) AND {LIVE}",
        R::COLUMNS,
        R::KIND.table()
    )
}

pub(in crate::store) fn fetch_live_tx<R: StoredRow>(
    conn: &Connection,
    key: SqlValue,
) -> Result<Option<R>, StoreError> {
    let sql = live_select::<R>("id=?1");
    Ok(conn.query_row(&sql, [key], R::from_row).optional()?)
}

/// Like [`fetch_live_tx`] but a missing row is an error.
pub(in crate::store) fn require_live_tx<R: StoredRow>(
    conn: &Connection,
    key: SqlValue,
) -> Result<R, StoreError> {
    fetch_live_tx(conn, key)?.ok_or(StoreError::NotFound)
}

pub(in crate::store) fn list_live_tx<R: StoredRow>(
    conn: &Connection,
    filter: &str,
    params: Vec<SqlValue>,
    order_by: &str,
) -> Result<Vec<R>, StoreError> {
    let sql = format!("{} ORDER BY {order_by}", live_select::<R>(filter));
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params_from_iter(params))?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        out.push(R::from_row(row)?);
    }
    Ok(out)
}
