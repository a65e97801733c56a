#![forbid(unsafe_code)]

use super::*;
use ng_core::kind::Ownership;
use rusqlite::OptionalExtension;

/// Walks the descriptor chain of `kind` up to its directly owned ancestor.
/// Every hop must land on a live row; a missing or tombstoned link yields
/// `None`.
pub(in crate::store) fn resolve_owner_tx(
    conn: &Connection,
    kind: EntityKind,
    key: &RowKey,
) -> Result<Option<UserId>, StoreError> {
    let mut kind = kind;
    let mut key = key_value(key);

    for _ in 0..=EntityKind::ALL.len() {
        match kind.ownership() {
            Ownership::Direct { column } => {
                let sql = format!("SELECT {column} FROM {} WHERE id=?1 AND {LIVE}", kind.table());
                let owner = conn
                    .query_row(&sql, [key], |row| row.get::<_, Option<i64>>(0))
                    .optional()?
                    .flatten();
                return Ok(owner.map(UserId::new));
            }
            Ownership::Parent { parent, column } => {
                let sql = format!("SELECT {column} FROM {} WHERE id=?1 AND {LIVE}", kind.table());
                let parent_id = conn
                    .query_row(&sql, [key], |row| row.get::<_, i64>(0))
                    .optional()?;
                let Some(parent_id) = parent_id else {
                    return Ok(None);
                };
                kind = parent;
                key = SqlValue::Integer(parent_id);
            }
        }
    }

    Err(StoreError::InvalidInput("ownership chain does not terminate"))
}

/// Succeeds only when `user` owns the live row. Foreign rows are reported
/// exactly like missing ones.
pub(in crate::store) fn ensure_owned_tx(
    conn: &Connection,
    kind: EntityKind,
    key: &RowKey,
    user: UserId,
) -> Result<(), StoreError> {
    match resolve_owner_tx(conn, kind, key)? {
        Some(owner) if owner == user => Ok(()),
        _ => Err(StoreError::NotFound),
    }
}

impl SqliteStore {
    /// Owner of a live row, following parent references for tables without
    /// a user column of their own.
    pub fn resolve_owner(
        &self,
        kind: EntityKind,
        key: &RowKey,
    ) -> Result<Option<UserId>, StoreError> {
        resolve_owner_tx(&self.conn, kind, key)
    }
}
