#![forbid(unsafe_code)]

use super::*;
use rusqlite::params;

/// Tombstones one row. Returns 0 when the row is absent or already
/// tombstoned, in which case nothing cascades.
pub(in crate::store) fn soft_delete_tx(
    conn: &Connection,
    kind: EntityKind,
    key: &RowKey,
    now_ms: i64,
) -> Result<usize, StoreError> {
    let sql = format!(
        "UPDATE {} SET deleted_at=?1, updated_at=MAX(?1, updated_at+1) WHERE id=?2 AND {LIVE}",
        kind.table()
    );
    let affected = conn.execute(&sql, params![now_ms, key_value(key)])?;
    if affected > 0 {
        let cascaded = cascade_tx(conn, kind, key, now_ms)?;
        tracing::debug!(%kind, %key, cascaded, "row tombstoned");
    }
    Ok(affected)
}

/// Tombstones the live dependants of a freshly tombstoned row with the same
/// `deleted_at`, since the storage-level cascade only fires on physical
/// removal.
fn cascade_tx(
    conn: &Connection,
    kind: EntityKind,
    key: &RowKey,
    now_ms: i64,
) -> Result<usize, StoreError> {
    let key = key_value(key);
    let cascaded = match kind {
        EntityKind::Graphs => {
            let nodes = conn.execute(
                "UPDATE nodes SET deleted_at=?1, updated_at=MAX(?1, updated_at+1) \
                 WHERE graph_id=?2 AND deleted_at IS NULL",
                params![now_ms, key],
            )?;
            let edges = conn.execute(
                "UPDATE edges SET deleted_at=?1, updated_at=MAX(?1, updated_at+1) \
                 WHERE graph_id=?2 AND deleted_at IS NULL",
                params![now_ms, key],
            )?;
            nodes + edges
        }
        EntityKind::Nodes => conn.execute(
            "UPDATE edges SET deleted_at=?1, updated_at=MAX(?1, updated_at+1) \
             WHERE (source_node_id=?2 OR target_node_id=?2) AND deleted_at IS NULL",
            params![now_ms, key],
        )?,
        EntityKind::Checklists => conn.execute(
            "UPDATE checklist_items SET deleted_at=?1, updated_at=MAX(?1, updated_at+1) \
             WHERE checklist_id=?2 AND deleted_at IS NULL",
            params![now_ms, key],
        )?,
        EntityKind::ChecklistItems => conn.execute(
            "WITH RECURSIVE descendants(id) AS ( \
               SELECT id FROM checklist_items WHERE parent_item_id=?2 \
               UNION \
               SELECT c.id FROM checklist_items c JOIN descendants d ON c.parent_item_id=d.id \
             ) \
             UPDATE checklist_items SET deleted_at=?1, updated_at=MAX(?1, updated_at+1) \
             WHERE id IN (SELECT id FROM descendants) AND deleted_at IS NULL",
            params![now_ms, key],
        )?,
        EntityKind::Edges | EntityKind::Notes | EntityKind::Images => 0,
    };
    Ok(cascaded)
}

impl SqliteStore {
    /// The only deletion path. The caller has already verified ownership.
    /// Returns how many rows the targeted row accounted for (0 or 1);
    /// cascaded dependants are not counted.
    pub fn soft_delete(
        &mut self,
        kind: EntityKind,
        key: &RowKey,
        now_ms: i64,
    ) -> Result<usize, StoreError> {
        let now_ms = self.stamp(now_ms);
        let tx = self.conn.transaction()?;
        let affected = soft_delete_tx(&tx, kind, key, now_ms)?;
        tx.commit()?;
        Ok(affected)
    }
}

/// Shared tail of every owner-checked delete.
pub(in crate::store) fn delete_owned(
    conn: &mut Connection,
    kind: EntityKind,
    key: RowKey,
    user: UserId,
    now_ms: i64,
) -> Result<(), StoreError> {
    let tx = conn.transaction()?;
    ensure_owned_tx(&tx, kind, &key, user)?;
    if soft_delete_tx(&tx, kind, &key, now_ms)? == 0 {
        return Err(StoreError::NotFound);
    }
    tx.commit()?;
    Ok(())
}
