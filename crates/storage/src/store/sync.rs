#![forbid(unsafe_code)]

use super::users::ensure_user_tx;
use super::*;
use ng_core::kind::{KeyType, Ownership};
use ng_core::sync::{ChangeSet, DeletedKeys, SyncPayload, SyncUpdates, assemble};
use rusqlite::{TransactionBehavior, params};

/// Restricts `kind` to rows belonging to the user bound at `?1`. Parent
/// chains are followed through tombstoned parents too, so cascaded
/// tombstones stay reachable.
fn scope_clause(kind: EntityKind) -> String {
    match kind.ownership() {
        Ownership::Direct { column } => format!("{column}=?1"),
        Ownership::Parent { parent, column } => format!(
            "{column} IN (SELECT id FROM {} WHERE {})",
            parent.table(),
            scope_clause(parent)
        ),
    }
}

fn scan_updated<R: StoredRow>(
    conn: &Connection,
    user: UserId,
    bound: i64,
) -> Result<Vec<R>, StoreError> {
    let sql = format!(
        "SELECT {} FROM {} WHERE {} AND updated_at > ?2 AND {LIVE} \
         ORDER BY updated_at ASC, id ASC",
        R::COLUMNS,
        R::KIND.table(),
        scope_clause(R::KIND)
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params![user.get(), bound])?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        out.push(R::from_row(row)?);
    }
    Ok(out)
}

fn scan_deleted(
    conn: &Connection,
    kind: EntityKind,
    user: UserId,
    bound: i64,
) -> Result<DeletedKeys, StoreError> {
    let sql = format!(
        "SELECT id FROM {} WHERE {} AND deleted_at > ?2 ORDER BY deleted_at ASC, id ASC",
        kind.table(),
        scope_clause(kind)
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params![user.get(), bound])?;
    let mut keys = Vec::new();
    while let Some(row) = rows.next()? {
        let key = match kind.key_type() {
            KeyType::Integer => RowKey::Int(row.get(0)?),
            KeyType::Text => RowKey::Text(row.get(0)?),
        };
        keys.push(key);
    }
    Ok(DeletedKeys { kind, keys })
}

/// Partitions every syncable table into rows updated and rows tombstoned
/// after `bound`. A row that is tombstoned is never reported as updated.
pub(in crate::store) fn collect_changes_tx(
    conn: &Connection,
    user: UserId,
    bound: i64,
) -> Result<ChangeSet, StoreError> {
    let mut updated = SyncUpdates::default();
    let mut deleted = Vec::with_capacity(EntityKind::ALL.len());

    for kind in EntityKind::ALL {
        match kind {
            EntityKind::Graphs => updated.graphs = scan_updated(conn, user, bound)?,
            EntityKind::Nodes => updated.nodes = scan_updated(conn, user, bound)?,
            EntityKind::Edges => updated.edges = scan_updated(conn, user, bound)?,
            EntityKind::Notes => updated.notes = scan_updated(conn, user, bound)?,
            EntityKind::Checklists => updated.checklists = scan_updated(conn, user, bound)?,
            EntityKind::ChecklistItems => {
                updated.checklist_items = scan_updated(conn, user, bound)?
            }
            EntityKind::Images => updated.images = scan_updated(conn, user, bound)?,
        }
        deleted.push(scan_deleted(conn, kind, user, bound)?);
    }

    Ok(ChangeSet { updated, deleted })
}

impl SqliteStore {
    /// Everything the user's client needs to catch up from `cutoff`, read
    /// from one snapshot. Any failure aborts the whole call.
    pub fn collect_changes(
        &mut self,
        user: UserId,
        cutoff: ng_core::cutoff::Cutoff,
    ) -> Result<ChangeSet, StoreError> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Deferred)?;
        ensure_user_tx(&tx, user)?;
        let changes = collect_changes_tx(&tx, user, cutoff.exclusive_bound())?;
        tx.commit()?;
        Ok(changes)
    }

    /// Once the payload is built, no later write through this handle is
    /// stamped at or before its `serverTimestamp`, so chaining that value as
    /// the next cutoff cannot skip a row.
    pub fn sync_changes(&mut self, request: SyncRequest) -> Result<SyncPayload, StoreError> {
        let changes = self.collect_changes(request.user_id, request.cutoff)?;
        self.raise_stamp_floor(request.collection_start_ms);
        tracing::debug!(
            user = %request.user_id,
            initial = request.cutoff.is_initial(),
            updated = changes.updated.len(),
            deleted = changes.deleted_len(),
            "sync change set collected"
        );
        Ok(assemble(changes, request.collection_start_ms))
    }
}
