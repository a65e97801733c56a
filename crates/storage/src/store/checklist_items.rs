#![forbid(unsafe_code)]

use super::checklists::owned_checklist_tx;
use super::*;
use ng_core::model::ChecklistItemRow;
use rusqlite::params;

const ORDER_COLUMN: &str = "\"order\"";

fn owned_item_tx(
    conn: &Connection,
    user: UserId,
    checklist_id: i64,
    item_id: i64,
) -> Result<ChecklistItemRow, StoreError> {
    owned_checklist_tx(conn, user, checklist_id)?;
    let item: ChecklistItemRow = require_live_tx(conn, SqlValue::Integer(item_id))?;
    if item.checklist_id != checklist_id {
        return Err(StoreError::NotFound);
    }
    Ok(item)
}

/// One past the highest `order` among the live children of `parent`.
fn next_order_tx(
    conn: &Connection,
    checklist_id: i64,
    parent: Option<i64>,
) -> Result<i64, StoreError> {
    Ok(conn.query_row(
        "SELECT COALESCE(MAX(\"order\"), 0) + 1 FROM checklist_items \
         WHERE checklist_id=?1 AND parent_item_id IS ?2 AND deleted_at IS NULL",
        params![checklist_id, parent],
        |row| row.get::<_, i64>(0),
    )?)
}

fn validate_parent_tx(
    conn: &Connection,
    checklist_id: i64,
    parent_item_id: i64,
) -> Result<(), StoreError> {
    let parent: Option<ChecklistItemRow> =
        fetch_live_tx(conn, SqlValue::Integer(parent_item_id))?;
    match parent {
        Some(parent) if parent.checklist_id == checklist_id => Ok(()),
        _ => Err(StoreError::InvalidInput(
            "parent item must be a live item of the same checklist",
        )),
    }
}

/// True when `candidate` is `root` itself or sits anywhere beneath it.
fn within_subtree_tx(conn: &Connection, root: i64, candidate: i64) -> Result<bool, StoreError> {
    Ok(conn.query_row(
        "WITH RECURSIVE subtree(id) AS ( \
           SELECT ?1 \
           UNION \
           SELECT c.id FROM checklist_items c JOIN subtree s ON c.parent_item_id=s.id \
         ) \
         SELECT EXISTS(SELECT 1 FROM subtree WHERE id=?2)",
        params![root, candidate],
        |row| row.get::<_, bool>(0),
    )?)
}

fn ensure_valid_parent_tx(
    conn: &Connection,
    item: &ChecklistItemRow,
    parent: Option<i64>,
) -> Result<(), StoreError> {
    let Some(parent) = parent else {
        return Ok(());
    };
    validate_parent_tx(conn, item.checklist_id, parent)?;
    if within_subtree_tx(conn, item.id, parent)? {
        return Err(StoreError::InvalidInput(
            "item cannot be moved beneath itself or its descendants",
        ));
    }
    Ok(())
}

fn sibling_ids_tx(
    conn: &Connection,
    checklist_id: i64,
    parent: Option<i64>,
    excluding: i64,
) -> Result<Vec<i64>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT id FROM checklist_items \
         WHERE checklist_id=?1 AND parent_item_id IS ?2 AND id<>?3 AND deleted_at IS NULL \
         ORDER BY \"order\" ASC, id ASC",
    )?;
    let mut rows = stmt.query(params![checklist_id, parent, excluding])?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        out.push(row.get::<_, i64>(0)?);
    }
    Ok(out)
}

/// Gives `ids` the dense orders 1..=n. Only rows whose order actually
/// changes are written (and so touched).
fn renumber_tx(conn: &Connection, ids: &[i64], now_ms: i64) -> Result<usize, StoreError> {
    let mut stmt = conn.prepare(
        "UPDATE checklist_items SET \"order\"=?1, updated_at=MAX(?2, updated_at+1) \
         WHERE id=?3 AND \"order\"<>?1 AND deleted_at IS NULL",
    )?;
    let mut touched = 0;
    for (index, id) in ids.iter().enumerate() {
        let order = to_sqlite_i64(index + 1)?;
        touched += stmt.execute(params![order, now_ms, id])?;
    }
    Ok(touched)
}

impl SqliteStore {
    /// Appends a new item at the end of its sibling group.
    pub fn create_checklist_item(
        &mut self,
        request: CreateChecklistItemRequest,
    ) -> Result<ChecklistItemRow, StoreError> {
        let now_ms = self.stamp(request.now_ms);
        require_text(&request.content, "content is required")?;

        let tx = self.conn.transaction()?;
        owned_checklist_tx(&tx, request.user_id, request.checklist_id)?;
        if let Some(parent) = request.parent_item_id {
            validate_parent_tx(&tx, request.checklist_id, parent)?;
        }
        let order = next_order_tx(&tx, request.checklist_id, request.parent_item_id)?;

        tx.execute(
            "INSERT INTO checklist_items(checklist_id, parent_item_id, content, is_completed, \"order\", \
             image_url, created_at, updated_at) \
             VALUES (?1, ?2, ?3, 0, ?4, NULL, ?5, ?5)",
            params![
                request.checklist_id,
                request.parent_item_id,
                request.content,
                order,
                now_ms,
            ],
        )
        .map_err(map_insert_conflict)?;

        let item = require_live_tx(&tx, SqlValue::Integer(tx.last_insert_rowid()))?;
        tx.commit()?;
        Ok(item)
    }

    pub fn list_checklist_items(
        &self,
        user: UserId,
        checklist_id: i64,
    ) -> Result<Vec<ChecklistItemRow>, StoreError> {
        owned_checklist_tx(&self.conn, user, checklist_id)?;
        list_live_tx(
            &self.conn,
            "checklist_id=?1",
            vec![SqlValue::Integer(checklist_id)],
            "\"order\" ASC, id ASC",
        )
    }

    /// Field update. Re-parenting appends the item to its new sibling group
    /// and closes the gap it leaves behind.
    pub fn update_checklist_item(
        &mut self,
        request: UpdateChecklistItemRequest,
    ) -> Result<ChecklistItemRow, StoreError> {
        let now_ms = self.stamp(request.now_ms);
        if let Some(content) = request.content.as_deref() {
            require_text(content, "content must not be empty")?;
        }

        let tx = self.conn.transaction()?;
        let item = owned_item_tx(&tx, request.user_id, request.checklist_id, request.item_id)?;

        let mut assignments = Assignments::new();
        assignments.set_opt("content", request.content);
        assignments.set_opt("is_completed", request.is_completed);
        assignments.set_opt("image_url", request.image_url);

        let reparented = match request.parent_item_id {
            Some(parent) if parent != item.parent_item_id => {
                ensure_valid_parent_tx(&tx, &item, parent)?;
                let order = next_order_tx(&tx, item.checklist_id, parent)?;
                assignments.set("parent_item_id", parent);
                assignments.set(ORDER_COLUMN, order);
                true
            }
            _ => false,
        };

        let key = SqlValue::Integer(item.id);
        assignments.apply(&tx, EntityKind::ChecklistItems, key.clone(), now_ms)?;

        if reparented {
            let left_behind =
                sibling_ids_tx(&tx, item.checklist_id, item.parent_item_id, item.id)?;
            renumber_tx(&tx, &left_behind, now_ms)?;
        }

        let updated = require_live_tx(&tx, key)?;
        tx.commit()?;
        Ok(updated)
    }

    /// Places the item at `position` among the live children of the requested
    /// parent and renumbers that group densely. The group the item left, if
    /// any, is renumbered too.
    pub fn move_checklist_item(
        &mut self,
        request: MoveChecklistItemRequest,
    ) -> Result<ChecklistItemRow, StoreError> {
        let now_ms = self.stamp(request.now_ms);
        let tx = self.conn.transaction()?;
        let item = owned_item_tx(&tx, request.user_id, request.checklist_id, request.item_id)?;
        ensure_valid_parent_tx(&tx, &item, request.parent_item_id)?;

        let mut siblings =
            sibling_ids_tx(&tx, item.checklist_id, request.parent_item_id, item.id)?;
        let position = request.position.min(siblings.len());
        siblings.insert(position, item.id);

        let mut assignments = Assignments::new();
        assignments.set("parent_item_id", request.parent_item_id);
        assignments.set(ORDER_COLUMN, to_sqlite_i64(position + 1)?);
        let key = SqlValue::Integer(item.id);
        assignments.apply(&tx, EntityKind::ChecklistItems, key.clone(), now_ms)?;

        let mut touched = renumber_tx(&tx, &siblings, now_ms)?;
        if request.parent_item_id != item.parent_item_id {
            let left_behind =
                sibling_ids_tx(&tx, item.checklist_id, item.parent_item_id, item.id)?;
            touched += renumber_tx(&tx, &left_behind, now_ms)?;
        }
        tracing::debug!(item = item.id, position, touched, "checklist item moved");

        let moved = require_live_tx(&tx, key)?;
        tx.commit()?;
        Ok(moved)
    }

    /// Tombstones the item and every live item nested beneath it.
    pub fn delete_checklist_item(
        &mut self,
        user: UserId,
        checklist_id: i64,
        item_id: i64,
        now_ms: i64,
    ) -> Result<(), StoreError> {
        let now_ms = self.stamp(now_ms);
        let tx = self.conn.transaction()?;
        owned_item_tx(&tx, user, checklist_id, item_id)?;
        soft_delete_tx(&tx, EntityKind::ChecklistItems, &RowKey::Int(item_id), now_ms)?;
        tx.commit()?;
        Ok(())
    }
}
