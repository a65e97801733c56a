#![forbid(unsafe_code)]

use super::users::ensure_user_tx;
use super::*;
use ng_core::model::ChecklistRow;
use rusqlite::params;

pub(in crate::store) fn owned_checklist_tx(
    conn: &Connection,
    user: UserId,
    checklist_id: i64,
) -> Result<ChecklistRow, StoreError> {
    ensure_owned_tx(conn, EntityKind::Checklists, &RowKey::Int(checklist_id), user)?;
    require_live_tx(conn, SqlValue::Integer(checklist_id))
}

impl SqliteStore {
    pub fn create_checklist(
        &mut self,
        request: CreateChecklistRequest,
    ) -> Result<ChecklistRow, StoreError> {
        let now_ms = self.stamp(request.now_ms);
        require_text(&request.title, "title is required")?;

        let tx = self.conn.transaction()?;
        ensure_user_tx(&tx, request.user_id)?;
        tx.execute(
            "INSERT INTO checklists(user_id, title, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
            params![request.user_id.get(), request.title, now_ms],
        )
        .map_err(map_insert_conflict)?;
        let checklist = require_live_tx(&tx, SqlValue::Integer(tx.last_insert_rowid()))?;
        tx.commit()?;
        Ok(checklist)
    }

    /// Most recently touched first.
    pub fn list_checklists(&self, user: UserId) -> Result<Vec<ChecklistRow>, StoreError> {
        list_live_tx(
            &self.conn,
            "user_id=?1",
            vec![SqlValue::Integer(user.get())],
            "updated_at DESC, id DESC",
        )
    }

    pub fn get_checklist(
        &self,
        user: UserId,
        checklist_id: i64,
    ) -> Result<ChecklistRow, StoreError> {
        owned_checklist_tx(&self.conn, user, checklist_id)
    }

    pub fn update_checklist(
        &mut self,
        request: UpdateChecklistRequest,
    ) -> Result<ChecklistRow, StoreError> {
        let now_ms = self.stamp(request.now_ms);
        require_text(&request.title, "title is required")?;

        let tx = self.conn.transaction()?;
        owned_checklist_tx(&tx, request.user_id, request.checklist_id)?;

        let mut assignments = Assignments::new();
        assignments.set("title", request.title);
        let key = SqlValue::Integer(request.checklist_id);
        assignments.apply(&tx, EntityKind::Checklists, key.clone(), now_ms)?;

        let checklist = require_live_tx(&tx, key)?;
        tx.commit()?;
        Ok(checklist)
    }

    /// Tombstones the checklist and all of its items.
    pub fn delete_checklist(
        &mut self,
        user: UserId,
        checklist_id: i64,
        now_ms: i64,
    ) -> Result<(), StoreError> {
        let now_ms = self.stamp(now_ms);
        delete_owned(
            &mut self.conn,
            EntityKind::Checklists,
            RowKey::Int(checklist_id),
            user,
            now_ms,
        )
    }
}
