#![forbid(unsafe_code)]

use super::users::ensure_user_tx;
use super::*;
use ng_core::model::NoteRow;
use rusqlite::params;

impl SqliteStore {
    pub fn create_note(&mut self, request: CreateNoteRequest) -> Result<NoteRow, StoreError> {
        let now_ms = self.stamp(request.now_ms);
        require_text(&request.content, "content is required")?;

        let tx = self.conn.transaction()?;
        ensure_user_tx(&tx, request.user_id)?;
        tx.execute(
            "INSERT INTO notes(user_id, title, content, tags, image_url, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, NULL, ?5, ?5)",
            params![
                request.user_id.get(),
                request.title,
                request.content,
                request.tags,
                now_ms,
            ],
        )
        .map_err(map_insert_conflict)?;
        let note = require_live_tx(&tx, SqlValue::Integer(tx.last_insert_rowid()))?;
        tx.commit()?;
        Ok(note)
    }

    /// Most recently touched first.
    pub fn list_notes(&self, user: UserId) -> Result<Vec<NoteRow>, StoreError> {
        list_live_tx(
            &self.conn,
            "user_id=?1",
            vec![SqlValue::Integer(user.get())],
            "updated_at DESC, id DESC",
        )
    }

    pub fn get_note(&self, user: UserId, note_id: i64) -> Result<NoteRow, StoreError> {
        ensure_owned_tx(&self.conn, EntityKind::Notes, &RowKey::Int(note_id), user)?;
        require_live_tx(&self.conn, SqlValue::Integer(note_id))
    }

    pub fn update_note(&mut self, request: UpdateNoteRequest) -> Result<NoteRow, StoreError> {
        let now_ms = self.stamp(request.now_ms);
        let key = RowKey::Int(request.note_id);
        let tx = self.conn.transaction()?;
        ensure_owned_tx(&tx, EntityKind::Notes, &key, request.user_id)?;

        let mut assignments = Assignments::new();
        assignments.set_opt("title", request.title);
        assignments.set_opt("content", request.content);
        assignments.set_opt("tags", request.tags);
        assignments.set_opt("image_url", request.image_url);
        assignments.apply(&tx, EntityKind::Notes, key_value(&key), now_ms)?;

        let note = require_live_tx(&tx, key_value(&key))?;
        tx.commit()?;
        Ok(note)
    }

    pub fn delete_note(
        &mut self,
        user: UserId,
        note_id: i64,
        now_ms: i64,
    ) -> Result<(), StoreError> {
        let now_ms = self.stamp(now_ms);
        delete_owned(
            &mut self.conn,
            EntityKind::Notes,
            RowKey::Int(note_id),
            user,
            now_ms,
        )
    }
}
