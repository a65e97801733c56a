#![forbid(unsafe_code)]

use super::users::ensure_user_tx;
use super::*;
use ng_core::model::ImageRow;
use rusqlite::params;

impl SqliteStore {
    /// Records an upload that is already on disk under `filepath`.
    pub fn create_image(&mut self, request: CreateImageRequest) -> Result<ImageRow, StoreError> {
        let now_ms = self.stamp(request.now_ms);
        require_text(&request.filepath, "filepath is required")?;
        if request.size < 0 {
            return Err(StoreError::InvalidInput("size must not be negative"));
        }

        let tx = self.conn.transaction()?;
        ensure_user_tx(&tx, request.uploaded_by)?;
        tx.execute(
            "INSERT INTO images(uploaded_by, filename, filepath, mimetype, size, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
            params![
                request.uploaded_by.get(),
                request.filename,
                request.filepath,
                request.mimetype,
                request.size,
                now_ms,
            ],
        )
        .map_err(map_insert_conflict)?;
        let image = require_live_tx(&tx, SqlValue::Integer(tx.last_insert_rowid()))?;
        tx.commit()?;
        Ok(image)
    }

    pub fn get_image(&self, user: UserId, image_id: i64) -> Result<ImageRow, StoreError> {
        ensure_owned_tx(&self.conn, EntityKind::Images, &RowKey::Int(image_id), user)?;
        require_live_tx(&self.conn, SqlValue::Integer(image_id))
    }

    /// Tombstones the record only; the stored file stays where it is.
    pub fn delete_image(
        &mut self,
        user: UserId,
        image_id: i64,
        now_ms: i64,
    ) -> Result<(), StoreError> {
        let now_ms = self.stamp(now_ms);
        delete_owned(
            &mut self.conn,
            EntityKind::Images,
            RowKey::Int(image_id),
            user,
            now_ms,
        )
    }
}
