#![forbid(unsafe_code)]

use super::*;
use ng_core::model::{UserCredentials, UserRow};
use rusqlite::{OptionalExtension, params};

const MAX_USERNAME_LEN: usize = 64;

fn user_exists_tx(conn: &Connection, user: UserId) -> Result<bool, StoreError> {
    Ok(conn
        .query_row(
            "SELECT 1 FROM users WHERE id=?1",
            params![user.get()],
            |row| row.get::<_, i64>(0),
        )
        .optional()?
        .is_some())
}

pub(in crate::store) fn ensure_user_tx(conn: &Connection, user: UserId) -> Result<(), StoreError> {
    if user_exists_tx(conn, user)? {
        Ok(())
    } else {
        Err(StoreError::UnknownUser)
    }
}

impl SqliteStore {
    /// Registers a user. The password must already be hashed.
    pub fn create_user(&mut self, request: CreateUserRequest) -> Result<UserRow, StoreError> {
        let username = request.username.trim();
        require_text(username, "username is required")?;
        if username.len() > MAX_USERNAME_LEN {
            return Err(StoreError::InvalidInput("username is too long"));
        }
        require_text(&request.password_hash, "password hash is required")?;

        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO users(username, password_hash, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
            params![username, request.password_hash, request.now_ms],
        )
        .map_err(map_insert_conflict)?;

        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id=?1");
        let user = tx.query_row(&sql, params![tx.last_insert_rowid()], user_from_row)?;
        tx.commit()?;
        Ok(user)
    }

    pub fn get_user(&self, user: UserId) -> Result<Option<UserRow>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id=?1");
        Ok(self
            .conn
            .query_row(&sql, params![user.get()], user_from_row)
            .optional()?)
    }

    pub fn find_user_credentials(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, StoreError> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, username, password_hash FROM users WHERE username=?1",
                params![username.trim()],
                |row| {
                    Ok(UserCredentials {
                        id: row.get(0)?,
                        username: row.get(1)?,
                        password_hash: row.get(2)?,
                    })
                },
            )
            .optional()?)
    }
}
