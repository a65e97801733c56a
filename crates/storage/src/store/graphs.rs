#![forbid(unsafe_code)]

use super::users::ensure_user_tx;
use super::*;
use ng_core::model::GraphRow;
use rusqlite::params;

/// Live graph owned by `user`, or `NotFound`.
pub(in crate::store) fn owned_graph_tx(
    conn: &Connection,
    user: UserId,
    graph_id: i64,
) -> Result<GraphRow, StoreError> {
    ensure_owned_tx(conn, EntityKind::Graphs, &RowKey::Int(graph_id), user)?;
    require_live_tx(conn, SqlValue::Integer(graph_id))
}

impl SqliteStore {
    pub fn create_graph(&mut self, request: CreateGraphRequest) -> Result<GraphRow, StoreError> {
        let now_ms = self.stamp(request.now_ms);
        require_text(&request.title, "title is required")?;

        let tx = self.conn.transaction()?;
        ensure_user_tx(&tx, request.user_id)?;
        tx.execute(
            "INSERT INTO graphs(user_id, title, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
            params![request.user_id.get(), request.title, now_ms],
        )
        .map_err(map_insert_conflict)?;
        let graph = require_live_tx(&tx, SqlValue::Integer(tx.last_insert_rowid()))?;
        tx.commit()?;
        Ok(graph)
    }

    pub fn list_graphs(&self, user: UserId) -> Result<Vec<GraphRow>, StoreError> {
        list_live_tx(
            &self.conn,
            "user_id=?1",
            vec![SqlValue::Integer(user.get())],
            "id ASC",
        )
    }

    pub fn get_graph(&self, user: UserId, graph_id: i64) -> Result<GraphRow, StoreError> {
        owned_graph_tx(&self.conn, user, graph_id)
    }

    pub fn update_graph(&mut self, request: UpdateGraphRequest) -> Result<GraphRow, StoreError> {
        let now_ms = self.stamp(request.now_ms);
        require_text(&request.title, "title is required")?;

        let tx = self.conn.transaction()?;
        owned_graph_tx(&tx, request.user_id, request.graph_id)?;

        let mut assignments = Assignments::new();
        assignments.set("title", request.title);
        assignments.apply(
            &tx,
            EntityKind::Graphs,
            SqlValue::Integer(request.graph_id),
            now_ms,
        )?;

        let graph = require_live_tx(&tx, SqlValue::Integer(request.graph_id))?;
        tx.commit()?;
        Ok(graph)
    }

    /// Tombstones the graph together with its nodes and edges.
    pub fn delete_graph(
        &mut self,
        user: UserId,
        graph_id: i64,
        now_ms: i64,
    ) -> Result<(), StoreError> {
        let now_ms = self.stamp(now_ms);
        delete_owned(
            &mut self.conn,
            EntityKind::Graphs,
            RowKey::Int(graph_id),
            user,
            now_ms,
        )
    }
}
