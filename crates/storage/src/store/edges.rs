#![forbid(unsafe_code)]

use super::graphs::owned_graph_tx;
use super::nodes::{ensure_client_id_free_tx, validate_client_id};
use super::*;
use ng_core::model::EdgeRow;
use rusqlite::params;

fn owned_edge_tx(
    conn: &Connection,
    user: UserId,
    graph_id: i64,
    edge_id: &str,
) -> Result<EdgeRow, StoreError> {
    owned_graph_tx(conn, user, graph_id)?;
    let edge: EdgeRow = require_live_tx(conn, SqlValue::Text(edge_id.to_string()))?;
    if edge.graph_id != graph_id {
        return Err(StoreError::NotFound);
    }
    Ok(edge)
}

/// Both endpoints must be live nodes of the edge's own graph.
fn ensure_endpoints_tx(
    conn: &Connection,
    graph_id: i64,
    source_node_id: &str,
    target_node_id: &str,
) -> Result<(), StoreError> {
    let expected = if source_node_id == target_node_id { 1 } else { 2 };
    let found = conn.query_row(
        "SELECT COUNT(DISTINCT id) FROM nodes \
         WHERE graph_id=?1 AND id IN (?2, ?3) AND deleted_at IS NULL",
        params![graph_id, source_node_id, target_node_id],
        |row| row.get::<_, i64>(0),
    )?;
    if found != expected {
        return Err(StoreError::InvalidInput(
            "source or target node not found in the specified graph",
        ));
    }
    Ok(())
}

impl SqliteStore {
    pub fn create_edge(&mut self, request: CreateEdgeRequest) -> Result<EdgeRow, StoreError> {
        let now_ms = self.stamp(request.now_ms);
        validate_client_id(&request.edge_id)?;

        let tx = self.conn.transaction()?;
        owned_graph_tx(&tx, request.user_id, request.graph_id)?;
        ensure_client_id_free_tx(&tx, EntityKind::Edges, request.graph_id, &request.edge_id)?;
        ensure_endpoints_tx(
            &tx,
            request.graph_id,
            &request.source_node_id,
            &request.target_node_id,
        )?;

        tx.execute(
            "INSERT INTO edges(id, graph_id, source_node_id, target_node_id, source_handle, \
             target_handle, marker_start, marker_end, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
            params![
                request.edge_id,
                request.graph_id,
                request.source_node_id,
                request.target_node_id,
                request.source_handle,
                request.target_handle,
                request.marker_start,
                request.marker_end,
                now_ms,
            ],
        )
        .map_err(map_insert_conflict)?;

        let edge = require_live_tx(&tx, SqlValue::Text(request.edge_id))?;
        tx.commit()?;
        Ok(edge)
    }

    pub fn list_edges(&self, user: UserId, graph_id: i64) -> Result<Vec<EdgeRow>, StoreError> {
        owned_graph_tx(&self.conn, user, graph_id)?;
        list_live_tx(
            &self.conn,
            "graph_id=?1",
            vec![SqlValue::Integer(graph_id)],
            "created_at ASC, id ASC",
        )
    }

    pub fn update_edge(&mut self, request: UpdateEdgeRequest) -> Result<EdgeRow, StoreError> {
        let now_ms = self.stamp(request.now_ms);
        let tx = self.conn.transaction()?;
        owned_edge_tx(&tx, request.user_id, request.graph_id, &request.edge_id)?;

        let mut assignments = Assignments::new();
        assignments.set_opt("marker_start", request.marker_start);
        assignments.set_opt("marker_end", request.marker_end);
        if assignments.is_empty() {
            tracing::debug!(edge = %request.edge_id, "edge update without fields; touching only");
        }

        let key = SqlValue::Text(request.edge_id);
        assignments.apply(&tx, EntityKind::Edges, key.clone(), now_ms)?;

        let edge = require_live_tx(&tx, key)?;
        tx.commit()?;
        Ok(edge)
    }

    pub fn delete_edge(
        &mut self,
        user: UserId,
        graph_id: i64,
        edge_id: &str,
        now_ms: i64,
    ) -> Result<(), StoreError> {
        let now_ms = self.stamp(now_ms);
        let tx = self.conn.transaction()?;
        owned_edge_tx(&tx, user, graph_id, edge_id)?;
        soft_delete_tx(&tx, EntityKind::Edges, &RowKey::from(edge_id), now_ms)?;
        tx.commit()?;
        Ok(())
    }
}
