#![forbid(unsafe_code)]

use super::graphs::owned_graph_tx;
use super::*;
use ng_core::ids::ClientId;
use ng_core::model::NodeRow;
use rusqlite::{OptionalExtension, params};

const DEFAULT_NODE_TYPE: &str = "bubble";

pub(in crate::store) fn validate_client_id(value: &str) -> Result<(), StoreError> {
    ClientId::try_new(value)
        .map(|_| ())
        .map_err(|err| StoreError::InvalidInput(err.message()))
}

/// Client ids are never reused. Only a live row of the caller's own graph
/// reports a conflict; a tombstoned or foreign holder is rejected without
/// revealing that the id is taken.
pub(in crate::store) fn ensure_client_id_free_tx(
    conn: &Connection,
    kind: EntityKind,
    graph_id: i64,
    id: &str,
) -> Result<(), StoreError> {
    let sql = format!(
        "SELECT graph_id, deleted_at IS NULL FROM {} WHERE id=?1",
        kind.table()
    );
    let holder = conn
        .query_row(&sql, params![id], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, bool>(1)?))
        })
        .optional()?;
    match holder {
        None => Ok(()),
        Some((holder_graph, true)) if holder_graph == graph_id => Err(StoreError::AlreadyExists),
        Some(_) => Err(StoreError::InvalidInput("id is not available")),
    }
}

/// Live node that sits in `graph_id`; the graph itself must be owned by
/// `user`.
fn owned_node_tx(
    conn: &Connection,
    user: UserId,
    graph_id: i64,
    node_id: &str,
) -> Result<NodeRow, StoreError> {
    owned_graph_tx(conn, user, graph_id)?;
    let node: NodeRow = require_live_tx(conn, SqlValue::Text(node_id.to_string()))?;
    if node.graph_id != graph_id {
        return Err(StoreError::NotFound);
    }
    Ok(node)
}

impl SqliteStore {
    pub fn create_node(&mut self, request: CreateNodeRequest) -> Result<NodeRow, StoreError> {
        let now_ms = self.stamp(request.now_ms);
        validate_client_id(&request.node_id)?;
        let node_type = request
            .node_type
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_NODE_TYPE.to_string());

        let tx = self.conn.transaction()?;
        owned_graph_tx(&tx, request.user_id, request.graph_id)?;
        ensure_client_id_free_tx(&tx, EntityKind::Nodes, request.graph_id, &request.node_id)?;

        tx.execute(
            "INSERT INTO nodes(id, graph_id, type, position_x, position_y, data_label, data_content, \
             image_url, style_width, style_height, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, NULL, ?8, ?9, ?10, ?10)",
            params![
                request.node_id,
                request.graph_id,
                node_type,
                request.position.x,
                request.position.y,
                request.data_label,
                request.data_content,
                request.style_width,
                request.style_height,
                now_ms,
            ],
        )
        .map_err(map_insert_conflict)?;

        let node = require_live_tx(&tx, SqlValue::Text(request.node_id))?;
        tx.commit()?;
        Ok(node)
    }

    pub fn list_nodes(&self, user: UserId, graph_id: i64) -> Result<Vec<NodeRow>, StoreError> {
        owned_graph_tx(&self.conn, user, graph_id)?;
        list_live_tx(
            &self.conn,
            "graph_id=?1",
            vec![SqlValue::Integer(graph_id)],
            "created_at ASC, id ASC",
        )
    }

    pub fn update_node(&mut self, request: UpdateNodeRequest) -> Result<NodeRow, StoreError> {
        let now_ms = self.stamp(request.now_ms);
        let tx = self.conn.transaction()?;
        owned_node_tx(&tx, request.user_id, request.graph_id, &request.node_id)?;

        let mut assignments = Assignments::new();
        if let Some(node_type) = request.node_type.filter(|value| !value.trim().is_empty()) {
            assignments.set("type", node_type);
        }
        if let Some(position) = request.position {
            assignments.set("position_x", position.x);
            assignments.set("position_y", position.y);
        }
        assignments.set_opt("data_label", request.data_label);
        assignments.set_opt("data_content", request.data_content);
        assignments.set_opt("image_url", request.image_url);
        assignments.set_opt("style_width", request.style_width);
        assignments.set_opt("style_height", request.style_height);

        let key = SqlValue::Text(request.node_id);
        assignments.apply(&tx, EntityKind::Nodes, key.clone(), now_ms)?;

        let node = require_live_tx(&tx, key)?;
        tx.commit()?;
        Ok(node)
    }

    /// Tombstones the node and every live edge touching it.
    pub fn delete_node(
        &mut self,
        user: UserId,
        graph_id: i64,
        node_id: &str,
        now_ms: i64,
    ) -> Result<(), StoreError> {
        let now_ms = self.stamp(now_ms);
        let tx = self.conn.transaction()?;
        owned_node_tx(&tx, user, graph_id, node_id)?;
        soft_delete_tx(&tx, EntityKind::Nodes, &RowKey::from(node_id), now_ms)?;
        tx.commit()?;
        Ok(())
    }
}
