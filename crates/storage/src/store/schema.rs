#![forbid(unsafe_code)]

use super::StoreError;
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::BTreeSet;

pub(super) const SCHEMA_VERSION: i64 = 1;

const REQUIRED_TABLES: [&str; 9] = [
    "store_state",
    "users",
    "graphs",
    "nodes",
    "edges",
    "notes",
    "checklists",
    "checklist_items",
    "images",
];

/// Refuses to open a database laid out by anything other than this schema
/// version. A fresh file passes.
pub(super) fn preflight_gate(conn: &Connection) -> Result<(), StoreError> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
    )?;
    let mut rows = stmt.query([])?;
    let mut tables = BTreeSet::new();
    while let Some(row) = rows.next()? {
        tables.insert(row.get::<_, String>(0)?);
    }

    if tables.is_empty() {
        return Ok(());
    }

    let required: BTreeSet<&str> = REQUIRED_TABLES.into_iter().collect();

    if tables
        .iter()
        .any(|table| !required.contains(table.as_str()))
    {
        return Err(StoreError::InvalidInput(
            "RESET_REQUIRED: unsupported tables detected",
        ));
    }

    for table in required {
        if !tables.contains(table) {
            return Err(StoreError::InvalidInput(
                "RESET_REQUIRED: required table is missing",
            ));
        }
    }

    let version = conn
        .query_row(
            "SELECT schema_version FROM store_state WHERE singleton=1",
            [],
            |row| row.get::<_, i64>(0),
        )
        .optional()?;

    match version {
        Some(v) if v == SCHEMA_VERSION => Ok(()),
        Some(_) => Err(StoreError::InvalidInput(
            "RESET_REQUIRED: schema version mismatch",
        )),
        None => Err(StoreError::InvalidInput(
            "RESET_REQUIRED: schema state row is missing",
        )),
    }
}

pub(super) fn install_schema(conn: &Connection) -> Result<(), StoreError> {
    let now_ms = ng_core::clock::now_ms();

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS store_state (
          singleton INTEGER PRIMARY KEY CHECK(singleton = 1),
          schema_version INTEGER NOT NULL,
          created_at INTEGER NOT NULL,
          updated_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS users (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          username TEXT NOT NULL UNIQUE,
          password_hash TEXT NOT NULL,
          created_at INTEGER NOT NULL,
          updated_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS graphs (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          user_id INTEGER NOT NULL,
          title TEXT NOT NULL,
          created_at INTEGER NOT NULL,
          updated_at INTEGER NOT NULL,
          deleted_at INTEGER,
          FOREIGN KEY(user_id) REFERENCES users(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_graphs_user_updated
          ON graphs(user_id, updated_at, id);
        CREATE INDEX IF NOT EXISTS idx_graphs_user_deleted
          ON graphs(user_id, deleted_at, id);

        CREATE TABLE IF NOT EXISTS nodes (
          id TEXT PRIMARY KEY,
          graph_id INTEGER NOT NULL,
          type TEXT NOT NULL DEFAULT 'bubble',
          position_x REAL NOT NULL,
          position_y REAL NOT NULL,
          data_label TEXT,
          data_content TEXT,
          image_url TEXT,
          style_width REAL,
          style_height REAL,
          created_at INTEGER NOT NULL,
          updated_at INTEGER NOT NULL,
          deleted_at INTEGER,
          FOREIGN KEY(graph_id) REFERENCES graphs(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_nodes_graph_updated
          ON nodes(graph_id, updated_at, id);

        CREATE TABLE IF NOT EXISTS edges (
          id TEXT PRIMARY KEY,
          graph_id INTEGER NOT NULL,
          source_node_id TEXT NOT NULL,
          target_node_id TEXT NOT NULL,
          source_handle TEXT,
          target_handle TEXT,
          marker_start TEXT,
          marker_end TEXT,
          created_at INTEGER NOT NULL,
          updated_at INTEGER NOT NULL,
          deleted_at INTEGER,
          FOREIGN KEY(graph_id) REFERENCES graphs(id) ON DELETE CASCADE,
          FOREIGN KEY(source_node_id) REFERENCES nodes(id) ON DELETE CASCADE,
          FOREIGN KEY(target_node_id) REFERENCES nodes(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_edges_graph_updated
          ON edges(graph_id, updated_at, id);
        CREATE INDEX IF NOT EXISTS idx_edges_source ON edges(source_node_id);
        CREATE INDEX IF NOT EXISTS idx_edges_target ON edges(target_node_id);

        CREATE TABLE IF NOT EXISTS notes (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          user_id INTEGER NOT NULL,
          title TEXT,
          content TEXT NOT NULL,
          tags TEXT,
          image_url TEXT,
          created_at INTEGER NOT NULL,
          updated_at INTEGER NOT NULL,
          deleted_at INTEGER,
          FOREIGN KEY(user_id) REFERENCES users(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_notes_user_updated
          ON notes(user_id, updated_at, id);

        CREATE TABLE IF NOT EXISTS checklists (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          user_id INTEGER NOT NULL,
          title TEXT NOT NULL,
          created_at INTEGER NOT NULL,
          updated_at INTEGER NOT NULL,
          deleted_at INTEGER,
          FOREIGN KEY(user_id) REFERENCES users(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_checklists_user_updated
          ON checklists(user_id, updated_at, id);

        CREATE TABLE IF NOT EXISTS checklist_items (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          checklist_id INTEGER NOT NULL,
          parent_item_id INTEGER,
          content TEXT NOT NULL,
          is_completed INTEGER NOT NULL DEFAULT 0,
          "order" INTEGER NOT NULL,
          image_url TEXT,
          created_at INTEGER NOT NULL,
          updated_at INTEGER NOT NULL,
          deleted_at INTEGER,
          FOREIGN KEY(checklist_id) REFERENCES checklists(id) ON DELETE CASCADE,
          FOREIGN KEY(parent_item_id) REFERENCES checklist_items(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_checklist_items_siblings
          ON checklist_items(checklist_id, parent_item_id, "order");

        CREATE TABLE IF NOT EXISTS images (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          uploaded_by INTEGER,
          filename TEXT NOT NULL,
          filepath TEXT NOT NULL UNIQUE,
          mimetype TEXT NOT NULL,
          size INTEGER NOT NULL,
          created_at INTEGER NOT NULL,
          updated_at INTEGER NOT NULL,
          deleted_at INTEGER,
          FOREIGN KEY(uploaded_by) REFERENCES users(id) ON DELETE SET NULL
        );

        CREATE INDEX IF NOT EXISTS idx_images_uploader_updated
          ON images(uploaded_by, updated_at, id);
        "#,
    )?;

    conn.execute(
        "INSERT INTO store_state(singleton, schema_version, created_at, updated_at) \
         VALUES (1, ?1, ?2, ?2) \
         ON CONFLICT(singleton) DO UPDATE SET schema_version=excluded.schema_version, updated_at=excluded.updated_at",
        params![SCHEMA_VERSION, now_ms],
    )?;

    Ok(())
}
