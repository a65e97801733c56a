#![forbid(unsafe_code)]

use ng_core::kind::EntityKind;
use ng_core::model::{
    ChecklistItemRow, ChecklistRow, EdgeRow, GraphRow, ImageRow, NodeRow, NoteRow, UserRow,
};
use rusqlite::Row;

/// A row type read straight off one entity table. `COLUMNS` lists the stored
/// columns in the order `from_row` reads them.
pub(in crate::store) trait StoredRow: Sized {
    const KIND: EntityKind;
    const COLUMNS: &'static str;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
}

impl StoredRow for GraphRow {
    const KIND: EntityKind = EntityKind::Graphs;
    const COLUMNS: &'static str = "id, user_id, title, created_at, updated_at, deleted_at";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            title: row.get(2)?,
            created_at: row.get(3)?,
            updated_at: row.get(4)?,
            deleted_at: row.get(5)?,
        })
    }
}

impl StoredRow for NodeRow {
    const KIND: EntityKind = EntityKind::Nodes;
    const COLUMNS: &'static str = "id, graph_id, type, position_x, position_y, data_label, \
         data_content, image_url, style_width, style_height, created_at, updated_at, deleted_at";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            graph_id: row.get(1)?,
            node_type: row.get(2)?,
            position_x: row.get(3)?,
            position_y: row.get(4)?,
            data_label: row.get(5)?,
            data_content: row.get(6)?,
            image_url: row.get(7)?,
            style_width: row.get(8)?,
            style_height: row.get(9)?,
            created_at: row.get(10)?,
            updated_at: row.get(11)?,
            deleted_at: row.get(12)?,
        })
    }
}

impl StoredRow for EdgeRow {
    const KIND: EntityKind = EntityKind::Edges;
    const COLUMNS: &'static str = "id, graph_id, source_node_id, target_node_id, source_handle, \
         target_handle, marker_start, marker_end, created_at, updated_at, deleted_at";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            graph_id: row.get(1)?,
            source_node_id: row.get(2)?,
            target_node_id: row.get(3)?,
            source_handle: row.get(4)?,
            target_handle: row.get(5)?,
            marker_start: row.get(6)?,
            marker_end: row.get(7)?,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
            deleted_at: row.get(10)?,
        })
    }
}

impl StoredRow for NoteRow {
    const KIND: EntityKind = EntityKind::Notes;
    const COLUMNS: &'static str =
        "id, user_id, title, content, tags, image_url, created_at, updated_at, deleted_at";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            title: row.get(2)?,
            content: row.get(3)?,
            tags: row.get(4)?,
            image_url: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
            deleted_at: row.get(8)?,
        })
    }
}

impl StoredRow for ChecklistRow {
    const KIND: EntityKind = EntityKind::Checklists;
    const COLUMNS: &'static str = "id, user_id, title, created_at, updated_at, deleted_at";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            title: row.get(2)?,
            created_at: row.get(3)?,
            updated_at: row.get(4)?,
            deleted_at: row.get(5)?,
        })
    }
}

impl StoredRow for ChecklistItemRow {
    const KIND: EntityKind = EntityKind::ChecklistItems;
    const COLUMNS: &'static str = "id, checklist_id, parent_item_id, content, is_completed, \
         \"order\", image_url, created_at, updated_at, deleted_at";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            checklist_id: row.get(1)?,
            parent_item_id: row.get(2)?,
            content: row.get(3)?,
            is_completed: row.get(4)?,
            order: row.get(5)?,
            image_url: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
            deleted_at: row.get(9)?,
        })
    }
}

impl StoredRow for ImageRow {
    const KIND: EntityKind = EntityKind::Images;
    const COLUMNS: &'static str =
        "id, uploaded_by, filename, filepath, mimetype, size, created_at, updated_at, deleted_at";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            uploaded_by: row.get(1)?,
            filename: row.get(2)?,
            filepath: row.get(3)?,
            mimetype: row.get(4)?,
            size: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
            deleted_at: row.get(8)?,
        })
    }
}

pub(in crate::store) const USER_COLUMNS: &str = "id, username, created_at, updated_at";

pub(in crate::store) fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        created_at: row.get(2)?,
        updated_at: row.get(3)?,
    })
}
