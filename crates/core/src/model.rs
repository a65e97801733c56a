#![forbid(unsafe_code)]

//! Stored row shapes. Field names are the raw column names; sync payloads
//! carry these rows unmodified. Timestamps are milliseconds since the epoch.

use crate::ids::RowKey;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Login lookup result; never serialized.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserCredentials {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphRow {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub deleted_at: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeRow {
    pub id: String,
    pub graph_id: i64,
    #[serde(rename = "type")]
    pub node_type: String,
    pub position_x: f64,
    pub position_y: f64,
    pub data_label: Option<String>,
    pub data_content: Option<String>,
    pub image_url: Option<String>,
    pub style_width: Option<f64>,
    pub style_height: Option<f64>,
    pub created_at: i64,
    pub updated_at: i64,
    pub deleted_at: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRow {
    pub id: String,
    pub graph_id: i64,
    pub source_node_id: String,
    pub target_node_id: String,
    pub source_handle: Option<String>,
    pub target_handle: Option<String>,
    pub marker_start: Option<String>,
    pub marker_end: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    pub deleted_at: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRow {
    pub id: i64,
    pub user_id: i64,
    pub title: Option<String>,
    pub content: String,
    pub tags: Option<String>,
    pub image_url: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    pub deleted_at: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistRow {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub deleted_at: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItemRow {
    pub id: i64,
    pub checklist_id: i64,
    pub parent_item_id: Option<i64>,
    pub content: String,
    pub is_completed: bool,
    pub order: i64,
    pub image_url: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    pub deleted_at: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRow {
    pub id: i64,
    pub uploaded_by: Option<i64>,
    pub filename: String,
    pub filepath: String,
    pub mimetype: String,
    pub size: i64,
    pub created_at: i64,
    pub updated_at: i64,
    pub deleted_at: Option<i64>,
}

impl ImageRow {
    /// Public URL the upload directory is served under.
    pub fn url(&self) -> String {
        image_url(&self.filepath)
    }
}

/// Builds `/uploads/<path>` from a stored relative path, normalising
/// separators and a leading slash.
pub fn image_url(relative_path: &str) -> String {
    let normalized = relative_path.replace('\\', "/");
    format!("/uploads/{}", normalized.trim_start_matches('/'))
}

/// Common view over every syncable row.
pub trait SyncRow {
    fn key(&self) -> RowKey;
    fn updated_at(&self) -> i64;
    fn deleted_at(&self) -> Option<i64>;

    fn is_live(&self) -> bool {
        self.deleted_at().is_none()
    }
}

macro_rules! impl_sync_row {
    ($($row:ty),* $(,)?) => {
        $(
            impl SyncRow for $row {
                fn key(&self) -> RowKey {
                    RowKey::from(self.id.clone())
                }

                fn updated_at(&self) -> i64 {
                    self.updated_at
                }

                fn deleted_at(&self) -> Option<i64> {
                    self.deleted_at
                }
            }
        )*
    };
}

impl_sync_row!(
    GraphRow,
    NodeRow,
    EdgeRow,
    NoteRow,
    ChecklistRow,
    ChecklistItemRow,
    ImageRow,
);
