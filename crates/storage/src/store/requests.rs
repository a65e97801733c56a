#![forbid(unsafe_code)]

//! Mutation payloads. Every request carries the server time it was issued at;
//! patch fields use `Option<Option<T>>` where `Some(None)` clears a nullable
//! column and `None` leaves it untouched.

use ng_core::cutoff::Cutoff;
use ng_core::ids::UserId;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateUserRequest {
    pub username: String,
    pub password_hash: String,
    pub now_ms: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateGraphRequest {
    pub user_id: UserId,
    pub title: String,
    pub now_ms: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpdateGraphRequest {
    pub user_id: UserId,
    pub graph_id: i64,
    pub title: String,
    pub now_ms: i64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodePosition {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CreateNodeRequest {
    pub user_id: UserId,
    pub graph_id: i64,
    pub node_id: String,
    pub node_type: Option<String>,
    pub position: NodePosition,
    pub data_label: Option<String>,
    pub data_content: Option<String>,
    pub style_width: Option<f64>,
    pub style_height: Option<f64>,
    pub now_ms: i64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UpdateNodeRequest {
    pub user_id: UserId,
    pub graph_id: i64,
    pub node_id: String,
    pub node_type: Option<String>,
    pub position: Option<NodePosition>,
    pub data_label: Option<Option<String>>,
    pub data_content: Option<Option<String>>,
    pub image_url: Option<Option<String>>,
    pub style_width: Option<Option<f64>>,
    pub style_height: Option<Option<f64>>,
    pub now_ms: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateEdgeRequest {
    pub user_id: UserId,
    pub graph_id: i64,
    pub edge_id: String,
    pub source_node_id: String,
    pub target_node_id: String,
    pub source_handle: Option<String>,
    pub target_handle: Option<String>,
    pub marker_start: Option<String>,
    pub marker_end: Option<String>,
    pub now_ms: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpdateEdgeRequest {
    pub user_id: UserId,
    pub graph_id: i64,
    pub edge_id: String,
    pub marker_start: Option<Option<String>>,
    pub marker_end: Option<Option<String>>,
    pub now_ms: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateNoteRequest {
    pub user_id: UserId,
    pub title: Option<String>,
    pub content: String,
    pub tags: Option<String>,
    pub now_ms: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpdateNoteRequest {
    pub user_id: UserId,
    pub note_id: i64,
    pub title: Option<Option<String>>,
    pub content: Option<String>,
    pub tags: Option<Option<String>>,
    pub image_url: Option<Option<String>>,
    pub now_ms: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateChecklistRequest {
    pub user_id: UserId,
    pub title: String,
    pub now_ms: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpdateChecklistRequest {
    pub user_id: UserId,
    pub checklist_id: i64,
    pub title: String,
    pub now_ms: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateChecklistItemRequest {
    pub user_id: UserId,
    pub checklist_id: i64,
    pub parent_item_id: Option<i64>,
    pub content: String,
    pub now_ms: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpdateChecklistItemRequest {
    pub user_id: UserId,
    pub checklist_id: i64,
    pub item_id: i64,
    pub content: Option<String>,
    pub is_completed: Option<bool>,
    pub parent_item_id: Option<Option<i64>>,
    pub image_url: Option<Option<String>>,
    pub now_ms: i64,
}

/// Places an item at `position` (zero-based) among the live children of
/// `parent_item_id`; positions past the end append.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveChecklistItemRequest {
    pub user_id: UserId,
    pub checklist_id: i64,
    pub item_id: i64,
    pub parent_item_id: Option<i64>,
    pub position: usize,
    pub now_ms: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateImageRequest {
    pub uploaded_by: UserId,
    pub filename: String,
    pub filepath: String,
    pub mimetype: String,
    pub size: i64,
    pub now_ms: i64,
}

/// `collection_start_ms` becomes the payload's `serverTimestamp`; the caller
/// samples the clock before handing the request over.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SyncRequest {
    pub user_id: UserId,
    pub cutoff: Cutoff,
    pub collection_start_ms: i64,
}
