#![forbid(unsafe_code)]

use super::patch::double_option;
use super::required_text;
use crate::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use ng_core::model::ChecklistItemRow;
use ng_storage::{
    CreateChecklistItemRequest, MoveChecklistItemRequest, UpdateChecklistItemRequest,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateItemBody {
    content: Option<String>,
    parent_item_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemBody {
    content: Option<String>,
    is_completed: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    parent_item_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    image_url: Option<Option<String>>,
}

impl UpdateItemBody {
    fn is_empty(&self) -> bool {
        self.content.is_none()
            && self.is_completed.is_none()
            && self.parent_item_id.is_none()
            && self.image_url.is_none()
    }
}

/// Target slot of a reorder: zero-based `position` among the children of
/// `parent_item_id` (top level when null).
#[derive(Debug, Deserialize)]
pub struct MoveItemBody {
    parent_item_id: Option<i64>,
    position: Option<usize>,
}

pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(checklist_id): Path<i64>,
) -> Result<Json<Vec<ChecklistItemRow>>, AppError> {
    let items = state
        .with_store(move |store| store.list_checklist_items(user.id, checklist_id))
        .await?;
    Ok(Json(items))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(checklist_id): Path<i64>,
    Json(body): Json<CreateItemBody>,
) -> Result<(StatusCode, Json<ChecklistItemRow>), AppError> {
    let content = required_text(body.content, "Checklist item content is required")?;
    let item = state
        .with_store_at(move |store, now_ms| {
            store.create_checklist_item(CreateChecklistItemRequest {
                user_id: user.id,
                checklist_id,
                parent_item_id: body.parent_item_id,
                content,
                now_ms,
            })
        })
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((checklist_id, item_id)): Path<(i64, i64)>,
    Json(body): Json<UpdateItemBody>,
) -> Result<Json<ChecklistItemRow>, AppError> {
    if body.is_empty() {
        return Err(AppError::bad_request("No update data provided"));
    }

    let item = state
        .with_store_at(move |store, now_ms| {
            store.update_checklist_item(UpdateChecklistItemRequest {
                user_id: user.id,
                checklist_id,
                item_id,
                content: body.content,
                is_completed: body.is_completed,
                parent_item_id: body.parent_item_id,
                image_url: body.image_url,
                now_ms,
            })
        })
        .await?;
    Ok(Json(item))
}

pub async fn reorder(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((checklist_id, item_id)): Path<(i64, i64)>,
    Json(body): Json<MoveItemBody>,
) -> Result<Json<ChecklistItemRow>, AppError> {
    let Some(position) = body.position else {
        return Err(AppError::bad_request("Target position is required"));
    };

    let item = state
        .with_store_at(move |store, now_ms| {
            store.move_checklist_item(MoveChecklistItemRequest {
                user_id: user.id,
                checklist_id,
                item_id,
                parent_item_id: body.parent_item_id,
                position,
                now_ms,
            })
        })
        .await?;
    Ok(Json(item))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((checklist_id, item_id)): Path<(i64, i64)>,
) -> Result<StatusCode, AppError> {
    state
        .with_store_at(move |store, now_ms| {
            store.delete_checklist_item(user.id, checklist_id, item_id, now_ms)
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
