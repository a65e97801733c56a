#![forbid(unsafe_code)]

use super::required_text;
use crate::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use ng_core::model::ChecklistRow;
use ng_storage::{CreateChecklistRequest, UpdateChecklistRequest};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ChecklistBody {
    title: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<ChecklistRow>>, AppError> {
    let checklists = state
        .with_store(move |store| store.list_checklists(user.id))
        .await?;
    Ok(Json(checklists))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<ChecklistBody>,
) -> Result<(StatusCode, Json<ChecklistRow>), AppError> {
    let title = required_text(body.title, "Checklist title is required")?;
    let checklist = state
        .with_store_at(move |store, now_ms| {
            store.create_checklist(CreateChecklistRequest {
                user_id: user.id,
                title,
                now_ms,
            })
        })
        .await?;
    Ok((StatusCode::CREATED, Json(checklist)))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(checklist_id): Path<i64>,
) -> Result<Json<ChecklistRow>, AppError> {
    let checklist = state
        .with_store(move |store| store.get_checklist(user.id, checklist_id))
        .await?;
    Ok(Json(checklist))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(checklist_id): Path<i64>,
    Json(body): Json<ChecklistBody>,
) -> Result<Json<ChecklistRow>, AppError> {
    let title = required_text(body.title, "Checklist title is required for update")?;
    let checklist = state
        .with_store_at(move |store, now_ms| {
            store.update_checklist(UpdateChecklistRequest {
                user_id: user.id,
                checklist_id,
                title,
                now_ms,
            })
        })
        .await?;
    Ok(Json(checklist))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(checklist_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state
        .with_store_at(move |store, now_ms| store.delete_checklist(user.id, checklist_id, now_ms))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
