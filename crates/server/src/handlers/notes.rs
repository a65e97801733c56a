#![forbid(unsafe_code)]

use super::patch::double_option;
use super::required_text;
use crate::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use ng_core::model::NoteRow;
use ng_storage::{CreateNoteRequest, UpdateNoteRequest};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateNoteBody {
    title: Option<String>,
    content: Option<String>,
    tags: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateNoteBody {
    #[serde(default, deserialize_with = "double_option")]
    title: Option<Option<String>>,
    content: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    tags: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    image_url: Option<Option<String>>,
}

impl UpdateNoteBody {
    fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.tags.is_none()
            && self.image_url.is_none()
    }
}

pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<NoteRow>>, AppError> {
    let notes = state
        .with_store(move |store| store.list_notes(user.id))
        .await?;
    Ok(Json(notes))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<CreateNoteBody>,
) -> Result<(StatusCode, Json<NoteRow>), AppError> {
    let content = required_text(body.content, "Note content is required")?;
    let note = state
        .with_store_at(move |store, now_ms| {
            store.create_note(CreateNoteRequest {
                user_id: user.id,
                title: body.title,
                content,
                tags: body.tags,
                now_ms,
            })
        })
        .await?;
    Ok((StatusCode::CREATED, Json(note)))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(note_id): Path<i64>,
) -> Result<Json<NoteRow>, AppError> {
    let note = state
        .with_store(move |store| store.get_note(user.id, note_id))
        .await?;
    Ok(Json(note))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(note_id): Path<i64>,
    Json(body): Json<UpdateNoteBody>,
) -> Result<Json<NoteRow>, AppError> {
    if body.is_empty() {
        return Err(AppError::bad_request("No update data provided"));
    }

    let note = state
        .with_store_at(move |store, now_ms| {
            store.update_note(UpdateNoteRequest {
                user_id: user.id,
                note_id,
                title: body.title,
                content: body.content,
                tags: body.tags,
                image_url: body.image_url,
                now_ms,
            })
        })
        .await?;
    Ok(Json(note))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(note_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state
        .with_store_at(move |store, now_ms| store.delete_note(user.id, note_id, now_ms))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
