#![forbid(unsafe_code)]

use super::required_text;
use crate::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use ng_core::model::GraphRow;
use ng_storage::{CreateGraphRequest, UpdateGraphRequest};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct GraphBody {
    title: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<GraphRow>>, AppError> {
    let graphs = state
        .with_store(move |store| store.list_graphs(user.id))
        .await?;
    Ok(Json(graphs))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<GraphBody>,
) -> Result<(StatusCode, Json<GraphRow>), AppError> {
    let title = required_text(body.title, "Title is required")?;
    let graph = state
        .with_store_at(move |store, now_ms| {
            store.create_graph(CreateGraphRequest {
                user_id: user.id,
                title,
                now_ms,
            })
        })
        .await?;
    Ok((StatusCode::CREATED, Json(graph)))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(graph_id): Path<i64>,
) -> Result<Json<GraphRow>, AppError> {
    let graph = state
        .with_store(move |store| store.get_graph(user.id, graph_id))
        .await?;
    Ok(Json(graph))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(graph_id): Path<i64>,
    Json(body): Json<GraphBody>,
) -> Result<Json<GraphRow>, AppError> {
    let title = required_text(body.title, "Title is required for update")?;
    let graph = state
        .with_store_at(move |store, now_ms| {
            store.update_graph(UpdateGraphRequest {
                user_id: user.id,
                graph_id,
                title,
                now_ms,
            })
        })
        .await?;
    Ok(Json(graph))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(graph_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state
        .with_store_at(move |store, now_ms| store.delete_graph(user.id, graph_id, now_ms))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
