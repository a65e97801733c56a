#![forbid(unsafe_code)]

use super::patch::double_option;
use crate::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use ng_core::model::EdgeRow;
use ng_storage::{CreateEdgeRequest, UpdateEdgeRequest};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEdgeBody {
    id: Option<String>,
    source: Option<String>,
    target: Option<String>,
    source_handle: Option<String>,
    target_handle: Option<String>,
    marker_start: Option<String>,
    marker_end: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEdgeBody {
    #[serde(default, deserialize_with = "double_option")]
    marker_start: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    marker_end: Option<Option<String>>,
}

pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(graph_id): Path<i64>,
) -> Result<Json<Vec<EdgeRow>>, AppError> {
    let edges = state
        .with_store(move |store| store.list_edges(user.id, graph_id))
        .await?;
    Ok(Json(edges))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(graph_id): Path<i64>,
    Json(body): Json<CreateEdgeBody>,
) -> Result<(StatusCode, Json<EdgeRow>), AppError> {
    let (Some(edge_id), Some(source), Some(target)) = (body.id, body.source, body.target) else {
        return Err(AppError::bad_request("Invalid edge data provided"));
    };

    let edge = state
        .with_store_at(move |store, now_ms| {
            store.create_edge(CreateEdgeRequest {
                user_id: user.id,
                graph_id,
                edge_id,
                source_node_id: source,
                target_node_id: target,
                source_handle: body.source_handle,
                target_handle: body.target_handle,
                marker_start: body.marker_start,
                marker_end: body.marker_end,
                now_ms,
            })
        })
        .await?;
    Ok((StatusCode::CREATED, Json(edge)))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((graph_id, edge_id)): Path<(i64, String)>,
    Json(body): Json<UpdateEdgeBody>,
) -> Result<Json<EdgeRow>, AppError> {
    if body.marker_start.is_none() && body.marker_end.is_none() {
        return Err(AppError::bad_request("No update data provided"));
    }

    let edge = state
        .with_store_at(move |store, now_ms| {
            store.update_edge(UpdateEdgeRequest {
                user_id: user.id,
                graph_id,
                edge_id,
                marker_start: body.marker_start,
                marker_end: body.marker_end,
                now_ms,
            })
        })
        .await?;
    Ok(Json(edge))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((graph_id, edge_id)): Path<(i64, String)>,
) -> Result<StatusCode, AppError> {
    state
        .with_store_at(move |store, now_ms| store.delete_edge(user.id, graph_id, &edge_id, now_ms))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
