#![forbid(unsafe_code)]

use super::patch::double_option;
use crate::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use ng_core::model::NodeRow;
use ng_storage::{CreateNodeRequest, NodePosition, UpdateNodeRequest};
use serde::Deserialize;

#[derive(Clone, Copy, Debug, Deserialize)]
pub struct PositionBody {
    x: f64,
    y: f64,
}

impl From<PositionBody> for NodePosition {
    fn from(body: PositionBody) -> Self {
        Self {
            x: body.x,
            y: body.y,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct NodeDataBody {
    #[serde(default, deserialize_with = "double_option")]
    label: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    content: Option<Option<String>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NodeStyleBody {
    #[serde(default, deserialize_with = "double_option")]
    width: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option")]
    height: Option<Option<f64>>,
}

/// Canvas node as the client sends it; the id is chosen client-side.
#[derive(Debug, Deserialize)]
pub struct CreateNodeBody {
    id: Option<String>,
    #[serde(rename = "type")]
    node_type: Option<String>,
    position: Option<PositionBody>,
    data: Option<NodeDataBody>,
    style: Option<NodeStyleBody>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateNodeBody {
    #[serde(rename = "type")]
    node_type: Option<String>,
    position: Option<PositionBody>,
    data: Option<NodeDataBody>,
    style: Option<NodeStyleBody>,
    #[serde(default, deserialize_with = "double_option")]
    image_url: Option<Option<String>>,
}

pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(graph_id): Path<i64>,
) -> Result<Json<Vec<NodeRow>>, AppError> {
    let nodes = state
        .with_store(move |store| store.list_nodes(user.id, graph_id))
        .await?;
    Ok(Json(nodes))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(graph_id): Path<i64>,
    Json(body): Json<CreateNodeBody>,
) -> Result<(StatusCode, Json<NodeRow>), AppError> {
    let (Some(node_id), Some(position), Some(data)) = (body.id, body.position, body.data) else {
        return Err(AppError::bad_request(
            "Missing required node fields (id, position, data)",
        ));
    };
    let style = body.style.unwrap_or_default();

    let node = state
        .with_store_at(move |store, now_ms| {
            store.create_node(CreateNodeRequest {
                user_id: user.id,
                graph_id,
                node_id,
                node_type: body.node_type,
                position: position.into(),
                data_label: data.label.flatten(),
                data_content: data.content.flatten(),
                style_width: style.width.flatten(),
                style_height: style.height.flatten(),
                now_ms,
            })
        })
        .await?;
    Ok((StatusCode::CREATED, Json(node)))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((graph_id, node_id)): Path<(i64, String)>,
    Json(body): Json<UpdateNodeBody>,
) -> Result<Json<NodeRow>, AppError> {
    let data = body.data.unwrap_or_default();
    let style = body.style.unwrap_or_default();

    let node = state
        .with_store_at(move |store, now_ms| {
            store.update_node(UpdateNodeRequest {
                user_id: user.id,
                graph_id,
                node_id,
                node_type: body.node_type,
                position: body.position.map(NodePosition::from),
                data_label: data.label,
                data_content: data.content,
                image_url: body.image_url,
                style_width: style.width,
                style_height: style.height,
                now_ms,
            })
        })
        .await?;
    Ok(Json(node))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((graph_id, node_id)): Path<(i64, String)>,
) -> Result<StatusCode, AppError> {
    state
        .with_store_at(move |store, now_ms| store.delete_node(user.id, graph_id, &node_id, now_ms))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
