#![forbid(unsafe_code)]

use crate::auth::require_user;
use crate::error::AppError;
use crate::handlers::{
    auth, checklist_items, checklists, edges, graphs, health, images, nodes, notes, sync,
};
use crate::state::AppState;
use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post, put};
use axum::{Router, middleware};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub fn build_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/api/health", get(health::health))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login));

    let protected = Router::new()
        .route("/api/graphs", get(graphs::list).post(graphs::create))
        .route(
            "/api/graphs/:graph_id",
            get(graphs::get).put(graphs::update).delete(graphs::delete),
        )
        .route(
            "/api/graphs/:graph_id/nodes",
            get(nodes::list).post(nodes::create),
        )
        .route(
            "/api/graphs/:graph_id/nodes/:node_id",
            put(nodes::update).delete(nodes::delete),
        )
        .route(
            "/api/graphs/:graph_id/edges",
            get(edges::list).post(edges::create),
        )
        .route(
            "/api/graphs/:graph_id/edges/:edge_id",
            put(edges::update).delete(edges::delete),
        )
        .route("/api/notes", get(notes::list).post(notes::create))
        .route(
            "/api/notes/:note_id",
            get(notes::get).put(notes::update).delete(notes::delete),
        )
        .route(
            "/api/checklists",
            get(checklists::list).post(checklists::create),
        )
        .route(
            "/api/checklists/:checklist_id",
            get(checklists::get)
                .put(checklists::update)
                .delete(checklists::delete),
        )
        .route(
            "/api/checklists/:checklist_id/items",
            get(checklist_items::list).post(checklist_items::create),
        )
        .route(
            "/api/checklists/:checklist_id/items/:item_id",
            put(checklist_items::update).delete(checklist_items::delete),
        )
        .route(
            "/api/checklists/:checklist_id/items/:item_id/move",
            put(checklist_items::reorder),
        )
        .route(
            "/api/images/upload",
            post(images::upload).layer(DefaultBodyLimit::max(images::UPLOAD_BODY_LIMIT)),
        )
        .route("/api/images/:image_id", delete(images::delete))
        .route("/api/sync", get(sync::changes))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_user));

    let uploads = ServeDir::new(state.upload_dir());

    Router::new()
        .merge(public)
        .merge(protected)
        .nest_service("/uploads", uploads)
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn not_found() -> AppError {
    AppError::NotFound("Not Found".to_string())
}
