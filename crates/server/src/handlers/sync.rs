#![forbid(unsafe_code)]

use crate::auth::AuthUser;
use crate::state::AppState;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use ng_core::cutoff::Cutoff;
use ng_core::sync::SyncPayload;
use ng_storage::SyncRequest;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SyncQuery {
    since: Option<String>,
}

/// `GET /api/sync?since=<ms>`. Failures answer with a bare status so a
/// client never mistakes an error body for a partial payload.
pub async fn changes(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<SyncQuery>,
) -> Result<Json<SyncPayload>, StatusCode> {
    let cutoff = Cutoff::parse(query.since.as_deref()).map_err(|err| {
        tracing::debug!(user = %user.id, error = %err, "sync cutoff rejected");
        StatusCode::BAD_REQUEST
    })?;

    // Sampled under the store lock, before the scan; returned as the
    // client's next cutoff.
    let payload = state
        .with_store_at(move |store, collection_start_ms| {
            store.sync_changes(SyncRequest {
                user_id: user.id,
                cutoff,
                collection_start_ms,
            })
        })
        .await
        .map_err(|err| err.into_bare_status())?;
    Ok(Json(payload))
}
