#![forbid(unsafe_code)]

use crate::auth::{hash_password, verify_password};
use crate::error::AppError;
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use ng_core::ids::UserId;
use ng_core::model::UserRow;
use ng_storage::CreateUserRequest;
use serde::{Deserialize, Serialize};

pub const MIN_PASSWORD_LEN: usize = 3;

#[derive(Debug, Deserialize)]
pub struct CredentialsBody {
    username: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    token: String,
}

fn credentials(body: CredentialsBody) -> Result<(String, String), AppError> {
    match (body.username, body.password) {
        (Some(username), Some(password)) if !username.trim().is_empty() && !password.is_empty() => {
            Ok((username, password))
        }
        _ => Err(AppError::bad_request("Username and password are required")),
    }
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<CredentialsBody>,
) -> Result<(StatusCode, Json<UserRow>), AppError> {
    let (username, password) = credentials(body)?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::bad_request(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        )));
    }

    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|err| AppError::Internal(format!("hash task failed: {err}")))?
        .map_err(|err| AppError::Internal(err.to_string()))?;

    let user = state
        .with_store_at(move |store, now_ms| {
            store.create_user(CreateUserRequest {
                username,
                password_hash,
                now_ms,
            })
        })
        .await
        .map_err(|err| match err {
            AppError::Conflict(_) => AppError::Conflict("Username already exists".to_string()),
            other => other,
        })?;

    tracing::info!(user = user.id, "user registered");
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<CredentialsBody>,
) -> Result<Json<TokenResponse>, AppError> {
    let (username, password) = credentials(body)?;

    let lookup = username.clone();
    let stored = state
        .with_store(move |store| store.find_user_credentials(&lookup))
        .await?
        .ok_or(AppError::Unauthorized("Invalid credentials"))?;

    let stored_hash = stored.password_hash;
    let valid = tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
        .await
        .map_err(|err| AppError::Internal(format!("verify task failed: {err}")))?
        .map_err(|err| AppError::Internal(err.to_string()))?;
    if !valid {
        tracing::warn!(username = %username, "login rejected");
        return Err(AppError::Unauthorized("Invalid credentials"));
    }

    let token = state
        .tokens()
        .issue(UserId::new(stored.id), &stored.username)
        .map_err(|err| AppError::Internal(format!("sign token: {err}")))?;
    Ok(Json(TokenResponse { token }))
}

