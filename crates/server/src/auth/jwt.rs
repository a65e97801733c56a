#![forbid(unsafe_code)]

use crate::error::AppError;
use crate::state::AppState;
use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use ng_core::ids::UserId;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Bearer token payload. `exp` is seconds since the epoch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: i64,
    pub username: String,
    pub exp: u64,
}

/// HS256 signing and verification keys derived from one shared secret.
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenKeys {
    pub fn from_secret(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
            ttl,
        }
    }

    pub fn issue(&self, user: UserId, username: &str) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            user_id: user.get(),
            username: username.to_string(),
            exp: jsonwebtoken::get_current_timestamp() + self.ttl.as_secs(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
    }
}

/// Principal attached to authenticated requests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub id: UserId,
    pub username: String,
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Rejects requests without a valid bearer token; otherwise inserts the
/// [`AuthUser`] extension for downstream handlers.
pub async fn require_user(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(token) = bearer_token(request.headers()) else {
        return Err(AppError::Unauthorized("Authentication token required"));
    };
    let claims = state.tokens().verify(token).map_err(|err| {
        tracing::warn!(error = %err, path = %request.uri().path(), "bearer token rejected");
        AppError::Unauthorized("Invalid or expired token")
    })?;

    request.extensions_mut().insert(AuthUser {
        id: UserId::new(claims.user_id),
        username: claims.username,
    });
    Ok(next.run(request).await)
}
