#![forbid(unsafe_code)]
#![allow(dead_code)]

use axum::Router;
use axum::body::{Body, Bytes};
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use ng_core::ids::UserId;
use ng_server::auth::TokenKeys;
use ng_server::{AppState, build_router};
use ng_storage::{CreateUserRequest, SqliteStore};
use serde_json::Value;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

pub const SECRET: &str = "test-secret";

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub dir: TempDir,
}

impl TestApp {
    pub fn start() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(dir.path().join("db")).unwrap();
        let tokens = TokenKeys::from_secret(SECRET.as_bytes(), Duration::from_secs(3600));
        let state = AppState::new(store, tokens, dir.path().join("uploads"));
        let app = build_router(state.clone());
        Self { app, state, dir }
    }

    /// Creates a user directly in the store and returns a bearer token for it.
    pub async fn user(&self, username: &str) -> (UserId, String) {
        let name = username.to_string();
        let row = self
            .state
            .with_store_at(move |store, now_ms| {
                store.create_user(CreateUserRequest {
                    username: name,
                    password_hash: "$argon2id$unused".to_string(),
                    now_ms,
                })
            })
            .await
            .unwrap();
        let id = UserId::new(row.id);
        let token = self.state.tokens().issue(id, username).unwrap();
        (id, token)
    }

    pub async fn raw(&self, request: Request<Body>) -> (StatusCode, Bytes) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, bytes)
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let (status, bytes) = self.raw(request).await;
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> StatusCode {
        self.send(Method::DELETE, uri, Some(token), None).await.0
    }
}

pub fn ids(rows: &Value) -> Vec<Value> {
    rows.as_array()
        .map(|rows| rows.iter().map(|row| row["id"].clone()).collect())
        .unwrap_or_default()
}
