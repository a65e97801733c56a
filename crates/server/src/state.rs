#![forbid(unsafe_code)]

use crate::auth::TokenKeys;
use crate::config::Config;
use crate::error::AppError;
use anyhow::Context;
use ng_storage::{SqliteStore, StoreError};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Shared handles passed to every handler. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    store: Arc<Mutex<SqliteStore>>,
    tokens: Arc<TokenKeys>,
    upload_dir: Arc<PathBuf>,
}

impl AppState {
    pub fn new(store: SqliteStore, tokens: TokenKeys, upload_dir: PathBuf) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            tokens: Arc::new(tokens),
            upload_dir: Arc::new(upload_dir),
        }
    }

    /// Opens the store and prepares the upload directory.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let store = SqliteStore::open(&config.db_dir)
            .with_context(|| format!("open store in {}", config.db_dir.display()))?;
        std::fs::create_dir_all(&config.upload_dir)
            .with_context(|| format!("create upload dir {}", config.upload_dir.display()))?;
        let tokens = TokenKeys::from_secret(config.jwt_secret.as_bytes(), config.token_ttl());
        Ok(Self::new(store, tokens, config.upload_dir.clone()))
    }

    pub fn tokens(&self) -> &TokenKeys {
        &self.tokens
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// Runs a store operation on the blocking pool.
    pub async fn with_store<T, F>(&self, op: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut SqliteStore) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || {
            let mut guard = store
                .lock()
                .map_err(|_| AppError::Internal("store mutex poisoned".to_string()))?;
            op(&mut guard).map_err(AppError::from)
        })
        .await
        .map_err(|err| AppError::Internal(format!("store task failed: {err}")))?
    }

    /// `with_store` plus the store's current time, read after the lock is
    /// taken so it cannot predate a sync that finished while this call waited.
    pub async fn with_store_at<T, F>(&self, op: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut SqliteStore, i64) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        self.with_store(move |store| {
            let now_ms = store.now_ms();
            op(store, now_ms)
        })
        .await
    }
}
