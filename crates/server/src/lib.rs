#![forbid(unsafe_code)]

//! HTTP surface of the notegraph backend: authentication, per-entity CRUD,
//! image uploads and the incremental sync endpoint.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use config::Config;
pub use error::AppError;
pub use router::build_router;
pub use state::AppState;
