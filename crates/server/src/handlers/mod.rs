#![forbid(unsafe_code)]

pub mod auth;
pub mod checklist_items;
pub mod checklists;
pub mod edges;
pub mod graphs;
pub mod health;
pub mod images;
pub mod nodes;
pub mod notes;
pub mod sync;

mod patch;

use crate::error::AppError;

/// Trimmed non-empty text, or a 400 with `message`.
fn required_text(value: Option<String>, message: &str) -> Result<String, AppError> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(AppError::bad_request(message)),
    }
}
