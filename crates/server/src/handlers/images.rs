#![forbid(unsafe_code)]

use crate::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;
use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use ng_storage::CreateImageRequest;
use serde::Serialize;
use uuid::Uuid;

/// Multipart field carrying the file.
pub const UPLOAD_FIELD: &str = "image";
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
/// Request body cap for the upload route: the file plus multipart framing.
pub const UPLOAD_BODY_LIMIT: usize = MAX_UPLOAD_BYTES + 64 * 1024;

const ALLOWED_TYPES: [(&str, &str); 4] = [
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
];

#[derive(Debug, Serialize)]
pub struct UploadedImage {
    id: i64,
    filename: String,
    mimetype: String,
    size: i64,
    url: String,
    created_at: i64,
}

struct ReceivedFile {
    filename: String,
    mimetype: String,
    extension: &'static str,
    bytes: Vec<u8>,
}

fn extension_for(mimetype: &str) -> Option<&'static str> {
    ALLOWED_TYPES
        .iter()
        .find(|(allowed, _)| allowed.eq_ignore_ascii_case(mimetype))
        .map(|(_, extension)| *extension)
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::PayloadTooLarge("File too large. Maximum size is 10MB.".to_string());
    }
    AppError::bad_request(err.body_text())
}

async fn receive_file(multipart: &mut Multipart) -> Result<ReceivedFile, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload").to_string();
        let mimetype = field.content_type().unwrap_or_default().to_ascii_lowercase();
        let Some(extension) = extension_for(&mimetype) else {
            return Err(AppError::bad_request(
                "Invalid file type. Only JPEG, PNG, GIF and WEBP images are allowed.",
            ));
        };
        let bytes = field.bytes().await.map_err(multipart_error)?;
        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(AppError::PayloadTooLarge(
                "File too large. Maximum size is 10MB.".to_string(),
            ));
        }
        return Ok(ReceivedFile {
            filename,
            mimetype,
            extension,
            bytes: bytes.to_vec(),
        });
    }
    Err(AppError::bad_request("No file uploaded"))
}

/// Stores the file under a random name in the upload directory and records
/// it for the uploader.
pub async fn upload(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadedImage>), AppError> {
    let file = receive_file(&mut multipart).await?;
    let size = i64::try_from(file.bytes.len())
        .map_err(|_| AppError::bad_request("File too large"))?;

    let stored_name = format!("{}.{}", Uuid::new_v4(), file.extension);
    let path = state.upload_dir().join(&stored_name);
    tokio::fs::create_dir_all(state.upload_dir())
        .await
        .map_err(|err| AppError::Internal(format!("create upload dir: {err}")))?;
    tokio::fs::write(&path, &file.bytes)
        .await
        .map_err(|err| AppError::Internal(format!("write {}: {err}", path.display())))?;

    let image = match state
        .with_store_at(move |store, now_ms| {
            store.create_image(CreateImageRequest {
                uploaded_by: user.id,
                filename: file.filename,
                filepath: stored_name,
                mimetype: file.mimetype,
                size,
                now_ms,
            })
        })
        .await
    {
        Ok(image) => image,
        Err(err) => {
            if let Err(remove_err) = tokio::fs::remove_file(&path).await {
                tracing::warn!(error = %remove_err, path = %path.display(), "orphaned upload left on disk");
            }
            return Err(err);
        }
    };

    tracing::info!(image = image.id, user = %user.id, size, "image uploaded");
    Ok((
        StatusCode::CREATED,
        Json(UploadedImage {
            id: image.id,
            url: image.url(),
            filename: image.filename,
            mimetype: image.mimetype,
            size: image.size,
            created_at: image.created_at,
        }),
    ))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(image_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state
        .with_store_at(move |store, now_ms| store.delete_image(user.id, image_id, now_ms))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_web_image_types_are_accepted() {
        assert_eq!(extension_for("image/jpeg"), Some("jpg"));
        assert_eq!(extension_for("IMAGE/PNG"), Some("png"));
        assert_eq!(extension_for("image/webp"), Some("webp"));
        assert_eq!(extension_for("image/svg+xml"), None);
        assert_eq!(extension_for("application/pdf"), None);
        assert_eq!(extension_for(""), None);
    }
}
