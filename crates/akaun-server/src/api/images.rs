//! Raw-body image upload shared by the feedback and product routes.

use axum::{
    body::Bytes,
    http::{header::CONTENT_TYPE, HeaderMap},
};
use chrono::Utc;
use serde::Serialize;

use akaun_storage::{upload_object_path, StorageClient, StorageError};

use super::ApiError;

#[derive(Debug, Serialize)]
pub(super) struct UploadedImage {
    pub path: String,
    pub url: String,
}

pub(super) fn map_storage_error(request_id: String, error: &StorageError) -> ApiError {
    tracing::error!(error = %error, "storage request failed");
    ApiError::new(request_id, "internal_error", "image storage request failed")
}

/// Check the body is a non-empty `image/*` payload and store it under a
/// timestamped object path in `storage`'s bucket.
pub(super) async fn store_image(
    storage: Option<&StorageClient>,
    rid: &str,
    file_name: &str,
    headers: &HeaderMap,
    body: Bytes,
) -> Result<UploadedImage, ApiError> {
    let Some(storage) = storage else {
        return Err(ApiError::new(
            rid,
            "service_unavailable",
            "image storage is not configured",
        ));
    };

    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .filter(|ct| ct.starts_with("image/"))
        .ok_or_else(|| {
            ApiError::new(rid, "validation_error", "Content-Type must be an image/* type")
        })?;

    if body.is_empty() {
        return Err(ApiError::new(
            rid,
            "validation_error",
            "image body must not be empty",
        ));
    }

    let size = body.len();
    let path = upload_object_path(Utc::now().timestamp_millis(), file_name);
    let url = storage
        .upload(&path, content_type, body.to_vec())
        .await
        .map_err(|e| map_storage_error(rid.to_owned(), &e))?;

    tracing::info!(bucket = storage.bucket(), path = %path, size, "image uploaded");

    Ok(UploadedImage { path, url })
}
