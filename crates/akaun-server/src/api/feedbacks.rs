//! Testimonial handlers: public list/submit, image upload, and admin delete.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Extension, Json,
};
use serde::Serialize;

use akaun_core::{Feedback, FeedbackInput};

use crate::middleware::RequestId;

use super::images::{store_image, UploadedImage};
use super::{map_db_error, map_validation_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct DeletedFeedback {
    pub id: i64,
    pub image_removed: bool,
}

/// GET /api/v1/feedbacks: newest first.
pub(super) async fn list_feedbacks(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<Feedback>>>, ApiError> {
    let data = akaun_db::list_feedbacks(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// POST /api/v1/feedbacks
pub(super) async fn create_feedback(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<FeedbackInput>,
) -> Result<(StatusCode, Json<ApiResponse<Feedback>>), ApiError> {
    let rid = &req_id.0;
    let input = body
        .normalized()
        .map_err(|e| map_validation_error(rid, &e))?;

    let feedback = akaun_db::create_feedback(&state.pool, &input)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: feedback,
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

/// PUT /api/v1/feedbacks/images/:file_name: raw image body.
pub(super) async fn upload_feedback_image(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(file_name): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<ApiResponse<UploadedImage>>), ApiError> {
    let data = store_image(
        state.storage.as_deref(),
        &req_id.0,
        &file_name,
        &headers,
        body,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data,
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

/// DELETE /api/v1/admin/feedbacks/:id: removes the row, then its image.
///
/// Image cleanup is best effort: a storage failure is logged and reported as
/// `image_removed: false`, never as a request failure. An image still
/// referenced by another feedback row is left in place.
pub(super) async fn delete_feedback(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<DeletedFeedback>>, ApiError> {
    let rid = &req_id.0;
    let removed = akaun_db::delete_feedback(&state.pool, id)
        .await
        .map_err(|e| match e {
            akaun_db::DbError::NotFound => {
                ApiError::new(rid, "not_found", format!("feedback {id} not found"))
            }
            other => map_db_error(rid.clone(), &other),
        })?;

    let mut image_removed = false;
    if let (Some(storage), Some(image_url)) = (state.storage.as_ref(), removed.image.as_deref()) {
        let shared = akaun_db::feedback_image_in_use(&state.pool, image_url)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(feedback_id = id, error = %e, "could not check image references; keeping image");
                true
            });
        match storage.object_path_from_public_url(image_url) {
            Some(path) if shared => {
                tracing::warn!(feedback_id = id, path = %path, "feedback image still referenced; kept");
            }
            Some(path) => match storage.remove(&path).await {
                Ok(()) => image_removed = true,
                Err(e) => {
                    tracing::warn!(feedback_id = id, path = %path, error = %e, "failed to remove feedback image");
                }
            },
            None => {
                tracing::warn!(feedback_id = id, image = image_url, "feedback image is not in the configured bucket");
            }
        }
    }

    tracing::info!(feedback_id = id, image_removed, "feedback deleted");

    Ok(Json(ApiResponse {
        data: DeletedFeedback { id, image_removed },
        meta: ResponseMeta::new(req_id.0),
    }))
}
