//! Admin product handlers: search/sort listing, CRUD, and image upload.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use akaun_core::{search_admin, sort_products, Product, ProductInput, SortKey};

use crate::middleware::RequestId;

use super::images::{store_image, UploadedImage};
use super::{map_db_error, map_validation_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct AdminProductQuery {
    pub q: Option<String>,
    pub sort: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct DeletedProduct {
    pub id: i64,
    pub deleted: bool,
}

fn product_not_found(req_id: &str, id: i64) -> ApiError {
    ApiError::new(req_id, "not_found", format!("product {id} not found"))
}

/// GET /api/v1/admin/products: name/description search, then sort.
pub(super) async fn list_admin_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<AdminProductQuery>,
) -> Result<Json<ApiResponse<Vec<Product>>>, ApiError> {
    let rid = &req_id.0;
    let sort = match query.sort.as_deref().filter(|s| !s.is_empty()) {
        Some(raw) => raw
            .parse::<SortKey>()
            .map_err(|e| map_validation_error(rid, &e))?,
        None => SortKey::default(),
    };

    let snapshot = akaun_db::list_products(&state.pool)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    let matched = search_admin(&snapshot, query.q.as_deref().unwrap_or(""));
    let data = sort_products(&matched, sort);

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// POST /api/v1/admin/products
pub(super) async fn create_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<ProductInput>,
) -> Result<(StatusCode, Json<ApiResponse<Product>>), ApiError> {
    let rid = &req_id.0;
    let input = body
        .normalized()
        .map_err(|e| map_validation_error(rid, &e))?;

    let product = akaun_db::create_product(&state.pool, &input)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    tracing::info!(product_id = product.id, name = %product.name, "product created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: product,
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

/// PUT /api/v1/admin/products/:id: full replacement of the editable fields.
pub(super) async fn update_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
    Json(body): Json<ProductInput>,
) -> Result<Json<ApiResponse<Product>>, ApiError> {
    let rid = &req_id.0;
    let input = body
        .normalized()
        .map_err(|e| map_validation_error(rid, &e))?;

    let product = akaun_db::update_product(&state.pool, id, &input)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?
        .ok_or_else(|| product_not_found(rid, id))?;

    tracing::info!(product_id = id, "product updated");

    Ok(Json(ApiResponse {
        data: product,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// DELETE /api/v1/admin/products/:id
pub(super) async fn delete_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<DeletedProduct>>, ApiError> {
    let rid = &req_id.0;
    let deleted = akaun_db::delete_product(&state.pool, id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    if !deleted {
        return Err(product_not_found(rid, id));
    }

    tracing::info!(product_id = id, "product deleted");

    Ok(Json(ApiResponse {
        data: DeletedProduct { id, deleted },
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// PUT /api/v1/admin/products/images/:file_name: raw image body, stored in
/// the product bucket. The returned URL goes into the product's `image`.
pub(super) async fn upload_product_image(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(file_name): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<ApiResponse<UploadedImage>>), ApiError> {
    let data = store_image(
        state.product_storage.as_deref(),
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
