use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;

use akaun_core::{filter_products, Product, ALL};

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct CatalogQuery {
    pub q: Option<String>,
    pub category: Option<String>,
    pub stock: Option<String>,
}

/// GET /api/v1/products: storefront catalog with search and tag filters.
pub(super) async fn list_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<ApiResponse<Vec<Product>>>, ApiError> {
    let snapshot = akaun_db::list_products(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = filter_products(
        &snapshot,
        query.q.as_deref().unwrap_or(""),
        query.category.as_deref().unwrap_or(ALL),
        query.stock.as_deref().unwrap_or(ALL),
    );

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// GET /api/v1/products/:id
pub(super) async fn get_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Product>>, ApiError> {
    let product = akaun_db::get_product(&state.pool, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| ApiError::new(&req_id.0, "not_found", format!("product {id} not found")))?;

    Ok(Json(ApiResponse {
        data: product,
        meta: ResponseMeta::new(req_id.0),
    }))
}
