use axum::{extract::State, Extension, Json};
use rust_decimal::Decimal;
use serde::Serialize;

use akaun_core::{build_checkout, whatsapp_link, CheckoutLine, CheckoutRequest};

use crate::middleware::RequestId;

use super::{map_db_error, map_validation_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct CheckoutResponse {
    pub total_amount: Decimal,
    /// Percent-encoded order message.
    pub message: String,
    pub whatsapp_link: String,
    pub lines: Vec<CheckoutLine>,
    pub unresolved: Vec<i64>,
}

/// POST /api/v1/checkout: price the cart and build the order deep link.
pub(super) async fn create_checkout(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CheckoutRequest>,
) -> Result<Json<ApiResponse<CheckoutResponse>>, ApiError> {
    let rid = &req_id.0;

    let mut ids: Vec<i64> = body.items.iter().map(|item| item.product_id).collect();
    ids.sort_unstable();
    ids.dedup();

    let quotes = akaun_db::get_product_quotes(&state.pool, &ids)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    let settings = &state.checkout;
    let summary = build_checkout(
        &body.items,
        |id| quotes.get(&id).cloned(),
        &body.customer_name,
        &body.customer_contact,
        &settings.format,
    )
    .map_err(|e| map_validation_error(rid, &e))?;

    if !summary.unresolved.is_empty() {
        tracing::warn!(
            unresolved = ?summary.unresolved,
            "checkout referenced products that no longer exist"
        );
    }

    let link = whatsapp_link(
        &settings.whatsapp_base_url,
        &settings.whatsapp_recipient,
        &summary.message,
    );

    Ok(Json(ApiResponse {
        data: CheckoutResponse {
            total_amount: summary.total_amount,
            message: summary.message,
            whatsapp_link: link,
            lines: summary.lines,
            unresolved: summary.unresolved,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
