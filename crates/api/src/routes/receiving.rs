//! Purchase order receiving routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::post,
};
use stockroom_core::receiving::ReceiptOutcome;
use stockroom_shared::types::{OrganizationId, PurchaseOrderId};

use crate::AppState;
use crate::error::ApiResult;

/// Creates receiving routes.
pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/organizations/{org_id}/purchase-orders/{po_id}/receive",
        post(receive_purchase_order),
    )
}

async fn receive_purchase_order(
    State(state): State<AppState>,
    Path((org_id, po_id)): Path<(OrganizationId, PurchaseOrderId)>,
) -> ApiResult<(StatusCode, Json<ReceiptOutcome>)> {
    let outcome = state
        .inventory
        .receive_purchase_order(org_id, po_id)
        .await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}
