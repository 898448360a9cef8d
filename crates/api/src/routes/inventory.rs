//! Stock movement and balance routes.
//!
//! Provides endpoints for:
//! - Transfers and adjustments
//! - Stock levels and reconciliation
//! - Movement history
//! - Inventory valuation

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stockroom_core::AdjustmentRequest;
use stockroom_core::ledger::{
    BalanceKey, MovementFilter, Reconciliation, StockBalance, StockMovement, VariantFilter,
};
use stockroom_core::transfer::{TransferOutcome, TransferRequest};
use stockroom_core::valuation::InventoryValuation;
use stockroom_shared::types::{
    LocationId, OrganizationId, PageRequest, PageResponse, ProductId, VariantId,
};
use uuid::Uuid;

use crate::AppState;
use crate::error::ApiResult;

/// Creates inventory routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/organizations/{org_id}/transfers", post(create_transfer))
        .route("/organizations/{org_id}/adjustments", post(adjust_stock))
        .route("/organizations/{org_id}/stock", get(list_stock_levels))
        .route(
            "/organizations/{org_id}/stock/{product_id}/{location_id}",
            get(get_stock_level),
        )
        .route(
            "/organizations/{org_id}/stock/{product_id}/{location_id}/reconcile",
            get(reconcile),
        )
        .route("/organizations/{org_id}/movements", get(list_movements))
        .route("/organizations/{org_id}/valuation", get(get_valuation))
}

/// Selects a variant of the balance in the path.
#[derive(Debug, Default, Deserialize)]
pub struct VariantQuery {
    /// Variant, if the product has variants.
    pub variant_id: Option<VariantId>,
}

/// Movement history filter and page.
#[derive(Debug, Default, Deserialize)]
pub struct MovementQuery {
    /// Restrict to a product.
    pub product_id: Option<ProductId>,
    /// Restrict to a location.
    pub location_id: Option<LocationId>,
    /// Restrict to one variant.
    pub variant_id: Option<VariantId>,
    /// Restrict to one referenced document.
    pub ref_id: Option<Uuid>,
    /// Page number.
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
}

impl MovementQuery {
    fn filter(&self) -> MovementFilter {
        MovementFilter {
            product_id: self.product_id,
            location_id: self.location_id,
            variant: self.variant_id.map_or(VariantFilter::Any, VariantFilter::Only),
            ref_id: self.ref_id,
        }
    }

    fn page(&self) -> PageRequest {
        let defaults = PageRequest::default();
        PageRequest::new(
            self.page.unwrap_or(defaults.page),
            self.per_page.unwrap_or(defaults.per_page),
        )
    }
}

/// Quantities of one balance.
#[derive(Debug, Serialize)]
pub struct StockLevelResponse {
    /// Product.
    pub product_id: ProductId,
    /// Location.
    pub location_id: LocationId,
    /// Variant, if any.
    pub variant_id: Option<VariantId>,
    /// Physical units present.
    pub qty_on_hand: Decimal,
    /// Units earmarked for open orders.
    pub qty_reserved: Decimal,
}

fn balance_key(
    product_id: ProductId,
    location_id: LocationId,
    variant_id: Option<VariantId>,
) -> BalanceKey {
    let key = BalanceKey::new(product_id, location_id);
    match variant_id {
        Some(variant_id) => key.with_variant(variant_id),
        None => key,
    }
}

async fn create_transfer(
    State(state): State<AppState>,
    Path(org_id): Path<OrganizationId>,
    payload: Result<Json<TransferRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TransferOutcome>)> {
    let Json(request) = payload?;
    let outcome = state.inventory.create_transfer(org_id, request).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

async fn adjust_stock(
    State(state): State<AppState>,
    Path(org_id): Path<OrganizationId>,
    payload: Result<Json<AdjustmentRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<StockMovement>)> {
    let Json(request) = payload?;
    let movement = state.inventory.adjust_stock(org_id, request).await?;
    Ok((StatusCode::CREATED, Json(movement)))
}

async fn list_stock_levels(
    State(state): State<AppState>,
    Path(org_id): Path<OrganizationId>,
) -> ApiResult<Json<Vec<StockBalance>>> {
    Ok(Json(state.inventory.stock_levels(org_id).await?))
}

async fn get_stock_level(
    State(state): State<AppState>,
    Path((org_id, product_id, location_id)): Path<(OrganizationId, ProductId, LocationId)>,
    Query(query): Query<VariantQuery>,
) -> ApiResult<Json<StockLevelResponse>> {
    let key = balance_key(product_id, location_id, query.variant_id);
    let level = state.inventory.stock_level(org_id, key).await?;
    Ok(Json(StockLevelResponse {
        product_id,
        location_id,
        variant_id: query.variant_id,
        qty_on_hand: level.qty_on_hand,
        qty_reserved: level.qty_reserved,
    }))
}

async fn reconcile(
    State(state): State<AppState>,
    Path((org_id, product_id, location_id)): Path<(OrganizationId, ProductId, LocationId)>,
    Query(query): Query<VariantQuery>,
) -> ApiResult<Json<Reconciliation>> {
    let key = balance_key(product_id, location_id, query.variant_id);
    Ok(Json(state.inventory.reconcile(org_id, key).await?))
}

async fn list_movements(
    State(state): State<AppState>,
    Path(org_id): Path<OrganizationId>,
    query: Result<Query<MovementQuery>, QueryRejection>,
) -> ApiResult<Json<PageResponse<StockMovement>>> {
    let Query(query) = query?;
    let page = state
        .inventory
        .movement_history(org_id, &query.filter(), query.page())
        .await?;
    Ok(Json(page))
}

async fn get_valuation(
    State(state): State<AppState>,
    Path(org_id): Path<OrganizationId>,
) -> ApiResult<Json<InventoryValuation>> {
    Ok(Json(state.inventory.inventory_valuation(org_id).await?))
}
