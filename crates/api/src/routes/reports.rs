//! Report routes.
//!
//! Provides endpoints for:
//! - Invoice and payment time series
//! - Profit and loss
//! - Rental utilization
//! - Stock movement activity

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::QueryRejection},
    routing::get,
};
use chrono::NaiveDate;
use serde::Deserialize;
use stockroom_core::reports::{
    DateRange, ProfitLossReport, RentalUtilizationReport, RevenueSeriesReport,
    StockActivityReport,
};
use stockroom_shared::types::OrganizationId;

use crate::AppState;
use crate::error::ApiResult;

/// Bucket count used when the query leaves it out.
pub const DEFAULT_BUCKETS: usize = 12;

/// Creates report routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/organizations/{org_id}/reports/revenue-series",
            get(revenue_series),
        )
        .route("/organizations/{org_id}/reports/profit-loss", get(profit_loss))
        .route(
            "/organizations/{org_id}/reports/rental-utilization",
            get(rental_utilization),
        )
        .route(
            "/organizations/{org_id}/reports/stock-activity",
            get(stock_activity),
        )
}

/// Query parameters for ranged reports.
#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    /// First day, inclusive.
    pub start: NaiveDate,
    /// Last day, inclusive.
    pub end: NaiveDate,
    /// Number of buckets for series reports.
    #[serde(default = "default_buckets")]
    pub buckets: usize,
}

fn default_buckets() -> usize {
    DEFAULT_BUCKETS
}

impl RangeQuery {
    fn range(&self) -> ApiResult<DateRange> {
        Ok(DateRange::new(self.start, self.end)?)
    }
}

fn range_query(query: Result<Query<RangeQuery>, QueryRejection>) -> ApiResult<RangeQuery> {
    let Query(query) = query?;
    Ok(query)
}

async fn revenue_series(
    State(state): State<AppState>,
    Path(org_id): Path<OrganizationId>,
    query: Result<Query<RangeQuery>, QueryRejection>,
) -> ApiResult<Json<RevenueSeriesReport>> {
    let query = range_query(query)?;
    let report = state
        .reports
        .revenue_series(org_id, query.range()?, query.buckets)
        .await?;
    Ok(Json(report))
}

async fn profit_loss(
    State(state): State<AppState>,
    Path(org_id): Path<OrganizationId>,
    query: Result<Query<RangeQuery>, QueryRejection>,
) -> ApiResult<Json<ProfitLossReport>> {
    let query = range_query(query)?;
    Ok(Json(state.reports.profit_loss(org_id, query.range()?).await?))
}

async fn rental_utilization(
    State(state): State<AppState>,
    Path(org_id): Path<OrganizationId>,
) -> ApiResult<Json<RentalUtilizationReport>> {
    Ok(Json(state.reports.rental_utilization(org_id).await?))
}

async fn stock_activity(
    State(state): State<AppState>,
    Path(org_id): Path<OrganizationId>,
    query: Result<Query<RangeQuery>, QueryRejection>,
) -> ApiResult<Json<StockActivityReport>> {
    let query = range_query(query)?;
    let report = state
        .reports
        .stock_activity(org_id, query.range()?, query.buckets)
        .await?;
    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use chrono::NaiveDate;
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use stockroom_core::reports::{InvoiceRecord, PaymentRecord, RentalAsset, RentalAssetStatus};
    use stockroom_core::catalog::ProductType;

    use super::DEFAULT_BUCKETS;
    use crate::test_support::TestApp;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 4, d).unwrap()
    }

    fn seeded() -> TestApp {
        let app = TestApp::new();
        app.store.add_invoice(app.org, InvoiceRecord { issued_on: day(2), total: dec!(300) });
        app.store.add_invoice(app.org, InvoiceRecord { issued_on: day(28), total: dec!(200) });
        app.store.add_payment(app.org, PaymentRecord { paid_on: day(29), amount: dec!(120) });
        app
    }

    #[tokio::test]
    async fn test_revenue_series_defaults_bucket_count() {
        let app = seeded();
        let (status, body) = app
            .get("/reports/revenue-series?start=2026-04-01&end=2026-04-30")
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["invoices"]["buckets"].as_array().unwrap().len(),
            DEFAULT_BUCKETS
        );
        assert_eq!(body["invoice_summary"]["total"], "500");
        assert_eq!(body["payment_summary"]["count"], 1);
    }

    #[tokio::test]
    async fn test_profit_loss() {
        let app = seeded();
        let (status, body) = app
            .get("/reports/profit-loss?start=2026-04-01&end=2026-04-15")
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["revenue"], "300");
        assert_eq!(body["cost_of_goods"], "0");
        assert_eq!(body["profit"], "300");
    }

    #[tokio::test]
    async fn test_rental_utilization() {
        let app = TestApp::new();
        let product = app.product(ProductType::RentalAsset);
        for status in [RentalAssetStatus::Rented, RentalAssetStatus::Available] {
            app.store.add_rental_asset(app.org, RentalAsset { product_id: product, status });
        }
        let (status, body) = app.get("/reports/rental-utilization").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 2);
        assert_eq!(body["utilization"], "0.5");
    }

    #[rstest]
    #[case("/reports/revenue-series?start=2026-04-10&end=2026-04-01", "INVALID_DATE_RANGE")]
    #[case("/reports/stock-activity?start=2026-04-01&end=2026-04-30&buckets=0", "INVALID_BUCKET_COUNT")]
    #[case("/reports/profit-loss?start=2026-05-01&end=2026-04-01", "INVALID_DATE_RANGE")]
    #[case("/reports/profit-loss?start=2026-05-01", "VALIDATION_ERROR")]
    #[tokio::test]
    async fn test_invalid_report_queries(#[case] path: &str, #[case] code: &str) {
        let app = TestApp::new();
        let (status, body) = app.get(path).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], code);
    }

    #[tokio::test]
    async fn test_stock_activity_lists_every_movement_type() {
        let app = TestApp::new();
        let (status, body) = app
            .get("/reports/stock-activity?start=2026-04-01&end=2026-04-30&buckets=3")
            .await;
        assert_eq!(status, StatusCode::OK);
        assert!(!body["by_type"].as_array().unwrap().is_empty());
        assert_eq!(body["net_series"]["buckets"].as_array().unwrap().len(), 3);
    }
}
