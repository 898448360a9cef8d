//! Report inputs.

use std::sync::Arc;

use async_trait::async_trait;
use stockroom_shared::types::OrganizationId;
use tracing::instrument;

use super::error::ReportError;
use super::service::ReportService;
use super::types::{
    DateRange, InvoiceRecord, PaymentRecord, ProfitLossReport, RentalAsset,
    RentalUtilizationReport, RevenueSeriesReport, StockActivityReport,
};
use crate::ledger::{StockError, StockMovement};
use crate::receiving::PurchaseLine;

/// Read-only access to the records reports are built from.
///
/// Implementations may return records outside `range`; reports ignore them.
#[async_trait]
pub trait ReportSource: Send + Sync {
    /// Invoices issued in range.
    async fn invoices(
        &self,
        organization_id: OrganizationId,
        range: DateRange,
    ) -> Result<Vec<InvoiceRecord>, StockError>;

    /// Payments received in range.
    async fn payments(
        &self,
        organization_id: OrganizationId,
        range: DateRange,
    ) -> Result<Vec<PaymentRecord>, StockError>;

    /// Purchase order lines ordered in range, whatever the order status.
    async fn purchase_lines(
        &self,
        organization_id: OrganizationId,
        range: DateRange,
    ) -> Result<Vec<PurchaseLine>, StockError>;

    /// Every rental asset.
    async fn rental_assets(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Vec<RentalAsset>, StockError>;

    /// Stock movements created in range.
    async fn movements(
        &self,
        organization_id: OrganizationId,
        range: DateRange,
    ) -> Result<Vec<StockMovement>, StockError>;
}

/// Loads report inputs from a [`ReportSource`] and runs [`ReportService`].
#[derive(Clone)]
pub struct ReportGenerator {
    source: Arc<dyn ReportSource>,
}

impl ReportGenerator {
    /// Creates a generator.
    #[must_use]
    pub fn new(source: Arc<dyn ReportSource>) -> Self {
        Self { source }
    }

    /// Invoice and payment time series.
    #[instrument(skip(self))]
    pub async fn revenue_series(
        &self,
        organization_id: OrganizationId,
        range: DateRange,
        buckets: usize,
    ) -> Result<RevenueSeriesReport, ReportError> {
        if buckets == 0 {
            return Err(ReportError::InvalidBucketCount);
        }
        let invoices = self.source.invoices(organization_id, range).await?;
        let payments = self.source.payments(organization_id, range).await?;
        ReportService::revenue_series(range, buckets, &invoices, &payments)
    }

    /// Profit and loss over a range.
    #[instrument(skip(self))]
    pub async fn profit_loss(
        &self,
        organization_id: OrganizationId,
        range: DateRange,
    ) -> Result<ProfitLossReport, ReportError> {
        let invoices = self.source.invoices(organization_id, range).await?;
        let purchases = self.source.purchase_lines(organization_id, range).await?;
        Ok(ReportService::profit_loss(range, &invoices, &purchases))
    }

    /// Current rental utilization.
    #[instrument(skip(self))]
    pub async fn rental_utilization(
        &self,
        organization_id: OrganizationId,
    ) -> Result<RentalUtilizationReport, ReportError> {
        let assets = self.source.rental_assets(organization_id).await?;
        Ok(ReportService::rental_utilization(&assets))
    }

    /// Stock movement activity over a range.
    #[instrument(skip(self))]
    pub async fn stock_activity(
        &self,
        organization_id: OrganizationId,
        range: DateRange,
        buckets: usize,
    ) -> Result<StockActivityReport, ReportError> {
        if buckets == 0 {
            return Err(ReportError::InvalidBucketCount);
        }
        let movements = self.source.movements(organization_id, range).await?;
        ReportService::stock_activity(range, buckets, &movements)
    }
}
