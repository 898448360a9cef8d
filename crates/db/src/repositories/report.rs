//! Report repository: read-only inputs for the reporting aggregator.

use async_trait::async_trait;
use chrono::{Days, NaiveDate, NaiveTime, TimeZone, Utc};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use stockroom_core::StockError;
use stockroom_core::ledger::StockMovement;
use stockroom_core::receiving::PurchaseLine;
use stockroom_core::reports::{
    DateRange, InvoiceRecord, PaymentRecord, RentalAsset, ReportSource,
};
use stockroom_shared::types::OrganizationId;

use super::error::persistence;
use super::purchasing::{costed_lines, to_purchase_lines};
use crate::entities::{invoices, payments, purchase_orders, rental_assets, stock_movements};

/// Reporting reads against PostgreSQL.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    db: DatabaseConnection,
}

impl ReportRepository {
    /// Creates a new report repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn start_of_day(date: NaiveDate) -> chrono::DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

#[async_trait]
impl ReportSource for ReportRepository {
    async fn invoices(
        &self,
        organization_id: OrganizationId,
        range: DateRange,
    ) -> Result<Vec<InvoiceRecord>, StockError> {
        let rows = invoices::Entity::find()
            .filter(invoices::Column::OrganizationId.eq(organization_id.into_inner()))
            .filter(invoices::Column::IssuedOn.between(range.start, range.end))
            .order_by_asc(invoices::Column::IssuedOn)
            .all(&self.db)
            .await
            .map_err(persistence)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn payments(
        &self,
        organization_id: OrganizationId,
        range: DateRange,
    ) -> Result<Vec<PaymentRecord>, StockError> {
        let rows = payments::Entity::find()
            .filter(payments::Column::OrganizationId.eq(organization_id.into_inner()))
            .filter(payments::Column::PaidOn.between(range.start, range.end))
            .order_by_asc(payments::Column::PaidOn)
            .all(&self.db)
            .await
            .map_err(persistence)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn purchase_lines(
        &self,
        organization_id: OrganizationId,
        range: DateRange,
    ) -> Result<Vec<PurchaseLine>, StockError> {
        let rows = costed_lines(organization_id)
            .filter(purchase_orders::Column::OrderedOn.between(range.start, range.end))
            .all(&self.db)
            .await
            .map_err(persistence)?;
        Ok(to_purchase_lines(rows))
    }

    async fn rental_assets(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Vec<RentalAsset>, StockError> {
        let rows = rental_assets::Entity::find()
            .filter(rental_assets::Column::OrganizationId.eq(organization_id.into_inner()))
            .all(&self.db)
            .await
            .map_err(persistence)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn movements(
        &self,
        organization_id: OrganizationId,
        range: DateRange,
    ) -> Result<Vec<StockMovement>, StockError> {
        let from = start_of_day(range.start);
        let until = range
            .end
            .checked_add_days(Days::new(1))
            .map_or(chrono::DateTime::<Utc>::MAX_UTC, start_of_day);

        let rows = stock_movements::Entity::find()
            .filter(stock_movements::Column::OrganizationId.eq(organization_id.into_inner()))
            .filter(stock_movements::Column::CreatedAt.gte(from))
            .filter(stock_movements::Column::CreatedAt.lt(until))
            .order_by_asc(stock_movements::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(persistence)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
