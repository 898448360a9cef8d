//! Purchasing repository: purchase orders, lines and receipts.

use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Select,
};
use stockroom_core::StockError;
use stockroom_core::receiving::{
    PurchaseLine, PurchaseOrder, PurchaseOrderLine, PurchasingStore, Receipt, ReceiptLine,
};
use stockroom_shared::types::{OrganizationId, ProductId, PurchaseOrderId};

use super::error::persistence;
use crate::entities::{purchase_order_lines, purchase_orders, receipt_lines, receipts};

/// Purchase orders and receipts stored in PostgreSQL.
#[derive(Debug, Clone)]
pub struct PurchasingRepository {
    db: DatabaseConnection,
}

/// Every purchase order line of the organization, joined to its order.
pub(crate) fn costed_lines(
    organization_id: OrganizationId,
) -> sea_orm::SelectTwo<purchase_order_lines::Entity, purchase_orders::Entity> {
    purchase_order_lines::Entity::find()
        .find_also_related(purchase_orders::Entity)
        .filter(purchase_orders::Column::OrganizationId.eq(organization_id.into_inner()))
}

/// Flattens joined rows into purchase history lines.
pub(crate) fn to_purchase_lines(
    rows: Vec<(purchase_order_lines::Model, Option<purchase_orders::Model>)>,
) -> Vec<PurchaseLine> {
    rows.into_iter()
        .filter_map(|(line, order)| {
            let order = order?;
            Some(PurchaseLine {
                product_id: line.product_id.map(ProductId::from_uuid),
                qty: line.qty,
                unit_cost: line.unit_cost,
                ordered_on: order.ordered_on,
            })
        })
        .collect()
}

impl PurchasingRepository {
    /// Creates a new purchasing repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn order_query(
        organization_id: OrganizationId,
        purchase_order_id: PurchaseOrderId,
    ) -> Select<purchase_orders::Entity> {
        purchase_orders::Entity::find_by_id(purchase_order_id.into_inner())
            .filter(purchase_orders::Column::OrganizationId.eq(organization_id.into_inner()))
    }
}

#[async_trait]
impl PurchasingStore for PurchasingRepository {
    async fn find_purchase_order(
        &self,
        organization_id: OrganizationId,
        purchase_order_id: PurchaseOrderId,
    ) -> Result<Option<PurchaseOrder>, StockError> {
        let order = Self::order_query(organization_id, purchase_order_id)
            .one(&self.db)
            .await
            .map_err(persistence)?;
        Ok(order.map(Into::into))
    }

    async fn purchase_order_lines(
        &self,
        organization_id: OrganizationId,
        purchase_order_id: PurchaseOrderId,
    ) -> Result<Vec<PurchaseOrderLine>, StockError> {
        let lines = purchase_order_lines::Entity::find()
            .inner_join(purchase_orders::Entity)
            .filter(purchase_orders::Column::Id.eq(purchase_order_id.into_inner()))
            .filter(purchase_orders::Column::OrganizationId.eq(organization_id.into_inner()))
            .order_by_asc(purchase_order_lines::Column::LineNumber)
            .all(&self.db)
            .await
            .map_err(persistence)?;
        Ok(lines.into_iter().map(Into::into).collect())
    }

    async fn purchase_history(
        &self,
        organization_id: OrganizationId,
        product_id: Option<ProductId>,
    ) -> Result<Vec<PurchaseLine>, StockError> {
        let mut query = costed_lines(organization_id);
        if let Some(product_id) = product_id {
            query = query
                .filter(purchase_order_lines::Column::ProductId.eq(product_id.into_inner()));
        }
        let rows = query.all(&self.db).await.map_err(persistence)?;
        Ok(to_purchase_lines(rows))
    }

    async fn find_receipt_for_order(
        &self,
        organization_id: OrganizationId,
        purchase_order_id: PurchaseOrderId,
    ) -> Result<Option<(Receipt, Vec<ReceiptLine>)>, StockError> {
        let Some(receipt) = receipts::Entity::find()
            .filter(receipts::Column::OrganizationId.eq(organization_id.into_inner()))
            .filter(receipts::Column::PurchaseOrderId.eq(purchase_order_id.into_inner()))
            .one(&self.db)
            .await
            .map_err(persistence)?
        else {
            return Ok(None);
        };

        let lines = receipt_lines::Entity::find()
            .filter(receipt_lines::Column::ReceiptId.eq(receipt.id))
            .all(&self.db)
            .await
            .map_err(persistence)?;

        Ok(Some((
            receipt.into(),
            lines.into_iter().map(Into::into).collect(),
        )))
    }
}
