//! Receiving coordinator.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use stockroom_shared::types::{OrganizationId, PurchaseOrderId, ReceiptId};
use tracing::{info, instrument};

use super::store::PurchasingStore;
use super::types::{
    PurchaseOrderLine, PurchaseOrderStatus, Receipt, ReceiptDocument, ReceiptLine,
};
use crate::catalog::CatalogStore;
use crate::ledger::{
    BalanceKey, MovementEntry, MovementRecorder, MovementType, RefType, SourceDocument,
    StockError, StockMovement,
};

/// Result of a successful receive.
#[derive(Debug, Clone, Serialize)]
pub struct ReceiptOutcome {
    /// Receipt header.
    pub receipt: Receipt,
    /// Receipt lines, one per purchase order line.
    pub lines: Vec<ReceiptLine>,
    /// Stock postings, one per line with a product.
    pub movements: Vec<StockMovement>,
}

/// Turns purchase orders into receipts and stock postings.
#[derive(Clone)]
pub struct ReceivingService {
    catalog: Arc<dyn CatalogStore>,
    purchasing: Arc<dyn PurchasingStore>,
    recorder: MovementRecorder,
    default_location_name: String,
}

impl ReceivingService {
    /// Creates a receiving service.
    #[must_use]
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        purchasing: Arc<dyn PurchasingStore>,
        recorder: MovementRecorder,
        default_location_name: impl Into<String>,
    ) -> Self {
        Self {
            catalog,
            purchasing,
            recorder,
            default_location_name: default_location_name.into(),
        }
    }

    /// Receives every line of a purchase order into the default location.
    ///
    /// # Errors
    ///
    /// - `PurchaseOrderNotFound` if the order does not exist
    /// - `PurchaseOrderAlreadyReceived`, `PurchaseOrderCancelled` for terminal orders
    /// - `EmptyPurchaseOrder` if the order has no lines
    /// - `NonPositiveQuantity` if a line quantity is zero or negative
    /// - `ProductNotFound` if a line references an unknown product
    /// - `ConcurrencyConflict`, `Persistence` from the commit
    #[instrument(skip(self))]
    pub async fn receive_purchase_order(
        &self,
        organization_id: OrganizationId,
        purchase_order_id: PurchaseOrderId,
    ) -> Result<ReceiptOutcome, StockError> {
        let order = self
            .purchasing
            .find_purchase_order(organization_id, purchase_order_id)
            .await?
            .ok_or(StockError::PurchaseOrderNotFound(purchase_order_id))?;

        match order.status {
            PurchaseOrderStatus::Received => {
                return Err(StockError::PurchaseOrderAlreadyReceived(purchase_order_id));
            }
            PurchaseOrderStatus::Cancelled => {
                return Err(StockError::PurchaseOrderCancelled(purchase_order_id));
            }
            PurchaseOrderStatus::Draft | PurchaseOrderStatus::Ordered => {}
        }

        let order_lines = self
            .purchasing
            .purchase_order_lines(organization_id, purchase_order_id)
            .await?;
        if order_lines.is_empty() {
            return Err(StockError::EmptyPurchaseOrder(purchase_order_id));
        }
        if let Some(line) = order_lines.iter().find(|l| l.qty <= Decimal::ZERO) {
            return Err(StockError::NonPositiveQuantity(line.qty));
        }

        self.ensure_products_exist(organization_id, &order_lines).await?;
        let location = self
            .catalog
            .ensure_default_location(organization_id, &self.default_location_name)
            .await?;

        let receipt_id = ReceiptId::new();
        let lines: Vec<ReceiptLine> = order_lines
            .iter()
            .map(|line| ReceiptLine::from_order_line(receipt_id, line))
            .collect();
        let total: Decimal = lines.iter().map(|l| l.line_total).sum();

        let entries: Vec<MovementEntry> = lines
            .iter()
            .filter_map(|line| {
                let product_id = line.product_id?;
                Some(MovementEntry::new(
                    BalanceKey::new(product_id, location.id),
                    line.qty,
                    MovementType::Receipt,
                    RefType::Receipt,
                    receipt_id.into_inner(),
                ))
            })
            .collect();

        let receipt = Receipt {
            id: receipt_id,
            organization_id,
            purchase_order_id,
            location_id: location.id,
            total,
            received_at: Utc::now(),
        };
        let document = SourceDocument::Receipt(ReceiptDocument {
            receipt: receipt.clone(),
            lines: lines.clone(),
            expected_status: order.status,
        });

        let movements = self
            .recorder
            .post_with_document(organization_id, entries, Some(document))
            .await?;

        info!(
            receipt_id = %receipt_id,
            location_id = %location.id,
            total = %total,
            postings = movements.len(),
            "Purchase order received"
        );

        Ok(ReceiptOutcome {
            receipt,
            lines,
            movements,
        })
    }

    /// Fails with `ProductNotFound` for the first unknown product on the order.
    async fn ensure_products_exist(
        &self,
        organization_id: OrganizationId,
        lines: &[PurchaseOrderLine],
    ) -> Result<(), StockError> {
        let mut seen = HashSet::new();
        for product_id in lines.iter().filter_map(|l| l.product_id) {
            if !seen.insert(product_id) {
                continue;
            }
            self.catalog
                .find_product(organization_id, product_id)
                .await?
                .ok_or(StockError::ProductNotFound(product_id))?;
        }
        Ok(())
    }
}
