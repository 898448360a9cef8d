//! Purchasing storage port.

use async_trait::async_trait;
use stockroom_shared::types::{OrganizationId, ProductId, PurchaseOrderId};

use super::types::{PurchaseLine, PurchaseOrder, PurchaseOrderLine, Receipt, ReceiptLine};
use crate::ledger::StockError;

/// Read access to purchase orders and receipts.
///
/// Receipts are written only through [`crate::ledger::LedgerStore::commit`].
#[async_trait]
pub trait PurchasingStore: Send + Sync {
    /// Finds a purchase order.
    async fn find_purchase_order(
        &self,
        organization_id: OrganizationId,
        purchase_order_id: PurchaseOrderId,
    ) -> Result<Option<PurchaseOrder>, StockError>;

    /// Lists the lines of a purchase order.
    async fn purchase_order_lines(
        &self,
        organization_id: OrganizationId,
        purchase_order_id: PurchaseOrderId,
    ) -> Result<Vec<PurchaseOrderLine>, StockError>;

    /// Lists purchase lines of every order, optionally for one product.
    async fn purchase_history(
        &self,
        organization_id: OrganizationId,
        product_id: Option<ProductId>,
    ) -> Result<Vec<PurchaseLine>, StockError>;

    /// Finds the receipt of a purchase order, with its lines.
    async fn find_receipt_for_order(
        &self,
        organization_id: OrganizationId,
        purchase_order_id: PurchaseOrderId,
    ) -> Result<Option<(Receipt, Vec<ReceiptLine>)>, StockError>;
}
