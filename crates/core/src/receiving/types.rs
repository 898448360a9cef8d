//! Purchasing and receipt types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stockroom_shared::types::{
    LocationId, OrganizationId, ProductId, PurchaseOrderId, PurchaseOrderLineId, ReceiptId,
    ReceiptLineId,
};

/// Purchase order lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseOrderStatus {
    /// Being drafted.
    Draft,
    /// Sent to the vendor.
    Ordered,
    /// Goods received; terminal.
    Received,
    /// Cancelled; terminal.
    Cancelled,
}

impl PurchaseOrderStatus {
    /// Returns the stable name used in storage and APIs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Ordered => "ordered",
            Self::Received => "received",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Purchase order header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    /// Purchase order ID.
    pub id: PurchaseOrderId,
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// Human-readable order number.
    pub order_number: String,
    /// Lifecycle status.
    pub status: PurchaseOrderStatus,
    /// Date the order was placed.
    pub ordered_on: NaiveDate,
}

/// Purchase order line. Free-text lines have no product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrderLine {
    /// Line ID.
    pub id: PurchaseOrderLineId,
    /// Parent order.
    pub purchase_order_id: PurchaseOrderId,
    /// Product, if the line is for a catalog product.
    pub product_id: Option<ProductId>,
    /// Line description.
    pub description: String,
    /// Quantity ordered.
    pub qty: Decimal,
    /// Cost per unit.
    pub unit_cost: Decimal,
}

impl PurchaseOrderLine {
    /// `qty * unit_cost`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.qty * self.unit_cost
    }
}

/// A historical purchase line, used for costing and reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseLine {
    /// Product, if any.
    pub product_id: Option<ProductId>,
    /// Quantity ordered.
    pub qty: Decimal,
    /// Cost per unit.
    pub unit_cost: Decimal,
    /// Order date of the parent purchase order.
    pub ordered_on: NaiveDate,
}

impl PurchaseLine {
    /// `qty * unit_cost`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.qty * self.unit_cost
    }
}

/// Goods receipt header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Receipt ID; also the `ref_id` of its movements.
    pub id: ReceiptId,
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// Received purchase order.
    pub purchase_order_id: PurchaseOrderId,
    /// Location the goods were received into.
    pub location_id: LocationId,
    /// Sum of line totals.
    pub total: Decimal,
    /// Time of receipt.
    pub received_at: DateTime<Utc>,
}

/// Goods receipt line, copied from a purchase order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptLine {
    /// Line ID.
    pub id: ReceiptLineId,
    /// Parent receipt.
    pub receipt_id: ReceiptId,
    /// Source purchase order line.
    pub purchase_order_line_id: PurchaseOrderLineId,
    /// Product, if any.
    pub product_id: Option<ProductId>,
    /// Line description.
    pub description: String,
    /// Quantity received.
    pub qty: Decimal,
    /// Cost per unit.
    pub unit_cost: Decimal,
    /// `qty * unit_cost`.
    pub line_total: Decimal,
}

impl ReceiptLine {
    /// Copies a purchase order line onto a receipt.
    #[must_use]
    pub fn from_order_line(receipt_id: ReceiptId, line: &PurchaseOrderLine) -> Self {
        Self {
            id: ReceiptLineId::new(),
            receipt_id,
            purchase_order_line_id: line.id,
            product_id: line.product_id,
            description: line.description.clone(),
            qty: line.qty,
            unit_cost: line.unit_cost,
            line_total: line.line_total(),
        }
    }
}

/// Receipt written atomically with its stock postings.
///
/// The store moves the purchase order from `expected_status` to `received`
/// in the same unit, and fails the commit if the order is no longer in
/// `expected_status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptDocument {
    /// Receipt header.
    pub receipt: Receipt,
    /// Receipt lines.
    pub lines: Vec<ReceiptLine>,
    /// Purchase order status observed before receiving.
    pub expected_status: PurchaseOrderStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_receipt_line_copies_order_line() {
        let line = PurchaseOrderLine {
            id: PurchaseOrderLineId::new(),
            purchase_order_id: PurchaseOrderId::new(),
            product_id: Some(ProductId::new()),
            description: "Widget".to_string(),
            qty: dec!(5),
            unit_cost: dec!(10.25),
        };
        let receipt_id = ReceiptId::new();
        let copy = ReceiptLine::from_order_line(receipt_id, &line);

        assert_eq!(copy.receipt_id, receipt_id);
        assert_eq!(copy.purchase_order_line_id, line.id);
        assert_eq!(copy.product_id, line.product_id);
        assert_eq!(copy.description, "Widget");
        assert_eq!(copy.line_total, dec!(51.25));
    }
}
