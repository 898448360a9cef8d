//! Valuation types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stockroom_shared::types::{LocationId, ProductId, VariantId};

/// Value of one balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValuationRow {
    /// Product.
    pub product_id: ProductId,
    /// Location.
    pub location_id: LocationId,
    /// Variant, if any.
    pub variant_id: Option<VariantId>,
    /// On-hand quantity.
    pub qty_on_hand: Decimal,
    /// Weighted-average unit cost, 4 decimal places.
    pub unit_cost: Decimal,
    /// `qty_on_hand` times the unrounded average cost, 4 decimal places.
    pub value: Decimal,
}

/// Valuation of an organization's inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryValuation {
    /// Rows ordered by product, then location.
    pub rows: Vec<ValuationRow>,
    /// Sum of row values.
    pub total_value: Decimal,
}
