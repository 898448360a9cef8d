//! Valuation engine.
//!
//! Unit cost is the lifetime weighted average over every purchase line of a
//! product: `sum(qty * unit_cost) / sum(qty)`. Reported unit costs and values
//! are rounded to 4 decimal places with banker's rounding; values are computed
//! from the unrounded average and rounded once.

use std::collections::BTreeMap;
use std::sync::Arc;

use rust_decimal::{Decimal, RoundingStrategy};
use stockroom_shared::types::{OrganizationId, ProductId};
use tracing::{debug, instrument};

use super::types::{InventoryValuation, ValuationRow};
use crate::ledger::{LedgerStore, StockError};
use crate::receiving::{PurchaseLine, PurchasingStore};

/// Decimal places of unit costs and values.
pub const COST_DP: u32 = 4;

fn round_cost(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(COST_DP, RoundingStrategy::MidpointNearestEven)
}

/// Weighted-average unit cost of `lines`; zero if there are none or their
/// quantities sum to zero.
#[must_use]
pub fn average_cost<'a>(lines: impl IntoIterator<Item = &'a PurchaseLine>) -> Decimal {
    round_cost(exact_average_cost(lines))
}

fn exact_average_cost<'a>(lines: impl IntoIterator<Item = &'a PurchaseLine>) -> Decimal {
    let (spend, qty) = lines
        .into_iter()
        .fold((Decimal::ZERO, Decimal::ZERO), |(spend, qty), line| {
            (spend + line.line_total(), qty + line.qty)
        });
    if qty.is_zero() {
        return Decimal::ZERO;
    }
    spend / qty
}

/// Computes costs and valuations from stored balances and purchase history.
#[derive(Clone)]
pub struct ValuationEngine {
    ledger: Arc<dyn LedgerStore>,
    purchasing: Arc<dyn PurchasingStore>,
}

impl ValuationEngine {
    /// Creates a valuation engine.
    #[must_use]
    pub fn new(ledger: Arc<dyn LedgerStore>, purchasing: Arc<dyn PurchasingStore>) -> Self {
        Self { ledger, purchasing }
    }

    /// Weighted-average unit cost of one product.
    pub async fn average_cost(
        &self,
        organization_id: OrganizationId,
        product_id: ProductId,
    ) -> Result<Decimal, StockError> {
        let history = self
            .purchasing
            .purchase_history(organization_id, Some(product_id))
            .await?;
        Ok(average_cost(
            history.iter().filter(|l| l.product_id == Some(product_id)),
        ))
    }

    /// Values every balance of an organization at its product's average cost.
    #[instrument(skip(self))]
    pub async fn inventory_valuation(
        &self,
        organization_id: OrganizationId,
    ) -> Result<InventoryValuation, StockError> {
        let balances = self.ledger.list_balances(organization_id).await?;
        let history = self
            .purchasing
            .purchase_history(organization_id, None)
            .await?;

        let mut by_product: BTreeMap<ProductId, Vec<&PurchaseLine>> = BTreeMap::new();
        for line in &history {
            if let Some(product_id) = line.product_id {
                by_product.entry(product_id).or_default().push(line);
            }
        }
        let unit_cost = |product_id: ProductId| {
            by_product
                .get(&product_id)
                .map_or(Decimal::ZERO, |lines| exact_average_cost(lines.iter().copied()))
        };

        let mut rows: Vec<ValuationRow> = balances
            .iter()
            .map(|balance| {
                let cost = unit_cost(balance.key.product_id);
                ValuationRow {
                    product_id: balance.key.product_id,
                    location_id: balance.key.location_id,
                    variant_id: balance.key.variant_id,
                    qty_on_hand: balance.qty_on_hand,
                    unit_cost: round_cost(cost),
                    value: round_cost(balance.qty_on_hand * cost),
                }
            })
            .collect();
        rows.sort_by_key(|r| (r.product_id, r.location_id, r.variant_id));

        let total_value = rows.iter().map(|r| r.value).sum();
        debug!(rows = rows.len(), total_value = %total_value, "Computed inventory valuation");

        Ok(InventoryValuation { rows, total_value })
    }
}
