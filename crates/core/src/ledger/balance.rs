//! Balance replay and reconciliation.
//!
//! A cached balance must always equal the sum of its movements. These helpers
//! rebuild balances from the log and compare them with the cache.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stockroom_shared::types::ProductId;

use super::types::{BalanceKey, StockMovement};

/// Result of comparing the movement log with the cached balance for one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reconciliation {
    /// Balance key.
    #[serde(flatten)]
    pub key: BalanceKey,
    /// Sum of movement quantities.
    pub ledger_qty: Decimal,
    /// Cached on-hand quantity (zero if no row exists).
    pub cached_qty: Decimal,
    /// Whether the two agree.
    pub consistent: bool,
}

impl Reconciliation {
    /// Compares a ledger sum with a cached quantity.
    #[must_use]
    pub fn new(key: BalanceKey, ledger_qty: Decimal, cached_qty: Decimal) -> Self {
        Self {
            key,
            ledger_qty,
            cached_qty,
            consistent: ledger_qty == cached_qty,
        }
    }

    /// Difference the cache would need to be corrected by.
    #[must_use]
    pub fn drift(&self) -> Decimal {
        self.cached_qty - self.ledger_qty
    }
}

/// Rebuilds on-hand quantities per key from a movement log.
#[must_use]
pub fn replay<'a>(
    movements: impl IntoIterator<Item = &'a StockMovement>,
) -> BTreeMap<BalanceKey, Decimal> {
    let mut balances = BTreeMap::new();
    for movement in movements {
        *balances.entry(movement.key).or_insert(Decimal::ZERO) += movement.qty;
    }
    balances
}

/// Sums movement quantities per product across all locations.
#[must_use]
pub fn net_by_product<'a>(
    movements: impl IntoIterator<Item = &'a StockMovement>,
) -> BTreeMap<ProductId, Decimal> {
    let mut totals = BTreeMap::new();
    for movement in movements {
        *totals
            .entry(movement.key.product_id)
            .or_insert(Decimal::ZERO) += movement.qty;
    }
    totals
}
