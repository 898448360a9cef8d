//! Turns requested entries into a version-checked commit batch.
//!
//! Planning is pure: it reads a snapshot of the touched balances, applies every
//! entry to a running per-key balance, checks floors, and produces the rows to
//! write. The recorder rebuilds the plan from a fresh snapshot on every retry.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use stockroom_shared::types::{MovementId, OrganizationId};

use super::error::StockError;
use super::types::{
    BalanceKey, BalanceWrite, CommitBatch, MovementEntry, SourceDocument, StockBalance,
    StockMovement,
};

/// Planned writes for one logical operation.
#[derive(Debug, Clone)]
pub struct PostingPlan {
    organization_id: OrganizationId,
    movements: Vec<StockMovement>,
    balances: BTreeMap<BalanceKey, BalanceWrite>,
    planned_at: DateTime<Utc>,
}

impl PostingPlan {
    /// Plans `entries` against `snapshot`.
    ///
    /// Keys missing from the snapshot are treated as zero balances that do not
    /// exist yet.
    ///
    /// An empty `entries` slice yields an empty plan; callers that require at
    /// least one entry check with [`validate_entries`] first.
    ///
    /// # Errors
    ///
    /// - `ZeroQuantity` if any entry has a zero quantity
    /// - `InsufficientStock` if any entry would take its balance below its floor;
    ///   `available` is the running balance just before that entry
    pub fn build(
        organization_id: OrganizationId,
        entries: &[MovementEntry],
        snapshot: &BTreeMap<BalanceKey, StockBalance>,
        now: DateTime<Utc>,
    ) -> Result<Self, StockError> {
        if entries.iter().any(|e| e.qty.is_zero()) {
            return Err(StockError::ZeroQuantity);
        }

        let mut balances: BTreeMap<BalanceKey, BalanceWrite> = BTreeMap::new();
        let mut movements = Vec::with_capacity(entries.len());

        for entry in entries {
            let write = balances
                .entry(entry.key)
                .or_insert_with(|| opening_write(entry.key, snapshot.get(&entry.key)));

            let before = write.qty_on_hand;
            let after = before + entry.qty;
            if let Some(floor) = entry.floor
                && after < floor
            {
                return Err(StockError::InsufficientStock {
                    product_id: entry.key.product_id,
                    location_id: entry.key.location_id,
                    available: before,
                    requested: entry.qty.abs(),
                });
            }
            write.qty_on_hand = after;

            movements.push(StockMovement {
                id: MovementId::new(),
                organization_id,
                key: entry.key,
                qty: entry.qty,
                movement_type: entry.movement_type,
                ref_type: entry.ref_type,
                ref_id: entry.ref_id,
                note: entry.note.clone(),
                created_at: now,
            });
        }

        Ok(Self {
            organization_id,
            movements,
            balances,
            planned_at: now,
        })
    }

    /// Movements that will be appended.
    #[must_use]
    pub fn movements(&self) -> &[StockMovement] {
        &self.movements
    }

    /// Resulting balance for `key`, if the plan touches it.
    #[must_use]
    pub fn balance_after(&self, key: &BalanceKey) -> Option<Decimal> {
        self.balances.get(key).map(|w| w.qty_on_hand)
    }

    /// Converts the plan into a batch. Balance writes come out in key order.
    #[must_use]
    pub fn into_batch(self, document: Option<SourceDocument>) -> CommitBatch {
        CommitBatch {
            organization_id: self.organization_id,
            movements: self.movements,
            balances: self.balances.into_values().collect(),
            document,
            committed_at: self.planned_at,
        }
    }
}

/// Rejects empty batches and zero quantities before any balance is looked at.
pub fn validate_entries(entries: &[MovementEntry]) -> Result<(), StockError> {
    if entries.is_empty() {
        return Err(StockError::EmptyBatch);
    }
    if entries.iter().any(|e| e.qty.is_zero()) {
        return Err(StockError::ZeroQuantity);
    }
    Ok(())
}

fn opening_write(key: BalanceKey, current: Option<&StockBalance>) -> BalanceWrite {
    match current {
        Some(balance) => BalanceWrite {
            key,
            expected_version: Some(balance.version),
            qty_on_hand: balance.qty_on_hand,
            qty_reserved: balance.qty_reserved,
        },
        None => BalanceWrite {
            key,
            expected_version: None,
            qty_on_hand: Decimal::ZERO,
            qty_reserved: Decimal::ZERO,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::types::{MovementType, RefType};
    use rust_decimal_macros::dec;
    use stockroom_shared::types::{LocationId, ProductId};
    use uuid::Uuid;

    fn key() -> BalanceKey {
        BalanceKey::new(ProductId::new(), LocationId::new())
    }

    fn stored(org: OrganizationId, key: BalanceKey, qty: Decimal, version: i64) -> StockBalance {
        StockBalance {
            organization_id: org,
            key,
            qty_on_hand: qty,
            qty_reserved: dec!(2),
            version,
            updated_at: Utc::now(),
        }
    }

    fn entry(key: BalanceKey, qty: Decimal) -> MovementEntry {
        MovementEntry::new(
            key,
            qty,
            MovementType::Transfer,
            RefType::Transfer,
            Uuid::nil(),
        )
    }

    #[test]
    fn test_empty_batch_rejected() {
        assert!(matches!(validate_entries(&[]), Err(StockError::EmptyBatch)));
        assert!(matches!(
            validate_entries(&[entry(key(), dec!(0))]),
            Err(StockError::ZeroQuantity)
        ));
    }

    #[test]
    fn test_empty_plan_writes_nothing() {
        let batch = PostingPlan::build(OrganizationId::new(), &[], &BTreeMap::new(), Utc::now())
            .unwrap()
            .into_batch(None);
        assert!(batch.movements.is_empty());
        assert!(batch.balances.is_empty());
    }

    #[test]
    fn test_zero_quantity_rejected_before_floor_check() {
        let k = key();
        let entries = [entry(k, dec!(-5)).with_floor(dec!(0)), entry(k, dec!(0))];
        let result = PostingPlan::build(OrganizationId::new(), &entries, &BTreeMap::new(), Utc::now());
        assert!(matches!(result, Err(StockError::ZeroQuantity)));
    }

    #[test]
    fn test_new_key_is_inserted_at_version_one() {
        let k = key();
        let plan =
            PostingPlan::build(OrganizationId::new(), &[entry(k, dec!(5))], &BTreeMap::new(), Utc::now())
                .unwrap();
        let batch = plan.into_batch(None);

        assert_eq!(batch.balances.len(), 1);
        assert_eq!(batch.balances[0].expected_version, None);
        assert_eq!(batch.balances[0].new_version(), 1);
        assert_eq!(batch.balances[0].qty_on_hand, dec!(5));
        assert_eq!(batch.balances[0].qty_reserved, dec!(0));
    }

    #[test]
    fn test_existing_key_carries_version_and_reserved() {
        let org = OrganizationId::new();
        let k = key();
        let snapshot = BTreeMap::from([(k, stored(org, k, dec!(50), 4))]);
        let plan = PostingPlan::build(org, &[entry(k, dec!(-20))], &snapshot, Utc::now()).unwrap();
        let batch = plan.into_batch(None);

        assert_eq!(batch.balances[0].expected_version, Some(4));
        assert_eq!(batch.balances[0].qty_on_hand, dec!(30));
        assert_eq!(batch.balances[0].qty_reserved, dec!(2));
    }

    #[test]
    fn test_floor_violation_reports_available() {
        let org = OrganizationId::new();
        let k = key();
        let snapshot = BTreeMap::from([(k, stored(org, k, dec!(49), 1))]);
        let result = PostingPlan::build(
            org,
            &[entry(k, dec!(-51)).with_floor(dec!(0))],
            &snapshot,
            Utc::now(),
        );

        match result {
            Err(StockError::InsufficientStock {
                available,
                requested,
                ..
            }) => {
                assert_eq!(available, dec!(49));
                assert_eq!(requested, dec!(51));
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
    }

    #[test]
    fn test_floor_uses_running_balance_within_batch() {
        let org = OrganizationId::new();
        let k = key();
        let snapshot = BTreeMap::from([(k, stored(org, k, dec!(10), 1))]);
        let entries = [
            entry(k, dec!(-6)).with_floor(dec!(0)),
            entry(k, dec!(-6)).with_floor(dec!(0)),
        ];
        let result = PostingPlan::build(org, &entries, &snapshot, Utc::now());
        assert!(matches!(
            result,
            Err(StockError::InsufficientStock { available, .. }) if available == dec!(4)
        ));
    }

    #[test]
    fn test_unfloored_entry_may_go_negative() {
        let k = key();
        let plan =
            PostingPlan::build(OrganizationId::new(), &[entry(k, dec!(-3))], &BTreeMap::new(), Utc::now())
                .unwrap();
        assert_eq!(plan.balance_after(&k), Some(dec!(-3)));
    }

    #[test]
    fn test_balance_writes_are_key_ordered_and_merged() {
        let org = OrganizationId::new();
        let a = key();
        let b = key();
        let entries = [
            entry(b, dec!(1)),
            entry(a, dec!(1)),
            entry(b, dec!(2)),
        ];
        let batch = PostingPlan::build(org, &entries, &BTreeMap::new(), Utc::now())
            .unwrap()
            .into_batch(None);

        assert_eq!(batch.movements.len(), 3);
        assert_eq!(batch.balances.len(), 2);
        assert!(batch.balances[0].key < batch.balances[1].key);
        let b_write = batch.balances.iter().find(|w| w.key == b).unwrap();
        assert_eq!(b_write.qty_on_hand, dec!(3));
    }
}
