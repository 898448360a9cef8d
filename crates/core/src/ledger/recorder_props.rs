//! Property-based tests for the movement recorder.
//!
//! - Conservation: transfers never change a product's total on-hand quantity
//! - Consistency: replaying the movement log reproduces every cached balance
//! - Floors: a rejected batch leaves the store untouched

use std::sync::Arc;

use proptest::prelude::*;
use rust_decimal::Decimal;
use stockroom_shared::types::{LocationId, OrganizationId, ProductId};
use uuid::Uuid;

use super::balance::{net_by_product, replay};
use super::recorder::{DEFAULT_MAX_ATTEMPTS, MovementRecorder};
use super::store::LedgerStore;
use super::types::{BalanceKey, MovementEntry, MovementType, RefType};
use crate::memory::InMemoryStore;

/// Strategy for positive quantities with up to two decimal places.
fn positive_qty() -> impl Strategy<Value = Decimal> {
    (1i64..10_000i64).prop_map(|hundredths| Decimal::new(hundredths, 2))
}

/// A transfer between two of four locations: (from, to, qty).
fn transfer_op() -> impl Strategy<Value = (usize, usize, Decimal)> {
    (0usize..4, 0usize..4, positive_qty()).prop_filter("distinct locations", |(a, b, _)| a != b)
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn transfer(product: ProductId, from: LocationId, to: LocationId, qty: Decimal) -> Vec<MovementEntry> {
    let ref_id = Uuid::now_v7();
    vec![
        MovementEntry::new(
            BalanceKey::new(product, from),
            -qty,
            MovementType::Transfer,
            RefType::Transfer,
            ref_id,
        )
        .with_floor(Decimal::ZERO),
        MovementEntry::new(
            BalanceKey::new(product, to),
            qty,
            MovementType::Transfer,
            RefType::Transfer,
            ref_id,
        ),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Whatever sequence of transfers is attempted, accepted or rejected, the
    /// product total stays at the seeded quantity, no balance goes negative,
    /// and every cached balance equals the replayed log.
    #[test]
    fn prop_transfers_conserve_stock_and_match_replay(
        seed in positive_qty(),
        ops in prop::collection::vec(transfer_op(), 1..30),
    ) {
        let rt = runtime();
        rt.block_on(async {
            let store = Arc::new(InMemoryStore::new());
            let recorder = MovementRecorder::new(store.clone(), DEFAULT_MAX_ATTEMPTS);
            let org = OrganizationId::new();
            let product = ProductId::new();
            let locations: Vec<LocationId> = (0..4).map(|_| LocationId::new()).collect();

            recorder
                .post(org, vec![MovementEntry::new(
                    BalanceKey::new(product, locations[0]),
                    seed,
                    MovementType::Receipt,
                    RefType::Receipt,
                    Uuid::now_v7(),
                )])
                .await
                .unwrap();

            for (from, to, qty) in ops {
                let before = store.all_movements(org).len();
                let result = recorder
                    .post(org, transfer(product, locations[from], locations[to], qty))
                    .await;
                let after = store.all_movements(org).len();
                match result {
                    Ok(movements) => prop_assert_eq!(movements.len(), 2),
                    Err(_) => prop_assert_eq!(before, after),
                }
            }

            let log = store.all_movements(org);
            prop_assert_eq!(net_by_product(&log)[&product], seed);

            let replayed = replay(&log);
            for balance in store.list_balances(org).await.unwrap() {
                prop_assert!(balance.qty_on_hand >= Decimal::ZERO);
                prop_assert_eq!(replayed[&balance.key], balance.qty_on_hand);
            }
            Ok(())
        })?;
    }

    /// Adjustments without floors may go negative, but the cache still equals
    /// the log.
    #[test]
    fn prop_unfloored_adjustments_match_replay(
        deltas in prop::collection::vec((-5_000i64..5_000i64).prop_filter("non-zero", |d| *d != 0), 1..25),
    ) {
        let rt = runtime();
        rt.block_on(async {
            let store = Arc::new(InMemoryStore::new());
            let recorder = MovementRecorder::new(store.clone(), DEFAULT_MAX_ATTEMPTS);
            let org = OrganizationId::new();
            let key = BalanceKey::new(ProductId::new(), LocationId::new());

            let mut expected = Decimal::ZERO;
            for delta in deltas {
                let qty = Decimal::new(delta, 1);
                expected += qty;
                recorder
                    .post(org, vec![MovementEntry::new(
                        key,
                        qty,
                        MovementType::Adjustment,
                        RefType::Adjustment,
                        Uuid::now_v7(),
                    )])
                    .await
                    .unwrap();
            }

            let cached = recorder.balance(org, &key).await.unwrap().qty_on_hand;
            prop_assert_eq!(cached, expected);
            prop_assert_eq!(store.movement_total(org, &key).await.unwrap(), expected);
            Ok(())
        })?;
    }
}
