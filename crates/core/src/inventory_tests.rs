//! Tests for the inventory facade.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use stockroom_shared::types::{LocationId, PageRequest, ProductId, VariantId};

use super::*;
use crate::catalog::ProductType;
use crate::fixtures::{Fixture, date};
use crate::ledger::MovementFilter;
use crate::receiving::PurchaseOrderStatus;
use crate::transfer::TransferRequest;

fn adjustment(product_id: ProductId, location_id: LocationId, delta: Decimal) -> AdjustmentRequest {
    AdjustmentRequest {
        product_id,
        location_id,
        variant_id: None,
        delta,
        note: Some("cycle count".to_string()),
    }
}

#[tokio::test]
async fn test_stock_level_of_untouched_key_is_zero() {
    let fx = Fixture::new();
    let level = fx
        .service
        .stock_level(fx.org, BalanceKey::new(ProductId::new(), LocationId::new()))
        .await
        .unwrap();
    assert_eq!(level.qty_on_hand, Decimal::ZERO);
    assert_eq!(level.qty_reserved, Decimal::ZERO);
}

#[tokio::test]
async fn test_adjustment_posts_single_movement() {
    let fx = Fixture::new();
    let product = fx.product(ProductType::Stock);
    let location = fx.location("Shelf");

    let movement = fx
        .service
        .adjust_stock(fx.org, adjustment(product, location, dec!(12)))
        .await
        .unwrap();

    assert_eq!(movement.qty, dec!(12));
    assert_eq!(movement.movement_type, MovementType::Adjustment);
    assert_eq!(movement.ref_type, RefType::Adjustment);
    assert_eq!(movement.note.as_deref(), Some("cycle count"));
    assert_eq!(fx.on_hand(product, location).await, dec!(12));
}

#[tokio::test]
async fn test_tracked_products_cannot_be_adjusted_below_zero() {
    let fx = Fixture::new();
    let product = fx.product(ProductType::Stock);
    let location = fx.location("Shelf");
    fx.stock(product, location, dec!(2)).await;

    let err = fx
        .service
        .adjust_stock(fx.org, adjustment(product, location, dec!(-3)))
        .await
        .unwrap_err();
    assert!(matches!(err, StockError::InsufficientStock { available, .. } if available == dec!(2)));
    assert_eq!(fx.on_hand(product, location).await, dec!(2));
}

#[tokio::test]
async fn test_untracked_products_may_go_negative() {
    let fx = Fixture::new();
    let product = fx.product(ProductType::Service);
    let location = fx.location("Shelf");

    fx.service
        .adjust_stock(fx.org, adjustment(product, location, dec!(-3)))
        .await
        .unwrap();
    assert_eq!(fx.on_hand(product, location).await, dec!(-3));
}

#[tokio::test]
async fn test_adjustment_validation() {
    let fx = Fixture::new();
    let product = fx.product(ProductType::Stock);
    let location = fx.location("Shelf");

    let err = fx
        .service
        .adjust_stock(fx.org, adjustment(product, location, Decimal::ZERO))
        .await
        .unwrap_err();
    assert!(matches!(err, StockError::ZeroQuantity));

    let err = fx
        .service
        .adjust_stock(fx.org, adjustment(ProductId::new(), location, dec!(1)))
        .await
        .unwrap_err();
    assert!(matches!(err, StockError::ProductNotFound(_)));

    let err = fx
        .service
        .adjust_stock(fx.org, adjustment(product, LocationId::new(), dec!(1)))
        .await
        .unwrap_err();
    assert!(matches!(err, StockError::LocationNotFound(_)));
}

#[tokio::test]
async fn test_reconcile_detects_drift() {
    let fx = Fixture::new();
    let product = fx.product(ProductType::Stock);
    let location = fx.location("Shelf");
    let key = BalanceKey::new(product, location);
    fx.stock(product, location, dec!(8)).await;
    fx.service
        .adjust_stock(fx.org, adjustment(product, location, dec!(-1)))
        .await
        .unwrap();

    let report = fx.service.reconcile(fx.org, key).await.unwrap();
    assert!(report.consistent);
    assert_eq!(report.ledger_qty, dec!(7));
    assert_eq!(report.cached_qty, dec!(7));

    fx.store.force_cached_qty(fx.org, key, dec!(9));
    let report = fx.service.reconcile(fx.org, key).await.unwrap();
    assert!(!report.consistent);
    assert_eq!(report.drift(), dec!(2));
}

#[tokio::test]
async fn test_movement_history_is_filtered_and_paginated() {
    let fx = Fixture::new();
    let product = fx.product(ProductType::Stock);
    let a = fx.location("A");
    let b = fx.location("B");
    fx.stock(product, a, dec!(10)).await;

    let mut last = None;
    for _ in 0..3 {
        let outcome = fx
            .service
            .create_transfer(
                fx.org,
                TransferRequest {
                    product_id: product,
                    variant_id: None,
                    from_location_id: a,
                    to_location_id: b,
                    qty: dec!(1),
                    note: None,
                },
            )
            .await
            .unwrap();
        last = Some(outcome.ref_id);
    }

    let all = fx
        .service
        .movement_history(fx.org, &MovementFilter::default(), PageRequest::new(1, 4))
        .await
        .unwrap();
    assert_eq!(all.meta.total, 7);
    assert_eq!(all.meta.total_pages, 2);
    assert_eq!(all.data.len(), 4);
    for pair in all.data.windows(2) {
        assert!(pair[0].created_at >= pair[1].created_at);
    }

    let at_b = MovementFilter {
        location_id: Some(b),
        ..MovementFilter::default()
    };
    let page = fx
        .service
        .movement_history(fx.org, &at_b, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.meta.total, 3);
    assert!(page.data.iter().all(|m| m.qty == dec!(1)));

    let by_ref = fx
        .service
        .movement_history(
            fx.org,
            &MovementFilter::for_ref(last.unwrap()),
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(by_ref.meta.total, 2);
}

#[tokio::test]
async fn test_key_history_agrees_with_reconciliation_per_variant() {
    let fx = Fixture::new();
    let product = fx.product(ProductType::Stock);
    let shelf = fx.location("Shelf");
    let variant = VariantId::new();
    fx.service
        .adjust_stock(fx.org, adjustment(product, shelf, dec!(4)))
        .await
        .unwrap();
    fx.service
        .adjust_stock(
            fx.org,
            AdjustmentRequest {
                variant_id: Some(variant),
                ..adjustment(product, shelf, dec!(9))
            },
        )
        .await
        .unwrap();

    for (key, expected) in [
        (BalanceKey::new(product, shelf), dec!(4)),
        (BalanceKey::new(product, shelf).with_variant(variant), dec!(9)),
    ] {
        let history = fx
            .service
            .movement_history(fx.org, &MovementFilter::for_key(&key), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(history.meta.total, 1);
        assert_eq!(history.data[0].qty, expected);
        let reconciliation = fx.service.reconcile(fx.org, key).await.unwrap();
        assert_eq!(reconciliation.ledger_qty, expected);
    }
}

#[tokio::test]
async fn test_inventory_valuation_uses_average_cost() {
    let fx = Fixture::new();
    let widget = fx.product(ProductType::Stock);
    let gadget = fx.product(ProductType::Stock);

    let first = fx.purchase_order(&[(Some(widget), dec!(10), dec!(2))]);
    let second = fx.purchase_order(&[(Some(widget), dec!(10), dec!(4)), (Some(gadget), dec!(1), dec!(7))]);
    fx.service.receive_purchase_order(fx.org, first).await.unwrap();
    fx.service.receive_purchase_order(fx.org, second).await.unwrap();

    assert_eq!(fx.service.average_cost(fx.org, widget).await.unwrap(), dec!(3));
    assert_eq!(fx.service.average_cost(fx.org, ProductId::new()).await.unwrap(), Decimal::ZERO);

    let valuation = fx.service.inventory_valuation(fx.org).await.unwrap();
    assert_eq!(valuation.rows.len(), 2);
    let widget_row = valuation.rows.iter().find(|r| r.product_id == widget).unwrap();
    assert_eq!(widget_row.qty_on_hand, dec!(20));
    assert_eq!(widget_row.unit_cost, dec!(3));
    assert_eq!(widget_row.value, dec!(60));
    assert_eq!(valuation.total_value, dec!(67));

    for pair in valuation.rows.windows(2) {
        assert!((pair[0].product_id, pair[0].location_id) <= (pair[1].product_id, pair[1].location_id));
    }
}

#[tokio::test]
async fn test_valuation_rounds_value_once() {
    let fx = Fixture::new();
    let product = fx.product(ProductType::Stock);
    let paid = fx.purchase_order(&[(Some(product), dec!(1), dec!(1))]);
    let free = fx.purchase_order(&[(Some(product), dec!(2), dec!(0))]);
    fx.service.receive_purchase_order(fx.org, paid).await.unwrap();
    fx.service.receive_purchase_order(fx.org, free).await.unwrap();

    let valuation = fx.service.inventory_valuation(fx.org).await.unwrap();
    let row = &valuation.rows[0];
    assert_eq!(row.qty_on_hand, dec!(3));
    assert_eq!(row.unit_cost, dec!(0.3333));
    // 3 x 1/3, not 3 x 0.3333.
    assert_eq!(row.value, dec!(1));
}

#[tokio::test]
async fn test_cancelled_orders_count_toward_average_cost() {
    let fx = Fixture::new();
    let product = fx.product(ProductType::Stock);
    fx.purchase_order(&[(Some(product), dec!(10), dec!(2))]);
    fx.purchase_order_on(
        date(2026, 1, 1),
        PurchaseOrderStatus::Cancelled,
        &[(Some(product), dec!(10), dec!(4))],
    );

    assert_eq!(fx.service.average_cost(fx.org, product).await.unwrap(), dec!(3));
}

#[tokio::test]
async fn test_stock_levels_lists_every_balance() {
    let fx = Fixture::new();
    let product = fx.product(ProductType::Stock);
    let a = fx.location("A");
    let b = fx.location("B");
    fx.stock(product, a, dec!(1)).await;
    fx.stock(product, b, dec!(2)).await;

    let levels = fx.service.stock_levels(fx.org).await.unwrap();
    assert_eq!(levels.len(), 2);
    let total: Decimal = levels.iter().map(|b| b.qty_on_hand).sum();
    assert_eq!(total, dec!(3));
}

#[tokio::test]
async fn test_report_generator_reads_in_memory_store() {
    use crate::reports::{
        DateRange, InvoiceRecord, PaymentRecord, RentalAsset, RentalAssetStatus, ReportError,
        ReportGenerator,
    };

    let fx = Fixture::new();
    let product = fx.product(ProductType::Stock);
    let generator = ReportGenerator::new(fx.store.clone());
    let range = DateRange::new(date(2026, 1, 1), date(2026, 1, 31)).unwrap();

    fx.store.add_invoice(fx.org, InvoiceRecord { issued_on: date(2026, 1, 3), total: dec!(500) });
    fx.store.add_invoice(fx.org, InvoiceRecord { issued_on: date(2026, 2, 3), total: dec!(900) });
    fx.store.add_payment(fx.org, PaymentRecord { paid_on: date(2026, 1, 20), amount: dec!(200) });
    fx.purchase_order(&[(Some(product), dec!(10), dec!(12))]);
    fx.purchase_order_on(
        date(2026, 1, 10),
        PurchaseOrderStatus::Cancelled,
        &[(Some(product), dec!(1), dec!(80))],
    );

    // Cancelled orders still count toward cost of goods.
    let pl = generator.profit_loss(fx.org, range).await.unwrap();
    assert_eq!(pl.revenue, dec!(500));
    assert_eq!(pl.cost_of_goods, dec!(200));
    assert_eq!(pl.profit, dec!(300));

    let series = generator.revenue_series(fx.org, range, 4).await.unwrap();
    assert_eq!(series.invoices.total(), dec!(500));
    assert_eq!(series.payments.total(), dec!(200));
    assert_eq!(series.invoice_summary.peak_bucket, Some(0));

    let err = generator.stock_activity(fx.org, range, 0).await.unwrap_err();
    assert!(matches!(err, ReportError::InvalidBucketCount));

    for status in [
        RentalAssetStatus::Rented,
        RentalAssetStatus::Available,
        RentalAssetStatus::Retired,
    ] {
        fx.store.add_rental_asset(fx.org, RentalAsset { product_id: product, status });
    }
    let utilization = generator.rental_utilization(fx.org).await.unwrap();
    assert_eq!(utilization.total, 3);
    assert_eq!(utilization.utilization, dec!(0.5));
}
