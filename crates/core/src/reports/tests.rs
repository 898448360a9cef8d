//! Tests for the reports module.

use chrono::{NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use stockroom_shared::types::{LocationId, MovementId, OrganizationId, ProductId};
use uuid::Uuid;

use super::error::ReportError;
use super::service::ReportService;
use super::types::{
    DateRange, InvoiceRecord, PaymentRecord, RentalAsset, RentalAssetStatus, TimeSeries,
};
use crate::ledger::{BalanceKey, MovementType, RefType, StockMovement};
use crate::receiving::PurchaseLine;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn range(start: NaiveDate, end: NaiveDate) -> DateRange {
    DateRange::new(start, end).unwrap()
}

fn january() -> DateRange {
    range(date(2026, 1, 1), date(2026, 1, 31))
}

fn movement(on: NaiveDate, qty: Decimal, movement_type: MovementType) -> StockMovement {
    StockMovement {
        id: MovementId::new(),
        organization_id: OrganizationId::new(),
        key: BalanceKey::new(ProductId::new(), LocationId::new()),
        qty,
        movement_type,
        ref_type: RefType::Adjustment,
        ref_id: Uuid::nil(),
        note: None,
        created_at: Utc.from_utc_datetime(&on.and_hms_opt(12, 0, 0).unwrap()),
    }
}

// ========== Date ranges ==========

#[test]
fn test_start_after_end_is_rejected() {
    let result = DateRange::new(date(2026, 2, 1), date(2026, 1, 1));
    assert!(matches!(result, Err(ReportError::InvalidDateRange { .. })));
}

#[test]
fn test_zero_buckets_is_rejected() {
    let result = ReportService::bucketize(january(), 0, std::iter::empty());
    assert!(matches!(result, Err(ReportError::InvalidBucketCount)));
}

// ========== Bucket index ==========

#[test]
fn test_bucket_index_edges() {
    let r = range(date(2026, 1, 1), date(2026, 1, 11)); // 10 days

    assert_eq!(ReportService::bucket_index(&r, date(2026, 1, 1), 5), Some(0));
    assert_eq!(ReportService::bucket_index(&r, date(2026, 1, 2), 5), Some(0));
    assert_eq!(ReportService::bucket_index(&r, date(2026, 1, 3), 5), Some(1));
    assert_eq!(ReportService::bucket_index(&r, date(2026, 1, 10), 5), Some(4));
    // The last day would be bucket N and is clamped to N - 1.
    assert_eq!(ReportService::bucket_index(&r, date(2026, 1, 11), 5), Some(4));
}

#[test]
fn test_out_of_range_dates_have_no_bucket() {
    let r = january();
    assert_eq!(ReportService::bucket_index(&r, date(2025, 12, 31), 4), None);
    assert_eq!(ReportService::bucket_index(&r, date(2026, 2, 1), 4), None);
}

#[test]
fn test_zero_length_range_uses_first_bucket() {
    let day = date(2026, 3, 15);
    let r = range(day, day);
    assert_eq!(ReportService::bucket_index(&r, day, 7), Some(0));

    let series = ReportService::bucketize(r, 3, [(day, dec!(5)), (day, dec!(7))]).unwrap();
    assert_eq!(series.buckets[0].total, dec!(12));
    assert_eq!(series.buckets[0].count, 2);
    assert_eq!(series.buckets[1].count, 0);
}

// ========== Bucketize ==========

#[test]
fn test_bucketize_ignores_out_of_range_records() {
    let series = ReportService::bucketize(
        january(),
        4,
        [
            (date(2025, 12, 31), dec!(1000)),
            (date(2026, 1, 1), dec!(10)),
            (date(2026, 1, 31), dec!(20)),
            (date(2026, 2, 1), dec!(1000)),
        ],
    )
    .unwrap();

    assert_eq!(series.total(), dec!(30));
    assert_eq!(series.count(), 2);
    assert_eq!(series.buckets[0].total, dec!(10));
    assert_eq!(series.buckets[3].total, dec!(20));
}

#[test]
fn test_bucket_bounds_tile_the_range() {
    let series = ReportService::bucketize(
        range(date(2026, 1, 1), date(2026, 1, 11)),
        5,
        std::iter::empty(),
    )
    .unwrap();

    assert_eq!(series.buckets[0].start, date(2026, 1, 1));
    assert_eq!(series.buckets[0].end, date(2026, 1, 2));
    assert_eq!(series.buckets[1].start, date(2026, 1, 3));
    assert_eq!(series.buckets[4].start, date(2026, 1, 9));
    assert_eq!(series.buckets[4].end, date(2026, 1, 11));
    for pair in series.buckets.windows(2) {
        assert_eq!(pair[0].end.succ_opt().unwrap(), pair[1].start);
    }
}

// ========== Summary ==========

#[test]
fn test_summary() {
    let series = ReportService::bucketize(
        january(),
        4,
        [
            (date(2026, 1, 2), dec!(10)),
            (date(2026, 1, 20), dec!(25)),
            (date(2026, 1, 21), dec!(5)),
        ],
    )
    .unwrap();
    let summary = ReportService::summarize(&series);

    assert_eq!(summary.total, dec!(40));
    assert_eq!(summary.count, 3);
    assert_eq!(summary.mean_per_bucket, dec!(10));
    assert_eq!(summary.peak_bucket, Some(2));
}

#[test]
fn test_summary_of_empty_series() {
    let series = ReportService::bucketize(january(), 3, std::iter::empty()).unwrap();
    let summary = ReportService::summarize(&series);
    assert_eq!(summary.total, Decimal::ZERO);
    assert_eq!(summary.peak_bucket, None);
}

#[test]
fn test_revenue_series_buckets_invoices_and_payments_separately() {
    let invoices = [
        InvoiceRecord {
            issued_on: date(2026, 1, 5),
            total: dec!(100),
        },
        InvoiceRecord {
            issued_on: date(2026, 1, 25),
            total: dec!(300),
        },
    ];
    let payments = [PaymentRecord {
        paid_on: date(2026, 1, 30),
        amount: dec!(100),
    }];

    let report = ReportService::revenue_series(january(), 2, &invoices, &payments).unwrap();
    assert_eq!(report.invoices.buckets[0].total, dec!(100));
    assert_eq!(report.invoices.buckets[1].total, dec!(300));
    assert_eq!(report.payments.buckets[1].total, dec!(100));
    assert_eq!(report.invoice_summary.total, dec!(400));
    assert_eq!(report.payment_summary.count, 1);
}

// ========== Profit and loss ==========

#[test]
fn test_profit_loss_filters_by_date() {
    let invoices = [
        InvoiceRecord {
            issued_on: date(2026, 1, 10),
            total: dec!(500),
        },
        InvoiceRecord {
            issued_on: date(2026, 2, 10),
            total: dec!(900),
        },
    ];
    let purchases = [
        PurchaseLine {
            product_id: Some(ProductId::new()),
            qty: dec!(5),
            unit_cost: dec!(10),
            ordered_on: date(2026, 1, 3),
        },
        PurchaseLine {
            product_id: None,
            qty: dec!(1),
            unit_cost: dec!(75),
            ordered_on: date(2026, 1, 31),
        },
        PurchaseLine {
            product_id: None,
            qty: dec!(1),
            unit_cost: dec!(1000),
            ordered_on: date(2025, 12, 31),
        },
    ];

    let report = ReportService::profit_loss(january(), &invoices, &purchases);
    assert_eq!(report.revenue, dec!(500));
    assert_eq!(report.cost_of_goods, dec!(125));
    assert_eq!(report.profit, dec!(375));
}

// ========== Rental utilization ==========

fn asset(status: RentalAssetStatus) -> RentalAsset {
    RentalAsset {
        product_id: ProductId::new(),
        status,
    }
}

#[test]
fn test_rental_utilization_excludes_retired() {
    let assets = [
        asset(RentalAssetStatus::Rented),
        asset(RentalAssetStatus::Available),
        asset(RentalAssetStatus::Maintenance),
        asset(RentalAssetStatus::Retired),
    ];
    let report = ReportService::rental_utilization(&assets);
    assert_eq!(report.total, 4);
    assert_eq!(report.retired, 1);
    assert_eq!(report.utilization, dec!(0.3333));
}

#[test]
fn test_rental_utilization_zero_denominator() {
    assert_eq!(
        ReportService::rental_utilization(&[]).utilization,
        Decimal::ZERO
    );
    let all_retired = [asset(RentalAssetStatus::Retired)];
    assert_eq!(
        ReportService::rental_utilization(&all_retired).utilization,
        Decimal::ZERO
    );
}

// ========== Stock activity ==========

#[test]
fn test_stock_activity() {
    let movements = [
        movement(date(2026, 1, 2), dec!(50), MovementType::Receipt),
        movement(date(2026, 1, 10), dec!(-20), MovementType::Transfer),
        movement(date(2026, 1, 10), dec!(20), MovementType::Transfer),
        movement(date(2026, 1, 28), dec!(-3), MovementType::Adjustment),
        movement(date(2026, 2, 2), dec!(-99), MovementType::Sale),
    ];

    let report = ReportService::stock_activity(january(), 2, &movements).unwrap();

    let transfer = report
        .by_type
        .iter()
        .find(|a| a.movement_type == MovementType::Transfer)
        .unwrap();
    assert_eq!(transfer.inbound, dec!(20));
    assert_eq!(transfer.outbound, dec!(20));
    assert_eq!(transfer.count, 2);

    let sale = report
        .by_type
        .iter()
        .find(|a| a.movement_type == MovementType::Sale)
        .unwrap();
    assert_eq!(sale.count, 0);

    assert_eq!(report.by_type.len(), MovementType::ALL.len());
    assert_eq!(report.net_series.total(), dec!(47));
    assert_eq!(report.net_series.buckets[0].total, dec!(50));
}

// ========== Properties ==========

fn arb_range() -> impl Strategy<Value = DateRange> {
    (0u64..400, 0u64..400).prop_map(|(offset, len)| {
        let start = date(2025, 1, 1) + chrono::Days::new(offset);
        range(start, start + chrono::Days::new(len))
    })
}

fn total_of(series: &TimeSeries) -> Decimal {
    series.buckets.iter().map(|b| b.total).sum()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Every in-range date lands in a valid bucket, and bucket indices never
    /// decrease as the date advances.
    #[test]
    fn prop_bucket_index_is_bounded_and_monotonic(
        r in arb_range(),
        buckets in 1usize..30,
    ) {
        let mut previous = 0usize;
        let mut day = r.start;
        while day <= r.end {
            let index = ReportService::bucket_index(&r, day, buckets).unwrap();
            prop_assert!(index < buckets);
            prop_assert!(index >= previous);
            previous = index;
            day = day.succ_opt().unwrap();
        }
    }

    /// Bucketing conserves the total of in-range records.
    #[test]
    fn prop_bucketize_conserves_in_range_total(
        r in arb_range(),
        buckets in 1usize..20,
        records in prop::collection::vec((0u64..900, 1i64..100_000), 0..50),
    ) {
        let records: Vec<(NaiveDate, Decimal)> = records
            .into_iter()
            .map(|(offset, cents)| (date(2024, 12, 1) + chrono::Days::new(offset), Decimal::new(cents, 2)))
            .collect();
        let expected: Decimal = records
            .iter()
            .filter(|(d, _)| r.contains(*d))
            .map(|(_, v)| *v)
            .sum();

        let series = ReportService::bucketize(r, buckets, records).unwrap();
        prop_assert_eq!(series.buckets.len(), buckets);
        prop_assert_eq!(total_of(&series), expected);
    }
}
