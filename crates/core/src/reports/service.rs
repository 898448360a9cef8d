//! Report generation service.
//!
//! Pure functions over already-loaded records. Output depends only on the
//! inputs, never on the clock.

use chrono::{Days, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};

use super::error::ReportError;
use super::types::{
    Bucket, DateRange, InvoiceRecord, MovementActivity, PaymentRecord, ProfitLossReport,
    RentalAsset, RentalAssetStatus, RentalUtilizationReport, RevenueSeriesReport, SeriesSummary,
    StockActivityReport, TimeSeries,
};
use crate::ledger::{MovementType, StockMovement};
use crate::receiving::PurchaseLine;

/// Decimal places for ratios and means.
const RATIO_DP: u32 = 4;

/// Service for generating reports.
pub struct ReportService;

impl ReportService {
    /// Bucket a date falls into, or `None` if it is outside `range`.
    ///
    /// `index = floor((total_days - days_from_end) * buckets / total_days)`,
    /// clamped to `buckets - 1`. A zero-length range maps everything to 0.
    #[must_use]
    pub fn bucket_index(range: &DateRange, date: NaiveDate, buckets: usize) -> Option<usize> {
        if !range.contains(date) || buckets == 0 {
            return None;
        }
        let total_days = range.total_days();
        if total_days == 0 {
            return Some(0);
        }
        let days_from_end = (range.end - date).num_days();
        let n = i64::try_from(buckets).unwrap_or(i64::MAX);
        let raw = (total_days - days_from_end).saturating_mul(n) / total_days;
        let index = usize::try_from(raw).unwrap_or(0);
        Some(index.min(buckets - 1))
    }

    /// Groups `(date, value)` records into `buckets` equal-width buckets.
    ///
    /// Records outside the range are ignored.
    ///
    /// # Errors
    ///
    /// Returns `InvalidBucketCount` if `buckets` is zero.
    pub fn bucketize<I>(range: DateRange, buckets: usize, records: I) -> Result<TimeSeries, ReportError>
    where
        I: IntoIterator<Item = (NaiveDate, Decimal)>,
    {
        if buckets == 0 {
            return Err(ReportError::InvalidBucketCount);
        }

        let mut series = TimeSeries {
            range,
            buckets: (0..buckets)
                .map(|index| {
                    let (start, end) = Self::bucket_bounds(&range, index, buckets);
                    Bucket {
                        index,
                        start,
                        end,
                        total: Decimal::ZERO,
                        count: 0,
                    }
                })
                .collect(),
        };

        for (date, value) in records {
            if let Some(index) = Self::bucket_index(&range, date, buckets) {
                let bucket = &mut series.buckets[index];
                bucket.total += value;
                bucket.count += 1;
            }
        }

        Ok(series)
    }

    /// First and last day of a bucket.
    ///
    /// Bucket `i` starts at the first day offset `d` with
    /// `floor(d * buckets / total_days) >= i`. When the range has fewer days
    /// than buckets some buckets cover no day; they report `end == start`.
    fn bucket_bounds(range: &DateRange, index: usize, buckets: usize) -> (NaiveDate, NaiveDate) {
        let first_offset = |i: usize| -> u64 {
            let total = u64::try_from(range.total_days()).unwrap_or(0);
            let i = i as u64;
            let n = buckets as u64;
            (i * total).div_ceil(n)
        };
        let start = range.start + Days::new(first_offset(index));
        let end = if index + 1 >= buckets {
            range.end
        } else {
            let next = range.start + Days::new(first_offset(index + 1));
            next.pred_opt().unwrap_or(next).max(start)
        };
        (start, end)
    }

    /// Summarizes a time series.
    #[must_use]
    pub fn summarize(series: &TimeSeries) -> SeriesSummary {
        let total = series.total();
        let count = series.count();
        let mean_per_bucket = if series.buckets.is_empty() {
            Decimal::ZERO
        } else {
            (total / Decimal::from(series.buckets.len()))
                .round_dp_with_strategy(RATIO_DP, RoundingStrategy::MidpointNearestEven)
        };
        let peak_bucket = if count == 0 {
            None
        } else {
            series
                .buckets
                .iter()
                .fold(None::<&Bucket>, |best, b| match best {
                    Some(current) if current.total >= b.total => Some(current),
                    _ => Some(b),
                })
                .map(|b| b.index)
        };

        SeriesSummary {
            total,
            count,
            mean_per_bucket,
            peak_bucket,
        }
    }

    /// Buckets invoices by issue date and payments by payment date.
    ///
    /// # Errors
    ///
    /// Returns `InvalidBucketCount` if `buckets` is zero.
    pub fn revenue_series(
        range: DateRange,
        buckets: usize,
        invoices: &[InvoiceRecord],
        payments: &[PaymentRecord],
    ) -> Result<RevenueSeriesReport, ReportError> {
        let invoices = Self::bucketize(
            range,
            buckets,
            invoices.iter().map(|i| (i.issued_on, i.total)),
        )?;
        let payments = Self::bucketize(
            range,
            buckets,
            payments.iter().map(|p| (p.paid_on, p.amount)),
        )?;

        Ok(RevenueSeriesReport {
            invoice_summary: Self::summarize(&invoices),
            payment_summary: Self::summarize(&payments),
            invoices,
            payments,
        })
    }

    /// Revenue from invoices issued in range minus the cost of purchase lines
    /// ordered in range.
    #[must_use]
    pub fn profit_loss(
        range: DateRange,
        invoices: &[InvoiceRecord],
        purchases: &[PurchaseLine],
    ) -> ProfitLossReport {
        let revenue: Decimal = invoices
            .iter()
            .filter(|i| range.contains(i.issued_on))
            .map(|i| i.total)
            .sum();
        let cost_of_goods: Decimal = purchases
            .iter()
            .filter(|p| range.contains(p.ordered_on))
            .map(PurchaseLine::line_total)
            .sum();

        ProfitLossReport {
            range,
            revenue,
            cost_of_goods,
            profit: revenue - cost_of_goods,
        }
    }

    /// Share of non-retired rental assets currently rented.
    #[must_use]
    pub fn rental_utilization(assets: &[RentalAsset]) -> RentalUtilizationReport {
        let count = |status| assets.iter().filter(|a| a.status == status).count() as u64;
        let total = assets.len() as u64;
        let rented = count(RentalAssetStatus::Rented);
        let retired = count(RentalAssetStatus::Retired);
        let usable = total - retired;

        let utilization = if usable == 0 {
            Decimal::ZERO
        } else {
            (Decimal::from(rented) / Decimal::from(usable))
                .round_dp_with_strategy(RATIO_DP, RoundingStrategy::MidpointNearestEven)
        };

        RentalUtilizationReport {
            total,
            rented,
            available: count(RentalAssetStatus::Available),
            maintenance: count(RentalAssetStatus::Maintenance),
            retired,
            utilization,
        }
    }

    /// Inbound and outbound quantities per movement type, plus the net
    /// quantity per bucket.
    ///
    /// # Errors
    ///
    /// Returns `InvalidBucketCount` if `buckets` is zero.
    pub fn stock_activity(
        range: DateRange,
        buckets: usize,
        movements: &[StockMovement],
    ) -> Result<StockActivityReport, ReportError> {
        let in_range: Vec<&StockMovement> = movements
            .iter()
            .filter(|m| range.contains(m.created_at.date_naive()))
            .collect();

        let by_type = MovementType::ALL
            .iter()
            .map(|&movement_type| {
                let mut activity = MovementActivity {
                    movement_type,
                    inbound: Decimal::ZERO,
                    outbound: Decimal::ZERO,
                    count: 0,
                };
                for m in in_range.iter().filter(|m| m.movement_type == movement_type) {
                    if m.qty.is_sign_negative() {
                        activity.outbound -= m.qty;
                    } else {
                        activity.inbound += m.qty;
                    }
                    activity.count += 1;
                }
                activity
            })
            .collect();

        let net_series = Self::bucketize(
            range,
            buckets,
            in_range.iter().map(|m| (m.created_at.date_naive(), m.qty)),
        )?;

        Ok(StockActivityReport {
            by_type,
            net_series,
        })
    }
}
