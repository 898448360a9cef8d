//! Report data types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stockroom_shared::types::ProductId;

use super::error::ReportError;
use crate::ledger::MovementType;

/// Inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First day.
    pub start: NaiveDate,
    /// Last day.
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a range.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` if `start` is after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ReportError> {
        if start > end {
            return Err(ReportError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Whether `date` falls within the range.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Number of days from start to end; zero for a single-day range.
    #[must_use]
    pub fn total_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

/// Issued invoice, as seen by reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    /// Issue date.
    pub issued_on: NaiveDate,
    /// Invoice total.
    pub total: Decimal,
}

/// Received payment, as seen by reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// Payment date.
    pub paid_on: NaiveDate,
    /// Amount paid.
    pub amount: Decimal,
}

/// Rental asset status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RentalAssetStatus {
    /// Ready to rent.
    Available,
    /// Currently rented out.
    Rented,
    /// Being serviced.
    Maintenance,
    /// Out of service permanently.
    Retired,
}

/// A rentable unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentalAsset {
    /// Product the asset is an instance of.
    pub product_id: ProductId,
    /// Current status.
    pub status: RentalAssetStatus,
}

/// One bucket of a time series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    /// Zero-based position.
    pub index: usize,
    /// First day covered.
    pub start: NaiveDate,
    /// Last day covered.
    pub end: NaiveDate,
    /// Sum of record values.
    pub total: Decimal,
    /// Number of records.
    pub count: u64,
}

/// Records grouped into equal-width buckets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSeries {
    /// Covered range.
    pub range: DateRange,
    /// Buckets in date order.
    pub buckets: Vec<Bucket>,
}

impl TimeSeries {
    /// Sum over all buckets.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.buckets.iter().map(|b| b.total).sum()
    }

    /// Record count over all buckets.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.buckets.iter().map(|b| b.count).sum()
    }
}

/// Summary statistics of a time series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesSummary {
    /// Sum over all buckets.
    pub total: Decimal,
    /// Number of records.
    pub count: u64,
    /// `total / buckets`, 4 decimal places.
    pub mean_per_bucket: Decimal,
    /// Index of the bucket with the highest total; earliest wins ties.
    /// `None` when the series holds no records.
    pub peak_bucket: Option<usize>,
}

/// Invoiced revenue and received payments over a range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevenueSeriesReport {
    /// Invoice totals per bucket.
    pub invoices: TimeSeries,
    /// Payments per bucket.
    pub payments: TimeSeries,
    /// Invoice summary.
    pub invoice_summary: SeriesSummary,
    /// Payment summary.
    pub payment_summary: SeriesSummary,
}

/// Revenue minus cost of goods over a range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitLossReport {
    /// Covered range.
    pub range: DateRange,
    /// Sum of invoice totals issued in range.
    pub revenue: Decimal,
    /// Sum of purchase line totals ordered in range.
    pub cost_of_goods: Decimal,
    /// `revenue - cost_of_goods`.
    pub profit: Decimal,
}

/// Share of usable rental assets currently rented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentalUtilizationReport {
    /// All assets.
    pub total: u64,
    /// Rented assets.
    pub rented: u64,
    /// Available assets.
    pub available: u64,
    /// Assets in maintenance.
    pub maintenance: u64,
    /// Retired assets.
    pub retired: u64,
    /// `rented / (total - retired)`, 4 decimal places; 0 when nothing is usable.
    pub utilization: Decimal,
}

/// Movement quantities of one type within a range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementActivity {
    /// Movement type.
    pub movement_type: MovementType,
    /// Sum of positive quantities.
    pub inbound: Decimal,
    /// Sum of negative quantities, as a positive number.
    pub outbound: Decimal,
    /// Number of movements.
    pub count: u64,
}

/// Movement activity over a range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockActivityReport {
    /// One row per movement type, in [`MovementType::ALL`] order.
    pub by_type: Vec<MovementActivity>,
    /// Net quantity moved per bucket.
    pub net_series: TimeSeries,
}
