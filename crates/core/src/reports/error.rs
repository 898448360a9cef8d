//! Report error types.

use chrono::NaiveDate;
use thiserror::Error;

use crate::ledger::StockError;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Invalid date range.
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        /// Start date.
        start: NaiveDate,
        /// End date.
        end: NaiveDate,
    },

    /// Bucket count must be at least one.
    #[error("Bucket count must be at least 1")]
    InvalidBucketCount,

    /// Reading report inputs failed.
    #[error("Failed to load report data: {0}")]
    Source(#[from] StockError),
}

impl ReportError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            Self::InvalidBucketCount => "INVALID_BUCKET_COUNT",
            Self::Source(err) => err.error_code(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidDateRange { .. } | Self::InvalidBucketCount => 400,
            Self::Source(err) => err.http_status_code(),
        }
    }
}
