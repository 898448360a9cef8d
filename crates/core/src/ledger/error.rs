//! Stock ledger error types.
//!
//! Every error belongs to one [`ErrorCategory`]. Validation and stock errors are
//! raised before anything is written; persistence errors abort the whole batch.

use rust_decimal::Decimal;
use stockroom_shared::types::{LocationId, ProductId, PurchaseOrderId};
use thiserror::Error;

use super::types::BalanceKey;

/// Broad classification of a [`StockError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed or disallowed request.
    Validation,
    /// Requested quantity exceeds the available balance.
    InsufficientStock,
    /// A referenced record does not exist.
    NotFound,
    /// An optimistic write lost a race.
    ConcurrencyConflict,
    /// Storage failure.
    Persistence,
}

/// Errors that can occur during stock ledger operations.
#[derive(Debug, Clone, Error)]
pub enum StockError {
    // ========== Validation Errors ==========
    /// Source and destination of a transfer are the same location.
    #[error("Cannot transfer stock from location {0} to itself")]
    SameLocation(LocationId),

    /// Quantity must be strictly positive.
    #[error("Quantity must be positive, got {0}")]
    NonPositiveQuantity(Decimal),

    /// A movement entry carried a zero quantity.
    #[error("Movement quantity cannot be zero")]
    ZeroQuantity,

    /// A movement batch had no entries.
    #[error("Movement batch must contain at least one entry")]
    EmptyBatch,

    /// A required identifier was missing from the request.
    #[error("Missing required identifier: {0}")]
    MissingIdentifier(&'static str),

    /// Purchase order has already been received.
    #[error("Purchase order {0} has already been received")]
    PurchaseOrderAlreadyReceived(PurchaseOrderId),

    /// Purchase order was cancelled.
    #[error("Purchase order {0} is cancelled")]
    PurchaseOrderCancelled(PurchaseOrderId),

    /// Purchase order has no lines to receive.
    #[error("Purchase order {0} has no lines")]
    EmptyPurchaseOrder(PurchaseOrderId),

    // ========== Stock Errors ==========
    /// Not enough stock on hand at the location.
    #[error(
        "Insufficient stock for product {product_id} at location {location_id}: available {available}, requested {requested}"
    )]
    InsufficientStock {
        /// Product being moved.
        product_id: ProductId,
        /// Location being debited.
        location_id: LocationId,
        /// Quantity on hand at the time of the check.
        available: Decimal,
        /// Quantity requested.
        requested: Decimal,
    },

    // ========== Not Found Errors ==========
    /// Product not found.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// Location not found.
    #[error("Location not found: {0}")]
    LocationNotFound(LocationId),

    /// Purchase order not found.
    #[error("Purchase order not found: {0}")]
    PurchaseOrderNotFound(PurchaseOrderId),

    // ========== Concurrency Errors ==========
    /// A balance changed between read and write. Retried by the recorder.
    #[error("Balance for product {} at location {} changed concurrently", .0.product_id, .0.location_id)]
    VersionConflict(BalanceKey),

    /// Retries were exhausted without winning the race.
    #[error("Concurrent modification detected after {attempts} attempts, please retry")]
    ConcurrencyConflict {
        /// Number of commit attempts made.
        attempts: u32,
    },

    // ========== Persistence Errors ==========
    /// Storage failure.
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl StockError {
    /// Returns the category of this error.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::SameLocation(_)
            | Self::NonPositiveQuantity(_)
            | Self::ZeroQuantity
            | Self::EmptyBatch
            | Self::MissingIdentifier(_)
            | Self::PurchaseOrderAlreadyReceived(_)
            | Self::PurchaseOrderCancelled(_)
            | Self::EmptyPurchaseOrder(_) => ErrorCategory::Validation,
            Self::InsufficientStock { .. } => ErrorCategory::InsufficientStock,
            Self::ProductNotFound(_) | Self::LocationNotFound(_) | Self::PurchaseOrderNotFound(_) => {
                ErrorCategory::NotFound
            }
            Self::VersionConflict(_) | Self::ConcurrencyConflict { .. } => {
                ErrorCategory::ConcurrencyConflict
            }
            Self::Persistence(_) => ErrorCategory::Persistence,
        }
    }

    /// Returns true for validation errors.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        self.category() == ErrorCategory::Validation
    }

    /// Returns true if the failed commit may succeed when re-read and retried.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::VersionConflict(_))
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::SameLocation(_) => "SAME_LOCATION",
            Self::NonPositiveQuantity(_) => "NON_POSITIVE_QUANTITY",
            Self::ZeroQuantity => "ZERO_QUANTITY",
            Self::EmptyBatch => "EMPTY_BATCH",
            Self::MissingIdentifier(_) => "MISSING_IDENTIFIER",
            Self::PurchaseOrderAlreadyReceived(_) => "PURCHASE_ORDER_ALREADY_RECEIVED",
            Self::PurchaseOrderCancelled(_) => "PURCHASE_ORDER_CANCELLED",
            Self::EmptyPurchaseOrder(_) => "EMPTY_PURCHASE_ORDER",
            Self::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            Self::ProductNotFound(_) => "PRODUCT_NOT_FOUND",
            Self::LocationNotFound(_) => "LOCATION_NOT_FOUND",
            Self::PurchaseOrderNotFound(_) => "PURCHASE_ORDER_NOT_FOUND",
            Self::VersionConflict(_) | Self::ConcurrencyConflict { .. } => "CONCURRENT_MODIFICATION",
            Self::Persistence(_) => "PERSISTENCE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self.category() {
            ErrorCategory::Validation => 400,
            ErrorCategory::NotFound => 404,
            ErrorCategory::ConcurrencyConflict => 409,
            ErrorCategory::InsufficientStock => 422,
            ErrorCategory::Persistence => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn insufficient() -> StockError {
        StockError::InsufficientStock {
            product_id: ProductId::new(),
            location_id: LocationId::new(),
            available: dec!(5),
            requested: dec!(8),
        }
    }

    #[test]
    fn test_categories() {
        assert!(StockError::SameLocation(LocationId::new()).is_validation());
        assert!(StockError::NonPositiveQuantity(dec!(0)).is_validation());
        assert!(StockError::PurchaseOrderAlreadyReceived(PurchaseOrderId::new()).is_validation());
        assert_eq!(insufficient().category(), ErrorCategory::InsufficientStock);
        assert_eq!(
            StockError::ProductNotFound(ProductId::new()).category(),
            ErrorCategory::NotFound
        );
        assert_eq!(
            StockError::ConcurrencyConflict { attempts: 5 }.category(),
            ErrorCategory::ConcurrencyConflict
        );
        assert_eq!(
            StockError::Persistence("disk".to_string()).category(),
            ErrorCategory::Persistence
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(StockError::EmptyBatch.http_status_code(), 400);
        assert_eq!(insufficient().http_status_code(), 422);
        assert_eq!(
            StockError::LocationNotFound(LocationId::new()).http_status_code(),
            404
        );
        assert_eq!(
            StockError::ConcurrencyConflict { attempts: 3 }.http_status_code(),
            409
        );
        assert_eq!(StockError::Persistence(String::new()).http_status_code(), 500);
    }

    #[test]
    fn test_only_version_conflicts_are_retryable() {
        let key = BalanceKey::new(ProductId::new(), LocationId::new());
        assert!(StockError::VersionConflict(key).is_retryable());
        assert!(!StockError::ConcurrencyConflict { attempts: 5 }.is_retryable());
        assert!(!insufficient().is_retryable());
        assert!(!StockError::Persistence(String::new()).is_retryable());
    }

    #[test]
    fn test_error_display() {
        let product_id = ProductId::new();
        let location_id = LocationId::new();
        let err = StockError::InsufficientStock {
            product_id,
            location_id,
            available: dec!(49),
            requested: dec!(51),
        };
        assert_eq!(
            err.to_string(),
            format!(
                "Insufficient stock for product {product_id} at location {location_id}: available 49, requested 51"
            )
        );
        assert_eq!(err.error_code(), "INSUFFICIENT_STOCK");
    }
}
