//! Database error mapping.

use sea_orm::{DbErr, SqlErr};
use stockroom_core::StockError;
use tracing::error;

/// Converts a database failure into the persistence error the domain sees.
pub(crate) fn persistence(err: DbErr) -> StockError {
    error!(error = %err, "Database operation failed");
    StockError::Persistence(err.to_string())
}

/// Whether `err` is a unique-constraint violation.
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
