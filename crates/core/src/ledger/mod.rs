//! Stock ledger.
//!
//! This module implements the authoritative on-hand quantities:
//! - Domain types for balances and immutable movements
//! - Error types for stock operations
//! - Pure posting plans with floor checks
//! - The storage port
//! - The movement recorder, the only writer of balances
//! - Replay and reconciliation of the movement log

pub mod balance;
pub mod error;
pub mod plan;
pub mod recorder;
pub mod store;
pub mod types;

#[cfg(test)]
mod recorder_props;

pub use balance::{Reconciliation, net_by_product, replay};
pub use error::{ErrorCategory, StockError};
pub use plan::PostingPlan;
pub use recorder::{DEFAULT_MAX_ATTEMPTS, MovementRecorder};
pub use store::LedgerStore;
pub use types::{
    BalanceKey, BalanceWrite, CommitBatch, MovementEntry, MovementFilter, MovementType, RefType,
    SourceDocument, StockBalance, StockLevel, StockMovement, VariantFilter,
};
