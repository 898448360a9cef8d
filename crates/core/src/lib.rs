//! Core stock ledger logic for Stockroom.
//!
//! This crate contains the inventory domain with ZERO web or database dependencies.
//! Storage is reached only through the async store traits defined here, which the
//! `stockroom-db` crate implements against PostgreSQL and [`memory`] implements in
//! process.
//!
//! # Modules
//!
//! - `catalog` - Products and stock locations
//! - `ledger` - Balances, immutable movements, and the movement recorder
//! - `transfer` - Two-location stock transfers
//! - `receiving` - Purchase order receipts
//! - `valuation` - Weighted-average cost and inventory valuation
//! - `reports` - Time-bucketed and summary reporting
//! - `inventory` - Facade bundling the operations exposed to the application
//! - `memory` - In-memory store implementation

pub mod catalog;
pub mod inventory;
pub mod ledger;
pub mod memory;
pub mod receiving;
pub mod reports;
pub mod transfer;
pub mod valuation;

#[cfg(test)]
pub(crate) mod fixtures;

pub use inventory::{AdjustmentRequest, InventoryService, StoreHandles};
pub use ledger::StockError;
