//! Weighted-average costing and inventory valuation.

pub mod engine;
pub mod types;

pub use engine::{ValuationEngine, average_cost};
pub use types::{InventoryValuation, ValuationRow};
