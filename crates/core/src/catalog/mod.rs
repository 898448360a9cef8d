//! Products and stock locations.
//!
//! The catalog is owned by the surrounding application; the ledger only needs
//! to look products and locations up, and to resolve the organization's default
//! receiving location.

pub mod store;
pub mod types;

pub use store::CatalogStore;
pub use types::{Location, LocationType, Product, ProductType};
