//! Repository abstractions for data access.
//!
//! Each repository implements one of the `stockroom-core` store traits on top
//! of `SeaORM`, hiding the database from the domain services.

pub mod catalog;
mod convert;
mod error;
pub mod ledger;
pub mod purchasing;
pub mod report;

pub use catalog::CatalogRepository;
pub use ledger::LedgerRepository;
pub use purchasing::PurchasingRepository;
pub use report::ReportRepository;
