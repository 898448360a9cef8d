//! Reporting over ledger and financial records.
//!
//! This module provides:
//! - Equal-width time bucketing of dated records
//! - Series summaries
//! - Profit and loss
//! - Rental utilization
//! - Stock movement activity

pub mod error;
pub mod service;
pub mod source;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::ReportError;
pub use service::ReportService;
pub use source::{ReportGenerator, ReportSource};
pub use types::*;
