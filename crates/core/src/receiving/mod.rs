//! Purchase order receiving.
//!
//! Receiving a purchase order creates a receipt, copies the order lines onto
//! it, moves the order to `received`, and posts every line that names a product
//! into the organization's default location. All of it is committed as one unit.

pub mod service;
pub mod store;
pub mod types;


pub use service::{ReceiptOutcome, ReceivingService};
pub use store::PurchasingStore;
pub use types::{
    PurchaseLine, PurchaseOrder, PurchaseOrderLine, PurchaseOrderStatus, Receipt, ReceiptDocument,
    ReceiptLine,
};
