//! Stock transfers between locations.
//!
//! A transfer is not stored on its own: it is two movements of equal magnitude
//! and opposite sign sharing one `ref_id`, committed together.

pub mod service;


pub use service::{TransferOutcome, TransferRequest, TransferService};
