//! `SeaORM` entity definitions.

pub mod invoices;
pub mod locations;
pub mod organizations;
pub mod payments;
pub mod products;
pub mod purchase_order_lines;
pub mod purchase_orders;
pub mod receipt_lines;
pub mod receipts;
pub mod rental_assets;
pub mod sea_orm_active_enums;
pub mod stock_balances;
pub mod stock_movements;
