//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Repositories implementing the `stockroom-core` store traits
//! - Database migrations

pub mod entities;
pub mod migration;
pub mod repositories;

use std::sync::Arc;

pub use repositories::{
    CatalogRepository, LedgerRepository, PurchasingRepository, ReportRepository,
};

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use stockroom_core::StoreHandles;
use stockroom_core::reports::ReportSource;
use stockroom_shared::config::DatabaseConfig;

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}

/// Establishes a pooled connection using the configured limits.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect_with(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .sqlx_logging(false);
    Database::connect(options).await
}

/// Store handles backed by PostgreSQL.
#[must_use]
pub fn store_handles(db: &DatabaseConnection) -> StoreHandles {
    StoreHandles {
        catalog: Arc::new(CatalogRepository::new(db.clone())),
        ledger: Arc::new(LedgerRepository::new(db.clone())),
        purchasing: Arc::new(PurchasingRepository::new(db.clone())),
    }
}

/// Report source backed by PostgreSQL.
#[must_use]
pub fn report_source(db: &DatabaseConnection) -> Arc<dyn ReportSource> {
    Arc::new(ReportRepository::new(db.clone()))
}
