//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST API routes for stock, receiving, valuation and reports
//! - JSON error responses derived from the domain error taxonomy
//! - Application state wiring for PostgreSQL or in-memory storage

pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use sea_orm::DatabaseConnection;
use stockroom_core::InventoryService;
use stockroom_core::StoreHandles;
use stockroom_core::memory::InMemoryStore;
use stockroom_core::reports::ReportGenerator;
use stockroom_shared::LedgerConfig;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Inventory operations.
    pub inventory: InventoryService,
    /// Report generation.
    pub reports: ReportGenerator,
}

impl AppState {
    /// State backed by PostgreSQL.
    #[must_use]
    pub fn with_database(db: &DatabaseConnection, ledger: &LedgerConfig) -> Self {
        Self {
            inventory: InventoryService::new(stockroom_db::store_handles(db), ledger),
            reports: ReportGenerator::new(stockroom_db::report_source(db)),
        }
    }

    /// State backed by a process-local store.
    #[must_use]
    pub fn in_memory(store: &Arc<InMemoryStore>, ledger: &LedgerConfig) -> Self {
        Self {
            inventory: InventoryService::new(StoreHandles::in_memory(store), ledger),
            reports: ReportGenerator::new(store.clone()),
        }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
