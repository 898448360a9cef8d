//! API route definitions.

pub mod health;
pub mod inventory;
pub mod receiving;
pub mod reports;

use axum::Router;

use crate::AppState;

/// Creates all API routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(inventory::routes())
        .merge(receiving::routes())
        .merge(reports::routes())
}
