//! Catalog storage port.

use async_trait::async_trait;
use stockroom_shared::types::{LocationId, OrganizationId, ProductId};

use super::types::{Location, Product};
use crate::ledger::StockError;

/// Read access to products and locations.
///
/// Implemented by the database layer and by [`crate::memory::InMemoryStore`].
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Finds a product by ID within an organization.
    async fn find_product(
        &self,
        organization_id: OrganizationId,
        product_id: ProductId,
    ) -> Result<Option<Product>, StockError>;

    /// Finds a location by ID within an organization.
    async fn find_location(
        &self,
        organization_id: OrganizationId,
        location_id: LocationId,
    ) -> Result<Option<Location>, StockError>;

    /// Returns the organization's default location, creating a warehouse named
    /// `name` if none exists.
    ///
    /// Must be idempotent under concurrent callers: every caller observes the
    /// same default location.
    async fn ensure_default_location(
        &self,
        organization_id: OrganizationId,
        name: &str,
    ) -> Result<Location, StockError>;
}
