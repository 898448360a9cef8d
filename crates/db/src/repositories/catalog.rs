//! Catalog repository: products and locations.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use stockroom_core::StockError;
use stockroom_core::catalog::{CatalogStore, Location, LocationType, Product};
use stockroom_shared::types::{LocationId, OrganizationId, ProductId};
use tracing::info;
use uuid::Uuid;

use super::error::{is_unique_violation, persistence};
use crate::entities::{locations, products};

/// Product and location lookups.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    db: DatabaseConnection,
}

impl CatalogRepository {
    /// Creates a new catalog repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_default_location(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Option<Location>, StockError> {
        let location = locations::Entity::find()
            .filter(locations::Column::OrganizationId.eq(organization_id.into_inner()))
            .filter(locations::Column::IsDefault.eq(true))
            .one(&self.db)
            .await
            .map_err(persistence)?;
        Ok(location.map(Location::from))
    }
}

#[async_trait]
impl CatalogStore for CatalogRepository {
    async fn find_product(
        &self,
        organization_id: OrganizationId,
        product_id: ProductId,
    ) -> Result<Option<Product>, StockError> {
        let product = products::Entity::find_by_id(product_id.into_inner())
            .filter(products::Column::OrganizationId.eq(organization_id.into_inner()))
            .one(&self.db)
            .await
            .map_err(persistence)?;
        Ok(product.map(Into::into))
    }

    async fn find_location(
        &self,
        organization_id: OrganizationId,
        location_id: LocationId,
    ) -> Result<Option<Location>, StockError> {
        let location = locations::Entity::find_by_id(location_id.into_inner())
            .filter(locations::Column::OrganizationId.eq(organization_id.into_inner()))
            .one(&self.db)
            .await
            .map_err(persistence)?;
        Ok(location.map(Into::into))
    }

    /// Returns the organization's default location, creating it on first use.
    ///
    /// The partial unique index on `locations(organization_id) WHERE is_default`
    /// settles concurrent creators: the loser re-reads the winner's row.
    async fn ensure_default_location(
        &self,
        organization_id: OrganizationId,
        name: &str,
    ) -> Result<Location, StockError> {
        if let Some(existing) = self.find_default_location(organization_id).await? {
            return Ok(existing);
        }

        let location = locations::ActiveModel {
            id: Set(Uuid::now_v7()),
            organization_id: Set(organization_id.into_inner()),
            name: Set(name.to_string()),
            location_type: Set(LocationType::Warehouse.into()),
            is_default: Set(true),
            created_at: Set(Utc::now().into()),
        };

        match location.insert(&self.db).await {
            Ok(model) => {
                info!(
                    organization_id = %organization_id,
                    location_id = %model.id,
                    "Created default location"
                );
                Ok(model.into())
            }
            Err(err) if is_unique_violation(&err) => self
                .find_default_location(organization_id)
                .await?
                .ok_or_else(|| StockError::Persistence("default location vanished".to_string())),
            Err(err) => Err(persistence(err)),
        }
    }
}
