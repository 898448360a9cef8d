//! Catalog domain types.

use serde::{Deserialize, Serialize};
use stockroom_shared::types::{LocationId, OrganizationId, ProductId};

/// Product classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    /// Plain stocked goods.
    Stock,
    /// Goods tracked by serial number.
    Serialized,
    /// Goods with an expiry.
    Perishable,
    /// Goods rented out rather than sold.
    RentalAsset,
    /// Non-physical service; never holds stock.
    Service,
}

impl ProductType {
    /// Whether products of this type track inventory unless configured otherwise.
    #[must_use]
    pub fn tracks_inventory_by_default(self) -> bool {
        !matches!(self, Self::Service)
    }
}

/// A product as seen by the stock ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product ID.
    pub id: ProductId,
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// Display name.
    pub name: String,
    /// Stock keeping unit.
    pub sku: String,
    /// Product classification.
    pub product_type: ProductType,
    /// Whether on-hand quantities are tracked for this product.
    pub tracks_inventory: bool,
    /// Whether the product is active.
    pub is_active: bool,
}

/// Location classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationType {
    /// Warehouse.
    Warehouse,
    /// Retail store.
    Store,
    /// Vehicle.
    Truck,
    /// Anything else.
    Other,
}

/// A place where stock is held.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Location ID.
    pub id: LocationId,
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// Display name.
    pub name: String,
    /// Location classification.
    pub location_type: LocationType,
    /// Receipts land here when no location is given. At most one per organization.
    pub is_default: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_services_do_not_track_inventory_by_default() {
        assert!(!ProductType::Service.tracks_inventory_by_default());
        assert!(ProductType::Stock.tracks_inventory_by_default());
        assert!(ProductType::Serialized.tracks_inventory_by_default());
        assert!(ProductType::Perishable.tracks_inventory_by_default());
        assert!(ProductType::RentalAsset.tracks_inventory_by_default());
    }

    #[test]
    fn test_product_type_serde_names() {
        assert_eq!(
            serde_json_name(ProductType::RentalAsset),
            "\"rental_asset\""
        );
        assert_eq!(serde_json_name(LocationType::Truck), "\"truck\"");
    }

    fn serde_json_name<T: Serialize>(value: T) -> String {
        serde_json::to_string(&value).unwrap()
    }
}
