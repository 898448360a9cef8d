//! Shared test fixtures.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use stockroom_shared::LedgerConfig;
use stockroom_shared::types::{
    LocationId, OrganizationId, ProductId, PurchaseOrderId, PurchaseOrderLineId,
};

use crate::catalog::{Location, LocationType, Product, ProductType};
use crate::inventory::{InventoryService, StoreHandles};
use crate::ledger::{BalanceKey, MovementEntry, MovementRecorder, MovementType, RefType};
use crate::memory::InMemoryStore;
use crate::receiving::{PurchaseOrder, PurchaseOrderLine, PurchaseOrderStatus};

/// A store with one organization, the service on top of it, and helpers.
pub struct Fixture {
    pub org: OrganizationId,
    pub store: Arc<InMemoryStore>,
    pub service: InventoryService,
}

impl Fixture {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let service = InventoryService::new(StoreHandles::in_memory(&store), &LedgerConfig::default());
        Self {
            org: OrganizationId::new(),
            store,
            service,
        }
    }

    pub fn recorder(&self) -> MovementRecorder {
        MovementRecorder::new(self.store.clone(), LedgerConfig::default().max_commit_attempts)
    }

    pub fn product(&self, product_type: ProductType) -> ProductId {
        let id = ProductId::new();
        self.store.add_product(Product {
            id,
            organization_id: self.org,
            name: format!("{product_type:?} product"),
            sku: format!("SKU-{}", &id.to_string()[..8]),
            product_type,
            tracks_inventory: product_type.tracks_inventory_by_default(),
            is_active: true,
        });
        id
    }

    pub fn location(&self, name: &str) -> LocationId {
        let id = LocationId::new();
        self.store.add_location(Location {
            id,
            organization_id: self.org,
            name: name.to_string(),
            location_type: LocationType::Warehouse,
            is_default: false,
        });
        id
    }

    /// Seeds on-hand stock through the recorder.
    pub async fn stock(&self, product_id: ProductId, location_id: LocationId, qty: Decimal) {
        self.recorder()
            .post(
                self.org,
                vec![MovementEntry::new(
                    BalanceKey::new(product_id, location_id),
                    qty,
                    MovementType::Receipt,
                    RefType::Receipt,
                    uuid::Uuid::now_v7(),
                )],
            )
            .await
            .unwrap();
    }

    /// Adds an `ordered` purchase order with `(product, qty, unit_cost)` lines.
    pub fn purchase_order(&self, lines: &[(Option<ProductId>, Decimal, Decimal)]) -> PurchaseOrderId {
        self.purchase_order_on(date(2026, 1, 15), PurchaseOrderStatus::Ordered, lines)
    }

    pub fn purchase_order_on(
        &self,
        ordered_on: NaiveDate,
        status: PurchaseOrderStatus,
        lines: &[(Option<ProductId>, Decimal, Decimal)],
    ) -> PurchaseOrderId {
        let id = PurchaseOrderId::new();
        let order = PurchaseOrder {
            id,
            organization_id: self.org,
            order_number: format!("PO-{}", &id.to_string()[..8]),
            status,
            ordered_on,
        };
        let lines = lines
            .iter()
            .enumerate()
            .map(|(i, (product_id, qty, unit_cost))| PurchaseOrderLine {
                id: PurchaseOrderLineId::new(),
                purchase_order_id: id,
                product_id: *product_id,
                description: format!("Line {}", i + 1),
                qty: *qty,
                unit_cost: *unit_cost,
            })
            .collect();
        self.store.add_purchase_order(order, lines);
        id
    }

    pub async fn on_hand(&self, product_id: ProductId, location_id: LocationId) -> Decimal {
        self.service
            .stock_level(self.org, BalanceKey::new(product_id, location_id))
            .await
            .unwrap()
            .qty_on_hand
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
