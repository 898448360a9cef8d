//! Inventory facade.
//!
//! Wires the store ports into the coordinators and exposes the operations the
//! application calls.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Deserialize;
use stockroom_shared::LedgerConfig;
use stockroom_shared::types::{
    LocationId, OrganizationId, PageRequest, PageResponse, ProductId, PurchaseOrderId, VariantId,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::catalog::CatalogStore;
use crate::ledger::{
    BalanceKey, LedgerStore, MovementEntry, MovementFilter, MovementRecorder, MovementType,
    Reconciliation, RefType, StockBalance, StockError, StockLevel, StockMovement,
};
use crate::memory::InMemoryStore;
use crate::receiving::{PurchasingStore, ReceiptOutcome, ReceivingService};
use crate::transfer::{TransferOutcome, TransferRequest, TransferService};
use crate::valuation::{InventoryValuation, ValuationEngine};

/// Storage handles injected into the inventory components.
#[derive(Clone)]
pub struct StoreHandles {
    /// Products and locations.
    pub catalog: Arc<dyn CatalogStore>,
    /// Balances and movements.
    pub ledger: Arc<dyn LedgerStore>,
    /// Purchase orders and receipts.
    pub purchasing: Arc<dyn PurchasingStore>,
}

impl StoreHandles {
    /// Uses one in-memory store for every port.
    #[must_use]
    pub fn in_memory(store: &Arc<InMemoryStore>) -> Self {
        Self {
            catalog: store.clone(),
            ledger: store.clone(),
            purchasing: store.clone(),
        }
    }
}

/// Request to correct the on-hand quantity of one balance.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AdjustmentRequest {
    /// Product.
    pub product_id: ProductId,
    /// Location.
    pub location_id: LocationId,
    /// Variant, if any.
    #[serde(default)]
    pub variant_id: Option<VariantId>,
    /// Signed change; must not be zero.
    pub delta: Decimal,
    /// Reason for the adjustment.
    #[serde(default)]
    pub note: Option<String>,
}

impl AdjustmentRequest {
    fn key(&self) -> BalanceKey {
        let key = BalanceKey::new(self.product_id, self.location_id);
        match self.variant_id {
            Some(variant_id) => key.with_variant(variant_id),
            None => key,
        }
    }
}

/// Inventory operations for one storage backend.
#[derive(Clone)]
pub struct InventoryService {
    catalog: Arc<dyn CatalogStore>,
    ledger: Arc<dyn LedgerStore>,
    recorder: MovementRecorder,
    transfers: TransferService,
    receiving: ReceivingService,
    valuation: ValuationEngine,
}

impl InventoryService {
    /// Builds the service from storage handles and ledger settings.
    #[must_use]
    pub fn new(stores: StoreHandles, config: &LedgerConfig) -> Self {
        let recorder = MovementRecorder::new(stores.ledger.clone(), config.max_commit_attempts);
        Self {
            transfers: TransferService::new(stores.catalog.clone(), recorder.clone()),
            receiving: ReceivingService::new(
                stores.catalog.clone(),
                stores.purchasing.clone(),
                recorder.clone(),
                config.default_location_name.clone(),
            ),
            valuation: ValuationEngine::new(stores.ledger.clone(), stores.purchasing),
            catalog: stores.catalog,
            ledger: stores.ledger,
            recorder,
        }
    }

    /// Moves stock between two locations.
    pub async fn create_transfer(
        &self,
        organization_id: OrganizationId,
        request: TransferRequest,
    ) -> Result<TransferOutcome, StockError> {
        self.transfers.create_transfer(organization_id, request).await
    }

    /// Quantities for one key; zero if nothing has moved yet.
    pub async fn stock_level(
        &self,
        organization_id: OrganizationId,
        key: BalanceKey,
    ) -> Result<StockLevel, StockError> {
        self.recorder.balance(organization_id, &key).await
    }

    /// Every balance of an organization.
    pub async fn stock_levels(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Vec<StockBalance>, StockError> {
        self.ledger.list_balances(organization_id).await
    }

    /// Receives a purchase order into the default location.
    pub async fn receive_purchase_order(
        &self,
        organization_id: OrganizationId,
        purchase_order_id: PurchaseOrderId,
    ) -> Result<ReceiptOutcome, StockError> {
        self.receiving
            .receive_purchase_order(organization_id, purchase_order_id)
            .await
    }

    /// Values every balance at its product's weighted-average cost.
    pub async fn inventory_valuation(
        &self,
        organization_id: OrganizationId,
    ) -> Result<InventoryValuation, StockError> {
        self.valuation.inventory_valuation(organization_id).await
    }

    /// Weighted-average unit cost of a product.
    pub async fn average_cost(
        &self,
        organization_id: OrganizationId,
        product_id: ProductId,
    ) -> Result<Decimal, StockError> {
        self.valuation.average_cost(organization_id, product_id).await
    }

    /// Posts a single adjustment movement.
    ///
    /// Products that track inventory cannot be adjusted below zero; other
    /// products may go negative.
    ///
    /// # Errors
    ///
    /// - `ZeroQuantity` if `delta` is zero
    /// - `ProductNotFound`, `LocationNotFound`
    /// - `InsufficientStock` if a tracked product would go negative
    #[instrument(skip(self))]
    pub async fn adjust_stock(
        &self,
        organization_id: OrganizationId,
        request: AdjustmentRequest,
    ) -> Result<StockMovement, StockError> {
        if request.delta.is_zero() {
            return Err(StockError::ZeroQuantity);
        }
        let product = self
            .catalog
            .find_product(organization_id, request.product_id)
            .await?
            .ok_or(StockError::ProductNotFound(request.product_id))?;
        self.catalog
            .find_location(organization_id, request.location_id)
            .await?
            .ok_or(StockError::LocationNotFound(request.location_id))?;

        let mut entry = MovementEntry::new(
            request.key(),
            request.delta,
            MovementType::Adjustment,
            RefType::Adjustment,
            Uuid::now_v7(),
        );
        if product.tracks_inventory {
            entry = entry.with_floor(Decimal::ZERO);
        }
        if let Some(note) = request.note {
            entry = entry.with_note(note);
        }

        let movement = self
            .recorder
            .post(organization_id, vec![entry])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StockError::Persistence("adjustment produced no movement".to_string()))?;

        info!(
            movement_id = %movement.id,
            product_id = %request.product_id,
            location_id = %request.location_id,
            delta = %request.delta,
            "Stock adjusted"
        );
        Ok(movement)
    }

    /// Movements matching `filter`, newest first.
    pub async fn movement_history(
        &self,
        organization_id: OrganizationId,
        filter: &MovementFilter,
        page: PageRequest,
    ) -> Result<PageResponse<StockMovement>, StockError> {
        self.ledger
            .list_movements(organization_id, filter, page)
            .await
    }

    /// Compares the movement log for `key` with its cached balance.
    pub async fn reconcile(
        &self,
        organization_id: OrganizationId,
        key: BalanceKey,
    ) -> Result<Reconciliation, StockError> {
        let ledger_qty = self.ledger.movement_total(organization_id, &key).await?;
        let cached_qty = self
            .ledger
            .find_balance(organization_id, &key)
            .await?
            .map_or(Decimal::ZERO, |b| b.qty_on_hand);
        Ok(Reconciliation::new(key, ledger_qty, cached_qty))
    }
}

#[cfg(test)]
#[path = "inventory_tests.rs"]
mod tests;
