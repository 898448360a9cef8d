//! In-memory store.
//!
//! Implements every storage port over process memory. `commit` runs under one
//! mutex and checks balance versions and purchase order status exactly like
//! the database does, so concurrency behaviour can be tested without
//! PostgreSQL. Used by tests and by the development server.

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use stockroom_shared::types::{
    LocationId, OrganizationId, PageRequest, PageResponse, ProductId, PurchaseOrderId,
};

use crate::catalog::{CatalogStore, Location, LocationType, Product};
use crate::ledger::{
    BalanceKey, CommitBatch, LedgerStore, MovementFilter, SourceDocument, StockBalance,
    StockError, StockMovement,
};
use crate::receiving::{
    PurchaseLine, PurchaseOrder, PurchaseOrderLine, PurchaseOrderStatus, PurchasingStore, Receipt,
    ReceiptLine,
};
use crate::reports::{DateRange, InvoiceRecord, PaymentRecord, RentalAsset, ReportSource};

#[derive(Default)]
struct State {
    products: BTreeMap<ProductId, Product>,
    locations: BTreeMap<LocationId, Location>,
    balances: BTreeMap<(OrganizationId, BalanceKey), StockBalance>,
    movements: Vec<StockMovement>,
    purchase_orders: BTreeMap<PurchaseOrderId, PurchaseOrder>,
    purchase_order_lines: Vec<PurchaseOrderLine>,
    receipts: Vec<(Receipt, Vec<ReceiptLine>)>,
    invoices: Vec<(OrganizationId, InvoiceRecord)>,
    payments: Vec<(OrganizationId, PaymentRecord)>,
    rental_assets: Vec<(OrganizationId, RentalAsset)>,
    fail_next_commit: bool,
    injected_conflicts: u32,
}

impl State {
    fn order(
        &self,
        organization_id: OrganizationId,
        purchase_order_id: PurchaseOrderId,
    ) -> Option<&PurchaseOrder> {
        self.purchase_orders
            .get(&purchase_order_id)
            .filter(|po| po.organization_id == organization_id)
    }

    fn history(&self, organization_id: OrganizationId) -> impl Iterator<Item = PurchaseLine> + '_ {
        self.purchase_order_lines.iter().filter_map(move |line| {
            let order = self.order(organization_id, line.purchase_order_id)?;
            Some(PurchaseLine {
                product_id: line.product_id,
                qty: line.qty,
                unit_cost: line.unit_cost,
                ordered_on: order.ordered_on,
            })
        })
    }

    /// Checks everything a batch depends on without writing.
    fn check(&self, batch: &CommitBatch) -> Result<(), StockError> {
        if let Some(SourceDocument::Receipt(doc)) = &batch.document {
            let po_id = doc.receipt.purchase_order_id;
            let order = self
                .order(batch.organization_id, po_id)
                .ok_or(StockError::PurchaseOrderNotFound(po_id))?;
            if order.status != doc.expected_status {
                return Err(match order.status {
                    PurchaseOrderStatus::Cancelled => StockError::PurchaseOrderCancelled(po_id),
                    _ => StockError::PurchaseOrderAlreadyReceived(po_id),
                });
            }
        }
        for write in &batch.balances {
            let current = self
                .balances
                .get(&(batch.organization_id, write.key))
                .map(|b| b.version);
            if current != write.expected_version {
                return Err(StockError::VersionConflict(write.key));
            }
        }
        Ok(())
    }
}

/// Process-local implementation of every store port.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a product.
    pub fn add_product(&self, product: Product) {
        self.state.lock().products.insert(product.id, product);
    }

    /// Adds or replaces a location.
    pub fn add_location(&self, location: Location) {
        self.state.lock().locations.insert(location.id, location);
    }

    /// Adds a purchase order with its lines.
    pub fn add_purchase_order(&self, order: PurchaseOrder, lines: Vec<PurchaseOrderLine>) {
        let mut state = self.state.lock();
        state.purchase_orders.insert(order.id, order);
        state.purchase_order_lines.extend(lines);
    }

    /// Adds an invoice record.
    pub fn add_invoice(&self, organization_id: OrganizationId, invoice: InvoiceRecord) {
        self.state.lock().invoices.push((organization_id, invoice));
    }

    /// Adds a payment record.
    pub fn add_payment(&self, organization_id: OrganizationId, payment: PaymentRecord) {
        self.state.lock().payments.push((organization_id, payment));
    }

    /// Adds a rental asset.
    pub fn add_rental_asset(&self, organization_id: OrganizationId, asset: RentalAsset) {
        self.state.lock().rental_assets.push((organization_id, asset));
    }

    /// Every movement of an organization in commit order.
    #[must_use]
    pub fn all_movements(&self, organization_id: OrganizationId) -> Vec<StockMovement> {
        self.state
            .lock()
            .movements
            .iter()
            .filter(|m| m.organization_id == organization_id)
            .cloned()
            .collect()
    }

    /// Every receipt of an organization.
    #[must_use]
    pub fn receipts(&self, organization_id: OrganizationId) -> Vec<Receipt> {
        self.state
            .lock()
            .receipts
            .iter()
            .filter(|(r, _)| r.organization_id == organization_id)
            .map(|(r, _)| r.clone())
            .collect()
    }

    /// Current status of a purchase order.
    #[must_use]
    pub fn purchase_order_status(
        &self,
        purchase_order_id: PurchaseOrderId,
    ) -> Option<PurchaseOrderStatus> {
        self.state
            .lock()
            .purchase_orders
            .get(&purchase_order_id)
            .map(|po| po.status)
    }

    /// Makes the next commit fail with a persistence error.
    pub fn fail_next_commit(&self) {
        self.state.lock().fail_next_commit = true;
    }

    /// Makes the next `count` commits that write balances lose their version race.
    pub fn inject_conflicts(&self, count: u32) {
        self.state.lock().injected_conflicts = count;
    }

    /// Overwrites a cached on-hand quantity without touching the movement log
    /// or the version. Only useful for exercising reconciliation.
    pub fn force_cached_qty(&self, organization_id: OrganizationId, key: BalanceKey, qty: Decimal) {
        if let Some(balance) = self.state.lock().balances.get_mut(&(organization_id, key)) {
            balance.qty_on_hand = qty;
        }
    }
}

#[async_trait]
impl CatalogStore for InMemoryStore {
    async fn find_product(
        &self,
        organization_id: OrganizationId,
        product_id: ProductId,
    ) -> Result<Option<Product>, StockError> {
        Ok(self
            .state
            .lock()
            .products
            .get(&product_id)
            .filter(|p| p.organization_id == organization_id)
            .cloned())
    }

    async fn find_location(
        &self,
        organization_id: OrganizationId,
        location_id: LocationId,
    ) -> Result<Option<Location>, StockError> {
        Ok(self
            .state
            .lock()
            .locations
            .get(&location_id)
            .filter(|l| l.organization_id == organization_id)
            .cloned())
    }

    async fn ensure_default_location(
        &self,
        organization_id: OrganizationId,
        name: &str,
    ) -> Result<Location, StockError> {
        let mut state = self.state.lock();
        if let Some(existing) = state
            .locations
            .values()
            .find(|l| l.organization_id == organization_id && l.is_default)
        {
            return Ok(existing.clone());
        }
        let location = Location {
            id: LocationId::new(),
            organization_id,
            name: name.to_string(),
            location_type: LocationType::Warehouse,
            is_default: true,
        };
        state.locations.insert(location.id, location.clone());
        Ok(location)
    }
}

#[async_trait]
impl LedgerStore for InMemoryStore {
    async fn find_balance(
        &self,
        organization_id: OrganizationId,
        key: &BalanceKey,
    ) -> Result<Option<StockBalance>, StockError> {
        Ok(self
            .state
            .lock()
            .balances
            .get(&(organization_id, *key))
            .cloned())
    }

    async fn find_balances(
        &self,
        organization_id: OrganizationId,
        keys: &[BalanceKey],
    ) -> Result<BTreeMap<BalanceKey, StockBalance>, StockError> {
        let state = self.state.lock();
        Ok(keys
            .iter()
            .filter_map(|key| {
                state
                    .balances
                    .get(&(organization_id, *key))
                    .map(|b| (*key, b.clone()))
            })
            .collect())
    }

    async fn list_balances(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Vec<StockBalance>, StockError> {
        Ok(self
            .state
            .lock()
            .balances
            .iter()
            .filter(|((org, _), _)| *org == organization_id)
            .map(|(_, b)| b.clone())
            .collect())
    }

    async fn list_movements(
        &self,
        organization_id: OrganizationId,
        filter: &MovementFilter,
        page: PageRequest,
    ) -> Result<PageResponse<StockMovement>, StockError> {
        let state = self.state.lock();
        let mut matching: Vec<&StockMovement> = state
            .movements
            .iter()
            .filter(|m| m.organization_id == organization_id && filter.matches(m))
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = matching.len() as u64;
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(page.limit()).unwrap_or(usize::MAX);
        let data = matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();
        Ok(PageResponse::new(data, page.page, page.per_page, total))
    }

    async fn movement_total(
        &self,
        organization_id: OrganizationId,
        key: &BalanceKey,
    ) -> Result<Decimal, StockError> {
        Ok(self
            .state
            .lock()
            .movements
            .iter()
            .filter(|m| m.organization_id == organization_id && m.key == *key)
            .map(|m| m.qty)
            .sum())
    }

    async fn commit(&self, batch: CommitBatch) -> Result<(), StockError> {
        let mut state = self.state.lock();

        if state.fail_next_commit {
            state.fail_next_commit = false;
            return Err(StockError::Persistence("injected commit failure".to_string()));
        }
        if state.injected_conflicts > 0
            && let Some(first) = batch.balances.first()
        {
            state.injected_conflicts -= 1;
            return Err(StockError::VersionConflict(first.key));
        }

        state.check(&batch)?;

        let organization_id = batch.organization_id;
        for write in batch.balances {
            let balance = StockBalance {
                organization_id,
                key: write.key,
                qty_on_hand: write.qty_on_hand,
                qty_reserved: write.qty_reserved,
                version: write.new_version(),
                updated_at: batch.committed_at,
            };
            state.balances.insert((organization_id, write.key), balance);
        }
        state.movements.extend(batch.movements);

        if let Some(SourceDocument::Receipt(doc)) = batch.document {
            if let Some(order) = state.purchase_orders.get_mut(&doc.receipt.purchase_order_id) {
                order.status = PurchaseOrderStatus::Received;
            }
            state.receipts.push((doc.receipt, doc.lines));
        }

        Ok(())
    }
}

#[async_trait]
impl PurchasingStore for InMemoryStore {
    async fn find_purchase_order(
        &self,
        organization_id: OrganizationId,
        purchase_order_id: PurchaseOrderId,
    ) -> Result<Option<PurchaseOrder>, StockError> {
        Ok(self
            .state
            .lock()
            .order(organization_id, purchase_order_id)
            .cloned())
    }

    async fn purchase_order_lines(
        &self,
        organization_id: OrganizationId,
        purchase_order_id: PurchaseOrderId,
    ) -> Result<Vec<PurchaseOrderLine>, StockError> {
        let state = self.state.lock();
        if state.order(organization_id, purchase_order_id).is_none() {
            return Ok(Vec::new());
        }
        Ok(state
            .purchase_order_lines
            .iter()
            .filter(|l| l.purchase_order_id == purchase_order_id)
            .cloned()
            .collect())
    }

    async fn purchase_history(
        &self,
        organization_id: OrganizationId,
        product_id: Option<ProductId>,
    ) -> Result<Vec<PurchaseLine>, StockError> {
        Ok(self
            .state
            .lock()
            .history(organization_id)
            .filter(|l| product_id.is_none() || l.product_id == product_id)
            .collect())
    }

    async fn find_receipt_for_order(
        &self,
        organization_id: OrganizationId,
        purchase_order_id: PurchaseOrderId,
    ) -> Result<Option<(Receipt, Vec<ReceiptLine>)>, StockError> {
        Ok(self
            .state
            .lock()
            .receipts
            .iter()
            .find(|(r, _)| {
                r.organization_id == organization_id && r.purchase_order_id == purchase_order_id
            })
            .cloned())
    }
}

#[async_trait]
impl ReportSource for InMemoryStore {
    async fn invoices(
        &self,
        organization_id: OrganizationId,
        range: DateRange,
    ) -> Result<Vec<InvoiceRecord>, StockError> {
        Ok(self
            .state
            .lock()
            .invoices
            .iter()
            .filter(|(org, i)| *org == organization_id && range.contains(i.issued_on))
            .map(|(_, i)| i.clone())
            .collect())
    }

    async fn payments(
        &self,
        organization_id: OrganizationId,
        range: DateRange,
    ) -> Result<Vec<PaymentRecord>, StockError> {
        Ok(self
            .state
            .lock()
            .payments
            .iter()
            .filter(|(org, p)| *org == organization_id && range.contains(p.paid_on))
            .map(|(_, p)| p.clone())
            .collect())
    }

    async fn purchase_lines(
        &self,
        organization_id: OrganizationId,
        range: DateRange,
    ) -> Result<Vec<PurchaseLine>, StockError> {
        Ok(self
            .state
            .lock()
            .history(organization_id)
            .filter(|l| range.contains(l.ordered_on))
            .collect())
    }

    async fn rental_assets(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Vec<RentalAsset>, StockError> {
        Ok(self
            .state
            .lock()
            .rental_assets
            .iter()
            .filter(|(org, _)| *org == organization_id)
            .map(|(_, a)| a.clone())
            .collect())
    }

    async fn movements(
        &self,
        organization_id: OrganizationId,
        range: DateRange,
    ) -> Result<Vec<StockMovement>, StockError> {
        Ok(self
            .state
            .lock()
            .movements
            .iter()
            .filter(|m| {
                m.organization_id == organization_id && range.contains(m.created_at.date_naive())
            })
            .cloned()
            .collect())
    }
}
