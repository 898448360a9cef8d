//! Transfer coordinator.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stockroom_shared::types::{LocationId, OrganizationId, ProductId, VariantId};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::catalog::CatalogStore;
use crate::ledger::{
    BalanceKey, MovementEntry, MovementRecorder, MovementType, RefType, StockError, StockMovement,
};

/// Request to move stock of one product between two locations.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TransferRequest {
    /// Product to move.
    pub product_id: ProductId,
    /// Variant to move, if the product has variants.
    #[serde(default)]
    pub variant_id: Option<VariantId>,
    /// Location debited.
    pub from_location_id: LocationId,
    /// Location credited.
    pub to_location_id: LocationId,
    /// Quantity moved; must be positive.
    pub qty: Decimal,
    /// Optional note copied onto both legs.
    #[serde(default)]
    pub note: Option<String>,
}

/// A committed transfer.
#[derive(Debug, Clone, Serialize)]
pub struct TransferOutcome {
    /// Shared reference of both legs.
    pub ref_id: Uuid,
    /// Debit leg followed by credit leg.
    pub movements: Vec<StockMovement>,
}

/// Executes two-location transfers.
#[derive(Clone)]
pub struct TransferService {
    catalog: Arc<dyn CatalogStore>,
    recorder: MovementRecorder,
}

impl TransferService {
    /// Creates a transfer service.
    #[must_use]
    pub fn new(catalog: Arc<dyn CatalogStore>, recorder: MovementRecorder) -> Self {
        Self { catalog, recorder }
    }

    /// Moves `qty` from one location to another.
    ///
    /// The debit carries a floor of zero and is evaluated under the balance
    /// version check, so concurrent transfers cannot overdraw a location.
    ///
    /// # Errors
    ///
    /// Checked in this order:
    /// - `SameLocation` if source and destination are equal
    /// - `NonPositiveQuantity` if `qty <= 0`
    /// - `ProductNotFound`, `LocationNotFound`
    /// - `InsufficientStock` if the source holds less than `qty`
    /// - `ConcurrencyConflict`, `Persistence` from the commit
    #[instrument(skip(self))]
    pub async fn create_transfer(
        &self,
        organization_id: OrganizationId,
        request: TransferRequest,
    ) -> Result<TransferOutcome, StockError> {
        if request.from_location_id == request.to_location_id {
            return Err(StockError::SameLocation(request.from_location_id));
        }
        if request.qty <= Decimal::ZERO {
            return Err(StockError::NonPositiveQuantity(request.qty));
        }

        self.catalog
            .find_product(organization_id, request.product_id)
            .await?
            .ok_or(StockError::ProductNotFound(request.product_id))?;
        for location_id in [request.from_location_id, request.to_location_id] {
            self.catalog
                .find_location(organization_id, location_id)
                .await?
                .ok_or(StockError::LocationNotFound(location_id))?;
        }

        let ref_id = Uuid::now_v7();
        let key = |location_id| {
            let key = BalanceKey::new(request.product_id, location_id);
            match request.variant_id {
                Some(variant_id) => key.with_variant(variant_id),
                None => key,
            }
        };
        let leg = |location_id, qty| {
            let entry = MovementEntry::new(
                key(location_id),
                qty,
                MovementType::Transfer,
                RefType::Transfer,
                ref_id,
            );
            match &request.note {
                Some(note) => entry.with_note(note.clone()),
                None => entry,
            }
        };

        let entries = vec![
            leg(request.from_location_id, -request.qty).with_floor(Decimal::ZERO),
            leg(request.to_location_id, request.qty),
        ];
        let movements = self.recorder.post(organization_id, entries).await?;

        info!(
            ref_id = %ref_id,
            product_id = %request.product_id,
            from = %request.from_location_id,
            to = %request.to_location_id,
            qty = %request.qty,
            "Stock transferred"
        );

        Ok(TransferOutcome { ref_id, movements })
    }
}
