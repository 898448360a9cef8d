//! Ledger storage port.

use std::collections::BTreeMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use stockroom_shared::types::{OrganizationId, PageRequest, PageResponse};

use super::error::StockError;
use super::types::{BalanceKey, CommitBatch, MovementFilter, StockBalance, StockMovement};

/// Persistence for balances and the movement log.
///
/// Reads are snapshots and take no locks. The only write path is [`commit`],
/// which the movement recorder drives.
///
/// [`commit`]: LedgerStore::commit
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Reads one balance row. `None` means no movement has touched the key.
    async fn find_balance(
        &self,
        organization_id: OrganizationId,
        key: &BalanceKey,
    ) -> Result<Option<StockBalance>, StockError>;

    /// Reads the existing rows among `keys`.
    async fn find_balances(
        &self,
        organization_id: OrganizationId,
        keys: &[BalanceKey],
    ) -> Result<BTreeMap<BalanceKey, StockBalance>, StockError>;

    /// Lists every balance row of an organization ordered by key.
    async fn list_balances(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Vec<StockBalance>, StockError>;

    /// Lists movements matching `filter`, newest first.
    async fn list_movements(
        &self,
        organization_id: OrganizationId,
        filter: &MovementFilter,
        page: PageRequest,
    ) -> Result<PageResponse<StockMovement>, StockError>;

    /// Sums the quantity of every movement for `key`.
    async fn movement_total(
        &self,
        organization_id: OrganizationId,
        key: &BalanceKey,
    ) -> Result<Decimal, StockError>;

    /// Applies a batch atomically.
    ///
    /// Each balance write succeeds only if the stored version equals its
    /// `expected_version` (`None`: the row must not exist). Any mismatch
    /// returns [`StockError::VersionConflict`] and nothing is written. A
    /// receipt document whose purchase order is no longer in the expected
    /// status returns [`StockError::PurchaseOrderAlreadyReceived`].
    async fn commit(&self, batch: CommitBatch) -> Result<(), StockError>;
}
