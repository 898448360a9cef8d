//! Movement recorder.
//!
//! The only writer of balances and movements. Each call is one logical
//! operation: the entries are planned against a fresh snapshot and committed
//! as a single version-checked batch. Losing a version race re-reads and
//! re-plans, so floors are always evaluated against the balance that is
//! actually overwritten.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use stockroom_shared::types::OrganizationId;
use tracing::{debug, warn};

use super::error::StockError;
use super::plan::{PostingPlan, validate_entries};
use super::store::LedgerStore;
use super::types::{BalanceKey, MovementEntry, SourceDocument, StockLevel, StockMovement};

/// Default number of commit attempts before a conflict is surfaced.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

const INITIAL_BACKOFF_MS: u64 = 5;
const MAX_BACKOFF_MS: u64 = 100;

/// Applies movement batches through a [`LedgerStore`].
#[derive(Clone)]
pub struct MovementRecorder {
    store: Arc<dyn LedgerStore>,
    max_attempts: u32,
}

impl MovementRecorder {
    /// Creates a recorder. `max_attempts` below 1 is treated as 1.
    #[must_use]
    pub fn new(store: Arc<dyn LedgerStore>, max_attempts: u32) -> Self {
        Self {
            store,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Returns the underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn LedgerStore> {
        &self.store
    }

    /// Reads the quantities for a key. A missing row is a zero balance.
    pub async fn balance(
        &self,
        organization_id: OrganizationId,
        key: &BalanceKey,
    ) -> Result<StockLevel, StockError> {
        Ok(self
            .store
            .find_balance(organization_id, key)
            .await?
            .map(|b| b.level())
            .unwrap_or_default())
    }

    /// Posts entries as one atomic operation and returns the movements written.
    ///
    /// # Errors
    ///
    /// - `EmptyBatch`, `ZeroQuantity` for malformed input
    /// - `InsufficientStock` if a floor would be violated; nothing is written
    /// - `ConcurrencyConflict` if every attempt lost a version race
    /// - `Persistence` on storage failure
    pub async fn post(
        &self,
        organization_id: OrganizationId,
        entries: Vec<MovementEntry>,
    ) -> Result<Vec<StockMovement>, StockError> {
        self.post_with_document(organization_id, entries, None).await
    }

    /// Like [`post`](Self::post), writing `document` in the same atomic unit.
    ///
    /// With a document present `entries` may be empty: the document is then
    /// committed on its own.
    pub async fn post_with_document(
        &self,
        organization_id: OrganizationId,
        entries: Vec<MovementEntry>,
        document: Option<SourceDocument>,
    ) -> Result<Vec<StockMovement>, StockError> {
        if document.is_none() {
            validate_entries(&entries)?;
        }

        let mut keys: Vec<BalanceKey> = entries.iter().map(|e| e.key).collect();
        keys.sort_unstable();
        keys.dedup();

        let mut backoff_ms = INITIAL_BACKOFF_MS;
        for attempt in 1..=self.max_attempts {
            let snapshot = self.store.find_balances(organization_id, &keys).await?;
            let plan = PostingPlan::build(organization_id, &entries, &snapshot, Utc::now())?;
            let movements = plan.movements().to_vec();

            match self.store.commit(plan.into_batch(document.clone())).await {
                Ok(()) => {
                    debug!(
                        organization_id = %organization_id,
                        movements = movements.len(),
                        attempt,
                        "Posted stock movements"
                    );
                    return Ok(movements);
                }
                Err(err) if err.is_retryable() => {
                    warn!(
                        organization_id = %organization_id,
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %err,
                        "Balance version conflict, retrying"
                    );
                    if attempt < self.max_attempts {
                        tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                        backoff_ms = (backoff_ms * 2).min(MAX_BACKOFF_MS);
                    }
                }
                Err(err) => return Err(err),
            }
        }

        Err(StockError::ConcurrencyConflict {
            attempts: self.max_attempts,
        })
    }
}

impl std::fmt::Debug for MovementRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MovementRecorder")
            .field("max_attempts", &self.max_attempts)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "recorder_tests.rs"]
mod tests;
