//! Ledger repository: stock balances and the movement log.
//!
//! `commit` runs one database transaction per batch. Balance rows are written
//! with compare-and-swap on `version`:
//!
//! - update: `UPDATE ... WHERE version = expected`; zero rows is a conflict
//! - create: plain `INSERT`; a unique-key violation is a conflict
//!
//! A receipt document additionally claims its purchase order with
//! `UPDATE ... WHERE status = expected_status`, so only one receipt per order
//! can ever commit.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use stockroom_core::StockError;
use stockroom_core::ledger::{
    BalanceKey, BalanceWrite, CommitBatch, LedgerStore, MovementFilter, SourceDocument,
    StockBalance, StockMovement, VariantFilter,
};
use stockroom_core::receiving::{self, ReceiptDocument};
use stockroom_shared::types::{OrganizationId, PageRequest, PageResponse};
use tracing::debug;
use uuid::Uuid;

use super::error::{is_unique_violation, persistence};
use crate::entities::{
    purchase_orders, receipt_lines, receipts, sea_orm_active_enums::PurchaseOrderStatus,
    stock_balances, stock_movements,
};

/// Balances and movements stored in PostgreSQL.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    db: DatabaseConnection,
}

fn balance_key_filter(organization_id: OrganizationId, key: &BalanceKey) -> SimpleExpr {
    let variant = match key.variant_id {
        Some(variant_id) => stock_balances::Column::VariantId.eq(variant_id.into_inner()),
        None => stock_balances::Column::VariantId.is_null(),
    };
    stock_balances::Column::OrganizationId
        .eq(organization_id.into_inner())
        .and(stock_balances::Column::ProductId.eq(key.product_id.into_inner()))
        .and(stock_balances::Column::LocationId.eq(key.location_id.into_inner()))
        .and(variant)
}

fn movement_key_filter(organization_id: OrganizationId, key: &BalanceKey) -> SimpleExpr {
    let variant = match key.variant_id {
        Some(variant_id) => stock_movements::Column::VariantId.eq(variant_id.into_inner()),
        None => stock_movements::Column::VariantId.is_null(),
    };
    stock_movements::Column::OrganizationId
        .eq(organization_id.into_inner())
        .and(stock_movements::Column::ProductId.eq(key.product_id.into_inner()))
        .and(stock_movements::Column::LocationId.eq(key.location_id.into_inner()))
        .and(variant)
}

impl LedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Writes one balance row, checking its version.
    async fn write_balance(
        txn: &DatabaseTransaction,
        organization_id: OrganizationId,
        write: &BalanceWrite,
        now: sea_orm::prelude::DateTimeWithTimeZone,
    ) -> Result<(), StockError> {
        let Some(expected) = write.expected_version else {
            let row = stock_balances::ActiveModel {
                id: Set(Uuid::now_v7()),
                organization_id: Set(organization_id.into_inner()),
                product_id: Set(write.key.product_id.into_inner()),
                location_id: Set(write.key.location_id.into_inner()),
                variant_id: Set(write.key.variant_id.map(Into::into)),
                qty_on_hand: Set(write.qty_on_hand),
                qty_reserved: Set(write.qty_reserved),
                version: Set(write.new_version()),
                updated_at: Set(now),
            };
            return match stock_balances::Entity::insert(row)
                .exec_without_returning(txn)
                .await
            {
                Ok(_) => Ok(()),
                Err(err) if is_unique_violation(&err) => {
                    debug!(key = ?write.key, "Balance created concurrently");
                    Err(StockError::VersionConflict(write.key))
                }
                Err(err) => Err(persistence(err)),
            };
        };

        let result = stock_balances::Entity::update_many()
            .col_expr(stock_balances::Column::QtyOnHand, Expr::value(write.qty_on_hand))
            .col_expr(
                stock_balances::Column::QtyReserved,
                Expr::value(write.qty_reserved),
            )
            .col_expr(stock_balances::Column::Version, Expr::value(write.new_version()))
            .col_expr(stock_balances::Column::UpdatedAt, Expr::value(now))
            .filter(balance_key_filter(organization_id, &write.key))
            .filter(stock_balances::Column::Version.eq(expected))
            .exec(txn)
            .await
            .map_err(persistence)?;

        if result.rows_affected == 1 {
            Ok(())
        } else {
            debug!(key = ?write.key, expected, "Balance version moved");
            Err(StockError::VersionConflict(write.key))
        }
    }

    /// Moves the purchase order from the status the receipt was planned
    /// against to `received`.
    async fn claim_purchase_order(
        txn: &DatabaseTransaction,
        organization_id: OrganizationId,
        doc: &ReceiptDocument,
        now: sea_orm::prelude::DateTimeWithTimeZone,
    ) -> Result<(), StockError> {
        let po_id = doc.receipt.purchase_order_id;
        let expected: PurchaseOrderStatus = doc.expected_status.into();

        // `set` goes through the active model so the enum value is cast.
        let result = purchase_orders::Entity::update_many()
            .set(purchase_orders::ActiveModel {
                status: Set(PurchaseOrderStatus::Received),
                updated_at: Set(now),
                ..Default::default()
            })
            .filter(purchase_orders::Column::Id.eq(po_id.into_inner()))
            .filter(purchase_orders::Column::OrganizationId.eq(organization_id.into_inner()))
            .filter(purchase_orders::Column::Status.eq(expected))
            .exec(txn)
            .await
            .map_err(persistence)?;

        if result.rows_affected == 1 {
            return Ok(());
        }

        let current = purchase_orders::Entity::find_by_id(po_id.into_inner())
            .filter(purchase_orders::Column::OrganizationId.eq(organization_id.into_inner()))
            .one(txn)
            .await
            .map_err(persistence)?;
        Err(match current.map(|po| receiving::PurchaseOrderStatus::from(po.status)) {
            None => StockError::PurchaseOrderNotFound(po_id),
            Some(receiving::PurchaseOrderStatus::Cancelled) => {
                StockError::PurchaseOrderCancelled(po_id)
            }
            Some(_) => StockError::PurchaseOrderAlreadyReceived(po_id),
        })
    }

    async fn insert_receipt(
        txn: &DatabaseTransaction,
        doc: &ReceiptDocument,
    ) -> Result<(), StockError> {
        let receipt = &doc.receipt;
        let header = receipts::ActiveModel {
            id: Set(receipt.id.into_inner()),
            organization_id: Set(receipt.organization_id.into_inner()),
            purchase_order_id: Set(receipt.purchase_order_id.into_inner()),
            location_id: Set(receipt.location_id.into_inner()),
            total: Set(receipt.total),
            received_at: Set(receipt.received_at.into()),
        };
        match receipts::Entity::insert(header).exec_without_returning(txn).await {
            Ok(_) => {}
            Err(err) if is_unique_violation(&err) => {
                return Err(StockError::PurchaseOrderAlreadyReceived(
                    receipt.purchase_order_id,
                ));
            }
            Err(err) => return Err(persistence(err)),
        }

        if doc.lines.is_empty() {
            return Ok(());
        }
        let lines = doc.lines.iter().map(|line| receipt_lines::ActiveModel {
            id: Set(line.id.into_inner()),
            receipt_id: Set(line.receipt_id.into_inner()),
            purchase_order_line_id: Set(line.purchase_order_line_id.into_inner()),
            product_id: Set(line.product_id.map(Into::into)),
            description: Set(line.description.clone()),
            qty: Set(line.qty),
            unit_cost: Set(line.unit_cost),
            line_total: Set(line.line_total),
        });
        receipt_lines::Entity::insert_many(lines)
            .exec_without_returning(txn)
            .await
            .map_err(persistence)?;
        Ok(())
    }

    async fn insert_movements(
        txn: &DatabaseTransaction,
        movements: &[StockMovement],
    ) -> Result<(), StockError> {
        if movements.is_empty() {
            return Ok(());
        }
        let rows = movements.iter().map(|m| stock_movements::ActiveModel {
            id: Set(m.id.into_inner()),
            organization_id: Set(m.organization_id.into_inner()),
            product_id: Set(m.key.product_id.into_inner()),
            location_id: Set(m.key.location_id.into_inner()),
            variant_id: Set(m.key.variant_id.map(Into::into)),
            qty: Set(m.qty),
            movement_type: Set(m.movement_type.into()),
            ref_type: Set(m.ref_type.into()),
            ref_id: Set(m.ref_id),
            note: Set(m.note.clone()),
            created_at: Set(m.created_at.into()),
        });
        stock_movements::Entity::insert_many(rows)
            .exec_without_returning(txn)
            .await
            .map_err(persistence)?;
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for LedgerRepository {
    async fn find_balance(
        &self,
        organization_id: OrganizationId,
        key: &BalanceKey,
    ) -> Result<Option<StockBalance>, StockError> {
        let balance = stock_balances::Entity::find()
            .filter(balance_key_filter(organization_id, key))
            .one(&self.db)
            .await
            .map_err(persistence)?;
        Ok(balance.map(Into::into))
    }

    async fn find_balances(
        &self,
        organization_id: OrganizationId,
        keys: &[BalanceKey],
    ) -> Result<BTreeMap<BalanceKey, StockBalance>, StockError> {
        if keys.is_empty() {
            return Ok(BTreeMap::new());
        }
        let wanted: BTreeSet<BalanceKey> = keys.iter().copied().collect();
        let products: BTreeSet<Uuid> = keys.iter().map(|k| k.product_id.into_inner()).collect();
        let locations: BTreeSet<Uuid> = keys.iter().map(|k| k.location_id.into_inner()).collect();

        let rows = stock_balances::Entity::find()
            .filter(stock_balances::Column::OrganizationId.eq(organization_id.into_inner()))
            .filter(stock_balances::Column::ProductId.is_in(products))
            .filter(stock_balances::Column::LocationId.is_in(locations))
            .all(&self.db)
            .await
            .map_err(persistence)?;

        Ok(rows
            .into_iter()
            .map(StockBalance::from)
            .filter(|b| wanted.contains(&b.key))
            .map(|b| (b.key, b))
            .collect())
    }

    async fn list_balances(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Vec<StockBalance>, StockError> {
        let rows = stock_balances::Entity::find()
            .filter(stock_balances::Column::OrganizationId.eq(organization_id.into_inner()))
            .order_by_asc(stock_balances::Column::ProductId)
            .order_by_asc(stock_balances::Column::LocationId)
            .all(&self.db)
            .await
            .map_err(persistence)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_movements(
        &self,
        organization_id: OrganizationId,
        filter: &MovementFilter,
        page: PageRequest,
    ) -> Result<PageResponse<StockMovement>, StockError> {
        let mut query = stock_movements::Entity::find()
            .filter(stock_movements::Column::OrganizationId.eq(organization_id.into_inner()));
        if let Some(product_id) = filter.product_id {
            query = query.filter(stock_movements::Column::ProductId.eq(product_id.into_inner()));
        }
        if let Some(location_id) = filter.location_id {
            query = query.filter(stock_movements::Column::LocationId.eq(location_id.into_inner()));
        }
        match filter.variant {
            VariantFilter::Any => {}
            VariantFilter::BaseOnly => {
                query = query.filter(stock_movements::Column::VariantId.is_null());
            }
            VariantFilter::Only(variant_id) => {
                query = query.filter(stock_movements::Column::VariantId.eq(variant_id.into_inner()));
            }
        }
        if let Some(ref_id) = filter.ref_id {
            query = query.filter(stock_movements::Column::RefId.eq(ref_id));
        }

        let total = query.clone().count(&self.db).await.map_err(persistence)?;
        let rows = query
            .order_by_desc(stock_movements::Column::CreatedAt)
            .order_by_desc(stock_movements::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(persistence)?;

        let data = rows.into_iter().map(Into::into).collect();
        Ok(PageResponse::new(data, page.page, page.per_page, total))
    }

    async fn movement_total(
        &self,
        organization_id: OrganizationId,
        key: &BalanceKey,
    ) -> Result<Decimal, StockError> {
        let total: Option<Option<Decimal>> = stock_movements::Entity::find()
            .select_only()
            .column_as(stock_movements::Column::Qty.sum(), "total")
            .filter(movement_key_filter(organization_id, key))
            .into_tuple()
            .one(&self.db)
            .await
            .map_err(persistence)?;
        Ok(total.flatten().unwrap_or(Decimal::ZERO))
    }

    async fn commit(&self, batch: CommitBatch) -> Result<(), StockError> {
        let organization_id = batch.organization_id;
        let now = batch.committed_at.into();
        let txn = self.db.begin().await.map_err(persistence)?;

        // Dropping `txn` on any early return rolls everything back.
        if let Some(SourceDocument::Receipt(doc)) = &batch.document {
            Self::claim_purchase_order(&txn, organization_id, doc, now).await?;
        }
        for write in &batch.balances {
            Self::write_balance(&txn, organization_id, write, now).await?;
        }
        Self::insert_movements(&txn, &batch.movements).await?;
        if let Some(SourceDocument::Receipt(doc)) = &batch.document {
            Self::insert_receipt(&txn, doc).await?;
        }

        txn.commit().await.map_err(persistence)?;
        debug!(
            organization_id = %organization_id,
            movements = batch.movements.len(),
            balances = batch.balances.len(),
            "Ledger batch committed"
        );
        Ok(())
    }
}
