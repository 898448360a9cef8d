//! Stock ledger domain types.
//!
//! Balances are cached aggregates keyed by [`BalanceKey`]; movements are the
//! immutable ledger they are derived from. Callers describe an operation as a
//! list of [`MovementEntry`] values; the recorder turns those into a
//! [`CommitBatch`] that a [`super::store::LedgerStore`] applies atomically.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stockroom_shared::types::{LocationId, MovementId, OrganizationId, ProductId, VariantId};
use uuid::Uuid;

use crate::receiving::ReceiptDocument;

/// Why stock moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    /// Goods received from a supplier.
    Receipt,
    /// One leg of a transfer between locations.
    Transfer,
    /// Manual correction.
    Adjustment,
    /// Goods sold.
    Sale,
    /// Goods returned by a customer.
    Return,
}

impl MovementType {
    /// All movement types, in reporting order.
    pub const ALL: [Self; 5] = [
        Self::Receipt,
        Self::Transfer,
        Self::Adjustment,
        Self::Sale,
        Self::Return,
    ];

    /// Returns the stable name used in storage and APIs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Receipt => "receipt",
            Self::Transfer => "transfer",
            Self::Adjustment => "adjustment",
            Self::Sale => "sale",
            Self::Return => "return",
        }
    }
}

/// The kind of document a movement's `ref_id` points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefType {
    /// Transfer; `ref_id` is shared by both legs.
    Transfer,
    /// Goods receipt.
    Receipt,
    /// Stock adjustment.
    Adjustment,
    /// Sales invoice.
    Invoice,
    /// Customer return.
    CustomerReturn,
}

impl RefType {
    /// Returns the stable name used in storage and APIs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Transfer => "transfer",
            Self::Receipt => "receipt",
            Self::Adjustment => "adjustment",
            Self::Invoice => "invoice",
            Self::CustomerReturn => "customer_return",
        }
    }
}

/// Identity of a balance row: product at a location, optionally per variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BalanceKey {
    /// Product.
    pub product_id: ProductId,
    /// Location.
    pub location_id: LocationId,
    /// Variant, if the product has variants.
    pub variant_id: Option<VariantId>,
}

impl BalanceKey {
    /// Creates a key without a variant.
    #[must_use]
    pub const fn new(product_id: ProductId, location_id: LocationId) -> Self {
        Self {
            product_id,
            location_id,
            variant_id: None,
        }
    }

    /// Sets the variant.
    #[must_use]
    pub const fn with_variant(mut self, variant_id: VariantId) -> Self {
        self.variant_id = Some(variant_id);
        self
    }
}

/// On-hand and reserved quantity for a key. Absent rows read as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLevel {
    /// Physical units present.
    pub qty_on_hand: Decimal,
    /// Units earmarked for open orders.
    pub qty_reserved: Decimal,
}

impl StockLevel {
    /// Units on hand that are not reserved.
    #[must_use]
    pub fn available(&self) -> Decimal {
        self.qty_on_hand - self.qty_reserved
    }
}

/// Cached balance row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockBalance {
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// Balance identity.
    #[serde(flatten)]
    pub key: BalanceKey,
    /// Physical units present.
    pub qty_on_hand: Decimal,
    /// Units earmarked for open orders.
    pub qty_reserved: Decimal,
    /// Compare-and-swap token; 1 on creation, +1 on every write.
    pub version: i64,
    /// Time of the last write.
    pub updated_at: DateTime<Utc>,
}

impl StockBalance {
    /// Quantities of this row.
    #[must_use]
    pub fn level(&self) -> StockLevel {
        StockLevel {
            qty_on_hand: self.qty_on_hand,
            qty_reserved: self.qty_reserved,
        }
    }
}

/// One signed entry requested by a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovementEntry {
    /// Balance the entry applies to.
    pub key: BalanceKey,
    /// Signed quantity; negative removes stock.
    pub qty: Decimal,
    /// Movement type.
    pub movement_type: MovementType,
    /// Referenced document type.
    pub ref_type: RefType,
    /// Referenced document ID.
    pub ref_id: Uuid,
    /// Minimum on-hand quantity allowed after this entry.
    pub floor: Option<Decimal>,
    /// Free-text note.
    pub note: Option<String>,
}

impl MovementEntry {
    /// Creates an entry with no floor and no note.
    #[must_use]
    pub fn new(
        key: BalanceKey,
        qty: Decimal,
        movement_type: MovementType,
        ref_type: RefType,
        ref_id: Uuid,
    ) -> Self {
        Self {
            key,
            qty,
            movement_type,
            ref_type,
            ref_id,
            floor: None,
            note: None,
        }
    }

    /// Rejects the batch if on-hand would drop below `floor`.
    #[must_use]
    pub fn with_floor(mut self, floor: Decimal) -> Self {
        self.floor = Some(floor);
        self
    }

    /// Attaches a note.
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Immutable ledger row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovement {
    /// Movement ID.
    pub id: MovementId,
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// Balance the movement applies to.
    #[serde(flatten)]
    pub key: BalanceKey,
    /// Signed quantity.
    pub qty: Decimal,
    /// Movement type.
    pub movement_type: MovementType,
    /// Referenced document type.
    pub ref_type: RefType,
    /// Referenced document ID.
    pub ref_id: Uuid,
    /// Free-text note.
    pub note: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Variant restriction of a [`MovementFilter`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantFilter {
    /// Base product and every variant.
    #[default]
    Any,
    /// Only movements without a variant.
    BaseOnly,
    /// Only movements of one variant.
    Only(VariantId),
}

impl VariantFilter {
    /// Restriction matching exactly `variant_id`, base product included.
    #[must_use]
    pub fn exact(variant_id: Option<VariantId>) -> Self {
        variant_id.map_or(Self::BaseOnly, Self::Only)
    }

    /// Returns true if a movement with `variant_id` passes.
    #[must_use]
    pub fn matches(self, variant_id: Option<VariantId>) -> bool {
        match self {
            Self::Any => true,
            Self::BaseOnly => variant_id.is_none(),
            Self::Only(id) => variant_id == Some(id),
        }
    }
}

/// Movement history filter. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MovementFilter {
    /// Restrict to a product.
    pub product_id: Option<ProductId>,
    /// Restrict to a location.
    pub location_id: Option<LocationId>,
    /// Restrict by variant.
    #[serde(default)]
    pub variant: VariantFilter,
    /// Restrict to one referenced document.
    pub ref_id: Option<Uuid>,
}

impl MovementFilter {
    /// Filter for exactly the movements behind one balance key.
    #[must_use]
    pub fn for_key(key: &BalanceKey) -> Self {
        Self {
            product_id: Some(key.product_id),
            location_id: Some(key.location_id),
            variant: VariantFilter::exact(key.variant_id),
            ref_id: None,
        }
    }

    /// Filter for every movement referencing a document.
    #[must_use]
    pub fn for_ref(ref_id: Uuid) -> Self {
        Self {
            ref_id: Some(ref_id),
            ..Self::default()
        }
    }

    /// Returns true if `movement` passes the filter.
    #[must_use]
    pub fn matches(&self, movement: &StockMovement) -> bool {
        self.product_id.is_none_or(|id| movement.key.product_id == id)
            && self
                .location_id
                .is_none_or(|id| movement.key.location_id == id)
            && self.variant.matches(movement.key.variant_id)
            && self.ref_id.is_none_or(|id| movement.ref_id == id)
    }
}

/// Version-checked write of one balance row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceWrite {
    /// Row identity.
    pub key: BalanceKey,
    /// Version read before planning; `None` means the row must not exist yet.
    pub expected_version: Option<i64>,
    /// New on-hand quantity.
    pub qty_on_hand: Decimal,
    /// New reserved quantity.
    pub qty_reserved: Decimal,
}

impl BalanceWrite {
    /// Version the row carries after this write.
    #[must_use]
    pub fn new_version(&self) -> i64 {
        self.expected_version.map_or(1, |v| v + 1)
    }
}

/// Document written in the same atomic unit as a batch's movements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceDocument {
    /// Goods receipt; also moves its purchase order to `received`.
    Receipt(ReceiptDocument),
}

/// Everything one logical operation writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitBatch {
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// Movements to append.
    pub movements: Vec<StockMovement>,
    /// Balance writes, ordered by key.
    pub balances: Vec<BalanceWrite>,
    /// Optional source document.
    pub document: Option<SourceDocument>,
    /// Timestamp applied to every row written.
    pub committed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn movement(key: BalanceKey, ref_id: Uuid) -> StockMovement {
        StockMovement {
            id: MovementId::new(),
            organization_id: OrganizationId::new(),
            key,
            qty: dec!(1),
            movement_type: MovementType::Adjustment,
            ref_type: RefType::Adjustment,
            ref_id,
            note: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_balance_write_versions() {
        let key = BalanceKey::new(ProductId::new(), LocationId::new());
        let insert = BalanceWrite {
            key,
            expected_version: None,
            qty_on_hand: dec!(1),
            qty_reserved: dec!(0),
        };
        assert_eq!(insert.new_version(), 1);

        let update = BalanceWrite {
            expected_version: Some(7),
            ..insert
        };
        assert_eq!(update.new_version(), 8);
    }

    #[test]
    fn test_filter_matching() {
        let key = BalanceKey::new(ProductId::new(), LocationId::new());
        let ref_id = Uuid::new_v4();
        let row = movement(key, ref_id);

        assert!(MovementFilter::default().matches(&row));
        assert!(MovementFilter::for_key(&key).matches(&row));
        assert!(MovementFilter::for_ref(ref_id).matches(&row));
        assert!(!MovementFilter::for_ref(Uuid::new_v4()).matches(&row));

        let other_location = BalanceKey::new(key.product_id, LocationId::new());
        assert!(!MovementFilter::for_key(&other_location).matches(&row));
    }

    #[test]
    fn test_key_filter_separates_variants() {
        let base = BalanceKey::new(ProductId::new(), LocationId::new());
        let red = base.with_variant(VariantId::new());
        let blue = base.with_variant(VariantId::new());
        let base_row = movement(base, Uuid::new_v4());
        let red_row = movement(red, Uuid::new_v4());

        assert!(MovementFilter::for_key(&base).matches(&base_row));
        assert!(!MovementFilter::for_key(&base).matches(&red_row));
        assert!(MovementFilter::for_key(&red).matches(&red_row));
        assert!(!MovementFilter::for_key(&red).matches(&base_row));
        assert!(!MovementFilter::for_key(&blue).matches(&red_row));

        let any = MovementFilter {
            product_id: Some(base.product_id),
            ..MovementFilter::default()
        };
        assert!(any.matches(&base_row) && any.matches(&red_row));
    }

    #[test]
    fn test_entry_builders() {
        let key = BalanceKey::new(ProductId::new(), LocationId::new());
        let entry = MovementEntry::new(
            key,
            dec!(-3),
            MovementType::Transfer,
            RefType::Transfer,
            Uuid::new_v4(),
        )
        .with_floor(Decimal::ZERO)
        .with_note("cycle count");

        assert_eq!(entry.floor, Some(Decimal::ZERO));
        assert_eq!(entry.note.as_deref(), Some("cycle count"));
    }

    #[test]
    fn test_stock_level_available() {
        let level = StockLevel {
            qty_on_hand: dec!(10),
            qty_reserved: dec!(4),
        };
        assert_eq!(level.available(), dec!(6));
        assert_eq!(StockLevel::default().qty_on_hand, Decimal::ZERO);
    }

    #[test]
    fn test_names() {
        assert_eq!(MovementType::Return.as_str(), "return");
        assert_eq!(RefType::CustomerReturn.as_str(), "customer_return");
        assert_eq!(
            serde_json::to_string(&RefType::CustomerReturn).unwrap(),
            "\"customer_return\""
        );
    }
}
