//! Conversions between entity models and domain types.

use chrono::Utc;
use stockroom_core::catalog::{self, Location, Product};
use stockroom_core::ledger::{self, BalanceKey, StockBalance, StockMovement};
use stockroom_core::receiving::{self, PurchaseOrder, PurchaseOrderLine, Receipt, ReceiptLine};
use stockroom_core::reports::{self, InvoiceRecord, PaymentRecord, RentalAsset};
use stockroom_shared::types::{
    LocationId, MovementId, OrganizationId, ProductId, PurchaseOrderId, PurchaseOrderLineId,
    ReceiptId, ReceiptLineId, VariantId,
};

use crate::entities::{
    invoices, locations, payments, products, purchase_order_lines, purchase_orders,
    receipt_lines, receipts, rental_assets,
    sea_orm_active_enums::{
        LocationType, MovementRefType, MovementType, ProductType, PurchaseOrderStatus,
        RentalAssetStatus,
    },
    stock_balances, stock_movements,
};

impl From<ProductType> for catalog::ProductType {
    fn from(value: ProductType) -> Self {
        match value {
            ProductType::Stock => Self::Stock,
            ProductType::Serialized => Self::Serialized,
            ProductType::Perishable => Self::Perishable,
            ProductType::RentalAsset => Self::RentalAsset,
            ProductType::Service => Self::Service,
        }
    }
}

impl From<catalog::ProductType> for ProductType {
    fn from(value: catalog::ProductType) -> Self {
        match value {
            catalog::ProductType::Stock => Self::Stock,
            catalog::ProductType::Serialized => Self::Serialized,
            catalog::ProductType::Perishable => Self::Perishable,
            catalog::ProductType::RentalAsset => Self::RentalAsset,
            catalog::ProductType::Service => Self::Service,
        }
    }
}

impl From<LocationType> for catalog::LocationType {
    fn from(value: LocationType) -> Self {
        match value {
            LocationType::Warehouse => Self::Warehouse,
            LocationType::Store => Self::Store,
            LocationType::Truck => Self::Truck,
            LocationType::Other => Self::Other,
        }
    }
}

impl From<catalog::LocationType> for LocationType {
    fn from(value: catalog::LocationType) -> Self {
        match value {
            catalog::LocationType::Warehouse => Self::Warehouse,
            catalog::LocationType::Store => Self::Store,
            catalog::LocationType::Truck => Self::Truck,
            catalog::LocationType::Other => Self::Other,
        }
    }
}

impl From<MovementType> for ledger::MovementType {
    fn from(value: MovementType) -> Self {
        match value {
            MovementType::Receipt => Self::Receipt,
            MovementType::Transfer => Self::Transfer,
            MovementType::Adjustment => Self::Adjustment,
            MovementType::Sale => Self::Sale,
            MovementType::Return => Self::Return,
        }
    }
}

impl From<ledger::MovementType> for MovementType {
    fn from(value: ledger::MovementType) -> Self {
        match value {
            ledger::MovementType::Receipt => Self::Receipt,
            ledger::MovementType::Transfer => Self::Transfer,
            ledger::MovementType::Adjustment => Self::Adjustment,
            ledger::MovementType::Sale => Self::Sale,
            ledger::MovementType::Return => Self::Return,
        }
    }
}

impl From<MovementRefType> for ledger::RefType {
    fn from(value: MovementRefType) -> Self {
        match value {
            MovementRefType::Transfer => Self::Transfer,
            MovementRefType::Receipt => Self::Receipt,
            MovementRefType::Adjustment => Self::Adjustment,
            MovementRefType::Invoice => Self::Invoice,
            MovementRefType::CustomerReturn => Self::CustomerReturn,
        }
    }
}

impl From<ledger::RefType> for MovementRefType {
    fn from(value: ledger::RefType) -> Self {
        match value {
            ledger::RefType::Transfer => Self::Transfer,
            ledger::RefType::Receipt => Self::Receipt,
            ledger::RefType::Adjustment => Self::Adjustment,
            ledger::RefType::Invoice => Self::Invoice,
            ledger::RefType::CustomerReturn => Self::CustomerReturn,
        }
    }
}

impl From<PurchaseOrderStatus> for receiving::PurchaseOrderStatus {
    fn from(value: PurchaseOrderStatus) -> Self {
        match value {
            PurchaseOrderStatus::Draft => Self::Draft,
            PurchaseOrderStatus::Ordered => Self::Ordered,
            PurchaseOrderStatus::Received => Self::Received,
            PurchaseOrderStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl From<receiving::PurchaseOrderStatus> for PurchaseOrderStatus {
    fn from(value: receiving::PurchaseOrderStatus) -> Self {
        match value {
            receiving::PurchaseOrderStatus::Draft => Self::Draft,
            receiving::PurchaseOrderStatus::Ordered => Self::Ordered,
            receiving::PurchaseOrderStatus::Received => Self::Received,
            receiving::PurchaseOrderStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl From<RentalAssetStatus> for reports::RentalAssetStatus {
    fn from(value: RentalAssetStatus) -> Self {
        match value {
            RentalAssetStatus::Available => Self::Available,
            RentalAssetStatus::Rented => Self::Rented,
            RentalAssetStatus::Maintenance => Self::Maintenance,
            RentalAssetStatus::Retired => Self::Retired,
        }
    }
}

impl From<products::Model> for Product {
    fn from(model: products::Model) -> Self {
        Self {
            id: ProductId::from_uuid(model.id),
            organization_id: OrganizationId::from_uuid(model.organization_id),
            name: model.name,
            sku: model.sku,
            product_type: model.product_type.into(),
            tracks_inventory: model.tracks_inventory,
            is_active: model.is_active,
        }
    }
}

impl From<locations::Model> for Location {
    fn from(model: locations::Model) -> Self {
        Self {
            id: LocationId::from_uuid(model.id),
            organization_id: OrganizationId::from_uuid(model.organization_id),
            name: model.name,
            location_type: model.location_type.into(),
            is_default: model.is_default,
        }
    }
}

impl From<stock_balances::Model> for StockBalance {
    fn from(model: stock_balances::Model) -> Self {
        Self {
            organization_id: OrganizationId::from_uuid(model.organization_id),
            key: BalanceKey {
                product_id: ProductId::from_uuid(model.product_id),
                location_id: LocationId::from_uuid(model.location_id),
                variant_id: model.variant_id.map(VariantId::from_uuid),
            },
            qty_on_hand: model.qty_on_hand,
            qty_reserved: model.qty_reserved,
            version: model.version,
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<stock_movements::Model> for StockMovement {
    fn from(model: stock_movements::Model) -> Self {
        Self {
            id: MovementId::from_uuid(model.id),
            organization_id: OrganizationId::from_uuid(model.organization_id),
            key: BalanceKey {
                product_id: ProductId::from_uuid(model.product_id),
                location_id: LocationId::from_uuid(model.location_id),
                variant_id: model.variant_id.map(VariantId::from_uuid),
            },
            qty: model.qty,
            movement_type: model.movement_type.into(),
            ref_type: model.ref_type.into(),
            ref_id: model.ref_id,
            note: model.note,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<purchase_orders::Model> for PurchaseOrder {
    fn from(model: purchase_orders::Model) -> Self {
        Self {
            id: PurchaseOrderId::from_uuid(model.id),
            organization_id: OrganizationId::from_uuid(model.organization_id),
            order_number: model.order_number,
            status: model.status.into(),
            ordered_on: model.ordered_on,
        }
    }
}

impl From<purchase_order_lines::Model> for PurchaseOrderLine {
    fn from(model: purchase_order_lines::Model) -> Self {
        Self {
            id: PurchaseOrderLineId::from_uuid(model.id),
            purchase_order_id: PurchaseOrderId::from_uuid(model.purchase_order_id),
            product_id: model.product_id.map(ProductId::from_uuid),
            description: model.description,
            qty: model.qty,
            unit_cost: model.unit_cost,
        }
    }
}

impl From<receipts::Model> for Receipt {
    fn from(model: receipts::Model) -> Self {
        Self {
            id: ReceiptId::from_uuid(model.id),
            organization_id: OrganizationId::from_uuid(model.organization_id),
            purchase_order_id: PurchaseOrderId::from_uuid(model.purchase_order_id),
            location_id: LocationId::from_uuid(model.location_id),
            total: model.total,
            received_at: model.received_at.with_timezone(&Utc),
        }
    }
}

impl From<receipt_lines::Model> for ReceiptLine {
    fn from(model: receipt_lines::Model) -> Self {
        Self {
            id: ReceiptLineId::from_uuid(model.id),
            receipt_id: ReceiptId::from_uuid(model.receipt_id),
            purchase_order_line_id: PurchaseOrderLineId::from_uuid(model.purchase_order_line_id),
            product_id: model.product_id.map(ProductId::from_uuid),
            description: model.description,
            qty: model.qty,
            unit_cost: model.unit_cost,
            line_total: model.line_total,
        }
    }
}

impl From<invoices::Model> for InvoiceRecord {
    fn from(model: invoices::Model) -> Self {
        Self {
            issued_on: model.issued_on,
            total: model.total,
        }
    }
}

impl From<payments::Model> for PaymentRecord {
    fn from(model: payments::Model) -> Self {
        Self {
            paid_on: model.paid_on,
            amount: model.amount,
        }
    }
}

impl From<rental_assets::Model> for RentalAsset {
    fn from(model: rental_assets::Model) -> Self {
        Self {
            product_id: ProductId::from_uuid(model.product_id),
            status: model.status.into(),
        }
    }
}
