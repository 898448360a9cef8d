//! Initial database migration.
//!
//! Creates the catalog, stock ledger, purchasing and reporting tables, the
//! enums they use, and the trigger that keeps the movement log append-only.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: CATALOG
        // ============================================================
        db.execute_unprepared(ORGANIZATIONS_SQL).await?;
        db.execute_unprepared(PRODUCTS_SQL).await?;
        db.execute_unprepared(LOCATIONS_SQL).await?;

        // ============================================================
        // PART 3: STOCK LEDGER
        // ============================================================
        db.execute_unprepared(STOCK_BALANCES_SQL).await?;
        db.execute_unprepared(STOCK_MOVEMENTS_SQL).await?;

        // ============================================================
        // PART 4: PURCHASING
        // ============================================================
        db.execute_unprepared(PURCHASE_ORDERS_SQL).await?;
        db.execute_unprepared(RECEIPTS_SQL).await?;

        // ============================================================
        // PART 5: REPORTING INPUTS
        // ============================================================
        db.execute_unprepared(INVOICES_SQL).await?;
        db.execute_unprepared(RENTAL_ASSETS_SQL).await?;

        // ============================================================
        // PART 6: TRIGGERS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
CREATE TYPE product_type AS ENUM (
    'stock',
    'serialized',
    'perishable',
    'rental_asset',
    'service'
);

CREATE TYPE location_type AS ENUM ('warehouse', 'store', 'truck', 'other');

CREATE TYPE movement_type AS ENUM (
    'receipt',
    'transfer',
    'adjustment',
    'sale',
    'return'
);

CREATE TYPE movement_ref_type AS ENUM (
    'transfer',
    'receipt',
    'adjustment',
    'invoice',
    'customer_return'
);

CREATE TYPE purchase_order_status AS ENUM ('draft', 'ordered', 'received', 'cancelled');

CREATE TYPE rental_asset_status AS ENUM ('available', 'rented', 'maintenance', 'retired');
";

const ORGANIZATIONS_SQL: &str = r"
CREATE TABLE organizations (
    id              UUID PRIMARY KEY,
    name            VARCHAR(255) NOT NULL,
    slug            VARCHAR(100) NOT NULL UNIQUE,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const PRODUCTS_SQL: &str = r"
CREATE TABLE products (
    id                  UUID PRIMARY KEY,
    organization_id     UUID NOT NULL REFERENCES organizations(id),
    name                VARCHAR(255) NOT NULL,
    sku                 VARCHAR(100) NOT NULL,
    product_type        product_type NOT NULL,
    tracks_inventory    BOOLEAN NOT NULL DEFAULT true,
    is_active           BOOLEAN NOT NULL DEFAULT true,
    created_at          TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT uq_products_sku UNIQUE (organization_id, sku)
);
";

const LOCATIONS_SQL: &str = r"
CREATE TABLE locations (
    id                  UUID PRIMARY KEY,
    organization_id     UUID NOT NULL REFERENCES organizations(id),
    name                VARCHAR(255) NOT NULL,
    location_type       location_type NOT NULL DEFAULT 'warehouse',
    is_default          BOOLEAN NOT NULL DEFAULT false,
    created_at          TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

-- At most one default location per organization
CREATE UNIQUE INDEX uq_locations_default
    ON locations(organization_id)
    WHERE is_default;
";

const STOCK_BALANCES_SQL: &str = r"
CREATE TABLE stock_balances (
    id                  UUID PRIMARY KEY,
    organization_id     UUID NOT NULL REFERENCES organizations(id),
    product_id          UUID NOT NULL REFERENCES products(id),
    location_id         UUID NOT NULL REFERENCES locations(id),
    variant_id          UUID,
    qty_on_hand         NUMERIC(19, 4) NOT NULL DEFAULT 0,
    qty_reserved        NUMERIC(19, 4) NOT NULL DEFAULT 0,
    version             BIGINT NOT NULL CHECK (version >= 1),
    updated_at          TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT uq_stock_balances_key
        UNIQUE NULLS NOT DISTINCT (organization_id, product_id, location_id, variant_id)
);
";

const STOCK_MOVEMENTS_SQL: &str = r"
CREATE TABLE stock_movements (
    id                  UUID PRIMARY KEY,
    organization_id     UUID NOT NULL REFERENCES organizations(id),
    product_id          UUID NOT NULL REFERENCES products(id),
    location_id         UUID NOT NULL REFERENCES locations(id),
    variant_id          UUID,
    qty                 NUMERIC(19, 4) NOT NULL CHECK (qty <> 0),
    movement_type       movement_type NOT NULL,
    ref_type            movement_ref_type NOT NULL,
    ref_id              UUID NOT NULL,
    note                TEXT,
    created_at          TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_stock_movements_key
    ON stock_movements(organization_id, product_id, location_id, created_at);
CREATE INDEX idx_stock_movements_ref ON stock_movements(ref_id);
";

const PURCHASE_ORDERS_SQL: &str = r"
CREATE TABLE purchase_orders (
    id                  UUID PRIMARY KEY,
    organization_id     UUID NOT NULL REFERENCES organizations(id),
    order_number        VARCHAR(50) NOT NULL,
    status              purchase_order_status NOT NULL DEFAULT 'draft',
    ordered_on          DATE NOT NULL,
    created_at          TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at          TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT uq_purchase_orders_number UNIQUE (organization_id, order_number)
);

CREATE TABLE purchase_order_lines (
    id                  UUID PRIMARY KEY,
    purchase_order_id   UUID NOT NULL REFERENCES purchase_orders(id) ON DELETE CASCADE,
    line_number         INTEGER NOT NULL,
    product_id          UUID REFERENCES products(id),
    description         TEXT NOT NULL,
    qty                 NUMERIC(19, 4) NOT NULL,
    unit_cost           NUMERIC(19, 4) NOT NULL,

    CONSTRAINT uq_purchase_order_lines_number UNIQUE (purchase_order_id, line_number)
);

CREATE INDEX idx_purchase_order_lines_product ON purchase_order_lines(product_id);
";

const RECEIPTS_SQL: &str = r"
CREATE TABLE receipts (
    id                  UUID PRIMARY KEY,
    organization_id     UUID NOT NULL REFERENCES organizations(id),
    purchase_order_id   UUID NOT NULL UNIQUE REFERENCES purchase_orders(id),
    location_id         UUID NOT NULL REFERENCES locations(id),
    total               NUMERIC(19, 4) NOT NULL,
    received_at         TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE receipt_lines (
    id                      UUID PRIMARY KEY,
    receipt_id              UUID NOT NULL REFERENCES receipts(id) ON DELETE CASCADE,
    purchase_order_line_id  UUID NOT NULL REFERENCES purchase_order_lines(id),
    product_id              UUID REFERENCES products(id),
    description             TEXT NOT NULL,
    qty                     NUMERIC(19, 4) NOT NULL,
    unit_cost               NUMERIC(19, 4) NOT NULL,
    line_total              NUMERIC(19, 4) NOT NULL
);
";

const INVOICES_SQL: &str = r"
CREATE TABLE invoices (
    id                  UUID PRIMARY KEY,
    organization_id     UUID NOT NULL REFERENCES organizations(id),
    invoice_number      VARCHAR(50) NOT NULL,
    issued_on           DATE NOT NULL,
    total               NUMERIC(19, 4) NOT NULL,

    CONSTRAINT uq_invoices_number UNIQUE (organization_id, invoice_number)
);

CREATE INDEX idx_invoices_issued ON invoices(organization_id, issued_on);

CREATE TABLE payments (
    id                  UUID PRIMARY KEY,
    organization_id     UUID NOT NULL REFERENCES organizations(id),
    invoice_id          UUID REFERENCES invoices(id),
    paid_on             DATE NOT NULL,
    amount              NUMERIC(19, 4) NOT NULL
);

CREATE INDEX idx_payments_paid ON payments(organization_id, paid_on);
";

const RENTAL_ASSETS_SQL: &str = r"
CREATE TABLE rental_assets (
    id                  UUID PRIMARY KEY,
    organization_id     UUID NOT NULL REFERENCES organizations(id),
    product_id          UUID NOT NULL REFERENCES products(id),
    serial_number       VARCHAR(100),
    status              rental_asset_status NOT NULL DEFAULT 'available'
);
";

const TRIGGERS_SQL: &str = r"
-- ============================================================
-- FUNCTION: prevent_movement_modification
-- The movement log is append-only
-- ============================================================
CREATE OR REPLACE FUNCTION prevent_movement_modification()
RETURNS TRIGGER AS $$
BEGIN
    RAISE EXCEPTION 'stock_movements is append-only: % is not allowed', TG_OP;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_stock_movements_append_only
BEFORE UPDATE OR DELETE ON stock_movements
FOR EACH ROW
EXECUTE FUNCTION prevent_movement_modification();
";

const DROP_ALL_SQL: &str = r"
DROP TRIGGER IF EXISTS trg_stock_movements_append_only ON stock_movements;
DROP FUNCTION IF EXISTS prevent_movement_modification();

DROP TABLE IF EXISTS rental_assets;
DROP TABLE IF EXISTS payments;
DROP TABLE IF EXISTS invoices;
DROP TABLE IF EXISTS receipt_lines;
DROP TABLE IF EXISTS receipts;
DROP TABLE IF EXISTS purchase_order_lines;
DROP TABLE IF EXISTS purchase_orders;
DROP TABLE IF EXISTS stock_movements;
DROP TABLE IF EXISTS stock_balances;
DROP TABLE IF EXISTS locations;
DROP TABLE IF EXISTS products;
DROP TABLE IF EXISTS organizations;

DROP TYPE IF EXISTS rental_asset_status;
DROP TYPE IF EXISTS purchase_order_status;
DROP TYPE IF EXISTS movement_ref_type;
DROP TYPE IF EXISTS movement_type;
DROP TYPE IF EXISTS location_type;
DROP TYPE IF EXISTS product_type;
";
