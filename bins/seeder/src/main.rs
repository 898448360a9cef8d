//! Database seeder for Stockroom development and testing.
//!
//! Seeds a demo organization with products, locations, purchase orders,
//! invoices, payments and rental assets. Stock itself is never seeded:
//! receive the seeded purchase orders through the API to populate balances.
//!
//! Usage: cargo run --bin seeder

use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use stockroom_db::entities::{
    invoices, locations, organizations, payments, products, purchase_order_lines,
    purchase_orders, rental_assets,
    sea_orm_active_enums::{
        LocationType, ProductType, PurchaseOrderStatus, RentalAssetStatus,
    },
};
use uuid::Uuid;

/// Demo organization ID (consistent for all seeds)
const DEMO_ORG_ID: &str = "00000000-0000-0000-0000-000000000001";

/// Demo products: (id, name, sku, type).
const PRODUCTS: [(&str, &str, &str, ProductType); 4] = [
    ("00000000-0000-0000-0001-000000000001", "Steel Shelf Bracket", "BRK-100", ProductType::Stock),
    ("00000000-0000-0000-0001-000000000002", "Cold Brew Concentrate", "CBC-250", ProductType::Perishable),
    ("00000000-0000-0000-0001-000000000003", "Pallet Jack", "PJ-2000", ProductType::RentalAsset),
    ("00000000-0000-0000-0001-000000000004", "Installation", "SVC-INST", ProductType::Service),
];

/// Demo locations: (id, name, type, is_default).
const LOCATIONS: [(&str, &str, LocationType, bool); 3] = [
    ("00000000-0000-0000-0002-000000000001", "Main Warehouse", LocationType::Warehouse, true),
    ("00000000-0000-0000-0002-000000000002", "Downtown Store", LocationType::Store, false),
    ("00000000-0000-0000-0002-000000000003", "Van 1", LocationType::Truck, false),
];

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = stockroom_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding demo organization...");
    if !seed_organization(&db).await {
        println!("Demo organization already exists, nothing to do.");
        return;
    }

    println!("Seeding products...");
    seed_products(&db).await;

    println!("Seeding locations...");
    seed_locations(&db).await;

    println!("Seeding purchase orders...");
    seed_purchase_orders(&db).await;

    println!("Seeding invoices and payments...");
    seed_invoices(&db).await;

    println!("Seeding rental assets...");
    seed_rental_assets(&db).await;

    println!("Seeding complete!");
}

fn id(value: &str) -> Uuid {
    Uuid::parse_str(value).unwrap()
}

fn org_id() -> Uuid {
    id(DEMO_ORG_ID)
}

fn product_id(index: usize) -> Uuid {
    id(PRODUCTS[index].0)
}

/// Returns false if the organization already exists.
async fn seed_organization(db: &DatabaseConnection) -> bool {
    if organizations::Entity::find_by_id(org_id())
        .one(db)
        .await
        .ok()
        .flatten()
        .is_some()
    {
        return false;
    }

    let org = organizations::ActiveModel {
        id: Set(org_id()),
        name: Set("Demo Hardware Co".to_string()),
        slug: Set("demo-hardware".to_string()),
        created_at: Set(Utc::now().into()),
    };

    if let Err(e) = org.insert(db).await {
        eprintln!("Failed to insert demo organization: {e}");
        return false;
    }
    println!("  Created organization: Demo Hardware Co");
    true
}

async fn seed_products(db: &DatabaseConnection) {
    for (product_id, name, sku, product_type) in PRODUCTS {
        let product = products::ActiveModel {
            id: Set(id(product_id)),
            organization_id: Set(org_id()),
            name: Set(name.to_string()),
            sku: Set(sku.to_string()),
            tracks_inventory: Set(product_type != ProductType::Service),
            product_type: Set(product_type),
            is_active: Set(true),
            created_at: Set(Utc::now().into()),
        };
        if let Err(e) = product.insert(db).await {
            eprintln!("Failed to insert product {sku}: {e}");
        }
    }
    println!("  Created {} products", PRODUCTS.len());
}

async fn seed_locations(db: &DatabaseConnection) {
    for (location_id, name, location_type, is_default) in LOCATIONS {
        let location = locations::ActiveModel {
            id: Set(id(location_id)),
            organization_id: Set(org_id()),
            name: Set(name.to_string()),
            location_type: Set(location_type),
            is_default: Set(is_default),
            created_at: Set(Utc::now().into()),
        };
        if let Err(e) = location.insert(db).await {
            eprintln!("Failed to insert location {name}: {e}");
        }
    }
    println!("  Created {} locations", LOCATIONS.len());
}

/// One order per month for the last three months, plus an unsent draft.
async fn seed_purchase_orders(db: &DatabaseConnection) {
    let today = Utc::now().date_naive();
    let orders: [(&str, PurchaseOrderStatus, NaiveDate, Vec<(Option<usize>, &str, Decimal, Decimal)>); 4] = [
        (
            "PO-1001",
            PurchaseOrderStatus::Ordered,
            today - Duration::days(60),
            vec![
                (Some(0), "Brackets, box of 50", dec!(40), dec!(2.10)),
                (Some(1), "Cold brew, 12 x 250ml", dec!(24), dec!(3.75)),
                (None, "Freight", dec!(1), dec!(45)),
            ],
        ),
        (
            "PO-1002",
            PurchaseOrderStatus::Ordered,
            today - Duration::days(30),
            vec![
                (Some(0), "Brackets, box of 50", dec!(60), dec!(2.40)),
                (Some(3), "Racking installation", dec!(1), dec!(180)),
            ],
        ),
        (
            "PO-1003",
            PurchaseOrderStatus::Ordered,
            today - Duration::days(5),
            vec![(Some(2), "Pallet jacks", dec!(3), dec!(420))],
        ),
        (
            "PO-1004",
            PurchaseOrderStatus::Draft,
            today,
            vec![(Some(1), "Cold brew, 12 x 250ml", dec!(12), dec!(3.90))],
        ),
    ];

    for (order_number, status, ordered_on, lines) in orders {
        let po_id = Uuid::now_v7();
        let order = purchase_orders::ActiveModel {
            id: Set(po_id),
            organization_id: Set(org_id()),
            order_number: Set(order_number.to_string()),
            status: Set(status),
            ordered_on: Set(ordered_on),
            created_at: Set(Utc::now().into()),
            updated_at: Set(Utc::now().into()),
        };
        if let Err(e) = order.insert(db).await {
            eprintln!("Failed to insert purchase order {order_number}: {e}");
            continue;
        }

        for (line_number, (product, description, qty, unit_cost)) in (1..).zip(lines) {
            let line = purchase_order_lines::ActiveModel {
                id: Set(Uuid::now_v7()),
                purchase_order_id: Set(po_id),
                line_number: Set(line_number),
                product_id: Set(product.map(product_id)),
                description: Set(description.to_string()),
                qty: Set(qty),
                unit_cost: Set(unit_cost),
            };
            if let Err(e) = line.insert(db).await {
                eprintln!("Failed to insert line {line_number} of {order_number}: {e}");
            }
        }
        println!("  Created purchase order {order_number} ({status:?})");
    }
}

/// Weekly invoices over the last quarter, most of them paid a week later.
async fn seed_invoices(db: &DatabaseConnection) {
    let today = Utc::now().date_naive();
    let mut created = 0;

    for week in 0..12i64 {
        let issued_on = today - Duration::weeks(12 - week);
        let total = dec!(250) + Decimal::from(week) * dec!(37.50);
        let invoice_id = Uuid::now_v7();

        let invoice = invoices::ActiveModel {
            id: Set(invoice_id),
            organization_id: Set(org_id()),
            invoice_number: Set(format!("INV-{:04}", 2000 + week)),
            issued_on: Set(issued_on),
            total: Set(total),
        };
        if let Err(e) = invoice.insert(db).await {
            eprintln!("Failed to insert invoice: {e}");
            continue;
        }
        created += 1;

        // Every fourth invoice stays open.
        if week % 4 == 3 {
            continue;
        }
        let payment = payments::ActiveModel {
            id: Set(Uuid::now_v7()),
            organization_id: Set(org_id()),
            invoice_id: Set(Some(invoice_id)),
            paid_on: Set((issued_on + Duration::days(7)).min(today)),
            amount: Set(total),
        };
        if let Err(e) = payment.insert(db).await {
            eprintln!("Failed to insert payment: {e}");
        }
    }
    println!("  Created {created} invoices");
}

async fn seed_rental_assets(db: &DatabaseConnection) {
    let statuses = [
        RentalAssetStatus::Rented,
        RentalAssetStatus::Rented,
        RentalAssetStatus::Available,
        RentalAssetStatus::Maintenance,
        RentalAssetStatus::Retired,
    ];

    for (n, status) in (1..).zip(statuses) {
        let asset = rental_assets::ActiveModel {
            id: Set(Uuid::now_v7()),
            organization_id: Set(org_id()),
            product_id: Set(product_id(2)),
            serial_number: Set(Some(format!("PJ-{n:03}"))),
            status: Set(status),
        };
        if let Err(e) = asset.insert(db).await {
            eprintln!("Failed to insert rental asset: {e}");
        }
    }
    println!("  Created {} rental assets", statuses.len());
}
