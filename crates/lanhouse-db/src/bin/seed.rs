//! # Seed Data Generator
//!
//! Populates the database with a small venue for development.
//!
//! ## Usage
//! ```bash
//! # Default floor: 8 PCs, 4 consoles
//! cargo run -p lanhouse-db --bin seed
//!
//! # Custom floor size
//! cargo run -p lanhouse-db --bin seed -- --pcs 12 --consoles 6
//!
//! # Specify database path
//! cargo run -p lanhouse-db --bin seed -- --db ./data/lanhouse.db
//! ```
//!
//! ## Generated Data
//! - Rates: `pc` (1–15 $5, 16–30 $10, 31–60 $15) and
//!   `console` (1–30 $10, 31–60 $20)
//! - Stations `PC-01..` and `XB-01..`, all Available
//! - A handful of clients with point balances
//! - Drinks and snacks (stock-managed) plus services (no stock)

use std::env;

use lanhouse_core::validation::validate_rate_tiers;
use lanhouse_core::{Client, Product, RateTier, RateType, Station, StationKind};
use lanhouse_db::repository::product::generate_product_id;
use lanhouse_db::{Database, DbConfig};

/// Sample clients: (name, phone, points)
const CLIENTS: &[(&str, &str, i64)] = &[
    ("Ana Torres", "555-0101", 25),
    ("Bruno Diaz", "555-0102", 0),
    ("Carla Mendez", "555-0103", 42),
    ("Diego Ruiz", "555-0104", 9),
    ("Elena Paz", "555-0105", 130),
];

/// Catalog: (name, category, sale cents, purchase cents, stock, is_service)
const PRODUCTS: &[(&str, &str, i64, i64, i64, bool)] = &[
    ("Cola 500ml", "Drinks", 1800, 1200, 24, false),
    ("Water 500ml", "Drinks", 1200, 700, 24, false),
    ("Energy drink", "Drinks", 3500, 2400, 12, false),
    ("Potato chips", "Snacks", 1500, 900, 30, false),
    ("Chocolate bar", "Snacks", 1300, 800, 30, false),
    ("B/W print", "Services", 300, 0, 0, true),
    ("Color print", "Services", 800, 0, 0, true),
    ("Scan", "Services", 500, 0, 0, true),
];

fn default_rates() -> Vec<RateType> {
    vec![
        RateType::new(
            "pc",
            "PC",
            vec![
                RateTier::new(1, 15, 500),
                RateTier::new(16, 30, 1000),
                RateTier::new(31, 60, 1500),
            ],
        ),
        RateType::new(
            "console",
            "Console",
            vec![RateTier::new(1, 30, 1000), RateTier::new(31, 60, 2000)],
        ),
    ]
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut pcs: usize = 8;
    let mut consoles: usize = 4;
    let mut db_path = String::from("./lanhouse_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--pcs" => {
                if i + 1 < args.len() {
                    pcs = args[i + 1].parse().unwrap_or(8);
                    i += 1;
                }
            }
            "--consoles" => {
                if i + 1 < args.len() {
                    consoles = args[i + 1].parse().unwrap_or(4);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Lanhouse Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("      --pcs <N>        Number of PC stations (default: 8)");
                println!("      --consoles <N>   Number of console stations (default: 4)");
                println!("  -d, --db <PATH>      Database file path (default: ./lanhouse_dev.db)");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Lanhouse Seed Data Generator");
    println!("===============================");
    println!("Database: {}", db_path);
    println!("Stations: {} PCs, {} consoles", pcs, consoles);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.rates().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} rate types", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Rates
    for rate in default_rates() {
        validate_rate_tiers(&rate.tiers)?;
        db.rates().save(&rate).await?;
        println!("✓ Rate '{}' with {} tiers", rate.name, rate.tiers.len());
    }

    // Stations
    for n in 1..=pcs {
        let station = Station::new(format!("PC-{:02}", n), format!("PC {:02}", n), StationKind::Pc, "pc");
        db.stations().insert(&station).await?;
    }
    for n in 1..=consoles {
        let station = Station::new(
            format!("XB-{:02}", n),
            format!("Console {}", n),
            StationKind::Console,
            "console",
        );
        db.stations().insert(&station).await?;
    }
    println!("✓ {} stations", pcs + consoles);

    // Clients
    for (n, (name, phone, points)) in CLIENTS.iter().enumerate() {
        let mut client = Client::new(format!("c{}", n + 1), *name, *points);
        client.phone = Some(phone.to_string());
        db.clients().insert(&client).await?;
    }
    println!("✓ {} clients", CLIENTS.len());

    // Products
    for (n, (name, category, sale, purchase, stock, is_service)) in PRODUCTS.iter().enumerate() {
        let product = Product {
            id: generate_product_id(),
            name: name.to_string(),
            category: Some(category.to_string()),
            barcode: (!is_service).then(|| format!("779{:010}", n + 1)),
            sale_price_cents: *sale,
            purchase_price_cents: *purchase,
            manages_inventory: !is_service,
            stock: *stock,
            is_service: *is_service,
        };

        if let Err(e) = db.products().insert(&product).await {
            eprintln!("Failed to insert {}: {}", product.name, e);
            continue;
        }
    }
    println!("✓ {} products", db.products().count().await?);

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
