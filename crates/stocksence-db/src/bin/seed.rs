//! # Demo Data Generator
//!
//! Fills an empty database with products across the suggested categories
//! and, optionally, a spread of past sales so the reports have something to
//! show.
//!
//! ## Usage
//! ```bash
//! cargo run -p stocksence-db --bin seed
//! cargo run -p stocksence-db --bin seed -- --db ./data/stocksence.db --sales 300
//! ```

use chrono::{Duration, Utc};
use std::env;
use stocksence_core::{NewProduct, DEFAULT_MIN_QUANTITY};
use stocksence_db::repository::product::generate_product_id;
use stocksence_db::{Database, DbConfig, DbError};

/// (category, product names) pairs.
const CATALOG: &[(&str, &[&str])] = &[
    ("Electronics", &["USB-C Cable", "Wireless Mouse", "Bluetooth Speaker", "Power Bank", "HDMI Adapter"]),
    ("Clothing", &["Cotton T-Shirt", "Denim Jacket", "Wool Socks", "Rain Poncho", "Baseball Cap"]),
    ("Food", &["Granola Bar", "Dark Chocolate", "Trail Mix", "Rice Crackers", "Peanut Butter"]),
    ("Beverages", &["Green Tea", "Cold Brew Coffee", "Sparkling Water", "Orange Juice", "Oat Milk"]),
    ("Home Goods", &["Ceramic Mug", "Scented Candle", "Desk Lamp", "Throw Pillow", "Photo Frame"]),
    ("Office Supplies", &["Gel Pens 10-Pack", "A5 Notebook", "Stapler", "Sticky Notes", "Desk Organizer"]),
    ("Beauty", &["Lip Balm", "Hand Cream", "Face Mask", "Nail File", "Hair Ties"]),
    ("Health", &["Vitamin C", "First Aid Kit", "Hand Sanitizer", "Ear Plugs", "Heat Patch"]),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./stocksence_dev.db");
    let mut sales: usize = 0;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--sales" | "-s" => {
                if i + 1 < args.len() {
                    sales = args[i + 1].parse().unwrap_or(0);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("StockSence Demo Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>     Database file path (default: ./stocksence_dev.db)");
                println!("  -s, --sales <N>     Also record N past sales (default: 0)");
                println!("  -h, --help          Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("StockSence Seed Data Generator");
    println!("==============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database, migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products, skipping seed.", existing);
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let now = Utc::now();
    let mut ids = Vec::new();

    for (category_idx, (category, names)) in CATALOG.iter().enumerate() {
        for (name_idx, name) in names.iter().enumerate() {
            let seed = category_idx * 10 + name_idx;
            let product = demo_product(category, name, seed).into_product(generate_product_id(), now);

            match db.products().insert(&product).await {
                Ok(p) => ids.push(p.id),
                Err(e) => eprintln!("Failed to insert {}: {}", name, e),
            }
        }
    }
    println!("✓ Inserted {} products", ids.len());

    let mut recorded = 0;
    for n in 0..sales {
        if ids.is_empty() {
            break;
        }
        let product_id = &ids[(n * 7) % ids.len()];
        let quantity = 1 + (n % 3) as i64;
        // Spread over the past ~90 days, newest last
        let date = now - Duration::hours(((sales - n) * 90 * 24 / sales.max(1)) as i64);

        match db.sales().record_sale(product_id, quantity, date).await {
            Ok(_) => recorded += 1,
            Err(DbError::InsufficientStock { .. }) => {}
            Err(e) => eprintln!("Failed to record sale: {}", e),
        }
    }
    if sales > 0 {
        println!("✓ Recorded {} sales", recorded);
    }

    let low = db.products().low_stock().await?;
    println!("  {} products at or below their threshold", low.len());
    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}

/// Deterministic demo values: some products start low or empty.
fn demo_product(category: &str, name: &str, seed: usize) -> NewProduct {
    let price_cents = 199 + ((seed * 173) % 4800) as i64;
    let cost_pct = 40 + (seed % 30) as i64;

    NewProduct {
        name: name.to_string(),
        description: format!("{} from the {} range", name, category.to_lowercase()),
        price_cents,
        cost_cents: price_cents * cost_pct / 100,
        quantity: ((seed * 37) % 60) as i64,
        min_quantity: DEFAULT_MIN_QUANTITY + (seed % 3) as i64 * 5,
        category: category.to_string(),
        image_url: None,
    }
}
