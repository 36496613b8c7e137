//! # Seed Data Generator
//!
//! Populates a kiosk database with a small demo grocery catalog.
//!
//! ## Usage
//! ```bash
//! cargo run -p checkout-db --bin seed
//!
//! # Specify database path
//! cargo run -p checkout-db --bin seed -- --db ./data/kiosk.db
//!
//! # Overwrite products that already exist
//! cargo run -p checkout-db --bin seed -- --force
//! ```
//!
//! Barcodes are 13-digit EAN-style numbers; prices are in rupees.

use chrono::Local;
use clap::Parser;

use checkout_core::{Money, Product};
use checkout_db::{Database, DbConfig};

/// (barcode, name, brand, category, rupees, paise)
const CATALOG: &[(&str, &str, &str, &str, i64, i64)] = &[
    ("8901262150101", "Taaza Toned Milk 500ml", "Amul", "Dairy", 27, 0),
    ("8901262010016", "Butter 500g", "Amul", "Dairy", 275, 0),
    ("8901262030052", "Masti Dahi 400g", "Amul", "Dairy", 35, 0),
    ("8901058851298", "Maggi 2-Minute Noodles 70g", "Nestle", "Instant Food", 14, 0),
    ("8901725133597", "Aashirvaad Atta 5kg", "ITC", "Staples", 265, 0),
    ("8906007280048", "Tata Salt 1kg", "Tata", "Staples", 28, 0),
    ("8901063092358", "Good Day Cashew Cookies 200g", "Britannia", "Biscuits", 40, 0),
    ("8901063010147", "Marie Gold 250g", "Britannia", "Biscuits", 35, 0),
    ("8901491101837", "Lay's Classic Salted 52g", "PepsiCo", "Snacks", 20, 0),
    ("8901764012273", "Coca-Cola 750ml", "Coca-Cola", "Beverages", 40, 0),
    ("8901030865278", "Surf Excel Easy Wash 1kg", "HUL", "Home Care", 140, 0),
    ("8901030793913", "Dove Cream Beauty Bar 100g", "HUL", "Personal Care", 62, 50),
    ("8901207002519", "Dabur Red Paste 200g", "Dabur", "Personal Care", 109, 0),
    ("8904004400670", "Haldiram's Bhujia Sev 200g", "Haldiram's", "Snacks", 55, 0),
    ("8901088135061", "Parachute Coconut Oil 250ml", "Marico", "Personal Care", 112, 0),
];

#[derive(Parser)]
#[command(name = "seed")]
#[command(about = "Seed a kiosk database with a demo catalog")]
struct Args {
    /// Database file path
    #[arg(short, long, default_value = "./kiosk_dev.db")]
    db: String,

    /// Upsert even if the catalog is not empty
    #[arg(short, long)]
    force: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    println!("Kiosk Seed Data Generator");
    println!("=========================");
    println!("Database: {}", args.db);
    println!();

    let db = Database::new(DbConfig::new(&args.db)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 && !args.force {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed. Pass --force to overwrite.");
        return Ok(());
    }

    let now = Local::now()
        .naive_local()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string();

    let mut seeded = 0;
    for (index, (barcode, name, brand, category, rupees, paise)) in CATALOG.iter().enumerate() {
        let product = Product {
            product_id: index as i64 + 1,
            barcode: barcode.to_string(),
            product_name: name.to_string(),
            brand: brand.to_string(),
            category: category.to_string(),
            price: Money::from_major_minor(*rupees, *paise),
            stock_quantity: checkout_core::DEFAULT_STOCK_QUANTITY,
            description: String::new(),
            image_url: None,
            created_at: now.clone(),
            updated_at: now.clone(),
        };

        if let Err(e) = db.products().upsert(&product).await {
            eprintln!("Failed to insert {}: {}", product.barcode, e);
            continue;
        }
        seeded += 1;
    }

    println!();
    println!("✓ Seeded {} products", seeded);

    if let Some(sample) = db.products().get_by_barcode(CATALOG[0].0).await? {
        println!("  Lookup {}: {} @ {}", CATALOG[0].0, sample.display_name(), sample.price);
    }

    db.close().await;
    Ok(())
}
