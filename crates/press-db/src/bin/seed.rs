//! # Seed Catalog Generator
//!
//! Populates the database with a starter service catalog for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./press_dev.db with the built-in price list
//! cargo run -p press-db --bin seed
//!
//! # Specify database path
//! cargo run -p press-db --bin seed -- --db ./data/press.db
//!
//! # Use a shop's own pricing configuration
//! cargo run -p press-db --bin seed -- --config ./pricing.json
//! ```
//!
//! ## Generated Services
//! - Document printing (color / black & white rates, paper surcharges)
//! - Tarpaulin printing (per square foot, eyelets, rope, stand)
//! - Lamination (base price with size multipliers)
//! - A handful of flat-priced standard services

use std::env;

use press_core::{Money, PricingConfig, ServiceType};
use press_db::{Database, DbConfig};

/// Built-in pricing configuration, in the same shape a shop would supply.
const DEFAULT_PRICING: &str = r#"{
    "document": {
        "colorPageRate": 1000,
        "blackPageRate": 500,
        "paperTypes": { "Glossy": 500, "Matte": 300, "Sticker": 1500 }
    },
    "tarpaulin": {
        "basePrice": 2500,
        "eyeletPrice": 500,
        "ropePrice": 5000,
        "standPrice": 25000
    },
    "lamination": {
        "basePrice": 2000,
        "sizeMultipliers": { "ID Size": 1.0, "Big ID": 1.25, "A5": 1.5, "A4": 2.0, "Long": 2.5 }
    }
}"#;

/// Catalog entries for the dynamic services.
const DYNAMIC_SERVICES: &[(&str, ServiceType)] = &[
    ("Document Printing", ServiceType::Document),
    ("Tarpaulin Printing", ServiceType::Tarpaulin),
    ("Lamination", ServiceType::Lamination),
];

/// Flat-priced services, in cents.
const STANDARD_SERVICES: &[(&str, i64)] = &[
    ("Ring Binding", 5000),
    ("Scanning (per page)", 1000),
    ("Photo Printing 4R", 1500),
    ("ID Photo Package", 8000),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let mut db_path = "./press_dev.db".to_string();
    let mut config_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("PrintPress Seed Catalog Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>       Database file path (default: ./press_dev.db)");
                println!("  -c, --config <PATH>   Pricing configuration JSON (default: built-in)");
                println!("  -h, --help            Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let pricing_json = match &config_path {
        Some(path) => std::fs::read_to_string(path)?,
        None => DEFAULT_PRICING.to_string(),
    };
    let pricing = PricingConfig::from_json(&pricing_json)?;

    println!("🌱 PrintPress Seed Catalog Generator");
    println!("====================================");
    println!("Database: {}", db_path);
    println!(
        "Pricing:  {}",
        config_path.as_deref().unwrap_or("built-in defaults")
    );
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.services().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} services", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Adding services...");

    let mut added = 0;
    for (name, service_type) in DYNAMIC_SERVICES {
        let rules = pricing.rule_set_for(*service_type, Money::zero());
        match db.services().insert(name, &rules).await {
            Ok(service) => {
                println!("  + {} ({})", service.name, service.service_type);
                added += 1;
            }
            Err(e) => eprintln!("Failed to insert {}: {}", name, e),
        }
    }

    for (name, cents) in STANDARD_SERVICES {
        let rules = pricing.rule_set_for(ServiceType::Standard, Money::from_cents(*cents));
        match db.services().insert(name, &rules).await {
            Ok(service) => {
                println!("  + {} ({} flat)", service.name, Money::from_cents(*cents));
                added += 1;
            }
            Err(e) => eprintln!("Failed to insert {}: {}", name, e),
        }
    }

    println!();
    println!("✓ Added {} services", added);
    println!(
        "  Active catalog: {} entries",
        db.services().list_active().await?.len()
    );

    db.close().await;
    println!();
    println!("✓ Seed complete!");

    Ok(())
}
