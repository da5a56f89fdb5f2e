//! # Seed Data Generator
//!
//! Stocks a database file with the default catalog.
//!
//! ## Usage
//! ```bash
//! # Seed ./vending_machine.db
//! cargo run -p vend-db --bin seed
//!
//! # Specify database path
//! cargo run -p vend-db --bin seed -- --db ./data/vend.db
//! ```
//!
//! An already stocked database is left untouched.

use std::env;
use vend_db::{seed_default_products, Database, DbConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./vending_machine.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Vending Machine Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./vending_machine.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Vending Machine Seed Data Generator");
    println!("=====================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let inserted = seed_default_products(&db).await?;
    if inserted == 0 {
        let existing = db.products().count().await?;
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
    } else {
        println!("✓ Inserted {} products", inserted);
        for product in db.products().list_all().await? {
            println!(
                "  {:>3}  {:<12} {:<6} {:>10}  x{}",
                product.id,
                product.name,
                product.category,
                product.price().to_string(),
                product.quantity
            );
        }
    }

    db.close().await;

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
