//! # Seed Data Generator
//!
//! Populates a development database with medicines and a few sales.
//!
//! ## Usage
//! ```bash
//! # 60 medicines (default) into ./hms_dev.db
//! cargo run -p hms-db --bin seed
//!
//! # Custom amount and path
//! cargo run -p hms-db --bin seed -- --count 200 --db ./data/hms.db
//! ```
//!
//! ## Generated Medicines
//! Names come from a fixed list per category, combined with a strength:
//! - Antibiotic, Analgesic, Antihistamine, Antacid, Supplement
//! - Price: 1.49 - 24.99
//! - Stock: 20 - 220
//!
//! Sales are recorded through the ledger, so stock is already drawn down.

use std::env;

use hms_core::{NewMedicine, NewSale};
use hms_db::{Database, DbConfig};

/// Medicine names per category.
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Antibiotic",
        &["Amoxicillin", "Azithromycin", "Ciprofloxacin", "Doxycycline"],
    ),
    (
        "Analgesic",
        &["Paracetamol", "Ibuprofen", "Naproxen", "Aspirin"],
    ),
    (
        "Antihistamine",
        &["Cetirizine", "Loratadine", "Fexofenadine"],
    ),
    ("Antacid", &["Omeprazole", "Ranitidine", "Calcium Carbonate"]),
    ("Supplement", &["Vitamin C", "Vitamin D3", "Zinc", "Iron"]),
];

/// Strength variants.
const STRENGTHS: &[&str] = &["100mg", "250mg", "500mg", "1g"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 60;
    let mut db_path = String::from("./hms_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-c" | "--count" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(60);
                    i += 1;
                }
            }
            "-d" | "--db" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "-h" | "--help" => {
                println!("HMS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of medicines to generate (default: 60)");
                println!("  -d, --db <PATH>    Database file path (default: ./hms_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 HMS Seed Data Generator");
    println!("==========================");
    println!("Database:  {}", db_path);
    println!("Medicines: {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.medicines().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} medicines", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let start = std::time::Instant::now();
    let mut medicine_ids = Vec::with_capacity(count);

    'outer: for (category, names) in CATEGORIES {
        for name in names.iter() {
            for strength in STRENGTHS {
                if medicine_ids.len() >= count {
                    break 'outer;
                }

                let medicine = generate_medicine(category, name, strength, medicine_ids.len());
                match db.medicines().insert(&medicine).await {
                    Ok(inserted) => medicine_ids.push(inserted.id),
                    Err(e) => eprintln!("Failed to insert {}: {}", medicine.name, e),
                }
            }
        }
    }

    println!("✓ Generated {} medicines", medicine_ids.len());

    // One small sale for every third medicine.
    let ledger = db.ledger();
    let mut sales = 0;
    for (idx, id) in medicine_ids.iter().enumerate().step_by(3) {
        let quantity = 1 + (idx % 5) as i64;
        if let Err(e) = ledger.create(NewSale::new(id, quantity)).await {
            eprintln!("Failed to record sale for {}: {}", id, e);
            continue;
        }
        sales += 1;
    }

    println!("✓ Recorded {} sales", sales);
    println!();
    println!("✓ Seed complete in {:?}", start.elapsed());

    Ok(())
}

/// Generates one medicine with deterministic pseudo-random price and stock.
fn generate_medicine(category: &str, name: &str, strength: &str, seed: usize) -> NewMedicine {
    NewMedicine {
        name: format!("{} {}", name, strength),
        category: category.to_string(),
        description: format!("{} ({})", name, category.to_lowercase()),
        price_cents: 149 + ((seed * 37) % 2350) as i64,
        stock: 20 + ((seed * 13) % 201) as i64,
    }
}
