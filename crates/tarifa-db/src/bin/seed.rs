//! # Seed Data Generator
//!
//! Populates the database with test catalog data for development.
//!
//! ## Usage
//! ```bash
//! # Generate 5,000 items (default)
//! cargo run -p tarifa-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p tarifa-db --bin seed -- --count 10000
//!
//! # Specify database path
//! cargo run -p tarifa-db --bin seed -- --db ./data/tarifa.db
//! ```
//!
//! ## Generated Data
//! - Items spread across all categories, SKU `{CATEGORY}-{INDEX}`
//! - Purchase costs between $1.00 and $200.00
//! - ~20% of items carry an explicit sale price
//! - A markup rule per category (25% - 45%)
//! - One wholesale price list and one "Talleres" discount group

use std::env;

use tarifa_core::Category;
use tarifa_db::{Database, DbConfig, NewItem, NewPriceList};

/// Part names per category for readable test data.
const PART_NAMES: &[(&str, &[&str])] = &[
    ("FRENOS", &["Pastilla delantera", "Disco ventilado", "Tambor trasero", "Liquido DOT4", "Caliper"]),
    ("MOTOR", &["Junta de culata", "Piston STD", "Bomba de aceite", "Correa distribucion", "Termostato"]),
    ("SUSPENSION", &["Amortiguador", "Espiral", "Rotula", "Buje barra", "Extremo direccion"]),
    ("ELECTRICO", &["Alternador", "Motor arranque", "Bateria 12V", "Bobina", "Sensor MAP"]),
    ("NEUMATICOS", &["Cubierta 175/65", "Cubierta 195/55", "Camara", "Llanta chapa", "Valvula"]),
    ("HIDRAULICO", &["Bomba hidraulica", "Manguera alta presion", "Cilindro", "Sello kit", "Filtro retorno"]),
    ("FILTROS", &["Filtro aceite", "Filtro aire", "Filtro combustible", "Filtro habitaculo", "Filtro caja"]),
    ("CARROCERIA", &["Paragolpes", "Guardabarros", "Capot", "Espejo exterior", "Optica delantera"]),
];

fn parse_args() -> (String, usize) {
    let args: Vec<String> = env::args().collect();
    let mut db_path = "./tarifa.db".to_string();
    let mut count = 5_000usize;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" if i + 1 < args.len() => {
                db_path = args[i + 1].clone();
                i += 2;
            }
            "--count" if i + 1 < args.len() => {
                count = args[i + 1].parse().unwrap_or(count);
                i += 2;
            }
            _ => i += 1,
        }
    }

    (db_path, count)
}

/// Cheap deterministic pseudo-random, good enough for seed data.
fn noise(n: usize) -> i64 {
    let x = (n as u64).wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    ((x >> 33) % 10_000) as i64
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (db_path, count) = parse_args();
    println!("Seeding {count} items into {db_path}");

    let db = Database::new(DbConfig::new(&db_path)).await?;

    // One markup rule per category: 25% .. 45%
    for (i, category) in Category::ALL.into_iter().enumerate() {
        let markup_bps = 2_500 + (i as u32 % 5) * 500;
        db.markup_rules().upsert(category, markup_bps, true).await?;
    }

    let mut item_ids = Vec::with_capacity(count);
    for n in 0..count {
        let category = Category::ALL[n % Category::ALL.len()];
        let names = PART_NAMES[n % PART_NAMES.len()].1;
        let base_name = names[n % names.len()];

        let purchase_cost_cents = 100 + noise(n) * 2; // $1.00 .. ~$201.00
        let explicit_sale_price_cents = if n % 5 == 0 {
            Some(purchase_cost_cents * 2)
        } else {
            None
        };

        let item = db
            .items()
            .insert(NewItem {
                sku: format!("{}-{:05}", category.as_str(), n),
                name: format!("{base_name} #{n}"),
                category,
                purchase_cost_cents,
                explicit_sale_price_cents,
            })
            .await?;
        item_ids.push(item.id);

        if (n + 1) % 1000 == 0 {
            println!("  {} items inserted", n + 1);
        }
    }

    // A wholesale list overriding the first few items.
    let list = db
        .price_lists()
        .insert(NewPriceList {
            name: "Mayorista".to_string(),
            list_type: tarifa_core::PriceListType::Wholesale,
            priority: 10,
            valid_from: None,
            valid_to: None,
        })
        .await?;
    for id in item_ids.iter().take(50) {
        db.price_lists().set_override(&list.id, id, 990).await?;
    }

    // A discount group with a handful of members.
    let group = db.customer_groups().insert("Talleres", 1_000).await?;
    for n in 0..10 {
        db.customer_groups().add_member(&group.id, &format!("cust-{n:03}")).await?;
    }

    let stats = db.pricing().dashboard(chrono::Utc::now()).await?;
    println!(
        "Done: {} items, {} priced, {} missing markup, {} missing price",
        stats.total_items, stats.priced_items, stats.items_missing_markup, stats.items_missing_sale_price
    );

    db.close().await;
    Ok(())
}
