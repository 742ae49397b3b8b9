//! # Seed Data Generator
//!
//! Resets the database to a demo bedding and linen shop.
//!
//! ## Usage
//! ```bash
//! # Seed ./billdesk.db (default)
//! cargo run -p billdesk-db --bin seed
//!
//! # Specify database path
//! cargo run -p billdesk-db --bin seed -- --db ./data/billdesk.db
//! ```
//!
//! ## What Gets Written
//! - Existing items, invoices and quotations are removed
//! - A 12-item catalog, priced from MRP with an optional discount
//! - Sample invoices and quotations created through `BillingService`,
//!   so every stored total comes from the tax engine

use chrono::Utc;
use clap::Parser;

use billdesk_core::{CustomerDetails, DocumentDraft, DocumentKind, Item, ItemInput, Money};
use billdesk_db::{BackupSnapshot, BillingService, Database, DbConfig, ServiceConfig};

/// (name, GST bps, MRP in rupees, discount bps)
const CATALOG: &[(&str, u32, i64, u32)] = &[
    ("Cotton Bedsheet Set (King Size)", 1800, 2500, 0),
    ("Premium Duvet Cover (Queen)", 1800, 1800, 1000),
    ("Silk Pillow Covers (Pair)", 1200, 1200, 0),
    ("Cotton Blanket (Double)", 1800, 3200, 500),
    ("Bath Towel Set (4 Pieces)", 1200, 1500, 0),
    ("Cotton Curtains (Pair)", 1800, 2800, 0),
    ("Mattress Protector (King)", 1200, 950, 0),
    ("Bed Runner (Queen)", 1200, 850, 0),
    ("Table Linen Set (6 Pieces)", 1200, 2200, 1000),
    ("Cotton Quilt Cover (King)", 1800, 2100, 0),
    ("Bath Mat Set (3 Pieces)", 1200, 750, 0),
    ("Premium Bedspread (King)", 1800, 4500, 1500),
];

struct SampleDocument {
    kind: DocumentKind,
    name: &'static str,
    mobile: &'static str,
    address: Option<&'static str>,
    /// (catalog index, quantity)
    lines: &'static [(usize, i64)],
    /// Per-unit discount on the first line, in rupees
    unit_discount: i64,
    /// Whole-bill discount, in rupees
    discount: i64,
}

const SAMPLES: &[SampleDocument] = &[
    SampleDocument {
        kind: DocumentKind::Invoice,
        name: "Priya Sharma",
        mobile: "+91 98765 43210",
        address: Some("14 Lake View Road, Bengaluru"),
        lines: &[(0, 2), (2, 1)],
        unit_discount: 0,
        discount: 100,
    },
    SampleDocument {
        kind: DocumentKind::Invoice,
        name: "Rahul Verma",
        mobile: "99887 76655",
        address: None,
        lines: &[(4, 3), (10, 2)],
        unit_discount: 50,
        discount: 0,
    },
    SampleDocument {
        kind: DocumentKind::Quotation,
        name: "Anita Desai",
        mobile: "09123456789",
        address: Some("2nd Floor, MG Road, Pune"),
        lines: &[(11, 1), (1, 2), (5, 2)],
        unit_discount: 0,
        discount: 500,
    },
    SampleDocument {
        kind: DocumentKind::Invoice,
        name: "Priya Sharma",
        mobile: "9876543210",
        address: Some("14 Lake View Road, Bengaluru"),
        lines: &[(3, 1), (6, 1)],
        unit_discount: 0,
        discount: 0,
    },
    SampleDocument {
        kind: DocumentKind::Quotation,
        name: "Kiran Rao",
        mobile: "+91-90000-12345",
        address: None,
        lines: &[(8, 4)],
        unit_discount: 100,
        discount: 0,
    },
];

/// Billdesk Seed Data Generator
#[derive(Debug, Parser)]
#[command(name = "seed")]
struct Args {
    /// Database file path
    #[arg(short, long, default_value = "./billdesk.db")]
    db: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let db_path = Args::parse().db;

    println!("🌱 Billdesk Seed Data Generator");
    println!("===============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let service = BillingService::new(db, ServiceConfig::default());

    // Restoring an empty snapshot clears every table in one transaction
    service.restore_backup(&BackupSnapshot::empty()).await?;
    println!("✓ Cleared existing data");

    println!();
    println!("Loading catalog...");
    let mut items: Vec<Item> = Vec::with_capacity(CATALOG.len());
    for (name, gst_rate_bps, mrp_rupees, discount_bps) in CATALOG {
        let item = service
            .create_item(&ItemInput {
                name: name.to_string(),
                gst_rate_bps: *gst_rate_bps,
                mrp_paise: Some(mrp_rupees * 100),
                discount_bps: (*discount_bps > 0).then_some(*discount_bps),
                price_paise: None,
            })
            .await?;
        println!("  {:<36} {}", item.name, item.price());
        items.push(item);
    }

    println!();
    println!("Creating sample documents...");
    let mut created = 0;
    let start = std::time::Instant::now();

    for sample in SAMPLES {
        let mut draft = DocumentDraft::new();
        for (idx, quantity) in sample.lines {
            let Some(item) = items.get(*idx) else {
                eprintln!("  Unknown catalog index {}", idx);
                continue;
            };
            let line = draft.add_item(item)?;
            draft.set_quantity(line, *quantity)?;
        }
        if sample.unit_discount > 0 && !draft.is_empty() {
            let outcome = draft.set_discount_per_unit(0, sample.unit_discount * 100)?;
            if let Some(warning) = outcome.warning() {
                println!("  ⚠ {}", warning);
            }
        }
        draft.set_discount(sample.discount * 100);

        let submission = draft.into_submission(
            sample.kind,
            CustomerDetails {
                name: sample.name.to_string(),
                mobile: sample.mobile.to_string(),
                tax_id: None,
                address: sample.address.map(str::to_string),
            },
        );

        match service.create_document(&submission).await {
            Ok(doc) => {
                created += 1;
                println!(
                    "  {} #{} for {}: {}",
                    doc.kind,
                    doc.id,
                    doc.customer_name,
                    doc.total()
                );
            }
            Err(e) => eprintln!("  Failed to create {} for {}: {}", sample.kind, sample.name, e),
        }
    }

    println!();
    println!("✓ Created {} documents in {:?}", created, start.elapsed());

    let summary = service.dashboard(Utc::now()).await?;
    println!(
        "  Sales this month: {}",
        Money::from_paise(summary.monthly_total_paise)
    );
    println!("  Customers: {}", service.customer_directory().await?.len());

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
