//! # Seed Data Generator
//!
//! Populates the database with the demo coupon catalogue.
//!
//! ## Usage
//! ```bash
//! # Seed ./jewelbox_dev.db
//! cargo run -p jewelbox-db --bin seed
//!
//! # Specify database path
//! cargo run -p jewelbox-db --bin seed -- --db ./data/jewelbox.db
//!
//! # Overwrite coupons that already exist
//! cargo run -p jewelbox-db --bin seed -- --force
//! ```
//!
//! ## Generated Coupons
//! | Code       | Discount | Rules                          |
//! |------------|----------|--------------------------------|
//! | WELCOME10  | 10%      | first order only               |
//! | SAVE30     | ₪30.00   |                                |
//! | SPRING15   | 15%      | expires at the end of May      |
//! | VIP100     | 100%     | inactive until enabled         |

use chrono::{Datelike, NaiveDate, Utc};
use std::env;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use jewelbox_core::{Coupon, CouponDiscount, Money, Percentage};
use jewelbox_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,jewelbox=debug,sqlx=warn")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./jewelbox_dev.db");
    let mut force = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--force" | "-f" => force = true,
            "--help" | "-h" => {
                println!("Jewelbox Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./jewelbox_dev.db)");
                println!("  -f, --force        Overwrite existing coupons");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => warn!(argument = %other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    info!(path = %db_path, "Seeding database");

    let db = Database::new(DbConfig::new(&db_path)).await?;

    let existing = db.coupons().count().await?;
    if existing > 0 && !force {
        warn!(
            existing,
            "Database already has coupons; skipping (use --force to overwrite)"
        );
        return Ok(());
    }

    let coupons = demo_coupons(Utc::now().date_naive());
    for coupon in &coupons {
        db.coupons().upsert(coupon).await?;
        info!(code = %coupon.code, discount = %coupon.discount, "Seeded coupon");
    }

    info!(count = coupons.len(), "Seed complete");
    db.close().await;
    Ok(())
}

/// The demo catalogue, with SPRING15 expiring at the end of May.
fn demo_coupons(today: NaiveDate) -> Vec<Coupon> {
    let spring_year = if today.month() > 5 {
        today.year() + 1
    } else {
        today.year()
    };

    let mut coupons = vec![
        Coupon::new("WELCOME10", CouponDiscount::Percentage(Percentage::from_percent(10)))
            .first_order_only(),
        Coupon::new("SAVE30", CouponDiscount::Fixed(Money::from_major(30))),
        Coupon::new("VIP100", CouponDiscount::Percentage(Percentage::FULL)).inactive(),
    ];

    if let Some(end_of_may) = NaiveDate::from_ymd_opt(spring_year, 5, 31) {
        coupons.push(
            Coupon::new("SPRING15", CouponDiscount::Percentage(Percentage::from_percent(15)))
                .expiring_on(end_of_may),
        );
    }

    coupons
}
