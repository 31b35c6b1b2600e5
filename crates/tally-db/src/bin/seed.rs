//! # Seed Reference Catalog
//!
//! Resets a database to the reference catalog.
//!
//! ## Usage
//! ```bash
//! # Seed ./tally.db (default)
//! cargo run -p tally-db --bin seed
//!
//! # Specify database path
//! cargo run -p tally-db --bin seed -- --db ./data/tally.db
//! ```
//!
//! Existing products and rules are deleted first, so running it twice
//! leaves the same four products.

use std::env;

use anyhow::Context;
use tally_db::{seed_reference_catalog, Database, DbConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_DB_PATH: &str = "./tally.db";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let default_path =
        env::var("DATABASE_PATH").unwrap_or_else(|_| DEFAULT_DB_PATH.to_string());

    let db_path = match parse_args(&args, default_path)? {
        Command::Seed { db_path } => db_path,
        Command::Help => {
            print_help();
            return Ok(());
        }
    };

    info!(path = %db_path, "Seeding reference catalog");

    let db = Database::new(DbConfig::new(&db_path))
        .await
        .with_context(|| format!("opening database at {}", db_path))?;

    let seeded = seed_reference_catalog(&db)
        .await
        .context("seeding reference catalog")?;

    for product in db.products().list().await? {
        let bundles: Vec<String> = product
            .discounts
            .iter()
            .map(|rule| format!("{} for {}", rule.quantity, rule.discount_price))
            .collect();
        println!(
            "  {:<4} {:>8}  {}",
            product.code,
            product.unit_price.to_string(),
            bundles.join(", ")
        );
    }

    info!(products = seeded, "Seed complete");
    db.close().await;
    Ok(())
}

/// What the command line asked for.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Seed { db_path: String },
    Help,
}

/// Parses arguments (program name excluded).
fn parse_args(args: &[String], default_path: String) -> anyhow::Result<Command> {
    let mut db_path = default_path;
    let mut args = args.iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--db" | "-d" => match args.next() {
                Some(path) => db_path = path.clone(),
                None => anyhow::bail!("{} requires a path (try --help)", arg),
            },
            "--help" | "-h" => return Ok(Command::Help),
            other => anyhow::bail!("unknown argument: {} (try --help)", other),
        }
    }

    Ok(Command::Seed { db_path })
}

fn print_help() {
    println!("Tally Seed");
    println!();
    println!("Usage: seed [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -d, --db <PATH>    Database file path (default: $DATABASE_PATH or ./tally.db)");
    println!("  -h, --help         Show this help message");
}
