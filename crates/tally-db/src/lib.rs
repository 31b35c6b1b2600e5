//! # tally-db: SQLite Catalog Store for Tally
//!
//! This crate stores the product catalog (unit prices and bulk-discount
//! rules) in SQLite, using sqlx for async access.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tally Data Flow                                  │
//! │                                                                         │
//! │  HTTP handler (POST /checkout, /products CRUD)                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     tally-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ ProductRepo   │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ DiscountRepo  │    │ 001_catalog  │  │   │
//! │  │   │               │    │ CatalogStore  │    │   .sql       │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (./tally.db)                │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Product and discount rule repositories
//! - [`catalog`] - Per-request catalog snapshots for the pricing engine
//! - [`seed`] - Reference catalog (A, B, C, D)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tally_core::{price_basket, Basket};
//! use tally_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("tally.db")).await?;
//!
//! let basket = Basket::from_codes(["A", "A", "A", "B"]);
//! let snapshot = db.catalog().snapshot(&basket).await?;
//! let result = price_basket(&basket, &snapshot)?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod seed;

// =============================================================================
// Re-exports
// =============================================================================

pub use catalog::CatalogStore;
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use seed::seed_reference_catalog;

// Repository re-exports for convenience
pub use repository::discount::DiscountRuleRepository;
pub use repository::product::ProductRepository;
