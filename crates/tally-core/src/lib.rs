//! # tally-core: Pure Pricing Logic for Tally
//!
//! This crate is the **heart** of Tally. It prices checkout baskets against
//! a catalog of unit prices and bulk-discount rules, with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Tally Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    HTTP (tally-api, axum)                       │   │
//! │  │      POST /checkout        /products CRUD        /health        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tally-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  basket   │  │  pricing  │  │   │
//! │  │   │  Product  │  │   Money   │  │  Basket   │  │ price_    │  │   │
//! │  │   │ Discount  │  │ (cents)   │  │  counts   │  │  basket   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    tally-db (SQLite catalog)                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, DiscountRule, CatalogEntry)
//! - [`money`] - Fixed-point money in cents (no floating point!)
//! - [`basket`] - Basket parsing and per-code counts
//! - [`pricing`] - The pricing engine and the `CatalogLookup` trait
//! - [`error`] - Domain error types
//! - [`validation`] - Field rules for catalog writes
//!
//! ## Example Usage
//!
//! ```rust
//! use tally_core::{price_basket, Basket, CatalogEntry, InMemoryCatalog, Money};
//!
//! let catalog = InMemoryCatalog::new()
//!     .with_product("A", CatalogEntry::new(Money::from_units(50)).with_rule(3, Money::from_units(130)))
//!     .with_product("B", CatalogEntry::new(Money::from_units(30)).with_rule(2, Money::from_units(45)));
//!
//! let basket = Basket::from_codes(["A", "B", "A", "A", "B"]);
//! let result = price_basket(&basket, &catalog).unwrap();
//!
//! assert_eq!(result.total.to_string(), "175.00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod basket;
pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use basket::Basket;
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use pricing::{
    price_basket, AppliedBundle, CatalogLookup, InMemoryCatalog, LineBreakdown, PriceBreakdown,
};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum number of codes in one checkout request.
pub const MAX_BASKET_ITEMS: usize = 10_000;

/// Maximum product code length.
pub const MAX_CODE_LEN: usize = 16;

/// Maximum product name length.
pub const MAX_NAME_LEN: usize = 100;

/// Highest storable price, 9999.99.
pub const MAX_PRICE_CENTS: i64 = 999_999;

/// Largest bundle size a discount rule may have.
pub const MAX_DISCOUNT_QUANTITY: u32 = 999;
