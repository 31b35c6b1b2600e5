//! # Domain Types
//!
//! Catalog types shared by the pricing engine, the store and the HTTP layer.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────────┐        ┌─────────────────────┐                 │
//! │  │      Product        │ 1    * │    DiscountRule     │                 │
//! │  │  ─────────────────  │───────►│  ─────────────────  │                 │
//! │  │  id (UUID)          │        │  quantity (u32)     │                 │
//! │  │  code (business)    │        │  discount_price     │                 │
//! │  │  name               │        │  "3 for 130.00"     │                 │
//! │  │  unit_price (Money) │        └─────────────────────┘                 │
//! │  └──────────┬──────────┘                                                │
//! │             │ catalog_entry()                                           │
//! │             ▼                                                           │
//! │  ┌─────────────────────┐                                                │
//! │  │    CatalogEntry     │  What the pricing engine sees per code        │
//! │  │  unit_price         │                                                │
//! │  │  discount_rules     │                                                │
//! │  └─────────────────────┘                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! - `id`: UUID v4, immutable, used for database relations
//! - `code`: short business key ("A", "B"), what baskets are made of

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::validation::{
    validate_discount_quantity, validate_price, validate_product_code, validate_product_name,
};

// =============================================================================
// Discount Rule
// =============================================================================

/// A bulk-discount tier: `quantity` units of one product for `discount_price`.
///
/// Rules live on their product; a product has zero or more of them, at most
/// one per quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DiscountRule {
    /// Bundle size (> 0).
    pub quantity: u32,

    /// Price charged for exactly `quantity` units.
    #[ts(type = "number")]
    pub discount_price: Money,
}

impl DiscountRule {
    pub fn new(quantity: u32, discount_price: Money) -> Self {
        DiscountRule {
            quantity,
            discount_price,
        }
    }

    /// Checks quantity and price bounds.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_discount_quantity(self.quantity)?;
        validate_price("discount_price", self.discount_price)?;
        Ok(())
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product in the catalog, with its discount rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Short unique business code that baskets reference.
    pub code: String,

    /// Display name.
    pub name: String,

    /// Price of a single unit.
    #[ts(type = "number")]
    pub unit_price: Money,

    /// Discount rules, largest bundle first.
    pub discounts: Vec<DiscountRule>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the pricing view of this product.
    pub fn catalog_entry(&self) -> CatalogEntry {
        CatalogEntry {
            unit_price: self.unit_price,
            discount_rules: self.discounts.clone(),
        }
    }
}

// =============================================================================
// Catalog Entry
// =============================================================================

/// What the pricing engine needs to know about one product code.
///
/// `discount_rules` may be in any order; the engine sorts them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CatalogEntry {
    pub unit_price: Money,
    pub discount_rules: Vec<DiscountRule>,
}

impl CatalogEntry {
    pub fn new(unit_price: Money) -> Self {
        CatalogEntry {
            unit_price,
            discount_rules: Vec::new(),
        }
    }

    /// Builder-style helper for tests and seeds.
    pub fn with_rule(mut self, quantity: u32, discount_price: Money) -> Self {
        self.discount_rules
            .push(DiscountRule::new(quantity, discount_price));
        self
    }
}

// =============================================================================
// Write Models
// =============================================================================

/// Fields accepted when creating or replacing a product.
///
/// ## Example
/// ```rust
/// use tally_core::{Money, ProductDraft};
///
/// let draft = ProductDraft {
///     code: "A".to_string(),
///     name: "Product A".to_string(),
///     unit_price: Money::from_units(50),
/// };
/// assert!(draft.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductDraft {
    pub code: String,
    pub name: String,
    #[ts(type = "number")]
    pub unit_price: Money,
}

impl ProductDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_product_code(&self.code)?;
        validate_product_name(&self.name)?;
        validate_price("unit_price", self.unit_price)?;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
