//! # Pricing Engine
//!
//! Computes the total of a basket from unit prices and bulk-discount rules.
//!
//! ## Algorithm: Greedy Largest-Bundle-First
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Product A: 50.00 each, rules [2 for 90.00, 3 for 130.00]              │
//! │  Basket: 8 × A                                                          │
//! │                                                                         │
//! │  1. Sort rules by quantity DESCENDING   → [3 for 130.00, 2 for 90.00]  │
//! │                                                                         │
//! │  2. remaining = 8                                                       │
//! │     rule 3: 8 / 3 = 2 bundles  → +260.00   remaining = 8 % 3 = 2       │
//! │     rule 2: 2 / 2 = 1 bundle   → + 90.00   remaining = 2 % 2 = 0       │
//! │                                                                         │
//! │  3. leftover: 0 × 50.00        → +  0.00                               │
//! │                                                                         │
//! │  Line total: 350.00                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Policy Notes
//! - Rules are applied strictly by descending quantity, never by price per
//!   unit. A smaller bundle is never preferred over a larger one even when it
//!   would be cheaper.
//! - All applicable rules stack: after the largest bundle, the remainder is
//!   checked against the next rule, and so on.
//! - Unknown codes are skipped and reported, never an error.
//! - The engine is pure: no I/O, no shared state, the catalog is only read.
//!   Calling it concurrently from many request tasks needs no locking.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;
use ts_rs::TS;

use crate::basket::Basket;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{CatalogEntry, DiscountRule};

// =============================================================================
// Catalog Lookup
// =============================================================================

/// Read-only access to the catalog, one product code at a time.
///
/// ## Implementations
/// - [`InMemoryCatalog`]: tests and resolved snapshots
/// - `HashMap<String, CatalogEntry>`: ad-hoc catalogs
/// - tally-db builds an `InMemoryCatalog` snapshot from SQLite per request
pub trait CatalogLookup {
    /// Returns the price data for `code`, or `None` if the code is unknown.
    fn get(&self, code: &str) -> Option<&CatalogEntry>;
}

impl CatalogLookup for HashMap<String, CatalogEntry> {
    fn get(&self, code: &str) -> Option<&CatalogEntry> {
        HashMap::get(self, code)
    }
}

impl<T: CatalogLookup + ?Sized> CatalogLookup for &T {
    fn get(&self, code: &str) -> Option<&CatalogEntry> {
        (**self).get(code)
    }
}

/// A catalog held in memory.
///
/// ## Example
/// ```rust
/// use tally_core::{CatalogEntry, InMemoryCatalog, Money};
///
/// let catalog = InMemoryCatalog::new()
///     .with_product("A", CatalogEntry::new(Money::from_units(50)).with_rule(3, Money::from_units(130)))
///     .with_product("C", CatalogEntry::new(Money::from_units(20)));
///
/// assert_eq!(catalog.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryCatalog {
    entries: HashMap<String, CatalogEntry>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        InMemoryCatalog::default()
    }

    /// Inserts or replaces the entry for `code`.
    pub fn insert(&mut self, code: impl Into<String>, entry: CatalogEntry) {
        self.entries.insert(code.into(), entry);
    }

    /// Builder-style insert.
    pub fn with_product(mut self, code: impl Into<String>, entry: CatalogEntry) -> Self {
        self.insert(code, entry);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CatalogLookup for InMemoryCatalog {
    fn get(&self, code: &str) -> Option<&CatalogEntry> {
        self.entries.get(code)
    }
}

impl FromIterator<(String, CatalogEntry)> for InMemoryCatalog {
    fn from_iter<I: IntoIterator<Item = (String, CatalogEntry)>>(iter: I) -> Self {
        InMemoryCatalog {
            entries: iter.into_iter().collect(),
        }
    }
}

// =============================================================================
// Result Types
// =============================================================================

/// Outcome of pricing one basket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct PriceBreakdown {
    /// Sum of all line totals.
    #[ts(type = "number")]
    pub total: Money,

    /// Number of distinct recognized codes.
    pub items_processed: usize,

    /// Codes that have no product, sorted.
    pub unknown_codes: BTreeSet<String>,

    /// One line per recognized code, sorted by code.
    pub lines: Vec<LineBreakdown>,
}

/// How one product's units were priced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct LineBreakdown {
    pub code: String,

    /// Units of this code in the basket.
    #[ts(type = "number")]
    pub quantity: u64,

    /// Bundles applied, largest first.
    pub bundles: Vec<AppliedBundle>,

    /// Units charged at the unit price.
    #[ts(type = "number")]
    pub leftover_units: u64,

    #[ts(type = "number")]
    pub unit_price: Money,

    #[ts(type = "number")]
    pub line_total: Money,
}

/// A discount rule applied `times` times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct AppliedBundle {
    pub quantity: u32,
    #[ts(type = "number")]
    pub times: u64,
    #[ts(type = "number")]
    pub subtotal: Money,
}

// =============================================================================
// Engine
// =============================================================================

/// Prices a basket against a catalog.
///
/// ## Errors
/// `CoreError::AmountOverflow` when a line or the total does not fit in
/// `Money`. Validated catalogs and baskets within `MAX_BASKET_ITEMS` stay
/// far below that limit.
///
/// ## Example
/// ```rust
/// use tally_core::{price_basket, Basket, CatalogEntry, InMemoryCatalog, Money};
///
/// let catalog = InMemoryCatalog::new().with_product(
///     "A",
///     CatalogEntry::new(Money::from_units(50)).with_rule(3, Money::from_units(130)),
/// );
///
/// let basket = Basket::from_codes(["A", "A", "A", "A", "Z"]);
/// let result = price_basket(&basket, &catalog).unwrap();
/// assert_eq!(result.total, Money::from_units(180));
/// assert_eq!(result.items_processed, 1);
/// assert!(result.unknown_codes.contains("Z"));
/// ```
pub fn price_basket<C>(basket: &Basket, catalog: &C) -> CoreResult<PriceBreakdown>
where
    C: CatalogLookup + ?Sized,
{
    let mut total = Money::zero();
    let mut lines = Vec::with_capacity(basket.distinct_len());
    let mut unknown_codes = BTreeSet::new();

    for (code, count) in basket.counts() {
        let Some(entry) = catalog.get(code) else {
            unknown_codes.insert(code.to_string());
            continue;
        };

        let line = price_line(code, count, entry)?;
        total = total
            .checked_add(line.line_total)
            .ok_or_else(|| overflow(code))?;
        lines.push(line);
    }

    Ok(PriceBreakdown {
        total,
        items_processed: lines.len(),
        unknown_codes,
        lines,
    })
}

/// Prices `count` units of a single product.
pub fn price_line(code: &str, count: u64, entry: &CatalogEntry) -> CoreResult<LineBreakdown> {
    let mut remaining = count;
    let mut line_total = Money::zero();
    let mut bundles = Vec::new();

    for rule in application_order(&entry.discount_rules) {
        // Rejected by validation; skipped here rather than dividing by zero.
        if rule.quantity == 0 {
            continue;
        }

        let size = u64::from(rule.quantity);
        if remaining < size {
            continue;
        }

        let times = remaining / size;
        let subtotal = rule
            .discount_price
            .checked_mul_quantity(times)
            .ok_or_else(|| overflow(code))?;
        line_total = line_total
            .checked_add(subtotal)
            .ok_or_else(|| overflow(code))?;
        remaining %= size;

        bundles.push(AppliedBundle {
            quantity: rule.quantity,
            times,
            subtotal,
        });
    }

    let leftover = entry
        .unit_price
        .checked_mul_quantity(remaining)
        .ok_or_else(|| overflow(code))?;
    line_total = line_total
        .checked_add(leftover)
        .ok_or_else(|| overflow(code))?;

    Ok(LineBreakdown {
        code: code.to_string(),
        quantity: count,
        bundles,
        leftover_units: remaining,
        unit_price: entry.unit_price,
        line_total,
    })
}

fn overflow(code: &str) -> CoreError {
    CoreError::AmountOverflow {
        code: code.to_string(),
    }
}

/// Returns the rules in the order the engine applies them: quantity
/// descending. The sort is stable, so rules sharing a quantity keep their
/// input order (only the first of them can ever match).
pub fn application_order(rules: &[DiscountRule]) -> Vec<DiscountRule> {
    let mut ordered = rules.to_vec();
    ordered.sort_by(|a, b| b.quantity.cmp(&a.quantity));
    ordered
}

// =============================================================================
// Unit Tests
// =============================================================================
