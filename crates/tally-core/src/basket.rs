//! # Basket Module
//!
//! A basket is the multiset of product codes submitted for one checkout.
//!
//! ## From Request Body to Counts
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  {"items": ["A", "B", "A", "Z", "A"]}                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Basket::from_json ← rejects anything that is not a list of strings    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  counts: { "A": 3, "B": 1, "Z": 1 }   (sorted by code, order-free)     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Codes are taken verbatim. No trimming or case folding happens here; a
//! code that is not in the catalog is the pricing engine's business.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::MAX_BASKET_ITEMS;

/// Item codes of one checkout, counted per distinct code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Basket {
    counts: BTreeMap<String, u64>,
    len: usize,
}

impl Basket {
    /// Creates an empty basket.
    pub fn new() -> Self {
        Basket::default()
    }

    /// Builds a basket from any sequence of codes.
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::Basket;
    ///
    /// let basket = Basket::from_codes(["A", "B", "A"]);
    /// assert_eq!(basket.len(), 3);
    /// assert_eq!(basket.count_of("A"), 2);
    /// ```
    pub fn from_codes<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut basket = Basket::new();
        for code in codes {
            basket.add(code);
        }
        basket
    }

    /// Parses a checkout request body of the form `{"items": [..]}`.
    ///
    /// ## Errors
    /// - body is not a JSON object → `WrongType { field: "body" }`
    /// - `items` is missing → `Required { field: "items" }`
    /// - `items` is not a list, or holds a non-string → `WrongType`
    /// - more than `MAX_BASKET_ITEMS` codes → `BasketTooLarge`
    ///
    /// ## Example
    /// ```rust
    /// use serde_json::json;
    /// use tally_core::Basket;
    ///
    /// let basket = Basket::from_json(&json!({"items": ["A", "A"]})).unwrap();
    /// assert_eq!(basket.count_of("A"), 2);
    ///
    /// assert!(Basket::from_json(&json!({"items": "AA"})).is_err());
    /// ```
    pub fn from_json(body: &Value) -> CoreResult<Self> {
        let object = body.as_object().ok_or_else(|| ValidationError::WrongType {
            field: "body".to_string(),
            expected: "a JSON object".to_string(),
        })?;

        let items = object.get("items").ok_or_else(|| ValidationError::Required {
            field: "items".to_string(),
        })?;

        Basket::from_items(items)
    }

    /// Parses the `items` value itself.
    pub fn from_items(items: &Value) -> CoreResult<Self> {
        let list = items.as_array().ok_or_else(|| ValidationError::WrongType {
            field: "items".to_string(),
            expected: "a list of product codes".to_string(),
        })?;

        if list.len() > MAX_BASKET_ITEMS {
            return Err(CoreError::BasketTooLarge {
                max: MAX_BASKET_ITEMS,
            });
        }

        let mut basket = Basket::new();
        for (index, item) in list.iter().enumerate() {
            let code = item.as_str().ok_or_else(|| ValidationError::WrongType {
                field: format!("items[{}]", index),
                expected: "a string product code".to_string(),
            })?;
            basket.add(code);
        }

        Ok(basket)
    }

    /// Adds one unit of `code`.
    pub fn add(&mut self, code: impl Into<String>) {
        *self.counts.entry(code.into()).or_insert(0) += 1;
        self.len += 1;
    }

    /// Total number of units, duplicates included.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of distinct codes.
    pub fn distinct_len(&self) -> usize {
        self.counts.len()
    }

    /// How many units of `code` the basket holds.
    pub fn count_of(&self, code: &str) -> u64 {
        self.counts.get(code).copied().unwrap_or(0)
    }

    /// Distinct codes with their counts, ordered by code.
    pub fn counts(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.counts.iter().map(|(code, count)| (code.as_str(), *count))
    }

    /// Distinct codes, ordered.
    pub fn codes(&self) -> impl Iterator<Item = &str> + '_ {
        self.counts.keys().map(String::as_str)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
