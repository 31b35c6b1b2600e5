//! # Error Types
//!
//! Domain-specific error types for tally-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tally-core errors (this file)                                         │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  tally-db errors (separate crate)                                      │
//! │  └── DbError          - Catalog store failures                         │
//! │                                                                         │
//! │  HTTP errors (tally-api)                                               │
//! │  └── ApiError         - What the caller sees (status + JSON body)      │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → HTTP response          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## What Is NOT an Error
//! An unknown product code in a basket. The pricing engine skips it and
//! lists it in `PriceBreakdown::unknown_codes`; the request still succeeds.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A line or basket total does not fit in `Money`.
    ///
    /// ## When This Occurs
    /// - A catalog price far outside the validated range, times a quantity
    /// - Never for catalogs that passed validation and baskets within
    ///   `MAX_BASKET_ITEMS`
    #[error("Amount for {code} is too large to represent")]
    AmountOverflow { code: String },

    /// A discount rule with the same quantity already exists on the product.
    #[error("Product {code} already has a discount rule for {quantity} units")]
    DuplicateDiscountQuantity { code: String, quantity: u32 },

    /// Basket has exceeded the maximum number of items.
    #[error("Basket cannot have more than {max} items")]
    BasketTooLarge { max: usize },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value has the wrong JSON type (e.g. a string where a list belongs).
    #[error("{field} must be {expected}")]
    WrongType { field: String, expected: String },

    /// Invalid format (e.g. a price with three decimals).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
