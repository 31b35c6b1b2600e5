//! # Validation Module
//!
//! Input validation for catalog writes and checkout requests.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP handler (tally-api)                                     │
//! │  ├── JSON shape (deserialization)                                      │
//! │  └── THIS MODULE: field rules                                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  ├── UNIQUE(code), UNIQUE(product_id, quantity)                        │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tally_core::validation::{validate_product_code, validate_discount_quantity};
//!
//! validate_product_code("A").unwrap();
//! validate_discount_quantity(3).unwrap();
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::{MAX_CODE_LEN, MAX_DISCOUNT_QUANTITY, MAX_NAME_LEN, MAX_PRICE_CENTS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product code.
///
/// ## Rules
/// - Must not be empty
/// - At most `MAX_CODE_LEN` characters
/// - ASCII letters and digits only
///
/// ## Example
/// ```rust
/// use tally_core::validation::validate_product_code;
///
/// assert!(validate_product_code("A").is_ok());
/// assert!(validate_product_code("SKU42").is_ok());
/// assert!(validate_product_code("").is_err());
/// assert!(validate_product_code("A B").is_err());
/// ```
pub fn validate_product_code(code: &str) -> ValidationResult<()> {
    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }

    if code.len() > MAX_CODE_LEN {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: MAX_CODE_LEN,
        });
    }

    if !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "must contain only ASCII letters and digits".to_string(),
        });
    }

    Ok(())
}

/// Validates a product name.
///
/// ## Rules
/// - Must not be blank
/// - At most `MAX_NAME_LEN` characters
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a catalog price (unit or bundle).
///
/// ## Rules
/// - Non-negative; zero is allowed (free items)
/// - At most 9999.99 (six digits, two decimals)
///
/// ## Example
/// ```rust
/// use tally_core::money::Money;
/// use tally_core::validation::validate_price;
///
/// assert!(validate_price("unit_price", Money::from_cents(5000)).is_ok());
/// assert!(validate_price("unit_price", Money::zero()).is_ok());
/// assert!(validate_price("unit_price", Money::from_cents(-1)).is_err());
/// ```
pub fn validate_price(field: &str, price: Money) -> ValidationResult<()> {
    if price.is_negative() || price.cents() > MAX_PRICE_CENTS {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_PRICE_CENTS / 100,
        });
    }

    Ok(())
}

/// Validates a discount bundle size.
///
/// ## Rules
/// - At least 1 (a zero-unit bundle would divide by zero)
/// - At most `MAX_DISCOUNT_QUANTITY`
pub fn validate_discount_quantity(quantity: u32) -> ValidationResult<()> {
    if quantity == 0 || quantity > MAX_DISCOUNT_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_DISCOUNT_QUANTITY as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_product_code() {
        assert!(validate_product_code("A").is_ok());
        assert!(validate_product_code("abc123").is_ok());
        assert!(validate_product_code(&"Z".repeat(MAX_CODE_LEN)).is_ok());

        assert!(validate_product_code("").is_err());
        assert!(validate_product_code(" A").is_err());
        assert!(validate_product_code("A-1").is_err());
        assert!(validate_product_code("É").is_err());
        assert!(validate_product_code(&"Z".repeat(MAX_CODE_LEN + 1)).is_err());
    }

    #[test]
    fn test_validate_product_name() {
        assert!(validate_product_name("Product A").is_ok());
        assert!(validate_product_name("").is_err());
        assert!(validate_product_name("   ").is_err());
        assert!(validate_product_name(&"n".repeat(MAX_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price("unit_price", Money::zero()).is_ok());
        assert!(validate_price("unit_price", Money::from_cents(MAX_PRICE_CENTS)).is_ok());
        assert!(validate_price("unit_price", Money::from_cents(MAX_PRICE_CENTS + 1)).is_err());
        assert!(validate_price("unit_price", Money::from_cents(-100)).is_err());
    }

    #[test]
    fn test_validate_discount_quantity() {
        assert!(validate_discount_quantity(1).is_ok());
        assert!(validate_discount_quantity(3).is_ok());
        assert!(validate_discount_quantity(MAX_DISCOUNT_QUANTITY).is_ok());

        assert!(validate_discount_quantity(0).is_err());
        assert!(validate_discount_quantity(MAX_DISCOUNT_QUANTITY + 1).is_err());
    }
}
