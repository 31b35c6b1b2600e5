//! # Money Module
//!
//! Provides the `Money` type: a fixed-point decimal with exactly two places.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Summing 1000 baskets of 19.99 in f64 drifts away from 19990.00         │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    19.99 is stored as 1999, sums are exact                              │
//! │    Floats only appear when a total is written to JSON                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Format
//! - **Serialize**: JSON number (`130.0`). This is the one lossy step and it
//!   happens at the very edge, after all arithmetic is done.
//! - **Deserialize**: JSON number or string. The value is re-read from its
//!   decimal text (`"19.99"` -> 1999 cents), never through float arithmetic.
//!   More than two fractional digits is an error, not a rounding.
//!
//! ## Usage
//! ```rust
//! use tally_core::money::Money;
//!
//! let unit = Money::from_cents(5000);           // 50.00
//! let bundle: Money = "130.00".parse().unwrap(); // 130.00
//!
//! let total = bundle.checked_add(unit).unwrap();
//! assert_eq!(total.cents(), 18000);
//! assert_eq!(total.to_string(), "180.00");
//! ```

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};
use std::str::FromStr;

use crate::error::ValidationError;

/// Number of fractional digits carried by every `Money` value.
pub const SCALE: u32 = 2;

const CENTS_PER_UNIT: i64 = 100;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary amount in cents (fixed-point, 2 decimal places).
///
/// ## Design Decisions
/// - **i64 (signed)**: arithmetic stays closed under subtraction; validation
///   rejects negative prices before they reach the catalog
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Manual serde**: numbers on the wire, decimal text on the way in
///
/// ## Where Money Flows
/// ```text
/// Product.unit_price ───────┐
///                           ├──► PricingEngine ──► PriceBreakdown.total
/// DiscountRule.discount_price┘                          │
///                                                       ▼
///                                         {"total_price": 180.0}  (f64, edge only)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // 10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole units (50 -> 50.00).
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Money(units * CENTS_PER_UNIT)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-unit portion (10.99 -> 10).
    #[inline]
    pub const fn units(&self) -> i64 {
        self.0 / CENTS_PER_UNIT
    }

    /// Returns the fractional portion in cents, always 0-99.
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % CENTS_PER_UNIT).abs()
    }

    /// Zero.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity, or `None` if the result does not
    /// fit in an `i64` of cents.
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::money::Money;
    ///
    /// let bundle = Money::from_cents(13000);
    /// assert_eq!(bundle.checked_mul_quantity(2), Some(Money::from_cents(26000)));
    /// assert_eq!(Money::from_cents(i64::MAX).checked_mul_quantity(2), None);
    /// ```
    #[inline]
    pub fn checked_mul_quantity(&self, qty: u64) -> Option<Self> {
        let qty = i64::try_from(qty).ok()?;
        self.0.checked_mul(qty).map(Money)
    }

    /// Adds two amounts, or `None` on overflow.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Converts to `f64` for the JSON boundary.
    ///
    /// ## Note
    /// Lossy for very large amounts. Never feed the result back into
    /// arithmetic.
    #[inline]
    pub fn to_f64(&self) -> f64 {
        self.0 as f64 / CENTS_PER_UNIT as f64
    }

    /// Parses decimal text with at most two fractional digits.
    ///
    /// ## Accepted
    /// `"50"`, `"50.0"`, `"50.00"`, `"-1.5"`, `" 7.25 "`
    ///
    /// ## Rejected
    /// `""`, `"."`, `".5"`, `"1.999"`, `"1e3"`, `"abc"`, values past i64 cents
    pub fn parse_decimal(text: &str) -> Result<Self, ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: reason.to_string(),
        };

        let text = text.trim();
        let (negative, digits) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };

        let (whole, fraction) = match digits.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (digits, ""),
        };

        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("expected a decimal number"));
        }
        if !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("expected a decimal number"));
        }
        if fraction.len() > SCALE as usize {
            return Err(invalid("at most 2 decimal places are allowed"));
        }

        let overflow = || invalid("amount is too large");

        let whole: i64 = whole.parse().map_err(|_| overflow())?;
        let mut fraction_cents: i64 = 0;
        for (i, b) in fraction.bytes().enumerate() {
            let digit = (b - b'0') as i64;
            fraction_cents += digit * 10_i64.pow(SCALE - 1 - i as u32);
        }

        let cents = whole
            .checked_mul(CENTS_PER_UNIT)
            .and_then(|c| c.checked_add(fraction_cents))
            .ok_or_else(overflow)?;

        Ok(Money(if negative { -cents } else { cents }))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain decimal rendering (`180.00`), no currency symbol.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.units().abs(), self.cents_part())
    }
}

impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::parse_decimal(s)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

// Operators panic on overflow like plain i64; pricing uses the checked forms.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Serde
// =============================================================================

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_f64())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MoneyVisitor)
    }
}

struct MoneyVisitor;

impl<'de> Visitor<'de> for MoneyVisitor {
    type Value = Money;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal amount with at most 2 decimal places")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
        i64::try_from(v)
            .ok()
            .and_then(|units| units.checked_mul(CENTS_PER_UNIT))
            .map(Money)
            .ok_or_else(|| E::custom("amount is too large"))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
        v.checked_mul(CENTS_PER_UNIT)
            .map(Money)
            .ok_or_else(|| E::custom("amount is too large"))
    }

    // `{}` on f64 prints the shortest text that reads back to the same
    // double, so 19.99 comes through as "19.99".
    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
        if !v.is_finite() {
            return Err(E::custom("amount must be finite"));
        }
        Money::parse_decimal(&format!("{}", v)).map_err(E::custom)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
        Money::parse_decimal(v).map_err(E::custom)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
