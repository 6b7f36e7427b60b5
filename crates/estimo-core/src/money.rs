//! # Money Module
//!
//! Provides the `Money` type for handling monetary values exactly.
//!
//! ## Why Exact Decimals?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE ROUNDING DRIFT PROBLEM                                             │
//! │                                                                         │
//! │  Quote quantities are fractional:                                       │
//! │    100 sq ft × 3 in deep / 324 = 0.925925... cu yd                      │
//! │                                                                         │
//! │  Rounding the quantity, then the unit price, then each add-on          │
//! │  compounds error and makes two screens disagree by a cent.             │
//! │                                                                         │
//! │  OUR SOLUTION: rust_decimal all the way down                            │
//! │    Quantities, prices and totals stay exact (28 significant digits).    │
//! │    Rounding to currency precision happens ONLY in the formatter.        │
//! │    Arithmetic saturates at Decimal::MAX / MIN instead of panicking.    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use estimo_core::money::Money;
//! use rust_decimal::Decimal;
//!
//! let unit = Money::new(Decimal::new(350, 2)); // $3.50
//! let base = unit * Decimal::new(200, 0);      // $700.00
//! assert_eq!(base, Money::new(Decimal::new(700, 0)));
//! ```

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// An exact monetary amount in the quote's currency.
///
/// ## Design Decisions
/// - **Decimal (signed)**: variation adjustments may be negative discounts
/// - **Transparent serde**: serializes as the decimal string (`"3.50"`)
/// - **No implicit rounding**: `Display` rounds for logs only; real display
///   goes through [`crate::format::CurrencyFormat`]
/// - **Saturating operators**: `+`, `-` and `*` clamp at `Decimal::MAX` /
///   `Decimal::MIN` on overflow, so absurd catalog input still prices
///
/// ## Where Money Flows
/// ```text
/// Product.unit_price ──► tier / variation ──► LinePricing.unit_price
///                                                   │
/// Addon.price_value ──► AddonCharge.amount ─────────┤
///                                                   ▼
///                                         LinePricing.line_total
///                                                   │
///                                                   ▼
///                                QuoteTotals.subtotal ──► tax ──► total
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[serde(transparent)]
#[ts(export)]
pub struct Money(#[ts(type = "string")] Decimal);

impl Money {
    /// Wraps an exact decimal amount.
    #[inline]
    pub const fn new(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Creates a whole-unit amount (e.g. `from_major(20)` = $20).
    #[inline]
    pub fn from_major(major: i64) -> Self {
        Money(Decimal::from(major))
    }

    /// Creates an amount from minor units (cents for USD).
    ///
    /// ```rust
    /// use estimo_core::money::Money;
    ///
    /// assert_eq!(Money::from_minor(1099).to_string(), "$10.99");
    /// ```
    #[inline]
    pub fn from_minor(minor: i64) -> Self {
        Money(Decimal::new(minor, 2))
    }

    /// Returns the exact decimal amount.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    /// Checks if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Clamps the amount at zero from below.
    #[inline]
    pub fn non_negative(self) -> Self {
        Money(self.0.max(Decimal::ZERO))
    }

    /// Adds `percent`% of this amount to itself.
    ///
    /// ```rust
    /// use estimo_core::money::Money;
    /// use rust_decimal::Decimal;
    ///
    /// let base = Money::from_major(50);
    /// assert_eq!(base.adjust_by_percent(Decimal::from(10)), Money::from_major(55));
    /// ```
    pub fn adjust_by_percent(self, percent: Decimal) -> Self {
        let delta = self.0.saturating_mul(percent / Decimal::ONE_HUNDRED);
        Money(self.0.saturating_add(delta))
    }

    /// Calculates tax on this amount. Exact; no rounding.
    ///
    /// ## User Workflow
    /// ```text
    /// Quote subtotal: $1,000.00
    ///      │
    ///      ▼
    /// calculate_tax(8.25%) ← THIS FUNCTION
    ///      │
    ///      ▼
    /// Tax: $82.50
    ///      │
    ///      ▼
    /// Quote total: $1,082.50
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        Money(self.0.saturating_mul(rate.percent() / Decimal::ONE_HUNDRED))
    }

    /// Rounds to `decimal_places`, half away from zero.
    ///
    /// Only display code should call this.
    pub fn rounded(&self, decimal_places: u32) -> Decimal {
        let mut rounded = self
            .0
            .round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(decimal_places);
        rounded
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-friendly display: two decimal places with a dollar sign.
///
/// ## Note
/// Use [`crate::format::CurrencyFormat`] for anything a customer sees.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        write!(f, "{}${}", sign, Money(self.0.abs()).rounded(2))
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Money(amount)
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

/// Multiplication by a decimal quantity or multiplier.
impl Mul<Decimal> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: Decimal) -> Self {
        Money(self.0.saturating_mul(qty))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate as a percentage (`8.25` = 8.25%).
///
/// Applied once to the quote subtotal, never per line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct TaxRate(#[ts(type = "string")] Decimal);

impl TaxRate {
    /// Creates a tax rate from a percentage.
    #[inline]
    pub const fn from_percent(percent: Decimal) -> Self {
        TaxRate(percent)
    }

    /// Creates a tax rate from basis points (825 = 8.25%).
    #[inline]
    pub fn from_bps(bps: u32) -> Self {
        TaxRate(Decimal::new(i64::from(bps), 2))
    }

    /// Returns the rate as a percentage.
    #[inline]
    pub const fn percent(&self) -> Decimal {
        self.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(Decimal::ZERO)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
