//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A repricing lot touches thousands of items; a half-cent drift per     │
//! │  item makes "revert restores the exact price" impossible to honor.    │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents + Integer Basis Points                    │
//! │    markup 40%   = 4000 bps → 2500 × 4000 / 10000 = 1000 exactly        │
//! │    discount 15% = 1500 bps → 1300 × 1500 / 10000 =  195 exactly        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tarifa_core::money::Money;
//!
//! let cost = Money::from_cents(2500);
//! let sale = cost.apply_markup_bps(4000); // +40%
//! assert_eq!(sale.cents(), 3500);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: fixed-amount adjustments can be negative
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Transparent serde**: serializes as a plain number
///
/// Every monetary value in the pricing core flows through this type:
/// purchase cost, explicit sale price, list overrides, resolved prices,
/// lot deltas and snapshot prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Clamps the value to be non-negative.
    ///
    /// Used when applying lot adjustments: a fixed -500 on a 300-cent item
    /// yields 0, never a negative sale price.
    #[inline]
    pub const fn clamp_non_negative(&self) -> Self {
        if self.0 < 0 { Money(0) } else { *self }
    }

    /// Applies a percentage markup given in basis points (4000 = 40%).
    ///
    /// ## Rounding
    /// The markup amount is rounded half-up on the cent before adding,
    /// using i128 internally so large catalogs cannot overflow.
    ///
    /// ## Example
    /// ```rust
    /// use tarifa_core::money::Money;
    ///
    /// let cost = Money::from_cents(2500);
    /// assert_eq!(cost.apply_markup_bps(4000).cents(), 3500); // +40%
    /// ```
    pub fn apply_markup_bps(&self, markup_bps: u32) -> Money {
        let delta = round_half_up_div_10000(self.0 as i128 * markup_bps as i128);
        Money(self.0 + delta)
    }

    /// Applies a percentage discount given in basis points (1500 = 15%).
    ///
    /// The discount amount is computed first, then subtracted, so the
    /// discount a customer received is always a whole number of cents.
    ///
    /// ## Example
    /// ```rust
    /// use tarifa_core::money::Money;
    ///
    /// let base = Money::from_cents(1300);
    /// assert_eq!(base.apply_discount_bps(1500).cents(), 1105); // -15%
    /// ```
    pub fn apply_discount_bps(&self, discount_bps: u32) -> Money {
        let delta = round_half_up_div_10000(self.0 as i128 * discount_bps as i128);
        Money(self.0 - delta)
    }

    /// Applies a signed percentage delta given in basis points.
    ///
    /// Used by repricing lots: +1500 bps raises the price by 15%,
    /// -1500 bps lowers it by 15%. Rounds half away from zero.
    pub fn apply_percentage_delta_bps(&self, delta_bps: i64) -> Money {
        let delta = round_half_up_div_10000(self.0 as i128 * delta_bps as i128);
        Money(self.0 + delta)
    }
}

/// Integer division by 10_000 rounding half away from zero.
fn round_half_up_div_10000(n: i128) -> i64 {
    let rounded = if n >= 0 { (n + 5_000) / 10_000 } else { (n - 5_000) / 10_000 };
    rounded as i64
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// For logs and diagnostics; the admin UI does its own formatting.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, (self.0 / 100).abs(), (self.0 % 100).abs())
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

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

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
    }

    #[test]
    fn test_markup_exact() {
        // cost 2500, markup 40% -> 3500 (must be exact)
        assert_eq!(Money::from_cents(2500).apply_markup_bps(4000).cents(), 3500);
        // cost 1000, markup 30% -> 1300
        assert_eq!(Money::from_cents(1000).apply_markup_bps(3000).cents(), 1300);
        // 0% markup is the identity
        assert_eq!(Money::from_cents(777).apply_markup_bps(0).cents(), 777);
    }

    #[test]
    fn test_markup_rounding_half_up() {
        // 1 cent at 8.25% = 0.0825 cents -> 0
        assert_eq!(Money::from_cents(1).apply_markup_bps(825).cents(), 1);
        // 999 at 33.33% = 332.96... -> 333
        assert_eq!(Money::from_cents(999).apply_markup_bps(3333).cents(), 999 + 333);
        // exact half rounds up: 100 at 0.5% = 0.5 -> 1
        assert_eq!(Money::from_cents(100).apply_markup_bps(50).cents(), 101);
    }

    #[test]
    fn test_discount_multiplicative_on_base() {
        // base 1300, group discount 15% -> 1105
        assert_eq!(Money::from_cents(1300).apply_discount_bps(1500).cents(), 1105);
        // 100% discount -> 0
        assert_eq!(Money::from_cents(1300).apply_discount_bps(10_000).cents(), 0);
    }

    #[test]
    fn test_percentage_delta_signed() {
        // +15% of 10000 -> 11500
        assert_eq!(Money::from_cents(10_000).apply_percentage_delta_bps(1500).cents(), 11_500);
        // -15% of 10000 -> 8500
        assert_eq!(Money::from_cents(10_000).apply_percentage_delta_bps(-1500).cents(), 8_500);
        // negative rounding is symmetric: -0.5% of 100 = -0.5 -> -1
        assert_eq!(Money::from_cents(100).apply_percentage_delta_bps(-50).cents(), 99);
    }

    #[test]
    fn test_clamp_non_negative() {
        assert_eq!(Money::from_cents(-500).clamp_non_negative().cents(), 0);
        assert_eq!(Money::from_cents(0).clamp_non_negative().cents(), 0);
        assert_eq!(Money::from_cents(42).clamp_non_negative().cents(), 42);
    }
}
