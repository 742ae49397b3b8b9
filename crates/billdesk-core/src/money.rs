//! # Money Module
//!
//! Provides the `Money` type for handling rupee amounts safely.
//!
//! ## Why Integer Paise?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  A bill with 40 lines at ₹33.33 incl. 18% GST, computed in f64:        │
//! │    Σ base + Σ gst drifts away from Σ inclusive by fractions of a paisa │
//! │    and the PDF, the stored invoice and the dashboard disagree.          │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Paise                                            │
//! │    ₹33.33 = 3333 paise. Every split rounds exactly once, on the line,  │
//! │    and the GST share is derived by subtraction so nothing is lost.     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use billdesk_core::money::Money;
//!
//! let price = Money::from_paise(80_000); // ₹800.00
//!
//! let doubled = price * 2;                         // ₹1600.00
//! let total = price + Money::from_paise(5_000);    // ₹850.00
//! assert_eq!(doubled.paise(), 160_000);
//! assert_eq!(total.to_string(), "₹850.00");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

/// Basis points in one whole (100%).
pub const BPS_SCALE: i128 = 10_000;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in paise (1/100 of a rupee).
///
/// ## Design Decisions
/// - **i64 (signed)**: Differences between claimed and computed totals can be
///   negative, so the type allows it even though stored amounts never are
/// - **Single field tuple struct**: Serializes as a bare integer in JSON
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Item.price ──► LineItem.price (snapshot) ──► effective unit price      │
/// │                                                   │                     │
/// │                                                   ▼                     │
/// │                     tax::aggregate_line ──► base / gst / inclusive      │
/// │                                                   │                     │
/// │                                                   ▼                     │
/// │  tax::aggregate_document ──► subtotal, cgst, sgst, total ──► Document   │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from paise.
    ///
    /// ## Example
    /// ```rust
    /// use billdesk_core::money::Money;
    ///
    /// let price = Money::from_paise(1099); // ₹10.99
    /// assert_eq!(price.paise(), 1099);
    /// ```
    #[inline]
    pub const fn from_paise(paise: i64) -> Self {
        Money(paise)
    }

    /// Creates a Money value from rupees and paise.
    ///
    /// For negative amounts only the rupee part should be negative:
    /// `from_rupees_paise(-5, 50)` is -₹5.50.
    #[inline]
    pub const fn from_rupees_paise(rupees: i64, paise: i64) -> Self {
        if rupees < 0 {
            Money(rupees * 100 - paise)
        } else {
            Money(rupees * 100 + paise)
        }
    }

    /// Returns the value in paise.
    #[inline]
    pub const fn paise(&self) -> i64 {
        self.0
    }

    /// Returns the whole-rupee portion.
    #[inline]
    pub const fn rupees(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the paise portion (always 0-99).
    #[inline]
    pub const fn paise_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Returns `self` if positive, otherwise zero.
    ///
    /// Used for `max(price - discount, 0)` and `max(total - discount, 0)`.
    #[inline]
    pub const fn floor_zero(&self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            Money(self.0)
        }
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use billdesk_core::money::Money;
    ///
    /// let unit_price = Money::from_paise(299);
    /// assert_eq!(unit_price.multiply_quantity(3).paise(), 897);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Scales the amount by a fraction expressed in basis points, rounding
    /// half away from zero to the nearest paisa.
    ///
    /// ## Implementation
    /// Integer math in i128: `(amount * bps ± 5000) / 10000`.
    ///
    /// ## Example
    /// ```rust
    /// use billdesk_core::money::Money;
    ///
    /// // 82% of ₹1600.00
    /// assert_eq!(Money::from_paise(160_000).scale_bps(8_200).paise(), 131_200);
    /// // 18% of ₹0.99 = 17.82 paise → 18
    /// assert_eq!(Money::from_paise(99).scale_bps(1_800).paise(), 18);
    /// ```
    pub fn scale_bps(&self, bps: u32) -> Money {
        let scaled = div_round_half_up(self.0 as i128 * bps as i128, BPS_SCALE);
        Money::from_paise(scaled as i64)
    }

    /// Applies a percentage discount and returns the discounted amount.
    ///
    /// ## Arguments
    /// * `discount_bps` - Discount in basis points (2000 = 20%)
    ///
    /// ## Example
    /// ```rust
    /// use billdesk_core::money::Money;
    ///
    /// let mrp = Money::from_paise(100_000); // ₹1000.00
    /// assert_eq!(mrp.apply_percentage_discount(2_000).paise(), 80_000);
    /// ```
    pub fn apply_percentage_discount(&self, discount_bps: u32) -> Money {
        *self - self.scale_bps(discount_bps)
    }

    /// Half of the amount, rounding half up.
    ///
    /// For an odd number of paise the remainder `self - self.half()` is one
    /// paisa smaller.
    pub fn half(&self) -> Money {
        Money::from_paise(div_round_half_up(self.0 as i128, 2) as i64)
    }
}

/// Integer division rounding half away from zero. `d` must be positive.
fn div_round_half_up(n: i128, d: i128) -> i128 {
    if n >= 0 {
        (n + d / 2) / d
    } else {
        -((-n + d / 2) / d)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows money as `₹1234.50`. Grouping and localization belong to the
/// renderer.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}₹{}.{:02}",
            sign,
            self.rupees().abs(),
            self.paise_part()
        )
    }
}

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

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_paise() {
        let money = Money::from_paise(1099);
        assert_eq!(money.paise(), 1099);
        assert_eq!(money.rupees(), 10);
        assert_eq!(money.paise_part(), 99);
    }

    #[test]
    fn test_from_rupees_paise() {
        assert_eq!(Money::from_rupees_paise(10, 99).paise(), 1099);
        assert_eq!(Money::from_rupees_paise(-5, 50).paise(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_paise(1099).to_string(), "₹10.99");
        assert_eq!(Money::from_paise(500).to_string(), "₹5.00");
        assert_eq!(Money::from_paise(-550).to_string(), "-₹5.50");
        assert_eq!(Money::zero().to_string(), "₹0.00");
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let a = Money::from_paise(1000);
        let b = Money::from_paise(500);

        assert_eq!((a + b).paise(), 1500);
        assert_eq!((a - b).paise(), 500);
        assert_eq!((a * 3).paise(), 3000);

        let total: Money = vec![a, b, b].into_iter().sum();
        assert_eq!(total.paise(), 2000);
    }

    #[test]
    fn test_scale_bps_rounds_half_up() {
        // 12.5 paise → 13
        assert_eq!(Money::from_paise(125).scale_bps(1_000).paise(), 13);
        // 12.4 paise → 12
        assert_eq!(Money::from_paise(124).scale_bps(1_000).paise(), 12);
        assert_eq!(Money::from_paise(-125).scale_bps(1_000).paise(), -13);
        assert_eq!(Money::from_paise(5_000).scale_bps(0).paise(), 0);
        assert_eq!(Money::from_paise(5_000).scale_bps(10_000).paise(), 5_000);
    }

    #[test]
    fn test_percentage_discount() {
        let mrp = Money::from_paise(100_000);
        assert_eq!(mrp.apply_percentage_discount(2_000).paise(), 80_000);
        assert_eq!(mrp.apply_percentage_discount(0).paise(), 100_000);
        assert_eq!(mrp.apply_percentage_discount(10_000).paise(), 0);
    }

    #[test]
    fn test_half() {
        assert_eq!(Money::from_paise(28_800).half().paise(), 14_400);
        assert_eq!(Money::from_paise(7).half().paise(), 4);
        assert_eq!((Money::from_paise(7) - Money::from_paise(7).half()).paise(), 3);
        assert_eq!(Money::zero().half().paise(), 0);
    }

    #[test]
    fn test_floor_zero() {
        assert_eq!(Money::from_paise(-1).floor_zero(), Money::zero());
        assert_eq!(Money::from_paise(42).floor_zero().paise(), 42);
    }
}
