//! # Money Module
//!
//! Provides the `Money` type for Korean won amounts.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    150000 × 1.3 = 195000.00000000003  ❌                                │
//! │                                                                         │
//! │  OUR SOLUTION: whole won in an i64, rates in basis points               │
//! │    150000 × 13000 / 10000 = 195000     (exact)                          │
//! │                                                                         │
//! │  The won has no minor unit, so every amount is already an integer.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use quote_core::money::Money;
//! use quote_core::types::PriceRate;
//!
//! let base = Money::from_won(200_000);
//! let sale_price = base.apply_rate(PriceRate::from_bps(13_000)).unwrap();
//! assert_eq!(sale_price.won(), 260_000);
//! assert_eq!(sale_price.to_string(), "260,000원");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::numeral;
use crate::types::{PriceRate, TaxRate};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in whole Korean won.
///
/// ## Design Decisions
/// - **i64 (signed)**: a negative value is representable so validation can
///   reject it explicitly
/// - **Checked arithmetic only**: every operation returns `None` instead of
///   wrapping or panicking, so an out-of-range amount surfaces as an error
/// - **Single field tuple struct**: zero-cost abstraction over i64
///
/// ## Where Money Flows
/// ```text
/// ModuleDefinition.base_price ──► apply_rate() ──► LineItem.unit_price
///                                                       │
///                                      × quantity ──► LineItem.amount
///                                                       │
///                       Σ amount ──► subtotal ──► calculate_tax() ──► vat
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from whole won.
    #[inline]
    pub const fn from_won(won: i64) -> Self {
        Money(won)
    }

    /// Returns the value in whole won.
    #[inline]
    pub const fn won(&self) -> i64 {
        self.0
    }

    /// Returns zero won.
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

    /// Calculates tax rounded half up. `None` if the result leaves `i64`.
    ///
    /// ## Implementation
    /// Integer math: `(amount * bps + 5000) / 10000`. The +5000 provides
    /// rounding (5000/10000 = 0.5). Amounts reaching this function are
    /// non-negative, where truncating division after the +5000 offset is
    /// exactly round-half-up.
    ///
    /// ## Example
    /// ```rust
    /// use quote_core::money::Money;
    /// use quote_core::types::TaxRate;
    ///
    /// let subtotal = Money::from_won(12_345);
    /// // 12,345 × 10% = 1,234.5 → 1,235
    /// assert_eq!(subtotal.calculate_tax(TaxRate::VAT).unwrap().won(), 1_235);
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Option<Money> {
        Self::scale_bps(self.0, rate.bps()).map(Money)
    }

    /// Scales a base price by a quote-type rate multiplier, rounded half up.
    ///
    /// Returns `None` when the scaled price does not fit in `i64`.
    ///
    /// ## Example
    /// ```rust
    /// use quote_core::money::Money;
    /// use quote_core::types::PriceRate;
    ///
    /// // 150,000 × 0.3 = 45,000
    /// let re_event = Money::from_won(150_000).apply_rate(PriceRate::from_bps(3_000));
    /// assert_eq!(re_event.unwrap().won(), 45_000);
    /// ```
    pub fn apply_rate(&self, rate: PriceRate) -> Option<Money> {
        Self::scale_bps(self.0, rate.bps()).map(Money)
    }

    /// Multiplies money by a quantity, `None` on overflow.
    #[inline]
    pub const fn checked_multiply_quantity(&self, qty: i64) -> Option<Money> {
        match self.0.checked_mul(qty) {
            Some(won) => Some(Money(won)),
            None => None,
        }
    }

    /// Adds two amounts, `None` on overflow.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(won) => Some(Money(won)),
            None => None,
        }
    }

    /// Sums amounts, `None` as soon as the running total overflows.
    ///
    /// ```rust
    /// use quote_core::money::Money;
    ///
    /// let amounts = [Money::from_won(1_000), Money::from_won(500)];
    /// assert_eq!(Money::checked_sum(amounts).unwrap().won(), 1_500);
    /// assert!(Money::checked_sum([Money::from_won(i64::MAX), Money::from_won(1)]).is_none());
    /// ```
    pub fn checked_sum(amounts: impl IntoIterator<Item = Money>) -> Option<Money> {
        amounts
            .into_iter()
            .try_fold(Money::zero(), |total, amount| total.checked_add(amount))
    }

    /// Formats with thousands separators and no currency symbol.
    ///
    /// ```rust
    /// use quote_core::money::Money;
    ///
    /// assert_eq!(Money::from_won(1_234_567).grouped(), "1,234,567");
    /// assert_eq!(Money::from_won(-5_000).grouped(), "-5,000");
    /// ```
    pub fn grouped(&self) -> String {
        let digits = numeral::format_grouped(self.0.unsigned_abs());
        if self.is_negative() {
            format!("-{}", digits)
        } else {
            digits
        }
    }

    // i128 holds `amount * bps` for every i64 amount and u32 rate
    fn scale_bps(amount: i64, bps: u32) -> Option<i64> {
        let scaled = (amount as i128 * bps as i128 + 5000) / 10000;
        i64::try_from(scaled).ok()
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows money the way quotes print it: `1,234,000원`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}원", self.grouped())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
