//! # Money Module
//!
//! `Money`: a signed amount in minor units (paisa).
//!
//! ## Why Integer Money?
//! Every amount in the tenant databases is stored in minor units (cents,
//! paisa) as a signed 64-bit integer. Report arithmetic (running balances,
//! trial balance totals, aging buckets) is pure integer addition, so totals
//! always reconcile to the last unit.
//!
//! ## Debit / Credit Convention
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Balance sign            Meaning             Trial balance column       │
//! │  ────────────            ───────             ────────────────────       │
//! │   > 0                    debit balance       Debit                      │
//! │   < 0                    credit balance      Credit (absolute value)    │
//! │   = 0                    settled             omitted by default         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```rust
//! use posreport_core::money::Money;
//!
//! let debit = Money::from_cents(15_000);
//! let credit = Money::from_cents(4_250);
//! let balance = debit - credit;
//! assert_eq!(balance.cents(), 10_750);
//! assert_eq!(balance.to_string(), "107.50");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use ts_rs::TS;

/// Represents a monetary value in the smallest currency unit.
///
/// Serialized as a plain integer so the front end receives minor units
/// and formats them for the tenant's locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    ///
    /// ```rust
    /// use posreport_core::money::Money;
    ///
    /// let rent = Money::from_cents(4_500_000);
    /// assert_eq!(rent.cents(), 4_500_000);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

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

    /// Splits a signed balance into `(debit, credit)` columns.
    ///
    /// ```rust
    /// use posreport_core::money::Money;
    ///
    /// let (dr, cr) = Money::from_cents(-300).split_balance();
    /// assert_eq!(dr, Money::zero());
    /// assert_eq!(cr, Money::from_cents(300));
    /// ```
    pub const fn split_balance(&self) -> (Money, Money) {
        if self.0 >= 0 {
            (Money(self.0), Money(0))
        } else {
            (Money(0), Money(-self.0))
        }
    }

    /// Line total for `qty` units at this price.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

/// Plain decimal rendering ("1234.50"). Currency symbols and grouping are
/// left to the front end.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
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

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
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
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}
