//! # Money
//!
//! Every amount on the floor is a whole number of cents: tier prices,
//! account lines, card commission, drawer entries.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  RateTier.price ──► pricing::cost ──► time cost ─┐                      │
//! │  AccountItem.unit_price × quantity ──────────────┴──► subtotal          │
//! │                                                          │              │
//! │            subtotal × CommissionRate (bps, half-up) ──► commission      │
//! │                                                          │              │
//! │                              total / net received ──► drawer balance    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The commission is the only place a fraction of a cent appears, and it
//! is rounded exactly once in [`Money::apply_rate`]. Amounts typed by the
//! operator are parsed from text, never converted from floats.
//!
//! ```rust
//! use lanhouse_core::money::Money;
//!
//! let soda = Money::from_cents(1800);
//! assert_eq!((soda * 2).cents(), 3600);
//!
//! let counted: Money = "640.50".parse().unwrap();
//! assert_eq!(counted.cents(), 64050);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::types::CommissionRate;

/// Signed cents. Negative values show up as drawer differences and
/// absorbed commissions.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
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

    /// `self × rate`, rounded half-up to the cent: `(cents × bps + 5000) / 10000`.
    ///
    /// ```rust
    /// use lanhouse_core::money::Money;
    /// use lanhouse_core::types::CommissionRate;
    ///
    /// // $100.00 paid by card
    /// let commission = Money::from_cents(10000).apply_rate(CommissionRate::CARD);
    /// assert_eq!(commission.cents(), 418);
    /// ```
    pub fn apply_rate(&self, rate: CommissionRate) -> Money {
        // i128 so a day's drawer total times bps cannot overflow
        let cents = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_cents(cents as i64)
    }
}

/// Operator input: `500`, `12.5`, `$640`, `-10.00`.
///
/// More than two decimals is rejected rather than rounded.
impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: reason.to_string(),
        };

        let s = s.trim().trim_start_matches('$');
        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest.trim_start_matches('$')),
            None => (false, s),
        };

        let (whole, frac) = digits.split_once('.').unwrap_or((digits, ""));

        if whole.is_empty() && frac.is_empty() {
            return Err(invalid("empty amount"));
        }
        if frac.len() > 2 {
            return Err(invalid("at most two decimal places"));
        }
        if !whole.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
            return Err(invalid("expected a number like 12.50"));
        }

        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid("amount too large"))?
        };
        // "5" after the point is 50 cents
        let frac: i64 = format!("{frac:0<2}").parse().map_err(|_| invalid("bad cents"))?;

        let cents = whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(frac))
            .ok_or_else(|| invalid("amount too large"))?;

        Ok(Money(if negative { -cents } else { cents }))
    }
}

/// `$10.99`, `-$10.00`. Drawer closing descriptions use this form.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}${}.{:02}", sign, abs / 100, abs % 100)
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

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

/// Quantities and whole hours.
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

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1099).to_string(), "$10.99");
        assert_eq!(Money::from_cents(500).to_string(), "$5.00");
        assert_eq!(Money::from_cents(-1000).to_string(), "-$10.00");
        assert_eq!(Money::from_cents(-5).to_string(), "-$0.05");
        assert_eq!(Money::zero().to_string(), "$0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((-a).cents(), -1000);
        assert_eq!((a * 3).cents(), 3000);

        let mut running = a;
        running += b;
        assert_eq!(running.cents(), 1500);
    }

    #[test]
    fn test_sum() {
        let total: Money = [500, 1000, 1500].into_iter().map(Money::from_cents).sum();
        assert_eq!(total.cents(), 3000);
    }

    #[test]
    fn test_card_commission() {
        assert_eq!(Money::from_cents(10000).apply_rate(CommissionRate::CARD).cents(), 418);
    }

    #[test]
    fn test_apply_rate_rounds_half_up() {
        // $0.50 × 4.18% = 2.09 cents → 2
        assert_eq!(Money::from_cents(50).apply_rate(CommissionRate::CARD).cents(), 2);
        // $12.00 × 4.18% = 50.16 cents → 50
        assert_eq!(Money::from_cents(1200).apply_rate(CommissionRate::CARD).cents(), 50);
        // $0.13 at 50% = 6.5 cents → 7
        assert_eq!(Money::from_cents(13).apply_rate(CommissionRate::from_bps(5000)).cents(), 7);
    }

    #[test]
    fn test_parse() {
        assert_eq!("500".parse::<Money>().unwrap().cents(), 50000);
        assert_eq!("12.5".parse::<Money>().unwrap().cents(), 1250);
        assert_eq!("12.05".parse::<Money>().unwrap().cents(), 1205);
        assert_eq!("$640".parse::<Money>().unwrap().cents(), 64000);
        assert_eq!("-10.00".parse::<Money>().unwrap().cents(), -1000);
        assert_eq!(".75".parse::<Money>().unwrap().cents(), 75);
        assert_eq!("3.".parse::<Money>().unwrap().cents(), 300);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<Money>().is_err());
        assert!("abc".parse::<Money>().is_err());
        assert!("1.234".parse::<Money>().is_err());
        assert!("1,50".parse::<Money>().is_err());
    }

    #[test]
    fn test_sign_checks() {
        assert!(Money::zero().is_zero());
        assert!(!Money::zero().is_positive());
        assert!(!Money::zero().is_negative());
        assert!(Money::from_cents(-100).is_negative());
        assert!(Money::from_cents(1).is_positive());
    }
}
