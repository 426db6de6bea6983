//! Money and pay-value arithmetic
//!
//! Balances, bets and wins are stored as integer cents; pay values are stored
//! as integer hundredths of the bet. Both serialize as plain decimal numbers
//! (`1.25`) so configuration files stay readable.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

/// An amount of money in cents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Credits(u64);

impl Credits {
    pub const ZERO: Credits = Credits(0);

    /// Create from a cent count
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Create from a decimal amount, rounded to the nearest cent
    pub fn from_decimal(amount: f64) -> Self {
        if !amount.is_finite() || amount <= 0.0 {
            return Self::ZERO;
        }
        Self((amount * 100.0).round() as u64)
    }

    pub const fn cents(self) -> u64 {
        self.0
    }

    pub fn as_decimal(self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Subtract, or `None` if the result would go below zero
    pub fn checked_sub(self, rhs: Credits) -> Option<Credits> {
        self.0.checked_sub(rhs.0).map(Credits)
    }

    /// Multiply by a whole factor (buy-feature cost, win caps)
    pub fn times(self, factor: u32) -> Credits {
        Credits(self.0.saturating_mul(factor as u64))
    }

    /// `self × pay × multiplier`, floored to the cent
    pub fn scaled(self, pay: PayValue, multiplier: u32) -> Credits {
        let raw = self.0 as u128 * pay.hundredths() as u128 * multiplier as u128 / 100;
        Credits(raw.min(u64::MAX as u128) as u64)
    }

    /// Ratio of `self` to `base` (win-to-bet ratio)
    pub fn ratio_to(self, base: Credits) -> f64 {
        if base.is_zero() {
            0.0
        } else {
            self.0 as f64 / base.0 as f64
        }
    }
}

impl From<f64> for Credits {
    fn from(amount: f64) -> Self {
        Self::from_decimal(amount)
    }
}

impl From<Credits> for f64 {
    fn from(credits: Credits) -> Self {
        credits.as_decimal()
    }
}

impl Add for Credits {
    type Output = Credits;

    fn add(self, rhs: Credits) -> Credits {
        Credits(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Credits {
    fn add_assign(&mut self, rhs: Credits) {
        *self = *self + rhs;
    }
}

impl Sum for Credits {
    fn sum<I: Iterator<Item = Credits>>(iter: I) -> Credits {
        iter.fold(Credits::ZERO, Add::add)
    }
}

impl fmt::Display for Credits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// A payout multiplier in hundredths of the bet (`1.25×` = 125)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct PayValue(u32);

impl PayValue {
    pub const fn from_hundredths(hundredths: u32) -> Self {
        Self(hundredths)
    }

    pub fn from_decimal(value: f64) -> Self {
        if !value.is_finite() || value <= 0.0 {
            return Self(0);
        }
        Self((value * 100.0).round() as u32)
    }

    pub const fn hundredths(self) -> u32 {
        self.0
    }

    pub fn as_decimal(self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl From<f64> for PayValue {
    fn from(value: f64) -> Self {
        Self::from_decimal(value)
    }
}

impl From<PayValue> for f64 {
    fn from(value: PayValue) -> Self {
        value.as_decimal()
    }
}

impl fmt::Display for PayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x", self.as_decimal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_roundtrip_to_cents() {
        assert_eq!(Credits::from_decimal(0.2).cents(), 20);
        assert_eq!(Credits::from_decimal(0.6).cents(), 60);
        assert_eq!(Credits::from_decimal(1000.0).cents(), 100_000);
        assert_eq!(Credits::from_decimal(-3.0), Credits::ZERO);
    }

    #[test]
    fn test_scaled_is_exact_for_reference_bets() {
        // 0.20 × 1.25 × 1 = 0.25
        let bet = Credits::from_cents(20);
        assert_eq!(bet.scaled(PayValue::from_decimal(1.25), 1).cents(), 25);
        // 0.60 × 0.8 × 7 = 3.36
        let bet = Credits::from_cents(60);
        assert_eq!(bet.scaled(PayValue::from_decimal(0.8), 7).cents(), 336);
    }

    #[test]
    fn test_scaled_floors_sub_cent_remainders() {
        // 0.01 × 0.5 = 0.005 → 0.00
        let bet = Credits::from_cents(1);
        assert_eq!(bet.scaled(PayValue::from_decimal(0.5), 1), Credits::ZERO);
    }

    #[test]
    fn test_checked_sub_refuses_negative() {
        let balance = Credits::from_cents(50);
        assert_eq!(balance.checked_sub(Credits::from_cents(100)), None);
        assert_eq!(
            balance.checked_sub(Credits::from_cents(20)),
            Some(Credits::from_cents(30))
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Credits::from_cents(105).to_string(), "1.05");
        assert_eq!(Credits::from_cents(20).to_string(), "0.20");
        assert_eq!(PayValue::from_decimal(2.5).to_string(), "2.5x");
    }

    #[test]
    fn test_serde_as_decimal() {
        let json = serde_json::to_string(&Credits::from_cents(125)).unwrap();
        assert_eq!(json, "1.25");
        let back: Credits = serde_json::from_str("0.4").unwrap();
        assert_eq!(back.cents(), 40);
    }
}
