//! Integer-cents money for receipt amounts.
//!
//! Amounts arrive from the business layer already computed; the receipt only
//! adds, subtracts and prints them, so cents are all we need.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// A monetary value in the smallest currency unit (cents).
///
/// Serializes as a bare integer number of cents.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
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

    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }
}

/// Two decimals, comma thousands separators, leading `-` when negative.
///
/// ```
/// use blueslip::receipt::Money;
///
/// assert_eq!(Money::from_cents(123456).to_string(), "1,234.56");
/// assert_eq!(Money::from_cents(-5).to_string(), "-0.05");
/// ```
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let abs = self.0.unsigned_abs();
        let major = (abs / 100).to_string();
        let minor = abs % 100;

        let mut grouped = String::with_capacity(major.len() + major.len() / 3);
        for (i, digit) in major.chars().enumerate() {
            if i > 0 && (major.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(digit);
        }

        if self.0 < 0 {
            f.write_str("-")?;
        }
        write!(f, "{}.{:02}", grouped, minor)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money(-self.0)
    }
}

impl Mul<u32> for Money {
    type Output = Money;

    fn mul(self, rhs: u32) -> Money {
        Money(self.0 * rhs as i64)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.copied().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Money::zero().to_string(), "0.00");
        assert_eq!(Money::from_cents(7).to_string(), "0.07");
        assert_eq!(Money::from_cents(1050).to_string(), "10.50");
        assert_eq!(Money::from_cents(100_000).to_string(), "1,000.00");
        assert_eq!(Money::from_cents(123_456_789).to_string(), "1,234,567.89");
        assert_eq!(Money::from_cents(-4000).to_string(), "-40.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(250);
        assert_eq!(a * 3, Money::from_cents(750));
        assert_eq!(a - Money::from_cents(300), Money::from_cents(-50));
        assert_eq!(-a, Money::from_cents(-250));
        let total: Money = [a, a, a].iter().sum();
        assert_eq!(total.cents(), 750);
    }

    #[test]
    fn test_serde_is_plain_cents() {
        let m: Money = serde_json::from_str("1999").unwrap();
        assert_eq!(m, Money::from_cents(1999));
        assert_eq!(serde_json::to_string(&m).unwrap(), "1999");
    }
}
