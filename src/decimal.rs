use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

use crate::errors::{CalculatorError, Result};

/// decimal places kept on accrued penalty amounts (major units)
pub const ACCRUAL_SCALE: u32 = 8;

/// minor units per major unit (kopecks per ruble)
const MINOR_PER_MAJOR: i64 = 100;

/// round an accrued amount to the accrual scale
pub fn round_accrual(amount: Decimal) -> Decimal {
    amount.round_dp(ACCRUAL_SCALE)
}

/// Money type holding an exact count of minor currency units.
///
/// Addition and subtraction are plain integer operations, so ledger balances
/// never drift. Fractional results (daily penalties) are carried as `Decimal`
/// major units at [`ACCRUAL_SCALE`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// create from minor amount (kopecks)
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// create from integer major amount (rubles)
    pub const fn from_major(major: i64) -> Self {
        Money(major * MINOR_PER_MAJOR)
    }

    /// create from a major-unit decimal, rounding to the nearest minor unit
    pub fn from_major_decimal(d: Decimal) -> Result<Self> {
        d.checked_mul(Decimal::from(MINOR_PER_MAJOR))
            .map(|minor| minor.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
            .and_then(|minor| minor.to_i64())
            .map(Money)
            .ok_or_else(|| CalculatorError::AmountOutOfRange {
                value: d.to_string(),
            })
    }

    /// parse a major-unit string such as "1000.50"
    pub fn from_str_major(s: &str) -> Result<Self> {
        let major = Decimal::from_str(s.trim()).map_err(|_| CalculatorError::InvalidAmount {
            value: s.to_string(),
        })?;
        Money::from_major_decimal(major)
    }

    /// raw minor units
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// value in major units, exact
    pub fn to_major(&self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// strictly greater than zero
    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub fn min(self, other: Self) -> Self {
        Money(self.0.min(other.0))
    }

    pub fn max(self, other: Self) -> Self {
        Money(self.0.max(other.0))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_major())
    }
}

impl FromStr for Money {
    type Err = CalculatorError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Money::from_str_major(s)
    }
}

impl From<i64> for Money {
    fn from(minor: i64) -> Self {
        Money::from_minor(minor)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, other: Money) -> Money {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Money) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, other: Money) -> Money {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Money) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.copied().sum()
    }
}

/// rate type for the key rate, stored as a fraction (0.095 for 9.5%)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Rate(Decimal);

impl Rate {
    pub const ZERO: Rate = Rate(Decimal::ZERO);

    /// create from decimal (e.g., 0.095 for 9.5%)
    pub fn from_decimal(d: Decimal) -> Self {
        Rate(d)
    }

    /// create from whole percentage (e.g., 16 for 16%)
    pub fn from_percentage(p: u32) -> Self {
        Rate(Decimal::from(p) / Decimal::from(100))
    }

    /// create from fractional percentage (e.g., 9.5 for 9.5%)
    pub fn from_percentage_decimal(p: Decimal) -> Self {
        Rate(p / Decimal::from(100))
    }

    /// create from basis points (e.g., 950 for 9.5%)
    pub fn from_bps(bps: u32) -> Self {
        Rate(Decimal::from(bps) / Decimal::from(10000))
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// percent-scaled value with trailing zeros stripped
    pub fn as_percentage(&self) -> Decimal {
        (self.0 * Decimal::from(100)).normalize()
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.as_percentage())
    }
}

impl From<Decimal> for Rate {
    fn from(d: Decimal) -> Self {
        Rate::from_decimal(d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_major_minor_conversion() {
        assert_eq!(Money::from_major(1_000), Money::from_minor(100_000));
        assert_eq!(Money::from_major(1_000).to_major(), dec!(1000.00));
        assert_eq!(Money::from_minor(5).to_string(), "0.05");
    }

    #[test]
    fn test_major_decimal_rounds_to_nearest_minor_unit() {
        assert_eq!(Money::from_major_decimal(dec!(10.005)).unwrap(), Money::from_minor(1001));
        assert_eq!(Money::from_major_decimal(dec!(10.004)).unwrap(), Money::from_minor(1000));
        assert_eq!(Money::from_major_decimal(dec!(-0.015)).unwrap(), Money::from_minor(-2));
        assert_eq!(Money::from_str_major("1000.5").unwrap(), Money::from_minor(100_050));
    }

    #[test]
    fn test_major_amount_out_of_range() {
        let max_major = Decimal::new(i64::MAX, 2);
        assert_eq!(Money::from_major_decimal(max_major).unwrap(), Money::from_minor(i64::MAX));

        assert!(matches!(
            Money::from_str_major("100000000000000000"),
            Err(CalculatorError::AmountOutOfRange { .. })
        ));
        assert!(matches!(
            Money::from_str_major("-100000000000000000"),
            Err(CalculatorError::AmountOutOfRange { .. })
        ));
        assert!(matches!(
            "79228162514264337593543950335".parse::<Money>(),
            Err(CalculatorError::AmountOutOfRange { .. })
        ));
        assert!(matches!(
            Money::from_str_major("ten rubles"),
            Err(CalculatorError::InvalidAmount { .. })
        ));
    }

    #[test]
    fn test_integer_arithmetic_is_exact() {
        let dime = Money::from_minor(10);
        let twenty = Money::from_minor(20);
        assert_eq!(dime + twenty, Money::from_minor(30));

        let mut balance = Money::from_major(1_000);
        balance -= Money::from_major(100);
        assert_eq!(balance, Money::from_major(900));

        let total: Money = [dime, twenty, dime].iter().sum();
        assert_eq!(total, Money::from_minor(40));
    }

    #[test]
    fn test_round_accrual_scale() {
        let daily = round_accrual(dec!(95) / dec!(300));
        assert_eq!(daily, dec!(0.31666667));
    }

    #[test]
    fn test_rate_display() {
        let rate = Rate::from_percentage_decimal(dec!(9.5));
        assert_eq!(rate.as_decimal(), dec!(0.095));
        assert_eq!(rate.to_string(), "9.5%");
        assert_eq!(Rate::from_bps(1600), Rate::from_percentage(16));
    }
}
