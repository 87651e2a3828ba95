use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::CalculatorError;

/// unique identifier for a calculator state instance
pub type CalculatorId = Uuid;

/// payment identifier, monotonic within one calculator
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentId(u64);

impl PaymentId {
    pub const FIRST: PaymentId = PaymentId(1);

    #[cfg(test)]
    pub(crate) const fn new(value: u64) -> Self {
        PaymentId(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn next(&self) -> PaymentId {
        PaymentId(self.0 + 1)
    }

    /// next id after the current maximum, or the first id
    pub fn after<I: IntoIterator<Item = PaymentId>>(ids: I) -> PaymentId {
        ids.into_iter().max().map_or(Self::FIRST, |max| max.next())
    }
}

impl fmt::Display for PaymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// payoff identifier, monotonic within one debt
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PayoffId(u64);

impl PayoffId {
    pub const FIRST: PayoffId = PayoffId(1);

    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn next(&self) -> PayoffId {
        PayoffId(self.0 + 1)
    }

    pub fn after<I: IntoIterator<Item = PayoffId>>(ids: I) -> PayoffId {
        ids.into_iter().max().map_or(Self::FIRST, |max| max.next())
    }
}

/// calendar month a debt belongs to, normalized to its first day
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "NaiveDate", into = "NaiveDate")]
pub struct BillingPeriod(NaiveDate);

impl BillingPeriod {
    /// period containing any date of the month
    pub fn from_date(date: NaiveDate) -> Self {
        BillingPeriod(date - Duration::days(date.day0() as i64))
    }

    pub fn from_ym(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(BillingPeriod)
    }

    pub fn first_day(&self) -> NaiveDate {
        self.0
    }

    pub fn last_day(&self) -> NaiveDate {
        self.0 + Duration::days(self.days_in_month() - 1)
    }

    pub fn next(&self) -> BillingPeriod {
        BillingPeriod(self.0 + Duration::days(self.days_in_month()))
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        BillingPeriod::from_date(date) == *self
    }

    fn days_in_month(&self) -> i64 {
        match self.0.month() {
            4 | 6 | 9 | 11 => 30,
            2 if is_leap_year(self.0.year()) => 29,
            2 => 28,
            _ => 31,
        }
    }
}

impl From<NaiveDate> for BillingPeriod {
    fn from(date: NaiveDate) -> Self {
        BillingPeriod::from_date(date)
    }
}

impl From<BillingPeriod> for NaiveDate {
    fn from(period: BillingPeriod) -> Self {
        period.0
    }
}

impl fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m"))
    }
}

impl FromStr for BillingPeriod {
    type Err = CalculatorError;

    /// parse "YYYY-MM"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
            .map(BillingPeriod)
            .map_err(|_| CalculatorError::InvalidPeriod {
                value: s.to_string(),
            })
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// fraction of the key rate accrued per day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyRatePart {
    numerator: u32,
    denominator: u32,
}

impl KeyRatePart {
    /// 1/300, applied while the debt is young
    pub const ONE_300TH: KeyRatePart = KeyRatePart {
        numerator: 1,
        denominator: 300,
    };
    /// 1/130, applied from the fraction change day onwards
    pub const ONE_130TH: KeyRatePart = KeyRatePart {
        numerator: 1,
        denominator: 130,
    };

    /// select the fraction for a number of days overdue
    pub fn for_days_overdue(days_overdue: i64, fraction_change_day: i64) -> Self {
        if days_overdue < fraction_change_day {
            Self::ONE_300TH
        } else {
            Self::ONE_130TH
        }
    }

    pub fn numerator(&self) -> u32 {
        self.numerator
    }

    pub fn denominator(&self) -> u32 {
        self.denominator
    }

    /// multiply a value by this fraction without an intermediate rounding of 1/d
    pub fn apply(&self, value: Decimal) -> Decimal {
        value * Decimal::from(self.numerator) / Decimal::from(self.denominator)
    }
}

impl fmt::Display for KeyRatePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// how a payment is spread across debts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum DistributionMethod {
    /// earliest billing period first
    #[default]
    Fifo,
    /// the payment's target period first, then earliest first
    LastIsFirst,
}
