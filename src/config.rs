use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::decimal::Rate;
use crate::errors::{CalculatorError, Result};
use crate::types::BillingPeriod;

/// days after the end of the billing month before a debt falls due
pub const DEFAULT_DAYS_TO_PAY: i64 = 10;
/// grace window after the due date during which nothing accrues
pub const DEFAULT_DEFERRED_DAYS: i64 = 30;
/// days overdue after which the 1/130 fraction applies
pub const DEFAULT_FRACTION_CHANGE_DAY: i64 = 90;

/// inclusive window during which no penalty accrues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Moratorium {
    start: NaiveDate,
    end: NaiveDate,
}

impl Moratorium {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(CalculatorError::InvalidMoratorium { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// both bounds are inside the window
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }
}

/// date-indexed key rate lookup
pub trait KeyRateSource {
    fn rate_on(&self, date: NaiveDate) -> Option<Rate>;
}

/// key rate in force from a given date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRateEntry {
    pub effective_from: NaiveDate,
    pub rate: Rate,
}

/// step table of key rates, sorted by effective date
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KeyRateTable {
    entries: Vec<KeyRateEntry>,
}

impl KeyRateTable {
    /// one rate for every date
    pub fn constant(rate: Rate) -> Self {
        Self {
            entries: vec![KeyRateEntry {
                effective_from: NaiveDate::MIN,
                rate,
            }],
        }
    }

    pub fn from_entries<I: IntoIterator<Item = KeyRateEntry>>(entries: I) -> Self {
        let mut entries: Vec<KeyRateEntry> = entries.into_iter().collect();
        entries.sort_by_key(|entry| entry.effective_from);
        Self { entries }
    }

    /// add a rate change, replacing any entry with the same date
    pub fn with_change(mut self, effective_from: NaiveDate, rate: Rate) -> Self {
        self.entries.retain(|entry| entry.effective_from != effective_from);
        self.entries.push(KeyRateEntry {
            effective_from,
            rate,
        });
        self.entries.sort_by_key(|entry| entry.effective_from);
        self
    }

    pub fn entries(&self) -> &[KeyRateEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyRateSource for KeyRateTable {
    fn rate_on(&self, date: NaiveDate) -> Option<Rate> {
        self.entries
            .iter()
            .rev()
            .find(|entry| entry.effective_from <= date)
            .map(|entry| entry.rate)
    }
}

/// which date the key rate is looked up for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RateApplication {
    /// the rate in force on the calculation date applies to every day
    #[default]
    CalculationDate,
    /// each accrual day uses the rate in force on that day
    AccrualDate,
}

/// penalty calculation policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculatorConfig {
    pub days_to_pay: i64,
    pub deferred_days_count: i64,
    pub moratoriums: Vec<Moratorium>,
    pub key_rate: KeyRateTable,
    pub rate_application: RateApplication,
    pub fraction_change_day: i64,
}

impl CalculatorConfig {
    pub fn builder() -> CalculatorConfigBuilder {
        CalculatorConfigBuilder::new()
    }

    /// housing and utilities preset with the 2020 and 2022 moratoriums
    pub fn housing(key_rate: KeyRateTable) -> Self {
        Self {
            days_to_pay: DEFAULT_DAYS_TO_PAY,
            deferred_days_count: DEFAULT_DEFERRED_DAYS,
            moratoriums: housing_moratoriums(),
            key_rate,
            rate_application: RateApplication::CalculationDate,
            fraction_change_day: DEFAULT_FRACTION_CHANGE_DAY,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.fraction_change_day <= 0 {
            return Err(CalculatorError::InvalidConfiguration {
                message: format!(
                    "fraction change day must be positive, got {}",
                    self.fraction_change_day
                ),
            });
        }

        if let Some(bad) = self.moratoriums.iter().find(|m| m.start > m.end) {
            return Err(CalculatorError::InvalidMoratorium {
                start: bad.start,
                end: bad.end,
            });
        }

        if self.key_rate.is_empty() {
            return Err(CalculatorError::InvalidConfiguration {
                message: "key rate table is empty".to_string(),
            });
        }

        Ok(())
    }

    /// due date for a billing period: month end + days to pay + 1
    pub fn due_date(&self, period: BillingPeriod) -> NaiveDate {
        period.last_day() + Duration::days(self.days_to_pay + 1)
    }

    pub fn is_moratorium(&self, day: NaiveDate) -> bool {
        self.moratoriums.iter().any(|m| m.contains(day))
    }

    /// strict key rate lookup
    pub fn key_rate_on(&self, date: NaiveDate) -> Result<Rate> {
        self.key_rate
            .rate_on(date)
            .ok_or(CalculatorError::MissingKeyRate { date })
    }

    /// key rates for one calculation run
    pub fn rate_lookup(&self, calculation_date: NaiveDate) -> RateLookup<'_> {
        let fixed = match self.rate_application {
            RateApplication::CalculationDate => Some(self.key_rate.rate_on(calculation_date)),
            RateApplication::AccrualDate => None,
        };
        RateLookup {
            table: &self.key_rate,
            fixed,
        }
    }
}

/// key rate resolution bound to a calculation date
#[derive(Debug, Clone, Copy)]
pub struct RateLookup<'a> {
    table: &'a KeyRateTable,
    /// resolved once under `RateApplication::CalculationDate`
    fixed: Option<Option<Rate>>,
}

impl RateLookup<'_> {
    /// rate for one accrual day, `None` when the table has no entry
    pub fn rate_for(&self, day: NaiveDate) -> Option<Rate> {
        match self.fixed {
            Some(rate) => rate,
            None => self.table.rate_on(day),
        }
    }
}

fn housing_moratoriums() -> Vec<Moratorium> {
    // both literal windows are well-formed
    [
        ((2020, 4, 6), (2021, 1, 1)),
        ((2022, 3, 31), (2022, 10, 1)),
    ]
    .into_iter()
    .filter_map(|((sy, sm, sd), (ey, em, ed))| {
        let start = NaiveDate::from_ymd_opt(sy, sm, sd)?;
        let end = NaiveDate::from_ymd_opt(ey, em, ed)?;
        Moratorium::new(start, end).ok()
    })
    .collect()
}

/// builder for calculator configs
pub struct CalculatorConfigBuilder {
    days_to_pay: Option<i64>,
    deferred_days_count: Option<i64>,
    moratoriums: Option<Vec<Moratorium>>,
    key_rate: Option<KeyRateTable>,
    rate_application: RateApplication,
    fraction_change_day: Option<i64>,
}

impl CalculatorConfigBuilder {
    pub fn new() -> Self {
        Self {
            days_to_pay: None,
            deferred_days_count: None,
            moratoriums: None,
            key_rate: None,
            rate_application: RateApplication::default(),
            fraction_change_day: None,
        }
    }

    pub fn days_to_pay(mut self, days: i64) -> Self {
        self.days_to_pay = Some(days);
        self
    }

    pub fn deferred_days_count(mut self, days: i64) -> Self {
        self.deferred_days_count = Some(days);
        self
    }

    /// add one moratorium window
    pub fn moratorium(mut self, moratorium: Moratorium) -> Self {
        self.moratoriums.get_or_insert_with(Vec::new).push(moratorium);
        self
    }

    /// replace all moratorium windows
    pub fn moratoriums(mut self, moratoriums: Vec<Moratorium>) -> Self {
        self.moratoriums = Some(moratoriums);
        self
    }

    pub fn key_rate(mut self, table: KeyRateTable) -> Self {
        self.key_rate = Some(table);
        self
    }

    pub fn constant_key_rate(self, rate: Rate) -> Self {
        self.key_rate(KeyRateTable::constant(rate))
    }

    pub fn rate_application(mut self, application: RateApplication) -> Self {
        self.rate_application = application;
        self
    }

    pub fn fraction_change_day(mut self, day: i64) -> Self {
        self.fraction_change_day = Some(day);
        self
    }

    pub fn build(self) -> Result<CalculatorConfig> {
        let key_rate = self
            .key_rate
            .ok_or_else(|| CalculatorError::InvalidConfiguration {
                message: "key rate not set".to_string(),
            })?;

        let config = CalculatorConfig {
            days_to_pay: self.days_to_pay.unwrap_or(DEFAULT_DAYS_TO_PAY),
            deferred_days_count: self.deferred_days_count.unwrap_or(DEFAULT_DEFERRED_DAYS),
            moratoriums: self.moratoriums.unwrap_or_else(housing_moratoriums),
            key_rate,
            rate_application: self.rate_application,
            fraction_change_day: self
                .fraction_change_day
                .unwrap_or(DEFAULT_FRACTION_CHANGE_DAY),
        };
        config.validate()?;
        Ok(config)
    }
}

impl Default for CalculatorConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// source of the policy in force on a date
pub trait ConfigProvider {
    fn config(&self, as_of: NaiveDate) -> Result<CalculatorConfig>;
}

/// provider returning one fixed config
#[derive(Debug, Clone)]
pub struct StaticConfigProvider {
    config: CalculatorConfig,
}

impl StaticConfigProvider {
    pub fn new(config: CalculatorConfig) -> Self {
        Self { config }
    }
}

impl ConfigProvider for StaticConfigProvider {
    fn config(&self, _as_of: NaiveDate) -> Result<CalculatorConfig> {
        Ok(self.config.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_moratorium_bounds_are_inclusive() {
        let m = Moratorium::new(date(2020, 4, 6), date(2021, 1, 1)).unwrap();
        assert!(m.contains(date(2020, 4, 6)));
        assert!(m.contains(date(2021, 1, 1)));
        assert!(!m.contains(date(2020, 4, 5)));
        assert!(!m.contains(date(2021, 1, 2)));
    }

    #[test]
    fn test_moratorium_rejects_reversed_window() {
        assert!(Moratorium::new(date(2021, 1, 2), date(2021, 1, 1)).is_err());
        assert!(Moratorium::new(date(2021, 1, 1), date(2021, 1, 1)).is_ok());
    }

    #[test]
    fn test_key_rate_table_lookup() {
        let table = KeyRateTable::default()
            .with_change(date(2023, 7, 24), Rate::from_percentage(8))
            .with_change(date(2023, 8, 15), Rate::from_percentage(12))
            .with_change(date(2023, 12, 18), Rate::from_percentage(16));

        assert_eq!(table.rate_on(date(2023, 7, 1)), None);
        assert_eq!(table.rate_on(date(2023, 7, 24)), Some(Rate::from_percentage(8)));
        assert_eq!(table.rate_on(date(2023, 9, 1)), Some(Rate::from_percentage(12)));
        assert_eq!(table.rate_on(date(2024, 4, 19)), Some(Rate::from_percentage(16)));
    }

    #[test]
    fn test_rate_lookup_follows_application() {
        let table = KeyRateTable::default()
            .with_change(date(2023, 1, 1), Rate::from_percentage(8))
            .with_change(date(2024, 1, 1), Rate::from_percentage(16));
        let mut config = CalculatorConfig::housing(table);

        let calculation_date = date(2024, 2, 1);
        let day = date(2023, 6, 1);
        let lookup = config.rate_lookup(calculation_date);
        assert_eq!(lookup.rate_for(day), Some(Rate::from_percentage(16)));
        assert_eq!(lookup.rate_for(date(2022, 1, 1)), Some(Rate::from_percentage(16)));

        config.rate_application = RateApplication::AccrualDate;
        let lookup = config.rate_lookup(calculation_date);
        assert_eq!(lookup.rate_for(day), Some(Rate::from_percentage(8)));
        assert_eq!(lookup.rate_for(date(2022, 1, 1)), None);
        assert!(config.key_rate_on(date(2022, 1, 1)).is_err());
    }

    #[test]
    fn test_calculation_date_without_rate() {
        let table =
            KeyRateTable::default().with_change(date(2025, 1, 1), Rate::from_percentage(21));
        let config = CalculatorConfig::housing(table);

        let lookup = config.rate_lookup(date(2024, 2, 1));
        assert_eq!(lookup.rate_for(date(2025, 6, 1)), None);
    }

    #[test]
    fn test_due_date() {
        let config = CalculatorConfig::housing(KeyRateTable::constant(Rate::ZERO));
        let period = BillingPeriod::from_ym(2019, 5).unwrap();
        assert_eq!(config.due_date(period), date(2019, 6, 11));
    }

    #[test]
    fn test_builder_defaults_and_validation() {
        let config = CalculatorConfig::builder()
            .constant_key_rate(Rate::from_percentage_decimal(dec!(9.5)))
            .build()
            .unwrap();
        assert_eq!(config.days_to_pay, 10);
        assert_eq!(config.deferred_days_count, 30);
        assert_eq!(config.fraction_change_day, 90);
        assert_eq!(config.moratoriums.len(), 2);

        assert!(CalculatorConfig::builder().build().is_err());
        assert!(CalculatorConfig::builder()
            .constant_key_rate(Rate::from_percentage(8))
            .fraction_change_day(0)
            .build()
            .is_err());
    }

    #[test]
    fn test_static_provider() {
        let config = CalculatorConfig::housing(KeyRateTable::constant(Rate::from_percentage(8)));
        let provider = StaticConfigProvider::new(config.clone());
        assert_eq!(provider.config(date(2024, 1, 1)).unwrap(), config);
    }
}
