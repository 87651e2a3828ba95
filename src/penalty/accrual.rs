use chrono::{Duration, NaiveDate};
use log::{debug, warn};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::CalculatorConfig;
use crate::decimal::{round_accrual, Money, Rate};
use crate::ledger::Debt;
use crate::types::{BillingPeriod, KeyRatePart};

/// one day of accrual
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PenaltyItem {
    pub date: NaiveDate,
    /// balance the penalty is charged on
    pub debt_amount: Money,
    pub rate_part: KeyRatePart,
    pub rate: Rate,
    pub moratorium: bool,
    pub deferment: bool,
    /// major units at accrual scale, zero on deferment and moratorium days
    pub penalty_amount: Decimal,
}

impl PenaltyItem {
    /// true when the day contributes nothing by rule
    pub fn is_suspended(&self) -> bool {
        self.moratorium || self.deferment
    }
}

/// daily accrual sequence for one debt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Penalty {
    pub period: BillingPeriod,
    pub items: Vec<PenaltyItem>,
}

impl Penalty {
    pub fn total(&self) -> Decimal {
        self.items.iter().map(|item| item.penalty_amount).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn last_day(&self) -> Option<NaiveDate> {
        self.items.last().map(|item| item.date)
    }
}

/// one day's penalty: balance x rate x fraction
pub fn daily_penalty(debt_amount: Money, rate_part: KeyRatePart, rate: Rate) -> Decimal {
    round_accrual(rate_part.apply(debt_amount.to_major() * rate.as_decimal()))
}

/// engine walking a debt day by day
pub struct PenaltyEngine<'a> {
    config: &'a CalculatorConfig,
}

impl<'a> PenaltyEngine<'a> {
    pub fn new(config: &'a CalculatorConfig) -> Self {
        Self { config }
    }

    /// accrual items for every day in [due date, calculation date)
    ///
    /// Days with no known key rate accrue at zero; they are reported in one
    /// warning per debt.
    pub fn calculate_penalty(&self, calculation_date: NaiveDate, debt: &Debt) -> Penalty {
        let (penalty, unrated) = self.accrue(calculation_date, debt);

        if let (Some(first), Some(last)) = (unrated.first(), unrated.last()) {
            warn!(
                "no key rate for {} of {} days of {} ({} to {}), accrued at zero",
                unrated.len(),
                penalty.items.len(),
                debt.period,
                first,
                last
            );
        }

        debug!(
            "penalty for {}: {} days up to {}, total {}",
            debt.period,
            penalty.items.len(),
            calculation_date,
            penalty.total()
        );

        penalty
    }

    /// daily items plus the days that had no key rate
    fn accrue(&self, calculation_date: NaiveDate, debt: &Debt) -> (Penalty, Vec<NaiveDate>) {
        let config = self.config;
        let deferment_end = debt.due_date + Duration::days(config.deferred_days_count);
        let rates = config.rate_lookup(calculation_date);

        let mut items = Vec::new();
        let mut unrated = Vec::new();
        let mut day = debt.due_date;
        let mut debt_amount = debt.amount;

        while day < calculation_date {
            let days_overdue = (day - debt.due_date).num_days();
            let rate_part = KeyRatePart::for_days_overdue(days_overdue, config.fraction_change_day);
            let rate = rates.rate_for(day).unwrap_or_else(|| {
                unrated.push(day);
                Rate::ZERO
            });
            let deferment = day < deferment_end;
            let moratorium = config.is_moratorium(day);

            let penalty_amount = if deferment || moratorium {
                Decimal::ZERO
            } else {
                daily_penalty(debt_amount, rate_part, rate)
            };

            items.push(PenaltyItem {
                date: day,
                debt_amount,
                rate_part,
                rate,
                moratorium,
                deferment,
                penalty_amount,
            });

            // payments dated today reduce the balance from tomorrow
            debt_amount -= debt.repaid_on(day);
            day += Duration::days(1);
        }

        let penalty = Penalty {
            period: debt.period,
            items,
        };
        (penalty, unrated)
    }
}

/// free-standing form of [`PenaltyEngine::calculate_penalty`]
pub fn calculate_penalty(
    config: &CalculatorConfig,
    calculation_date: NaiveDate,
    debt: &Debt,
) -> Penalty {
    PenaltyEngine::new(config).calculate_penalty(calculation_date, debt)
}
