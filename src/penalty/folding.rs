use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::penalty::accrual::{Penalty, PenaltyItem};
use crate::types::{BillingPeriod, KeyRatePart};

pub const DEFERMENT_LABEL: &str = "Отсрочка";
pub const MORATORIUM_LABEL: &str = "Мораторий";

/// folded run of identical accrual days
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationItem {
    pub debt_amount: Money,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub total_days: u32,
    pub rate_part: KeyRatePart,
    pub rate: Rate,
    pub moratorium: bool,
    pub deferment: bool,
    pub formula: String,
    /// sum of the run's daily penalties
    pub penalty_amount: Decimal,
}

impl CalculationItem {
    fn start(item: &PenaltyItem, options: FoldOptions) -> Self {
        let mut row = Self {
            debt_amount: item.debt_amount,
            date_from: item.date,
            date_to: item.date,
            total_days: 1,
            rate_part: item.rate_part,
            rate: item.rate,
            moratorium: item.moratorium,
            deferment: item.deferment,
            formula: String::new(),
            penalty_amount: item.penalty_amount,
        };
        if options.single_day_formula {
            row.formula = row.render_formula();
        }
        row
    }

    fn extend(&mut self, item: &PenaltyItem) {
        self.date_to = item.date;
        self.total_days += 1;
        self.penalty_amount += item.penalty_amount;
        self.formula = self.render_formula();
    }

    /// whether `item` continues this run
    pub fn matches(&self, item: &PenaltyItem) -> bool {
        self.debt_amount == item.debt_amount
            && self.rate == item.rate
            && self.rate_part == item.rate_part
            && self.moratorium == item.moratorium
            && self.deferment == item.deferment
    }

    /// label or arithmetic for the current totals
    pub fn render_formula(&self) -> String {
        if self.deferment {
            DEFERMENT_LABEL.to_string()
        } else if self.moratorium {
            MORATORIUM_LABEL.to_string()
        } else {
            format!(
                "{} ∙ {} ∙ {} ∙ {}",
                self.total_days, self.rate_part, self.rate, self.debt_amount
            )
        }
    }
}

/// folded report for one debt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calculation {
    pub period: BillingPeriod,
    pub items: Vec<CalculationItem>,
}

impl Calculation {
    pub fn total(&self) -> Decimal {
        self.items.iter().map(|row| row.penalty_amount).sum()
    }

    pub fn total_days(&self) -> u32 {
        self.items.iter().map(|row| row.total_days).sum()
    }
}

/// decision taken for each accrual day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoldStep {
    Extend,
    Start,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FoldOptions {
    /// render the formula on runs of a single day too; off leaves them blank
    pub single_day_formula: bool,
}

/// compresses daily items into reporting ranges
#[derive(Debug, Clone, Copy, Default)]
pub struct RowFolder {
    options: FoldOptions,
}

impl RowFolder {
    pub fn new(options: FoldOptions) -> Self {
        Self { options }
    }

    pub fn step(last: Option<&CalculationItem>, item: &PenaltyItem) -> FoldStep {
        match last {
            Some(row) if row.matches(item) => FoldStep::Extend,
            _ => FoldStep::Start,
        }
    }

    pub fn fold(&self, penalty: &Penalty) -> Calculation {
        let items = penalty
            .items
            .iter()
            .fold(Vec::<CalculationItem>::new(), |mut rows, item| {
                match Self::step(rows.last(), item) {
                    FoldStep::Extend => {
                        if let Some(row) = rows.last_mut() {
                            row.extend(item);
                        }
                    }
                    FoldStep::Start => rows.push(CalculationItem::start(item, self.options)),
                }
                rows
            });

        Calculation {
            period: penalty.period,
            items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CalculatorConfig;
    use crate::ledger::{Debt, Payment, PaymentBody};
    use crate::penalty::accrual::calculate_penalty;
    use crate::types::PaymentId;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn config() -> CalculatorConfig {
        CalculatorConfig::builder()
            .constant_key_rate(Rate::from_percentage_decimal(dec!(9.5)))
            .build()
            .unwrap()
    }

    fn reference_penalty() -> Penalty {
        let config = config();
        let period = BillingPeriod::from_ym(2019, 5).unwrap();
        let payment = Payment::from_body(
            PaymentId::FIRST,
            PaymentBody::new(date(2020, 1, 1), Money::from_major(100)),
        );
        let debt = Debt::new(period, Money::from_major(1_000), config.due_date(period))
            .with_payoff(&payment, Money::from_major(100));
        calculate_penalty(&config, date(2024, 4, 19), &debt)
    }

    fn item(day: NaiveDate, deferment: bool) -> PenaltyItem {
        PenaltyItem {
            date: day,
            debt_amount: Money::from_major(1_000),
            rate_part: KeyRatePart::ONE_300TH,
            rate: Rate::from_percentage(9),
            moratorium: false,
            deferment,
            penalty_amount: if deferment { Decimal::ZERO } else { dec!(0.3) },
        }
    }

    #[test]
    fn test_reference_rows() {
        let calculation = RowFolder::default().fold(&reference_penalty());
        let rows = &calculation.items;

        assert_eq!(rows.len(), 8);
        assert_eq!(rows[0].formula, DEFERMENT_LABEL);
        assert_eq!(rows[0].total_days, 30);
        assert_eq!(rows[1].date_from, date(2019, 7, 11));
        assert_eq!(rows[1].date_to, date(2019, 9, 8));
        assert_eq!(rows[1].formula, "60 ∙ 1/300 ∙ 9.5% ∙ 1000.00");
        assert_eq!(rows[2].total_days, 115);
        assert_eq!(rows[3].debt_amount, Money::from_major(900));
        assert_eq!(rows[4].formula, MORATORIUM_LABEL);
        assert_eq!(rows[7].date_to, date(2024, 4, 18));
        assert_eq!(calculation.total().round_dp(2), dec!(835.05));
    }

    #[test]
    fn test_single_day_row_keeps_blank_formula() {
        let penalty = Penalty {
            period: BillingPeriod::from_ym(2019, 5).unwrap(),
            items: vec![item(date(2019, 6, 11), true), item(date(2019, 6, 12), false)],
        };

        let blank = RowFolder::default().fold(&penalty);
        assert_eq!(blank.items.len(), 2);
        assert!(blank.items.iter().all(|row| row.formula.is_empty()));

        let filled = RowFolder::new(FoldOptions {
            single_day_formula: true,
        })
        .fold(&penalty);
        assert_eq!(filled.items[0].formula, DEFERMENT_LABEL);
        assert_eq!(filled.items[1].formula, "1 ∙ 1/300 ∙ 9% ∙ 1000.00");
    }

    #[test]
    fn test_step_decision() {
        let first = item(date(2019, 6, 11), false);
        let row = CalculationItem::start(&first, FoldOptions::default());

        assert_eq!(RowFolder::step(None, &first), FoldStep::Start);
        assert_eq!(RowFolder::step(Some(&row), &item(date(2019, 6, 12), false)), FoldStep::Extend);
        assert_eq!(RowFolder::step(Some(&row), &item(date(2019, 6, 12), true)), FoldStep::Start);
    }

    #[test]
    fn test_empty_penalty_folds_to_no_rows() {
        let penalty = Penalty {
            period: BillingPeriod::from_ym(2019, 5).unwrap(),
            items: Vec::new(),
        };
        assert!(RowFolder::default().fold(&penalty).items.is_empty());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_fold_preserves_sum_and_days(
            days in 0i64..1_500,
            payment_offset in 0i64..1_500,
            payment_minor in 0i64..100_000,
        ) {
            let config = config();
            let period = BillingPeriod::from_ym(2021, 3).unwrap();
            let due = config.due_date(period);
            let payment = Payment::from_body(
                PaymentId::FIRST,
                PaymentBody::new(
                    due + chrono::Duration::days(payment_offset),
                    Money::from_minor(payment_minor),
                ),
            );
            let debt = Debt::new(period, Money::from_major(1_000), due)
                .with_payoff(&payment, Money::from_minor(payment_minor));

            let penalty = calculate_penalty(&config, due + chrono::Duration::days(days), &debt);
            let calculation = RowFolder::default().fold(&penalty);

            prop_assert_eq!(calculation.total(), penalty.total());
            prop_assert_eq!(calculation.total_days() as usize, penalty.items.len());
            prop_assert!(calculation.items.iter().all(|row| row.total_days >= 1));
        }
    }
}
