//! report views handed to spreadsheet and document exporters
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::penalty::{Calculation, CalculationItem};
use crate::types::BillingPeriod;

/// decimal places shown for money in reports
pub const REPORT_SCALE: u32 = 2;

/// one exported row; field order is the column order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    pub debt_amount: Decimal,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub total_days: u32,
    pub rate_part: String,
    pub rate: Decimal,
    pub formula: String,
    pub penalty_amount: Decimal,
}

impl ReportRow {
    pub const HEADERS: [&'static str; 8] = [
        "Сумма долга",
        "Период с",
        "Период по",
        "Всего дней",
        "Доля ставки",
        "Ставка, %",
        "Расчёт",
        "Сумма пени",
    ];

    pub fn from_item(item: &CalculationItem) -> Self {
        Self {
            debt_amount: item.debt_amount.to_major(),
            date_from: item.date_from,
            date_to: item.date_to,
            total_days: item.total_days,
            rate_part: item.rate_part.to_string(),
            rate: item.rate.as_percentage(),
            formula: item.formula.clone(),
            penalty_amount: item.penalty_amount.round_dp(REPORT_SCALE),
        }
    }

    /// cells as plain text, dates as dd.mm.yyyy
    pub fn cells(&self) -> [String; 8] {
        [
            self.debt_amount.to_string(),
            self.date_from.format("%d.%m.%Y").to_string(),
            self.date_to.format("%d.%m.%Y").to_string(),
            self.total_days.to_string(),
            self.rate_part.clone(),
            self.rate.to_string(),
            self.formula.clone(),
            self.penalty_amount.to_string(),
        ]
    }
}

/// exported view of one debt's calculation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationReport {
    pub period: BillingPeriod,
    pub rows: Vec<ReportRow>,
    pub total_days: u32,
    /// exact total rounded once, not the sum of rounded rows
    pub total_penalty: Decimal,
}

impl CalculationReport {
    pub fn from_calculation(calculation: &Calculation) -> Self {
        Self {
            period: calculation.period,
            rows: calculation.items.iter().map(ReportRow::from_item).collect(),
            total_days: calculation.total_days(),
            total_penalty: calculation.total().round_dp(REPORT_SCALE),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// reports for several debts plus the grand total
pub fn build_reports(calculations: &[Calculation]) -> (Vec<CalculationReport>, Decimal) {
    let reports = calculations
        .iter()
        .map(CalculationReport::from_calculation)
        .collect();
    let total: Decimal = calculations.iter().map(|c| c.total()).sum();
    (reports, total.round_dp(REPORT_SCALE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::{Money, Rate};
    use crate::types::KeyRatePart;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn calculation() -> Calculation {
        Calculation {
            period: BillingPeriod::from_ym(2019, 5).unwrap(),
            items: vec![CalculationItem {
                debt_amount: Money::from_major(1_000),
                date_from: date(2019, 7, 11),
                date_to: date(2019, 9, 8),
                total_days: 60,
                rate_part: KeyRatePart::ONE_300TH,
                rate: Rate::from_percentage_decimal(dec!(9.5)),
                moratorium: false,
                deferment: false,
                formula: "60 ∙ 1/300 ∙ 9.5% ∙ 1000.00".to_string(),
                penalty_amount: dec!(19.0000002),
            }],
        }
    }

    #[test]
    fn test_row_columns() {
        let report = CalculationReport::from_calculation(&calculation());
        let row = &report.rows[0];

        assert_eq!(row.debt_amount, dec!(1000.00));
        assert_eq!(row.rate_part, "1/300");
        assert_eq!(row.rate, dec!(9.5));
        assert_eq!(row.penalty_amount, dec!(19.00));
        assert_eq!(row.cells()[1], "11.07.2019");
        assert_eq!(report.total_days, 60);
    }

    #[test]
    fn test_json_keeps_column_order() {
        let json = CalculationReport::from_calculation(&calculation())
            .to_json_pretty()
            .unwrap();
        let fields = [
            "debt_amount", "date_from", "date_to", "total_days",
            "rate_part", "rate", "formula", "penalty_amount",
        ];
        let positions: Vec<usize> = fields
            .iter()
            .map(|f| json.find(&format!("\"{}\"", f)).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_build_reports_total() {
        let (reports, total) = build_reports(&[calculation(), calculation()]);
        assert_eq!(reports.len(), 2);
        assert_eq!(total, dec!(38.00));
    }
}
