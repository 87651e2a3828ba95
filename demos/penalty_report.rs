/// penalty report - one overdue month, one partial payment
use peni_calc::report::ReportRow;
use peni_calc::{Calculator, CalculatorConfig, KeyRateTable, Money, PaymentBody, Rate};
use peni_calc::{SafeTimeProvider, TimeSource};
use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== penalty report ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 4, 19, 0, 0, 0).unwrap(),
    ));

    let config = CalculatorConfig::housing(KeyRateTable::constant(
        Rate::from_percentage_decimal(dec!(9.5)),
    ));

    let may = NaiveDate::from_ymd_opt(2019, 5, 1).ok_or("bad date")?;
    let new_year = NaiveDate::from_ymd_opt(2020, 1, 1).ok_or("bad date")?;

    let calculator = Calculator::new(config)?
        .add_debt(may, Money::from_major(1_000))
        .add_payment(PaymentBody::new(new_year, Money::from_major(100)));

    for calculation in calculator.calculate_now(&time) {
        println!("period {}", calculation.period);
        println!("{}", ReportRow::HEADERS.join(" | "));
        for item in &calculation.items {
            println!("{}", ReportRow::from_item(item).cells().join(" | "));
        }
        println!("total: {}\n", calculation.total().round_dp(2));
    }

    let (reports, total) = calculator.reports(time.now().date_naive());
    println!("grand total: {}", total);
    if let Some(report) = reports.first() {
        println!("{}", report.to_json_pretty()?);
    }

    Ok(())
}
