pub mod calculator;
pub mod config;
pub mod decimal;
pub mod errors;
pub mod ledger;
pub mod payments;
pub mod penalty;
pub mod report;
pub mod state;
pub mod types;

// re-export key types
pub use calculator::Calculator;
pub use config::{
    CalculatorConfig, CalculatorConfigBuilder, ConfigProvider, KeyRateEntry, KeyRateSource,
    KeyRateTable, Moratorium, RateApplication, RateLookup, StaticConfigProvider,
};
pub use decimal::{Money, Rate};
pub use errors::{CalculatorError, Result};
pub use ledger::{Debt, Payment, PaymentBody, Payoff};
pub use payments::{Distribution, PaymentDistributor};
pub use penalty::{
    calculate_penalty, Calculation, CalculationItem, FoldOptions, Penalty, PenaltyEngine,
    PenaltyItem, RowFolder,
};
pub use report::{CalculationReport, ReportRow};
pub use state::CalculatorState;
pub use types::{BillingPeriod, CalculatorId, DistributionMethod, KeyRatePart, PaymentId, PayoffId};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
