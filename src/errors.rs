use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CalculatorError {
    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("invalid moratorium: start {start} is after end {end}")]
    InvalidMoratorium {
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("no key rate known for {date}")]
    MissingKeyRate {
        date: NaiveDate,
    },

    #[error("invalid billing period: {value}")]
    InvalidPeriod {
        value: String,
    },

    #[error("invalid amount: {value}")]
    InvalidAmount {
        value: String,
    },

    #[error("amount {value} does not fit in minor units")]
    AmountOutOfRange {
        value: String,
    },

    #[error("config provider failed: {message}")]
    ConfigProvider {
        message: String,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CalculatorError>;
