pub mod accrual;
pub mod folding;

pub use accrual::{calculate_penalty, daily_penalty, Penalty, PenaltyEngine, PenaltyItem};
pub use folding::{Calculation, CalculationItem, FoldOptions, FoldStep, RowFolder};
