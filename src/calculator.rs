use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;
use log::debug;
use rust_decimal::Decimal;

use crate::config::{CalculatorConfig, ConfigProvider};
use crate::decimal::Money;
use crate::errors::Result;
use crate::ledger::PaymentBody;
use crate::penalty::{Calculation, FoldOptions, Penalty, PenaltyEngine, RowFolder};
use crate::report::{build_reports, CalculationReport};
use crate::state::CalculatorState;
use crate::types::{BillingPeriod, DistributionMethod, PaymentId};

/// penalty calculator: policy plus ledger
#[derive(Debug, Clone)]
pub struct Calculator {
    pub config: CalculatorConfig,
    pub state: CalculatorState,
    pub method: DistributionMethod,
    pub fold_options: FoldOptions,
}

impl Calculator {
    /// create with an empty ledger
    pub fn new(config: CalculatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: CalculatorState::new(),
            method: DistributionMethod::default(),
            fold_options: FoldOptions::default(),
        })
    }

    /// load the policy in force on `as_of`
    pub fn from_provider<P: ConfigProvider + ?Sized>(
        provider: &P,
        as_of: NaiveDate,
    ) -> Result<Self> {
        let config = provider.config(as_of)?;
        Self::new(config)
    }

    pub fn with_state(mut self, state: CalculatorState) -> Self {
        self.state = state;
        self
    }

    pub fn with_method(mut self, method: DistributionMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_fold_options(mut self, options: FoldOptions) -> Self {
        self.fold_options = options;
        self
    }

    pub fn add_debt(&self, any_date: NaiveDate, amount: Money) -> Self {
        self.next(self.state.add_debt(&self.config, any_date, amount))
    }

    pub fn delete_debt(&self, period: BillingPeriod) -> Self {
        self.next(self.state.delete_debt(period))
    }

    pub fn add_payment(&self, body: PaymentBody) -> Self {
        self.next(self.state.add_payment(body, self.method))
    }

    pub fn delete_payment(&self, id: PaymentId) -> Self {
        self.next(self.state.delete_payment(id))
    }

    pub fn redistribute(&self) -> Self {
        self.next(self.state.redistribute(self.method))
    }

    /// daily accrual for every debt
    pub fn penalties(&self, calculation_date: NaiveDate) -> Vec<Penalty> {
        let engine = PenaltyEngine::new(&self.config);
        self.state
            .debts
            .iter()
            .map(|debt| engine.calculate_penalty(calculation_date, debt))
            .collect()
    }

    /// folded report, one per debt in period order
    pub fn calculate(&self, calculation_date: NaiveDate) -> Vec<Calculation> {
        let folder = RowFolder::new(self.fold_options);
        let calculations: Vec<Calculation> = self
            .penalties(calculation_date)
            .iter()
            .map(|penalty| folder.fold(penalty))
            .collect();

        debug!(
            "calculator {}: {} debts as of {}, {} rows",
            self.state.id,
            calculations.len(),
            calculation_date,
            calculations.iter().map(|c| c.items.len()).sum::<usize>()
        );

        calculations
    }

    pub fn calculate_debt(
        &self,
        period: BillingPeriod,
        calculation_date: NaiveDate,
    ) -> Option<Calculation> {
        let debt = self.state.debt(period)?;
        let penalty = PenaltyEngine::new(&self.config).calculate_penalty(calculation_date, debt);
        Some(RowFolder::new(self.fold_options).fold(&penalty))
    }

    /// calculate as of today according to the time provider
    pub fn calculate_now(&self, time: &SafeTimeProvider) -> Vec<Calculation> {
        self.calculate(time.now().date_naive())
    }

    /// exact total over all debts
    pub fn total_penalty(&self, calculation_date: NaiveDate) -> Decimal {
        self.penalties(calculation_date).iter().map(|p| p.total()).sum()
    }

    pub fn reports(&self, calculation_date: NaiveDate) -> (Vec<CalculationReport>, Decimal) {
        build_reports(&self.calculate(calculation_date))
    }

    fn next(&self, state: CalculatorState) -> Self {
        Self {
            config: self.config.clone(),
            state,
            method: self.method,
            fold_options: self.fold_options,
        }
    }
}
