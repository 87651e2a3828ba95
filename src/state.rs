use chrono::NaiveDate;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::CalculatorConfig;
use crate::decimal::Money;
use crate::errors::Result;
use crate::ledger::{Debt, Payment, PaymentBody};
use crate::payments::PaymentDistributor;
use crate::types::{BillingPeriod, CalculatorId, DistributionMethod, PaymentId};

/// part of a payment no debt could absorb
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unallocated {
    pub payment_id: PaymentId,
    pub amount: Money,
}

/// ledger of debts and payments.
///
/// Every operation returns a new state and leaves `self` untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculatorState {
    pub id: CalculatorId,
    /// sorted by period, at most one per period
    pub debts: Vec<Debt>,
    /// in id order
    pub payments: Vec<Payment>,
    pub unallocated: Vec<Unallocated>,
}

impl CalculatorState {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            debts: Vec::new(),
            payments: Vec::new(),
            unallocated: Vec::new(),
        }
    }

    pub fn debt(&self, period: BillingPeriod) -> Option<&Debt> {
        self.debts.iter().find(|d| d.period == period)
    }

    pub fn payment(&self, id: PaymentId) -> Option<&Payment> {
        self.payments.iter().find(|p| p.id == id)
    }

    pub fn next_payment_id(&self) -> PaymentId {
        PaymentId::after(self.payments.iter().map(|p| p.id))
    }

    /// remainder recorded for a payment, zero when fully allocated
    pub fn unallocated_for(&self, id: PaymentId) -> Money {
        self.unallocated
            .iter()
            .filter(|u| u.payment_id == id)
            .map(|u| u.amount)
            .sum()
    }

    pub fn total_unallocated(&self) -> Money {
        self.unallocated.iter().map(|u| u.amount).sum()
    }

    /// total outstanding across all debts
    pub fn total_outstanding(&self) -> Money {
        self.debts.iter().map(|d| d.remaining_balance()).sum()
    }

    /// add the debt for the month containing `any_date`; an existing period is kept as is
    pub fn add_debt(
        &self,
        config: &CalculatorConfig,
        any_date: NaiveDate,
        amount: Money,
    ) -> CalculatorState {
        let period = BillingPeriod::from_date(any_date);
        if self.debt(period).is_some() {
            warn!("debt for {} already present, ignoring new amount {}", period, amount);
            return self.clone();
        }

        let due_date = config.due_date(period);
        debug!("adding debt {} for {} due {}", amount, period, due_date);

        let mut next = self.clone();
        next.debts.push(Debt::new(period, amount, due_date));
        next.debts.sort_by_key(|d| d.period);
        next
    }

    /// remove a debt; payments stay untouched
    pub fn delete_debt(&self, period: BillingPeriod) -> CalculatorState {
        let mut next = self.clone();
        next.debts.retain(|d| d.period != period);
        debug!("deleted debt for {}", period);
        next
    }

    /// record a payment under the next id and distribute it
    pub fn add_payment(&self, body: PaymentBody, method: DistributionMethod) -> CalculatorState {
        let payment = Payment::from_body(self.next_payment_id(), body);
        let mut next = self.clone();
        next.apply_payment(&payment, method);
        next.payments.push(payment);
        next
    }

    /// remove a payment and every payoff it produced.
    ///
    /// Remaining payments are not redistributed; see [`CalculatorState::redistribute`].
    pub fn delete_payment(&self, id: PaymentId) -> CalculatorState {
        if self.payment(id).is_none() {
            warn!("payment {} not found, nothing to delete", id);
            return self.clone();
        }

        let mut next = self.clone();
        next.payments.retain(|p| p.id != id);
        next.unallocated.retain(|u| u.payment_id != id);
        next.debts = next.debts.iter().map(|d| d.without_payment(id)).collect();
        debug!("deleted payment {}", id);
        next
    }

    /// drop every payoff and replay all payments in id order
    pub fn redistribute(&self, method: DistributionMethod) -> CalculatorState {
        let mut next = self.clone();
        next.unallocated.clear();
        for debt in next.debts.iter_mut() {
            debt.payoffs.clear();
        }

        let payments = next.payments.clone();
        for payment in &payments {
            next.apply_payment(payment, method);
        }
        debug!("redistributed {} payments ({:?})", payments.len(), method);
        next
    }

    /// pretty json of the whole ledger
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn apply_payment(&mut self, payment: &Payment, method: DistributionMethod) {
        let distribution = PaymentDistributor::new(method).distribute(payment, &self.debts);
        self.debts = distribution.debts;
        self.unallocated.retain(|u| u.payment_id != payment.id);
        if distribution.remainder.is_positive() {
            self.unallocated.push(Unallocated {
                payment_id: payment.id,
                amount: distribution.remainder,
            });
        }
    }
}

impl Default for CalculatorState {
    fn default() -> Self {
        Self::new()
    }
}
