use log::debug;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::ledger::{Debt, Payment};
use crate::types::{BillingPeriod, DistributionMethod};

/// amount of one payment credited to one debt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub period: BillingPeriod,
    pub amount: Money,
}

/// result of spreading one payment over the debts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distribution {
    /// debts in their original order, payoffs for the payment updated
    pub debts: Vec<Debt>,
    /// funds left after every reachable balance was covered
    pub remainder: Money,
    /// per-debt credits in the order they were made
    pub allocations: Vec<Allocation>,
}

impl Distribution {
    pub fn total_allocated(&self) -> Money {
        self.allocations.iter().map(|a| a.amount).sum()
    }
}

/// allocates a payment across debts
pub struct PaymentDistributor {
    method: DistributionMethod,
}

impl PaymentDistributor {
    pub fn new(method: DistributionMethod) -> Self {
        Self { method }
    }

    pub fn method(&self) -> DistributionMethod {
        self.method
    }

    /// indices of `debts` in the order they receive funds
    pub fn order(&self, payment: &Payment, debts: &[Debt]) -> Vec<usize> {
        let mut order: Vec<usize> = (0..debts.len()).collect();
        order.sort_by_key(|&i| debts[i].period);

        if let (DistributionMethod::LastIsFirst, Some(target)) =
            (self.method, payment.target_period)
        {
            if let Some(pos) = order.iter().position(|&i| debts[i].period == target) {
                let first = order.remove(pos);
                order.insert(0, first);
            }
        }

        order
    }

    /// credit `payment` against `debts`, earliest or target period first.
    ///
    /// A debt that already carries a payoff for this payment has it replaced;
    /// its balance is measured without that payoff, so re-running the same
    /// payment is idempotent. Debts the payment no longer reaches lose any
    /// stale payoff for it.
    pub fn distribute(&self, payment: &Payment, debts: &[Debt]) -> Distribution {
        if debts.is_empty() {
            return Distribution {
                debts: Vec::new(),
                remainder: payment.amount,
                allocations: Vec::new(),
            };
        }

        let mut result: Vec<Debt> = debts.to_vec();
        let mut remainder = payment.amount;
        let mut allocations = Vec::new();

        for i in self.order(payment, debts) {
            let others_paid = result[i].without_payment(payment.id);
            let balance = others_paid.remaining_balance().max(Money::ZERO);
            let repayment = if remainder.is_positive() {
                remainder.min(balance)
            } else {
                Money::ZERO
            };

            if repayment.is_positive() {
                remainder -= repayment;
                result[i] = result[i].with_payoff(payment, repayment);
                allocations.push(Allocation {
                    period: result[i].period,
                    amount: repayment,
                });
            } else if result[i].payoff_for(payment.id).is_some() {
                result[i] = others_paid;
            }
        }

        debug!(
            "payment {} of {} distributed ({:?}): {} debts credited, remainder {}",
            payment.id,
            payment.amount,
            self.method,
            allocations.len(),
            remainder
        );

        Distribution {
            debts: result,
            remainder,
            allocations,
        }
    }
}

impl Default for PaymentDistributor {
    fn default() -> Self {
        Self::new(DistributionMethod::Fifo)
    }
}
