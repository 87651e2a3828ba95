use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{BillingPeriod, PaymentId, PayoffId};

/// portion of a payment credited against one debt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payoff {
    pub id: PayoffId,
    pub payment_id: PaymentId,
    pub payment_date: NaiveDate,
    pub repayment_amount: Money,
}

/// obligation for one billing period
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Debt {
    pub period: BillingPeriod,
    pub amount: Money,
    pub due_date: NaiveDate,
    pub payoffs: Vec<Payoff>,
}

impl Debt {
    pub fn new(period: BillingPeriod, amount: Money, due_date: NaiveDate) -> Self {
        Self {
            period,
            amount,
            due_date,
            payoffs: Vec::new(),
        }
    }

    /// total credited by payoffs
    pub fn paid_amount(&self) -> Money {
        self.payoffs.iter().map(|p| p.repayment_amount).sum()
    }

    /// amount minus all payoffs; not clamped at zero
    pub fn remaining_balance(&self) -> Money {
        self.amount - self.paid_amount()
    }

    /// balance after payoffs dated on or before `date`
    pub fn balance_on(&self, date: NaiveDate) -> Money {
        self.amount
            - self
                .payoffs
                .iter()
                .filter(|p| p.payment_date <= date)
                .map(|p| p.repayment_amount)
                .sum::<Money>()
    }

    /// payoffs credited on exactly `date`
    pub fn repaid_on(&self, date: NaiveDate) -> Money {
        self.payoffs
            .iter()
            .filter(|p| p.payment_date == date)
            .map(|p| p.repayment_amount)
            .sum()
    }

    pub fn payoff_for(&self, payment_id: PaymentId) -> Option<&Payoff> {
        self.payoffs.iter().find(|p| p.payment_id == payment_id)
    }

    /// copy with the payoff for `payment` set to `amount`
    pub fn with_payoff(&self, payment: &Payment, amount: Money) -> Debt {
        let mut debt = self.clone();
        match debt.payoffs.iter_mut().find(|p| p.payment_id == payment.id) {
            Some(existing) => {
                existing.repayment_amount = amount;
                existing.payment_date = payment.date;
            }
            None => {
                let id = PayoffId::after(debt.payoffs.iter().map(|p| p.id));
                debt.payoffs.push(Payoff {
                    id,
                    payment_id: payment.id,
                    payment_date: payment.date,
                    repayment_amount: amount,
                });
            }
        }
        debt
    }

    /// copy without any payoff referencing `payment_id`
    pub fn without_payment(&self, payment_id: PaymentId) -> Debt {
        let mut debt = self.clone();
        debt.payoffs.retain(|p| p.payment_id != payment_id);
        debt
    }
}

/// payment details supplied by the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentBody {
    pub date: NaiveDate,
    pub amount: Money,
    pub target_period: Option<BillingPeriod>,
}

impl PaymentBody {
    pub fn new(date: NaiveDate, amount: Money) -> Self {
        Self {
            date,
            amount,
            target_period: None,
        }
    }

    pub fn for_period(mut self, period: BillingPeriod) -> Self {
        self.target_period = Some(period);
        self
    }
}

/// money received
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub date: NaiveDate,
    pub amount: Money,
    pub target_period: Option<BillingPeriod>,
}

impl Payment {
    pub fn from_body(id: PaymentId, body: PaymentBody) -> Self {
        Self {
            id,
            date: body.date,
            amount: body.amount,
            target_period: body.target_period,
        }
    }
}
