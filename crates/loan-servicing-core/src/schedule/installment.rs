use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::Money;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstallmentStatus {
    #[default]
    Pending,
    PartiallyPaid,
    Paid,
}

/// One scheduled payment of a loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Installment {
    pub installment_number: u32,
    pub due_date: NaiveDate,
    pub principal_portion: Money,
    pub interest_portion: Money,
    pub total_due: Money,
    #[serde(default)]
    pub amount_paid: Money,
    /// Part of `amount_paid` that settled interest.
    #[serde(default)]
    pub interest_paid: Money,
    #[serde(default)]
    pub status: InstallmentStatus,
}

/// Split of an amount applied to a single installment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AppliedSplit {
    pub applied: Money,
    pub interest: Money,
    pub principal: Money,
}

impl Installment {
    pub fn new(
        installment_number: u32,
        due_date: NaiveDate,
        principal_portion: Money,
        interest_portion: Money,
    ) -> Self {
        let total_due = principal_portion + interest_portion;
        // Nothing owed: the row is settled from the start.
        let status = if total_due <= Decimal::ZERO {
            InstallmentStatus::Paid
        } else {
            InstallmentStatus::Pending
        };
        Self {
            installment_number,
            due_date,
            principal_portion,
            interest_portion,
            total_due,
            amount_paid: Decimal::ZERO,
            interest_paid: Decimal::ZERO,
            status,
        }
    }

    pub fn outstanding(&self) -> Money {
        self.total_due - self.amount_paid
    }

    pub fn principal_paid(&self) -> Money {
        self.amount_paid - self.interest_paid
    }

    /// Still open for allocation.
    pub fn is_unpaid(&self) -> bool {
        self.status != InstallmentStatus::Paid && self.amount_paid < self.total_due
    }

    /// Apply up to `amount` to this installment, interest first, and advance
    /// its status. Never pays beyond `total_due`; the status only moves forward.
    pub fn apply_payment(&mut self, amount: Money, paid_tolerance: Money) -> AppliedSplit {
        let due = self.outstanding();
        if amount <= Decimal::ZERO || due <= Decimal::ZERO {
            return AppliedSplit::default();
        }

        let applied = amount.min(due);
        let interest_due = (self.interest_portion - self.interest_paid).max(Decimal::ZERO);
        let interest = applied.min(interest_due);
        let principal = applied - interest;

        self.amount_paid += applied;
        self.interest_paid += interest;
        self.status = if self.outstanding() <= paid_tolerance {
            InstallmentStatus::Paid
        } else {
            InstallmentStatus::PartiallyPaid
        };

        AppliedSplit {
            applied,
            interest,
            principal,
        }
    }
}
