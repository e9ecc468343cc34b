//! Loan aggregate, its ledger transactions and the events it emits.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LoanServicingError;
use crate::schedule::LoanTerms;
use crate::types::{CustomerId, LoanId, Money, ProductId};
use crate::LoanServicingResult;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoanStatus {
    #[default]
    Pending,
    Approved,
    Active,
    FullyPaid,
    Closed,
    WrittenOff,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub id: LoanId,
    pub customer_id: CustomerId,
    pub product_id: ProductId,
    pub terms: LoanTerms,
    pub status: LoanStatus,
    #[serde(default)]
    pub disbursed_on: Option<NaiveDate>,
    /// Principal still owed.
    #[serde(default)]
    pub outstanding_balance: Money,
    /// Row version, bumped on every committed change.
    #[serde(default)]
    pub version: u64,
}

/// Domain events raised by state changes on a loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LoanEvent {
    Disbursed {
        loan_id: LoanId,
        amount: Money,
        on: NaiveDate,
    },
    RepaymentApplied {
        loan_id: LoanId,
        principal: Money,
        interest: Money,
        outstanding_balance: Money,
        on: NaiveDate,
    },
    WrittenOff {
        loan_id: LoanId,
        amount: Money,
        on: NaiveDate,
    },
}

impl Loan {
    pub fn is_owned_by(&self, customer_id: &str) -> bool {
        self.customer_id == customer_id
    }

    pub fn ensure_status(&self, expected: LoanStatus, operation: &str) -> LoanServicingResult<()> {
        if self.status != expected {
            return Err(LoanServicingError::InvalidState(format!(
                "Cannot {operation} loan {} with status {:?}; expected {:?}",
                self.id, self.status, expected
            )));
        }
        Ok(())
    }

    /// Approved → Active with the full principal outstanding.
    pub fn disburse(&mut self, on: NaiveDate) -> LoanServicingResult<LoanEvent> {
        self.ensure_status(LoanStatus::Approved, "disburse")?;
        self.status = LoanStatus::Active;
        self.disbursed_on = Some(on);
        self.outstanding_balance = self.terms.principal;
        Ok(LoanEvent::Disbursed {
            loan_id: self.id.clone(),
            amount: self.terms.principal,
            on,
        })
    }

    /// Reduce the outstanding principal after a repayment. The loan becomes
    /// FullyPaid once `schedule_settled` reports nothing left to pay.
    pub fn apply_repayment(
        &mut self,
        principal: Money,
        interest: Money,
        on: NaiveDate,
        schedule_settled: bool,
    ) -> LoanServicingResult<LoanEvent> {
        self.ensure_status(LoanStatus::Active, "repay")?;
        self.outstanding_balance = (self.outstanding_balance - principal).max(Decimal::ZERO);
        if schedule_settled {
            self.outstanding_balance = Decimal::ZERO;
            self.status = LoanStatus::FullyPaid;
        }
        Ok(LoanEvent::RepaymentApplied {
            loan_id: self.id.clone(),
            principal,
            interest,
            outstanding_balance: self.outstanding_balance,
            on,
        })
    }

    /// Active → WrittenOff, releasing the remaining principal.
    pub fn write_off(&mut self, on: NaiveDate) -> LoanServicingResult<LoanEvent> {
        self.ensure_status(LoanStatus::Active, "write off")?;
        let amount = self.outstanding_balance;
        self.outstanding_balance = Decimal::ZERO;
        self.status = LoanStatus::WrittenOff;
        Ok(LoanEvent::WrittenOff {
            loan_id: self.id.clone(),
            amount,
            on,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    Disbursement,
    Repayment,
    WriteOff,
}

/// A money movement recorded against a loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTransaction {
    pub reference: String,
    pub loan_id: LoanId,
    pub kind: TransactionKind,
    pub amount: Money,
    pub principal_amount: Money,
    pub interest_amount: Money,
    pub posted_on: NaiveDate,
    /// Caller-supplied reference used to reject duplicate submissions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_reference: Option<String>,
}

/// Borrower profile fields the eligibility check needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub monthly_income: Money,
}
