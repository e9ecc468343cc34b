use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::accounting::journal_for_event;
use crate::error::LoanServicingError;
use crate::loan::{LoanEvent, LoanTransaction, TransactionKind};
use crate::schedule::{amortize, Installment};
use crate::servicing::{new_reference, LoanServicer};
use crate::store::{InstallmentChange, LoanCommit};
use crate::LoanServicingResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisbursementOutcome {
    pub transaction_ref: String,
    pub installments: Vec<Installment>,
}

impl LoanServicer {
    /// Regenerate the loan's schedule from its terms. Existing installments
    /// are deleted first; a schedule that already took payments is kept.
    pub fn generate_schedule(
        &self,
        loan_id: &str,
        start_date: NaiveDate,
    ) -> LoanServicingResult<Vec<Installment>> {
        let loan = self.require_loan(loan_id)?;

        let existing = self.store.installments(loan_id)?;
        if existing.iter().any(|i| i.amount_paid > Decimal::ZERO) {
            return Err(LoanServicingError::InvalidState(format!(
                "Loan {loan_id} has installments with payments; its schedule cannot be regenerated"
            )));
        }

        let installments = amortize(&loan.terms, start_date, &self.policy)?;
        let expected_version = loan.version;
        self.store.commit(LoanCommit {
            loan,
            expected_version,
            installments: InstallmentChange::Replace(installments.clone()),
            transaction: None,
            journal: None,
        })?;

        tracing::info!(
            loan_id = %loan_id,
            replaced = existing.len(),
            installments = installments.len(),
            "Schedule regenerated"
        );
        Ok(installments)
    }

    /// Pay out an approved loan and create its schedule, first installment
    /// due one period after `on`.
    pub fn disburse_loan(
        &self,
        loan_id: &str,
        on: NaiveDate,
    ) -> LoanServicingResult<DisbursementOutcome> {
        let loan = self.require_loan(loan_id)?;
        let installments = amortize(&loan.terms, on, &self.policy)?;

        let expected_version = loan.version;
        let mut updated = loan;
        let event = updated.disburse(on)?;
        let reference = new_reference("DSB");

        self.store.commit(LoanCommit {
            transaction: Some(self.transaction_for(&event, &reference)),
            journal: Some(journal_for_event(&event, &reference, &self.accounts)),
            loan: updated,
            expected_version,
            installments: InstallmentChange::Replace(installments.clone()),
        })?;

        tracing::info!(loan_id = %loan_id, transaction_ref = %reference, "Loan disbursed");
        Ok(DisbursementOutcome {
            transaction_ref: reference,
            installments,
        })
    }

    /// Write off an active loan's remaining principal.
    pub fn write_off_loan(&self, loan_id: &str, on: NaiveDate) -> LoanServicingResult<String> {
        let loan = self.require_loan(loan_id)?;
        let expected_version = loan.version;
        let mut updated = loan;
        let event = updated.write_off(on)?;
        let reference = new_reference("WOF");

        self.store.commit(LoanCommit {
            transaction: Some(self.transaction_for(&event, &reference)),
            journal: Some(journal_for_event(&event, &reference, &self.accounts)),
            loan: updated,
            expected_version,
            installments: InstallmentChange::Unchanged,
        })?;

        tracing::info!(loan_id = %loan_id, transaction_ref = %reference, "Loan written off");
        Ok(reference)
    }

    fn transaction_for(&self, event: &LoanEvent, reference: &str) -> LoanTransaction {
        let (loan_id, kind, amount, on) = match event {
            LoanEvent::Disbursed {
                loan_id,
                amount,
                on,
            } => (loan_id, TransactionKind::Disbursement, *amount, *on),
            LoanEvent::WrittenOff {
                loan_id,
                amount,
                on,
            } => (loan_id, TransactionKind::WriteOff, *amount, *on),
            LoanEvent::RepaymentApplied {
                loan_id,
                principal,
                on,
                ..
            } => (loan_id, TransactionKind::Repayment, *principal, *on),
        };
        LoanTransaction {
            reference: reference.to_string(),
            loan_id: loan_id.clone(),
            kind,
            amount,
            principal_amount: amount,
            interest_amount: Decimal::ZERO,
            posted_on: on,
            external_reference: None,
        }
    }
}
