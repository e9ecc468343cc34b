use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::accounting::journal_for_event;
use crate::error::LoanServicingError;
use crate::loan::{LoanStatus, LoanTransaction, TransactionKind};
use crate::repayment::{allocate_payment, RepaymentAllocation};
use crate::servicing::{new_reference, LoanServicer};
use crate::store::{InstallmentChange, LoanCommit};
use crate::types::{CustomerId, LoanId, Money};
use crate::LoanServicingResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepaymentRequest {
    pub loan_id: LoanId,
    pub amount: Money,
    pub paid_on: NaiveDate,
    /// Client-side reference; a second submission with the same value is rejected.
    #[serde(default)]
    pub external_reference: Option<String>,
    /// Set when a customer pays through the portal; must own the loan.
    #[serde(default)]
    pub requested_by: Option<CustomerId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepaymentOutcome {
    pub success: bool,
    pub transaction_ref: String,
    pub allocation: RepaymentAllocation,
    pub outstanding_balance: Money,
    pub loan_status: LoanStatus,
}

impl LoanServicer {
    /// Apply a payment to the loan's unpaid installments, oldest due first.
    ///
    /// Installment updates, the loan balance, the transaction record and the
    /// journal entry are committed together or not at all.
    pub fn process_repayment(
        &self,
        request: &RepaymentRequest,
    ) -> LoanServicingResult<RepaymentOutcome> {
        if request.amount <= Decimal::ZERO {
            return Err(LoanServicingError::InvalidInput {
                field: "amount".into(),
                reason: "Repayment amount must be positive".into(),
            });
        }

        let loan = self.require_loan(&request.loan_id)?;
        self.require_owner(&loan, request.requested_by.as_deref())?;
        if let Err(e) = loan.ensure_status(LoanStatus::Active, "repay") {
            tracing::warn!(loan_id = %loan.id, status = ?loan.status, "Repayment rejected");
            return Err(e);
        }

        if let Some(ext) = &request.external_reference {
            let duplicate = self
                .store
                .transactions(&loan.id)?
                .iter()
                .any(|t| t.external_reference.as_deref() == Some(ext.as_str()));
            if duplicate {
                tracing::warn!(loan_id = %loan.id, reference = %ext, "Duplicate repayment rejected");
                return Err(LoanServicingError::Conflict(format!(
                    "Reference {ext} was already applied to loan {}",
                    loan.id
                )));
            }
        }

        let mut installments = self.store.installments(&loan.id)?;
        let allocation =
            allocate_payment(&mut installments, request.amount, self.policy.paid_tolerance)?;

        let touched: Vec<_> = installments
            .iter()
            .filter(|i| {
                allocation
                    .lines
                    .iter()
                    .any(|l| l.installment_number == i.installment_number)
            })
            .cloned()
            .collect();
        let settled = installments.iter().all(|i| !i.is_unpaid());

        let expected_version = loan.version;
        let mut updated = loan.clone();
        let event = updated.apply_repayment(
            allocation.principal_applied,
            allocation.interest_applied,
            request.paid_on,
            settled,
        )?;

        let reference = new_reference("RPY");
        let transaction = LoanTransaction {
            reference: reference.clone(),
            loan_id: loan.id.clone(),
            kind: TransactionKind::Repayment,
            amount: allocation.total_applied,
            principal_amount: allocation.principal_applied,
            interest_amount: allocation.interest_applied,
            posted_on: request.paid_on,
            external_reference: request.external_reference.clone(),
        };
        let journal = journal_for_event(&event, &reference, &self.accounts);

        let stored = self.store.commit(LoanCommit {
            loan: updated,
            expected_version,
            installments: InstallmentChange::Update(touched),
            transaction: Some(transaction),
            journal: Some(journal),
        })?;

        tracing::info!(
            loan_id = %stored.id,
            transaction_ref = %reference,
            applied = %allocation.total_applied,
            installments = allocation.lines.len(),
            outstanding = %stored.outstanding_balance,
            "Repayment applied"
        );
        if allocation.unallocated > Decimal::ZERO {
            tracing::warn!(
                loan_id = %stored.id,
                unallocated = %allocation.unallocated,
                "Payment exceeded the outstanding schedule"
            );
        }

        Ok(RepaymentOutcome {
            success: true,
            transaction_ref: reference,
            outstanding_balance: stored.outstanding_balance,
            loan_status: stored.status,
            allocation,
        })
    }
}
