//! Persisted loan operations over a [`LoanStore`].
//!
//! Each operation loads what it needs, validates every precondition, computes
//! the new state with the pure calculators and hands the result to the store
//! as a single [`LoanCommit`](crate::store::LoanCommit). A failed check leaves
//! the store untouched.

mod lifecycle;
mod origination;
mod portal;
mod repayment;

use std::sync::Arc;

use crate::config::{AccountingConfig, LendingPolicy};
use crate::error::LoanServicingError;
use crate::loan::Loan;
use crate::store::LoanStore;
use crate::LoanServicingResult;

pub use lifecycle::DisbursementOutcome;
pub use portal::LoanStatement;
pub use repayment::{RepaymentOutcome, RepaymentRequest};

pub struct LoanServicer {
    store: Arc<dyn LoanStore>,
    policy: LendingPolicy,
    accounts: AccountingConfig,
}

impl LoanServicer {
    pub fn new(
        store: Arc<dyn LoanStore>,
        policy: LendingPolicy,
        accounts: AccountingConfig,
    ) -> LoanServicingResult<Self> {
        policy.validate()?;
        Ok(Self {
            store,
            policy,
            accounts,
        })
    }

    pub fn with_defaults(store: Arc<dyn LoanStore>) -> Self {
        Self {
            store,
            policy: LendingPolicy::default(),
            accounts: AccountingConfig::default(),
        }
    }

    pub fn store(&self) -> &Arc<dyn LoanStore> {
        &self.store
    }

    pub fn policy(&self) -> &LendingPolicy {
        &self.policy
    }

    fn require_loan(&self, loan_id: &str) -> LoanServicingResult<Loan> {
        self.store
            .loan(loan_id)?
            .ok_or_else(|| LoanServicingError::not_found("Loan", loan_id))
    }

    fn require_owner(&self, loan: &Loan, caller: Option<&str>) -> LoanServicingResult<()> {
        match caller {
            Some(customer_id) if !loan.is_owned_by(customer_id) => {
                tracing::warn!(loan_id = %loan.id, caller = %customer_id, "Ownership check failed");
                Err(LoanServicingError::Unauthorized(format!(
                    "Loan {} does not belong to customer {customer_id}",
                    loan.id
                )))
            }
            _ => Ok(()),
        }
    }
}

fn new_reference(prefix: &str) -> String {
    format!("{prefix}-{}", uuid::Uuid::new_v4().simple())
}
