//! Persistence seam for the servicing layer.
//!
//! Reads return `Ok(None)` for missing rows. Every write goes through
//! [`LoanStore::commit`], which must apply the whole [`LoanCommit`] or
//! nothing, and must refuse it when the loan's row version has moved.

pub mod memory;

use serde::{Deserialize, Serialize};

use crate::accounting::JournalEntryRequest;
use crate::loan::{Customer, Loan, LoanTransaction};
use crate::origination::LoanProduct;
use crate::schedule::Installment;
use crate::LoanServicingResult;

pub use memory::{InMemoryLoanStore, LoanBook};

/// What happens to a loan's installments in a commit.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum InstallmentChange {
    #[default]
    Unchanged,
    /// Overwrite the listed rows, matched by installment number.
    Update(Vec<Installment>),
    /// Delete every existing row and insert these.
    Replace(Vec<Installment>),
}

/// One atomic change to a loan and everything recorded alongside it.
#[derive(Debug, Clone, PartialEq)]
pub struct LoanCommit {
    /// The loan as it should be stored; its `version` is assigned by the store.
    pub loan: Loan,
    pub expected_version: u64,
    pub installments: InstallmentChange,
    pub transaction: Option<LoanTransaction>,
    pub journal: Option<JournalEntryRequest>,
}

pub trait LoanStore: Send + Sync {
    fn product(&self, id: &str) -> LoanServicingResult<Option<LoanProduct>>;

    fn customer(&self, id: &str) -> LoanServicingResult<Option<Customer>>;

    fn loan(&self, id: &str) -> LoanServicingResult<Option<Loan>>;

    fn loans_for_customer(&self, customer_id: &str) -> LoanServicingResult<Vec<Loan>>;

    fn installments(&self, loan_id: &str) -> LoanServicingResult<Vec<Installment>>;

    fn transactions(&self, loan_id: &str) -> LoanServicingResult<Vec<LoanTransaction>>;

    fn insert_loan(&self, loan: Loan) -> LoanServicingResult<()>;

    /// Apply `commit` atomically and return the stored loan.
    fn commit(&self, commit: LoanCommit) -> LoanServicingResult<Loan>;

    /// Journal entries recorded by commits, oldest first.
    fn journal_outbox(&self) -> LoanServicingResult<Vec<JournalEntryRequest>>;
}
