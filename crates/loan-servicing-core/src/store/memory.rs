use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use crate::accounting::JournalEntryRequest;
use crate::error::LoanServicingError;
use crate::loan::{Customer, Loan, LoanTransaction};
use crate::origination::LoanProduct;
use crate::schedule::Installment;
use crate::store::{InstallmentChange, LoanCommit, LoanStore};
use crate::types::LoanId;
use crate::LoanServicingResult;

/// Serializable contents of a store. Doubles as the on-disk loan book format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoanBook {
    pub products: Vec<LoanProduct>,
    pub customers: Vec<Customer>,
    pub loans: Vec<Loan>,
    pub installments: BTreeMap<LoanId, Vec<Installment>>,
    pub transactions: Vec<LoanTransaction>,
    pub journal_outbox: Vec<JournalEntryRequest>,
}

/// Mutex-guarded store; one lock covers the whole book so commits are atomic.
#[derive(Debug, Default)]
pub struct InMemoryLoanStore {
    book: Mutex<LoanBook>,
}

impl InMemoryLoanStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_book(book: LoanBook) -> Self {
        Self {
            book: Mutex::new(book),
        }
    }

    /// Copy of the current contents.
    pub fn to_book(&self) -> LoanServicingResult<LoanBook> {
        Ok(self.lock()?.clone())
    }

    pub fn insert_product(&self, product: LoanProduct) -> LoanServicingResult<()> {
        let mut book = self.lock()?;
        book.products.retain(|p| p.id != product.id);
        book.products.push(product);
        Ok(())
    }

    pub fn insert_customer(&self, customer: Customer) -> LoanServicingResult<()> {
        let mut book = self.lock()?;
        book.customers.retain(|c| c.id != customer.id);
        book.customers.push(customer);
        Ok(())
    }

    /// Seed installments directly, bypassing version checks.
    pub fn seed_installments(
        &self,
        loan_id: &str,
        installments: Vec<Installment>,
    ) -> LoanServicingResult<()> {
        self.lock()?
            .installments
            .insert(loan_id.to_string(), installments);
        Ok(())
    }

    fn lock(&self) -> LoanServicingResult<MutexGuard<'_, LoanBook>> {
        self.book
            .lock()
            .map_err(|_| LoanServicingError::Storage("loan book lock poisoned".into()))
    }
}

impl LoanStore for InMemoryLoanStore {
    fn product(&self, id: &str) -> LoanServicingResult<Option<LoanProduct>> {
        Ok(self.lock()?.products.iter().find(|p| p.id == id).cloned())
    }

    fn customer(&self, id: &str) -> LoanServicingResult<Option<Customer>> {
        Ok(self.lock()?.customers.iter().find(|c| c.id == id).cloned())
    }

    fn loan(&self, id: &str) -> LoanServicingResult<Option<Loan>> {
        Ok(self.lock()?.loans.iter().find(|l| l.id == id).cloned())
    }

    fn loans_for_customer(&self, customer_id: &str) -> LoanServicingResult<Vec<Loan>> {
        Ok(self
            .lock()?
            .loans
            .iter()
            .filter(|l| l.customer_id == customer_id)
            .cloned()
            .collect())
    }

    fn installments(&self, loan_id: &str) -> LoanServicingResult<Vec<Installment>> {
        Ok(self
            .lock()?
            .installments
            .get(loan_id)
            .cloned()
            .unwrap_or_default())
    }

    fn transactions(&self, loan_id: &str) -> LoanServicingResult<Vec<LoanTransaction>> {
        Ok(self
            .lock()?
            .transactions
            .iter()
            .filter(|t| t.loan_id == loan_id)
            .cloned()
            .collect())
    }

    fn insert_loan(&self, loan: Loan) -> LoanServicingResult<()> {
        let mut book = self.lock()?;
        if book.loans.iter().any(|l| l.id == loan.id) {
            return Err(LoanServicingError::Conflict(format!(
                "Loan {} already exists",
                loan.id
            )));
        }
        book.loans.push(loan);
        Ok(())
    }

    fn commit(&self, commit: LoanCommit) -> LoanServicingResult<Loan> {
        let mut book = self.lock()?;
        let loan_id = commit.loan.id.clone();

        // Every check runs before the first write.
        let position = book
            .loans
            .iter()
            .position(|l| l.id == loan_id)
            .ok_or_else(|| LoanServicingError::not_found("Loan", loan_id.as_str()))?;

        let stored_version = book.loans[position].version;
        if stored_version != commit.expected_version {
            return Err(LoanServicingError::Conflict(format!(
                "Loan {loan_id} changed concurrently (version {stored_version}, expected {})",
                commit.expected_version
            )));
        }

        if let Some(txn) = &commit.transaction {
            if let Some(ext) = &txn.external_reference {
                let seen = book.transactions.iter().any(|t| {
                    t.loan_id == loan_id && t.external_reference.as_deref() == Some(ext.as_str())
                });
                if seen {
                    return Err(LoanServicingError::Conflict(format!(
                        "Reference {ext} was already applied to loan {loan_id}"
                    )));
                }
            }
        }

        if let InstallmentChange::Update(rows) = &commit.installments {
            let existing = book.installments.get(&loan_id);
            for row in rows {
                let known = existing
                    .map(|all| {
                        all.iter()
                            .any(|i| i.installment_number == row.installment_number)
                    })
                    .unwrap_or(false);
                if !known {
                    return Err(LoanServicingError::Storage(format!(
                        "Installment {} does not exist on loan {loan_id}",
                        row.installment_number
                    )));
                }
            }
        }

        match commit.installments {
            InstallmentChange::Unchanged => {}
            InstallmentChange::Replace(rows) => {
                book.installments.insert(loan_id.clone(), rows);
            }
            InstallmentChange::Update(rows) => {
                if let Some(existing) = book.installments.get_mut(&loan_id) {
                    for row in rows {
                        if let Some(slot) = existing
                            .iter_mut()
                            .find(|i| i.installment_number == row.installment_number)
                        {
                            *slot = row;
                        }
                    }
                }
            }
        }

        let mut loan = commit.loan;
        loan.version = stored_version + 1;
        book.loans[position] = loan.clone();

        if let Some(txn) = commit.transaction {
            book.transactions.push(txn);
        }
        if let Some(entry) = commit.journal {
            book.journal_outbox.push(entry);
        }

        Ok(loan)
    }

    fn journal_outbox(&self) -> LoanServicingResult<Vec<JournalEntryRequest>> {
        Ok(self.lock()?.journal_outbox.clone())
    }
}
