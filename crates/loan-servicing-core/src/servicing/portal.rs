use serde::{Deserialize, Serialize};

use crate::loan::{Loan, LoanTransaction};
use crate::schedule::Installment;
use crate::servicing::LoanServicer;
use crate::types::Money;
use crate::LoanServicingResult;

/// Everything the client portal shows for one loan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanStatement {
    pub loan: Loan,
    pub installments: Vec<Installment>,
    pub transactions: Vec<LoanTransaction>,
    pub total_outstanding: Money,
    pub next_due: Option<Installment>,
}

impl LoanServicer {
    /// Installments in schedule order. `caller`, when given, must own the loan.
    pub fn loan_schedule(
        &self,
        loan_id: &str,
        caller: Option<&str>,
    ) -> LoanServicingResult<Vec<Installment>> {
        let loan = self.require_loan(loan_id)?;
        self.require_owner(&loan, caller)?;
        let mut installments = self.store.installments(loan_id)?;
        installments.sort_by_key(|i| i.installment_number);
        Ok(installments)
    }

    pub fn loan_statement(
        &self,
        loan_id: &str,
        caller: Option<&str>,
    ) -> LoanServicingResult<LoanStatement> {
        let loan = self.require_loan(loan_id)?;
        self.require_owner(&loan, caller)?;

        let mut installments = self.store.installments(loan_id)?;
        installments.sort_by_key(|i| i.installment_number);
        let transactions = self.store.transactions(loan_id)?;

        let total_outstanding = installments
            .iter()
            .filter(|i| i.is_unpaid())
            .map(|i| i.outstanding())
            .sum();
        let next_due = installments
            .iter()
            .filter(|i| i.is_unpaid())
            .min_by_key(|i| (i.due_date, i.installment_number))
            .cloned();

        Ok(LoanStatement {
            loan,
            installments,
            transactions,
            total_outstanding,
            next_due,
        })
    }
}
