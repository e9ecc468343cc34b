//! Journal-entry requests handed to the general ledger.
//!
//! Entries are built from `LoanEvent`s. Balancing and posting belong to the
//! ledger; nothing here checks that debits equal credits.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::AccountingConfig;
use crate::loan::LoanEvent;
use crate::types::Money;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalLine {
    pub account_id: String,
    pub debit: Money,
    pub credit: Money,
}

impl JournalLine {
    pub fn debit(account_id: &str, amount: Money) -> Self {
        Self {
            account_id: account_id.to_string(),
            debit: amount,
            credit: Decimal::ZERO,
        }
    }

    pub fn credit(account_id: &str, amount: Money) -> Self {
        Self {
            account_id: account_id.to_string(),
            debit: Decimal::ZERO,
            credit: amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntryRequest {
    pub date: NaiveDate,
    pub reference: String,
    pub description: String,
    pub source: String,
    pub lines: Vec<JournalLine>,
}

impl JournalEntryRequest {
    pub fn total_debits(&self) -> Money {
        self.lines.iter().map(|l| l.debit).sum()
    }

    pub fn total_credits(&self) -> Money {
        self.lines.iter().map(|l| l.credit).sum()
    }
}

/// Build the journal entry for a loan event under `reference`.
pub fn journal_for_event(
    event: &LoanEvent,
    reference: &str,
    accounts: &AccountingConfig,
) -> JournalEntryRequest {
    match event {
        LoanEvent::Disbursed {
            loan_id,
            amount,
            on,
        } => JournalEntryRequest {
            date: *on,
            reference: reference.to_string(),
            description: format!("Disbursement of loan {loan_id}"),
            source: accounts.source.clone(),
            lines: vec![
                JournalLine::debit(&accounts.loan_receivable_account, *amount),
                JournalLine::credit(&accounts.cash_account, *amount),
            ],
        },
        LoanEvent::RepaymentApplied {
            loan_id,
            principal,
            interest,
            on,
            ..
        } => {
            let mut lines = vec![JournalLine::debit(
                &accounts.cash_account,
                *principal + *interest,
            )];
            if !principal.is_zero() {
                lines.push(JournalLine::credit(
                    &accounts.loan_receivable_account,
                    *principal,
                ));
            }
            if !interest.is_zero() {
                lines.push(JournalLine::credit(
                    &accounts.interest_income_account,
                    *interest,
                ));
            }
            JournalEntryRequest {
                date: *on,
                reference: reference.to_string(),
                description: format!("Repayment on loan {loan_id}"),
                source: accounts.source.clone(),
                lines,
            }
        }
        LoanEvent::WrittenOff {
            loan_id,
            amount,
            on,
        } => JournalEntryRequest {
            date: *on,
            reference: reference.to_string(),
            description: format!("Write-off of loan {loan_id}"),
            source: accounts.source.clone(),
            lines: vec![
                JournalLine::debit(&accounts.write_off_expense_account, *amount),
                JournalLine::credit(&accounts.loan_receivable_account, *amount),
            ],
        },
    }
}
