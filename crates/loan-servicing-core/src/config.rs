//! Tunable lending policy and ledger account mapping.
//!
//! Both structs deserialise from JSON with every field optional, so a policy
//! file only needs to name the values it overrides.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::LoanServicingError;
use crate::types::{Money, Rate};
use crate::LoanServicingResult;

/// Thresholds and heuristics used by the calculators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LendingPolicy {
    /// Ceiling for (existing + new monthly debt) / monthly income.
    pub max_debt_service_ratio: Rate,
    /// Share of outstanding active-loan balances counted as existing monthly debt.
    pub existing_debt_payment_factor: Rate,
    /// Share of monthly income that may be committed when sizing the maximum amount.
    pub income_commitment_ratio: Rate,
    /// An installment whose outstanding amount is at or below this is Paid.
    pub paid_tolerance: Money,
    /// Weekly schedules approximate a month as this many weeks.
    pub weeks_per_month: u32,
    /// Decimal places for every generated money amount.
    pub rounding_dp: u32,
}

impl Default for LendingPolicy {
    fn default() -> Self {
        Self {
            max_debt_service_ratio: dec!(0.50),
            existing_debt_payment_factor: dec!(0.10),
            income_commitment_ratio: dec!(0.5),
            paid_tolerance: dec!(0.01),
            weeks_per_month: 4,
            rounding_dp: 2,
        }
    }
}

impl LendingPolicy {
    pub fn validate(&self) -> LoanServicingResult<()> {
        if self.max_debt_service_ratio <= Decimal::ZERO {
            return Err(LoanServicingError::invalid_input(
                "max_debt_service_ratio",
                "Must be positive",
            ));
        }
        if self.existing_debt_payment_factor < Decimal::ZERO {
            return Err(LoanServicingError::invalid_input(
                "existing_debt_payment_factor",
                "Cannot be negative",
            ));
        }
        if self.income_commitment_ratio < Decimal::ZERO {
            return Err(LoanServicingError::invalid_input(
                "income_commitment_ratio",
                "Cannot be negative",
            ));
        }
        if self.paid_tolerance < Decimal::ZERO {
            return Err(LoanServicingError::invalid_input(
                "paid_tolerance",
                "Cannot be negative",
            ));
        }
        if self.weeks_per_month == 0 {
            return Err(LoanServicingError::invalid_input(
                "weeks_per_month",
                "Must be at least 1",
            ));
        }
        if self.rounding_dp > 8 {
            return Err(LoanServicingError::invalid_input(
                "rounding_dp",
                "At most 8 decimal places are supported",
            ));
        }
        Ok(())
    }
}

/// Chart-of-accounts identifiers referenced by generated journal entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountingConfig {
    pub cash_account: String,
    pub loan_receivable_account: String,
    pub interest_income_account: String,
    pub write_off_expense_account: String,
    /// Value stamped into `JournalEntryRequest::source`.
    pub source: String,
}

impl Default for AccountingConfig {
    fn default() -> Self {
        Self {
            cash_account: "1010".into(),
            loan_receivable_account: "1200".into(),
            interest_income_account: "4100".into(),
            write_off_expense_account: "5600".into(),
            source: "LOANS".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_policy_file_keeps_defaults() {
        let policy: LendingPolicy =
            serde_json::from_str(r#"{ "max_debt_service_ratio": "0.40" }"#).unwrap();
        assert_eq!(policy.max_debt_service_ratio, dec!(0.40));
        assert_eq!(policy.existing_debt_payment_factor, dec!(0.10));
        assert_eq!(policy.weeks_per_month, 4);
    }

    #[test]
    fn test_zero_weeks_rejected() {
        let policy = LendingPolicy {
            weeks_per_month: 0,
            ..LendingPolicy::default()
        };
        assert!(policy.validate().is_err());
    }
}
