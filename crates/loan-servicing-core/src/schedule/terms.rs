use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LoanServicingError;
use crate::time_value::periodic_rate;
use crate::types::{Money, Percent, Rate};
use crate::LoanServicingResult;

/// How interest accrues over the life of the loan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InterestMethod {
    /// Interest on the original principal every period.
    Flat,
    /// Interest on the remaining balance each period.
    #[default]
    ReducingBalance,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RepaymentFrequency {
    #[default]
    Monthly,
    Weekly,
}

/// Commercial terms a schedule is generated from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: Money,
    /// Nominal annual rate as a percentage (12 = 12% p.a.).
    pub annual_interest_rate_percent: Percent,
    pub term_in_months: u32,
    #[serde(default)]
    pub interest_method: InterestMethod,
    #[serde(default)]
    pub repayment_frequency: RepaymentFrequency,
}

impl LoanTerms {
    pub fn validate(&self) -> LoanServicingResult<()> {
        if self.principal <= Decimal::ZERO {
            return Err(LoanServicingError::InvalidInput {
                field: "principal".into(),
                reason: "Principal must be positive".into(),
            });
        }
        if self.annual_interest_rate_percent < Decimal::ZERO {
            return Err(LoanServicingError::InvalidInput {
                field: "annual_interest_rate_percent".into(),
                reason: "Interest rate cannot be negative".into(),
            });
        }
        if self.term_in_months == 0 {
            return Err(LoanServicingError::InvalidInput {
                field: "term_in_months".into(),
                reason: "Term must be at least 1 month".into(),
            });
        }
        Ok(())
    }

    /// Rate charged per calendar month.
    pub fn monthly_rate(&self) -> LoanServicingResult<Rate> {
        periodic_rate(self.annual_interest_rate_percent, 12)
    }
}
