use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LoanServicingError;
use crate::schedule::InterestMethod;
use crate::types::{Money, Percent, ProductId};
use crate::LoanServicingResult;

/// A lending product and the limits applications are checked against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanProduct {
    pub id: ProductId,
    pub name: String,
    pub min_amount: Money,
    pub max_amount: Money,
    pub min_tenor_months: u32,
    pub max_tenor_months: u32,
    pub annual_interest_rate_percent: Percent,
    #[serde(default)]
    pub interest_method: InterestMethod,
}

impl LoanProduct {
    pub fn validate(&self) -> LoanServicingResult<()> {
        if self.min_amount < Decimal::ZERO || self.max_amount < self.min_amount {
            return Err(LoanServicingError::InvalidInput {
                field: "product.amount_range".into(),
                reason: format!(
                    "Product {} has an invalid amount range {} to {}",
                    self.id, self.min_amount, self.max_amount
                ),
            });
        }
        if self.max_tenor_months < self.min_tenor_months {
            return Err(LoanServicingError::InvalidInput {
                field: "product.tenor_range".into(),
                reason: format!(
                    "Product {} has an invalid tenor range {} to {} months",
                    self.id, self.min_tenor_months, self.max_tenor_months
                ),
            });
        }
        if self.annual_interest_rate_percent < Decimal::ZERO {
            return Err(LoanServicingError::InvalidInput {
                field: "product.annual_interest_rate_percent".into(),
                reason: "Interest rate cannot be negative".into(),
            });
        }
        Ok(())
    }

    pub fn amount_in_range(&self, amount: Money) -> bool {
        amount >= self.min_amount && amount <= self.max_amount
    }

    pub fn tenor_in_range(&self, tenor_months: u32) -> bool {
        tenor_months >= self.min_tenor_months && tenor_months <= self.max_tenor_months
    }
}
