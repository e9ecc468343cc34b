//! Eligibility scoring for a loan application.
//!
//! Three checks run in a fixed order and each failure contributes one reason:
//! 1. **Amount** -- requested amount inside the product's range.
//! 2. **Tenor** -- requested tenor inside the product's range.
//! 3. **Debt service** -- (existing monthly debt + new level payment) / monthly
//!    income at or below the policy ceiling.
//!
//! Existing monthly debt is approximated as a fixed share of the applicant's
//! outstanding active-loan balances rather than looked up per loan.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::LendingPolicy;
use crate::error::LoanServicingError;
use crate::origination::product::LoanProduct;
use crate::time_value::{level_payment, out_of_range, periodic_rate, round_money};
use crate::types::{Money, Rate};
use crate::LoanServicingResult;

const RATIO_DP: u32 = 4;

// ---------------------------------------------------------------------------
// Input / Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicantFinancials {
    pub monthly_income: Money,
    /// Sum of outstanding balances on the applicant's active loans.
    #[serde(default)]
    pub total_outstanding_active_loans: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibilityInput {
    pub requested_amount: Money,
    pub tenor_months: u32,
    pub product: LoanProduct,
    pub applicant: ApplicantFinancials,
    #[serde(default)]
    pub policy: LendingPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityResult {
    pub is_eligible: bool,
    pub maximum_eligible_amount: Money,
    /// Zero when the new payment could not be computed.
    pub debt_service_ratio: Rate,
    pub existing_monthly_debt: Money,
    /// Zero when the tenor or amount puts the payment out of range.
    pub new_monthly_payment: Money,
    pub reasons: Vec<String>,
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Score an application against product limits and the applicant's finances.
pub fn check_eligibility(input: &EligibilityInput) -> LoanServicingResult<EligibilityResult> {
    validate_input(input)?;

    let policy = &input.policy;
    let product = &input.product;
    let applicant = &input.applicant;
    let dp = policy.rounding_dp;
    let mut reasons = Vec::new();

    let amount_ok = product.amount_in_range(input.requested_amount);
    if !amount_ok {
        reasons.push(format!(
            "Requested amount {} is outside the product range {} to {}",
            input.requested_amount, product.min_amount, product.max_amount
        ));
    }

    let tenor_ok = product.tenor_in_range(input.tenor_months);
    if !tenor_ok {
        reasons.push(format!(
            "Requested tenor of {} months is outside the product range {} to {} months",
            input.tenor_months, product.min_tenor_months, product.max_tenor_months
        ));
    }

    let existing_monthly_debt = applicant
        .total_outstanding_active_loans
        .checked_mul(policy.existing_debt_payment_factor)
        .ok_or_else(|| out_of_range("applicant.total_outstanding_active_loans"))?;
    let monthly_rate = periodic_rate(product.annual_interest_rate_percent, 12)?;

    // A payment that cannot be computed (e.g. a tenor far outside the product
    // range) fails the debt-service check instead of the whole assessment.
    let new_monthly_payment =
        match level_payment(input.requested_amount, monthly_rate, input.tenor_months) {
            Ok(payment) => Some(payment),
            Err(e) => {
                tracing::debug!(
                    tenor_months = input.tenor_months,
                    error = %e,
                    "New payment not computable"
                );
                None
            }
        };
    let debt_service_ratio = new_monthly_payment
        .and_then(|payment| existing_monthly_debt.checked_add(payment))
        .and_then(|debt| debt.checked_div(applicant.monthly_income));

    let ratio_ok = match debt_service_ratio {
        Some(ratio) if ratio <= policy.max_debt_service_ratio => true,
        Some(ratio) => {
            reasons.push(format!(
                "Debt service ratio {} exceeds the maximum of {}",
                round_money(ratio, RATIO_DP),
                policy.max_debt_service_ratio
            ));
            false
        }
        None => {
            reasons.push(format!(
                "Debt service ratio could not be computed for {} over {} months",
                input.requested_amount, input.tenor_months
            ));
            false
        }
    };

    let maximum_eligible_amount = if ratio_ok {
        let affordable = applicant
            .monthly_income
            .checked_mul(policy.income_commitment_ratio)
            .and_then(|v| v.checked_mul(Decimal::from(input.tenor_months)));
        // Past the representable range the product cap is the only limit.
        let capped = affordable.map_or(product.max_amount, |a| product.max_amount.min(a));
        round_money(capped, dp)
    } else {
        Decimal::ZERO
    };

    Ok(EligibilityResult {
        is_eligible: amount_ok && tenor_ok && ratio_ok,
        maximum_eligible_amount,
        debt_service_ratio: round_money(debt_service_ratio.unwrap_or_default(), RATIO_DP),
        existing_monthly_debt: round_money(existing_monthly_debt, dp),
        new_monthly_payment: round_money(new_monthly_payment.unwrap_or_default(), dp),
        reasons,
    })
}

fn validate_input(input: &EligibilityInput) -> LoanServicingResult<()> {
    input.policy.validate()?;
    input.product.validate()?;

    if input.requested_amount <= Decimal::ZERO {
        return Err(LoanServicingError::InvalidInput {
            field: "requested_amount".into(),
            reason: "Requested amount must be positive".into(),
        });
    }
    if input.tenor_months == 0 {
        return Err(LoanServicingError::InvalidInput {
            field: "tenor_months".into(),
            reason: "Tenor must be at least 1 month".into(),
        });
    }
    if input.applicant.monthly_income <= Decimal::ZERO {
        return Err(LoanServicingError::InvalidInput {
            field: "applicant.monthly_income".into(),
            reason: "Monthly income must be positive to compute a debt service ratio".into(),
        });
    }
    if input.applicant.total_outstanding_active_loans < Decimal::ZERO {
        return Err(LoanServicingError::InvalidInput {
            field: "applicant.total_outstanding_active_loans".into(),
            reason: "Outstanding balances cannot be negative".into(),
        });
    }
    Ok(())
}
