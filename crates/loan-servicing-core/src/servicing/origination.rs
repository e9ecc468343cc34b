use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::LoanServicingError;
use crate::loan::LoanStatus;
use crate::origination::{
    check_eligibility, simulate_loan, ApplicantFinancials, EligibilityInput, EligibilityResult,
    LoanProduct, SimulationInput, SimulationOutput,
};
use crate::servicing::LoanServicer;
use crate::time_value::out_of_range;
use crate::types::{ComputationOutput, Money};
use crate::LoanServicingResult;

impl LoanServicer {
    /// Score a customer's application for `product_id`. Reads only.
    pub fn check_eligibility(
        &self,
        customer_id: &str,
        product_id: &str,
        requested_amount: Money,
        tenor_months: u32,
    ) -> LoanServicingResult<EligibilityResult> {
        let product = self.require_product(product_id)?;
        let customer = self
            .store
            .customer(customer_id)?
            .ok_or_else(|| LoanServicingError::not_found("Customer", customer_id))?;

        let total_outstanding_active_loans: Decimal = self
            .store
            .loans_for_customer(customer_id)?
            .iter()
            .filter(|l| l.status == LoanStatus::Active)
            .try_fold(Decimal::ZERO, |acc, l| acc.checked_add(l.outstanding_balance))
            .ok_or_else(|| out_of_range("total_outstanding_active_loans"))?;

        let result = check_eligibility(&EligibilityInput {
            requested_amount,
            tenor_months,
            product,
            applicant: ApplicantFinancials {
                monthly_income: customer.monthly_income,
                total_outstanding_active_loans,
            },
            policy: self.policy.clone(),
        })?;

        tracing::debug!(
            customer_id = %customer_id,
            product_id = %product_id,
            eligible = result.is_eligible,
            dsr = %result.debt_service_ratio,
            "Eligibility checked"
        );
        Ok(result)
    }

    /// What-if schedule at the product's rate; nothing is stored.
    pub fn simulate_loan(
        &self,
        product_id: &str,
        principal: Money,
        tenor_months: u32,
        start_date: NaiveDate,
    ) -> LoanServicingResult<ComputationOutput<SimulationOutput>> {
        let product = self.require_product(product_id)?;

        let mut output = simulate_loan(&SimulationInput {
            principal,
            annual_interest_rate_percent: product.annual_interest_rate_percent,
            tenor_months,
            start_date,
            policy: self.policy.clone(),
        })?;

        if !product.amount_in_range(principal) {
            output.warnings.push(format!(
                "Amount {principal} is outside the {} range {} to {}",
                product.name, product.min_amount, product.max_amount
            ));
        }
        if !product.tenor_in_range(tenor_months) {
            output.warnings.push(format!(
                "Tenor of {tenor_months} months is outside the {} range {} to {} months",
                product.name, product.min_tenor_months, product.max_tenor_months
            ));
        }
        Ok(output)
    }

    fn require_product(&self, product_id: &str) -> LoanServicingResult<LoanProduct> {
        self.store
            .product(product_id)?
            .ok_or_else(|| LoanServicingError::not_found("Product", product_id))
    }
}
