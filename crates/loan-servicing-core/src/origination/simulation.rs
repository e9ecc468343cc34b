use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::config::LendingPolicy;
use crate::schedule::{amortize, Installment, InterestMethod, LoanTerms, RepaymentFrequency};
use crate::types::*;
use crate::LoanServicingResult;

/// A what-if request: nothing is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationInput {
    pub principal: Money,
    pub annual_interest_rate_percent: Percent,
    pub tenor_months: u32,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub policy: LendingPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationOutput {
    pub monthly_payment: Money,
    pub total_interest: Money,
    pub total_payment: Money,
    pub schedule: Vec<Installment>,
}

/// Simulate a reducing-balance loan and return its schedule with totals.
pub fn simulate_loan(
    input: &SimulationInput,
) -> LoanServicingResult<ComputationOutput<SimulationOutput>> {
    let start = Instant::now();

    let terms = LoanTerms {
        principal: input.principal,
        annual_interest_rate_percent: input.annual_interest_rate_percent,
        term_in_months: input.tenor_months,
        interest_method: InterestMethod::ReducingBalance,
        repayment_frequency: RepaymentFrequency::Monthly,
    };
    let schedule = amortize(&terms, input.start_date, &input.policy)?;

    let output = SimulationOutput {
        monthly_payment: schedule.first().map(|i| i.total_due).unwrap_or_default(),
        total_interest: schedule.iter().map(|i| i.interest_portion).sum(),
        total_payment: schedule.iter().map(|i| i.total_due).sum(),
        schedule,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Loan Simulation (Reducing Balance)",
        &serde_json::json!({
            "principal": input.principal.to_string(),
            "annual_rate_percent": input.annual_interest_rate_percent.to_string(),
            "tenor_months": input.tenor_months,
        }),
        Vec::new(),
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn input() -> SimulationInput {
        SimulationInput {
            principal: dec!(500000),
            annual_interest_rate_percent: dec!(12),
            tenor_months: 12,
            start_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            policy: LendingPolicy::default(),
        }
    }

    #[test]
    fn test_simulation_totals() {
        let out = simulate_loan(&input()).unwrap().result;
        assert_eq!(out.monthly_payment, dec!(44424.39));
        assert_eq!(out.total_interest, dec!(33092.75));
        assert_eq!(out.total_payment, dec!(533092.75));
        assert_eq!(out.schedule.len(), 12);
    }

    #[test]
    fn test_simulation_rejects_zero_principal() {
        let mut inp = input();
        inp.principal = Decimal::ZERO;
        assert!(simulate_loan(&inp).is_err());
    }
}
