use chrono::{Local, NaiveDate};
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use loan_servicing_core::config::LendingPolicy;
use loan_servicing_core::origination::{
    self, ApplicantFinancials, EligibilityInput, LoanProduct, SimulationInput,
};
use loan_servicing_core::schedule::InterestMethod;

use crate::input;

/// Arguments for an eligibility check
#[derive(Args)]
pub struct EligibilityArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Requested amount
    #[arg(long)]
    pub amount: Option<Decimal>,

    /// Requested tenor in months
    #[arg(long)]
    pub tenor: Option<u32>,

    /// Product minimum amount
    #[arg(long)]
    pub min_amount: Option<Decimal>,

    /// Product maximum amount
    #[arg(long)]
    pub max_amount: Option<Decimal>,

    /// Product minimum tenor in months
    #[arg(long)]
    pub min_tenor: Option<u32>,

    /// Product maximum tenor in months
    #[arg(long)]
    pub max_tenor: Option<u32>,

    /// Product annual interest rate in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Applicant monthly income
    #[arg(long)]
    pub income: Option<Decimal>,

    /// Outstanding balance across the applicant's active loans
    #[arg(long, default_value = "0")]
    pub outstanding: Decimal,
}

/// Arguments for a loan simulation
#[derive(Args)]
pub struct SimulateArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan principal
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Tenor in months
    #[arg(long)]
    pub tenor: Option<u32>,

    /// First installment falls one month after this date; defaults to today
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
}

pub fn run_eligibility(
    args: EligibilityArgs,
    policy: Option<LendingPolicy>,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mut eligibility_input: EligibilityInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        EligibilityInput {
            requested_amount: args
                .amount
                .ok_or("--amount is required (or provide --input)")?,
            tenor_months: args.tenor.ok_or("--tenor is required (or provide --input)")?,
            product: LoanProduct {
                id: "cli".into(),
                name: "Command-line product".into(),
                min_amount: args
                    .min_amount
                    .ok_or("--min-amount is required (or provide --input)")?,
                max_amount: args
                    .max_amount
                    .ok_or("--max-amount is required (or provide --input)")?,
                min_tenor_months: args
                    .min_tenor
                    .ok_or("--min-tenor is required (or provide --input)")?,
                max_tenor_months: args
                    .max_tenor
                    .ok_or("--max-tenor is required (or provide --input)")?,
                annual_interest_rate_percent: args
                    .rate
                    .ok_or("--rate is required (or provide --input)")?,
                interest_method: InterestMethod::ReducingBalance,
            },
            applicant: ApplicantFinancials {
                monthly_income: args
                    .income
                    .ok_or("--income is required (or provide --input)")?,
                total_outstanding_active_loans: args.outstanding,
            },
            policy: LendingPolicy::default(),
        }
    };
    if let Some(policy) = policy {
        eligibility_input.policy = policy;
    }

    let result = origination::check_eligibility(&eligibility_input)?;
    Ok(serde_json::json!({ "result": result }))
}

pub fn run_simulate(
    args: SimulateArgs,
    policy: Option<LendingPolicy>,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mut simulation_input: SimulationInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        SimulationInput {
            principal: args
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            annual_interest_rate_percent: args
                .rate
                .ok_or("--rate is required (or provide --input)")?,
            tenor_months: args.tenor.ok_or("--tenor is required (or provide --input)")?,
            start_date: args
                .start_date
                .unwrap_or_else(|| Local::now().date_naive()),
            policy: LendingPolicy::default(),
        }
    };
    if let Some(policy) = policy {
        simulation_input.policy = policy;
    }

    let result = origination::simulate_loan(&simulation_input)?;
    Ok(serde_json::to_value(result)?)
}
