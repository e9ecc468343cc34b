use chrono::{Local, NaiveDate};
use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;

use loan_servicing_core::config::LendingPolicy;
use loan_servicing_core::repayment::{self, AllocationInput};
use loan_servicing_core::schedule::{
    self, InterestMethod, LoanTerms, RepaymentFrequency, ScheduleInput,
};

use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum MethodArg {
    Flat,
    ReducingBalance,
}

impl From<MethodArg> for InterestMethod {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::Flat => InterestMethod::Flat,
            MethodArg::ReducingBalance => InterestMethod::ReducingBalance,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FrequencyArg {
    Monthly,
    Weekly,
}

impl From<FrequencyArg> for RepaymentFrequency {
    fn from(arg: FrequencyArg) -> Self {
        match arg {
            FrequencyArg::Monthly => RepaymentFrequency::Monthly,
            FrequencyArg::Weekly => RepaymentFrequency::Weekly,
        }
    }
}

/// Arguments for amortization schedule generation
#[derive(Args)]
pub struct ScheduleArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan principal
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent (12 = 12%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Term in months
    #[arg(long)]
    pub term: Option<u32>,

    /// Interest method
    #[arg(long, value_enum, default_value = "reducing-balance")]
    pub method: MethodArg,

    /// Repayment frequency
    #[arg(long, value_enum, default_value = "monthly")]
    pub frequency: FrequencyArg,

    /// Schedule start date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
}

/// Arguments for an allocation preview
#[derive(Args)]
pub struct AllocateArgs {
    /// Path to JSON input file with `installments` and `amount`
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_schedule(
    args: ScheduleArgs,
    policy: Option<LendingPolicy>,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mut schedule_input: ScheduleInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        ScheduleInput {
            terms: LoanTerms {
                principal: args
                    .principal
                    .ok_or("--principal is required (or provide --input)")?,
                annual_interest_rate_percent: args
                    .rate
                    .ok_or("--rate is required (or provide --input)")?,
                term_in_months: args.term.ok_or("--term is required (or provide --input)")?,
                interest_method: args.method.into(),
                repayment_frequency: args.frequency.into(),
            },
            start_date: args
                .start_date
                .unwrap_or_else(|| Local::now().date_naive()),
            policy: LendingPolicy::default(),
        }
    };
    if let Some(policy) = policy {
        schedule_input.policy = policy;
    }

    let result = schedule::generate_schedule(&schedule_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_allocate(
    args: AllocateArgs,
    policy: Option<LendingPolicy>,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mut allocation_input: AllocationInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        return Err("--input file (or piped JSON) is required for an allocation preview".into());
    };
    if let Some(policy) = policy {
        allocation_input.policy = policy;
    }

    let result = repayment::preview_allocation(&allocation_input)?;
    Ok(serde_json::to_value(result)?)
}
