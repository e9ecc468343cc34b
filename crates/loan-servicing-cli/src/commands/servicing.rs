use chrono::{Local, NaiveDate};
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;
use std::sync::Arc;

use loan_servicing_core::config::{AccountingConfig, LendingPolicy};
use loan_servicing_core::servicing::{LoanServicer, RepaymentRequest};
use loan_servicing_core::store::{InMemoryLoanStore, LoanBook};

use crate::input;

/// Arguments shared by commands that operate on a loan book file
#[derive(Args)]
pub struct BookArgs {
    /// Path to the JSON loan book
    #[arg(long)]
    pub book: String,

    /// Loan identifier
    #[arg(long)]
    pub loan: String,
}

/// Arguments for applying a repayment
#[derive(Args)]
pub struct RepayArgs {
    #[command(flatten)]
    pub target: BookArgs,

    /// Amount received
    #[arg(long)]
    pub amount: Decimal,

    /// Payment date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Payer's reference, rejected if already applied
    #[arg(long)]
    pub reference: Option<String>,

    /// Customer making the payment (ownership is checked)
    #[arg(long)]
    pub customer: Option<String>,

    /// Save the updated loan book back to --book
    #[arg(long)]
    pub write: bool,
}

/// Arguments for disbursing an approved loan
#[derive(Args)]
pub struct DisburseArgs {
    #[command(flatten)]
    pub target: BookArgs,

    /// Disbursement date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Save the updated loan book back to --book
    #[arg(long)]
    pub write: bool,
}

/// Arguments for a loan statement
#[derive(Args)]
pub struct StatementArgs {
    #[command(flatten)]
    pub target: BookArgs,

    /// Customer requesting the statement (ownership is checked)
    #[arg(long)]
    pub customer: Option<String>,
}

fn open_book(
    path: &str,
    policy: Option<LendingPolicy>,
) -> Result<(Arc<InMemoryLoanStore>, LoanServicer), Box<dyn std::error::Error>> {
    let book: LoanBook = input::file::read_json(path)?;
    let store = Arc::new(InMemoryLoanStore::from_book(book));
    let servicer = LoanServicer::new(
        store.clone(),
        policy.unwrap_or_default(),
        AccountingConfig::default(),
    )?;
    Ok((store, servicer))
}

fn save_book(path: &str, store: &InMemoryLoanStore) -> Result<(), Box<dyn std::error::Error>> {
    input::file::write_json(path, &store.to_book()?)?;
    tracing::info!(book = %path, "Loan book saved");
    Ok(())
}

pub fn run_repay(
    args: RepayArgs,
    policy: Option<LendingPolicy>,
) -> Result<Value, Box<dyn std::error::Error>> {
    let (store, servicer) = open_book(&args.target.book, policy)?;

    let outcome = servicer.process_repayment(&RepaymentRequest {
        loan_id: args.target.loan,
        amount: args.amount,
        paid_on: args.date.unwrap_or_else(|| Local::now().date_naive()),
        external_reference: args.reference,
        requested_by: args.customer,
    })?;

    if args.write {
        save_book(&args.target.book, &store)?;
    }
    Ok(serde_json::json!({ "result": outcome }))
}

pub fn run_disburse(
    args: DisburseArgs,
    policy: Option<LendingPolicy>,
) -> Result<Value, Box<dyn std::error::Error>> {
    let (store, servicer) = open_book(&args.target.book, policy)?;

    let outcome = servicer.disburse_loan(
        &args.target.loan,
        args.date.unwrap_or_else(|| Local::now().date_naive()),
    )?;

    if args.write {
        save_book(&args.target.book, &store)?;
    }
    Ok(serde_json::json!({ "result": outcome }))
}

pub fn run_statement(
    args: StatementArgs,
    policy: Option<LendingPolicy>,
) -> Result<Value, Box<dyn std::error::Error>> {
    let (_, servicer) = open_book(&args.target.book, policy)?;
    let statement = servicer.loan_statement(&args.target.loan, args.customer.as_deref())?;
    Ok(serde_json::json!({ "result": statement }))
}
