use std::sync::Arc;

use chrono::NaiveDate;
use napi::Result as NapiResult;
use napi_derive::napi;
use serde::{Deserialize, Serialize};

use loan_servicing_core::config::{AccountingConfig, LendingPolicy};
use loan_servicing_core::servicing::{LoanServicer, RepaymentOutcome, RepaymentRequest};
use loan_servicing_core::store::{InMemoryLoanStore, LoanBook};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Schedules
// ---------------------------------------------------------------------------

#[napi]
pub fn generate_schedule(input_json: String) -> NapiResult<String> {
    let input: loan_servicing_core::schedule::ScheduleInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        loan_servicing_core::schedule::generate_schedule(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn preview_allocation(input_json: String) -> NapiResult<String> {
    let input: loan_servicing_core::repayment::AllocationInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        loan_servicing_core::repayment::preview_allocation(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Origination
// ---------------------------------------------------------------------------

#[napi]
pub fn simulate_loan(input_json: String) -> NapiResult<String> {
    let input: loan_servicing_core::origination::SimulationInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        loan_servicing_core::origination::simulate_loan(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn check_eligibility(input_json: String) -> NapiResult<String> {
    let input: loan_servicing_core::origination::EligibilityInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        loan_servicing_core::origination::check_eligibility(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Servicing
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct BookRepaymentInput {
    book: LoanBook,
    request: RepaymentRequest,
    #[serde(default)]
    policy: LendingPolicy,
    #[serde(default)]
    accounts: AccountingConfig,
}

#[derive(Serialize)]
struct BookRepaymentOutput {
    outcome: RepaymentOutcome,
    book: LoanBook,
}

/// Apply a repayment to a loan book and return the outcome with the updated book.
#[napi]
pub fn process_repayment(input_json: String) -> NapiResult<String> {
    let input: BookRepaymentInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let store = Arc::new(InMemoryLoanStore::from_book(input.book));
    let servicer =
        LoanServicer::new(store.clone(), input.policy, input.accounts).map_err(to_napi_error)?;

    let outcome = servicer
        .process_repayment(&input.request)
        .map_err(to_napi_error)?;
    let book = store.to_book().map_err(to_napi_error)?;
    serde_json::to_string(&BookRepaymentOutput { outcome, book }).map_err(to_napi_error)
}

#[derive(Deserialize)]
struct BookStatementInput {
    book: LoanBook,
    loan_id: String,
    #[serde(default)]
    caller: Option<String>,
}

#[napi]
pub fn loan_statement(input_json: String) -> NapiResult<String> {
    let input: BookStatementInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let servicer = LoanServicer::with_defaults(Arc::new(InMemoryLoanStore::from_book(input.book)));
    let statement = servicer
        .loan_statement(&input.loan_id, input.caller.as_deref())
        .map_err(to_napi_error)?;
    serde_json::to_string(&statement).map_err(to_napi_error)
}

#[derive(Deserialize)]
struct BookDisbursementInput {
    book: LoanBook,
    loan_id: String,
    on: NaiveDate,
    #[serde(default)]
    policy: LendingPolicy,
}

#[napi]
pub fn disburse_loan(input_json: String) -> NapiResult<String> {
    let input: BookDisbursementInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let store = Arc::new(InMemoryLoanStore::from_book(input.book));
    let servicer = LoanServicer::new(store.clone(), input.policy, AccountingConfig::default())
        .map_err(to_napi_error)?;

    let outcome = servicer
        .disburse_loan(&input.loan_id, input.on)
        .map_err(to_napi_error)?;
    let book = store.to_book().map_err(to_napi_error)?;
    serde_json::to_string(&serde_json::json!({ "outcome": outcome, "book": book }))
        .map_err(to_napi_error)
}
