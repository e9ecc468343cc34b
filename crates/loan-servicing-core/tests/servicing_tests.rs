use std::sync::Arc;
use std::thread;

use chrono::NaiveDate;
use loan_servicing_core::loan::{Customer, Loan, LoanStatus, TransactionKind};
use loan_servicing_core::origination::LoanProduct;
use loan_servicing_core::schedule::{
    Installment, InstallmentStatus, InterestMethod, LoanTerms, RepaymentFrequency,
};
use loan_servicing_core::servicing::{LoanServicer, RepaymentRequest};
use loan_servicing_core::store::{InMemoryLoanStore, LoanStore};
use loan_servicing_core::LoanServicingError;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Fixtures
// ===========================================================================

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn product() -> LoanProduct {
    LoanProduct {
        id: "SME-12".into(),
        name: "SME Working Capital".into(),
        min_amount: dec!(10000),
        max_amount: dec!(1000000),
        min_tenor_months: 3,
        max_tenor_months: 36,
        annual_interest_rate_percent: dec!(12),
        interest_method: InterestMethod::ReducingBalance,
    }
}

fn loan(id: &str, status: LoanStatus) -> Loan {
    Loan {
        id: id.into(),
        customer_id: "C-100".into(),
        product_id: "SME-12".into(),
        terms: LoanTerms {
            principal: dec!(2500),
            annual_interest_rate_percent: Decimal::ZERO,
            term_in_months: 2,
            interest_method: InterestMethod::Flat,
            repayment_frequency: RepaymentFrequency::Monthly,
        },
        status,
        disbursed_on: Some(date(2026, 1, 1)),
        outstanding_balance: dec!(2500),
        version: 0,
    }
}

/// Two unpaid installments of 1000 and 1500, due February then March.
fn two_installments() -> Vec<Installment> {
    vec![
        Installment::new(1, date(2026, 2, 1), dec!(1000), Decimal::ZERO),
        Installment::new(2, date(2026, 3, 1), dec!(1500), Decimal::ZERO),
    ]
}

fn setup(status: LoanStatus) -> (Arc<InMemoryLoanStore>, LoanServicer) {
    let store = Arc::new(InMemoryLoanStore::new());
    store.insert_product(product()).unwrap();
    store
        .insert_customer(Customer {
            id: "C-100".into(),
            name: "Ada Traders".into(),
            monthly_income: dec!(150000),
        })
        .unwrap();
    store.insert_loan(loan("L-1", status)).unwrap();
    store.seed_installments("L-1", two_installments()).unwrap();
    let servicer = LoanServicer::with_defaults(store.clone());
    (store, servicer)
}

fn repayment(amount: Decimal) -> RepaymentRequest {
    RepaymentRequest {
        loan_id: "L-1".into(),
        amount,
        paid_on: date(2026, 2, 3),
        external_reference: None,
        requested_by: None,
    }
}

// ===========================================================================
// Repayment allocation
// ===========================================================================

#[test]
fn test_payment_rolls_over_into_second_installment() {
    let (store, servicer) = setup(LoanStatus::Active);
    let outcome = servicer.process_repayment(&repayment(dec!(1200))).unwrap();

    assert!(outcome.success);
    assert!(outcome.transaction_ref.starts_with("RPY-"));

    let rows = store.installments("L-1").unwrap();
    assert_eq!(rows[0].amount_paid, dec!(1000));
    assert_eq!(rows[0].status, InstallmentStatus::Paid);
    assert_eq!(rows[1].amount_paid, dec!(200));
    assert_eq!(rows[1].status, InstallmentStatus::PartiallyPaid);

    let loan = store.loan("L-1").unwrap().unwrap();
    assert_eq!(loan.outstanding_balance, dec!(1300));
    assert_eq!(loan.version, 1);

    let txns = store.transactions("L-1").unwrap();
    assert_eq!(txns.len(), 1);
    assert_eq!(txns[0].kind, TransactionKind::Repayment);
    assert_eq!(txns[0].amount, dec!(1200));
    assert_eq!(txns[0].reference, outcome.transaction_ref);

    let journal = store.journal_outbox().unwrap();
    assert_eq!(journal.len(), 1);
    assert_eq!(journal[0].reference, outcome.transaction_ref);
    assert_eq!(journal[0].total_debits(), journal[0].total_credits());
}

#[test]
fn test_payment_covering_first_leaves_later_untouched() {
    let (store, servicer) = setup(LoanStatus::Active);
    store
        .seed_installments(
            "L-1",
            vec![
                Installment::new(1, date(2026, 2, 1), dec!(500), Decimal::ZERO),
                Installment::new(2, date(2026, 3, 1), dec!(500), Decimal::ZERO),
                Installment::new(3, date(2026, 4, 1), dec!(500), Decimal::ZERO),
            ],
        )
        .unwrap();

    servicer.process_repayment(&repayment(dec!(500))).unwrap();

    let rows = store.installments("L-1").unwrap();
    assert_eq!(rows[0].status, InstallmentStatus::Paid);
    assert_eq!(rows[1].status, InstallmentStatus::Pending);
    assert_eq!(rows[2].status, InstallmentStatus::Pending);
    assert_eq!(rows[1].amount_paid, Decimal::ZERO);
}

#[test]
fn test_final_payment_marks_loan_fully_paid() {
    let (store, servicer) = setup(LoanStatus::Active);
    let outcome = servicer.process_repayment(&repayment(dec!(2600))).unwrap();

    assert_eq!(outcome.loan_status, LoanStatus::FullyPaid);
    assert_eq!(outcome.outstanding_balance, Decimal::ZERO);
    assert_eq!(outcome.allocation.unallocated, dec!(100));
    assert!(store
        .installments("L-1")
        .unwrap()
        .iter()
        .all(|i| i.amount_paid <= i.total_due));
}

#[test]
fn test_closed_loan_rejected_without_mutation() {
    let (store, servicer) = setup(LoanStatus::Closed);
    let before = store.to_book().unwrap();

    let err = servicer.process_repayment(&repayment(dec!(1200))).unwrap_err();

    assert!(matches!(err, LoanServicingError::InvalidState(_)));
    assert_eq!(err.http_status(), 409);
    assert_eq!(store.to_book().unwrap(), before);
}

#[test]
fn test_unknown_loan_is_not_found() {
    let (_, servicer) = setup(LoanStatus::Active);
    let mut req = repayment(dec!(100));
    req.loan_id = "L-404".into();
    let err = servicer.process_repayment(&req).unwrap_err();
    assert!(matches!(err, LoanServicingError::NotFound { .. }));
}

#[test]
fn test_no_unpaid_installments_rejected_without_mutation() {
    let (store, servicer) = setup(LoanStatus::Active);
    store.seed_installments("L-1", Vec::new()).unwrap();
    let before = store.to_book().unwrap();

    let err = servicer.process_repayment(&repayment(dec!(100))).unwrap_err();

    assert!(matches!(err, LoanServicingError::InvalidState(_)));
    assert_eq!(store.to_book().unwrap(), before);
}

#[test]
fn test_non_owner_cannot_repay() {
    let (store, servicer) = setup(LoanStatus::Active);
    let mut req = repayment(dec!(100));
    req.requested_by = Some("C-999".into());
    let err = servicer.process_repayment(&req).unwrap_err();
    assert!(matches!(err, LoanServicingError::Unauthorized(_)));
    assert!(store.transactions("L-1").unwrap().is_empty());
}

#[test]
fn test_duplicate_reference_rejected() {
    let (store, servicer) = setup(LoanStatus::Active);
    let mut req = repayment(dec!(100));
    req.external_reference = Some("BANK-7781".into());

    servicer.process_repayment(&req).unwrap();
    let err = servicer.process_repayment(&req).unwrap_err();

    assert!(matches!(err, LoanServicingError::Conflict(_)));
    assert_eq!(store.transactions("L-1").unwrap().len(), 1);
    assert_eq!(store.installments("L-1").unwrap()[0].amount_paid, dec!(100));
}

#[test]
fn test_concurrent_repayments_never_overpay() {
    let (store, servicer) = setup(LoanStatus::Active);
    let servicer = Arc::new(servicer);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let servicer = Arc::clone(&servicer);
            thread::spawn(move || servicer.process_repayment(&repayment(dec!(400))))
        })
        .collect();

    let mut applied = Decimal::ZERO;
    for handle in handles {
        match handle.join().unwrap() {
            Ok(outcome) => applied += outcome.allocation.total_applied,
            Err(LoanServicingError::Conflict(_)) | Err(LoanServicingError::InvalidState(_)) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    let rows = store.installments("L-1").unwrap();
    let paid: Decimal = rows.iter().map(|i| i.amount_paid).sum();
    assert_eq!(paid, applied);
    assert!(rows.iter().all(|i| i.amount_paid <= i.total_due));

    let txn_total: Decimal = store
        .transactions("L-1")
        .unwrap()
        .iter()
        .map(|t| t.amount)
        .sum();
    assert_eq!(txn_total, applied);
}

// ===========================================================================
// Lifecycle
// ===========================================================================

#[test]
fn test_disbursement_builds_schedule_and_journal() {
    let (store, servicer) = setup(LoanStatus::Active);
    let mut approved = loan("L-2", LoanStatus::Approved);
    approved.terms = LoanTerms {
        principal: dec!(500000),
        annual_interest_rate_percent: dec!(12),
        term_in_months: 12,
        interest_method: InterestMethod::ReducingBalance,
        repayment_frequency: RepaymentFrequency::Monthly,
    };
    approved.outstanding_balance = Decimal::ZERO;
    approved.disbursed_on = None;
    store.insert_loan(approved).unwrap();

    let outcome = servicer.disburse_loan("L-2", date(2026, 1, 15)).unwrap();

    assert_eq!(outcome.installments.len(), 12);
    assert_eq!(outcome.installments[0].total_due, dec!(44424.39));
    assert_eq!(outcome.installments[0].due_date, date(2026, 2, 15));

    let stored = store.loan("L-2").unwrap().unwrap();
    assert_eq!(stored.status, LoanStatus::Active);
    assert_eq!(stored.outstanding_balance, dec!(500000));
    assert_eq!(store.installments("L-2").unwrap().len(), 12);

    let journal = store.journal_outbox().unwrap();
    assert_eq!(journal.last().unwrap().total_debits(), dec!(500000));
}

#[test]
fn test_disbursing_active_loan_fails() {
    let (_, servicer) = setup(LoanStatus::Active);
    let err = servicer.disburse_loan("L-1", date(2026, 1, 1)).unwrap_err();
    assert!(matches!(err, LoanServicingError::InvalidState(_)));
}

#[test]
fn test_regeneration_replaces_existing_schedule() {
    let (store, servicer) = setup(LoanStatus::Active);
    let rows = servicer.generate_schedule("L-1", date(2026, 5, 1)).unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].total_due, dec!(1250));
    let stored = store.installments("L-1").unwrap();
    assert_eq!(stored, rows);
    assert_eq!(stored[0].due_date, date(2026, 6, 1));
}

#[test]
fn test_regeneration_refused_after_payments() {
    let (_, servicer) = setup(LoanStatus::Active);
    servicer.process_repayment(&repayment(dec!(10))).unwrap();
    let err = servicer.generate_schedule("L-1", date(2026, 5, 1)).unwrap_err();
    assert!(matches!(err, LoanServicingError::InvalidState(_)));
}

#[test]
fn test_regeneration_unknown_loan() {
    let (_, servicer) = setup(LoanStatus::Active);
    let err = servicer.generate_schedule("L-404", date(2026, 5, 1)).unwrap_err();
    assert_eq!(err.http_status(), 404);
}

#[test]
fn test_write_off_then_repayment_rejected() {
    let (store, servicer) = setup(LoanStatus::Active);
    servicer.write_off_loan("L-1", date(2026, 6, 30)).unwrap();

    let loan = store.loan("L-1").unwrap().unwrap();
    assert_eq!(loan.status, LoanStatus::WrittenOff);
    assert_eq!(loan.outstanding_balance, Decimal::ZERO);

    let err = servicer.process_repayment(&repayment(dec!(50))).unwrap_err();
    assert!(matches!(err, LoanServicingError::InvalidState(_)));
}

// ===========================================================================
// Origination and portal reads
// ===========================================================================

#[test]
fn test_eligibility_counts_active_loans_only() {
    let (store, servicer) = setup(LoanStatus::Active);
    let mut closed = loan("L-3", LoanStatus::Closed);
    closed.outstanding_balance = dec!(900000);
    store.insert_loan(closed).unwrap();

    let result = servicer
        .check_eligibility("C-100", "SME-12", dec!(500000), 12)
        .unwrap();

    // existing = 2,500 * 10% = 250
    assert_eq!(result.existing_monthly_debt, dec!(250));
    assert!(result.is_eligible);

    let again = servicer
        .check_eligibility("C-100", "SME-12", dec!(500000), 12)
        .unwrap();
    assert_eq!(result, again);
}

#[test]
fn test_eligibility_unknown_product_and_customer() {
    let (_, servicer) = setup(LoanStatus::Active);
    assert!(matches!(
        servicer.check_eligibility("C-100", "NOPE", dec!(1000), 12),
        Err(LoanServicingError::NotFound { .. })
    ));
    assert!(matches!(
        servicer.check_eligibility("C-404", "SME-12", dec!(1000), 12),
        Err(LoanServicingError::NotFound { .. })
    ));
}

#[test]
fn test_simulation_warns_outside_product_limits() {
    let (store, servicer) = setup(LoanStatus::Active);
    let before = store.to_book().unwrap();

    let out = servicer
        .simulate_loan("SME-12", dec!(5000), 48, date(2026, 1, 1))
        .unwrap();

    assert_eq!(out.result.schedule.len(), 48);
    assert_eq!(out.warnings.len(), 2);
    assert_eq!(store.to_book().unwrap(), before);
}

#[test]
fn test_statement_for_owner() {
    let (_, servicer) = setup(LoanStatus::Active);
    servicer.process_repayment(&repayment(dec!(1200))).unwrap();

    let statement = servicer.loan_statement("L-1", Some("C-100")).unwrap();
    assert_eq!(statement.total_outstanding, dec!(1300));
    assert_eq!(statement.next_due.unwrap().installment_number, 2);
    assert_eq!(statement.transactions.len(), 1);

    let err = servicer.loan_schedule("L-1", Some("C-200")).unwrap_err();
    assert_eq!(err.http_status(), 401);
}
