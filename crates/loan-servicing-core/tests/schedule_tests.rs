use chrono::NaiveDate;
use loan_servicing_core::config::LendingPolicy;
use loan_servicing_core::schedule::{
    amortize, generate_schedule, InstallmentStatus, InterestMethod, LoanTerms,
    RepaymentFrequency, ScheduleInput,
};
use loan_servicing_core::LoanServicingError;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 10).unwrap()
}

fn terms(principal: Decimal, rate: Decimal, months: u32, method: InterestMethod) -> LoanTerms {
    LoanTerms {
        principal,
        annual_interest_rate_percent: rate,
        term_in_months: months,
        interest_method: method,
        repayment_frequency: RepaymentFrequency::Monthly,
    }
}

// ===========================================================================
// Known answers
// ===========================================================================

#[test]
fn test_reducing_balance_500k_at_12pct_over_12_months() {
    let input = ScheduleInput {
        terms: terms(dec!(500000), dec!(12), 12, InterestMethod::ReducingBalance),
        start_date: start(),
        policy: LendingPolicy::default(),
    };
    let out = generate_schedule(&input).unwrap();
    let s = &out.result;

    assert_eq!(s.periodic_payment, dec!(44424.39));
    assert_eq!(s.total_interest, dec!(33092.75));
    assert_eq!(s.total_principal, dec!(500000));
    assert_eq!(out.methodology, "Reducing Balance Amortization (Level Payment)");
}

#[test]
fn test_schedule_numbering_and_initial_state() {
    let rows = amortize(
        &terms(dec!(24000), dec!(9), 24, InterestMethod::ReducingBalance),
        start(),
        &LendingPolicy::default(),
    )
    .unwrap();

    for (idx, row) in rows.iter().enumerate() {
        assert_eq!(row.installment_number, idx as u32 + 1);
        assert_eq!(row.amount_paid, Decimal::ZERO);
        assert_eq!(row.status, InstallmentStatus::Pending);
        assert_eq!(row.total_due, row.principal_portion + row.interest_portion);
    }
    assert!(rows.windows(2).all(|w| w[0].due_date < w[1].due_date));
}

#[test]
fn test_flat_interest_uses_original_principal() {
    let rows = amortize(
        &terms(dec!(12000), dec!(24), 6, InterestMethod::Flat),
        start(),
        &LendingPolicy::default(),
    )
    .unwrap();
    // 12,000 * 24% / 12 = 240 every month, 2,000 principal every month
    for row in &rows {
        assert_eq!(row.interest_portion, dec!(240));
        assert_eq!(row.principal_portion, dec!(2000));
    }
}

#[test]
fn test_custom_rounding_precision() {
    let policy = LendingPolicy {
        rounding_dp: 0,
        ..LendingPolicy::default()
    };
    let rows = amortize(
        &terms(dec!(1000), dec!(12), 3, InterestMethod::Flat),
        start(),
        &policy,
    )
    .unwrap();
    assert_eq!(rows[0].principal_portion, dec!(333));
    assert_eq!(rows[2].principal_portion, dec!(334));
}

#[test]
fn test_weekly_uses_policy_weeks_per_month() {
    let policy = LendingPolicy {
        weeks_per_month: 5,
        ..LendingPolicy::default()
    };
    let mut t = terms(dec!(1000), dec!(10), 2, InterestMethod::Flat);
    t.repayment_frequency = RepaymentFrequency::Weekly;
    let rows = amortize(&t, start(), &policy).unwrap();
    assert_eq!(rows.len(), 10);
}

#[test]
fn test_invalid_terms_fail_fast() {
    let bad = [
        terms(Decimal::ZERO, dec!(12), 12, InterestMethod::Flat),
        terms(dec!(1000), dec!(-1), 12, InterestMethod::Flat),
        terms(dec!(1000), dec!(12), 0, InterestMethod::ReducingBalance),
    ];
    for t in &bad {
        let err = amortize(t, start(), &LendingPolicy::default()).unwrap_err();
        assert!(matches!(err, LoanServicingError::InvalidInput { .. }), "{err}");
    }
}

// ===========================================================================
// Invariants
// ===========================================================================

proptest! {
    #[test]
    fn prop_reducing_balance_principal_sums_to_loan(
        principal_cents in 100_000i64..1_000_000_000i64,
        rate_bps in 0i64..3_600i64,
        months in 1u32..=120u32,
    ) {
        let principal = Decimal::new(principal_cents, 2);
        let rate = Decimal::new(rate_bps, 2);
        let rows = amortize(
            &terms(principal, rate, months, InterestMethod::ReducingBalance),
            start(),
            &LendingPolicy::default(),
        ).unwrap();

        let total: Decimal = rows.iter().map(|r| r.principal_portion).sum();
        prop_assert!((total - principal).abs() <= dec!(0.01));
        prop_assert_eq!(rows.len() as u32, months);
        prop_assert!(rows.iter().all(|r| r.principal_portion >= Decimal::ZERO));
    }

    #[test]
    fn prop_flat_principal_is_level_except_last(
        principal_cents in 100_000i64..100_000_000i64,
        months in 2u32..=60u32,
    ) {
        let principal = Decimal::new(principal_cents, 2);
        let rows = amortize(
            &terms(principal, dec!(15), months, InterestMethod::Flat),
            start(),
            &LendingPolicy::default(),
        ).unwrap();

        let first = rows[0].principal_portion;
        let body = &rows[..rows.len() - 1];
        prop_assert!(body.iter().all(|r| r.principal_portion == first));
        let total: Decimal = rows.iter().map(|r| r.principal_portion).sum();
        prop_assert_eq!(total, principal);
    }
}
