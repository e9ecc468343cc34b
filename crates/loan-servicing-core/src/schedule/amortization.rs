use chrono::{Days, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::config::LendingPolicy;
use crate::error::LoanServicingError;
use crate::schedule::installment::Installment;
use crate::schedule::terms::{InterestMethod, LoanTerms, RepaymentFrequency};
use crate::time_value::{level_payment, out_of_range, periodic_rate, round_money};
use crate::types::*;
use crate::LoanServicingResult;

const WEEKS_PER_YEAR: u32 = 52;

/// Input for a standalone schedule computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleInput {
    pub terms: LoanTerms,
    /// Installment `i` falls `i` periods after this date.
    pub start_date: NaiveDate,
    #[serde(default)]
    pub policy: LendingPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleOutput {
    pub installments: Vec<Installment>,
    pub number_of_installments: u32,
    /// Amount due on the first installment.
    pub periodic_payment: Money,
    pub total_principal: Money,
    pub total_interest: Money,
    pub total_payment: Money,
}

impl ScheduleOutput {
    pub fn from_installments(installments: Vec<Installment>) -> Self {
        let total_principal = installments.iter().map(|i| i.principal_portion).sum();
        let total_interest = installments.iter().map(|i| i.interest_portion).sum();
        let total_payment = installments.iter().map(|i| i.total_due).sum();
        let periodic_payment = installments
            .first()
            .map(|i| i.total_due)
            .unwrap_or(Decimal::ZERO);
        Self {
            number_of_installments: installments.len() as u32,
            installments,
            periodic_payment,
            total_principal,
            total_interest,
            total_payment,
        }
    }
}

/// Build the installments for `terms`, first due one period after `start_date`.
pub fn amortize(
    terms: &LoanTerms,
    start_date: NaiveDate,
    policy: &LendingPolicy,
) -> LoanServicingResult<Vec<Installment>> {
    terms.validate()?;
    policy.validate()?;

    let rows = match (terms.repayment_frequency, terms.interest_method) {
        (RepaymentFrequency::Monthly, InterestMethod::Flat) => flat_monthly(terms, start_date, policy),
        (RepaymentFrequency::Monthly, InterestMethod::ReducingBalance) => {
            reducing_balance_monthly(terms, start_date, policy)
        }
        (RepaymentFrequency::Weekly, InterestMethod::Flat) => flat_weekly(terms, start_date, policy),
        (RepaymentFrequency::Weekly, InterestMethod::ReducingBalance) => {
            Err(LoanServicingError::InvalidInput {
                field: "repayment_frequency".into(),
                reason: "Weekly schedules are only available with flat interest".into(),
            })
        }
    }?;

    // Schedule totals are summed later; they must stay representable.
    rows.iter()
        .try_fold(Decimal::ZERO, |acc, row| acc.checked_add(row.total_due))
        .ok_or_else(|| out_of_range("principal"))?;
    Ok(rows)
}

/// Generate a schedule and wrap it with totals and metadata.
pub fn generate_schedule(
    input: &ScheduleInput,
) -> LoanServicingResult<ComputationOutput<ScheduleOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let installments = amortize(&input.terms, input.start_date, &input.policy)?;

    if input.terms.interest_method == InterestMethod::Flat {
        warnings.push(
            "Flat interest is charged on the original principal; the effective rate exceeds the nominal rate"
                .into(),
        );
    }
    if input.terms.repayment_frequency == RepaymentFrequency::Weekly {
        warnings.push(format!(
            "Weekly term approximated as {} weeks ({} per month)",
            installments.len(),
            input.policy.weeks_per_month
        ));
    }

    let output = ScheduleOutput::from_installments(installments);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        methodology(&input.terms),
        &serde_json::json!({
            "principal": input.terms.principal.to_string(),
            "annual_rate_percent": input.terms.annual_interest_rate_percent.to_string(),
            "term_in_months": input.terms.term_in_months,
            "start_date": input.start_date.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

fn methodology(terms: &LoanTerms) -> &'static str {
    match (terms.interest_method, terms.repayment_frequency) {
        (InterestMethod::Flat, RepaymentFrequency::Monthly) => "Flat Interest Amortization (Monthly)",
        (InterestMethod::Flat, RepaymentFrequency::Weekly) => "Flat Interest Amortization (Weekly)",
        (InterestMethod::ReducingBalance, _) => "Reducing Balance Amortization (Level Payment)",
    }
}

// ---------------------------------------------------------------------------
// Methods
// ---------------------------------------------------------------------------

fn flat_monthly(
    terms: &LoanTerms,
    start_date: NaiveDate,
    policy: &LendingPolicy,
) -> LoanServicingResult<Vec<Installment>> {
    let dp = policy.rounding_dp;
    let n = terms.term_in_months;
    let principal_portion = round_money(terms.principal / Decimal::from(n), dp);
    let interest_portion = interest_on(terms.principal, terms.monthly_rate()?, dp)?;

    level_principal_rows(terms.principal, n, principal_portion, interest_portion, |i| {
        monthly_due_date(start_date, i)
    })
}

fn flat_weekly(
    terms: &LoanTerms,
    start_date: NaiveDate,
    policy: &LendingPolicy,
) -> LoanServicingResult<Vec<Installment>> {
    let dp = policy.rounding_dp;
    let weeks = terms
        .term_in_months
        .checked_mul(policy.weeks_per_month)
        .ok_or_else(|| LoanServicingError::InvalidInput {
            field: "term_in_months".into(),
            reason: "Weekly term overflows".into(),
        })?;
    let weekly_rate = periodic_rate(terms.annual_interest_rate_percent, WEEKS_PER_YEAR)?;
    let principal_portion = round_money(terms.principal / Decimal::from(weeks), dp);
    let interest_portion = interest_on(terms.principal, weekly_rate, dp)?;

    level_principal_rows(terms.principal, weeks, principal_portion, interest_portion, |i| {
        weekly_due_date(start_date, i)
    })
}

/// Constant principal and interest every period; the last row takes the
/// principal left after rounding.
fn level_principal_rows(
    principal: Money,
    periods: u32,
    principal_portion: Money,
    interest_portion: Money,
    due_date: impl Fn(u32) -> LoanServicingResult<NaiveDate>,
) -> LoanServicingResult<Vec<Installment>> {
    let mut rows = Vec::with_capacity(periods as usize);
    let mut remaining = principal;

    for i in 1..=periods {
        let portion = if i == periods {
            remaining
        } else {
            principal_portion.min(remaining)
        };
        remaining -= portion;
        rows.push(row(i, due_date(i)?, portion, interest_portion)?);
    }

    Ok(rows)
}

fn reducing_balance_monthly(
    terms: &LoanTerms,
    start_date: NaiveDate,
    policy: &LendingPolicy,
) -> LoanServicingResult<Vec<Installment>> {
    let dp = policy.rounding_dp;
    let n = terms.term_in_months;
    let rate = terms.monthly_rate()?;
    let payment = round_money(level_payment(terms.principal, rate, n)?, dp);

    let mut rows = Vec::with_capacity(n as usize);
    let mut balance = terms.principal;

    for i in 1..=n {
        let interest = interest_on(balance, rate, dp)?;
        let principal = if i == n {
            balance
        } else {
            (payment - interest).max(Decimal::ZERO).min(balance)
        };
        balance -= principal;
        rows.push(row(i, monthly_due_date(start_date, i)?, principal, interest)?);
    }

    Ok(rows)
}

fn interest_on(balance: Money, rate: Rate, dp: u32) -> LoanServicingResult<Money> {
    balance
        .checked_mul(rate)
        .map(|interest| round_money(interest, dp))
        .ok_or_else(|| out_of_range("principal"))
}

fn row(
    number: u32,
    due_date: NaiveDate,
    principal: Money,
    interest: Money,
) -> LoanServicingResult<Installment> {
    principal
        .checked_add(interest)
        .ok_or_else(|| out_of_range("principal"))?;
    Ok(Installment::new(number, due_date, principal, interest))
}

// ---------------------------------------------------------------------------
// Dates
// ---------------------------------------------------------------------------

pub(crate) fn monthly_due_date(start: NaiveDate, period: u32) -> LoanServicingResult<NaiveDate> {
    start
        .checked_add_months(Months::new(period))
        .ok_or_else(|| LoanServicingError::InvalidInput {
            field: "start_date".into(),
            reason: format!("Due date for period {period} is out of range"),
        })
}

pub(crate) fn weekly_due_date(start: NaiveDate, period: u32) -> LoanServicingResult<NaiveDate> {
    start
        .checked_add_days(Days::new(7 * u64::from(period)))
        .ok_or_else(|| LoanServicingError::InvalidInput {
            field: "start_date".into(),
            reason: format!("Due date for week {period} is out of range"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn terms(method: InterestMethod) -> LoanTerms {
        LoanTerms {
            principal: dec!(500000),
            annual_interest_rate_percent: dec!(12),
            term_in_months: 12,
            interest_method: method,
            repayment_frequency: RepaymentFrequency::Monthly,
        }
    }

    #[test]
    fn test_reducing_balance_known_schedule() {
        let rows = amortize(
            &terms(InterestMethod::ReducingBalance),
            date(2026, 1, 15),
            &LendingPolicy::default(),
        )
        .unwrap();

        assert_eq!(rows.len(), 12);
        assert_eq!(rows[0].interest_portion, dec!(5000.00));
        assert_eq!(rows[0].principal_portion, dec!(39424.39));
        assert_eq!(rows[0].total_due, dec!(44424.39));
        assert_eq!(rows[1].interest_portion, dec!(4605.76));

        // Final row absorbs the rounding drift
        let last = &rows[11];
        assert_eq!(last.principal_portion, dec!(43984.61));
        assert_eq!(last.interest_portion, dec!(439.85));
        assert_eq!(last.total_due, dec!(44424.46));

        let principal: Decimal = rows.iter().map(|r| r.principal_portion).sum();
        assert_eq!(principal, dec!(500000));
    }

    #[test]
    fn test_due_dates_are_monthly_and_clamped() {
        let rows = amortize(
            &terms(InterestMethod::ReducingBalance),
            date(2026, 1, 31),
            &LendingPolicy::default(),
        )
        .unwrap();
        assert_eq!(rows[0].due_date, date(2026, 2, 28));
        assert_eq!(rows[1].due_date, date(2026, 3, 31));
        assert_eq!(rows[11].due_date, date(2027, 1, 31));
    }

    #[test]
    fn test_flat_monthly() {
        let mut t = terms(InterestMethod::Flat);
        t.principal = dec!(1000);
        t.term_in_months = 3;
        let rows = amortize(&t, date(2026, 1, 1), &LendingPolicy::default()).unwrap();

        // 1000 / 3 = 333.33 with the residue in the final row
        assert_eq!(rows[0].principal_portion, dec!(333.33));
        assert_eq!(rows[1].principal_portion, dec!(333.33));
        assert_eq!(rows[2].principal_portion, dec!(333.34));
        // Interest is 1% of the original principal every month
        for row in &rows {
            assert_eq!(row.interest_portion, dec!(10.00));
        }
    }

    #[test]
    fn test_zero_rate_reducing_balance() {
        let mut t = terms(InterestMethod::ReducingBalance);
        t.principal = dec!(1200);
        t.annual_interest_rate_percent = Decimal::ZERO;
        let rows = amortize(&t, date(2026, 1, 1), &LendingPolicy::default()).unwrap();
        assert!(rows.iter().all(|r| r.total_due == dec!(100)));
        assert!(rows.iter().all(|r| r.interest_portion.is_zero()));
    }

    #[test]
    fn test_flat_weekly() {
        let t = LoanTerms {
            principal: dec!(5200),
            annual_interest_rate_percent: dec!(10),
            term_in_months: 2,
            interest_method: InterestMethod::Flat,
            repayment_frequency: RepaymentFrequency::Weekly,
        };
        let rows = amortize(&t, date(2026, 1, 1), &LendingPolicy::default()).unwrap();

        assert_eq!(rows.len(), 8);
        assert_eq!(rows[0].principal_portion, dec!(650));
        // 5200 * 0.10 / 52 = 10
        assert_eq!(rows[0].interest_portion, dec!(10.00));
        assert_eq!(rows[0].due_date, date(2026, 1, 8));
        assert_eq!(rows[7].due_date, date(2026, 2, 26));
    }

    #[test]
    fn test_weekly_reducing_balance_rejected() {
        let mut t = terms(InterestMethod::ReducingBalance);
        t.repayment_frequency = RepaymentFrequency::Weekly;
        let err = amortize(&t, date(2026, 1, 1), &LendingPolicy::default()).unwrap_err();
        assert!(matches!(err, LoanServicingError::InvalidInput { .. }));
    }

    #[test]
    fn test_oversized_principal_is_an_error() {
        let mut t = terms(InterestMethod::ReducingBalance);
        t.principal = Decimal::from_i128_with_scale(10_i128.pow(28), 0);
        t.term_in_months = 1200;
        let err = amortize(&t, date(2026, 1, 1), &LendingPolicy::default()).unwrap_err();
        assert!(matches!(err, LoanServicingError::InvalidInput { .. }));

        // 1% flat on 5e28 for 120 months puts total interest beyond the range.
        t.interest_method = InterestMethod::Flat;
        t.principal = Decimal::from_i128_with_scale(5 * 10_i128.pow(28), 0);
        t.term_in_months = 120;
        let err = amortize(&t, date(2026, 1, 1), &LendingPolicy::default()).unwrap_err();
        assert!(matches!(err, LoanServicingError::InvalidInput { .. }));
    }

    #[test]
    fn test_zero_term_rejected() {
        let mut t = terms(InterestMethod::ReducingBalance);
        t.term_in_months = 0;
        assert!(amortize(&t, date(2026, 1, 1), &LendingPolicy::default()).is_err());
    }

    #[test]
    fn test_generate_schedule_totals() {
        let input = ScheduleInput {
            terms: terms(InterestMethod::ReducingBalance),
            start_date: date(2026, 1, 15),
            policy: LendingPolicy::default(),
        };
        let out = generate_schedule(&input).unwrap();
        let s = &out.result;
        assert_eq!(s.number_of_installments, 12);
        assert_eq!(s.periodic_payment, dec!(44424.39));
        assert_eq!(s.total_principal, dec!(500000));
        assert_eq!(s.total_interest, dec!(33092.75));
        assert_eq!(s.total_payment, dec!(533092.75));
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_flat_schedule_warns() {
        let input = ScheduleInput {
            terms: terms(InterestMethod::Flat),
            start_date: date(2026, 1, 15),
            policy: LendingPolicy::default(),
        };
        let out = generate_schedule(&input).unwrap();
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.methodology, "Flat Interest Amortization (Monthly)");
    }
}
