use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal::RoundingStrategy;
use rust_decimal_macros::dec;

use crate::error::LoanServicingError;
use crate::types::{Money, Percent, Rate};
use crate::LoanServicingResult;

const PERCENT: Decimal = dec!(100);

/// Round a monetary amount to `dp` places, half-to-even.
pub fn round_money(amount: Money, dp: u32) -> Money {
    amount.round_dp_with_strategy(dp, RoundingStrategy::MidpointNearestEven)
}

/// Error for a money computation that leaves the representable range.
pub(crate) fn out_of_range(field: &str) -> LoanServicingError {
    LoanServicingError::InvalidInput {
        field: field.into(),
        reason: "Amount is too large to compute".into(),
    }
}

/// Convert an annual percentage into a per-period decimal rate.
pub fn periodic_rate(annual_percent: Percent, periods_per_year: u32) -> LoanServicingResult<Rate> {
    if periods_per_year == 0 {
        return Err(LoanServicingError::DivisionByZero {
            context: "periodic rate with zero periods per year".into(),
        });
    }
    Ok(annual_percent / PERCENT / Decimal::from(periods_per_year))
}

/// Level payment (PMT) that amortises `principal` over `nper` periods.
///
/// Returned as a positive amount owed each period:
/// `P·r·(1+r)^n / ((1+r)^n − 1)`, or `P / n` when the rate is zero.
pub fn level_payment(principal: Money, rate: Rate, nper: u32) -> LoanServicingResult<Money> {
    if nper == 0 {
        return Err(LoanServicingError::InvalidInput {
            field: "nper".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }
    if rate < Decimal::ZERO {
        return Err(LoanServicingError::InvalidInput {
            field: "rate".into(),
            reason: "Periodic rate cannot be negative".into(),
        });
    }

    if rate.is_zero() {
        return Ok(principal / Decimal::from(nper));
    }

    let factor = (Decimal::ONE + rate)
        .checked_powu(u64::from(nper))
        .ok_or_else(|| LoanServicingError::InvalidInput {
            field: "nper".into(),
            reason: format!("Compounding factor overflows for {nper} periods"),
        })?;
    let denominator = factor - Decimal::ONE;

    if denominator.is_zero() {
        return Err(LoanServicingError::DivisionByZero {
            context: "PMT annuity factor".into(),
        });
    }

    principal
        .checked_mul(rate)
        .and_then(|v| v.checked_mul(factor))
        .and_then(|v| v.checked_div(denominator))
        .ok_or_else(|| out_of_range("principal"))
}
