//! Oldest-first allocation of a payment across a loan's unpaid installments.
//!
//! Installments are ordered by due date (installment number breaks ties) and
//! each one takes `min(remaining payment, outstanding)` until the payment runs
//! out. Within an installment, interest is settled before principal.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::config::LendingPolicy;
use crate::error::LoanServicingError;
use crate::schedule::{Installment, InstallmentStatus};
use crate::types::*;
use crate::LoanServicingResult;

// ---------------------------------------------------------------------------
// Input / Output
// ---------------------------------------------------------------------------

/// Amount applied to one installment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationLine {
    pub installment_number: u32,
    pub due_date: NaiveDate,
    pub applied: Money,
    pub interest: Money,
    pub principal: Money,
    pub outstanding_after: Money,
    pub status_after: InstallmentStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepaymentAllocation {
    pub lines: Vec<AllocationLine>,
    pub total_applied: Money,
    pub interest_applied: Money,
    pub principal_applied: Money,
    /// Part of the payment left over once every unpaid installment is settled.
    pub unallocated: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationInput {
    pub installments: Vec<Installment>,
    pub amount: Money,
    #[serde(default)]
    pub policy: LendingPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationPreview {
    pub allocation: RepaymentAllocation,
    pub installments: Vec<Installment>,
}

// ---------------------------------------------------------------------------
// Core functions
// ---------------------------------------------------------------------------

/// Allocate `amount` across `installments` in place.
///
/// Fails without touching anything when the amount is not positive or there
/// is nothing left to pay.
pub fn allocate_payment(
    installments: &mut [Installment],
    amount: Money,
    paid_tolerance: Money,
) -> LoanServicingResult<RepaymentAllocation> {
    if amount <= Decimal::ZERO {
        return Err(LoanServicingError::InvalidInput {
            field: "amount".into(),
            reason: "Repayment amount must be positive".into(),
        });
    }

    let mut order: Vec<usize> = installments
        .iter()
        .enumerate()
        .filter(|(_, inst)| inst.is_unpaid())
        .map(|(idx, _)| idx)
        .collect();

    if order.is_empty() {
        return Err(LoanServicingError::InvalidState(
            "No unpaid installments to allocate against".into(),
        ));
    }

    order.sort_by_key(|&idx| (installments[idx].due_date, installments[idx].installment_number));

    let mut remaining = amount;
    let mut lines = Vec::new();

    for idx in order {
        if remaining <= Decimal::ZERO {
            break;
        }
        let inst = &mut installments[idx];
        let split = inst.apply_payment(remaining, paid_tolerance);
        if split.applied.is_zero() {
            continue;
        }
        remaining -= split.applied;
        lines.push(AllocationLine {
            installment_number: inst.installment_number,
            due_date: inst.due_date,
            applied: split.applied,
            interest: split.interest,
            principal: split.principal,
            outstanding_after: inst.outstanding(),
            status_after: inst.status,
        });
    }

    let total_applied = lines.iter().map(|l| l.applied).sum();
    let interest_applied = lines.iter().map(|l| l.interest).sum();
    let principal_applied = lines.iter().map(|l| l.principal).sum();

    Ok(RepaymentAllocation {
        lines,
        total_applied,
        interest_applied,
        principal_applied,
        unallocated: remaining,
    })
}

/// Run an allocation against a copy of the installments and report the result.
pub fn preview_allocation(
    input: &AllocationInput,
) -> LoanServicingResult<ComputationOutput<AllocationPreview>> {
    let start = Instant::now();
    input.policy.validate()?;

    let mut installments = input.installments.clone();
    let allocation = allocate_payment(&mut installments, input.amount, input.policy.paid_tolerance)?;

    let mut warnings = Vec::new();
    if allocation.unallocated > Decimal::ZERO {
        warnings.push(format!(
            "Payment exceeds the total outstanding; {} left unallocated",
            allocation.unallocated
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Oldest-First Repayment Allocation",
        &serde_json::json!({
            "amount": input.amount.to_string(),
            "installments": input.installments.len(),
        }),
        warnings,
        elapsed,
        AllocationPreview {
            allocation,
            installments,
        },
    ))
}
