pub mod amortization;
pub mod installment;
pub mod terms;

pub use amortization::{amortize, generate_schedule, ScheduleInput, ScheduleOutput};
pub use installment::{AppliedSplit, Installment, InstallmentStatus};
pub use terms::{InterestMethod, LoanTerms, RepaymentFrequency};
