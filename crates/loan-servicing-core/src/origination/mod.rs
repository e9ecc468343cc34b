pub mod eligibility;
pub mod product;
pub mod simulation;

pub use eligibility::{check_eligibility, ApplicantFinancials, EligibilityInput, EligibilityResult};
pub use product::LoanProduct;
pub use simulation::{simulate_loan, SimulationInput, SimulationOutput};
