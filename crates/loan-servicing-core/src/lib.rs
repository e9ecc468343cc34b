pub mod config;
pub mod error;
pub mod repayment;
pub mod schedule;
pub mod time_value;
pub mod types;

#[cfg(feature = "origination")]
pub mod origination;

#[cfg(feature = "servicing")]
pub mod accounting;

#[cfg(feature = "servicing")]
pub mod loan;

#[cfg(feature = "servicing")]
pub mod servicing;

#[cfg(feature = "servicing")]
pub mod store;

pub use error::LoanServicingError;
pub use types::*;

/// Standard result type for all loan-servicing operations
pub type LoanServicingResult<T> = Result<T, LoanServicingError>;
